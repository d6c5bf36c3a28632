//! Per-(employee, year) serialization of payroll generation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

type LockKey = (String, i32);

/// Hands out one mutex per `(employee_id, year)` so two payrolls for the
/// same YTD accumulator never compute concurrently in this process.
///
/// Entries live only while some caller holds or waits for them.
#[derive(Debug, Default)]
pub struct YtdLockRegistry {
    locks: Mutex<HashMap<LockKey, Arc<Mutex<()>>>>,
}

/// A claim on one registry entry; the last claim removes the entry.
struct Lease<'a> {
    registry: &'a YtdLockRegistry,
    key: LockKey,
    lock: Arc<Mutex<()>>,
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        let mut locks = self
            .registry
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // the map and this lease are the only owners left
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.key);
        }
    }
}

impl YtdLockRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock for the employee and year.
    ///
    /// A lock poisoned by a panicking holder is still acquired.
    pub fn with_lock<T>(&self, employee_id: &str, year: i32, f: impl FnOnce() -> T) -> T {
        let key = (employee_id.to_string(), year);
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(
                locks
                    .entry(key.clone())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        let lease = Lease {
            registry: self,
            key,
            lock,
        };
        let _guard = lease.lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of keys currently held or awaited.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if no key is held or awaited.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
