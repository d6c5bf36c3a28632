//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading tax tables
//! from YAML files.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::TaxTableConfig;

/// Loads and provides access to versioned tax tables.
///
/// The `ConfigLoader` reads every YAML tax table in a directory, validates
/// each one, and answers which table is in force on a given pay date.
///
/// # Directory Structure
///
/// ```text
/// config/tax_tables/
/// ├── 2023.yaml   # effective_date: 2023-01-01
/// └── 2024.yaml   # effective_date: 2024-01-01
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/tax_tables")?;
/// let table = loader.table_for(NaiveDate::from_ymd_opt(2023, 6, 30).unwrap())?;
/// println!("Wage base: {}", table.social_security_wage_base);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Tables sorted oldest effective date first.
    tables: Vec<TaxTableConfig>,
}

impl ConfigLoader {
    /// Loads every `*.yaml` tax table from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - The directory is missing or contains no YAML files (`ConfigNotFound`)
    /// - Any file contains invalid YAML or misses a field (`ConfigParseError`)
    /// - Any table fails validation (`InvalidConfig`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let dir = path.as_ref();
        let dir_str = dir.display().to_string();

        if !dir.exists() {
            return Err(EngineError::ConfigNotFound { path: dir_str });
        }

        let entries = fs::read_dir(dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut tables = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                tables.push(Self::load_yaml::<TaxTableConfig>(&path)?);
            }
        }

        if tables.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no tax table files found)", dir_str),
            });
        }

        Self::from_tables(tables)
    }

    /// Builds a loader from tables already in memory.
    ///
    /// Each table is validated. Two tables with the same effective date are
    /// rejected because the choice between them would be ambiguous.
    pub fn from_tables(tables: Vec<TaxTableConfig>) -> EngineResult<Self> {
        if tables.is_empty() {
            return Err(EngineError::InvalidConfig {
                message: "at least one tax table is required".to_string(),
            });
        }
        for table in &tables {
            table.validate()?;
        }

        let mut sorted = tables;
        sorted.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        if let Some(pair) = sorted
            .windows(2)
            .find(|pair| pair[0].effective_date == pair[1].effective_date)
        {
            return Err(EngineError::InvalidConfig {
                message: format!(
                    "duplicate tax tables effective {}",
                    pair[0].effective_date
                ),
            });
        }

        Ok(Self { tables: sorted })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns all loaded tables, oldest first.
    pub fn tables(&self) -> &[TaxTableConfig] {
        &self.tables
    }

    /// Gets the table in force on the given date.
    ///
    /// The most recent table whose effective date is on or before `date`
    /// wins. A date before every table is a `NotFound` error.
    pub fn table_for(&self, date: NaiveDate) -> EngineResult<&TaxTableConfig> {
        self.tables
            .iter()
            .rfind(|table| table.effective_date <= date)
            .ok_or_else(|| EngineError::not_found("tax table", date.to_string()))
    }
}
