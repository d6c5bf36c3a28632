//! Tax table configuration for the payroll engine.
//!
//! This module provides functionality to load versioned tax tables
//! (federal brackets, Social Security wage base, Medicare rates and the
//! Additional Medicare threshold) from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/tax_tables").unwrap();
//! println!("Loaded {} tax tables", loader.tables().len());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{TaxBracket, TaxTableConfig};
