//! Centralized error handling for the EDGAR lookup service
//!
//! Lookups distinguish three outcomes: a record was found, no record exists
//! (`Ok(None)`, never an error), or something went wrong while obtaining the
//! dataset. Only the last one travels through these types.
//!
//! # Error Categories
//!
//! - **Source Errors**: dataset file, HTTP download, decompression and parsing
//! - **Database Errors**: SeaORM failures against the `companies` table
//! - **Configuration Errors**: invalid or inconsistent settings
//! - **Internal Errors**: background task failures and other invariants
//!
//! # Usage
//!
//! ```rust
//! use edgar_lookup::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("dataset.url is required"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for dataset Source Results
pub type SourceResult<T> = Result<T, SourceError>;
