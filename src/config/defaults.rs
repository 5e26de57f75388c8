//! Configuration default values
//!
//! This module contains all the default values for configuration options,
//! making them easily changeable in one central location.

// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Dataset defaults
pub const DEFAULT_DATASET_PATH: &str = "./data/companies.json.gz";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PRELOAD: bool = false;

// Database defaults
pub const DEFAULT_DATABASE_URL: &str = "sqlite://./data.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// Result cache defaults
pub const DEFAULT_IDENTIFIER_CACHE_CAPACITY: usize = 1024;
pub const DEFAULT_TICKER_CACHE_CAPACITY: usize = 1024;
pub const DEFAULT_CACHE_NEGATIVE_RESULTS: bool = true;

// Environment overrides, e.g. EDGAR_LOOKUP_WEB__PORT=9000
pub const ENV_PREFIX: &str = "EDGAR_LOOKUP_";
