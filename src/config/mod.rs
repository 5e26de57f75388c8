use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub mod defaults;
pub mod duration_serde;

use defaults::*;

use crate::dataset::DocumentLayout;
use crate::errors::{AppError, AppResult};
use crate::lookup::LookupStrategy;
use crate::sources::DatasetSourceKind;
use crate::utils::UrlUtils;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub web: WebConfig,
    pub dataset: DatasetConfig,
    pub database: DatabaseConfig,
    pub lookup: LookupConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    #[serde(with = "duration_serde::duration")]
    pub request_timeout: Duration,
}

/// Where the company dataset comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub source: DatasetSourceKind,
    /// Local JSON document (gzip or plain), used by the `file` source
    pub path: PathBuf,
    /// Remote JSON document, used by the `http` source
    pub url: Option<String>,
    /// Key interpretation for JSON documents
    pub layout: DocumentLayout,
    /// Fetch at startup instead of on the first request
    pub preload: bool,
    #[serde(with = "duration_serde::duration")]
    pub fetch_timeout: Duration,
    #[serde(with = "duration_serde::duration")]
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub strategy: LookupStrategy,
}

/// Result cache sizing; a capacity of 0 disables that cache
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub identifier_capacity: usize,
    pub ticker_capacity: usize,
    /// Memoise "not found" outcomes as well as hits
    pub cache_negative_results: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            source: DatasetSourceKind::default(),
            path: PathBuf::from(DEFAULT_DATASET_PATH),
            url: None,
            layout: DocumentLayout::default(),
            preload: DEFAULT_PRELOAD,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: Some(DEFAULT_MAX_CONNECTIONS),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            identifier_capacity: DEFAULT_IDENTIFIER_CACHE_CAPACITY,
            ticker_capacity: DEFAULT_TICKER_CACHE_CAPACITY,
            cache_negative_results: DEFAULT_CACHE_NEGATIVE_RESULTS,
        }
    }
}

impl Config {
    /// Defaults, then the TOML file (if present), then `EDGAR_LOOKUP_*` env vars.
    ///
    /// The result is not validated; callers apply their own overrides first and
    /// then call [`Config::validate`].
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if Path::new(config_file).exists() {
            figment = figment.merge(Toml::file(config_file));
            info!("Loading configuration from {}", config_file);
        } else {
            info!("Config file {} not found, using defaults", config_file);
        }

        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract::<Config>()
            .with_context(|| format!("Failed to load configuration from {config_file}"))?;

        Ok(config)
    }

    /// Write the default configuration as TOML
    pub fn write_default(config_file: &str) -> Result<()> {
        let contents = toml::to_string_pretty(&Self::default())?;
        std::fs::write(config_file, contents)
            .with_context(|| format!("Failed to write {config_file}"))?;
        info!("Created default config file: {}", config_file);
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        match self.dataset.source {
            DatasetSourceKind::Http => {
                let url = self
                    .dataset
                    .url
                    .as_deref()
                    .filter(|url| !url.trim().is_empty())
                    .ok_or_else(|| AppError::configuration("dataset.url is required for the http source"))?;
                UrlUtils::parse_and_validate(url).map_err(AppError::configuration)?;
            }
            DatasetSourceKind::File => {
                if self.dataset.path.as_os_str().is_empty() {
                    return Err(AppError::configuration(
                        "dataset.path is required for the file source",
                    ));
                }
            }
            DatasetSourceKind::Database => {
                if self.database.url.trim().is_empty() {
                    return Err(AppError::configuration(
                        "database.url is required for the database source",
                    ));
                }
                if self.dataset.layout != DocumentLayout::default() {
                    warn!(
                        "dataset.layout = {} has no effect with the database source",
                        self.dataset.layout
                    );
                }
            }
        }

        if self.dataset.fetch_timeout.is_zero() {
            return Err(AppError::configuration("dataset.fetch_timeout must be greater than zero"));
        }

        Ok(())
    }
}
