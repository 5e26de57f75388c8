//! Company lookup service
//!
//! Ties the dataset loader to the two result caches. Every request consults
//! its cache first; on a miss the loader supplies the engine (fetching the
//! dataset if this is the first use) and the answer is cached before it is
//! returned.

use serde::Serialize;
use tracing::{debug, info};

use super::result_cache::{CacheStats, ResultCache};
use crate::config::{CacheConfig, Config};
use crate::dataset::DatasetLoader;
use crate::errors::AppResult;
use crate::lookup::LookupStrategy;
use crate::models::{CompanyRecord, normalize_ticker};

/// Snapshot reported by `/health`
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub dataset_loaded: bool,
    pub strategy: LookupStrategy,
    pub source: String,
    pub caches: CacheReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheReport {
    pub identifier: CacheStats,
    pub ticker: CacheStats,
}

pub struct CompanyLookupService {
    loader: DatasetLoader,
    identifier_cache: ResultCache<CompanyRecord>,
    ticker_cache: ResultCache<Vec<CompanyRecord>>,
}

impl CompanyLookupService {
    pub fn new(loader: DatasetLoader, cache: &CacheConfig) -> Self {
        Self {
            loader,
            identifier_cache: ResultCache::new(
                "identifier",
                cache.identifier_capacity,
                cache.cache_negative_results,
            ),
            ticker_cache: ResultCache::new(
                "ticker",
                cache.ticker_capacity,
                cache.cache_negative_results,
            ),
        }
    }

    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let loader = DatasetLoader::from_config(config).await?;
        info!(
            "Company lookups use the {} strategy over {}",
            loader.strategy(),
            loader.source()
        );
        Ok(Self::new(loader, &config.cache))
    }

    /// Exact CIK lookup; the identifier is used verbatim as the cache key
    pub async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<CompanyRecord>> {
        self.identifier_cache
            .get_or_compute(identifier.to_string(), || async {
                debug!("Resolving CIK {}", identifier);
                let engine = self.loader.load().await?;
                engine.find_by_identifier(identifier).await
            })
            .await
    }

    /// Case-insensitive ticker lookup keyed on the uppercased symbol
    pub async fn find_by_ticker(&self, ticker: &str) -> AppResult<Option<Vec<CompanyRecord>>> {
        let normalized = normalize_ticker(ticker);
        self.ticker_cache
            .get_or_compute(normalized.clone(), || async {
                debug!("Resolving ticker {}", normalized);
                let engine = self.loader.load().await?;
                engine.find_by_ticker(&normalized).await
            })
            .await
    }

    /// Load the dataset now instead of on the first request
    pub async fn preload(&self) -> AppResult<()> {
        self.loader.load().await.map(|_| ())
    }

    pub fn loader(&self) -> &DatasetLoader {
        &self.loader
    }

    pub async fn status(&self) -> ServiceStatus {
        ServiceStatus {
            dataset_loaded: self.loader.is_loaded(),
            strategy: self.loader.strategy(),
            source: self.loader.source(),
            caches: CacheReport {
                identifier: self.identifier_cache.stats().await,
                ticker: self.ticker_cache.stats().await,
            },
        }
    }
}
