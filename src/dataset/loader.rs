//! One-shot dataset loading
//!
//! The loader owns the single slot holding the active lookup engine. The
//! first caller of [`DatasetLoader::load`] fetches the dataset while holding
//! the slot lock; concurrent callers wait on that lock and then share the
//! same engine. A failed fetch leaves the slot empty so the next call
//! retries.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use anyhow::Context;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{Dataset, DocumentLayout, decode_document};
use crate::config::Config;
use crate::database::{CompanyStore, Database};
use crate::errors::{AppError, AppResult};
use crate::lookup::{DocumentScanLookup, IndexedLookup, LookupEngine, LookupStrategy, TableScanLookup};
use crate::sources::{DatasetSourceKind, DocumentSource, FileSource, HttpSource};

/// Where the loader reads company records from
#[derive(Clone)]
pub enum DatasetOrigin {
    /// A JSON document (file or HTTP)
    Document {
        source: Arc<dyn DocumentSource>,
        layout: DocumentLayout,
    },
    /// The `companies` table
    Table(CompanyStore),
}

impl DatasetOrigin {
    pub fn document(source: impl DocumentSource + 'static, layout: DocumentLayout) -> Self {
        Self::Document {
            source: Arc::new(source),
            layout,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Document { source, .. } => source.describe(),
            Self::Table(_) => "database:companies".to_string(),
        }
    }
}

pub struct DatasetLoader {
    origin: DatasetOrigin,
    strategy: LookupStrategy,
    slot: Mutex<Option<Arc<dyn LookupEngine>>>,
    fetch_attempts: AtomicU64,
    loaded: AtomicBool,
}

impl DatasetLoader {
    pub fn new(origin: DatasetOrigin, strategy: LookupStrategy) -> Self {
        Self {
            origin,
            strategy,
            slot: Mutex::new(None),
            fetch_attempts: AtomicU64::new(0),
            loaded: AtomicBool::new(false),
        }
    }

    /// Build the origin described by `config`
    ///
    /// Nothing is fetched here. For the database source the connection is
    /// opened and migrations are applied.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let dataset = &config.dataset;
        let origin = match dataset.source {
            DatasetSourceKind::File => {
                DatasetOrigin::document(FileSource::new(&dataset.path), dataset.layout)
            }
            DatasetSourceKind::Http => {
                let url = dataset
                    .url
                    .clone()
                    .context("dataset.url is required for the http source")?;
                let source = HttpSource::new(url, dataset.connect_timeout, dataset.fetch_timeout)?;
                DatasetOrigin::document(source, dataset.layout)
            }
            DatasetSourceKind::Database => {
                let database = Database::new(&config.database).await?;
                database.migrate().await?;
                DatasetOrigin::Table(database.company_store())
            }
        };

        Ok(Self::new(origin, config.lookup.strategy))
    }

    pub fn strategy(&self) -> LookupStrategy {
        self.strategy
    }

    pub fn source(&self) -> String {
        self.origin.describe()
    }

    /// Whether a lookup engine is ready; never triggers a fetch
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Number of fetches attempted so far, successful or not
    pub fn fetch_count(&self) -> u64 {
        self.fetch_attempts.load(Ordering::Relaxed)
    }

    /// Return the lookup engine, fetching the dataset on first use
    pub async fn load(&self) -> AppResult<Arc<dyn LookupEngine>> {
        let mut slot = self.slot.lock().await;
        if let Some(engine) = slot.as_ref() {
            return Ok(engine.clone());
        }

        self.fetch_attempts.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();

        match self.build_engine().await {
            Ok(engine) => {
                info!(
                    "Dataset from {} ready in {:?} ({} engine)",
                    self.source(),
                    started.elapsed(),
                    engine.name()
                );
                *slot = Some(engine.clone());
                self.loaded.store(true, Ordering::Release);
                Ok(engine)
            }
            Err(e) => {
                warn!("Dataset load from {} failed: {}", self.source(), e);
                Err(e)
            }
        }
    }

    async fn build_engine(&self) -> AppResult<Arc<dyn LookupEngine>> {
        match (&self.origin, self.strategy) {
            (DatasetOrigin::Document { source, layout }, LookupStrategy::Indexed) => {
                let raw = source.fetch().await?;
                let layout = *layout;
                let engine = tokio::task::spawn_blocking(move || {
                    Dataset::from_document(&raw, layout).map(IndexedLookup::from_dataset)
                })
                .await
                .map_err(|e| AppError::internal(format!("dataset decode task failed: {e}")))??;
                info!("Indexed {} companies", engine.company_count());
                Ok(Arc::new(engine))
            }
            (DatasetOrigin::Document { source, layout }, LookupStrategy::Scan) => {
                let raw = source.fetch().await?;
                let layout = *layout;
                // a payload that cannot be decoded must not occupy the slot
                let check = raw.clone();
                let entries = tokio::task::spawn_blocking(move || {
                    decode_document(&check, layout).map(|entries| entries.len())
                })
                .await
                .map_err(|e| AppError::internal(format!("dataset decode task failed: {e}")))??;
                let engine = DocumentScanLookup::new(raw, layout);
                info!(
                    "Keeping {} byte dataset payload ({} entries) for scanning",
                    engine.payload_len(),
                    entries
                );
                Ok(Arc::new(engine))
            }
            (DatasetOrigin::Table(store), LookupStrategy::Indexed) => {
                let dataset = Dataset::new(store.load_all().await?);
                let engine = IndexedLookup::from_dataset(dataset);
                info!("Indexed {} companies", engine.company_count());
                Ok(Arc::new(engine))
            }
            (DatasetOrigin::Table(store), LookupStrategy::Scan) => {
                Ok(Arc::new(TableScanLookup::new(store.clone())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::future::join_all;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use crate::errors::{SourceError, SourceResult};

    const DOCUMENT: &str = r#"{"0000320193": {"primary_ticker": "AAPL", "secondary_securities": []}}"#;

    /// Serves [`DOCUMENT`] after failing the first `failures` fetches
    ///
    /// A failing fetch is an HTTP 503, or a truncated document when `corrupt`.
    struct CountingSource {
        fetches: Arc<AtomicUsize>,
        failures: usize,
        corrupt: bool,
    }

    #[async_trait]
    impl DocumentSource for CountingSource {
        fn describe(&self) -> String {
            "memory://companies.json".to_string()
        }

        async fn fetch(&self) -> SourceResult<Bytes> {
            let attempt = self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if attempt < self.failures && self.corrupt {
                return Ok(Bytes::from_static(br#"{"truncated": "#));
            }
            if attempt < self.failures {
                return Err(SourceError::Status {
                    url: self.describe(),
                    status: 503,
                });
            }
            Ok(Bytes::from_static(DOCUMENT.as_bytes()))
        }
    }

    fn loader(failures: usize, strategy: LookupStrategy) -> (DatasetLoader, Arc<AtomicUsize>) {
        source_loader(failures, false, strategy)
    }

    fn source_loader(
        failures: usize,
        corrupt: bool,
        strategy: LookupStrategy,
    ) -> (DatasetLoader, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            fetches: fetches.clone(),
            failures,
            corrupt,
        };
        let loader = DatasetLoader::new(
            DatasetOrigin::document(source, DocumentLayout::ByIdentifier),
            strategy,
        );
        (loader, fetches)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_loads_fetch_once() {
        let (loader, fetches) = loader(0, LookupStrategy::Indexed);
        let loader = Arc::new(loader);

        let calls = (0..16).map(|_| {
            let loader = loader.clone();
            tokio::spawn(async move { loader.load().await.map(|engine| engine.name()) })
        });
        for result in join_all(calls).await {
            assert_eq!(result.unwrap().unwrap(), "indexed");
        }

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(loader.fetch_count(), 1);
        assert!(loader.is_loaded());
    }

    #[tokio::test]
    async fn test_failed_fetch_is_retried() {
        let (loader, fetches) = loader(1, LookupStrategy::Indexed);

        let err = loader.load().await.err().unwrap();
        assert!(err.to_string().contains("HTTP 503"));
        assert!(!loader.is_loaded());

        let engine = loader.load().await.unwrap();
        let record = engine.find_by_identifier("0000320193").await.unwrap();
        assert_eq!(record.unwrap().primary_ticker, "AAPL");

        loader.load().await.unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_scan_strategy_keeps_raw_payload() {
        let (loader, _) = loader(0, LookupStrategy::Scan);

        assert!(!loader.is_loaded());
        let engine = loader.load().await.unwrap();
        assert_eq!(engine.name(), "document_scan");
        assert!(engine.find_by_ticker("aapl").await.unwrap().is_some());
        assert_eq!(loader.source(), "memory://companies.json");
    }

    #[rstest::rstest]
    #[case::indexed(LookupStrategy::Indexed)]
    #[case::scan(LookupStrategy::Scan)]
    #[tokio::test]
    async fn test_corrupt_payload_is_refetched(#[case] strategy: LookupStrategy) {
        let (loader, fetches) = source_loader(1, true, strategy);

        let err = loader.load().await.err().unwrap();
        assert!(matches!(err, AppError::Source(SourceError::Parse(_))), "{err:?}");
        assert!(!loader.is_loaded());

        let engine = loader.load().await.unwrap();
        assert!(loader.is_loaded());
        let record = engine.find_by_identifier("0000320193").await.unwrap();
        assert_eq!(record.unwrap().primary_ticker, "AAPL");
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
        assert_eq!(loader.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_table_origin_strategies() {
        let database = Database::new_in_memory().await.unwrap();
        database.migrate().await.unwrap();
        let store = database.company_store();
        store
            .replace_all(&[crate::models::CompanyRecord::new("0000789019", "MSFT")])
            .await
            .unwrap();

        let indexed = DatasetLoader::new(DatasetOrigin::Table(store.clone()), LookupStrategy::Indexed);
        let engine = indexed.load().await.unwrap();
        assert_eq!(engine.name(), "indexed");
        assert!(engine.find_by_identifier("0000789019").await.unwrap().is_some());

        let scanning = DatasetLoader::new(DatasetOrigin::Table(store), LookupStrategy::Scan);
        let engine = scanning.load().await.unwrap();
        assert_eq!(engine.name(), "table_scan");
        assert!(engine.find_by_ticker("msft").await.unwrap().is_some());
    }
}
