//! Per-query scanning over the raw dataset payload
//!
//! Nothing is indexed: each call decompresses and parses the whole document
//! and walks every entry. Latency grows linearly with dataset size and every
//! call pays the full decode, which is why results are memoised by the
//! service-level result cache. The work runs on the blocking pool so a scan
//! never stalls the async workers.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use super::{LookupEngine, non_empty};
use crate::dataset::{Dataset, DocumentLayout, decode_document, record_from_entry};
use crate::errors::{AppError, AppResult, SourceResult};
use crate::models::{CompanyRecord, normalize_ticker};

/// Lookups that re-read the cached raw payload on every call
#[derive(Debug, Clone)]
pub struct DocumentScanLookup {
    raw: Bytes,
    layout: DocumentLayout,
}

impl DocumentScanLookup {
    pub fn new(raw: Bytes, layout: DocumentLayout) -> Self {
        Self { raw, layout }
    }

    /// Size of the cached payload as fetched (before decompression)
    pub fn payload_len(&self) -> usize {
        self.raw.len()
    }

    /// Record for `identifier`
    ///
    /// Identifier-keyed documents stop at the matching key. Ticker-keyed
    /// documents are read to the end, since later entries for the same CIK
    /// contribute tickers the way [`Dataset::new`] folds them.
    pub fn scan_identifier(&self, identifier: &str) -> SourceResult<Option<CompanyRecord>> {
        let entries = decode_document(&self.raw, self.layout)?;

        let found = match self.layout {
            DocumentLayout::ByIdentifier => entries
                .get(identifier)
                .and_then(|value| record_from_entry(self.layout, identifier, value)),
            DocumentLayout::ByTicker => {
                let matching = entries
                    .iter()
                    .filter_map(|(key, value)| record_from_entry(self.layout, key, value))
                    .filter(|record| record.identifier == identifier);
                Dataset::new(matching).into_records().into_iter().next()
            }
        };

        debug!("Identifier scan over {} entries", entries.len());
        Ok(found)
    }

    /// Every entry is visited; a CIK is reported once even if several
    /// ticker-keyed entries point at it
    pub fn scan_ticker(&self, ticker: &str) -> SourceResult<Vec<CompanyRecord>> {
        let entries = decode_document(&self.raw, self.layout)?;
        let normalized = normalize_ticker(ticker);

        let records = entries
            .iter()
            .filter_map(|(key, value)| record_from_entry(self.layout, key, value));
        let matches: Vec<CompanyRecord> = Dataset::new(records)
            .into_records()
            .into_iter()
            .filter(|record| record.has_ticker(&normalized))
            .collect();

        debug!(
            "Ticker scan for {} visited {} entries, {} matches",
            normalized,
            entries.len(),
            matches.len()
        );
        Ok(matches)
    }
}

async fn run_blocking<T, F>(scan: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> SourceResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(scan)
        .await
        .map_err(|e| AppError::internal(format!("dataset scan task failed: {e}")))?
        .map_err(AppError::from)
}

#[async_trait]
impl LookupEngine for DocumentScanLookup {
    fn name(&self) -> &'static str {
        "document_scan"
    }

    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<CompanyRecord>> {
        let engine = self.clone();
        let identifier = identifier.to_string();
        run_blocking(move || engine.scan_identifier(&identifier)).await
    }

    async fn find_by_ticker(&self, ticker: &str) -> AppResult<Option<Vec<CompanyRecord>>> {
        let engine = self.clone();
        let ticker = ticker.to_string();
        run_blocking(move || engine.scan_ticker(&ticker))
            .await
            .map(non_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use serde_json::json;
    use std::io::Write;

    fn gzipped(document: &serde_json::Value) -> Bytes {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(document.to_string().as_bytes()).unwrap();
        Bytes::from(encoder.finish().unwrap())
    }

    fn identifier_keyed() -> DocumentScanLookup {
        DocumentScanLookup::new(
            gzipped(&json!({
                "0000320193": {"primary_ticker": "AAPL", "secondary_securities": ["AAPL.W"], "denomination": {"currency": "USD"}},
                "0000789019": {"primary_ticker": "MSFT", "secondary_securities": []},
                "0000000043": {"secondary_securities": ["aapl.w"]}
            })),
            DocumentLayout::ByIdentifier,
        )
    }

    #[tokio::test]
    async fn test_scan_by_identifier() {
        let engine = identifier_keyed();

        let record = engine.find_by_identifier("0000789019").await.unwrap().unwrap();
        assert_eq!(record.primary_ticker, "MSFT");
        assert!(engine.find_by_identifier("9999999999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scan_by_ticker_collects_all_matches() {
        let engine = identifier_keyed();

        let matches = engine.find_by_ticker("AAPL.W").await.unwrap().unwrap();
        let owners: Vec<&str> = matches.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(owners, vec!["0000320193", "0000000043"]);

        assert!(engine.find_by_ticker("GOOG").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scan_ticker_keyed_document() {
        let engine = DocumentScanLookup::new(
            Bytes::from(
                json!({
                    "BRK.A": {"cik": "0001067983", "secondary_securities": ["BRK.B"]},
                    "BRK.B": {"cik": "0001067983", "primary_ticker": "BRK.A"}
                })
                .to_string(),
            ),
            DocumentLayout::ByTicker,
        );

        let matches = engine.find_by_ticker("brk.b").await.unwrap().unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].primary_ticker, "BRK.A");

        let record = engine.find_by_identifier("0001067983").await.unwrap().unwrap();
        assert_eq!(record.primary_ticker, "BRK.A");
    }

    #[tokio::test]
    async fn test_corrupt_payload_surfaces_as_error() {
        let engine = DocumentScanLookup::new(Bytes::from_static(b"{\"truncated\": "), DocumentLayout::ByIdentifier);

        let err = engine.find_by_identifier("0000320193").await.unwrap_err();
        assert!(matches!(err, AppError::Source(_)));
    }
}
