//! Dataset materialisation
//!
//! A [`Dataset`] is the complete, immutable list of company records for the
//! lifetime of the process. It is produced all-or-nothing from a raw payload
//! (or from the `companies` table) and then either indexed or kept around as
//! raw bytes for per-query scanning, depending on the lookup strategy.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::errors::SourceResult;
use crate::models::{CompanyRecord, normalize_ticker};

pub mod document;
pub mod index;
pub mod loader;

pub use document::{DocumentLayout, decode_document, record_from_entry};
pub use index::{CompanyIndex, IdentifierIndex, TickerIndex};
pub use loader::{DatasetLoader, DatasetOrigin};

/// Immutable collection of company records in dataset iteration order
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<CompanyRecord>,
}

impl Dataset {
    /// Build a dataset, keeping the first record for any repeated identifier
    ///
    /// When a later record repeats an identifier its tickers are folded into
    /// the first record's secondary securities, so ticker-keyed documents that
    /// list every share class as its own entry still resolve each symbol.
    pub fn new(records: impl IntoIterator<Item = CompanyRecord>) -> Self {
        let mut ordered: Vec<CompanyRecord> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for record in records {
            match positions.get(&record.identifier) {
                Some(&position) => {
                    let existing = &mut ordered[position];
                    debug!(
                        "Folding duplicate entry for CIK {} into first occurrence",
                        record.identifier
                    );
                    for ticker in record.tickers() {
                        let key = normalize_ticker(ticker);
                        if !existing.tickers().any(|known| normalize_ticker(known) == key) {
                            existing.secondary_securities.push(ticker.to_string());
                        }
                    }
                }
                None => {
                    positions.insert(record.identifier.clone(), ordered.len());
                    ordered.push(record);
                }
            }
        }

        Self { records: ordered }
    }

    /// Decode a raw (optionally gzip-compressed) JSON document
    pub fn from_document(raw: &[u8], layout: DocumentLayout) -> SourceResult<Self> {
        let entries = decode_document(raw, layout)?;
        let total = entries.len();

        let records: Vec<CompanyRecord> = entries
            .iter()
            .filter_map(|(key, value)| {
                let record = record_from_entry(layout, key, value);
                if record.is_none() {
                    warn!("Skipping malformed dataset entry '{}'", key);
                }
                record
            })
            .collect();

        debug!(
            "Decoded {} of {} dataset entries ({} layout)",
            records.len(),
            total,
            layout
        );
        Ok(Self::new(records))
    }

    pub fn records(&self) -> &[CompanyRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<CompanyRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
