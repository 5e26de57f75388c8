//! In-memory lookup indices derived from a [`Dataset`]

use std::collections::HashMap;

use crate::dataset::Dataset;
use crate::models::{CompanyRecord, normalize_ticker};

/// CIK -> record, exact byte-for-byte keys
#[derive(Debug, Default)]
pub struct IdentifierIndex {
    records: HashMap<String, CompanyRecord>,
}

impl IdentifierIndex {
    pub fn get(&self, identifier: &str) -> Option<&CompanyRecord> {
        self.records.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Uppercased ticker -> owning CIKs in dataset order
///
/// An identifier appears once per listing, so a ticker repeated inside one
/// record (or shared by two records in malformed input) yields repeated or
/// multiple owners.
#[derive(Debug, Default)]
pub struct TickerIndex {
    owners: HashMap<String, Vec<String>>,
}

impl TickerIndex {
    /// Owners of an already-normalised ticker
    pub fn get(&self, normalized: &str) -> Option<&[String]> {
        self.owners
            .get(normalized)
            .map(Vec::as_slice)
            .filter(|owners| !owners.is_empty())
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    fn push(&mut self, ticker: &str, identifier: &str) {
        self.owners
            .entry(normalize_ticker(ticker))
            .or_default()
            .push(identifier.to_string());
    }
}

/// Both indices, built together in one pass
#[derive(Debug, Default)]
pub struct CompanyIndex {
    identifiers: IdentifierIndex,
    tickers: TickerIndex,
}

impl CompanyIndex {
    /// O(records + tickers); deterministic for a given dataset
    pub fn build(dataset: Dataset) -> Self {
        let mut identifiers = IdentifierIndex::default();
        let mut tickers = TickerIndex::default();

        for record in dataset.into_records() {
            if !record.primary_ticker.is_empty() {
                tickers.push(&record.primary_ticker, &record.identifier);
            }
            for ticker in record.secondary_securities.iter().filter(|t| !t.is_empty()) {
                tickers.push(ticker, &record.identifier);
            }
            identifiers
                .records
                .entry(record.identifier.clone())
                .or_insert(record);
        }

        Self { identifiers, tickers }
    }

    pub fn identifiers(&self) -> &IdentifierIndex {
        &self.identifiers
    }

    pub fn tickers(&self) -> &TickerIndex {
        &self.tickers
    }

    pub fn find_by_identifier(&self, identifier: &str) -> Option<CompanyRecord> {
        self.identifiers.get(identifier).cloned()
    }

    /// Records owning `ticker` (any case), `None` when there are none
    pub fn find_by_ticker(&self, ticker: &str) -> Option<Vec<CompanyRecord>> {
        let owners = self.tickers.get(&normalize_ticker(ticker))?;
        Some(
            owners
                .iter()
                .filter_map(|identifier| self.identifiers.get(identifier).cloned())
                .collect(),
        )
    }
}
