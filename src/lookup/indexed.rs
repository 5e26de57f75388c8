use async_trait::async_trait;

use super::{LookupEngine, non_empty};
use crate::dataset::{CompanyIndex, Dataset};
use crate::errors::AppResult;
use crate::models::CompanyRecord;

/// Lookups against prebuilt in-memory indices
#[derive(Debug)]
pub struct IndexedLookup {
    index: CompanyIndex,
}

impl IndexedLookup {
    pub fn new(index: CompanyIndex) -> Self {
        Self { index }
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        Self::new(CompanyIndex::build(dataset))
    }

    pub fn company_count(&self) -> usize {
        self.index.identifiers().len()
    }
}

#[async_trait]
impl LookupEngine for IndexedLookup {
    fn name(&self) -> &'static str {
        "indexed"
    }

    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<CompanyRecord>> {
        Ok(self.index.find_by_identifier(identifier))
    }

    async fn find_by_ticker(&self, ticker: &str) -> AppResult<Option<Vec<CompanyRecord>>> {
        Ok(self.index.find_by_ticker(ticker).and_then(non_empty))
    }
}
