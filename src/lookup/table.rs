//! Per-request queries against the `companies` table

use async_trait::async_trait;
use tracing::debug;

use super::{LookupEngine, non_empty};
use crate::database::CompanyStore;
use crate::errors::AppResult;
use crate::models::{CompanyRecord, normalize_ticker};

/// Lookups that go to the database on every call
#[derive(Clone)]
pub struct TableScanLookup {
    store: CompanyStore,
}

impl TableScanLookup {
    pub fn new(store: CompanyStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LookupEngine for TableScanLookup {
    fn name(&self) -> &'static str {
        "table_scan"
    }

    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<CompanyRecord>> {
        self.store.find_by_cik(identifier).await
    }

    async fn find_by_ticker(&self, ticker: &str) -> AppResult<Option<Vec<CompanyRecord>>> {
        let normalized = normalize_ticker(ticker);
        let candidates = self.store.find_ticker_candidates(&normalized).await?;
        let total = candidates.len();

        // LIKE only narrows the rows down; keep exact ticker matches
        let matches: Vec<CompanyRecord> = candidates
            .into_iter()
            .filter(|record| record.has_ticker(&normalized))
            .collect();

        if matches.len() != total {
            debug!(
                "Dropped {} approximate matches for ticker {}",
                total - matches.len(),
                normalized
            );
        }
        Ok(non_empty(matches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::entities::companies;
    use sea_orm::{ActiveModelTrait, Set};

    async fn engine_with(records: &[CompanyRecord]) -> (Database, TableScanLookup) {
        let database = Database::new_in_memory().await.unwrap();
        database.migrate().await.unwrap();
        let store = database.company_store();
        store.replace_all(records).await.unwrap();
        (database, TableScanLookup::new(store))
    }

    #[tokio::test]
    async fn test_table_lookup_by_identifier() {
        let (_db, engine) = engine_with(&[CompanyRecord::new("0000320193", "AAPL")]).await;

        assert_eq!(engine.name(), "table_scan");
        let record = engine.find_by_identifier("0000320193").await.unwrap().unwrap();
        assert_eq!(record.primary_ticker, "AAPL");
        assert!(engine.find_by_identifier("0000320194").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partial_tickers_do_not_match() {
        let (_db, engine) = engine_with(&[
            CompanyRecord::new("0000320193", "AAPL").with_secondary_securities(["AAPL.W"]),
        ])
        .await;

        assert!(engine.find_by_ticker("aapl.w").await.unwrap().is_some());
        assert!(engine.find_by_ticker("AAP").await.unwrap().is_none());
        assert!(engine.find_by_ticker("AAPL.").await.unwrap().is_none());
        assert!(engine.find_by_ticker("%").await.unwrap().is_none());
        assert!(engine.find_by_ticker("AAPL_W").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_like_preselection_is_not_trusted() {
        let (db, engine) = engine_with(&[]).await;
        companies::ActiveModel {
            cik: Set("0000000001".to_string()),
            primary_ticker: Set(None),
            secondary_securities: Set(Some(r#"["X"AAP"Y"]"#.to_string())),
            denomination: Set(None),
        }
        .insert(&*db.connection)
        .await
        .unwrap();

        // passes the LIKE preselection, but the column is not valid JSON
        assert!(engine.find_by_ticker("AAP").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ticker_shared_by_two_companies() {
        let (_db, engine) = engine_with(&[
            CompanyRecord::new("0000000002", "DUP"),
            CompanyRecord::new("0000000001", "ONE").with_secondary_securities(["dup"]),
        ])
        .await;

        let owners: Vec<String> = engine
            .find_by_ticker("Dup")
            .await
            .unwrap()
            .unwrap()
            .into_iter()
            .map(|r| r.identifier)
            .collect();
        assert_eq!(owners, vec!["0000000001", "0000000002"]);
    }
}
