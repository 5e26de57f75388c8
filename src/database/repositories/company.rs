//! SeaORM-based repository for the `companies` table
//!
//! Rows store tickers and denomination as JSON text. Decoding is lenient:
//! a column that does not hold valid JSON is logged and read as empty
//! (tickers) or as the raw string (denomination).

use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::entities::{companies, prelude::Companies};
use crate::errors::{AppError, AppResult};
use crate::models::{CompanyRecord, normalize_ticker};

/// Rows per `INSERT` statement during [`CompanyStore::replace_all`]
const INSERT_CHUNK_SIZE: usize = 500;

/// Repository for company rows
#[derive(Clone)]
pub struct CompanyStore {
    connection: Arc<DatabaseConnection>,
}

impl CompanyStore {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Exact primary-key lookup
    pub async fn find_by_cik(&self, cik: &str) -> AppResult<Option<CompanyRecord>> {
        let model = Companies::find_by_id(cik.to_string())
            .one(&*self.connection)
            .await?;

        Ok(model.map(|m| self.model_to_domain(m)))
    }

    /// Rows that may carry `ticker`
    ///
    /// Matches the uppercased primary ticker exactly, or a quoted occurrence
    /// inside the secondary JSON array. The `LIKE` half is a preselection;
    /// callers must still check [`CompanyRecord::has_ticker`].
    pub async fn find_ticker_candidates(&self, ticker: &str) -> AppResult<Vec<CompanyRecord>> {
        let normalized = normalize_ticker(ticker);
        let pattern = LikeExpr::new(format!("%\"{}\"%", escape_like(&normalized))).escape('\\');

        let models = Companies::find()
            .filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::upper(Expr::col(companies::Column::PrimaryTicker)))
                            .eq(normalized.as_str()),
                    )
                    .add(
                        Expr::expr(Func::upper(Expr::col(
                            companies::Column::SecondarySecurities,
                        )))
                        .like(pattern),
                    ),
            )
            .order_by_asc(companies::Column::Cik)
            .all(&*self.connection)
            .await?;

        debug!("{} candidate rows for ticker {}", models.len(), normalized);
        Ok(models.into_iter().map(|m| self.model_to_domain(m)).collect())
    }

    /// Every row, ordered by CIK
    pub async fn load_all(&self) -> AppResult<Vec<CompanyRecord>> {
        let models = Companies::find()
            .order_by_asc(companies::Column::Cik)
            .all(&*self.connection)
            .await?;

        Ok(models.into_iter().map(|m| self.model_to_domain(m)).collect())
    }

    /// Replace the whole table with `records` in one transaction
    pub async fn replace_all(&self, records: &[CompanyRecord]) -> AppResult<u64> {
        let txn = self.connection.begin().await?;

        let deleted = Companies::delete_many().exec(&txn).await?;
        debug!("Removed {} existing company rows", deleted.rows_affected);

        let mut inserted = 0u64;
        for chunk in records.chunks(INSERT_CHUNK_SIZE) {
            let models = chunk
                .iter()
                .map(Self::domain_to_active_model)
                .collect::<AppResult<Vec<_>>>()?;
            inserted += Companies::insert_many(models)
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;
        info!("Imported {} company rows", inserted);
        Ok(inserted)
    }

    fn domain_to_active_model(record: &CompanyRecord) -> AppResult<companies::ActiveModel> {
        let secondary = serde_json::to_string(&record.secondary_securities)
            .map_err(|e| AppError::internal(format!("Failed to encode tickers: {e}")))?;
        let denomination = serde_json::to_string(&record.denomination)
            .map_err(|e| AppError::internal(format!("Failed to encode denomination: {e}")))?;

        Ok(companies::ActiveModel {
            cik: Set(record.identifier.clone()),
            primary_ticker: Set(Some(record.primary_ticker.clone())),
            secondary_securities: Set(Some(secondary)),
            denomination: Set(Some(denomination)),
        })
    }

    /// Convert SeaORM model to domain model
    fn model_to_domain(&self, model: companies::Model) -> CompanyRecord {
        let secondary_securities = match model.secondary_securities.as_deref() {
            None | Some("") => Vec::new(),
            Some(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Array(items)) => items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(ticker) => Some(ticker),
                        _ => None,
                    })
                    .collect(),
                Ok(Value::Null) => Vec::new(),
                Ok(_) | Err(_) => {
                    warn!(
                        "Company {} has an unreadable secondary_securities column, ignoring it",
                        model.cik
                    );
                    Vec::new()
                }
            },
        };

        let denomination = match model.denomination {
            None => Value::Null,
            Some(text) => serde_json::from_str(&text).unwrap_or_else(|_| {
                warn!(
                    "Company {} has a non-JSON denomination column, returning it as text",
                    model.cik
                );
                Value::String(text)
            }),
        };

        CompanyRecord {
            identifier: model.cik,
            primary_ticker: model.primary_ticker.unwrap_or_default(),
            secondary_securities,
            denomination,
        }
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use sea_orm::{ActiveModelTrait, DatabaseConnection};
    use serde_json::json;

    async fn store() -> (Database, CompanyStore) {
        let database = Database::new_in_memory().await.unwrap();
        database.migrate().await.unwrap();
        let store = database.company_store();
        (database, store)
    }

    async fn insert_raw(
        connection: &DatabaseConnection,
        cik: &str,
        primary: Option<&str>,
        secondary: Option<&str>,
        denomination: Option<&str>,
    ) {
        companies::ActiveModel {
            cik: Set(cik.to_string()),
            primary_ticker: Set(primary.map(str::to_string)),
            secondary_securities: Set(secondary.map(str::to_string)),
            denomination: Set(denomination.map(str::to_string)),
        }
        .insert(connection)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_replace_all_then_find_by_cik() {
        let (_db, store) = store().await;
        let apple = CompanyRecord::new("0000320193", "AAPL")
            .with_secondary_securities(["AAPL.W"])
            .with_denomination(json!({"currency": "USD"}));

        assert_eq!(store.replace_all(&[apple.clone()]).await.unwrap(), 1);
        assert_eq!(store.find_by_cik("0000320193").await.unwrap(), Some(apple));
        assert_eq!(store.find_by_cik("320193").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_replace_all_discards_previous_rows() {
        let (_db, store) = store().await;
        store
            .replace_all(&[CompanyRecord::new("1", "OLD")])
            .await
            .unwrap();
        store
            .replace_all(&[CompanyRecord::new("2", "NEW"), CompanyRecord::new("3", "")])
            .await
            .unwrap();

        let all = store.load_all().await.unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[tokio::test]
    async fn test_ticker_candidates_cover_primary_and_secondary() {
        let (_db, store) = store().await;
        store
            .replace_all(&[
                CompanyRecord::new("0001067983", "BRK.A").with_secondary_securities(["brk.b"]),
                CompanyRecord::new("0000320193", "aapl"),
            ])
            .await
            .unwrap();

        let by_primary = store.find_ticker_candidates("AaPl").await.unwrap();
        assert_eq!(by_primary.len(), 1);
        assert_eq!(by_primary[0].identifier, "0000320193");

        let by_secondary = store.find_ticker_candidates("BRK.B").await.unwrap();
        assert_eq!(by_secondary.len(), 1);
        assert_eq!(by_secondary[0].identifier, "0001067983");
    }

    #[tokio::test]
    async fn test_like_wildcards_are_escaped() {
        let (_db, store) = store().await;
        store
            .replace_all(&[CompanyRecord::new("1", "X").with_secondary_securities(["AB"])])
            .await
            .unwrap();

        assert!(store.find_ticker_candidates("%").await.unwrap().is_empty());
        assert!(store.find_ticker_candidates("A_").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_json_columns_decode_leniently() {
        let (db, store) = store().await;
        insert_raw(&db.connection, "1", None, Some("not json"), Some("USD")).await;
        insert_raw(&db.connection, "2", Some("TWO"), Some(r#"["T2", 5]"#), None).await;

        let first = store.find_by_cik("1").await.unwrap().unwrap();
        assert_eq!(first.primary_ticker, "");
        assert!(first.secondary_securities.is_empty());
        assert_eq!(first.denomination, json!("USD"));

        let second = store.find_by_cik("2").await.unwrap().unwrap();
        assert_eq!(second.secondary_securities, vec!["T2"]);
        assert_eq!(second.denomination, Value::Null);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("BRK.B"), "BRK.B");
        assert_eq!(escape_like("A_%\\"), "A\\_\\%\\\\");
    }
}
