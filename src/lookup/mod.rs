//! Lookup engines
//!
//! Every engine answers the same two questions. `Ok(None)` means "no such
//! company" and is an ordinary outcome; `Err` is reserved for failures while
//! reading the dataset.
//!
//! | Engine                 | Per-query cost                                  |
//! |------------------------|-------------------------------------------------|
//! | [`IndexedLookup`]      | O(1) hash lookups                               |
//! | [`DocumentScanLookup`] | decompress + parse + linear scan, O(n) per call |
//! | [`TableScanLookup`]    | one SQL query against `companies`               |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::errors::AppResult;
use crate::models::CompanyRecord;

pub mod indexed;
pub mod scan;
pub mod table;

pub use indexed::IndexedLookup;
pub use scan::DocumentScanLookup;
pub use table::TableScanLookup;

/// How the loaded dataset is queried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LookupStrategy {
    /// Build identifier and ticker indices once
    #[default]
    Indexed,
    /// Keep the source as-is and search it on every query
    Scan,
}

#[async_trait]
pub trait LookupEngine: Send + Sync {
    /// Short engine name for logs and `/health`
    fn name(&self) -> &'static str;

    /// Exact identifier match
    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<CompanyRecord>>;

    /// Case-insensitive match against primary and secondary tickers
    ///
    /// `None` when nothing matches; never `Some(vec![])`.
    async fn find_by_ticker(&self, ticker: &str) -> AppResult<Option<Vec<CompanyRecord>>>;
}

/// Collapse an empty match list into "not found"
pub(crate) fn non_empty(records: Vec<CompanyRecord>) -> Option<Vec<CompanyRecord>> {
    if records.is_empty() { None } else { Some(records) }
}
