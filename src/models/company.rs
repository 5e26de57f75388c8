//! Company record model
//!
//! A record is what both endpoints return. Its identifier is the CIK string
//! exactly as it appears in the dataset (zero-padding included); tickers are
//! stored as given and only normalised when they are used as lookup keys.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One company entry of the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Central Index Key, compared byte-for-byte
    #[serde(alias = "cik")]
    pub identifier: String,
    /// Main trading symbol, empty when the company has none
    #[serde(default)]
    pub primary_ticker: String,
    /// Alternate symbols (share classes, warrants, units)
    #[serde(default)]
    pub secondary_securities: Vec<String>,
    /// Currency/unit metadata, passed through untouched
    #[serde(default)]
    pub denomination: Value,
}

impl CompanyRecord {
    pub fn new(identifier: impl Into<String>, primary_ticker: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            primary_ticker: primary_ticker.into(),
            secondary_securities: Vec::new(),
            denomination: Value::Null,
        }
    }

    pub fn with_secondary_securities<I, S>(mut self, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.secondary_securities = tickers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_denomination(mut self, denomination: Value) -> Self {
        self.denomination = denomination;
        self
    }

    /// Build a record from a loosely-typed JSON object
    ///
    /// Missing or wrongly typed `primary_ticker` / `secondary_securities`
    /// become empty; non-string secondary entries are dropped. Returns `None`
    /// when `value` is not an object at all.
    pub fn from_json_entry(identifier: impl Into<String>, value: &Value) -> Option<Self> {
        let fields = value.as_object()?;

        let primary_ticker = fields
            .get("primary_ticker")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let secondary_securities = fields
            .get("secondary_securities")
            .and_then(Value::as_array)
            .map(|tickers| {
                tickers
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let denomination = fields.get("denomination").cloned().unwrap_or(Value::Null);

        Some(Self {
            identifier: identifier.into(),
            primary_ticker,
            secondary_securities,
            denomination,
        })
    }

    /// Primary ticker (if any) followed by every non-empty secondary ticker
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary_ticker.as_str())
            .chain(self.secondary_securities.iter().map(String::as_str))
            .filter(|ticker| !ticker.is_empty())
    }

    /// Case-insensitive ticker match; `normalized` must already be uppercased
    pub fn has_ticker(&self, normalized: &str) -> bool {
        self.tickers()
            .any(|ticker| normalize_ticker(ticker) == normalized)
    }
}

/// Canonical form of a ticker used for index and cache keys
pub fn normalize_ticker(ticker: &str) -> String {
    ticker.to_uppercase()
}
