//! JSON document decoding shared by the indexed and scanning engines

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::errors::{SourceError, SourceResult};
use crate::models::{CompanyRecord, normalize_ticker};
use crate::utils::DecompressionService;

/// How the top-level keys of a dataset document are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentLayout {
    /// `{"<cik>": {"primary_ticker": .., "secondary_securities": [..], "denomination": ..}}`
    #[default]
    ByIdentifier,
    /// `{"<ticker>": {"cik": .., "secondary_securities": [..], "denomination": ..}}`
    ByTicker,
}

/// Decompress (if needed) and parse a raw dataset payload into its top-level object
pub fn decode_document(raw: &[u8], layout: DocumentLayout) -> SourceResult<Map<String, Value>> {
    let payload = DecompressionService::decompress(raw)?;
    match serde_json::from_slice::<Value>(&payload)? {
        Value::Object(entries) => Ok(entries),
        _ => Err(SourceError::Shape {
            expected: match layout {
                DocumentLayout::ByIdentifier => "identifier",
                DocumentLayout::ByTicker => "ticker",
            },
        }),
    }
}

/// Turn one `key -> value` entry of the document into a record
///
/// `None` means the entry is unusable (not an object, or a ticker-keyed entry
/// without a CIK) and should be skipped.
pub fn record_from_entry(layout: DocumentLayout, key: &str, value: &Value) -> Option<CompanyRecord> {
    match layout {
        DocumentLayout::ByIdentifier => CompanyRecord::from_json_entry(key, value),
        DocumentLayout::ByTicker => {
            let identifier = value
                .get("cik")
                .or_else(|| value.get("identifier"))
                .and_then(identifier_as_string)?;
            let mut record = CompanyRecord::from_json_entry(identifier, value)?;
            if record.primary_ticker.is_empty() {
                record.primary_ticker = key.to_string();
            } else if !record
                .tickers()
                .any(|ticker| normalize_ticker(ticker) == normalize_ticker(key))
            {
                record.secondary_securities.push(key.to_string());
            }
            Some(record)
        }
    }
}

// SEC files carry the CIK either as a zero-padded string or as a bare number
fn identifier_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_rejects_non_object_documents() {
        let err = decode_document(b"[1, 2, 3]", DocumentLayout::ByIdentifier).unwrap_err();
        assert!(matches!(err, SourceError::Shape { expected: "identifier" }));

        let err = decode_document(b"{not json", DocumentLayout::ByTicker).unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }

    #[test]
    fn test_decode_preserves_document_order() {
        let entries = decode_document(
            br#"{"0000000003": {}, "0000000001": {}, "0000000002": {}}"#,
            DocumentLayout::ByIdentifier,
        )
        .unwrap();
        let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["0000000003", "0000000001", "0000000002"]);
    }

    #[test]
    fn test_ticker_keyed_entry_defaults_primary_to_key() {
        let record = record_from_entry(
            DocumentLayout::ByTicker,
            "AAPL",
            &json!({"cik": "0000320193", "denomination": {"currency": "USD"}}),
        )
        .unwrap();
        assert_eq!(record.identifier, "0000320193");
        assert_eq!(record.primary_ticker, "AAPL");
    }

    #[test]
    fn test_ticker_keyed_entry_keeps_key_as_alias() {
        let record = record_from_entry(
            DocumentLayout::ByTicker,
            "BRK-B",
            &json!({"cik": 1067983, "primary_ticker": "BRK.A"}),
        )
        .unwrap();
        assert_eq!(record.identifier, "1067983");
        assert_eq!(record.primary_ticker, "BRK.A");
        assert_eq!(record.secondary_securities, vec!["BRK-B"]);
    }

    #[test]
    fn test_ticker_keyed_alias_matches_like_the_index() {
        let record = record_from_entry(
            DocumentLayout::ByTicker,
            "äbc",
            &json!({"cik": "0000000042", "primary_ticker": "ÄBC"}),
        )
        .unwrap();
        assert_eq!(record.primary_ticker, "ÄBC");
        assert!(record.secondary_securities.is_empty());
    }

    #[test]
    fn test_ticker_keyed_entry_without_cik_is_skipped() {
        assert!(record_from_entry(DocumentLayout::ByTicker, "ZZZZ", &json!({})).is_none());
    }
}
