//! Error type definitions for the EDGAR lookup service

use thiserror::Error;

/// Top-level application error type
///
/// "Not found" is deliberately absent: a missing CIK or ticker is an
/// expected outcome and is modelled as `Ok(None)` by the lookup layer.
#[derive(Error, Debug)]
pub enum AppError {
    /// Dataset could not be fetched or decoded (retryable)
    #[error("{0}")]
    Source(#[from] SourceError),

    /// Database-related errors (SeaORM)
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Dataset source specific errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Local dataset file could not be read
    #[error("Failed to read dataset file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Transport-level HTTP failure (connect, timeout, body read)
    #[error("Dataset download from {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Remote host answered with a non-success status
    #[error("Dataset download from {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Compressed payload was corrupt or truncated
    #[error("Failed to decompress dataset: {message}")]
    Decompress { message: String },

    /// Payload was not valid JSON
    #[error("Failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),

    /// Payload was valid JSON but not an object keyed by identifier or ticker
    #[error("Dataset document must be a JSON object keyed by {expected}")]
    Shape { expected: &'static str },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether retrying the same request later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Source(_) | Self::Database(_))
    }
}

impl SourceError {
    pub fn decompress<S: Into<String>>(message: S) -> Self {
        Self::Decompress {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_errors_are_retryable() {
        let err: AppError = SourceError::Status {
            url: "https://example.com/companies.json.gz".to_string(),
            status: 503,
        }
        .into();
        assert!(err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Dataset download from https://example.com/companies.json.gz returned HTTP 503"
        );
    }

    #[test]
    fn test_configuration_errors_are_not_retryable() {
        let err = AppError::configuration("dataset.url is required");
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Configuration error: dataset.url is required");
    }
}
