//! Shared fixtures for integration tests
#![allow(dead_code)]

use axum_test::TestServer;
use edgar_lookup::{
    config::Config,
    dataset::DocumentLayout,
    lookup::LookupStrategy,
    services::CompanyLookupService,
    sources::DatasetSourceKind,
    web::{AppState, router},
};
use flate2::{Compression, write::GzEncoder};
use serde_json::{Value, json};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Single-company dataset used by the end-to-end scenario
pub fn apple_document() -> Value {
    json!({
        "0000320193": {
            "primary_ticker": "AAPL",
            "secondary_securities": ["AAPL.W"],
            "denomination": {"currency": "USD"}
        }
    })
}

/// Identifier-keyed dataset with share classes, a ticker collision and a
/// company without a primary ticker
pub fn sample_document() -> Value {
    json!({
        "0000320193": {"primary_ticker": "AAPL", "secondary_securities": ["AAPL.W"], "denomination": {"currency": "USD"}},
        "0000789019": {"primary_ticker": "MSFT", "secondary_securities": [], "denomination": {"currency": "USD"}},
        "0001067983": {"primary_ticker": "BRK.A", "secondary_securities": ["BRK.B"], "denomination": {"currency": "USD", "unit": "shares"}},
        "0000000001": {"primary_ticker": "DUP", "secondary_securities": ["Shared"]},
        "0000000002": {"primary_ticker": "", "secondary_securities": ["dup", "", 7]},
        "0000000003": {"denomination": null}
    })
}

pub fn gzip(document: &Value) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(document.to_string().as_bytes()).unwrap();
    encoder.finish().unwrap()
}

pub fn write_gzip(dir: &Path, name: &str, document: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, gzip(document)).unwrap();
    path
}

pub fn file_config(path: &Path, layout: DocumentLayout, strategy: LookupStrategy) -> Config {
    let mut config = Config::default();
    config.dataset.source = DatasetSourceKind::File;
    config.dataset.path = path.to_path_buf();
    config.dataset.layout = layout;
    config.lookup.strategy = strategy;
    config
}

pub async fn service_for(config: &Config) -> Arc<CompanyLookupService> {
    Arc::new(CompanyLookupService::from_config(config).await.unwrap())
}

pub async fn test_server(config: &Config) -> (TestServer, Arc<CompanyLookupService>) {
    let service = service_for(config).await;
    let app = router(AppState::new(service.clone()), &config.web);
    (TestServer::new(app).unwrap(), service)
}
