//! HTTP surface
//!
//! Two read-only lookup routes plus `/health`. Handlers only translate
//! between HTTP and [`CompanyLookupService`]; status codes are decided here
//! and nowhere else.

use anyhow::{Context, Result};
use axum::{Router, http::StatusCode, middleware::from_fn, response::Response, routing::get};
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};
use tracing::info;

use crate::config::WebConfig;
use crate::services::CompanyLookupService;

pub mod handlers;
pub mod middleware;
pub mod responses;

pub use responses::{ErrorDetail, not_found, ok, request_timeout};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CompanyLookupService>,
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(service: Arc<CompanyLookupService>) -> Self {
        Self {
            service,
            start_time: Utc::now(),
        }
    }
}

/// Build the application router
pub fn router(state: AppState, config: &WebConfig) -> Router {
    Router::new()
        .route("/cik/{id}", get(handlers::companies::get_company_by_cik))
        .route("/ticker/{symbol}", get(handlers::companies::get_companies_by_ticker))
        .route("/health", get(handlers::health::health_check))
        .fallback(route_not_found)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(from_fn(middleware::timeout_detail_middleware))
        .layer(from_fn(middleware::request_logging_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn route_not_found() -> Response {
    not_found("Not Found")
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: &WebConfig, service: Arc<CompanyLookupService>) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
        let app = router(AppState::new(service), config);
        Ok(Self { app, addr })
    }

    /// Serve until SIGINT/SIGTERM
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .with_context(|| format!("Failed to bind to {}", self.addr))?;
        info!("Listening on http://{}", self.addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Web server stopped");
        Ok(())
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
                    _ = sigint.recv() => info!("Received SIGINT (Ctrl+C), shutting down gracefully"),
                }
            }
            _ => {
                tracing::warn!("Failed to install signal handlers, falling back to Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl+C, shutting down gracefully");
    }
}
