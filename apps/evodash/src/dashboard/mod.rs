//! # evodash Dashboard Module
//!
//! Local HTTP dashboard built on axum. The report is computed once before the
//! server starts; handlers only read it.
//!
//! ## Endpoints
//!
//! - `GET /` - Dashboard page (metric cards, bar chart, box plot, flow, table)
//! - `GET /health` - Health check

mod handlers;
mod page;
mod svg;
mod types;

pub use handlers::{health_handler, index_handler};
pub use page::render_page;
pub use types::HealthResponse;

use axum::{Router, routing::get};
use evodash_core::{EvodashError, Report};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared, read-only dashboard state.
#[derive(Clone)]
pub struct AppState {
    /// The report every view is drawn from.
    pub report: Arc<Report>,
    /// Data source label shown in the page header.
    pub source: Arc<str>,
}

impl AppState {
    /// Wrap a report for sharing with the handlers.
    #[must_use]
    pub fn new(report: Report, source: &str) -> Self {
        Self {
            report: Arc::new(report),
            source: Arc::from(source),
        }
    }
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and request tracing.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index_handler))
        .route("/health", get(handlers::health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the dashboard server and run until Ctrl+C.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), EvodashError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| EvodashError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("evodash dashboard listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| EvodashError::Io(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown requested"),
        Err(e) => {
            // Without a signal handler the server runs until killed.
            tracing::warn!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
