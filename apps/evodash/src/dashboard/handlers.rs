//! # Dashboard Endpoint Handlers

use super::{AppState, page::render_page, types::HealthResponse};
use axum::{Json, extract::State, response::Html, response::IntoResponse};

// =============================================================================
// INDEX HANDLER
// =============================================================================

/// Serve the dashboard page.
pub async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    Html(render_page(&state.report, &state.source))
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}
