use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version. No remote calls.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "reportwriter"
    }))
}

/// GET /api/v1/status
/// Probes the completion provider once and reports whether it answered.
pub async fn api_status_handler(State(state): State<AppState>) -> Json<Value> {
    let status = state.completer.check_status().await;
    Json(json!({
        "healthy": status.healthy,
        "message": status.message,
        "provider": state.config.openai_base_url,
    }))
}
