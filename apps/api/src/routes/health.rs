use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Liveness probe with service version.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": state.config.app_name,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now(),
    }))
}

/// GET /
/// Service information and endpoint map.
pub async fn root_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": state.config.app_name,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "active",
        "model": state.matcher.model(),
        "endpoints": {
            "match": "/match",
            "summary": "/match/summary",
            "health": "/health"
        }
    }))
}
