//! Liveness handler.

use axum::Json;
use serde_json::json;

/// Plain liveness probe; no authentication and no database access.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
