use axum::Json;
use serde_json::{json, Value};

/// Plain-text liveness banner
pub async fn root() -> &'static str {
    "Item photo server is running"
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
