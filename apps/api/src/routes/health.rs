use serde_json::{json, Value};

use crate::extract::Json;

/// GET /health
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "opsdesk-api"
    }))
}
