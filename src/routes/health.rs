use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::router::AppState;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = match state.db.ping().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!("Health check could not reach the database: {}", e);
            "unavailable"
        }
    };
    Json(json!({ "status": "ok", "database": database }))
}

pub async fn ping() -> &'static str {
    "pong"
}
