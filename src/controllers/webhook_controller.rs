use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::services::{commands, telegram::Update};
use crate::AppState;

/// POST /webhook — one transport push, one command. Always acknowledges so
/// the transport does not re-deliver; failures are logged inside the
/// command pipeline.
pub async fn post_webhook(State(state): State<AppState>, Json(update): Json<Update>) -> impl IntoResponse {
    tracing::debug!(update_id = update.update_id, "webhook update received");

    commands::handle_update(&state, update).await;

    Json(json!({ "success": true }))
}

// GET / and GET /health
pub async fn get_health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
