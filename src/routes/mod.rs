use axum::routing::{get, post};
use axum::Router;

use crate::controllers::webhook_controller;
use crate::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(webhook_controller::get_health))
        .route("/health", get(webhook_controller::get_health))
        .route("/webhook", post(webhook_controller::post_webhook))
        .with_state(state)
}
