//! HTTP routes.
//!
//! The non-WebSocket surface is liveness only.

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// Health probe body.
#[derive(Debug, Serialize)]
pub struct Health {
    pub ok: bool,
}

/// Create all HTTP routes.
pub fn routes() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

async fn root() -> &'static str {
    "rzutnik-engine OK"
}

async fn health() -> Json<Health> {
    Json(Health { ok: true })
}
