//! Rzutnik Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rzutnik_engine::infrastructure::ThreadRngDice;
use rzutnik_engine::{api, App};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rzutnik_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Rzutnik Engine");

    // Load configuration
    let server_host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let server_port: u16 = std::env::var("SERVER_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "3001".into())
        .parse()
        .unwrap_or(3001);

    // Create application
    let app = Arc::new(App::new(Arc::new(ThreadRngDice)));

    // Build router
    let router = api::http::routes()
        .route("/ws", get(api::websocket::ws_handler).with_state(app))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer_from_env());

    // Start server
    let addr: SocketAddr = format!("{server_host}:{server_port}").parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

/// Build the CORS layer from `ALLOWED_ORIGIN` (comma-separated origins).
/// Unset, empty or `*` means any origin - the table is open by default.
fn build_cors_layer_from_env() -> CorsLayer {
    let cors = CorsLayer::new().allow_methods([Method::GET, Method::POST]);

    let allowed = std::env::var("ALLOWED_ORIGIN")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "*");

    let Some(allowed) = allowed else {
        return cors.allow_origin(Any);
    };

    let origins: Vec<HeaderValue> = allowed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    cors.allow_origin(origins)
}
