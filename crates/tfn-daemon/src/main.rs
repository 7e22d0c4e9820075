//! tfn-daemon entry point.
//!
//! This file is intentionally thin: it sets up tracing, reads settings,
//! builds the shared state (Postgres-backed or in-memory demo), wires
//! middleware, and starts the HTTP server.  All route handlers live in
//! `routes.rs`; all shared state types live in `state.rs`.

use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tfn_daemon::{routes, state};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env.local if present (dev convenience).
    // Silent if the file does not exist — production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let settings = tfn_config::Settings::from_env()?;

    let shared = match settings.database_url.as_deref() {
        Some(url) => {
            let pool = tfn_db::connect(url).await?;
            tfn_db::migrate(&pool).await?;
            info!("postgres backend ready, migrations applied");
            Arc::new(state::AppState::postgres(pool, settings.pricing))
        }
        None => {
            info!(
                "no {} set; serving the in-memory demo world",
                tfn_db::ENV_DB_URL
            );
            Arc::new(state::AppState::demo(settings.pricing))
        }
    };

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_localhost_only());

    let addr = settings.daemon_addr;
    info!("tfn-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

/// CORS: allow only localhost origins.
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
    ];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any)
}
