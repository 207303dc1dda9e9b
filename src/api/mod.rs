//! HTTP API — Axum server exposing sessions, rules, and analytics.
//!
//! CORS enabled for local tooling.

pub mod routes;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

pub use routes::{ApiState, AppState};

/// Start the API server.
///
/// This spawns a background task — it doesn't block.
pub fn spawn_api(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);

    tokio::spawn(async move {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        info!(port, "API server starting on http://localhost:{port}");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind API port");

        axum::serve(listener, app).await.expect("API server error");
    });

    Ok(())
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // Sessions
        .route("/api/sessions", post(routes::create_session))
        .route("/api/sessions/:id", get(routes::get_session))
        .route("/api/sessions/:id/spins", post(routes::record_spin))
        .route("/api/sessions/:id/spins/import", post(routes::import_spins))
        .route("/api/sessions/:id/bets", post(routes::record_bet))
        .route("/api/sessions/:id/suggestion", get(routes::get_suggestion))
        .route("/api/sessions/:id/health", get(routes::get_session_health))
        .route("/api/sessions/:id/stop", post(routes::stop_session))
        // Rules
        .route("/api/rules", get(routes::list_rules).post(routes::create_rule))
        .route(
            "/api/rules/:id",
            put(routes::update_rule).delete(routes::delete_rule),
        )
        .route("/api/rules/:id/toggle", post(routes::toggle_rule))
        // Liveness
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
