//! HTTP surface. Route handlers grouped by consumer: `feed` for the EA and
//! the signal generator, `dashboard` for the monitoring frontend.

pub mod dashboard;
pub mod feed;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::SharedState;

/// Builds the full application router. Middleware (CORS / trace layers) is
/// attached in `main`; tests drive this router directly.
pub fn router(state: SharedState) -> Router {
    Router::new()
        // ── EA Feed ───────────────────────────────────────────────────────────
        .route("/api/ticks",            post(feed::receive_ticks))
        .route("/api/trades",           post(feed::log_trade))
        .route("/api/signals",          post(feed::submit_signal))
        .route("/api/signals",          get(feed::serve_signal))
        // ── Dashboard ─────────────────────────────────────────────────────────
        .route("/api/dashboard/data",   get(dashboard::dashboard_data))
        .route("/api/dashboard/stream", get(dashboard::dashboard_stream))
        .route("/api/health",           get(dashboard::health_check))
        .with_state(state)
}
