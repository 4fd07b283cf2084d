//! # routes::dashboard
//!
//! Endpoints for the monitoring frontend.
//!
//! | Method | Path                    | Description                            |
//! |--------|-------------------------|----------------------------------------|
//! | GET    | `/api/dashboard/data`   | One publish cycle, request/response    |
//! | GET    | `/api/dashboard/stream` | SSE: one frame per publish period      |
//! | GET    | `/api/health`           | Liveness + cache occupancy             |

use std::convert::Infallible;

use axum::{
    extract::State,
    response::{
        sse::{Event, Sse},
        IntoResponse,
    },
    Json,
};
use futures_util::Stream;
use serde_json::json;
use tracing::info;

use crate::{
    error::AppError,
    models::epoch_now,
    publisher,
    state::SharedState,
};

// ─── GET /api/dashboard/data ──────────────────────────────────────────────────

/// Runs one publish cycle synchronously — for consumers that prefer
/// request/response over a live subscription. Not coupled to any stream's
/// cadence.
pub async fn dashboard_data(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let frame = publisher::run_cycle(&state)
        .await
        .map_err(AppError::Storage)?;

    Ok(Json(json!({
        "metrics":        frame.metrics,
        "live_positions": frame.positions,
        "recent_trades":  frame.trades,
        "system_status":  state.system_status().await,
        "timestamp":      frame.timestamp,
    })))
}

// ─── GET /api/dashboard/stream ────────────────────────────────────────────────

/// Subscribes the client to the live feed: `data: <json>\n\n` per cycle.
/// Each subscriber gets its own publish loop; disconnecting drops only
/// that loop.
pub async fn dashboard_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("Dashboard stream subscriber connected");
    Sse::new(publisher::event_stream(state))
}

// ─── GET /api/health ──────────────────────────────────────────────────────────

pub async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    let overview = state.cache_overview().await;

    Json(json!({
        "status":        "healthy",
        "timestamp":     epoch_now(),
        "system_status": state.system_status().await,
        "cache":         overview,
    }))
}
