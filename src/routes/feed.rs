//! # routes::feed
//!
//! Axum route handlers for the execution-agent side of the pipeline: tick
//! batches and trade reports coming in from the MT4 EA, signals coming in
//! from the generator service, and the signal poll the EA runs between
//! ticks.
//!
//! Payloads arrive as loose JSON and are deserialized explicitly so a
//! malformed body maps to the contract's 400 (axum's own rejection would
//! be a 422).

use axum::{extract::State, response::IntoResponse, Json};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::info;

use crate::{
    error::AppError,
    models::{epoch_now, Signal, Tick, TickBatch, TradeRecord},
    state::SharedState,
};

fn parse<T: DeserializeOwned>(payload: Value) -> Result<T, AppError> {
    serde_json::from_value(payload).map_err(|e| AppError::BadRequest(e.to_string()))
}

// ─── POST /api/ticks ──────────────────────────────────────────────────────────

/// Receives a tick batch from the EA: persist every tick as one
/// transaction, then swap the cache's tick buffer to the batch tail.
pub async fn receive_ticks(
    State(state): State<SharedState>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let batch: TickBatch = parse(payload)?;
    if batch.ticks.is_empty() {
        return Err(AppError::BadRequest("tick batch is empty".to_string()));
    }

    let now = epoch_now();
    let symbol = batch.symbol;
    let ticks: Vec<Tick> = batch
        .ticks
        .into_iter()
        .map(|t| t.resolve(&symbol, now))
        .collect();

    state
        .db
        .append_ticks(&ticks, &symbol)
        .await
        .map_err(AppError::Storage)?;

    let received = ticks.len();
    state.store_ticks(ticks).await;

    info!(count = received, symbol = %symbol, "Ticks ingested");
    Ok(Json(json!({
        "status":         "success",
        "ticks_received": received,
    })))
}

// ─── POST /api/trades ─────────────────────────────────────────────────────────

/// Logs one trade report. Cache is deliberately untouched — the dashboard's
/// positions/trades views refresh on the next publish cycle.
pub async fn log_trade(
    State(state): State<SharedState>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let trade: TradeRecord = parse(payload)?;

    state
        .db
        .append_trade(&trade)
        .await
        .map_err(AppError::Storage)?;

    info!(
        ticket = trade.ticket,
        symbol = %trade.symbol,
        open = trade.is_open(),
        "Trade logged"
    );
    Ok(Json(json!({ "status": "success" })))
}

// ─── POST /api/signals ────────────────────────────────────────────────────────

/// Receives a signal from the generator. Unlike trades, the cache slot is
/// replaced synchronously — the EA polls `/api/signals` expecting to see
/// the newest signal immediately.
pub async fn submit_signal(
    State(state): State<SharedState>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let signal: Signal = parse(payload)?;
    let signal = signal.stamped(epoch_now());

    state
        .db
        .append_signal(&signal)
        .await
        .map_err(AppError::Storage)?;

    state.set_latest_signal(signal.clone()).await;

    info!(symbol = %signal.symbol, direction = ?signal.direction, "Signal received");
    Ok(Json(json!({ "status": "success" })))
}

// ─── GET /api/signals ─────────────────────────────────────────────────────────

/// Serves the latest signal to the polling EA. Pure cache read — never
/// touches storage, so the poll stays cheap at tick frequency.
pub async fn serve_signal(State(state): State<SharedState>) -> impl IntoResponse {
    match state.latest_signal().await {
        Some(signal) => Json(json!(signal)),
        None => Json(json!({ "status": "no_signal" })),
    }
}
