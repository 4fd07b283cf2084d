//! # publisher — Dashboard Publish Cycle
//!
//! One "cycle" is the unit of dashboard freshness: recompute metrics, fetch
//! the top-10 open positions and closed trades, publish all three into the
//! shared cache, and hand back a [`DashboardFrame`] for the wire.
//!
//! The SSE stream runs one cycle per period (default 1 s) per subscriber,
//! independent of ingestion timing. A failed cycle becomes an error frame
//! for that cycle only — the loop never terminates on its own; it ends when
//! the subscriber disconnects and the stream is dropped.

use std::convert::Infallible;

use axum::response::sse::Event;
use futures_util::{stream, Stream};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::metrics;
use crate::models::{epoch_now, ClosedTrade, LivePosition, MetricsSnapshot};
use crate::state::SharedState;

/// Rows shown per dashboard panel.
const PANEL_LIMIT: i64 = 10;

/// One consolidated dashboard message.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardFrame {
    pub metrics: MetricsSnapshot,
    pub positions: Vec<LivePosition>,
    pub trades: Vec<ClosedTrade>,
    pub timestamp: f64,
}

/// Runs one publish cycle: query first, then publish under the cache lock.
///
/// Metrics degrade to the cached snapshot internally; a positions/trades
/// query failure fails the whole cycle and leaves the cache untouched.
pub async fn run_cycle(state: &SharedState) -> anyhow::Result<DashboardFrame> {
    let metrics = metrics::refresh(state).await;
    let positions = state.db.open_positions(PANEL_LIMIT).await?;
    let trades = state.db.closed_trades(PANEL_LIMIT).await?;

    state
        .publish(metrics, positions.clone(), trades.clone())
        .await;

    Ok(DashboardFrame {
        metrics,
        positions,
        trades,
        timestamp: epoch_now(),
    })
}

/// The per-subscriber SSE stream: one frame per period, first frame
/// immediately on connect. Dropping the stream cancels only this
/// subscriber's loop.
pub fn event_stream(state: SharedState) -> impl Stream<Item = Result<Event, Infallible>> {
    let interval = tokio::time::interval(state.stream_interval);

    stream::unfold((state, interval), |(state, mut interval)| async move {
        interval.tick().await;

        let event = match run_cycle(&state).await {
            Ok(frame) => Event::default().json_data(&frame).unwrap_or_else(|e| {
                error!(error = %e, "Dashboard frame serialization failed");
                Event::default().data(json!({ "error": e.to_string() }).to_string())
            }),
            Err(e) => {
                error!(error = %e, "Dashboard publish cycle failed");
                Event::default().data(json!({ "error": e.to_string() }).to_string())
            }
        };

        Some((Ok(event), (state, interval)))
    })
}
