//! # metrics — Daily Performance Aggregator
//!
//! Recomputes the dashboard's [`MetricsSnapshot`] over everything closed
//! since local midnight. The window is re-derived on every call, so the
//! numbers roll over naturally at 00:00 without any reset bookkeeping.
//!
//! Failure policy: a storage fault here must never take the dashboard down.
//! On a failed query the previous cached snapshot is returned unchanged —
//! one cycle of staleness instead of an outage.

use chrono::{DateTime, Local, NaiveTime};
use tracing::error;

use crate::models::MetricsSnapshot;
use crate::state::AppState;

/// Recomputes today's metrics from storage, falling back to the cached
/// snapshot if either query fails.
pub async fn refresh(state: &AppState) -> MetricsSnapshot {
    let since = today_start(Local::now());

    let trades = match state.db.trades_closed_since(since).await {
        Ok(trades) => trades,
        Err(e) => {
            error!(error = %e, "Metrics query failed, serving cached snapshot");
            return state.cached_metrics().await;
        }
    };

    let signals_today = match state.db.signals_since(since).await {
        Ok(count) => count,
        Err(e) => {
            error!(error = %e, "Signal count failed, serving cached snapshot");
            return state.cached_metrics().await;
        }
    };

    let profits: Vec<f64> = trades.iter().map(|t| t.profit).collect();
    MetricsSnapshot::from_profits(&profits, signals_today)
}

/// Local midnight of `now` as epoch seconds. An ambiguous midnight (DST
/// transition) falls back to `now`, yielding one empty window rather than
/// a panic.
fn today_start(now: DateTime<Local>) -> f64 {
    now.with_time(NaiveTime::MIN)
        .single()
        .unwrap_or(now)
        .timestamp() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::db::Db;
    use crate::models::{epoch_now, Signal, TradeRecord};
    use crate::state::build_state;

    fn closed_today(ticket: i64, profit: f64) -> TradeRecord {
        let now = epoch_now();
        serde_json::from_value(serde_json::json!({
            "ticket": ticket,
            "symbol": "EURUSD",
            "type": "buy",
            "open_time": now - 60.0,
            "close_time": now,
            "close_price": 1.1010,
            "profit": profit,
        }))
        .unwrap()
    }

    #[test]
    fn window_starts_at_local_midnight() {
        let now = Local::now();
        let start = today_start(now);

        assert!(start <= now.timestamp() as f64);
        // Midnight is never more than 24h behind.
        assert!(now.timestamp() as f64 - start < 86_400.0 + 3_600.0);
    }

    #[tokio::test]
    async fn aggregates_todays_closed_trades_and_signals() {
        let db = Db::in_memory().await.unwrap();
        let state = build_state(db, Duration::from_secs(1));

        state.db.append_trade(&closed_today(1, 5.25)).await.unwrap();
        state.db.append_trade(&closed_today(2, -2.0)).await.unwrap();
        let signal: Signal = serde_json::from_str(r#"{"direction": "buy"}"#).unwrap();
        state
            .db
            .append_signal(&signal.stamped(epoch_now()))
            .await
            .unwrap();

        let metrics = refresh(&state).await;
        assert_eq!(metrics.total_trades, 2);
        assert_eq!(metrics.wins, 1);
        assert_eq!(metrics.today_pnl, 3.25);
        assert_eq!(metrics.win_rate, 50.0);
        assert_eq!(metrics.signals_today, 1);
    }

    #[tokio::test]
    async fn storage_failure_serves_previous_snapshot() {
        let db = Db::in_memory().await.unwrap();
        let state = build_state(db, Duration::from_secs(1));

        let previous = MetricsSnapshot::from_profits(&[9.0], 4);
        state.publish(previous, Vec::new(), Vec::new()).await;

        state.db.close().await;
        assert_eq!(refresh(&state).await, previous);
    }

    #[tokio::test]
    async fn open_positions_do_not_count() {
        let db = Db::in_memory().await.unwrap();
        let state = build_state(db, Duration::from_secs(1));

        let open: TradeRecord = serde_json::from_value(serde_json::json!({
            "ticket": 1,
            "symbol": "EURUSD",
            "type": "buy",
            "open_price": 1.1000,
            "open_time": epoch_now(),
        }))
        .unwrap();
        state.db.append_trade(&open).await.unwrap();

        let metrics = refresh(&state).await;
        assert_eq!(metrics.total_trades, 0);
        assert_eq!(metrics.win_rate, 0.0);
    }
}
