//! # state
//!
//! `AppState` — the process-wide cache every handler and publisher cycle
//! reads through, plus the storage handle.
//!
//! One coarse `Mutex` guards the whole [`DashboardCache`]: update traffic is
//! a few writes per second at most, so contention is a non-issue and a
//! single lock keeps multi-field publishes atomic. Every accessor takes the
//! lock for a short scope and never awaits I/O while holding it — storage
//! queries finish *before* results are published into the cache.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::db::Db;
use crate::models::{ClosedTrade, LivePosition, MetricsSnapshot, Signal, Tick};

/// How many of the newest ticks the cache retains per batch.
pub const TICK_CACHE_SIZE: usize = 100;

// ─── SystemStatus ─────────────────────────────────────────────────────────────

/// Coarse process lifecycle indicator surfaced on `/api/health` and the
/// dashboard snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemStatus {
    #[default]
    Initializing,
    Running,
}

// ─── Cache ────────────────────────────────────────────────────────────────────

/// Everything the dashboard and the polling EA read without touching
/// storage. Each field is a copy of durably stored data as of its last
/// refresh; none of them is a source of truth.
#[derive(Debug, Default)]
struct DashboardCache {
    latest_ticks: Vec<Tick>,
    latest_signal: Option<Signal>,
    metrics: MetricsSnapshot,
    live_positions: Vec<LivePosition>,
    recent_trades: Vec<ClosedTrade>,
    system_status: SystemStatus,
}

/// Point-in-time cache occupancy, reported by `/api/health`.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct CacheOverview {
    pub cached_ticks: usize,
    pub live_positions: usize,
    pub recent_trades: usize,
    pub has_signal: bool,
}

// ─── AppState ─────────────────────────────────────────────────────────────────

/// Top-level shared state injected into every Axum handler.
pub struct AppState {
    pub db: Db,
    cache: Mutex<DashboardCache>,
    /// Streaming Publisher period (default 1 s).
    pub stream_interval: Duration,
}

impl AppState {
    pub fn new(db: Db, stream_interval: Duration) -> Self {
        Self {
            db,
            cache: Mutex::new(DashboardCache::default()),
            stream_interval,
        }
    }

    // ── Tick buffer ──────────────────────────────────────────────────────────

    /// Replaces the tick buffer with the last [`TICK_CACHE_SIZE`] entries of
    /// `batch`. Batch-local truncation — prior cache contents are dropped,
    /// older ticks stay durable in storage.
    pub async fn store_ticks(&self, mut batch: Vec<Tick>) {
        if batch.len() > TICK_CACHE_SIZE {
            batch.drain(..batch.len() - TICK_CACHE_SIZE);
        }
        let mut cache = self.cache.lock().await;
        cache.latest_ticks = batch;
    }

    pub async fn cached_ticks(&self) -> Vec<Tick> {
        self.cache.lock().await.latest_ticks.clone()
    }

    // ── Latest signal ────────────────────────────────────────────────────────

    /// Replaces the latest-signal slot. Synchronous with signal ingestion so
    /// the polling EA sees a new signal immediately.
    pub async fn set_latest_signal(&self, signal: Signal) {
        let mut cache = self.cache.lock().await;
        cache.latest_signal = Some(signal);
    }

    pub async fn latest_signal(&self) -> Option<Signal> {
        self.cache.lock().await.latest_signal.clone()
    }

    // ── Publish cycle ────────────────────────────────────────────────────────

    /// Writes one cycle's results in a single critical section, so no reader
    /// can see metrics from one cycle next to positions from another.
    pub async fn publish(
        &self,
        metrics: MetricsSnapshot,
        positions: Vec<LivePosition>,
        trades: Vec<ClosedTrade>,
    ) {
        let mut cache = self.cache.lock().await;
        cache.metrics = metrics;
        cache.live_positions = positions;
        cache.recent_trades = trades;
    }

    /// The metrics of the last completed cycle — the aggregator's fallback
    /// when storage is unreachable.
    pub async fn cached_metrics(&self) -> MetricsSnapshot {
        self.cache.lock().await.metrics
    }

    /// Occupancy counters for the health endpoint — one lock scope so the
    /// numbers are from a single point in time.
    pub async fn cache_overview(&self) -> CacheOverview {
        let cache = self.cache.lock().await;
        CacheOverview {
            cached_ticks: cache.latest_ticks.len(),
            live_positions: cache.live_positions.len(),
            recent_trades: cache.recent_trades.len(),
            has_signal: cache.latest_signal.is_some(),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    pub async fn set_system_status(&self, status: SystemStatus) {
        let mut cache = self.cache.lock().await;
        cache.system_status = status;
    }

    pub async fn system_status(&self) -> SystemStatus {
        self.cache.lock().await.system_status
    }
}

/// Convenience type alias
pub type SharedState = Arc<AppState>;

pub fn build_state(db: Db, stream_interval: Duration) -> SharedState {
    Arc::new(AppState::new(db, stream_interval))
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;

    async fn make_state() -> SharedState {
        let db = Db::in_memory().await.unwrap();
        build_state(db, Duration::from_secs(1))
    }

    fn make_tick(i: usize) -> Tick {
        Tick {
            timestamp: i as f64,
            symbol: "EURUSD".to_string(),
            bid: 1.1,
            ask: 1.1002,
            spread: 2.0,
            volume: 1,
        }
    }

    fn make_signal(ts: f64) -> Signal {
        Signal {
            symbol: "EURUSD".to_string(),
            direction: Direction::Buy,
            confidence: 0.8,
            entry_price: 1.1,
            sl: 1.09,
            tp: 1.11,
            timestamp: Some(ts),
            executed: false,
        }
    }

    #[tokio::test]
    async fn oversized_batch_keeps_only_the_tail() {
        let state = make_state().await;
        state.store_ticks((0..150).map(make_tick).collect()).await;

        let cached = state.cached_ticks().await;
        assert_eq!(cached.len(), TICK_CACHE_SIZE);
        assert_eq!(cached[0].timestamp, 50.0);
        assert_eq!(cached[99].timestamp, 149.0);
    }

    #[tokio::test]
    async fn small_batch_replaces_rather_than_merges() {
        let state = make_state().await;
        state.store_ticks((0..80).map(make_tick).collect()).await;
        state.store_ticks((200..205).map(make_tick).collect()).await;

        let cached = state.cached_ticks().await;
        assert_eq!(cached.len(), 5);
        assert_eq!(cached[0].timestamp, 200.0);
    }

    #[tokio::test]
    async fn latest_signal_starts_empty_then_holds_newest() {
        let state = make_state().await;
        assert!(state.latest_signal().await.is_none());

        state.set_latest_signal(make_signal(1.0)).await;
        state.set_latest_signal(make_signal(2.0)).await;
        assert_eq!(state.latest_signal().await.unwrap().timestamp, Some(2.0));
    }

    #[tokio::test]
    async fn concurrent_signal_writes_never_mix_fields() {
        let state = make_state().await;

        let mut handles = Vec::new();
        for i in 0..32 {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                let mut signal = make_signal(i as f64);
                signal.confidence = i as f64; // confidence must match timestamp
                state.set_latest_signal(signal).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Whichever write landed last, the slot holds one coherent signal.
        let signal = state.latest_signal().await.unwrap();
        assert_eq!(Some(signal.confidence), signal.timestamp);
    }

    #[tokio::test]
    async fn publish_overwrites_all_three_views_atomically() {
        let state = make_state().await;
        let metrics = MetricsSnapshot::from_profits(&[5.0, -1.0], 3);

        state.publish(metrics, Vec::new(), Vec::new()).await;
        assert_eq!(state.cached_metrics().await, metrics);
    }

    #[tokio::test]
    async fn status_transitions_to_running() {
        let state = make_state().await;
        assert_eq!(state.system_status().await, SystemStatus::Initializing);

        state.set_system_status(SystemStatus::Running).await;
        assert_eq!(state.system_status().await, SystemStatus::Running);
    }
}
