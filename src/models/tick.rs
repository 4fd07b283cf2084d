//! # models::tick
//!
//! Defines [`TickBatch`], the raw market pulse the MT4 Expert Advisor POSTs
//! to `/api/ticks` in batches of up to a few hundred quotes.
//!
//! The EA's JSON is sparse — a quote may carry only `bid`/`ask` — so the
//! inbound shape ([`TickIn`]) keeps every field optional and is resolved
//! into a fully-populated [`Tick`] at the ingestion boundary.

use serde::{Deserialize, Serialize};

/// One inbound batch: `{"ticks": [...], "symbol": "EURUSD"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TickBatch {
    pub ticks: Vec<TickIn>,

    /// Symbol the whole batch belongs to.
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

pub(crate) fn default_symbol() -> String {
    "EURUSD".to_string()
}

/// A single tick as the EA sends it — every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TickIn {
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub bid: f64,
    #[serde(default)]
    pub ask: f64,
    #[serde(default)]
    pub spread: f64,
    #[serde(default)]
    pub volume: i64,
}

impl TickIn {
    /// Fills the absent fields, stamping `now` (epoch seconds) where the EA
    /// did not supply its own timestamp.
    pub fn resolve(self, symbol: &str, now: f64) -> Tick {
        Tick {
            timestamp: self.timestamp.unwrap_or(now),
            symbol: symbol.to_string(),
            bid: self.bid,
            ask: self.ask,
            spread: self.spread,
            volume: self.volume,
        }
    }
}

/// A fully-resolved tick — what gets persisted and cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Epoch seconds when the quote was recorded.
    pub timestamp: f64,
    pub symbol: String,
    pub bid: f64,
    pub ask: f64,
    /// Spread in points (ask − bid), as reported by the EA.
    pub spread: f64,
    pub volume: i64,
}
