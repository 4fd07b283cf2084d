//! # models::trade
//!
//! Structs for the trade log the execution agent reports into, plus the two
//! row projections the dashboard reads back out.
//!
//! ## Why one table, two projections?
//! `TradeRecord` = full row as the EA reports it (open **or** closed)
//! `LivePosition` = open rows (`close_time IS NULL`), newest first
//! `ClosedTrade`  = closed rows (`close_time IS NOT NULL`), newest first
//!
//! Rows are append-only: an open→closed transition arrives as a *second*
//! row carrying the same ticket plus `close_time`/`close_price`/`profit`.
//! The ticket is an external MT4 identifier and is not an identity key.

use serde::{Deserialize, Serialize};

// ─── Direction ────────────────────────────────────────────────────────────────

/// Trade side / signal direction. Stored as lowercase TEXT (`buy` / `sell`),
/// matching the MT4 order-type strings on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

// ─── TradeRecord ──────────────────────────────────────────────────────────────

/// A trade row as reported by the execution agent via `POST /api/trades`.
///
/// `None` in `close_time` means the position is still open. The numeric
/// accounting fields default to 0 because the EA omits them on open reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    /// MT4 ticket number. External — not unique across terminal restarts.
    pub ticket: i64,
    pub symbol: String,
    /// `"type"` on the wire, mirroring the MT4 field name.
    #[serde(rename = "type")]
    pub side: Direction,
    #[serde(default)]
    pub lots: f64,
    #[serde(default)]
    pub open_price: f64,
    #[serde(default)]
    pub close_price: Option<f64>,
    #[serde(default)]
    pub profit: f64,
    #[serde(default)]
    pub swap: f64,
    #[serde(default)]
    pub commission: f64,
    #[serde(default)]
    pub open_time: Option<f64>,
    #[serde(default)]
    pub close_time: Option<f64>,
    #[serde(default)]
    pub sl: Option<f64>,
    #[serde(default)]
    pub tp: Option<f64>,
    #[serde(default)]
    pub comment: String,
}

impl TradeRecord {
    /// A position is open until a row with `close_time` arrives.
    pub fn is_open(&self) -> bool {
        self.close_time.is_none()
    }
}

// ─── Dashboard projections ────────────────────────────────────────────────────

/// An open position as shown on the dashboard's "live" panel.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct LivePosition {
    pub ticket: i64,
    pub symbol: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub side: Direction,
    pub lots: f64,
    pub open_price: f64,
    pub open_time: Option<f64>,
    pub sl: Option<f64>,
    pub tp: Option<f64>,
}

/// A closed trade as shown on the dashboard's "recent trades" panel and
/// folded into the daily metrics.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ClosedTrade {
    pub ticket: i64,
    pub symbol: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub side: Direction,
    pub lots: f64,
    pub open_price: f64,
    pub close_price: Option<f64>,
    pub profit: f64,
    pub open_time: Option<f64>,
    pub close_time: f64,
    pub sl: Option<f64>,
    pub tp: Option<f64>,
}
