//! # models::metrics
//!
//! [`MetricsSnapshot`] — the daily performance numbers shown at the top of
//! the dashboard. Always recomputed from storage as a whole, never
//! incrementally maintained, so a dropped cycle can't leave drift behind.

use serde::{Deserialize, Serialize};

/// Daily performance stats over trades closed since local midnight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Sum of profit over today's closed trades, rounded to cents.
    pub today_pnl: f64,
    /// Percentage of winners (0 when no trades yet today).
    pub win_rate: f64,
    pub wins: i64,
    pub total_trades: i64,
    pub signals_today: i64,
}

impl MetricsSnapshot {
    /// Folds a day's closed-trade profits into a snapshot. Pure — the
    /// storage round-trip lives in [`crate::metrics`].
    pub fn from_profits(profits: &[f64], signals_today: i64) -> Self {
        let total_trades = profits.len() as i64;
        let wins = profits.iter().filter(|p| **p > 0.0).count() as i64;
        let today_pnl: f64 = profits.iter().sum();

        let win_rate = if total_trades > 0 {
            (wins as f64 / total_trades as f64) * 100.0
        } else {
            0.0
        };

        Self {
            today_pnl: round2(today_pnl),
            win_rate: round2(win_rate),
            wins,
            total_trades,
            signals_today,
        }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
