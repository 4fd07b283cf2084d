//! # models::signal
//!
//! [`Signal`] — one trading instruction from the signal-generator service,
//! served back verbatim to the polling EA via `GET /api/signals`.

use serde::{Deserialize, Serialize};

use crate::models::tick::default_symbol;
use crate::models::Direction;

/// A trading signal. `direction` is the only required inbound field; price
/// levels default to 0 and the timestamp is stamped at ingest when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    pub direction: Direction,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub entry_price: f64,
    #[serde(default)]
    pub sl: f64,
    #[serde(default)]
    pub tp: f64,
    #[serde(default)]
    pub timestamp: Option<f64>,
    /// Set by the EA once it acts on the signal. Always false on ingest.
    #[serde(default)]
    pub executed: bool,
}

impl Signal {
    /// Stamps the ingest time if the generator did not supply its own.
    pub fn stamped(mut self, now: f64) -> Self {
        if self.timestamp.is_none() {
            self.timestamp = Some(now);
        }
        self
    }
}
