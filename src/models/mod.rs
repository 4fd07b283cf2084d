//! Domain models shared across the entire tickhub system.

pub mod metrics;
pub mod signal;
pub mod tick;
pub mod trade;

pub use metrics::MetricsSnapshot;
pub use signal::Signal;
pub use tick::{Tick, TickBatch, TickIn};
pub use trade::{ClosedTrade, Direction, LivePosition, TradeRecord};

/// Current wall-clock time as epoch seconds with sub-second precision —
/// the timestamp format the MT4 EA uses everywhere on the wire.
pub fn epoch_now() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
