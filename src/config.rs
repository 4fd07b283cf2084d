//! # config
//!
//! Environment-driven configuration, loaded once at startup.
//!
//! | Variable             | Default                       |
//! |----------------------|-------------------------------|
//! | `BIND_ADDR`          | `0.0.0.0:5000`                |
//! | `DATABASE_URL`       | `sqlite://trading_system.db`  |
//! | `STREAM_INTERVAL_MS` | `1000`                        |

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    /// Streaming Publisher period.
    pub stream_interval: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:5000".to_string())
            .parse()
            .context("BIND_ADDR is not a valid socket address")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://trading_system.db".to_string());

        let stream_interval = Duration::from_millis(env_u64("STREAM_INTERVAL_MS", 1000));

        Ok(Self {
            bind_addr,
            database_url,
            stream_interval,
        })
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
