//! # db — SQLite Storage Layer
//!
//! The narrow Store Adapter the rest of the system writes through and the
//! publisher queries. Uses `sqlx` with runtime-bound queries — the schema
//! is embedded and applied idempotently at startup.
//!
//! Tables mirror what the EA reports: `ticks_raw`, `trades`, `signals`.
//! Trade rows are append-only; the open→closed transition for a ticket is a
//! second row, and the dashboard queries split the table by `close_time`.

use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::models::{ClosedTrade, LivePosition, Signal, Tick, TradeRecord};

/// Shared handle to the SQLite pool. Cheap to clone.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Opens (creating if missing) the database at `url` and applies the
    /// embedded schema.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        info!(url, "Connecting to SQLite...");

        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid DATABASE_URL: {url}"))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to open SQLite database")?;

        apply_schema(&pool).await?;

        info!("SQLite ready, schema applied");
        Ok(Self { pool })
    }

    /// In-memory database for tests. A single connection so every query
    /// sees the same memory instance.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory SQLite database")?;

        apply_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Closes the pool, failing every subsequent query. Test-only hook for
    /// exercising the degraded-storage paths.
    #[cfg(test)]
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ─── Appends ──────────────────────────────────────────────────────────────

    /// Persists a resolved tick batch as one transaction.
    pub async fn append_ticks(&self, ticks: &[Tick], symbol: &str) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await.context("begin tick batch")?;

        for tick in ticks {
            sqlx::query(
                r#"
                INSERT INTO ticks_raw (timestamp, symbol, bid, ask, spread, volume)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(tick.timestamp)
            .bind(symbol)
            .bind(tick.bid)
            .bind(tick.ask)
            .bind(tick.spread)
            .bind(tick.volume)
            .execute(&mut *tx)
            .await
            .context("append_ticks insert failed")?;
        }

        tx.commit().await.context("commit tick batch")?;
        Ok(())
    }

    /// Inserts one trade row. Always an insert — see module docs.
    pub async fn append_trade(&self, trade: &TradeRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO trades
              (ticket, symbol, type, lots, open_price, close_price,
               profit, swap, commission, open_time, close_time, sl, tp, comment)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(trade.ticket)
        .bind(&trade.symbol)
        .bind(trade.side)
        .bind(trade.lots)
        .bind(trade.open_price)
        .bind(trade.close_price)
        .bind(trade.profit)
        .bind(trade.swap)
        .bind(trade.commission)
        .bind(trade.open_time)
        .bind(trade.close_time)
        .bind(trade.sl)
        .bind(trade.tp)
        .bind(&trade.comment)
        .execute(&self.pool)
        .await
        .context("append_trade failed")?;

        Ok(())
    }

    /// Appends one signal row. `executed` stays at its column default (0)
    /// until the EA reports back.
    pub async fn append_signal(&self, signal: &Signal) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO signals (symbol, direction, confidence, entry_price, sl, tp, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&signal.symbol)
        .bind(signal.direction)
        .bind(signal.confidence)
        .bind(signal.entry_price)
        .bind(signal.sl)
        .bind(signal.tp)
        .bind(signal.timestamp)
        .execute(&self.pool)
        .await
        .context("append_signal failed")?;

        Ok(())
    }

    // ─── Dashboard queries ────────────────────────────────────────────────────

    /// All trades closed at or after `since` (epoch seconds), newest first.
    /// The metrics window for "today" when `since` is local midnight.
    pub async fn trades_closed_since(&self, since: f64) -> anyhow::Result<Vec<ClosedTrade>> {
        sqlx::query_as::<_, ClosedTrade>(
            r#"
            SELECT ticket, symbol, type, lots, open_price, close_price,
                   profit, open_time, close_time, sl, tp
            FROM trades
            WHERE close_time >= ?1
            ORDER BY close_time DESC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .context("trades_closed_since failed")
    }

    /// The `limit` most recently opened positions still lacking a close row.
    pub async fn open_positions(&self, limit: i64) -> anyhow::Result<Vec<LivePosition>> {
        sqlx::query_as::<_, LivePosition>(
            r#"
            SELECT ticket, symbol, type, lots, open_price, open_time, sl, tp
            FROM trades
            WHERE close_time IS NULL
            ORDER BY open_time DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("open_positions failed")
    }

    /// The `limit` most recently closed trades.
    pub async fn closed_trades(&self, limit: i64) -> anyhow::Result<Vec<ClosedTrade>> {
        sqlx::query_as::<_, ClosedTrade>(
            r#"
            SELECT ticket, symbol, type, lots, open_price, close_price,
                   profit, open_time, close_time, sl, tp
            FROM trades
            WHERE close_time IS NOT NULL
            ORDER BY close_time DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("closed_trades failed")
    }

    /// Count of signals stamped at or after `since`.
    pub async fn signals_since(&self, since: f64) -> anyhow::Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM signals WHERE timestamp >= ?1")
                .bind(since)
                .fetch_one(&self.pool)
                .await
                .context("signals_since failed")?;

        Ok(count)
    }
}

async fn apply_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::raw_sql(include_str!("../migrations/001_init.sql"))
        .execute(pool)
        .await
        .context("Failed to apply migrations/001_init.sql")?;

    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;

    fn open_trade(ticket: i64, open_time: f64) -> TradeRecord {
        TradeRecord {
            ticket,
            symbol: "EURUSD".to_string(),
            side: Direction::Buy,
            lots: 0.1,
            open_price: 1.1000,
            close_price: None,
            profit: 0.0,
            swap: 0.0,
            commission: 0.0,
            open_time: Some(open_time),
            close_time: None,
            sl: Some(1.0950),
            tp: Some(1.1050),
            comment: String::new(),
        }
    }

    fn closed_trade(ticket: i64, close_time: f64, profit: f64) -> TradeRecord {
        TradeRecord {
            close_price: Some(1.1010),
            close_time: Some(close_time),
            profit,
            ..open_trade(ticket, close_time - 60.0)
        }
    }

    #[tokio::test]
    async fn tick_batch_round_trips() {
        let db = Db::in_memory().await.unwrap();
        let ticks: Vec<Tick> = (0..5)
            .map(|i| Tick {
                timestamp: 1_700_000_000.0 + i as f64,
                symbol: "EURUSD".to_string(),
                bid: 1.1,
                ask: 1.1002,
                spread: 2.0,
                volume: i,
            })
            .collect();

        db.append_ticks(&ticks, "EURUSD").await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ticks_raw")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 5);
    }

    #[tokio::test]
    async fn open_and_closed_rows_split_cleanly() {
        let db = Db::in_memory().await.unwrap();
        db.append_trade(&open_trade(1, 100.0)).await.unwrap();
        db.append_trade(&closed_trade(2, 200.0, 5.25)).await.unwrap();

        let open = db.open_positions(10).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].ticket, 1);

        let closed = db.closed_trades(10).await.unwrap();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].ticket, 2);
        assert_eq!(closed[0].profit, 5.25);
    }

    #[tokio::test]
    async fn queries_order_newest_first_and_respect_limit() {
        let db = Db::in_memory().await.unwrap();
        for i in 0..15 {
            db.append_trade(&open_trade(i, 100.0 + i as f64)).await.unwrap();
            db.append_trade(&closed_trade(100 + i, 1000.0 + i as f64, 1.0))
                .await
                .unwrap();
        }

        let open = db.open_positions(10).await.unwrap();
        assert_eq!(open.len(), 10);
        assert_eq!(open[0].ticket, 14); // newest open_time first

        let closed = db.closed_trades(10).await.unwrap();
        assert_eq!(closed.len(), 10);
        assert_eq!(closed[0].ticket, 114); // newest close_time first
    }

    #[tokio::test]
    async fn closed_since_excludes_open_and_older_rows() {
        let db = Db::in_memory().await.unwrap();
        db.append_trade(&open_trade(1, 100.0)).await.unwrap();
        db.append_trade(&closed_trade(2, 500.0, -1.0)).await.unwrap();
        db.append_trade(&closed_trade(3, 1500.0, 2.0)).await.unwrap();

        let rows = db.trades_closed_since(1000.0).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ticket, 3);
    }

    #[tokio::test]
    async fn signal_count_filters_on_timestamp() {
        let db = Db::in_memory().await.unwrap();
        for ts in [10.0, 20.0, 30.0] {
            let signal: Signal =
                serde_json::from_str(r#"{"direction": "buy"}"#).unwrap();
            db.append_signal(&signal.stamped(ts)).await.unwrap();
        }

        assert_eq!(db.signals_since(15.0).await.unwrap(), 2);
        assert_eq!(db.signals_since(0.0).await.unwrap(), 3);
    }
}
