//! # tickhub — Scalping-Pipeline Data Hub
//!
//! ```text
//!  ┌─────────────┐  POST /api/ticks, /api/trades  ┌──────────────────────────┐
//!  │  MT4 EA     │ ─────────────────────────────▶ │ AppState                 │
//!  │             │  ◀── GET /api/signals          │ ├─ latest_ticks (≤100)   │
//!  └─────────────┘                                │ ├─ latest_signal         │
//!  ┌─────────────┐  POST /api/signals             │ ├─ metrics               │
//!  │  Generator  │ ─────────────────────────────▶ │ ├─ live_positions        │
//!  └─────────────┘                                │ └─ recent_trades         │
//!                                                 └───────────▲──────────────┘
//!  ┌─────────────┐  GET /api/dashboard/data                   │ publish cycle
//!  │  Dashboard  │  GET /api/dashboard/stream (SSE) ──────────┘ (1 s)
//!  └─────────────┘                                    ▲ SQLite (ticks_raw,
//!                                                       trades, signals)
//! ```

use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tickhub::config::Config;
use tickhub::db::Db;
use tickhub::routes::router;
use tickhub::state::{build_state, SystemStatus};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env ──────────────────────────────────────────────────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ─────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("tickhub=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!(r#"

  ╔═══════════════════════════════════════════════════════╗
  ║            TICKHUB — Scalping Data Hub                ║
  ║    Ticks · Signals · Trades · Dashboard Stream        ║
  ╚═══════════════════════════════════════════════════════╝"#);

    // ── 3. Config + storage ───────────────────────────────────────────────────
    let config = Config::from_env()?;
    let db = Db::connect(&config.database_url).await?;

    // ── 4. Shared state ───────────────────────────────────────────────────────
    let state = build_state(db, config.stream_interval);
    state.set_system_status(SystemStatus::Running).await;

    // ── 5. CORS ───────────────────────────────────────────────────────────────
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // ── 6. Router ─────────────────────────────────────────────────────────────
    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // ── 7. Bind & Serve ───────────────────────────────────────────────────────
    info!(addr = ?config.bind_addr, "tickhub server starting");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
