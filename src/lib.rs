//! # tickhub — Scalping-Pipeline Data Hub
//!
//! Ingestion, aggregation and streaming backend between an MT4 Expert
//! Advisor, a signal-generator service and a live dashboard. See
//! `main.rs` for the data-flow picture.

pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod models;
pub mod publisher;
pub mod routes;
pub mod state;
