//! Gapscan: gapper classification and ranking engine.
//!
//! Ingests market snapshots for gapping equities, normalizes them into
//! per-symbol metrics, enriches them with news/float/intraday signals,
//! classifies them into named reports, and broadcasts ranked result sets
//! on a session-aware refresh cadence.

pub mod config;
pub mod core;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod publish;
pub mod reports;
pub mod scheduler;
pub mod services;
pub mod store;
