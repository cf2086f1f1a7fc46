//! Vigil - Synthetic endpoint health monitor
//!
//! This library probes a fixed set of HTTP endpoints on a bounded worker
//! pool, classifies each response into a health state, and keeps bounded
//! rolling history from which mean latency and uptime are derived.

pub mod api;
pub mod cli;
pub mod config;
pub mod health;
pub mod history;
pub mod logging;
pub mod metrics;
pub mod scheduler;
