//! In-process metrics for the exporter.
//!
//! Values are stored as atomics (see `cpuprom_core::metric`) and rendered by
//! the metrics handler on every scrape.

pub mod metrics;
