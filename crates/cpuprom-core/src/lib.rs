//! cpuprom core: transport-agnostic metric primitives, the text exposition
//! writer, and the error surface shared by the exporter.
//!
//! This crate carries no runtime or HTTP dependencies so the metric cells and
//! the renderer can be tested and reused without a tokio runtime.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `CpuPromError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod exposition;
pub mod metric;

/// Shared result type.
pub use error::{CpuPromError, Result};
pub use metric::{Counter, Gauge, MetricKind};
