//! cpuprom exporter library entry.
//!
//! Wires the config loader, the metric registry, the CPU sampler, and the
//! HTTP surface into one exporter. It is consumed by the binary (`main.rs`)
//! and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod sampler;
