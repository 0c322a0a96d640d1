//! CPU sampler: a background task that measures utilization over a window
//! and publishes it into the exporter's gauge.

pub mod source;
pub mod task;

pub use source::{CpuSource, SysinfoSource};
pub use task::{FailurePolicy, Sampler, SamplerExit, SamplerHandle, SamplerSettings};
