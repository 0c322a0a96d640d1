//! OS-facing measurement capability.

use std::time::Duration;

use async_trait::async_trait;
use sysinfo::System;

use cpuprom_core::error::{CpuPromError, Result};

/// Something that can report aggregate CPU utilization over a window.
///
/// Implementations block (asynchronously) for roughly `window` and return
/// busy time as a percentage of all cores.
#[async_trait]
pub trait CpuSource: Send {
    async fn measure(&mut self, window: Duration) -> Result<f64>;
}

/// `sysinfo`-backed source: two counter reads `window` apart.
pub struct SysinfoSource {
    sys: System,
}

impl SysinfoSource {
    pub fn new() -> Self {
        Self { sys: System::new() }
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CpuSource for SysinfoSource {
    async fn measure(&mut self, window: Duration) -> Result<f64> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(CpuPromError::Sampling("platform not supported by sysinfo".into()));
        }

        // The refreshes read /proc/stat synchronously; one small read per
        // window is cheap enough to stay on the runtime thread.
        self.sys.refresh_cpu_usage();
        // sysinfo needs a minimum gap between refreshes for a usable delta.
        tokio::time::sleep(window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL)).await;
        self.sys.refresh_cpu_usage();

        if self.sys.cpus().is_empty() {
            return Err(CpuPromError::Sampling("no cpus reported".into()));
        }
        Ok(f64::from(self.sys.global_cpu_info().cpu_usage()))
    }
}
