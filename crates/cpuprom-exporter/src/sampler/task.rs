//! Sampling loop.
//!
//! One cycle: measure over `window`, publish, then wait `interval`. Both
//! waits race the shutdown token, so cancelling never has to wait out a
//! full cycle. The sampler is the only writer of the CPU gauge.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use cpuprom_core::error::{CpuPromError, Result};

use crate::config::{OnError, SamplerSection};
use crate::obs::metrics::ExporterMetrics;

use super::source::CpuSource;

/// Lower bound for the first retry delay when `interval` is zero.
const RETRY_FLOOR: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// End the loop on the first failed measurement.
    Stop,
    /// Keep going, doubling the delay after each consecutive failure.
    Retry { max_backoff: Duration },
}

#[derive(Debug, Clone, Copy)]
pub struct SamplerSettings {
    pub window: Duration,
    pub interval: Duration,
    pub policy: FailurePolicy,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self::from(&SamplerSection::default())
    }
}

impl From<&SamplerSection> for SamplerSettings {
    fn from(s: &SamplerSection) -> Self {
        let policy = match s.on_error {
            OnError::Stop => FailurePolicy::Stop,
            OnError::Retry => FailurePolicy::Retry {
                max_backoff: s.retry_max_backoff(),
            },
        };
        Self {
            window: s.window(),
            interval: s.interval(),
            policy,
        }
    }
}

/// Why the loop ended.
#[derive(Debug)]
pub enum SamplerExit {
    Cancelled,
    Failed(CpuPromError),
}

pub struct Sampler<S> {
    source: S,
    settings: SamplerSettings,
    metrics: Arc<ExporterMetrics>,
}

impl<S: CpuSource + 'static> Sampler<S> {
    pub fn new(source: S, settings: SamplerSettings, metrics: Arc<ExporterMetrics>) -> Self {
        Self {
            source,
            settings,
            metrics,
        }
    }

    /// Spawn the loop on the current runtime.
    pub fn spawn(self) -> SamplerHandle {
        let token = CancellationToken::new();
        let join = tokio::spawn(self.run(token.clone()));
        SamplerHandle { token, join }
    }

    /// Run until `shutdown` fires or a failure ends the loop.
    pub async fn run(mut self, shutdown: CancellationToken) -> SamplerExit {
        let SamplerSettings {
            window,
            interval,
            policy,
        } = self.settings;
        let retry_base = interval.max(RETRY_FLOOR);
        let mut backoff = retry_base;

        tracing::info!(
            window_ms = window.as_millis() as u64,
            interval_ms = interval.as_millis() as u64,
            ?policy,
            "cpu sampler started"
        );

        loop {
            let measured = tokio::select! {
                biased;
                _ = shutdown.cancelled() => return cancelled(),
                r = self.source.measure(window) => r,
            };

            let delay = match measured.and_then(check_reading) {
                Ok(pct) => {
                    self.metrics.cpu_usage.set(pct);
                    self.metrics.sampler_up.set(1.0);
                    self.metrics.samples.inc();
                    backoff = retry_base;
                    tracing::debug!(cpu_percent = pct, "cpu sample published");
                    interval
                }
                Err(e) => {
                    self.metrics.sampler_up.set(0.0);
                    self.metrics.sample_failures.inc();
                    match policy {
                        FailurePolicy::Stop => {
                            tracing::error!(
                                error = %e,
                                last_value = self.metrics.cpu_usage.get(),
                                "cpu sampling failed; sampler stopped"
                            );
                            return SamplerExit::Failed(e);
                        }
                        FailurePolicy::Retry { max_backoff } => {
                            let d = backoff.min(max_backoff);
                            backoff = (backoff * 2).min(max_backoff);
                            tracing::warn!(
                                error = %e,
                                retry_in_ms = d.as_millis() as u64,
                                "cpu sampling failed; retrying"
                            );
                            d
                        }
                    }
                }
            };

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => return cancelled(),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

fn cancelled() -> SamplerExit {
    tracing::info!("cpu sampler cancelled");
    SamplerExit::Cancelled
}

/// Reject non-finite readings and clamp the rest into [0, 100].
fn check_reading(v: f64) -> Result<f64> {
    if !v.is_finite() {
        return Err(CpuPromError::Sampling(format!("non-finite reading: {v}")));
    }
    // `+ 0.0` turns -0.0 into 0.0 so it never renders as `-0`.
    Ok(v.clamp(0.0, 100.0) + 0.0)
}

/// Owner of a spawned sampler.
pub struct SamplerHandle {
    token: CancellationToken,
    join: JoinHandle<SamplerExit>,
}

impl SamplerHandle {
    /// Token that stops the loop when cancelled.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the loop to end on its own.
    pub async fn join(self) -> SamplerExit {
        self.join.await.unwrap_or_else(|e| {
            SamplerExit::Failed(CpuPromError::Internal(format!("sampler task: {e}")))
        })
    }

    /// Cancel the loop and wait for it.
    pub async fn shutdown(self) -> SamplerExit {
        self.token.cancel();
        self.join().await
    }
}
