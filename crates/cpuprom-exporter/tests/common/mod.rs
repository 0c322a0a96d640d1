//! Deterministic `CpuSource` fakes shared by the sampler and endpoint tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use cpuprom_core::error::{CpuPromError, Result};
use cpuprom_exporter::obs::metrics::ExporterMetrics;
use cpuprom_exporter::sampler::{CpuSource, FailurePolicy, SamplerSettings};

pub fn metrics() -> Arc<ExporterMetrics> {
    Arc::new(ExporterMetrics::new("cpu_usage_percent", "Current CPU usage in percent").unwrap())
}

pub fn settings(interval_ms: u64, policy: FailurePolicy) -> SamplerSettings {
    SamplerSettings {
        window: Duration::from_millis(100),
        interval: Duration::from_millis(interval_ms),
        policy,
    }
}

pub fn sampling_error() -> CpuPromError {
    CpuPromError::Sampling("permission denied".into())
}

/// Replays a fixed script of readings, then never returns again.
pub struct ScriptedSource {
    script: VecDeque<Result<f64>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<f64>>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let src = Self {
            script: script.into(),
            calls: Arc::clone(&calls),
        };
        (src, calls)
    }
}

#[async_trait]
impl CpuSource for ScriptedSource {
    async fn measure(&mut self, window: Duration) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(window).await;
        match self.script.pop_front() {
            Some(r) => r,
            None => std::future::pending().await,
        }
    }
}

/// Yields whatever the test sends, one reading per measurement.
pub struct ChannelSource {
    rx: mpsc::UnboundedReceiver<Result<f64>>,
}

impl ChannelSource {
    pub fn new() -> (Self, mpsc::UnboundedSender<Result<f64>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, tx)
    }
}

#[async_trait]
impl CpuSource for ChannelSource {
    async fn measure(&mut self, _window: Duration) -> Result<f64> {
        match self.rx.recv().await {
            Some(r) => r,
            None => std::future::pending().await,
        }
    }
}

/// Cycles through `values` as fast as the runtime allows.
pub struct CyclingSource {
    values: Vec<f64>,
    next: usize,
}

impl CyclingSource {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, next: 0 }
    }
}

#[async_trait]
impl CpuSource for CyclingSource {
    async fn measure(&mut self, _window: Duration) -> Result<f64> {
        tokio::task::yield_now().await;
        let v = self.values[self.next % self.values.len()];
        self.next += 1;
        Ok(v)
    }
}

/// Poll `cond` until it holds, sleeping 1ms between checks.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("condition not reached");
}

/// Extract the sample value of `name` from a rendered body.
pub fn sample_value(body: &str, name: &str) -> f64 {
    let prefix = format!("{name} ");
    let line = body
        .lines()
        .find(|l| l.starts_with(&prefix))
        .unwrap_or_else(|| panic!("no sample line for {name} in:\n{body}"));
    line[prefix.len()..].parse().expect("sample value must parse as f64")
}
