//! Shared application state for the exporter.
//!
//! Owns the config and the metric set. The sampler gets its own `Arc` to the
//! same metrics; handlers only read.

use std::sync::Arc;

use cpuprom_core::error::Result;

use crate::config::ExporterConfig;
use crate::obs::metrics::ExporterMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ExporterConfig,
    metrics: Arc<ExporterMetrics>,
}

impl AppState {
    /// Build application state and register the exporter's metrics.
    pub fn new(cfg: ExporterConfig) -> Result<Self> {
        let metrics = Arc::new(ExporterMetrics::new(
            &cfg.sampler.metric_name,
            &cfg.sampler.metric_help,
        )?);
        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, metrics }),
        })
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> Arc<ExporterMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    /// Ready once the sampler has published and its last measurement succeeded.
    pub fn is_ready(&self) -> bool {
        self.inner.metrics.is_sampler_up()
    }
}
