use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

use cpuprom_core::error::{CpuPromError, Result};
use cpuprom_core::metric::validate_name;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub sampler: SamplerSection,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            sampler: SamplerSection::default(),
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(CpuPromError::UnsupportedVersion);
        }
        self.server.validate()?;
        self.sampler.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            metrics_path: default_metrics_path(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !self.metrics_path.starts_with('/') {
            return Err(CpuPromError::BadConfig(
                "server.metrics_path must start with '/'".into(),
            ));
        }
        let path_ok = self
            .metrics_path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '-'));
        if !path_ok {
            return Err(CpuPromError::BadConfig(format!(
                "server.metrics_path {:?} may only contain [A-Za-z0-9_./-]",
                self.metrics_path
            )));
        }
        if matches!(self.metrics_path.as_str(), "/healthz" | "/readyz") {
            return Err(CpuPromError::BadConfig(format!(
                "server.metrics_path {} collides with a built-in route",
                self.metrics_path
            )));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            CpuPromError::BadConfig(format!(
                "server.listen {:?} is not a socket address: {e}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_metrics_path() -> String {
    "/metrics".into()
}

/// What the sampler does after a failed measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnError {
    /// Report and end the loop. The last good value stays published.
    #[default]
    Stop,
    /// Report and try again with exponential backoff.
    Retry,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplerSection {
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default)]
    pub on_error: OnError,

    #[serde(default = "default_retry_max_backoff_ms")]
    pub retry_max_backoff_ms: u64,

    #[serde(default = "default_metric_name")]
    pub metric_name: String,

    #[serde(default = "default_metric_help")]
    pub metric_help: String,
}

impl Default for SamplerSection {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            interval_ms: default_interval_ms(),
            on_error: OnError::default(),
            retry_max_backoff_ms: default_retry_max_backoff_ms(),
            metric_name: default_metric_name(),
            metric_help: default_metric_help(),
        }
    }
}

impl SamplerSection {
    pub fn validate(&self) -> Result<()> {
        if !(50..=60_000).contains(&self.window_ms) {
            return Err(CpuPromError::BadConfig(
                "sampler.window_ms must be between 50 and 60000".into(),
            ));
        }
        if self.interval_ms > 3_600_000 {
            return Err(CpuPromError::BadConfig(
                "sampler.interval_ms must be at most 3600000".into(),
            ));
        }
        if !(100..=3_600_000).contains(&self.retry_max_backoff_ms) {
            return Err(CpuPromError::BadConfig(
                "sampler.retry_max_backoff_ms must be between 100 and 3600000".into(),
            ));
        }
        validate_name(&self.metric_name)?;
        Ok(())
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn retry_max_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_max_backoff_ms)
    }
}

fn default_window_ms() -> u64 {
    1000
}
fn default_interval_ms() -> u64 {
    1000
}
fn default_retry_max_backoff_ms() -> u64 {
    30_000
}
fn default_metric_name() -> String {
    "cpu_usage_percent".into()
}
fn default_metric_help() -> String {
    "Current CPU usage in percent".into()
}
