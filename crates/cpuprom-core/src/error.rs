//! Shared error type across cpuprom crates.

use thiserror::Error;

/// Stable error codes (used in logs and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Config could not be parsed or failed validation.
    BadConfig,
    /// Unsupported config version.
    UnsupportedVersion,
    /// A metric with the same name is already registered.
    DuplicateMetric,
    /// Metric name does not match the exposition grammar.
    InvalidMetricName,
    /// The CPU measurement could not be taken.
    Sampling,
    /// Socket or file I/O failed.
    Io,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::DuplicateMetric => "DUPLICATE_METRIC",
            ErrorCode::InvalidMetricName => "INVALID_METRIC_NAME",
            ErrorCode::Sampling => "SAMPLING",
            ErrorCode::Io => "IO",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, CpuPromError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum CpuPromError {
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("metric already registered: {0}")]
    DuplicateMetric(String),
    #[error("invalid metric name: {0:?}")]
    InvalidMetricName(String),
    #[error("cpu sampling failed: {0}")]
    Sampling(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal: {0}")]
    Internal(String),
}

impl CpuPromError {
    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            CpuPromError::BadConfig(_) => ErrorCode::BadConfig,
            CpuPromError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            CpuPromError::DuplicateMetric(_) => ErrorCode::DuplicateMetric,
            CpuPromError::InvalidMetricName(_) => ErrorCode::InvalidMetricName,
            CpuPromError::Sampling(_) => ErrorCode::Sampling,
            CpuPromError::Io(_) => ErrorCode::Io,
            CpuPromError::Internal(_) => ErrorCode::Internal,
        }
    }
}
