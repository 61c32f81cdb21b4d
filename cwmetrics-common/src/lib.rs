use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod model;

pub use config::{validate_config, PluginConfig, PLUGIN_NAME, PLUGIN_PARAM_NAMESPACE};
pub use model::{
    Aggregate, Dimension, LatencySample, MetricBatch, MetricDatum, Report, StandardUnit,
};

/// Maximum number of data points the monitoring backend accepts in one submission.
pub const BATCH_LIMIT: usize = 20;

/// Error types for cwmetrics operations
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CwMetricsError {
    #[error("The \"cloudwatch\" plugin requires configuration under <script>.config.plugins.cloudwatch")]
    PluginConfigRequired,

    #[error("The \"namespace\" parameter is required")]
    NamespaceRequired,

    #[error("The \"namespace\" param must have a string value")]
    NamespaceMustBeString,

    #[error("The \"namespace\" param must have a length of at least one")]
    NamespaceEmpty,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP {0}: {1}")]
    HttpError(u16, String),

    #[error("Metric batch exceeds maximum of {0} data points")]
    BatchTooLarge(usize),
}

impl CwMetricsError {
    /// `true` for the four construction-time configuration failures.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CwMetricsError::PluginConfigRequired
                | CwMetricsError::NamespaceRequired
                | CwMetricsError::NamespaceMustBeString
                | CwMetricsError::NamespaceEmpty
        )
    }
}

/// JSON error envelope used by the ingest server and parsed from backend error responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Result type for cwmetrics operations
pub type Result<T> = std::result::Result<T, CwMetricsError>;
