//! Core error handling for infrawatch

use thiserror::Error;

/// Errors produced by monitors and metrics sources
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Monitor was constructed with an invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A snapshot is missing a metric the monitor was configured to track
    #[error("Missing required metric '{0}' in snapshot")]
    MissingMetric(String),

    /// A metrics source failed to produce a snapshot
    #[error("Metrics source error: {0}")]
    Source(String),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
