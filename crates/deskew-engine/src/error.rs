//! Engine error types.

use thiserror::Error;

use crate::cluster::ClusterError;
use deskew_core::thresholds::ConfigError;

/// Errors that abort a rebalancing run. Guard skips are not errors; they
/// come back in the `RunSummary`.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Structural or numeric threshold misconfiguration. Fatal, never
    /// retried, surfaced to the operator.
    #[error("thresholds config is not valid: {0}")]
    Config(#[from] ConfigError),

    /// The high-utilization strategy forces its own target map.
    #[error("targetThresholds is not applicable for HighNodeUtilization")]
    TargetThresholdsNotApplicable,

    /// Failure to obtain live state; the run cannot proceed.
    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

pub type EngineResult<T> = Result<T, EngineError>;
