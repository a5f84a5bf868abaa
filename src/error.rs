//! Stage error taxonomy for the campaign pipeline.

use thiserror::Error;

/// Errors that abort the current configuration.
///
/// Every variant fails the configuration being processed, never the whole
/// campaign: the orchestrator records the failure, tears the network down
/// and moves on. Cleanup failures are deliberately absent here — they are
/// logged warnings and never propagate.
#[derive(Debug, Error)]
pub enum StageError {
    /// The external network orchestrator failed to bring the network up.
    #[error("provisioning failed: {0}")]
    Provisioning(String),
    /// One or more endpoints failed their readiness probe.
    #[error("network failed readiness checks: {0}")]
    Readiness(String),
    /// Every benchmark strategy in the chain was exhausted.
    #[error("all benchmark strategies exhausted")]
    Execution,
    /// A result or report artifact could not be read or written.
    #[error("report aggregation failed: {0}")]
    Aggregation(String),
}
