//! The polymorphic seam of the benchmark fallback chain.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{BenchmarkRequest, BenchmarkResult};

/// Identifies which execution strategy produced a result.
///
/// The serialized names match the historical result-artifact vocabulary so
/// existing consumers keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Real transactions against the live network.
    RealBlockchain,
    /// Standalone simulation with no network involved.
    StandaloneSimulation,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RealBlockchain => write!(f, "real_blockchain"),
            Self::StandaloneSimulation => write!(f, "standalone_simulation"),
        }
    }
}

/// One concrete load-generation mechanism.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Human-readable strategy name for logs.
    fn name(&self) -> &'static str;

    /// The tag attached to results this strategy produces.
    fn kind(&self) -> StrategyKind;

    /// Whether the strategy's artifact is present (or installable) right now.
    fn available(&self) -> bool;

    /// Drives the load run under the given deadline.
    async fn execute(
        &self,
        request: &BenchmarkRequest,
        deadline: Duration,
    ) -> eyre::Result<BenchmarkResult>;
}
