//! Benchmark execution: request/result types and the strategy chain.

mod live;
mod simulated;
mod strategy;

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use url::Url;

pub use live::LiveStrategy;
pub use simulated::SimulatedStrategy;
pub use strategy::{Strategy, StrategyKind};

/// One load-generation request against a running network.
#[derive(Debug, Clone)]
pub struct BenchmarkRequest {
    /// Endpoint the load is driven against.
    pub endpoint: Url,
    /// Target transactions per second.
    pub target_tps: u64,
    /// Load duration in seconds.
    pub duration_secs: u64,
    /// Concurrent load-generation workers.
    pub concurrent_users: u32,
    /// Where the raw result artifact is written.
    pub output_path: PathBuf,
}

/// Raw measurement record produced by one strategy.
///
/// Sections are optional: a strategy reports what it can measure, and the
/// report renders placeholders for the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Which execution strategy produced this result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_type: Option<StrategyKind>,
    /// Throughput measurements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceSection>,
    /// Latency measurements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<LatencySection>,
    /// Resource usage measurements.
    #[serde(default, alias = "resource", skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceSection>,
    /// Free-form note, e.g. marking simulated results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Throughput section of a benchmark result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceSection {
    /// Average transactions per second.
    pub avg_tps: Option<f64>,
    /// Peak transactions per second.
    pub peak_tps: Option<f64>,
    /// Total operations submitted.
    pub total_transactions: Option<u64>,
    /// Success rate as a ratio in `[0, 1]`.
    pub success_rate: Option<f64>,
}

/// Latency section of a benchmark result, in milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatencySection {
    /// Average latency.
    pub avg_ms: Option<f64>,
    /// 95th percentile latency.
    pub p95_ms: Option<f64>,
    /// 99th percentile latency.
    pub p99_ms: Option<f64>,
}

/// Resource usage section of a benchmark result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceSection {
    /// Peak CPU usage in percent.
    pub peak_cpu_percent: Option<f64>,
    /// Peak memory usage in megabytes.
    pub peak_memory_mb: Option<f64>,
    /// Network I/O in megabytes.
    pub network_io_mb: Option<f64>,
}

/// Tooling locations and deadlines for the default strategy chain.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Directory holding the load-generator sources and binaries.
    pub base_dir: PathBuf,
    /// Deadline for one strategy's load run.
    pub strategy_deadline: Duration,
    /// Deadline for the one-shot runtime tool installation.
    pub install_deadline: Duration,
    /// Deadline for building the fallback simulation on demand.
    pub build_deadline: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            strategy_deadline: Duration::from_secs(1800),
            install_deadline: Duration::from_secs(300),
            build_deadline: Duration::from_secs(300),
        }
    }
}

/// Runs an ordered chain of benchmark strategies.
///
/// Strategies are tried in order; the first success wins and its result is
/// tagged with the producing strategy. An exhausted chain yields `None`,
/// which the caller treats as a configuration-level failure, not a fatal
/// pipeline error.
pub struct BenchmarkExecutor {
    strategies: Vec<Box<dyn Strategy>>,
    strategy_deadline: Duration,
}

impl BenchmarkExecutor {
    /// Builds the default chain: live generation first, simulation fallback.
    pub fn new(config: ExecutorConfig) -> Self {
        let strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(LiveStrategy::new(&config.base_dir, config.install_deadline)),
            Box::new(SimulatedStrategy::new(&config.base_dir, config.build_deadline)),
        ];
        Self { strategies, strategy_deadline: config.strategy_deadline }
    }

    /// Builds an executor from an explicit strategy chain.
    pub fn from_strategies(strategies: Vec<Box<dyn Strategy>>, strategy_deadline: Duration) -> Self {
        Self { strategies, strategy_deadline }
    }

    /// Runs the chain, returning the first successful result.
    pub async fn run(&self, request: &BenchmarkRequest) -> Option<BenchmarkResult> {
        for strategy in &self.strategies {
            if !strategy.available() {
                tracing::info!(strategy = strategy.name(), "Strategy unavailable, skipping");
                continue;
            }

            tracing::info!(strategy = strategy.name(), "Running benchmark strategy");

            match strategy.execute(request, self.strategy_deadline).await {
                Ok(mut result) => {
                    // One tag per invocation, always the producing strategy's.
                    result.test_type = Some(strategy.kind());
                    tracing::info!(strategy = strategy.name(), "Benchmark completed");
                    return Some(result);
                }
                Err(e) => {
                    tracing::error!(strategy = strategy.name(), error = %e, "Strategy failed");
                }
            }
        }

        tracing::error!("All benchmark strategies exhausted");
        None
    }
}

impl std::fmt::Debug for BenchmarkExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkExecutor")
            .field("strategies", &self.strategies.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("strategy_deadline", &self.strategy_deadline)
            .finish()
    }
}
