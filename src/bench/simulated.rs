//! Fallback strategy: standalone simulation, no network required.

use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use eyre::{Result, WrapErr};

use super::{BenchmarkRequest, BenchmarkResult, Strategy, StrategyKind};
use crate::process::ExternalStep;

const SIMULATION_SOURCE: &str = "basic_throughput_test.rs";
const SIMULATION_BINARY: &str = "target/release/basic_throughput_test";

/// Runs a standalone throughput simulation, building it on demand.
///
/// Used when the live generator's artifact is missing, its tool cannot be
/// installed, or its run fails or times out.
#[derive(Debug)]
pub struct SimulatedStrategy {
    source: PathBuf,
    binary: PathBuf,
    build_deadline: Duration,
}

impl SimulatedStrategy {
    /// Creates the strategy rooted at the benchmark tooling directory.
    pub fn new(base_dir: &std::path::Path, build_deadline: Duration) -> Self {
        Self {
            source: base_dir.join(SIMULATION_SOURCE),
            binary: base_dir.join(SIMULATION_BINARY),
            build_deadline,
        }
    }

    /// Overrides the simulation binary location, mainly for tests.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    async fn ensure_built(&self) -> Result<()> {
        if self.binary.exists() {
            return Ok(());
        }

        tracing::info!("Building standalone simulation");
        if let Some(parent) = self.binary.parent() {
            std::fs::create_dir_all(parent).wrap_err("Failed to create build output dir")?;
        }

        ExternalStep::new("simulation build", "rustc")
            .arg(self.source.display().to_string())
            .arg("-o")
            .arg(self.binary.display().to_string())
            .deadline(self.build_deadline)
            .run()
            .await
            .wrap_err("Failed to build standalone simulation")?;

        Ok(())
    }
}

#[async_trait]
impl Strategy for SimulatedStrategy {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::StandaloneSimulation
    }

    fn available(&self) -> bool {
        self.binary.exists() || self.source.exists()
    }

    async fn execute(
        &self,
        request: &BenchmarkRequest,
        deadline: Duration,
    ) -> Result<BenchmarkResult> {
        self.ensure_built().await?;

        tracing::info!("Running standalone simulation");
        let output = ExternalStep::new("standalone simulation", &self.binary)
            .deadline(deadline)
            .run()
            .await
            .wrap_err("Standalone simulation failed")?;

        tracing::debug!(stdout = %output.stdout, "Simulation output");

        let result = BenchmarkResult {
            test_type: Some(StrategyKind::StandaloneSimulation),
            note: Some(
                "Standalone simulation, not real network transactions".to_string(),
            ),
            ..BenchmarkResult::default()
        };

        let json = serde_json::to_string_pretty(&result)
            .wrap_err("Failed to serialize simulation result")?;
        std::fs::write(&request.output_path, json).wrap_err_with(|| {
            format!("Failed to write result artifact: {}", request.output_path.display())
        })?;

        Ok(result)
    }
}
