//! Primary strategy: real transactions against the live network.

use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use eyre::{Result, WrapErr};

use super::{BenchmarkRequest, BenchmarkResult, Strategy, StrategyKind};
use crate::process::ExternalStep;

const BENCHMARK_SCRIPT: &str = "simple_real_benchmark.rs";
const SCRIPT_RUNNER: &str = "rust-script";

/// Drives load by running the real-transaction generator script.
///
/// The generator is a standalone script executed through `rust-script`; if
/// that tool is missing, one installation attempt is made under its own
/// deadline before the strategy gives up.
#[derive(Debug)]
pub struct LiveStrategy {
    script: PathBuf,
    runner: PathBuf,
    installer: PathBuf,
    install_deadline: Duration,
}

impl LiveStrategy {
    /// Creates the strategy rooted at the benchmark tooling directory.
    pub fn new(base_dir: &std::path::Path, install_deadline: Duration) -> Self {
        Self {
            script: base_dir.join(BENCHMARK_SCRIPT),
            runner: PathBuf::from(SCRIPT_RUNNER),
            installer: PathBuf::from("cargo"),
            install_deadline,
        }
    }

    /// Overrides the script-runner binary, mainly for tests.
    pub fn with_runner(mut self, runner: impl Into<PathBuf>) -> Self {
        self.runner = runner.into();
        self
    }

    async fn ensure_runner(&self) -> Result<()> {
        let version = ExternalStep::new("rust-script probe", &self.runner)
            .arg("--version")
            .deadline(Duration::from_secs(5));

        if version.run().await.is_ok() {
            return Ok(());
        }

        tracing::warn!("rust-script not found, installing");
        ExternalStep::new("rust-script install", &self.installer)
            .args(["install", SCRIPT_RUNNER])
            .deadline(self.install_deadline)
            .run()
            .await
            .wrap_err("Failed to install rust-script")?;

        Ok(())
    }
}

#[async_trait]
impl Strategy for LiveStrategy {
    fn name(&self) -> &'static str {
        "live"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::RealBlockchain
    }

    fn available(&self) -> bool {
        self.script.exists()
    }

    async fn execute(
        &self,
        request: &BenchmarkRequest,
        deadline: Duration,
    ) -> Result<BenchmarkResult> {
        self.ensure_runner().await?;

        tracing::info!(endpoint = %request.endpoint, "Driving real transactions at the network");

        ExternalStep::new("live benchmark", &self.runner)
            .arg(self.script.display().to_string())
            .arg("--endpoint")
            .arg(request.endpoint.to_string())
            .arg("--target-tps")
            .arg(request.target_tps.to_string())
            .arg("--duration")
            .arg(request.duration_secs.to_string())
            .arg("--concurrent-users")
            .arg(request.concurrent_users.to_string())
            .arg("--output")
            .arg(request.output_path.display().to_string())
            .deadline(deadline)
            .run()
            .await
            .wrap_err("Live benchmark run failed")?;

        let raw = std::fs::read_to_string(&request.output_path).wrap_err_with(|| {
            format!("Failed to read result artifact: {}", request.output_path.display())
        })?;
        let result: BenchmarkResult =
            serde_json::from_str(&raw).wrap_err("Failed to parse result artifact")?;

        Ok(result)
    }
}
