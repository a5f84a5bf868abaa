//! Top-level campaign orchestration.
//!
//! Drives each configuration through provisioning, readiness, benchmarking
//! and aggregation, and guarantees cleanup on every exit path. Failures
//! abort the configuration being processed, never the campaign.

use std::time::Duration;

use tokio::time::sleep;
use url::Url;

use crate::{
    bench::{BenchmarkExecutor, BenchmarkRequest, BenchmarkResult},
    config::{CampaignConfig, Topology},
    error::StageError,
    lifecycle::{NetworkLifecycleManager, TestNetworkHandle},
    manifest,
    report::ReportAggregator,
};

/// Stages of one configuration's lifecycle, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Compiling the manifest and starting the network.
    Provisioning,
    /// Settling and probing endpoints.
    AwaitingReadiness,
    /// Driving load through the strategy chain.
    Benchmarking,
    /// Rendering and persisting results.
    Aggregating,
    /// Tearing the network down; entered from every prior stage.
    CleaningUp,
}

/// Record of one configuration's run within a campaign.
#[derive(Debug)]
pub struct ConfigOutcome {
    /// Configuration name.
    pub name: String,
    /// The benchmark result, present only on success.
    pub result: Option<BenchmarkResult>,
    /// The error that failed the configuration, if any.
    pub error: Option<StageError>,
}

/// Sequences configurations and owns the pipeline components.
#[derive(Debug)]
pub struct CampaignOrchestrator {
    config: CampaignConfig,
    lifecycle: NetworkLifecycleManager,
    executor: BenchmarkExecutor,
    reports: ReportAggregator,
    inter_test_delay: Duration,
    timestamp: String,
}

impl CampaignOrchestrator {
    /// Creates an orchestrator from a validated configuration and its
    /// collaborators. The run timestamp keys all artifacts of this campaign.
    pub fn new(
        config: CampaignConfig,
        lifecycle: NetworkLifecycleManager,
        executor: BenchmarkExecutor,
        reports: ReportAggregator,
    ) -> eyre::Result<Self> {
        let inter_test_delay = config.inter_test_delay()?;
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        Ok(Self { config, lifecycle, executor, reports, inter_test_delay, timestamp })
    }

    /// Runs the whole campaign. Returns overall success: for a single
    /// configuration, whether it produced a report; for a multi-configuration
    /// campaign, whether at least one configuration produced a result.
    pub async fn run(&self) -> bool {
        tracing::info!(campaign = %self.config.name, "Starting campaign");

        match self.config.topology() {
            Topology::Single(validators) => self.run_single(validators).await,
            Topology::Multi(subs) => self.run_multi(&subs).await,
        }
    }

    async fn run_single(&self, validators: u32) -> bool {
        let outcome = self
            .run_configuration(&self.config.name, validators, &self.config.network.endpoints)
            .await;

        let Some(result) = outcome.result else {
            if let Some(error) = &outcome.error {
                tracing::error!(configuration = %outcome.name, %error, "Configuration failed");
            }
            return false;
        };

        let report = self.reports.render_single(&self.config.name, &self.timestamp, &result);
        match self.reports.persist(&self.config.name, &self.timestamp, &report) {
            Ok(_) => {
                tracing::info!("Campaign completed successfully");
                true
            }
            Err(error) => {
                tracing::error!(%error, "Failed to persist report");
                false
            }
        }
    }

    async fn run_multi(&self, subs: &[crate::config::SubConfig]) -> bool {
        let mut results: Vec<(String, BenchmarkResult)> = Vec::new();

        for (i, sub) in subs.iter().enumerate() {
            tracing::info!(configuration = %sub.name, "Running test configuration");

            // Each sub-configuration brings its own endpoint set; the shared
            // campaign endpoints stay untouched and apply again afterwards.
            let outcome =
                self.run_configuration(&sub.name, sub.validators, &sub.endpoints).await;

            match outcome.result {
                Some(result) => results.push((sub.name.clone(), result)),
                None => {
                    if let Some(error) = &outcome.error {
                        tracing::error!(configuration = %sub.name, %error, "Configuration failed, continuing");
                    }
                }
            }

            if i + 1 < subs.len() {
                tracing::info!(
                    delay = %crate::report::format_duration(self.inter_test_delay),
                    "Waiting before next configuration"
                );
                sleep(self.inter_test_delay).await;
            }
        }

        let report = self.reports.render_campaign(&self.config.name, &self.timestamp, &results);
        if let Err(error) = self.reports.persist(&self.config.name, &self.timestamp, &report) {
            tracing::error!(%error, "Failed to persist campaign report");
            return false;
        }

        !results.is_empty()
    }

    /// Runs one configuration through the full stage sequence.
    ///
    /// Cleanup is structural: the stage future's outcome is captured and
    /// `stop` runs unconditionally before this function returns, whichever
    /// stage failed.
    async fn run_configuration(
        &self,
        name: &str,
        validators: u32,
        endpoints: &[Url],
    ) -> ConfigOutcome {
        let mut handle: Option<TestNetworkHandle> = None;

        let staged = self.run_stages(name, validators, endpoints, &mut handle).await;

        tracing::info!(stage = ?Stage::CleaningUp, configuration = %name, "Entering cleanup");
        self.lifecycle.stop(&mut handle).await;

        match staged {
            Ok(result) => ConfigOutcome { name: name.to_string(), result: Some(result), error: None },
            Err(error) => ConfigOutcome { name: name.to_string(), result: None, error: Some(error) },
        }
    }

    async fn run_stages(
        &self,
        name: &str,
        validators: u32,
        endpoints: &[Url],
        handle: &mut Option<TestNetworkHandle>,
    ) -> Result<BenchmarkResult, StageError> {
        tracing::info!(stage = ?Stage::Provisioning, configuration = %name, validators, "Provisioning");
        let manifest = manifest::compile(validators)
            .map_err(|e| StageError::Provisioning(e.to_string()))?;
        let started = self.lifecycle.start(&manifest, validators, &self.timestamp).await?;
        let started = handle.insert(started);

        tracing::info!(stage = ?Stage::AwaitingReadiness, configuration = %name, "Awaiting readiness");
        if !self.lifecycle.await_ready(started, endpoints).await {
            return Err(StageError::Readiness(format!(
                "one or more of {} endpoints failed its probe",
                endpoints.len()
            )));
        }

        tracing::info!(stage = ?Stage::Benchmarking, configuration = %name, "Benchmarking");
        let endpoint = endpoints.first().cloned().ok_or_else(|| {
            StageError::Readiness("no endpoints configured".to_string())
        })?;
        let request = BenchmarkRequest {
            endpoint,
            target_tps: self.config.performance.target_tps,
            duration_secs: self.config.performance.duration,
            concurrent_users: self.config.performance.concurrent_users,
            output_path: self
                .lifecycle
                .results_dir()
                .join(format!("{name}_{}_results.json", self.timestamp)),
        };

        let result = self.executor.run(&request).await.ok_or(StageError::Execution)?;

        tracing::info!(stage = ?Stage::Aggregating, configuration = %name, "Benchmark result collected");
        Ok(result)
    }
}
