//! Ephemeral test network lifecycle: start, readiness, teardown.
//!
//! The network itself is brought up and torn down by an external
//! orchestrator process; this module owns the manifest artifact, the data
//! directory, readiness verification and the forced-removal fallback.

use std::{path::PathBuf, time::Duration};

use tokio::time::sleep;
use url::Url;

use crate::{
    error::StageError,
    manifest::NetworkManifest,
    probe::HealthProbe,
    process::ExternalStep,
};

/// Settings for the external network orchestrator.
///
/// The manifest schema and tool location are configuration, not contract:
/// everything needed to point at a different orchestrator build or layout
/// lives here.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Path to the orchestrator binary.
    pub orchestrator_bin: PathBuf,
    /// Directory receiving manifests, data directories and result artifacts.
    pub results_dir: PathBuf,
    /// Deadline for the network setup step.
    pub setup_deadline: Duration,
    /// Deadline for the network removal step.
    pub remove_deadline: Duration,
    /// Fixed delay between a successful setup and the first readiness probe.
    pub settle_delay: Duration,
    /// Per-endpoint deadline for readiness probes.
    pub probe_deadline: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            orchestrator_bin: PathBuf::from("fendermint"),
            results_dir: PathBuf::from("results"),
            setup_deadline: Duration::from_secs(600),
            remove_deadline: Duration::from_secs(120),
            settle_delay: Duration::from_secs(20),
            probe_deadline: Duration::from_secs(5),
        }
    }
}

/// Handle to one running test network.
///
/// Owned exclusively by the orchestrator for the configuration's lifetime
/// and released exactly once through [`NetworkLifecycleManager::stop`].
#[derive(Debug)]
pub struct TestNetworkHandle {
    /// Run identifier understood by the orchestrator's removal command.
    pub testnet_id: String,
    /// Data directory allocated for this run; never reused across runs.
    pub data_dir: PathBuf,
}

/// Starts, verifies and stops ephemeral test networks.
#[derive(Debug)]
pub struct NetworkLifecycleManager {
    config: LifecycleConfig,
    probe: HealthProbe,
}

impl NetworkLifecycleManager {
    /// Creates a manager from the given settings.
    pub fn new(config: LifecycleConfig) -> Self {
        let probe = HealthProbe::new(config.probe_deadline);
        Self { config, probe }
    }

    /// Returns the results directory artifacts are written into.
    pub fn results_dir(&self) -> &PathBuf {
        &self.config.results_dir
    }

    /// Provisions a test network from the manifest.
    ///
    /// Persists the manifest artifact, allocates a uniquely named data
    /// directory keyed by validator count and timestamp, and runs the
    /// orchestrator's setup subcommand under its deadline. A successful
    /// return means only that setup exited cleanly — readiness is a separate
    /// stage via [`Self::await_ready`].
    pub async fn start(
        &self,
        manifest: &NetworkManifest,
        validators: u32,
        timestamp: &str,
    ) -> Result<TestNetworkHandle, StageError> {
        tracing::info!(validators, "Starting test network");

        std::fs::create_dir_all(&self.config.results_dir)
            .map_err(|e| StageError::Provisioning(format!("creating results dir: {e}")))?;

        let run_key = format!("{validators}v_{timestamp}");
        let manifest_path = self.config.results_dir.join(format!("materializer_config_{run_key}.yaml"));
        let data_dir = self.config.results_dir.join(format!("testnet_{run_key}"));

        let yaml = manifest
            .to_yaml()
            .map_err(|e| StageError::Provisioning(format!("serializing manifest: {e}")))?;
        std::fs::write(&manifest_path, yaml)
            .map_err(|e| StageError::Provisioning(format!("writing manifest: {e}")))?;

        std::fs::create_dir_all(&data_dir)
            .map_err(|e| StageError::Provisioning(format!("creating data dir: {e}")))?;

        let setup = ExternalStep::new("network setup", &self.config.orchestrator_bin)
            .arg("materializer")
            .arg("--data-dir")
            .arg(data_dir.display().to_string())
            .arg("setup")
            .arg("--manifest-file")
            .arg(manifest_path.display().to_string())
            .arg("--validate")
            .env("RUST_LOG", "info")
            .env("FM_MATERIALIZER__DATA_DIR", data_dir.display().to_string())
            .deadline(self.config.setup_deadline);

        let output = setup.run().await.map_err(|e| StageError::Provisioning(e.to_string()))?;
        tracing::info!("Test network started");
        tracing::debug!(stdout = %output.stdout, "Orchestrator setup output");

        let testnet_id = manifest_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or(run_key);

        Ok(TestNetworkHandle { testnet_id, data_dir })
    }

    /// Waits out the settle delay, then verifies the network is ready.
    pub async fn await_ready(&self, handle: &TestNetworkHandle, endpoints: &[Url]) -> bool {
        tracing::debug!(
            testnet_id = %handle.testnet_id,
            settle_secs = self.config.settle_delay.as_secs(),
            "Settling before readiness checks"
        );
        sleep(self.config.settle_delay).await;
        self.verify(endpoints).await
    }

    /// Probes every endpoint; the network is ready only if all of them
    /// answer with a well-formed chain-id response. A single failing
    /// endpoint marks the whole network not-ready.
    pub async fn verify(&self, endpoints: &[Url]) -> bool {
        tracing::info!("Verifying network readiness");

        for endpoint in endpoints {
            if !self.probe.check(endpoint).await {
                return false;
            }
        }

        tracing::info!("Network is ready");
        true
    }

    /// Tears the network down, releasing the handle.
    ///
    /// Safe to call with an absent handle and idempotent: the handle is
    /// taken out of the option, so a second call is a no-op. If the
    /// orchestrator's removal command fails, the data directory is
    /// force-deleted; removal errors are logged and never propagated.
    pub async fn stop(&self, handle: &mut Option<TestNetworkHandle>) {
        let Some(handle) = handle.take() else {
            tracing::debug!("No test network to clean up");
            return;
        };

        tracing::info!(testnet_id = %handle.testnet_id, "Cleaning up test network");

        let remove = ExternalStep::new("network removal", &self.config.orchestrator_bin)
            .arg("materializer")
            .arg("--data-dir")
            .arg(handle.data_dir.display().to_string())
            .arg("remove")
            .arg("--testnet-id")
            .arg(&handle.testnet_id)
            .env("RUST_LOG", "info")
            .env("FM_MATERIALIZER__DATA_DIR", handle.data_dir.display().to_string())
            .deadline(self.config.remove_deadline);

        match remove.run().await {
            Ok(_) => {
                tracing::info!(testnet_id = %handle.testnet_id, "Removed test network");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Orchestrator removal failed, forcing deletion");
                match tokio::fs::remove_dir_all(&handle.data_dir).await {
                    Ok(()) => {
                        tracing::info!(dir = %handle.data_dir.display(), "Force-removed data directory");
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => {
                        tracing::warn!(
                            dir = %handle.data_dir.display(),
                            error = %e,
                            "Failed to force-remove data directory"
                        );
                    }
                }
            }
        }

        tracing::info!("Cleanup completed");
    }
}
