//! Campaign configuration loaded from a YAML file.

use std::{path::Path, time::Duration};

use eyre::{Result, WrapErr, bail, ensure};
use serde::{Deserialize, Serialize};
use url::Url;

const MULTI_CONFIG_TYPE: &str = "multi_config";

/// Top-level campaign configuration.
///
/// Loaded once at startup and treated as immutable for the lifetime of the
/// campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Campaign name, used in artifact file names.
    #[serde(default = "default_name")]
    pub name: String,
    /// Network topology settings.
    pub network: NetworkSettings,
    /// Load-profile targets.
    #[serde(default)]
    pub performance: PerformanceSettings,
    /// Campaign-level pacing settings.
    #[serde(default)]
    pub test: TestSettings,
}

/// Network topology section of the campaign configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Ordered HTTP endpoints probed for readiness and targeted with load.
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<Url>,
    /// Validator count for a single-configuration campaign.
    #[serde(default)]
    pub validators: Option<u32>,
    /// Set to `multi_config` to run the named sub-configurations instead.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Named sub-configurations, iterated in declaration order.
    #[serde(default)]
    pub test_configs: Vec<SubConfig>,
}

/// One named network-topology + endpoint pairing within a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubConfig {
    /// Configuration name, used as the report section key.
    pub name: String,
    /// Validator count for this configuration.
    pub validators: u32,
    /// Endpoint set that replaces the shared one for this configuration.
    pub endpoints: Vec<Url>,
}

/// Performance targets for the load generators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSettings {
    /// Target transactions per second.
    pub target_tps: u64,
    /// Load duration in seconds.
    pub duration: u64,
    /// Concurrent load-generation workers.
    pub concurrent_users: u32,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self { target_tps: 100, duration: 30, concurrent_users: 50 }
    }
}

/// Campaign pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSettings {
    /// Delay between sub-configurations, as a duration string (`30s`, `2m`,
    /// `1h`, or a bare integer meaning seconds).
    pub inter_test_delay: String,
}

impl Default for TestSettings {
    fn default() -> Self {
        Self { inter_test_delay: "2m".to_string() }
    }
}

/// The concrete topology a campaign runs, resolved from [`NetworkSettings`].
#[derive(Debug, Clone)]
pub enum Topology {
    /// One network with the given validator count.
    Single(u32),
    /// An ordered list of named sub-configurations.
    Multi(Vec<SubConfig>),
}

impl CampaignConfig {
    /// Loads and validates a campaign configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Resolves the network section into a [`Topology`].
    ///
    /// A missing validator count defaults to 4, matching the orchestrator's
    /// historical default.
    pub fn topology(&self) -> Topology {
        if self.network.kind.as_deref() == Some(MULTI_CONFIG_TYPE) {
            Topology::Multi(self.network.test_configs.clone())
        } else {
            Topology::Single(self.network.validators.unwrap_or(4))
        }
    }

    /// Returns the configured inter-configuration delay.
    pub fn inter_test_delay(&self) -> Result<Duration> {
        parse_duration(&self.test.inter_test_delay)
    }

    fn validate(&self) -> Result<()> {
        ensure!(!self.network.endpoints.is_empty(), "network.endpoints must not be empty");

        if self.network.kind.as_deref() == Some(MULTI_CONFIG_TYPE) {
            ensure!(
                !self.network.test_configs.is_empty(),
                "network.type is multi_config but network.test_configs is empty"
            );
            ensure!(
                self.network.validators.is_none(),
                "network.validators and network.test_configs are mutually exclusive"
            );
            for sub in &self.network.test_configs {
                ensure!(sub.validators > 0, "test config '{}' has zero validators", sub.name);
                ensure!(!sub.endpoints.is_empty(), "test config '{}' has no endpoints", sub.name);
            }
        } else {
            ensure!(
                self.network.test_configs.is_empty(),
                "network.test_configs requires network.type: multi_config"
            );
            if let Some(validators) = self.network.validators {
                ensure!(validators > 0, "network.validators must be at least 1");
            }
        }

        self.inter_test_delay().wrap_err("Invalid test.inter_test_delay")?;
        Ok(())
    }
}

/// Parses a duration string: `<int>s`, `<int>m`, `<int>h`, or a bare integer
/// meaning seconds. Any other suffix is rejected.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let input = input.trim();
    let (digits, multiplier) = match input.strip_suffix(['s', 'm', 'h']) {
        Some(rest) if input.ends_with('s') => (rest, 1),
        Some(rest) if input.ends_with('m') => (rest, 60),
        Some(rest) => (rest, 3600),
        None => (input, 1),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        bail!("Invalid duration string: '{input}'");
    }

    let value: u64 = digits.parse().wrap_err_with(|| format!("Invalid duration: '{input}'"))?;
    Ok(Duration::from_secs(value * multiplier))
}

fn default_name() -> String {
    "throughput_test".to_string()
}

fn default_endpoints() -> Vec<Url> {
    vec![Url::parse("http://localhost:8545").expect("valid default endpoint")]
}
