//! Benchmark campaign orchestration for ephemeral validator test networks.
//!
//! This crate provisions a throwaway test network through an external
//! orchestrator process, drives synthetic load against it, collects
//! performance/latency/resource metrics into a report, and guarantees the
//! network is torn down on every exit path.
//!
//! # Overview
//!
//! The pipeline is organized leaf-first:
//!
//! - **Manifest**: compiles a validator count into the topology record the
//!   orchestrator consumes
//! - **Lifecycle**: starts the network, verifies readiness, tears it down
//! - **Bench**: the ordered load-generation strategy chain with fallback
//! - **Report**: renders and persists the result artifacts
//! - **Campaign**: top-level sequencing across one or more configurations
//!
//! # Example
//!
//! ```rust,ignore
//! use benchnet::{
//!     BenchmarkExecutor, CampaignConfig, CampaignOrchestrator, ExecutorConfig,
//!     LifecycleConfig, NetworkLifecycleManager, ReportAggregator,
//! };
//!
//! let config = CampaignConfig::load(std::path::Path::new("campaign.yaml"))?;
//! let lifecycle = NetworkLifecycleManager::new(LifecycleConfig::default());
//! let executor = BenchmarkExecutor::new(ExecutorConfig::default());
//! let reports = ReportAggregator::new("results");
//!
//! let orchestrator = CampaignOrchestrator::new(config, lifecycle, executor, reports)?;
//! let success = orchestrator.run().await;
//! ```

#![warn(missing_docs)]

pub mod bench;
pub mod campaign;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod manifest;
pub mod probe;
pub mod process;
pub mod report;

pub use bench::{
    BenchmarkExecutor, BenchmarkRequest, BenchmarkResult, ExecutorConfig, Strategy, StrategyKind,
};
pub use campaign::{CampaignOrchestrator, ConfigOutcome, Stage};
pub use config::{CampaignConfig, Topology, parse_duration};
pub use error::StageError;
pub use lifecycle::{LifecycleConfig, NetworkLifecycleManager, TestNetworkHandle};
pub use manifest::NetworkManifest;
pub use report::ReportAggregator;
