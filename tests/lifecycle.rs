//! Integration tests for the network lifecycle: provisioning, readiness
//! verification and idempotent teardown, against stub orchestrators.

mod support;

use std::time::Duration;

use benchnet::{
    LifecycleConfig, NetworkLifecycleManager, StageError, TestNetworkHandle, manifest,
};
use support::{HEALTHY_BODY, UNHEALTHY_BODY, failing_orchestrator_script, orchestrator_script,
    spawn_rpc_stub, write_script};

fn manager(bin: &std::path::Path, results_dir: &std::path::Path) -> NetworkLifecycleManager {
    NetworkLifecycleManager::new(LifecycleConfig {
        orchestrator_bin: bin.to_path_buf(),
        results_dir: results_dir.to_path_buf(),
        setup_deadline: Duration::from_secs(10),
        remove_deadline: Duration::from_secs(10),
        settle_delay: Duration::ZERO,
        probe_deadline: Duration::from_secs(2),
    })
}

#[tokio::test]
async fn start_writes_manifest_and_returns_handle() {
    let dir = tempfile::tempdir().unwrap();
    let bin = write_script(dir.path(), "orchestrator", orchestrator_script());
    let results = dir.path().join("results");
    let lifecycle = manager(&bin, &results);

    let manifest = manifest::compile(4).unwrap();
    let handle = lifecycle.start(&manifest, 4, "20260828_120000").await.unwrap();

    assert!(handle.testnet_id.contains("4v_20260828_120000"));
    assert!(handle.data_dir.is_dir());
    assert!(results.join("materializer_config_4v_20260828_120000.yaml").is_file());
}

#[tokio::test]
async fn failed_setup_is_a_provisioning_error() {
    let dir = tempfile::tempdir().unwrap();
    let bin = write_script(dir.path(), "orchestrator", failing_orchestrator_script());
    let lifecycle = manager(&bin, &dir.path().join("results"));

    let manifest = manifest::compile(2).unwrap();
    let err = lifecycle.start(&manifest, 2, "20260828_120000").await.unwrap_err();

    assert!(matches!(err, StageError::Provisioning(_)));
    assert!(err.to_string().contains("induced failure"));
}

#[tokio::test]
async fn hung_setup_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let bin = write_script(dir.path(), "orchestrator", "#!/bin/sh\nsleep 30\n");
    let lifecycle = NetworkLifecycleManager::new(LifecycleConfig {
        orchestrator_bin: bin,
        results_dir: dir.path().join("results"),
        setup_deadline: Duration::from_millis(200),
        ..LifecycleConfig::default()
    });

    let manifest = manifest::compile(1).unwrap();
    let err = lifecycle.start(&manifest, 1, "20260828_120000").await.unwrap_err();

    assert!(matches!(err, StageError::Provisioning(_)));
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn readiness_is_all_or_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let bin = write_script(dir.path(), "orchestrator", orchestrator_script());
    let lifecycle = manager(&bin, &dir.path().join("results"));

    let healthy = spawn_rpc_stub(HEALTHY_BODY).await;
    let unhealthy = spawn_rpc_stub(UNHEALTHY_BODY).await;

    assert!(lifecycle.verify(&[healthy.clone()]).await);
    assert!(lifecycle.verify(&[healthy.clone(), healthy.clone()]).await);
    // One malformed endpoint marks the whole network not-ready.
    assert!(!lifecycle.verify(&[healthy.clone(), unhealthy]).await);

    let unreachable = "http://127.0.0.1:1/".parse().unwrap();
    assert!(!lifecycle.verify(&[healthy, unreachable]).await);
}

#[tokio::test]
async fn stop_without_handle_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let bin = write_script(dir.path(), "orchestrator", failing_orchestrator_script());
    let lifecycle = manager(&bin, &dir.path().join("results"));

    let mut handle: Option<TestNetworkHandle> = None;
    lifecycle.stop(&mut handle).await;
    lifecycle.stop(&mut handle).await;
    assert!(handle.is_none());
}

#[tokio::test]
async fn failed_removal_falls_back_to_forced_deletion() {
    let dir = tempfile::tempdir().unwrap();
    let bin = write_script(dir.path(), "orchestrator", failing_orchestrator_script());
    let lifecycle = manager(&bin, &dir.path().join("results"));

    let data_dir = dir.path().join("testnet_2v_20260828_120000");
    std::fs::create_dir_all(&data_dir).unwrap();
    std::fs::write(data_dir.join("state.db"), "x").unwrap();

    let mut handle = Some(TestNetworkHandle {
        testnet_id: "materializer_config_2v_20260828_120000".to_string(),
        data_dir: data_dir.clone(),
    });

    lifecycle.stop(&mut handle).await;
    assert!(handle.is_none());
    assert!(!data_dir.exists());

    // Second call must not fail or re-attempt the removal.
    lifecycle.stop(&mut handle).await;
    assert!(handle.is_none());
}

#[tokio::test]
async fn orchestrator_removal_cleans_the_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let bin = write_script(dir.path(), "orchestrator", orchestrator_script());
    let results = dir.path().join("results");
    let lifecycle = manager(&bin, &results);

    let manifest = manifest::compile(3).unwrap();
    let started = lifecycle.start(&manifest, 3, "20260828_120000").await.unwrap();
    let data_dir = started.data_dir.clone();
    assert!(data_dir.is_dir());

    let mut handle = Some(started);
    lifecycle.stop(&mut handle).await;
    assert!(!data_dir.exists());
}
