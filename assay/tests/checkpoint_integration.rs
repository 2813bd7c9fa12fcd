//! Checkpoints driven from config files, through the library and the binary.

mod common;

use assay::config::CheckpointConfig;
use assay::core::{ValidationResult, ValidationRunner};
use assay::logging::LogConfig;
use assay::store::{FileSuiteStore, SuiteStore};
use common::{taxi_suite, write_taxi_csv, SUITE_NAME};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Lays out suites/, data/ and a checkpoint.json under `dir`.
fn write_project(dir: &Path, csv: Option<&str>) -> PathBuf {
    let store = FileSuiteStore::new(dir.join("suites")).unwrap();
    store.save(&taxi_suite()).unwrap();

    let data_path = write_taxi_csv(dir);
    if let Some(contents) = csv {
        std::fs::write(&data_path, contents).unwrap();
    }

    let config = json!({
        "name": "yellowtaxi_checkpoint",
        "suite_store": "suites",
        "suite": SUITE_NAME,
        "source": { "type": "csv", "path": "data/yellow_tripdata_sample.csv" },
        "sample_limit": 5,
        "reports": [
            { "format": "json", "path": "reports/result.json" },
            { "format": "markdown", "path": "reports/result.md" },
            { "format": "human", "path": "reports/result.txt" }
        ]
    });
    let config_path = dir.join("checkpoint.json");
    std::fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    config_path
}

const CLEAN_CSV: &str = "vendor_id,passenger_count\n1,1\n2,4\n";

#[tokio::test]
async fn test_checkpoint_from_config_writes_reports() {
    let dir = TempDir::new().unwrap();
    let config_path = write_project(dir.path(), None);

    let config = CheckpointConfig::from_file(&config_path).unwrap();
    let runner = ValidationRunner::new(config.runner_config(LogConfig::default()));
    let registry = config.load_registry().unwrap();
    let run = config
        .build_checkpoint()
        .unwrap()
        .run(&registry, &runner)
        .await
        .unwrap();

    assert_eq!(run.checkpoint_name, "yellowtaxi_checkpoint");
    assert!(!run.result.success);

    let json = std::fs::read_to_string(dir.path().join("reports/result.json")).unwrap();
    let written: ValidationResult = serde_json::from_str(&json).unwrap();
    assert_eq!(written, run.result);

    let markdown = std::fs::read_to_string(dir.path().join("reports/result.md")).unwrap();
    assert!(markdown.contains("Validation Report - FAILED"));

    let text = std::fs::read_to_string(dir.path().join("reports/result.txt")).unwrap();
    assert!(text.contains("Suite: yellowtaxi_suite"));
    assert!(!text.contains("\x1b["));
}

#[tokio::test]
async fn test_each_run_gets_a_fresh_id() {
    let dir = TempDir::new().unwrap();
    let config_path = write_project(dir.path(), Some(CLEAN_CSV));

    let config = CheckpointConfig::from_file(&config_path).unwrap();
    let runner = ValidationRunner::default();
    let registry = config.load_registry().unwrap();
    let checkpoint = config.build_checkpoint().unwrap();

    let first = checkpoint.run(&registry, &runner).await.unwrap();
    let second = checkpoint.run(&registry, &runner).await.unwrap();
    assert!(first.result.success);
    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.result, second.result);
}

#[test]
fn test_binary_exit_codes() {
    let failing = TempDir::new().unwrap();
    let status = Command::new(env!("CARGO_BIN_EXE_assay-checkpoint"))
        .arg("--config")
        .arg(write_project(failing.path(), None))
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
    assert!(failing.path().join("reports/result.json").is_file());

    let passing = TempDir::new().unwrap();
    let status = Command::new(env!("CARGO_BIN_EXE_assay-checkpoint"))
        .arg("--config")
        .arg(write_project(passing.path(), Some(CLEAN_CSV)))
        .arg("--json-logs")
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(0));

    let status = Command::new(env!("CARGO_BIN_EXE_assay-checkpoint"))
        .arg("--config")
        .arg(passing.path().join("missing.json"))
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
}
