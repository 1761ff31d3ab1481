//! E2E tests for the simulate command's suite runner

use scenario_lifecycle::commands::simulate::{run_suite, Suite};
use scenario_lifecycle::telemetry::{JsonlSink, TelemetryRecord};
use scenario_lifecycle::LifecycleConfig;
use std::sync::Arc;
use tempfile::TempDir;

const SUITE: &str = r#"
threads: 3
devices:
  - udid: emulator-5554
    platform: android
  - udid: emulator-5556
    platform: Android
  - udid: iphone-15
    platform: iOS
scenarios:
  - name: "Login: valid user"
  - name: "Login: locked user"
    outcomes: [failed, failed, passed]
  - name: Search
  - name: Checkout
    outcomes: [skipped]
"#;

#[test]
fn test_suite_file_runs_to_completion_with_jsonl_telemetry() {
    let temp = TempDir::new().unwrap();
    let suite_path = temp.path().join("suite.yaml");
    std::fs::write(&suite_path, SUITE).unwrap();
    let telemetry_path = temp.path().join("telemetry.jsonl");

    let suite = Suite::from_file(&suite_path).unwrap();
    let config = LifecycleConfig {
        report_root: temp.path().join("reports"),
        ..Default::default()
    };
    let sink = Arc::new(JsonlSink::create(&telemetry_path).unwrap());

    let summary = run_suite(&suite, config, sink, 3).unwrap();

    assert_eq!(summary.reports.len(), 6);
    assert_eq!(summary.result.passed, 3);
    assert_eq!(summary.result.failed, 2);
    assert_eq!(summary.result.skipped, 1);
    assert!(!summary.result.is_success());
    assert_eq!(
        summary.launch_url,
        Some(format!("file://{}", telemetry_path.display()))
    );

    let locked_runs: Vec<u32> = summary
        .reports
        .iter()
        .filter(|r| r.scenario == "Login: locked user")
        .map(|r| r.run_count)
        .collect();
    assert_eq!(locked_runs, vec![1, 2, 3]);

    let records: Vec<TelemetryRecord> = std::fs::read_to_string(&telemetry_path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let attached = records.iter().filter(|r| r.attachment.is_some()).count();
    let with_log = summary
        .reports
        .iter()
        .filter(|r| r.device_log.is_some())
        .count();
    assert_eq!(attached, with_log);
    assert!(records
        .iter()
        .filter(|r| r.attachment.is_some())
        .all(|r| r.message == "ADB Logs"));
}
