//! E2E tests for a single execution unit walking through whole runs

use super::helpers::{android_devices, TestRun};
use scenario_lifecycle::lifecycle::EventOutcome;
use scenario_lifecycle::models::{CaseStatus, DeviceInfo, ExecutionUnit, Platform, RunResult};
use scenario_lifecycle::telemetry::TelemetryLevel;
use scenario_lifecycle::{LifecycleConfig, LifecycleError, LifecycleEvent};

#[test]
fn test_login_run_then_reissue() {
    let run = TestRun::android(1);
    let unit = ExecutionUnit::new(1);

    let context = run.orchestrator.case_started(unit, "Login").unwrap();
    assert_eq!(context.run_count, 1);
    assert_eq!(context.normalized_name, "Login");
    assert_eq!(context.device_id(), Some("emulator-5554"));
    assert!(run.orchestrator.contexts().contains(unit));

    let log = context.device_log.clone().unwrap();
    assert!(log.ends_with("reports/Login/deviceLogs/emulator-5554-run-1.txt"));
    let content = std::fs::read_to_string(&log).unwrap();
    assert!(content.contains("onResume"));

    let report = run
        .orchestrator
        .case_finished(unit, "Login", CaseStatus::Passed)
        .unwrap();
    assert_eq!(report.run_count, 1);
    assert!(!report.aborted);
    assert!(report.report_link.is_none());
    assert!(!run.orchestrator.contexts().contains(unit));
    assert_eq!(run.pool.active_count(), 0);

    let attachments: Vec<_> = run
        .sink
        .records()
        .into_iter()
        .filter(|r| r.attachment.is_some())
        .collect();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].message, "ADB Logs");
    assert_eq!(attachments[0].level, TelemetryLevel::Debug);

    let context = run.orchestrator.case_started(unit, "Login").unwrap();
    assert_eq!(context.run_count, 2);
    assert!(context
        .device_log
        .unwrap()
        .ends_with("emulator-5554-run-2.txt"));
    run.orchestrator
        .case_finished(unit, "Login", CaseStatus::Failed)
        .unwrap();
    assert_eq!(run.orchestrator.run_counter().get("Login"), 2);
}

#[test]
fn test_ios_run_has_no_device_log() {
    let run = TestRun::with(
        vec![DeviceInfo::new("00008110-001", Platform::Ios)],
        LifecycleConfig::default(),
    );
    let unit = ExecutionUnit::new(1);

    let context = run.orchestrator.case_started(unit, "Checkout").unwrap();
    assert!(context.device_log.is_none());

    let report = run
        .orchestrator
        .case_finished(unit, "Checkout", CaseStatus::Passed)
        .unwrap();
    assert!(report.device_log.is_none());
    assert!(run.sink.records().iter().all(|r| r.attachment.is_none()));
    assert!(!run.temp.path().join("reports/Checkout/deviceLogs").exists());
}

#[test]
fn test_allocation_failure_aborts_only_that_run() {
    let run = TestRun::android(1);
    let unit = ExecutionUnit::new(1);

    run.orchestrator.case_started(unit, "First").unwrap();
    // The only device is held by another unit.
    let other = ExecutionUnit::new(2);
    let err = run.orchestrator.case_started(other, "Second").unwrap_err();
    assert!(matches!(err, LifecycleError::DeviceAllocation { .. }));
    assert!(!run.orchestrator.contexts().contains(other));

    let aborted = run
        .orchestrator
        .case_finished(other, "Second", CaseStatus::Failed)
        .unwrap();
    assert!(aborted.aborted);
    assert_eq!(aborted.run_count, 1);

    run.orchestrator
        .case_finished(unit, "First", CaseStatus::Passed)
        .unwrap();

    // The device is free again, so the retry goes through.
    let context = run.orchestrator.case_started(other, "Second").unwrap();
    assert_eq!(context.run_count, 2);
}

#[test]
fn test_event_stream_for_a_whole_run() {
    let run = TestRun::with(android_devices(1), LifecycleConfig::default());
    let unit = ExecutionUnit::new(3);

    let events = vec![
        LifecycleEvent::RunStarted,
        LifecycleEvent::CaseStarted {
            unit,
            scenario: "Search".to_string(),
        },
        LifecycleEvent::CaseFinished {
            unit,
            scenario: "Search".to_string(),
            status: CaseStatus::Passed,
        },
        LifecycleEvent::RunFinished {
            result: RunResult {
                passed: 1,
                ..Default::default()
            },
        },
    ];

    let outcomes: Vec<EventOutcome> = events
        .into_iter()
        .map(|e| run.orchestrator.handle(e).unwrap())
        .collect();

    assert_eq!(outcomes[0], EventOutcome::RunStarted);
    assert_eq!(outcomes[1], EventOutcome::CaseStarted { run_count: 1 });
    assert!(matches!(&outcomes[2], EventOutcome::CaseFinished(r) if r.scenario == "Search"));
    assert_eq!(outcomes[3], EventOutcome::RunFinished { launch_url: None });
    assert!(run.pool.is_shut_down());
    assert!(run.sink.is_finalized());
}
