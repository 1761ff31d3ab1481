//! E2E tests for report links from cloud device farms

use super::helpers::{android_devices, serve_json_once, TestRun};
use scenario_lifecycle::models::{CaseStatus, ExecutionUnit};
use scenario_lifecycle::report::CloudProvider;
use scenario_lifecycle::LifecycleConfig;

fn cloud_config(name: &str) -> LifecycleConfig {
    LifecycleConfig {
        cloud_name: name.to_string(),
        cloud_execution: true,
        ..Default::default()
    }
}

#[test]
fn test_browserstack_link_is_fetched_with_credentials() {
    let link = "https://app-automate.browserstack.com/builds/b1/sessions/s1";
    let (base, server) = serve_json_once(
        "200 OK",
        format!(r#"{{"automation_session":{{"name":"Login","browser_url":"{link}"}}}}"#),
    );
    let config = LifecycleConfig {
        cloud_user: Some("alice".to_string()),
        cloud_key: Some("s3cret".to_string()),
        browserstack_api_base: format!("{base}/sessions"),
        ..cloud_config("BrowserStack")
    };
    let run = TestRun::with(android_devices(1), config);
    assert_eq!(run.orchestrator.provider(), CloudProvider::BrowserStack);

    let unit = ExecutionUnit::new(1);
    let context = run.orchestrator.case_started(unit, "Login").unwrap();
    let session_id = context.session_id().unwrap();

    let report = run
        .orchestrator
        .case_finished(unit, "Login", CaseStatus::Passed)
        .unwrap();
    assert_eq!(report.report_link.as_deref(), Some(link));

    let request = server.join().unwrap();
    assert!(request.starts_with(&format!("GET /sessions/{session_id}.json ")));
    assert!(request
        .to_ascii_lowercase()
        .contains("authorization: basic ywxpy2u6cznjcmv0"));

    let messages: Vec<String> = run.sink.records().into_iter().map(|r| r.message).collect();
    assert!(messages.contains(&format!("BrowserStack Report link available here: {link}")));
}

#[test]
fn test_browserstack_error_status_leaves_run_intact() {
    let (base, server) = serve_json_once("404 Not Found", r#"{"error":"not found"}"#.to_string());
    let config = LifecycleConfig {
        browserstack_api_base: format!("{base}/sessions"),
        ..cloud_config("browserstack")
    };
    let run = TestRun::with(android_devices(1), config);
    let unit = ExecutionUnit::new(1);

    run.orchestrator.case_started(unit, "Login").unwrap();
    let report = run
        .orchestrator
        .case_finished(unit, "Login", CaseStatus::Failed)
        .unwrap();
    server.join().unwrap();

    assert!(report.report_link.is_none());
    assert!(report.device_log.is_some());
    assert_eq!(run.pool.active_count(), 0);
}

#[test]
fn test_headspin_link_is_built_from_session_id() {
    let config = LifecycleConfig {
        headspin_ui_base: "https://ui.headspin.test/sessions".to_string(),
        ..cloud_config("Headspin")
    };
    let run = TestRun::with(android_devices(1), config);
    let unit = ExecutionUnit::new(1);

    let context = run.orchestrator.case_started(unit, "Search").unwrap();
    let session_id = context.session_id().unwrap();
    let report = run
        .orchestrator
        .case_finished(unit, "Search", CaseStatus::Passed)
        .unwrap();

    assert_eq!(
        report.report_link,
        Some(format!("https://ui.headspin.test/sessions/{session_id}/waterfall"))
    );
}

#[test]
fn test_pcloudy_link_comes_from_live_session() {
    let run = TestRun::with(android_devices(1), cloud_config("pCloudy"));
    let unit = ExecutionUnit::new(1);

    let context = run.orchestrator.case_started(unit, "Cart").unwrap();
    let session_id = context.session_id().unwrap();
    let report = run
        .orchestrator
        .case_finished(unit, "Cart", CaseStatus::Passed)
        .unwrap();

    assert_eq!(
        report.report_link,
        Some(format!("https://device.pcloudy.com/reports/{session_id}"))
    );
    assert!(context.session_id().is_none());
}

#[test]
fn test_local_execution_ignores_cloud_name() {
    let config = LifecycleConfig {
        cloud_execution: false,
        ..cloud_config("pCloudy")
    };
    let run = TestRun::with(android_devices(1), config);
    assert_eq!(run.orchestrator.provider(), CloudProvider::None);

    let unit = ExecutionUnit::new(1);
    run.orchestrator.case_started(unit, "Cart").unwrap();
    let report = run
        .orchestrator
        .case_finished(unit, "Cart", CaseStatus::Passed)
        .unwrap();
    assert!(report.report_link.is_none());
}
