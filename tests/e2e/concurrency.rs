//! E2E tests for several execution units sharing one orchestrator

use super::helpers::TestRun;
use scenario_lifecycle::models::{CaseStatus, ExecutionUnit};
use std::collections::HashSet;
use std::sync::Mutex;
use std::thread;

const WORKERS: usize = 4;
const SCENARIOS_PER_WORKER: usize = 5;

#[test]
fn test_parallel_units_never_see_each_others_context() {
    let run = TestRun::android(WORKERS);
    let seen_logs: Mutex<HashSet<std::path::PathBuf>> = Mutex::new(HashSet::new());

    thread::scope(|scope| {
        for worker in 0..WORKERS {
            let run = &run;
            let seen_logs = &seen_logs;
            scope.spawn(move || {
                let unit = ExecutionUnit::current_thread();
                for i in 0..SCENARIOS_PER_WORKER {
                    let scenario = format!("Worker {worker} scenario {i}");
                    let started = run.orchestrator.case_started(unit, &scenario).unwrap();
                    assert_eq!(started.run_count, 1);

                    let current = run.orchestrator.contexts().get(unit).unwrap();
                    assert_eq!(current.scenario_name, scenario);
                    assert_eq!(current.session_id(), started.session_id());

                    let report = run
                        .orchestrator
                        .case_finished(unit, &scenario, CaseStatus::Passed)
                        .unwrap();
                    assert_eq!(report.scenario, scenario);
                    seen_logs
                        .lock()
                        .unwrap()
                        .insert(report.device_log.unwrap());
                }
            });
        }
    });

    assert!(run.orchestrator.contexts().is_empty());
    assert_eq!(run.pool.active_count(), 0);
    assert_eq!(
        seen_logs.lock().unwrap().len(),
        WORKERS * SCENARIOS_PER_WORKER
    );
}

#[test]
fn test_shared_scenario_counts_every_run_across_units() {
    let run = TestRun::android(WORKERS);

    let run_counts: Mutex<Vec<u32>> = Mutex::new(Vec::new());
    thread::scope(|scope| {
        for _ in 0..WORKERS {
            scope.spawn(|| {
                let unit = ExecutionUnit::current_thread();
                for _ in 0..3 {
                    let context = run.orchestrator.case_started(unit, "Shared login").unwrap();
                    run_counts.lock().unwrap().push(context.run_count);
                    run.orchestrator
                        .case_finished(unit, "Shared login", CaseStatus::Passed)
                        .unwrap();
                }
            });
        }
    });

    let mut counts = run_counts.into_inner().unwrap();
    counts.sort();
    let expected: Vec<u32> = (1..=(WORKERS as u32 * 3)).collect();
    assert_eq!(counts, expected);
    assert_eq!(run.orchestrator.run_counter().get("Shared login"), WORKERS as u32 * 3);
}
