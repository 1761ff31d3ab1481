//! Simulate command - drives a YAML-described suite through the full
//! scenario lifecycle on an in-memory device farm.
//!
//! Usage: scenario-lifecycle simulate <suite.yaml> [--threads N]

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde::Deserialize;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::error;

use crate::config::LifecycleConfig;
use crate::device::{SimulatedBehavior, SimulatedDevicePool};
use crate::error::LifecycleError;
use crate::lifecycle::{CaseReport, ScenarioLifecycleOrchestrator};
use crate::models::{CaseStatus, DeviceInfo, ExecutionUnit, Platform, RunResult};
use crate::telemetry::{JsonlSink, TelemetrySink, TracingSink};
use crate::utils::display_path;

#[derive(Debug, Clone, Deserialize)]
pub struct Suite {
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub devices: Vec<SuiteDevice>,
    pub scenarios: Vec<SuiteScenario>,
    #[serde(default)]
    pub behavior: SuiteBehavior,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuiteDevice {
    pub udid: String,
    pub platform: Platform,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuiteScenario {
    pub name: String,
    /// One entry per run; more than one models retries.
    #[serde(default = "default_outcomes")]
    pub outcomes: Vec<CaseStatus>,
    #[serde(default)]
    pub fail_allocation: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuiteBehavior {
    #[serde(default)]
    pub fail_native_logs: bool,
    #[serde(default)]
    pub fail_script: bool,
    #[serde(default)]
    pub fail_stop: bool,
    #[serde(default)]
    pub native_log_delay_ms: Option<u64>,
}

fn default_outcomes() -> Vec<CaseStatus> {
    vec![CaseStatus::Passed]
}

impl Suite {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read suite file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse suite file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let suite: Suite = serde_yaml::from_str(content).context("Invalid suite definition")?;
        if suite.scenarios.is_empty() {
            bail!("Suite defines no scenarios");
        }
        if let Some(s) = suite.scenarios.iter().find(|s| s.outcomes.is_empty()) {
            bail!("Scenario '{}' has no outcomes", s.name);
        }
        Ok(suite)
    }

    fn pool(&self, threads: usize) -> SimulatedDevicePool {
        let devices = if self.devices.is_empty() {
            (0..threads)
                .map(|i| DeviceInfo::new(format!("emulator-{}", 5554 + 2 * i), Platform::Android))
                .collect()
        } else {
            self.devices
                .iter()
                .map(|d| DeviceInfo::new(d.udid.clone(), d.platform.clone()))
                .collect()
        };

        let behavior = SimulatedBehavior {
            fail_allocation_for: self
                .scenarios
                .iter()
                .filter(|s| s.fail_allocation)
                .map(|s| s.name.clone())
                .collect(),
            fail_native_logs: self.behavior.fail_native_logs,
            native_log_delay: self.behavior.native_log_delay_ms.map(Duration::from_millis),
            fail_script: self.behavior.fail_script,
            fail_stop: self.behavior.fail_stop,
            ..Default::default()
        };
        SimulatedDevicePool::with_behavior(devices, behavior)
    }
}

#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub reports: Vec<CaseReport>,
    pub result: RunResult,
    pub launch_url: Option<String>,
}

/// Run every scenario of `suite` on `threads` workers.
///
/// Each worker is its own execution unit and takes whole scenarios, so runs
/// of one scenario never overlap.
pub fn run_suite(
    suite: &Suite,
    config: LifecycleConfig,
    telemetry: Arc<dyn TelemetrySink>,
    threads: usize,
) -> Result<SimulationSummary> {
    let threads = threads.max(1);
    let pool = Arc::new(suite.pool(threads));
    let orchestrator = ScenarioLifecycleOrchestrator::new(config, pool, telemetry);

    let queue: Mutex<VecDeque<SuiteScenario>> =
        Mutex::new(suite.scenarios.iter().cloned().collect());
    let reports: Mutex<Vec<CaseReport>> = Mutex::new(Vec::new());

    orchestrator.run_started();

    let outcomes: Vec<Result<()>> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..threads)
            .map(|_| {
                scope.spawn(|| -> Result<()> {
                    let unit = ExecutionUnit::current_thread();
                    loop {
                        let next = queue
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .pop_front();
                        let Some(scenario) = next else {
                            return Ok(());
                        };
                        for status in &scenario.outcomes {
                            let report = run_case(&orchestrator, unit, &scenario.name, *status)?;
                            reports
                                .lock()
                                .unwrap_or_else(PoisonError::into_inner)
                                .push(report);
                        }
                    }
                })
            })
            .collect();

        workers
            .into_iter()
            .map(|w| {
                w.join()
                    .unwrap_or_else(|_| Err(anyhow::anyhow!("worker thread panicked")))
            })
            .collect()
    });

    let reports = reports.into_inner().unwrap_or_else(PoisonError::into_inner);
    let mut result = RunResult::default();
    for report in &reports {
        if report.aborted {
            result.record_aborted();
        } else {
            result.record(report.status);
        }
    }
    let launch_url = orchestrator.run_finished(&result);

    for outcome in outcomes {
        outcome?;
    }

    Ok(SimulationSummary {
        reports,
        result,
        launch_url,
    })
}

fn run_case(
    orchestrator: &ScenarioLifecycleOrchestrator,
    unit: ExecutionUnit,
    scenario: &str,
    status: CaseStatus,
) -> Result<CaseReport> {
    let status = match orchestrator.case_started(unit, scenario) {
        Ok(_) => status,
        Err(e @ LifecycleError::DeviceAllocation { .. }) => {
            error!(%unit, scenario, error = %e, "Scenario errored before its body ran");
            CaseStatus::Failed
        }
        Err(e) => return Err(e.into()),
    };
    Ok(orchestrator.case_finished(unit, scenario, status)?)
}

/// Execute the simulate command.
pub fn execute(
    suite_path: &Path,
    threads: Option<usize>,
    config_path: Option<&Path>,
    telemetry_path: Option<&Path>,
) -> Result<()> {
    let suite = Suite::from_file(suite_path)?;
    let config = LifecycleConfig::load(config_path)?;
    let threads = threads.or(suite.threads).unwrap_or(1);

    let telemetry: Arc<dyn TelemetrySink> = match telemetry_path {
        Some(path) => Arc::new(JsonlSink::create(path)?),
        None => Arc::new(TracingSink),
    };

    println!(
        "{} Simulating {} scenario(s) on {} thread(s)",
        "→".cyan().bold(),
        suite.scenarios.len(),
        threads
    );

    let summary = run_suite(&suite, config, telemetry, threads)?;
    print_summary(&summary);

    if !summary.result.is_success() {
        bail!("Suite finished with failures: {}", summary.result);
    }
    Ok(())
}

fn print_summary(summary: &SimulationSummary) {
    let cwd = std::env::current_dir().unwrap_or_default();

    println!();
    for report in &summary.reports {
        let marker = if report.aborted {
            "!".yellow().bold()
        } else if report.status.is_ok() {
            "✓".green().bold()
        } else {
            "✗".red().bold()
        };
        let status = if report.aborted {
            "ABORTED".to_string()
        } else {
            report.status.to_string()
        };
        println!(
            "{marker} {} {} {}",
            report.scenario,
            format!("(run {})", report.run_count).dimmed(),
            status
        );
        if let Some(log) = &report.device_log {
            println!("    {} {}", "log:".dimmed(), display_path(log, &cwd));
        }
        if let Some(link) = &report.report_link {
            println!("    {} {link}", "report:".dimmed());
        }
    }

    println!();
    let line = format!("Result: {}", summary.result);
    if summary.result.is_success() {
        println!("{}", line.green().bold());
    } else {
        println!("{}", line.red().bold());
    }
    if let Some(url) = &summary.launch_url {
        println!("{} {url}", "Launch:".dimmed());
    }
}
