use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info, warn};

use super::events::{CaseReport, EventOutcome, LifecycleEvent};
use crate::capture::DiagnosticCapture;
use crate::config::LifecycleConfig;
use crate::context::{ExecutionContext, ExecutionContextStore};
use crate::counter::RunCounter;
use crate::device::{DevicePool, DeviceSessionAllocator};
use crate::error::{LifecycleError, Result};
use crate::models::{normalize_scenario_name, CaseStatus, ExecutionUnit, RunPhase, RunResult};
use crate::report::{CloudProvider, ReportLinkResolver};
use crate::telemetry::{emit_best_effort, TelemetryLevel, TelemetryRecord, TelemetrySink};

/// Attachment message for captured native device logs.
const DEVICE_LOG_MESSAGE: &str = "ADB Logs";

/// Coordinates every scenario run of a test session.
///
/// One instance serves all execution units concurrently. Shared state is the
/// run counter and the context store; everything else is per unit.
pub struct ScenarioLifecycleOrchestrator {
    config: LifecycleConfig,
    counter: RunCounter,
    contexts: Arc<ExecutionContextStore>,
    pool: Arc<dyn DevicePool>,
    allocator: DeviceSessionAllocator,
    capture: DiagnosticCapture,
    resolver: ReportLinkResolver,
    telemetry: Arc<dyn TelemetrySink>,
    /// Units whose last start failed allocation, with the run number consumed.
    aborted: Mutex<HashMap<ExecutionUnit, u32>>,
}

impl ScenarioLifecycleOrchestrator {
    pub fn new(
        config: LifecycleConfig,
        pool: Arc<dyn DevicePool>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self::with_context_store(config, pool, telemetry, Arc::new(ExecutionContextStore::new()))
    }

    /// Build an orchestrator around an existing context store, so test code
    /// can hold the store directly.
    pub fn with_context_store(
        config: LifecycleConfig,
        pool: Arc<dyn DevicePool>,
        telemetry: Arc<dyn TelemetrySink>,
        contexts: Arc<ExecutionContextStore>,
    ) -> Self {
        let resolver = ReportLinkResolver::from_config(&config);
        info!(provider = %resolver.provider(), "Scenario lifecycle configured");

        Self {
            allocator: DeviceSessionAllocator::new(Arc::clone(&pool)),
            capture: DiagnosticCapture::from_config(&config),
            resolver,
            counter: RunCounter::new(),
            contexts,
            pool,
            telemetry,
            config,
            aborted: Mutex::new(HashMap::new()),
        }
    }

    pub fn contexts(&self) -> &Arc<ExecutionContextStore> {
        &self.contexts
    }

    pub fn run_counter(&self) -> &RunCounter {
        &self.counter
    }

    pub fn provider(&self) -> CloudProvider {
        self.resolver.provider()
    }

    /// Dispatch a runner notification.
    pub fn handle(&self, event: LifecycleEvent) -> Result<EventOutcome> {
        match event {
            LifecycleEvent::RunStarted => {
                self.run_started();
                Ok(EventOutcome::RunStarted)
            }
            LifecycleEvent::CaseStarted { unit, scenario } => {
                let context = self.case_started(unit, &scenario)?;
                Ok(EventOutcome::CaseStarted {
                    run_count: context.run_count,
                })
            }
            LifecycleEvent::CaseFinished {
                unit,
                scenario,
                status,
            } => self
                .case_finished(unit, &scenario, status)
                .map(EventOutcome::CaseFinished),
            LifecycleEvent::RunFinished { result } => Ok(EventOutcome::RunFinished {
                launch_url: self.run_finished(&result),
            }),
        }
    }

    pub fn run_started(&self) {
        info!(
            provider = %self.provider(),
            report_root = %self.config.report_root.display(),
            "Test run started"
        );
    }

    /// Prepare a run: count it, bind a live device session, start log
    /// capture and register the execution context.
    ///
    /// Fails with [`LifecycleError::DeviceAllocation`] when no session can be
    /// started; the scenario body must not run in that case.
    pub fn case_started(&self, unit: ExecutionUnit, scenario: &str) -> Result<ExecutionContext> {
        info!("$$$$$   TEST-CASE  -- {scenario}  STARTED   $$$$$");

        if self.contexts.contains(unit) {
            error!(%unit, scenario, "Case started while a previous run is still registered");
            return Err(LifecycleError::DuplicateContext { unit });
        }
        let phase = RunPhase::Idle.try_transition(unit, RunPhase::Starting)?;

        let run_count = self.counter.increment(scenario);
        let normalized = normalize_scenario_name(scenario);
        debug!(%unit, scenario, run = run_count, normalized = %normalized, "Preparing run");

        let driver = match self.allocator.ensure_session(unit, scenario) {
            Ok(driver) => driver,
            Err(e) => {
                error!(%unit, scenario, run = run_count, error = %e, "Run aborted before start");
                self.aborted_units().insert(unit, run_count);
                return Err(e);
            }
        };
        self.aborted_units().remove(&unit);

        let device_log = self.capture.begin(&driver, &normalized, run_count);

        let mut context = ExecutionContext::new(scenario, &normalized, run_count, driver);
        context.device_log = device_log;
        context.scenario_directory = self.config.scenario_directory(&normalized);
        context.screenshots_directory = self.config.screenshots_directory(&normalized);
        context.phase = phase.try_transition(unit, RunPhase::Running)?;

        if let Err(e) = self.contexts.create(unit, context.clone()) {
            self.allocator.teardown_session(unit);
            return Err(e);
        }

        info!(
            %unit,
            scenario,
            run = run_count,
            udid = context.device.udid_or_unknown(),
            device_log = ?context.device_log,
            "Run context registered"
        );
        Ok(context)
    }

    /// Close a run: resolve the report link while the session is still
    /// alive, tear the session down, attach the device log and drop the
    /// context.
    pub fn case_finished(
        &self,
        unit: ExecutionUnit,
        scenario: &str,
        status: CaseStatus,
    ) -> Result<CaseReport> {
        info!(%unit, scenario, %status, "Case finished");

        let aborted_run = self.aborted_units().remove(&unit);
        if let Some(run_count) = aborted_run {
            warn!(%unit, scenario, run = run_count, "Run never started, releasing any stale session");
            self.allocator.teardown_session(unit);
            return Ok(CaseReport {
                unit,
                scenario: scenario.to_string(),
                status,
                run_count,
                report_link: None,
                device_log: None,
                aborted: true,
            });
        }

        let context = match self.contexts.get(unit) {
            Ok(context) => context,
            Err(e) => {
                error!(%unit, scenario, "Case finished without a registered context");
                self.allocator.teardown_session(unit);
                return Err(e);
            }
        };
        // A bad phase is reported only after cleanup has run.
        let violation = self
            .contexts
            .update(unit, |ctx| {
                let checked = ctx.phase.try_transition(unit, RunPhase::Finishing);
                ctx.phase = RunPhase::Finishing;
                checked.err()
            })?;
        if let Some(e) = &violation {
            error!(%unit, scenario, error = %e, "Context was not running at case finish");
        }

        let report_link = self.publish_report_link(&context);
        self.allocator.teardown_session(unit);
        self.attach_device_log(context.device_log.as_ref());

        let removed = self.contexts.remove(unit)?;
        RunPhase::Finishing.try_transition(unit, RunPhase::Idle)?;
        if let Some(e) = violation {
            return Err(e);
        }

        info!("$$$$$   TEST-CASE  -- {scenario}  ENDED   $$$$$");
        Ok(CaseReport {
            unit,
            scenario: removed.scenario_name,
            status,
            run_count: removed.run_count,
            report_link,
            device_log: removed.device_log,
            aborted: false,
        })
    }

    /// Global teardown: release the device pool and close the reporting
    /// session. Returns the launch URL if the sink produced one.
    pub fn run_finished(&self, result: &RunResult) -> Option<String> {
        info!(%result, "Test run finished");

        let leftover = self.contexts.units();
        if !leftover.is_empty() {
            warn!(units = ?leftover, "Execution contexts still registered at end of run");
        }
        let unfinished: Vec<ExecutionUnit> = {
            let mut aborted = self.aborted_units();
            let mut units: Vec<_> = aborted.drain().map(|(unit, _)| unit).collect();
            units.sort();
            units
        };
        if !unfinished.is_empty() {
            warn!(units = ?unfinished, "Aborted runs never received a case finish");
        }

        if let Err(e) = self.pool.shutdown() {
            warn!(error = %format!("{e:#}"), "Device pool teardown failed");
        }

        match self.telemetry.finalize() {
            Ok(Some(url)) => {
                info!(%url, "Reporting session finalized");
                Some(url)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Failed to finalize reporting session");
                None
            }
        }
    }

    fn publish_report_link(&self, context: &ExecutionContext) -> Option<String> {
        let link = self.resolver.resolve(&context.driver)?;
        let message = format!("{} Report link available here: {link}", self.provider().label());
        info!("{message}");
        emit_best_effort(
            self.telemetry.as_ref(),
            TelemetryRecord::new(message, TelemetryLevel::Debug),
        );
        Some(link)
    }

    fn attach_device_log(&self, device_log: Option<&PathBuf>) {
        let Some(path) = device_log else {
            return;
        };
        info!(path = %path.display(), "Attaching device log");
        emit_best_effort(
            self.telemetry.as_ref(),
            TelemetryRecord::new(DEVICE_LOG_MESSAGE, TelemetryLevel::Debug).with_attachment(path),
        );
    }

    fn aborted_units(&self) -> std::sync::MutexGuard<'_, HashMap<ExecutionUnit, u32>> {
        self.aborted.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
