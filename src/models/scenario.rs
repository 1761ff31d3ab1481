use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn unsafe_chars() -> &'static Regex {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    UNSAFE.get_or_init(|| Regex::new(r"[^\p{Alphabetic}\p{Nd}_]").expect("static pattern is valid"))
}

/// Derive a filesystem-safe name from a scenario name.
///
/// Letters (any script), decimal digits and `_` are kept. Every other
/// character becomes `_`, one underscore per character, so the result never
/// contains a path separator and normalizing twice is a no-op.
pub fn normalize_scenario_name(name: &str) -> String {
    unsafe_chars().replace_all(name, "_").into_owned()
}

/// Outcome of a single scenario run as reported by the test runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    #[default]
    Passed,
    Skipped,
    Pending,
    Undefined,
    Ambiguous,
    Failed,
    Unused,
}

impl CaseStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, CaseStatus::Passed | CaseStatus::Skipped)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CaseStatus::Passed => "PASSED",
            CaseStatus::Skipped => "SKIPPED",
            CaseStatus::Pending => "PENDING",
            CaseStatus::Undefined => "UNDEFINED",
            CaseStatus::Ambiguous => "AMBIGUOUS",
            CaseStatus::Failed => "FAILED",
            CaseStatus::Unused => "UNUSED",
        };
        write!(f, "{label}")
    }
}

impl FromStr for CaseStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "passed" => Ok(CaseStatus::Passed),
            "skipped" => Ok(CaseStatus::Skipped),
            "pending" => Ok(CaseStatus::Pending),
            "undefined" => Ok(CaseStatus::Undefined),
            "ambiguous" => Ok(CaseStatus::Ambiguous),
            "failed" => Ok(CaseStatus::Failed),
            "unused" => Ok(CaseStatus::Unused),
            _ => anyhow::bail!("Unknown case status: {s}"),
        }
    }
}

/// Aggregate result delivered with the run-finished notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub passed: usize,
    pub failed: usize,
    /// Runs that never started because no device session could be allocated.
    pub aborted: usize,
    pub skipped: usize,
}

impl RunResult {
    pub fn record(&mut self, status: CaseStatus) {
        match status {
            CaseStatus::Passed => self.passed += 1,
            CaseStatus::Skipped => self.skipped += 1,
            _ => self.failed += 1,
        }
    }

    pub fn record_aborted(&mut self) {
        self.aborted += 1;
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.aborted + self.skipped
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.aborted == 0
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} passed, {} failed, {} aborted, {} skipped)",
            if self.is_success() { "SUCCESS" } else { "FAILURE" },
            self.passed,
            self.failed,
            self.aborted,
            self.skipped
        )
    }
}
