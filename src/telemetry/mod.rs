//! Telemetry sinks that receive report links and run artifacts.
//!
//! Sink failures are the caller's to swallow: [`emit_best_effort`] logs and
//! discards them so the lifecycle never fails because reporting did.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TelemetryLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for TelemetryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryLevel::Trace => write!(f, "TRACE"),
            TelemetryLevel::Debug => write!(f, "DEBUG"),
            TelemetryLevel::Info => write!(f, "INFO"),
            TelemetryLevel::Warn => write!(f, "WARN"),
            TelemetryLevel::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub message: String,
    pub level: TelemetryLevel,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<PathBuf>,
}

impl TelemetryRecord {
    pub fn new(message: impl Into<String>, level: TelemetryLevel) -> Self {
        Self {
            message: message.into(),
            level,
            timestamp: Utc::now(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachment = Some(path.into());
        self
    }
}

pub trait TelemetrySink: Send + Sync {
    fn emit(&self, record: &TelemetryRecord) -> Result<()>;

    /// Close the reporting session. May return a URL for the whole launch.
    fn finalize(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Emit a record, logging and discarding any sink failure.
pub fn emit_best_effort(sink: &dyn TelemetrySink, record: TelemetryRecord) {
    if let Err(e) = sink.emit(&record) {
        warn!(message = %record.message, error = %format!("{e:#}"), "Telemetry emit failed");
    }
}

/// Sink that only writes records to the process log.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn emit(&self, record: &TelemetryRecord) -> Result<()> {
        match &record.attachment {
            Some(path) => info!(
                level = %record.level,
                attachment = %path.display(),
                "{}",
                record.message
            ),
            None => info!(level = %record.level, "{}", record.message),
        }
        Ok(())
    }
}

/// Sink appending one JSON object per record to a file.
pub struct JsonlSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlSink {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open telemetry file: {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TelemetrySink for JsonlSink {
    fn emit(&self, record: &TelemetryRecord) -> Result<()> {
        let line = serde_json::to_string(record).context("Failed to serialize telemetry record")?;
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(file, "{line}")
            .with_context(|| format!("Failed to write telemetry file: {}", self.path.display()))
    }

    fn finalize(&self) -> Result<Option<String>> {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
            .with_context(|| format!("Failed to flush telemetry file: {}", self.path.display()))?;
        debug!(path = %self.path.display(), "Telemetry file finalized");
        Ok(Some(format!("file://{}", self.path.display())))
    }
}

/// Sink collecting records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<TelemetryRecord>>,
    finalized: AtomicBool,
    failing: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every call fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<TelemetryRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.load(Ordering::SeqCst)
    }
}

impl TelemetrySink for MemorySink {
    fn emit(&self, record: &TelemetryRecord) -> Result<()> {
        if self.failing {
            anyhow::bail!("telemetry endpoint unavailable");
        }
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }

    fn finalize(&self) -> Result<Option<String>> {
        if self.failing {
            anyhow::bail!("telemetry endpoint unavailable");
        }
        self.finalized.store(true, Ordering::SeqCst);
        Ok(None)
    }
}
