//! Native device log capture.
//!
//! Only platforms with a streamable native log buffer are captured; for every
//! other platform capture is a no-op. Capture failures degrade to an empty or
//! missing log file and never fail the run.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::LifecycleConfig;
use crate::device::DriverHandle;
use crate::models::constants::NATIVE_LOG_TYPE;
use crate::utils::run_with_timeout;

#[derive(Debug, Clone)]
pub struct DiagnosticCapture {
    report_root: PathBuf,
    device_logs_dir: String,
    timeout: Duration,
}

impl DiagnosticCapture {
    pub fn new(report_root: impl Into<PathBuf>, device_logs_dir: impl Into<String>, timeout: Duration) -> Self {
        Self {
            report_root: report_root.into(),
            device_logs_dir: device_logs_dir.into(),
            timeout,
        }
    }

    pub fn from_config(config: &LifecycleConfig) -> Self {
        Self::new(
            config.report_root.clone(),
            config.device_logs_dir.clone(),
            config.capture_timeout(),
        )
    }

    /// `{root}/{scenario}/{device logs dir}/{udid}-run-{N}.txt`, made absolute
    /// against the working directory when the root is relative. Characters of
    /// the udid that are not valid in a file name become `_`.
    pub fn log_file_path(&self, normalized_name: &str, udid: &str, run_count: u32) -> PathBuf {
        let root = if self.report_root.is_absolute() {
            self.report_root.clone()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&self.report_root))
                .unwrap_or_else(|_| self.report_root.clone())
        };
        root.join(normalized_name)
            .join(&self.device_logs_dir)
            .join(format!("{}-run-{run_count}.txt", file_safe(udid)))
    }

    /// Start capture for a run and return the log file, or `None` when the
    /// device platform has no native log stream or the file cannot be created.
    pub fn begin(
        &self,
        driver: &DriverHandle,
        normalized_name: &str,
        run_count: u32,
    ) -> Option<PathBuf> {
        let device = driver.device();
        if !device.platform.supports_native_logs() {
            debug!(platform = %device.platform, "Native log capture not supported, skipping");
            return None;
        }

        let path = self.log_file_path(normalized_name, device.udid_or_unknown(), run_count);
        if let Err(e) = ensure_file(&path) {
            warn!(path = %path.display(), error = %format!("{e:#}"), "Cannot create device log file");
            return None;
        }

        match self.stream_native_logs(driver, &path) {
            Ok(lines) => info!(path = %path.display(), lines, "Captured native device log"),
            Err(e) => info!(
                path = %path.display(),
                error = %format!("{e:#}"),
                "Error getting {NATIVE_LOG_TYPE}, skipping capture"
            ),
        }
        Some(path)
    }

    fn stream_native_logs(&self, driver: &DriverHandle, path: &Path) -> Result<usize> {
        let driver = Arc::clone(driver);
        let lines = run_with_timeout("native-log-fetch", self.timeout, move || {
            driver.native_logs(NATIVE_LOG_TYPE)
        })?;

        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("Failed to open device log: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        for line in &lines {
            writeln!(writer, "{line}")
                .with_context(|| format!("Failed to write device log: {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush device log: {}", path.display()))?;
        Ok(lines.len())
    }
}

/// Network udids look like `10.0.0.5:5555`.
fn file_safe(udid: &str) -> String {
    udid.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '.' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Create the file and its parent directories; an existing file is reused.
fn ensure_file(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    Ok(())
}
