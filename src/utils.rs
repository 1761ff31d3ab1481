use anyhow::{anyhow, Result};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Run a blocking call on a helper thread and give up after `timeout`.
///
/// On timeout the helper thread is detached and left to finish on its own;
/// the caller gets an error immediately. A panic inside `f` is reported as an
/// error as well.
pub fn run_with_timeout<T, F>(label: &str, timeout: Duration, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name(format!("timeout-{label}"))
        .spawn(move || {
            let _ = tx.send(f());
        })
        .map_err(|e| anyhow!("{label}: failed to spawn worker thread: {e}"))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            Err(anyhow!("{label}: timed out after {}ms", timeout.as_millis()))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(anyhow!("{label}: worker exited without a result"))
        }
    }
}

/// Display a path relative to base_dir, or just filename if outside.
pub fn display_path(path: &Path, base_dir: &Path) -> String {
    path.strip_prefix(base_dir)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| {
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "[path]".to_string())
        })
}

/// Truncate a string safely by character count, not byte count.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}
