/// Default root directory for per-scenario report artifacts.
pub const DEFAULT_REPORT_ROOT: &str = "reports";

/// Subdirectory (under a scenario directory) holding native device logs.
pub const DEFAULT_DEVICE_LOGS_DIR: &str = "deviceLogs";

/// Subdirectory (under a scenario directory) holding screenshots.
pub const DEFAULT_SCREENSHOTS_DIR: &str = "screenshot";

/// Native log buffer streamed during capture.
pub const NATIVE_LOG_TYPE: &str = "logcat";

/// Script executed on a live pCloudy session to obtain its report link.
pub const PCLOUDY_REPORT_SCRIPT: &str = "pCloudy_getReportLink";

pub const DEFAULT_BROWSERSTACK_API_BASE: &str =
    "https://api-cloud.browserstack.com/app-automate/sessions";

pub const DEFAULT_HEADSPIN_UI_BASE: &str = "https://ui-dev.headspin.io/sessions";

/// Upper bound for the native log fetch before capture is abandoned.
pub const DEFAULT_CAPTURE_TIMEOUT_SECS: u64 = 30;

/// Upper bound for a report-link lookup (script or HTTP request).
pub const DEFAULT_REPORT_LINK_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Number of shards in the execution context store.
pub const CONTEXT_STORE_SHARDS: usize = 16;

/// Placeholder used in log file names when the device reports no udid.
pub const UNKNOWN_UDID: &str = "none";
