use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Target platform of an allocated device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    Android,
    Ios,
    Windows,
    Other(String),
}

impl Platform {
    /// Only Android exposes a native log buffer that can be streamed.
    pub fn supports_native_logs(&self) -> bool {
        matches!(self, Platform::Android)
    }
}

impl From<&str> for Platform {
    fn from(name: &str) -> Self {
        if name.eq_ignore_ascii_case("android") {
            Platform::Android
        } else if name.eq_ignore_ascii_case("ios") {
            Platform::Ios
        } else if name.eq_ignore_ascii_case("windows") {
            Platform::Windows
        } else {
            Platform::Other(name.to_string())
        }
    }
}

impl From<String> for Platform {
    fn from(name: String) -> Self {
        Platform::from(name.as_str())
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.to_string()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Android => write!(f, "android"),
            Platform::Ios => write!(f, "ios"),
            Platform::Windows => write!(f, "windows"),
            Platform::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Identity and metadata of the device bound to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub udid: Option<String>,
    pub platform: Platform,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub os_version: Option<String>,
    #[serde(default)]
    pub capabilities: BTreeMap<String, serde_json::Value>,
}

impl DeviceInfo {
    pub fn new(udid: impl Into<String>, platform: impl Into<Platform>) -> Self {
        Self {
            udid: Some(udid.into()),
            platform: platform.into(),
            device_name: None,
            os_version: None,
            capabilities: BTreeMap::new(),
        }
    }

    pub fn with_capability(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.capabilities.insert(name.into(), value);
        self
    }

    /// Capability rendered as a string; empty when the capability is absent.
    pub fn capability(&self, name: &str) -> String {
        match self.capabilities.get(name) {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn udid_or_unknown(&self) -> &str {
        self.udid
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(crate::models::constants::UNKNOWN_UDID)
    }
}
