use serde::{Deserialize, Serialize};
use std::fmt;

/// Device farm the run executes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CloudProvider {
    PCloudy,
    Headspin,
    BrowserStack,
    /// Local or unrecognized execution; no report link.
    #[default]
    None,
}

impl CloudProvider {
    /// Match a configured farm name, ignoring case. Unknown names map to `None`.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name.eq_ignore_ascii_case("pcloudy") {
            CloudProvider::PCloudy
        } else if name.eq_ignore_ascii_case("headspin") {
            CloudProvider::Headspin
        } else if name.eq_ignore_ascii_case("browserstack") {
            CloudProvider::BrowserStack
        } else {
            CloudProvider::None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CloudProvider::PCloudy => "pCloudy",
            CloudProvider::Headspin => "Headspin",
            CloudProvider::BrowserStack => "BrowserStack",
            CloudProvider::None => "none",
        }
    }

    /// Whether link resolution talks to the live driver, and so must happen
    /// before the session is torn down.
    pub fn requires_live_session(&self) -> bool {
        matches!(self, CloudProvider::PCloudy)
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
