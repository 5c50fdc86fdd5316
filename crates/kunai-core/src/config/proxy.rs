//! Proxy selection.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How requests reach the server.
///
/// Parsed from the strings accepted by the configuration surface:
/// `"System"` (or empty) selects the platform proxy, `"Direct"` disables
/// proxying, anything else is an explicit proxy URL.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum ProxySetting {
    /// Platform default proxy.
    #[default]
    System,
    /// No proxy.
    Direct,
    /// Explicit proxy URL (`http://proxy:3128`).
    Url(String),
}

impl ProxySetting {
    /// Returns the explicit proxy URL, if any.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::System | Self::Direct => None,
        }
    }
}

impl From<&str> for ProxySetting {
    fn from(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("system") {
            Self::System
        } else if value.eq_ignore_ascii_case("direct") {
            Self::Direct
        } else {
            Self::Url(value.to_owned())
        }
    }
}

impl From<String> for ProxySetting {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl FromStr for ProxySetting {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for ProxySetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => f.write_str("System"),
            Self::Direct => f.write_str("Direct"),
            Self::Url(url) => f.write_str(url),
        }
    }
}
