use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ReviewError;

/// Key of a presentation format. Formats are derived per request and never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKey {
    /// Decoded expense preview
    Preview,
    /// Original operation list, unmodified
    Raw,
    /// Raw byte payload, verbatim
    Bytes,
}

impl FormatKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preview => "preview",
            Self::Raw => "raw",
            Self::Bytes => "bytes",
        }
    }

    pub fn format(self) -> ViewFormat {
        let icon = match self {
            Self::Preview => IconRef::Eye,
            Self::Raw => IconRef::CodeAlt,
            Self::Bytes => IconRef::Hash,
        };
        ViewFormat {
            key: self,
            label: self.as_str(),
            icon,
        }
    }
}

impl fmt::Display for FormatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FormatKey {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preview" => Ok(Self::Preview),
            "raw" => Ok(Self::Raw),
            "bytes" => Ok(Self::Bytes),
            _ => Err(ReviewError::UnknownFormatKey(s.to_string())),
        }
    }
}

/// Icon shown next to a format in the view switcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconRef {
    Eye,
    CodeAlt,
    Hash,
}

impl IconRef {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eye => "eye",
            Self::CodeAlt => "code-alt",
            Self::Hash => "hash",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewFormat {
    pub key: FormatKey,
    /// Message id of the label, looked up by the renderer
    pub label: &'static str,
    pub icon: IconRef,
}
