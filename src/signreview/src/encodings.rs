use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD as b64};

// Raw signing payloads are shown verbatim. These are the textual encodings a
// raw-bytes view can render them in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SupportedEncodings {
    Base64,
    #[default]
    Hex,
}

impl SupportedEncodings {
    /// Convert encoding to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base64 => "base64",
            Self::Hex => "hex",
        }
    }

    /// Render raw bytes in this encoding
    pub fn encode(&self, bytes: &[u8]) -> String {
        match self {
            Self::Base64 => b64.encode(bytes),
            Self::Hex => hex::encode(bytes),
        }
    }
}

impl fmt::Display for SupportedEncodings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SupportedEncodings {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "base64" => Ok(Self::Base64),
            "hex" => Ok(Self::Hex),
            _ => Err(format!(
                "Unsupported encoding format: {s}. Supported formats are: base64, hex"
            )),
        }
    }
}
