use serde::{Deserialize, Serialize};

/// A request from a connected application, supplied once per review session.
///
/// `Op` is the chain's operation content type. The request is never mutated;
/// every view hands out borrowed slices of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SigningRequest<Op> {
    /// The application asks to connect; nothing gets signed.
    Connect {},
    /// Raw bytes to sign, with an optional decoded preview of their operations.
    #[serde(rename = "sign", alias = "sign_raw")]
    SignRaw {
        #[serde(rename = "payload", alias = "bytes", with = "hex::serde")]
        bytes: Vec<u8>,
        #[serde(skip_serializing_if = "Option::is_none")]
        preview: Option<Vec<Op>>,
    },
    /// Operations the wallet will forge and sign itself.
    ConfirmOperations {
        #[serde(rename = "opParams", alias = "operations")]
        operations: Vec<Op>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Connect,
    SignRaw,
    ConfirmOperations,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::SignRaw => "sign",
            Self::ConfirmOperations => "confirm_operations",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<Op> SigningRequest<Op> {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Connect {} => RequestKind::Connect,
            Self::SignRaw { .. } => RequestKind::SignRaw,
            Self::ConfirmOperations { .. } => RequestKind::ConfirmOperations,
        }
    }

    /// Raw byte payload, only present for [`SigningRequest::SignRaw`].
    pub fn raw_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::SignRaw { bytes, .. } => Some(bytes),
            Self::Connect {} | Self::ConfirmOperations { .. } => None,
        }
    }

    /// Operation list shown by the raw-operations view.
    pub fn operations(&self) -> Option<&[Op]> {
        match self {
            Self::SignRaw { preview, .. } => preview.as_deref(),
            Self::ConfirmOperations { operations } => Some(operations),
            Self::Connect {} => None,
        }
    }
}
