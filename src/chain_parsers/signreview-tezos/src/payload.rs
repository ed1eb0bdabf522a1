use serde::Serialize;

/// Watermark of a generic operation
pub const OPERATION_WATERMARK: u8 = 0x03;
/// Watermark of packed Michelson data
pub const MICHELSON_WATERMARK: u8 = 0x05;

const BRANCH_PREFIX: [u8; 2] = [1, 52];
const BRANCH_LEN: usize = 32;

/// What a raw signing payload claims to be, from its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RawPayloadKind {
    Operation,
    MichelsonData,
    Unknown,
}

impl RawPayloadKind {
    pub fn detect(bytes: &[u8]) -> Self {
        match bytes.first() {
            Some(&OPERATION_WATERMARK) => Self::Operation,
            Some(&MICHELSON_WATERMARK) => Self::MichelsonData,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operation => "operation",
            Self::MichelsonData => "michelson data",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RawPayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Block hash an operation payload is branched from, in base58check.
pub fn operation_branch(bytes: &[u8]) -> Option<String> {
    if RawPayloadKind::detect(bytes) != RawPayloadKind::Operation {
        return None;
    }
    let branch = bytes.get(1..1 + BRANCH_LEN)?;

    let mut prefixed = Vec::with_capacity(BRANCH_PREFIX.len() + BRANCH_LEN);
    prefixed.extend_from_slice(&BRANCH_PREFIX);
    prefixed.extend_from_slice(branch);
    Some(bs58::encode(prefixed).with_check().into_string())
}
