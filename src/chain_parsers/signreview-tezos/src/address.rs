//! Tezos account and contract addresses.
//!
//! Addresses show up in two encodings: the base58check text form
//! (`tz1...`, `KT1...`) and the 22-byte binary form used by packed Michelson
//! data. Both are normalized to the checksum-verified text form so that
//! addresses compare equal regardless of how a parameter tree spelled them.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static ADDRESS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(tz[1-4]|KT1)[1-9A-HJ-NP-Za-km-z]{33}$").expect("Valid address pattern")
});

const HASH_LEN: usize = 20;
const BINARY_LEN: usize = 22;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("not a tezos address: {0}")]
    Malformed(String),
    #[error("bad checksum or prefix: {0}")]
    Checksum(String),
    #[error("unsupported binary address: {0}")]
    Binary(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    /// tz1
    Ed25519,
    /// tz2
    Secp256k1,
    /// tz3
    P256,
    /// tz4
    Bls,
    /// KT1
    Originated,
}

impl AddressKind {
    fn text_prefix(self) -> &'static str {
        match self {
            Self::Ed25519 => "tz1",
            Self::Secp256k1 => "tz2",
            Self::P256 => "tz3",
            Self::Bls => "tz4",
            Self::Originated => "KT1",
        }
    }

    fn version_bytes(self) -> [u8; 3] {
        match self {
            Self::Ed25519 => [6, 161, 159],
            Self::Secp256k1 => [6, 161, 161],
            Self::P256 => [6, 161, 164],
            Self::Bls => [6, 161, 166],
            Self::Originated => [2, 90, 121],
        }
    }

    fn from_text_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "tz1" => Some(Self::Ed25519),
            "tz2" => Some(Self::Secp256k1),
            "tz3" => Some(Self::P256),
            "tz4" => Some(Self::Bls),
            "KT1" => Some(Self::Originated),
            _ => None,
        }
    }

    fn from_curve_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Ed25519),
            1 => Some(Self::Secp256k1),
            2 => Some(Self::P256),
            3 => Some(Self::Bls),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    text: String,
    kind: AddressKind,
}

impl Address {
    /// Parses and checksum-verifies the base58check text form.
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        if !ADDRESS_PATTERN.is_match(text) {
            return Err(AddressError::Malformed(text.to_string()));
        }
        let kind = AddressKind::from_text_prefix(&text[..3])
            .ok_or_else(|| AddressError::Malformed(text.to_string()))?;

        let payload = bs58::decode(text)
            .with_check(None)
            .into_vec()
            .map_err(|_| AddressError::Checksum(text.to_string()))?;
        if payload.len() != 3 + HASH_LEN || payload[..3] != kind.version_bytes() {
            return Err(AddressError::Checksum(text.to_string()));
        }

        Ok(Self {
            text: text.to_string(),
            kind,
        })
    }

    /// Decodes the 22-byte binary form: `00 <curve> <hash>` for implicit
    /// accounts, `01 <hash> 00` for originated contracts.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        if bytes.len() != BINARY_LEN {
            return Err(AddressError::Binary(hex::encode(bytes)));
        }

        let (kind, hash) = match bytes[0] {
            0x00 => {
                let kind = AddressKind::from_curve_tag(bytes[1])
                    .ok_or_else(|| AddressError::Binary(hex::encode(bytes)))?;
                (kind, &bytes[2..])
            }
            0x01 if bytes[BINARY_LEN - 1] == 0x00 => {
                (AddressKind::Originated, &bytes[1..BINARY_LEN - 1])
            }
            _ => return Err(AddressError::Binary(hex::encode(bytes))),
        };

        Ok(Self::from_hash(kind, hash))
    }

    /// Hex variant of [`Self::from_bytes`], as carried by Micheline `bytes` nodes.
    pub fn from_hex(text: &str) -> Result<Self, AddressError> {
        let bytes = hex::decode(text).map_err(|_| AddressError::Binary(text.to_string()))?;
        Self::from_bytes(&bytes)
    }

    fn from_hash(kind: AddressKind, hash: &[u8]) -> Self {
        let mut payload = Vec::with_capacity(3 + HASH_LEN);
        payload.extend_from_slice(&kind.version_bytes());
        payload.extend_from_slice(hash);

        Self {
            text: bs58::encode(payload).with_check().into_string(),
            kind,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    pub fn is_contract(&self) -> bool {
        self.kind == AddressKind::Originated
    }

    pub fn prefix(&self) -> &'static str {
        self.kind.text_prefix()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.text
    }
}

impl PartialEq<str> for Address {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}
