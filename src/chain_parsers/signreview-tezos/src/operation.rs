use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use signreview::amount::parse_nat;

use crate::address::Address;

pub const DEFAULT_ENTRYPOINT: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationKind {
    Transaction,
    Delegation,
    Origination,
    /// Any other kind, with its name kept as sent
    Other(String),
}

impl OperationKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Transaction => "transaction",
            Self::Delegation => "delegation",
            Self::Origination => "origination",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for OperationKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "transaction" => Self::Transaction,
            "delegation" => Self::Delegation,
            "origination" => Self::Origination,
            _ => Self::Other(kind),
        }
    }
}

impl From<OperationKind> for String {
    fn from(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

/// Declared native amount, in mutez. RPC payloads send strings, Taquito
/// payloads send numbers; both are kept as sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Text(String),
    Number(Number),
}

impl RawAmount {
    pub fn to_mutez(&self) -> Option<U256> {
        match self {
            Self::Text(text) => parse_nat(text),
            Self::Number(number) => number.as_u64().map(U256::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    #[serde(default = "default_entrypoint")]
    pub entrypoint: String,
    /// Micheline value, untrusted and uninterpreted
    #[serde(default)]
    pub value: Value,
}

fn default_entrypoint() -> String {
    DEFAULT_ENTRYPOINT.to_string()
}

/// One operation of a signing request.
///
/// Every field is untrusted input. Addresses stay as the text that was sent
/// so that the raw-operations view shows exactly what the application asked
/// for; fields this crate does not know about are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationContent {
    pub kind: OperationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, alias = "to", skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, alias = "balance", skip_serializing_if = "Option::is_none")]
    pub amount: Option<RawAmount>,
    #[serde(default, alias = "parameter", skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Parameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegate: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OperationContent {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            source: None,
            destination: None,
            amount: None,
            parameters: None,
            delegate: None,
            extra: Map::new(),
        }
    }

    pub fn transaction(destination: &str, mutez: u64) -> Self {
        Self {
            destination: Some(destination.to_string()),
            amount: Some(RawAmount::Text(mutez.to_string())),
            ..Self::new(OperationKind::Transaction)
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn with_call(mut self, entrypoint: &str, value: Value) -> Self {
        self.parameters = Some(Parameters {
            entrypoint: entrypoint.to_string(),
            value,
        });
        self
    }

    pub fn entrypoint(&self) -> Option<&str> {
        self.parameters.as_ref().map(|p| p.entrypoint.as_str())
    }

    pub fn destination_address(&self) -> Option<Address> {
        self.destination.as_deref().and_then(|d| Address::parse(d).ok())
    }
}
