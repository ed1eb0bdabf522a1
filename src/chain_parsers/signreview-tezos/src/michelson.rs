//! Untrusted contract arguments, as Micheline.
//!
//! A [`ParameterTree`] is built from the JSON an application attached to an
//! operation. It is only ever inspected structurally; nothing here knows the
//! contract's declared interface. Construction enforces [`ParameterLimits`]
//! so adversarial nesting cannot drive unbounded recursion further down.

use alloy_primitives::U256;
use serde_json::{Map, Value};
use signreview::amount::parse_nat;
use thiserror::Error;

use crate::address::{Address, AddressError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterLimits {
    /// Deepest nesting accepted, counting the root as depth 1
    pub max_depth: usize,
    /// Total nodes accepted in one tree
    pub max_nodes: usize,
    /// Transfers accepted from a single batch operation
    pub max_transfers: usize,
}

impl Default for ParameterLimits {
    fn default() -> Self {
        Self {
            max_depth: 16,
            max_nodes: 4096,
            max_transfers: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("parameter tree nested deeper than {0} levels")]
    TooDeep(usize),
    #[error("parameter tree has more than {0} nodes")]
    TooLarge(usize),
    #[error("not a micheline node: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterTree {
    Int(String),
    String(String),
    Bytes(String),
    Node {
        prim: String,
        args: Vec<ParameterTree>,
        annots: Vec<String>,
    },
    Seq(Vec<ParameterTree>),
}

impl ParameterTree {
    /// Builds a tree from Micheline JSON, failing once `limits` are exceeded.
    pub fn from_micheline(value: &Value, limits: &ParameterLimits) -> Result<Self, TreeError> {
        let mut budget = limits.max_nodes;
        Self::convert(value, 1, limits, &mut budget)
    }

    fn convert(
        value: &Value,
        depth: usize,
        limits: &ParameterLimits,
        budget: &mut usize,
    ) -> Result<Self, TreeError> {
        if depth > limits.max_depth {
            return Err(TreeError::TooDeep(limits.max_depth));
        }
        if *budget == 0 {
            return Err(TreeError::TooLarge(limits.max_nodes));
        }
        *budget -= 1;

        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| Self::convert(item, depth + 1, limits, budget))
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Seq),
            Value::Object(fields) => Self::convert_object(fields, depth, limits, budget),
            other => Err(TreeError::Malformed(kind_of(other).to_string())),
        }
    }

    fn convert_object(
        fields: &Map<String, Value>,
        depth: usize,
        limits: &ParameterLimits,
        budget: &mut usize,
    ) -> Result<Self, TreeError> {
        if fields.len() == 1 {
            let literal = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
            if let Some(int) = literal("int") {
                return Ok(Self::Int(int));
            }
            if let Some(string) = literal("string") {
                return Ok(Self::String(string));
            }
            if let Some(bytes) = literal("bytes") {
                return Ok(Self::Bytes(bytes));
            }
        }

        let prim = fields
            .get("prim")
            .and_then(Value::as_str)
            .ok_or_else(|| TreeError::Malformed("object without prim".to_string()))?;
        if let Some(key) = fields
            .keys()
            .find(|key| !matches!(key.as_str(), "prim" | "args" | "annots"))
        {
            return Err(TreeError::Malformed(format!("unexpected field {key} on {prim}")));
        }

        let args = match fields.get("args") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| Self::convert(item, depth + 1, limits, budget))
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(TreeError::Malformed(format!("args of {prim} is {}", kind_of(other))));
            }
        };
        let annots = match fields.get("annots") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| TreeError::Malformed(format!("annotation on {prim}")))
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(TreeError::Malformed(format!("annots of {prim}"))),
        };

        Ok(Self::Node {
            prim: prim.to_string(),
            args,
            annots,
        })
    }

    /// Arguments of a node with the given primitive name.
    pub fn prim_args(&self, name: &str) -> Option<&[ParameterTree]> {
        match self {
            Self::Node { prim, args, .. } if prim == name => Some(args),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[ParameterTree]> {
        match self {
            Self::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Natural number literal that fits 256 bits.
    pub fn as_nat(&self) -> Option<U256> {
        match self {
            Self::Int(int) => parse_nat(int),
            _ => None,
        }
    }

    /// Address literal, in text or binary form. `None` when the node cannot
    /// hold an address at all.
    pub fn as_address(&self) -> Option<Result<Address, AddressError>> {
        match self {
            Self::String(text) => Some(Address::parse(text)),
            Self::Bytes(bytes) => Some(Address::from_hex(bytes)),
            _ => None,
        }
    }

    /// Reads a right comb of `Pair` nodes as exactly `arity` elements.
    ///
    /// `Pair a (Pair b c)` and the flattened `Pair a b c` both read as
    /// `[a, b, c]` for arity 3. Anything with more or fewer elements is `None`.
    pub fn comb(&self, arity: usize) -> Option<Vec<&ParameterTree>> {
        if arity < 2 {
            return None;
        }

        let mut elements = Vec::with_capacity(arity);
        let mut current = self;
        while elements.len() < arity - 1 {
            let args = current.prim_args("Pair")?;
            let remaining = arity - elements.len();
            if args.len() < 2 || args.len() > remaining {
                return None;
            }
            let (last, init) = args.split_last()?;
            elements.extend(init.iter());
            current = last;
        }
        elements.push(current);

        Some(elements)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
