//! Amount helpers shared by chain crates.
//!
//! Amounts travel as raw integers in the asset's smallest unit. They are only
//! turned into decimal text at the edge, with the precision of the asset they
//! were resolved to.

use alloy_primitives::{U256, utils::format_units};

/// Formats a raw amount with `decimals` places, trimming trailing zeros.
///
/// ```
/// use alloy_primitives::U256;
/// use signreview::amount::format_amount;
///
/// assert_eq!(format_amount(U256::from(1_500_000u64), 6), "1.5");
/// assert_eq!(format_amount(U256::from(5u64), 0), "5");
/// ```
pub fn format_amount(raw: U256, decimals: u8) -> String {
    match format_units(raw, decimals) {
        Ok(formatted) => trim_fraction(formatted),
        // Precision beyond what the unit table supports, show base units
        Err(_) => raw.to_string(),
    }
}

fn trim_fraction(formatted: String) -> String {
    if !formatted.contains('.') {
        return formatted;
    }
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Parses a non-negative base-10 integer, as found in Micheline `int` nodes
/// and RPC amounts. Signs, hex prefixes, whitespace and values above 2^256-1
/// are rejected.
pub fn parse_nat(text: &str) -> Option<U256> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    U256::from_str_radix(text, 10).ok()
}

/// Serde adapter writing `U256` as a decimal string.
pub mod u256_decimal {
    use alloy_primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    use super::parse_nat;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = super::NatRepr::deserialize(deserializer)?;
        let text = raw.into_string();
        parse_nat(&text).ok_or_else(|| D::Error::custom(format!("invalid natural number: {text}")))
    }

    pub mod option {
        use alloy_primitives::U256;
        use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

        use crate::amount::{NatRepr, parse_nat};

        pub fn serialize<S: Serializer>(
            value: &Option<U256>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_some(&value.to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<U256>, D::Error> {
            match Option::<NatRepr>::deserialize(deserializer)? {
                Some(raw) => {
                    let text = raw.into_string();
                    parse_nat(&text)
                        .map(Some)
                        .ok_or_else(|| D::Error::custom(format!("invalid natural number: {text}")))
                }
                None => Ok(None),
            }
        }
    }
}

/// JSON inputs carry natural numbers either as strings or as plain numbers.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum NatRepr {
    Text(String),
    Number(u64),
}

impl NatRepr {
    fn into_string(self) -> String {
        match self {
            NatRepr::Text(text) => text,
            NatRepr::Number(number) => number.to_string(),
        }
    }
}
