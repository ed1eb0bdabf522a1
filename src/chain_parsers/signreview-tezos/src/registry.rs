use std::collections::HashMap;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use signreview::amount::u256_decimal;
use thiserror::Error;

use crate::address::Address;

/// Symbol of the chain's native unit
pub const NATIVE_SYMBOL: &str = "TEZ";
/// Decimal places of the native unit (amounts are declared in mutez)
pub const NATIVE_DECIMALS: u8 = 6;
/// Slug standing in for the native asset's address
pub const NATIVE_SLUG: &str = "tez";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Native,
    /// FA1.2
    SingleAssetStandard,
    /// FA2
    MultiAssetStandard,
}

/// A token or the native currency, matched against a known registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAsset {
    pub kind: AssetKind,
    pub address: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "u256_decimal::option"
    )]
    pub token_id: Option<U256>,
    pub symbol: String,
    pub decimals: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ResolvedAsset {
    pub fn native() -> Self {
        Self {
            kind: AssetKind::Native,
            address: NATIVE_SLUG.to_string(),
            token_id: None,
            symbol: NATIVE_SYMBOL.to_string(),
            decimals: NATIVE_DECIMALS,
            name: Some("Tezos".to_string()),
        }
    }

    pub fn single_asset(address: &str, symbol: &str, decimals: u8) -> Self {
        Self {
            kind: AssetKind::SingleAssetStandard,
            address: address.to_string(),
            token_id: None,
            symbol: symbol.to_string(),
            decimals,
            name: None,
        }
    }

    pub fn multi_asset(address: &str, token_id: u64, symbol: &str, decimals: u8) -> Self {
        Self {
            kind: AssetKind::MultiAssetStandard,
            address: address.to_string(),
            token_id: Some(U256::from(token_id)),
            symbol: symbol.to_string(),
            decimals,
            name: None,
        }
    }

    /// Whether a transfer of `token_id` on this asset's contract moves this
    /// asset. An asset without a token id stands for the whole contract; only
    /// two different ids conflict.
    pub fn covers_token(&self, token_id: Option<&U256>) -> bool {
        match (&self.token_id, token_id) {
            (Some(own), Some(id)) => own == id,
            _ => true,
        }
    }
}

/// Read-only asset lookup consumed by the expense parser.
///
/// Implementations must be safe to share between concurrent reviews and must
/// not expose a half-applied refresh to a lookup.
pub trait AssetRegistryLookup {
    /// Resolves a token contract address.
    fn lookup(&self, address: &str) -> Option<ResolvedAsset>;

    /// Resolves one token of a contract. The default takes the result of
    /// [`Self::lookup`] unless it names a different token id.
    fn lookup_token(&self, address: &str, token_id: Option<&U256>) -> Option<ResolvedAsset> {
        self.lookup(address)
            .filter(|asset| asset.covers_token(token_id))
    }
}

impl<F> AssetRegistryLookup for F
where
    F: Fn(&str) -> Option<ResolvedAsset>,
{
    fn lookup(&self, address: &str) -> Option<ResolvedAsset> {
        self(address)
    }
}

/// A lookup that knows nothing; every token falls back to its raw address.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyRegistry;

impl AssetRegistryLookup for EmptyRegistry {
    fn lookup(&self, _address: &str) -> Option<ResolvedAsset> {
        None
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read token list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid token contract address {0}")]
    InvalidAddress(String),
    #[error("{0} is a multi-asset contract and needs a tokenId")]
    MissingTokenId(String),
    #[error("{0} is a single-asset contract and cannot have a tokenId")]
    UnexpectedTokenId(String),
}

/// Token standard as written in a token list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStandard {
    #[serde(rename = "fa1.2", alias = "fa12")]
    Fa12,
    #[serde(rename = "fa2")]
    Fa2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    #[serde(rename = "type")]
    pub standard: TokenStandard,
    pub address: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "u256_decimal::option"
    )]
    pub token_id: Option<U256>,
    pub symbol: String,
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Token list document, typically exported from the wallet's asset storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenList {
    #[serde(default)]
    pub network: Option<String>,
    pub assets: Vec<TokenInfo>,
}

/// In-memory registry of known tokens, keyed by contract address.
///
/// Populated once, then shared read-only between reviews.
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    /// Maps contract address to the tokens registered for it
    tokens: HashMap<String, Vec<ResolvedAsset>>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an asset, replacing a previous entry for the same token.
    pub fn register(&mut self, asset: ResolvedAsset) {
        let entries = self.tokens.entry(asset.address.clone()).or_default();
        match entries
            .iter_mut()
            .find(|entry| entry.token_id == asset.token_id)
        {
            Some(entry) => *entry = asset,
            None => entries.push(asset),
        }
    }

    pub fn register_token(&mut self, info: TokenInfo) -> Result<(), RegistryError> {
        let address = Address::parse(&info.address)
            .map_err(|_| RegistryError::InvalidAddress(info.address.clone()))?;
        if !address.is_contract() {
            return Err(RegistryError::InvalidAddress(info.address));
        }

        let kind = match (info.standard, info.token_id) {
            (TokenStandard::Fa12, None) => AssetKind::SingleAssetStandard,
            (TokenStandard::Fa2, Some(_)) => AssetKind::MultiAssetStandard,
            (TokenStandard::Fa12, Some(_)) => {
                return Err(RegistryError::UnexpectedTokenId(info.address));
            }
            (TokenStandard::Fa2, None) => return Err(RegistryError::MissingTokenId(info.address)),
        };

        self.register(ResolvedAsset {
            kind,
            address: address.to_string(),
            token_id: info.token_id,
            symbol: info.symbol,
            decimals: info.decimals,
            name: info.name,
        });
        Ok(())
    }

    pub fn load_token_list(&mut self, list: TokenList) -> Result<(), RegistryError> {
        for info in list.assets {
            self.register_token(info)?;
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let list: TokenList = serde_json::from_str(json)?;
        let mut registry = Self::new();
        registry.load_token_list(list)?;
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.tokens.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl AssetRegistryLookup for AssetRegistry {
    /// Answers with the entry registered for the whole contract. Tokens
    /// registered under an id are only reachable through `lookup_token`.
    fn lookup(&self, address: &str) -> Option<ResolvedAsset> {
        self.tokens
            .get(address)?
            .iter()
            .find(|asset| asset.token_id.is_none())
            .cloned()
    }

    /// Prefers the entry for `token_id`, then falls back to [`Self::lookup`].
    fn lookup_token(&self, address: &str, token_id: Option<&U256>) -> Option<ResolvedAsset> {
        let entries = self.tokens.get(address)?;
        token_id
            .and_then(|id| entries.iter().find(|asset| asset.token_id.as_ref() == Some(id)))
            .or_else(|| entries.iter().find(|asset| asset.token_id.is_none()))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KUSD: &str = "KT1K9gCRgaLRFKTErYt1wVxA3Frb9FjasjTV";
    const HDAO: &str = "KT1AFA2mwNUMNd4SsujE1YYp29vd8BZejyKW";

    fn token_list() -> &'static str {
        r#"{
            "network": "mainnet",
            "assets": [
                { "type": "fa1.2", "address": "KT1K9gCRgaLRFKTErYt1wVxA3Frb9FjasjTV", "symbol": "kUSD", "decimals": 18, "name": "Kolibri USD" },
                { "type": "fa2", "address": "KT1AFA2mwNUMNd4SsujE1YYp29vd8BZejyKW", "tokenId": 0, "symbol": "hDAO", "decimals": 6 }
            ]
        }"#
    }

    #[test]
    fn test_registry_new() {
        let registry = AssetRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.lookup(KUSD), None);
    }

    #[test]
    fn test_load_token_list() {
        let registry = AssetRegistry::from_json(token_list()).unwrap();
        assert_eq!(registry.len(), 2);

        let kusd = registry.lookup(KUSD).unwrap();
        assert_eq!(kusd.symbol, "kUSD");
        assert_eq!(kusd.decimals, 18);
        assert_eq!(kusd.kind, AssetKind::SingleAssetStandard);
        assert_eq!(kusd.name.as_deref(), Some("Kolibri USD"));

        let hdao = registry.lookup_token(HDAO, Some(&U256::ZERO)).unwrap();
        assert_eq!(hdao.symbol, "hDAO");
    }

    #[test]
    fn test_lookup_token_requires_matching_id() {
        let registry = AssetRegistry::from_json(token_list()).unwrap();

        assert_eq!(registry.lookup_token(HDAO, Some(&U256::from(1u64))), None);
        assert_eq!(registry.lookup_token(HDAO, None), None);
        assert!(registry.lookup_token(KUSD, None).is_some());
    }

    #[test]
    fn test_lookup_and_lookup_token_agree() {
        let registry = AssetRegistry::from_json(token_list()).unwrap();

        // hDAO is only registered under token 0, so the contract alone says nothing
        assert_eq!(registry.lookup(HDAO), None);
        assert_eq!(registry.lookup_token(HDAO, Some(&U256::from(7u64))), None);

        // kUSD is registered for the whole contract and answers for any token
        let kusd = registry.lookup(KUSD).unwrap();
        assert_eq!(registry.lookup_token(KUSD, Some(&U256::ZERO)), Some(kusd.clone()));
        assert_eq!(registry.lookup_token(KUSD, None), Some(kusd));
    }

    #[test]
    fn test_lookup_token_prefers_exact_id() {
        let mut registry = AssetRegistry::new();
        registry.register(ResolvedAsset::multi_asset(HDAO, 0, "A", 0));
        registry.register(ResolvedAsset::multi_asset(HDAO, 1, "B", 0));
        registry.register(ResolvedAsset {
            token_id: None,
            ..ResolvedAsset::multi_asset(HDAO, 0, "ANY", 0)
        });

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.lookup(HDAO).map(|asset| asset.symbol), Some("ANY".to_string()));
        let symbol_of = |id: u64| {
            registry
                .lookup_token(HDAO, Some(&U256::from(id)))
                .map(|asset| asset.symbol)
        };
        assert_eq!(symbol_of(1), Some("B".to_string()));
        assert_eq!(symbol_of(9), Some("ANY".to_string()));
    }

    #[test]
    fn test_register_replaces_same_token() {
        let mut registry = AssetRegistry::new();
        registry.register(ResolvedAsset::single_asset(KUSD, "OLD", 0));
        registry.register(ResolvedAsset::single_asset(KUSD, "kUSD", 18));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup(KUSD).unwrap().symbol, "kUSD");
    }

    #[test]
    fn test_reject_bad_token_info() {
        let implicit = r#"{ "assets": [ { "type": "fa1.2", "address": "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb", "symbol": "X", "decimals": 0 } ] }"#;
        assert!(matches!(
            AssetRegistry::from_json(implicit),
            Err(RegistryError::InvalidAddress(_))
        ));

        let fa2_without_id = r#"{ "assets": [ { "type": "fa2", "address": "KT1AFA2mwNUMNd4SsujE1YYp29vd8BZejyKW", "symbol": "X", "decimals": 0 } ] }"#;
        assert!(matches!(
            AssetRegistry::from_json(fa2_without_id),
            Err(RegistryError::MissingTokenId(_))
        ));

        let fa12_with_id = r#"{ "assets": [ { "type": "fa1.2", "address": "KT1K9gCRgaLRFKTErYt1wVxA3Frb9FjasjTV", "tokenId": "3", "symbol": "X", "decimals": 0 } ] }"#;
        assert!(matches!(
            AssetRegistry::from_json(fa12_with_id),
            Err(RegistryError::UnexpectedTokenId(_))
        ));

        assert!(matches!(
            AssetRegistry::from_json("{"),
            Err(RegistryError::Json(_))
        ));
    }

    #[test]
    fn test_closure_lookup_checks_token_id() {
        let lookup = |address: &str| {
            (address == HDAO).then(|| ResolvedAsset::multi_asset(HDAO, 0, "hDAO", 6))
        };

        assert!(lookup.lookup_token(HDAO, Some(&U256::ZERO)).is_some());
        assert!(lookup.lookup_token(HDAO, Some(&U256::from(2u64))).is_none());
        assert!(lookup.lookup_token(KUSD, None).is_none());
    }

    #[test]
    fn test_closure_contract_level_hit_covers_every_token() {
        let lookup = |address: &str| {
            (address == HDAO).then(|| ResolvedAsset {
                token_id: None,
                ..ResolvedAsset::multi_asset(HDAO, 0, "TKN", 0)
            })
        };

        for token_id in [None, Some(U256::ZERO), Some(U256::from(7u64))] {
            let asset = lookup.lookup_token(HDAO, token_id.as_ref()).unwrap();
            assert_eq!(asset.symbol, "TKN");
        }
    }

    #[test]
    fn test_asset_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(AssetKind::MultiAssetStandard).unwrap(),
            serde_json::json!("multi_asset_standard")
        );
        assert_eq!(
            serde_json::to_value(ResolvedAsset::native()).unwrap()["kind"],
            serde_json::json!("native")
        );
    }
}
