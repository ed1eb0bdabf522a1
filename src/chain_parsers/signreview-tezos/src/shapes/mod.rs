//! Recognized transfer-call shapes.
//!
//! Each matcher recognizes one (entrypoint, parameter shape) pair from a
//! closed whitelist. Matching is structural only: a call is understood when
//! its tree has exactly the expected shape, and is otherwise unrecognized.
//! Unrecognized is the normal outcome for arbitrary contract calls.

mod direct;
mod fa12;
mod fa2;

pub use direct::DirectTransferMatcher;
pub use fa12::Fa12TransferMatcher;
pub use fa2::Fa2TransferMatcher;

use alloy_primitives::U256;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::address::Address;
use crate::michelson::{ParameterLimits, ParameterTree};

/// Bumped whenever a matcher is added to or removed from
/// [`get_all_matchers`], or a matcher's accepted shape changes.
pub const SHAPE_WHITELIST_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferShape {
    /// FA2 `transfer`: a batch of transfers per sender
    Fa2Batch,
    /// FA1.2 `transfer`: one transfer with an explicit sender
    Fa12,
    /// `transfer` of `(to, amount)`, sent by the operation's source
    SingleDirect,
}

/// Who a recognized transfer debits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferSource {
    Address(Address),
    /// The source of the operation carrying the call
    OperationSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransfer {
    pub from: TransferSource,
    pub to: Address,
    pub token_id: Option<U256>,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMatch {
    pub shape: TransferShape,
    /// Transfers in declaration order, batch order preserved
    pub transfers: Vec<TokenTransfer>,
}

pub trait TransferShapeMatcher: Send + Sync {
    fn shape(&self) -> TransferShape;

    /// Check if this matcher applies to calls of the given entrypoint
    fn can_handle(&self, entrypoint: &str) -> bool;

    /// Transfers encoded by `tree`, or `None` when the tree does not have
    /// this matcher's shape.
    fn match_tree(
        &self,
        tree: &ParameterTree,
        limits: &ParameterLimits,
    ) -> Option<Vec<TokenTransfer>>;
}

/// Get all whitelisted matchers, in the order they are tried.
pub fn get_all_matchers() -> Vec<Box<dyn TransferShapeMatcher>> {
    vec![
        Box::new(Fa2TransferMatcher),
        Box::new(Fa12TransferMatcher),
        Box::new(DirectTransferMatcher),
    ]
}

/// Helper function to try multiple matchers in order
pub fn match_with_any(
    matchers: &[Box<dyn TransferShapeMatcher>],
    entrypoint: &str,
    tree: &ParameterTree,
    limits: &ParameterLimits,
) -> Option<ShapeMatch> {
    matchers
        .iter()
        .filter(|matcher| matcher.can_handle(entrypoint))
        .find_map(|matcher| {
            matcher
                .match_tree(tree, limits)
                .map(|transfers| ShapeMatch {
                    shape: matcher.shape(),
                    transfers,
                })
        })
}

/// Recognizes transfer calls inside raw contract arguments.
pub struct ParameterShapeMatcher {
    matchers: Vec<Box<dyn TransferShapeMatcher>>,
    limits: ParameterLimits,
}

impl ParameterShapeMatcher {
    pub fn new(limits: ParameterLimits) -> Self {
        Self::with_matchers(get_all_matchers(), limits)
    }

    pub fn with_matchers(
        matchers: Vec<Box<dyn TransferShapeMatcher>>,
        limits: ParameterLimits,
    ) -> Self {
        Self { matchers, limits }
    }

    pub fn limits(&self) -> &ParameterLimits {
        &self.limits
    }

    /// Matches a call of `entrypoint` with the Micheline argument `value`.
    /// `None` means unrecognized, including trees beyond the limits.
    pub fn match_call(&self, entrypoint: &str, value: &Value) -> Option<ShapeMatch> {
        if !self.matchers.iter().any(|m| m.can_handle(entrypoint)) {
            debug!(entrypoint, "entrypoint not in transfer whitelist");
            return None;
        }

        let tree = match ParameterTree::from_micheline(value, &self.limits) {
            Ok(tree) => tree,
            Err(err) => {
                warn!(entrypoint, %err, "parameter tree rejected");
                return None;
            }
        };

        let matched = match_with_any(&self.matchers, entrypoint, &tree, &self.limits);
        if matched.is_none() {
            debug!(entrypoint, "parameter shape not recognized");
        }
        matched
    }
}

impl Default for ParameterShapeMatcher {
    fn default() -> Self {
        Self::new(ParameterLimits::default())
    }
}

/// Reads an address node, logging the ones that look like addresses but fail
/// to decode.
fn address_of(node: &ParameterTree, role: &'static str) -> Option<Address> {
    match node.as_address()? {
        Ok(address) => Some(address),
        Err(err) => {
            warn!(role, %err, "malformed address in transfer parameters");
            None
        }
    }
}
