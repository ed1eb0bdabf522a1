//! Decoding of operations into per-account debits.

use alloy_primitives::U256;
use serde::Serialize;
use signreview::amount::{format_amount, u256_decimal};
use tracing::debug;

use crate::address::Address;
use crate::michelson::ParameterLimits;
use crate::operation::{OperationContent, OperationKind};
use crate::registry::{AssetRegistryLookup, ResolvedAsset};
use crate::shapes::{ParameterShapeMatcher, ShapeMatch, TransferShape, TransferSource};

/// The asset a debit moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ExpenseAsset {
    Resolved(ResolvedAsset),
    /// A token the registry does not know, identified by its contract only
    Unresolved {
        address: String,
        #[serde(
            rename = "tokenId",
            skip_serializing_if = "Option::is_none",
            with = "u256_decimal::option"
        )]
        token_id: Option<U256>,
    },
}

impl ExpenseAsset {
    pub fn address(&self) -> &str {
        match self {
            Self::Resolved(asset) => &asset.address,
            Self::Unresolved { address, .. } => address,
        }
    }

    pub fn resolved(&self) -> Option<&ResolvedAsset> {
        match self {
            Self::Resolved(asset) => Some(asset),
            Self::Unresolved { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetExpense {
    pub asset: ExpenseAsset,
    /// Base units of the asset
    #[serde(with = "u256_decimal")]
    pub amount: U256,
    /// Recipient, when the operation names one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl AssetExpense {
    pub fn symbol(&self) -> Option<&str> {
        self.asset.resolved().map(|asset| asset.symbol.as_str())
    }

    /// Amount in whole units for resolved assets, base units otherwise.
    pub fn display_amount(&self) -> String {
        match self.asset.resolved() {
            Some(asset) => format_amount(self.amount, asset.decimals),
            None => self.amount.to_string(),
        }
    }
}

/// Decoded view of one operation. Records line up one-to-one with the
/// operations they were parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    pub kind: OperationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegate: Option<String>,
    /// Shape the call parameters were recognized as
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<TransferShape>,
    pub expenses: Vec<AssetExpense>,
}

impl ExpenseRecord {
    fn summary(operation: &OperationContent) -> Self {
        Self {
            kind: operation.kind.clone(),
            destination: operation.destination.clone(),
            entrypoint: operation.entrypoint().map(str::to_string),
            delegate: operation.delegate.clone(),
            shape: None,
            expenses: Vec::new(),
        }
    }

    /// Whether the operation calls a contract entrypoint rather than only
    /// moving funds.
    pub fn is_entrypoint_interaction(&self) -> bool {
        self.kind == OperationKind::Transaction && self.entrypoint.is_some()
    }

    pub fn has_expenses(&self) -> bool {
        !self.expenses.is_empty()
    }
}

/// Total number of debits across `records`.
pub fn expense_count(records: &[ExpenseRecord]) -> usize {
    records.iter().map(|record| record.expenses.len()).sum()
}

/// Turns operations into the debits they make from one account.
///
/// Parsing is total: anything that cannot be decoded yields a record without
/// expenses. The lookup is only read.
pub struct ExpenseParser<'a, L: AssetRegistryLookup + ?Sized> {
    lookup: &'a L,
    shapes: ParameterShapeMatcher,
}

impl<'a, L: AssetRegistryLookup + ?Sized> ExpenseParser<'a, L> {
    pub fn new(lookup: &'a L, limits: ParameterLimits) -> Self {
        Self::with_matcher(lookup, ParameterShapeMatcher::new(limits))
    }

    pub fn with_matcher(lookup: &'a L, shapes: ParameterShapeMatcher) -> Self {
        Self { lookup, shapes }
    }

    pub fn parse(&self, operations: &[OperationContent], account: &Address) -> Vec<ExpenseRecord> {
        operations
            .iter()
            .map(|operation| self.parse_operation(operation, account))
            .collect()
    }

    pub fn parse_operation(&self, operation: &OperationContent, account: &Address) -> ExpenseRecord {
        let mut record = ExpenseRecord::summary(operation);
        // Operations prepared by the wallet leave the source to be filled in
        let sent_by_account = operation
            .source
            .as_deref()
            .is_none_or(|source| account == source);

        match &operation.parameters {
            None => {
                if !sent_by_account {
                    debug!(kind = %operation.kind.as_str(), "operation not sent by reviewing account");
                    return record;
                }
                if let Some(expense) = self.native_expense(operation) {
                    record.expenses.push(expense);
                }
            }
            Some(parameters) => {
                let Some(matched) = self.shapes.match_call(&parameters.entrypoint, &parameters.value)
                else {
                    return record;
                };
                record.shape = Some(matched.shape);
                record.expenses = self.token_expenses(operation, matched, account, sent_by_account);
            }
        }

        record
    }

    fn native_expense(&self, operation: &OperationContent) -> Option<AssetExpense> {
        let amount = operation.amount.as_ref()?;
        let Some(mutez) = amount.to_mutez() else {
            debug!(?amount, "unusable native amount");
            return None;
        };
        if mutez.is_zero() {
            return None;
        }

        Some(AssetExpense {
            asset: ExpenseAsset::Resolved(ResolvedAsset::native()),
            amount: mutez,
            to: operation.destination.clone(),
        })
    }

    fn token_expenses(
        &self,
        operation: &OperationContent,
        matched: ShapeMatch,
        account: &Address,
        sent_by_account: bool,
    ) -> Vec<AssetExpense> {
        let Some(contract) = operation
            .destination_address()
            .filter(Address::is_contract)
        else {
            debug!(destination = ?operation.destination, "transfer call without a token contract");
            return Vec::new();
        };

        matched
            .transfers
            .into_iter()
            .filter(|transfer| match &transfer.from {
                TransferSource::Address(from) => from == account,
                TransferSource::OperationSource => sent_by_account,
            })
            .map(|transfer| AssetExpense {
                asset: self.resolve(&contract, transfer.token_id),
                amount: transfer.amount,
                to: Some(transfer.to.to_string()),
            })
            .collect()
    }

    fn resolve(&self, contract: &Address, token_id: Option<U256>) -> ExpenseAsset {
        match self.lookup.lookup_token(contract.as_str(), token_id.as_ref()) {
            Some(asset) => ExpenseAsset::Resolved(asset),
            None => {
                debug!(contract = %contract, ?token_id, "token not in registry");
                ExpenseAsset::Unresolved {
                    address: contract.to_string(),
                    token_id,
                }
            }
        }
    }
}
