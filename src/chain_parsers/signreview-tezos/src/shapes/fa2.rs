use tracing::warn;

use crate::michelson::{ParameterLimits, ParameterTree};
use crate::shapes::{TokenTransfer, TransferShape, TransferShapeMatcher, TransferSource, address_of};

const ENTRYPOINTS: &[&str] = &["transfer"];

/// FA2 `transfer (list (pair (address :from_) (list :txs (pair (address :to_)
/// (pair (nat :token_id) (nat :amount))))))`.
pub struct Fa2TransferMatcher;

impl TransferShapeMatcher for Fa2TransferMatcher {
    fn shape(&self) -> TransferShape {
        TransferShape::Fa2Batch
    }

    fn can_handle(&self, entrypoint: &str) -> bool {
        ENTRYPOINTS.contains(&entrypoint)
    }

    fn match_tree(
        &self,
        tree: &ParameterTree,
        limits: &ParameterLimits,
    ) -> Option<Vec<TokenTransfer>> {
        let mut transfers = Vec::new();

        for batch in tree.as_seq()? {
            let elements = batch.comb(2)?;
            let [from, txs] = elements.as_slice() else {
                return None;
            };
            let from = address_of(from, "from_")?;

            for tx in txs.as_seq()? {
                let elements = tx.comb(3)?;
                let [to, token_id, amount] = elements.as_slice() else {
                    return None;
                };

                if transfers.len() == limits.max_transfers {
                    warn!(
                        max_transfers = limits.max_transfers,
                        "batch transfer exceeds transfer limit"
                    );
                    return None;
                }
                transfers.push(TokenTransfer {
                    from: TransferSource::Address(from.clone()),
                    to: address_of(to, "to_")?,
                    token_id: Some(token_id.as_nat()?),
                    amount: amount.as_nat()?,
                });
            }
        }

        Some(transfers)
    }
}
