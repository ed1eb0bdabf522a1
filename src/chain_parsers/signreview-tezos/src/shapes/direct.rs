use crate::michelson::{ParameterLimits, ParameterTree};
use crate::shapes::{TokenTransfer, TransferShape, TransferShapeMatcher, TransferSource, address_of};

const ENTRYPOINTS: &[&str] = &["transfer"];

/// `transfer (address :to, nat :amount)`, debiting whoever sends the
/// operation.
pub struct DirectTransferMatcher;

impl TransferShapeMatcher for DirectTransferMatcher {
    fn shape(&self) -> TransferShape {
        TransferShape::SingleDirect
    }

    fn can_handle(&self, entrypoint: &str) -> bool {
        ENTRYPOINTS.contains(&entrypoint)
    }

    fn match_tree(
        &self,
        tree: &ParameterTree,
        _limits: &ParameterLimits,
    ) -> Option<Vec<TokenTransfer>> {
        let elements = tree.comb(2)?;
        let [to, amount] = elements.as_slice() else {
            return None;
        };

        Some(vec![TokenTransfer {
            from: TransferSource::OperationSource,
            to: address_of(to, "to")?,
            token_id: None,
            amount: amount.as_nat()?,
        }])
    }
}
