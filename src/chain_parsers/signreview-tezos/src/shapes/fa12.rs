use crate::michelson::{ParameterLimits, ParameterTree};
use crate::shapes::{TokenTransfer, TransferShape, TransferShapeMatcher, TransferSource, address_of};

const ENTRYPOINTS: &[&str] = &["transfer"];

/// FA1.2 `transfer (address :from, (address :to, nat :value))`.
pub struct Fa12TransferMatcher;

impl TransferShapeMatcher for Fa12TransferMatcher {
    fn shape(&self) -> TransferShape {
        TransferShape::Fa12
    }

    fn can_handle(&self, entrypoint: &str) -> bool {
        ENTRYPOINTS.contains(&entrypoint)
    }

    fn match_tree(
        &self,
        tree: &ParameterTree,
        _limits: &ParameterLimits,
    ) -> Option<Vec<TokenTransfer>> {
        let elements = tree.comb(3)?;
        let [from, to, value] = elements.as_slice() else {
            return None;
        };

        Some(vec![TokenTransfer {
            from: TransferSource::Address(address_of(from, "from")?),
            to: address_of(to, "to")?,
            token_id: None,
            amount: value.as_nat()?,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::shapes::test_trees::*;
    use alloy_primitives::U256;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> ParameterTree {
        ParameterTree::from_micheline(&value, &ParameterLimits::default()).unwrap()
    }

    #[test]
    fn test_nested_pair() {
        let transfers = Fa12TransferMatcher
            .match_tree(&tree(fa12(ALICE, BOB, 1_000)), &ParameterLimits::default())
            .unwrap();

        assert_eq!(
            transfers,
            vec![TokenTransfer {
                from: TransferSource::Address(Address::parse(ALICE).unwrap()),
                to: Address::parse(BOB).unwrap(),
                token_id: None,
                amount: U256::from(1_000u64),
            }]
        );
    }

    #[test]
    fn test_flat_comb_and_binary_addresses() {
        let value = json!({
            "prim": "Pair",
            "args": [
                { "bytes": "00006b82198cb179e8306c1bedd08f12dc863f328886" },
                { "bytes": "0000a26828841890d3f3a2a1d4083839c7a882fe0501" },
                { "int": "7" }
            ],
            "annots": ["%transfer"]
        });
        let transfers = Fa12TransferMatcher
            .match_tree(&tree(value), &ParameterLimits::default())
            .unwrap();

        assert_eq!(
            transfers[0].from,
            TransferSource::Address(Address::parse(ALICE).unwrap())
        );
        assert_eq!(transfers[0].to.as_str(), BOB);
    }

    #[test]
    fn test_missing_value() {
        let value = pair(string(ALICE), string(BOB));
        assert!(
            Fa12TransferMatcher
                .match_tree(&tree(value), &ParameterLimits::default())
                .is_none()
        );
    }
}
