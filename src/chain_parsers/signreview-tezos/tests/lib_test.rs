use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use signreview::FormatKey;
use signreview::test_utils::{assert_active_format, assert_has_format, assert_lacks_format};
use signreview::ViewFormatSelector;
use signreview_tezos::{
    Address, AssetRegistry, EmptyRegistry, ExpenseAsset, ExpenseParser, ExpenseRecord,
    OperationContent, OperationReview, ParameterLimits, ResolvedAsset, ReviewOptions,
    TezosSigningRequest, expense_count, review_request,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

const ALICE: &str = "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb";
const BOB: &str = "tz1aSkwEot3L2kmUvcoxzjMomb9mvBNuzFK6";
const TKN: &str = "KT1AFA2mwNUMNd4SsujE1YYp29vd8BZejyKW";

// Helper function to get fixture path
fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn read_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to read fixture: {:?}", path))
}

fn registry() -> AssetRegistry {
    AssetRegistry::from_json(&read_fixture("tokens.json")).expect("token list should load")
}

fn alice() -> Address {
    Address::parse(ALICE).unwrap()
}

fn summarize(review: &OperationReview) -> Value {
    let records: Vec<Value> = review.expenses().iter().map(record_json).collect();
    let mut summary = json!({
        "kind": review.kind().as_str(),
        "formats": review.formats().iter().map(|f| f.key.as_str()).collect::<Vec<_>>(),
        "active": review.active_format().map(|f| f.key.as_str()),
        "records": records,
    });
    if let Some(kind) = review.payload_kind() {
        summary["payload"] = serde_json::to_value(kind).unwrap();
    }
    summary
}

fn record_json(record: &ExpenseRecord) -> Value {
    let mut value = serde_json::to_value(record).unwrap();
    let expenses = value["expenses"].as_array_mut().unwrap();
    for (expense, json) in record.expenses.iter().zip(expenses.iter_mut()) {
        json["display"] = Value::String(expense.display_amount());
    }
    value
}

static FIXTURES: [&str; 7] = [
    "connect",
    "fa2_batch",
    "native_and_unknown",
    "sign_fa12_unregistered",
    "sign_without_preview",
    "unrecognized_batch",
    "foreign_source",
];

#[test]
fn test_with_fixtures() {
    let registry = registry();

    for test_name in FIXTURES {
        let request: TezosSigningRequest =
            serde_json::from_str(&read_fixture(&format!("{test_name}.request.json")))
                .unwrap_or_else(|e| panic!("Failed to parse request {test_name}: {e}"));
        let expected: Value =
            serde_json::from_str(&read_fixture(&format!("{test_name}.expected.json"))).unwrap();

        let review = review_request(&request, &alice(), &registry, &ReviewOptions::default());

        assert_eq!(summarize(&review), expected, "Mismatch in fixture {test_name}");
        assert!(review.fault().is_none(), "Unexpected fault in {test_name}");
    }
}

fn fa2_call(contract: &str, from: &str, txs: &[(&str, u64, u64)]) -> OperationContent {
    let txs: Vec<Value> = txs
        .iter()
        .map(|(to, token_id, amount)| {
            json!({ "prim": "Pair", "args": [
                { "string": to },
                { "prim": "Pair", "args": [
                    { "int": token_id.to_string() },
                    { "int": amount.to_string() }
                ] }
            ] })
        })
        .collect();
    let value = json!([{ "prim": "Pair", "args": [{ "string": from }, txs] }]);
    OperationContent::transaction(contract, 0).with_call("transfer", value)
}

#[test]
fn test_batch_transfer_resolves_registered_token() {
    let mut registry = AssetRegistry::new();
    registry.register(ResolvedAsset::multi_asset(TKN, 0, "TKN", 0));
    let parser = ExpenseParser::new(&registry, ParameterLimits::default());

    let records = parser.parse(&[fa2_call(TKN, ALICE, &[(BOB, 0, 5)])], &alice());

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].expenses.len(), 1);
    let expense = &records[0].expenses[0];
    assert_eq!(expense.symbol(), Some("TKN"));
    assert_eq!(expense.display_amount(), "5");
}

#[test]
fn test_contract_level_lookup_resolves_batch_transfer() {
    let lookup = |address: &str| {
        (address == TKN).then(|| ResolvedAsset {
            token_id: None,
            ..ResolvedAsset::multi_asset(TKN, 0, "TKN", 0)
        })
    };
    let parser = ExpenseParser::new(&lookup, ParameterLimits::default());

    let records = parser.parse(&[fa2_call(TKN, ALICE, &[(BOB, 0, 5), (BOB, 7, 2)])], &alice());

    let resolved: Vec<(Option<&str>, String)> = records[0]
        .expenses
        .iter()
        .map(|expense| (expense.symbol(), expense.display_amount()))
        .collect();
    assert_eq!(
        resolved,
        vec![(Some("TKN"), "5".to_string()), (Some("TKN"), "2".to_string())]
    );
}

#[test]
fn test_registry_miss_uses_raw_address() {
    let parser = ExpenseParser::new(&EmptyRegistry, ParameterLimits::default());
    let records = parser.parse(&[fa2_call(TKN, ALICE, &[(BOB, 4, 5)])], &alice());

    let expense = &records[0].expenses[0];
    assert_eq!(expense.symbol(), None);
    assert_eq!(expense.asset.address(), TKN);
    assert!(matches!(expense.asset, ExpenseAsset::Unresolved { .. }));
}

#[test]
fn test_one_record_per_operation_and_debit_count() {
    let registry = registry();
    let parser = ExpenseParser::new(&registry, ParameterLimits::default());
    let operations = vec![
        OperationContent::transaction(BOB, 1),
        fa2_call(TKN, ALICE, &[(BOB, 0, 1), (BOB, 0, 2), (BOB, 1, 3)]),
        fa2_call(TKN, BOB, &[(ALICE, 0, 9)]),
        OperationContent::transaction(TKN, 0).with_call("update_operators", json!([])),
        OperationContent::transaction(BOB, 0),
    ];

    let records = parser.parse(&operations, &alice());

    assert_eq!(records.len(), operations.len());
    assert_eq!(expense_count(&records), 4);
    let amounts: Vec<String> = records
        .iter()
        .flat_map(|record| record.expenses.iter().map(|e| e.amount.to_string()))
        .collect();
    assert_eq!(amounts, vec!["1", "1", "2", "3"]);
}

#[test]
fn test_parsing_is_deterministic() {
    let registry = registry();
    let request: TezosSigningRequest =
        serde_json::from_str(&read_fixture("fa2_batch.request.json")).unwrap();
    let operations = request.operations().unwrap();
    let parser = ExpenseParser::new(&registry, ParameterLimits::default());

    let first = parser.parse(operations, &alice());
    let second = parser.parse(operations, &alice());
    assert_eq!(first, second);
}

#[test]
fn test_concurrent_reviews_share_registry() {
    let registry = Arc::new(registry());
    let request: Arc<TezosSigningRequest> =
        Arc::new(serde_json::from_str(&read_fixture("fa2_batch.request.json")).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let request = Arc::clone(&request);
            thread::spawn(move || {
                let review =
                    review_request(&request, &alice(), registry.as_ref(), &ReviewOptions::default());
                summarize(&review)
            })
        })
        .collect();

    let summaries: Vec<Value> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(summaries.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(summaries[0]["records"][0]["expenses"][0]["amount"], json!("5"));
}

#[test]
fn test_selection_survives_recomputed_formats() {
    let request: TezosSigningRequest =
        serde_json::from_str(&read_fixture("sign_fa12_unregistered.request.json")).unwrap();
    let mut review = review_request(&request, &alice(), &EmptyRegistry, &ReviewOptions::default());
    review.select(FormatKey::Bytes).unwrap();

    // Same request reviewed without decoding: the preview disappears, bytes stay
    let undecoded = review_request(
        &request,
        &alice(),
        &EmptyRegistry,
        &ReviewOptions {
            decode_expenses: false,
            ..ReviewOptions::default()
        },
    );
    let mut selector = ViewFormatSelector::new(review.formats().to_vec());
    selector.select(FormatKey::Bytes).unwrap();
    selector.set_formats(undecoded.formats().to_vec());

    assert_lacks_format(selector.formats(), FormatKey::Preview);
    assert_has_format(selector.formats(), FormatKey::Raw);
    assert_active_format(&selector, Some(FormatKey::Bytes));
}
