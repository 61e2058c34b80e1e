//! Items persisted by earlier releases must keep decoding.

use std::sync::Arc;

use chainsync::core::attr::{self, FromAttribute, Item};
use chainsync::core::Tx;
use chainsync::store::{ItemStore, ItemStoreExt, SqliteStore};

const LEGACY_TX_ITEM: &str = include_str!("testdata/legacy_tx_item.json");
const DATUM_HEX: &str = "d8799f581cc86e835a1b093aa81610fd3935f463ce529929cded8b75f7b51ce644429c0aff";

fn legacy_item() -> Item {
    attr::from_json_bytes(LEGACY_TX_ITEM.as_bytes()).unwrap()
}

#[test]
fn test_base64_datums_decode_to_hex() {
    let item = legacy_item();
    let tx = Tx::from_attribute(&item["tx"]).unwrap();

    assert_eq!(tx.witness.datums.len(), 2);
    for datum in tx.witness.datums.values() {
        assert_eq!(datum, DATUM_HEX);
        assert!(hex::decode(datum).is_ok());
    }
}

#[test]
fn test_null_and_unknown_attributes_are_tolerated() {
    let tx = Tx::from_attribute(&legacy_item()["tx"]).unwrap();

    assert!(tx.body.required_extra_signatures.is_empty());
    assert!(tx.body.references.is_empty());
    assert_eq!(tx.body.validity_interval.as_ref().unwrap().invalid_before, None);
    assert_eq!(tx.body.outputs[0].datum, None);
    assert_eq!(
        tx.body.outputs[0].datum_hash.as_deref(),
        Some("a9bb6999d768e9e04bae81970e39c3b496c756adbdd1b137bfdba5a9ef3678a0")
    );
    assert_eq!(tx.body.inputs[0].to_tx_id().to_string(), format!("{}#2", tx.body.inputs[0].tx_id));
}

#[test]
fn test_rewritten_item_uses_hex() {
    let tx = Tx::from_attribute(&legacy_item()["tx"]).unwrap();

    let rewritten = attr::to_json_bytes(&attr::to_item(&tx)).unwrap();
    let text = String::from_utf8(rewritten.clone()).unwrap();
    assert!(text.contains(DATUM_HEX));
    assert!(!text.contains("2HmfWBzIboNaGwk6qBYQ"));

    let again: Tx = attr::from_item(&attr::from_json_bytes(&rewritten).unwrap()).unwrap();
    assert_eq!(again, tx);
}

#[tokio::test]
async fn test_legacy_item_through_store() {
    let store = Arc::new(SqliteStore::open_memory().unwrap());
    let item = legacy_item();
    let tx_item = match &item["tx"] {
        chainsync::core::AttributeValue::M(fields) => fields.clone(),
        other => panic!("expected a map, got {other:?}"),
    };

    store.put_item("txs", "scoop", &tx_item).await.unwrap();
    let tx: Tx = store.get_record("txs", "scoop").await.unwrap().unwrap();
    assert_eq!(tx.witness.datums.values().next().map(String::as_str), Some(DATUM_HEX));
}
