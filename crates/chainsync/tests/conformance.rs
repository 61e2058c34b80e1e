//! Conformance vectors through every codec.
//!
//! Each recorded node response must decode under the strict JSON schema and
//! come back unchanged from CBOR and from a persisted attribute item.

use chainsync::codec::{self, Format};
use chainsync::core::{attr, cbor, json, Era};
use chainsync::{Point, Response};
use chainsync_testkit::vectors::{all_vectors, vector};

fn decode_vector(name: &str) -> Response {
    let v = vector(name).unwrap_or_else(|| panic!("no vector named {name}"));
    json::from_str(v.json).unwrap_or_else(|e| panic!("{name}: {e}"))
}

#[test]
fn test_every_vector_round_trips_in_every_format() {
    for v in all_vectors() {
        let response: Response = json::from_str(v.json).unwrap();

        for format in Format::ALL {
            let bytes = codec::encode(format, &response).unwrap();
            let back: Response = codec::decode(format, &bytes)
                .unwrap_or_else(|e| panic!("{} via {format}: {e}", v.name));
            assert_eq!(back, response, "{} via {format}", v.name);
        }
    }
}

#[test]
fn test_json_cbor_attribute_json_chain() {
    for v in all_vectors() {
        let response: Response = json::from_str(v.json).unwrap();
        let json_bytes = json::to_vec(&response).unwrap();

        let cbor_bytes = codec::transcode::<Response>(Format::Json, Format::Cbor, &json_bytes).unwrap();
        let item_bytes =
            codec::transcode::<Response>(Format::Cbor, Format::Attribute, &cbor_bytes).unwrap();
        let back = codec::transcode::<Response>(Format::Attribute, Format::Json, &item_bytes).unwrap();

        assert_eq!(back, json_bytes, "{}", v.name);
    }
}

#[test]
fn test_cbor_reencoding_is_stable() {
    for v in all_vectors() {
        let response: Response = json::from_str(v.json).unwrap();
        let bytes = cbor::to_vec(&response);
        let again = cbor::to_vec(&cbor::from_slice::<Response>(&bytes).unwrap());
        assert_eq!(again, bytes, "{}", v.name);
    }
}

#[test]
fn test_vasil_alonzo_block() {
    let response = decode_vector("roll_forward_alonzo_vasil");
    assert_eq!(response.methodname, "RequestNext");
    assert_eq!(response.reflection, None);

    let forward = response.result.unwrap().roll_forward.unwrap();
    assert_eq!(forward.block.era(), Some(Era::Alonzo));
    // The header carries no slot, so the block cannot name its own point.
    assert_eq!(forward.block.point(), None);

    let txs = forward.block.transactions();
    assert_eq!(txs.len(), 1);
    let tx = &txs[0];
    assert_eq!(tx.id, "d0cca8b82263a4c1ad2c4f845ab58ed5610fdb1fcbe76faa92d19ef5aa2655b2");
    assert_eq!(tx.body.outputs.len(), 4);
    assert_eq!(tx.body.collaterals[0].to_tx_id().index(), 3);
    assert_eq!(tx.body.fee.to_u64(), Some(836739));
    assert!(tx.raw.as_ref().is_some_and(|raw| !raw.is_empty()));

    let datum = &tx.witness.datums["5865d96e4313780a37af26055cdcc90308db23adaf4f2082178355e5e1dc20f6"];
    assert!(datum.starts_with("a54a63757272656e63696573"));

    let redeemer = &tx.witness.redeemers["spend:1"];
    assert_eq!(redeemer.execution_units.steps, 1448909354);

    let ids: Vec<_> = tx.output_ids().map(|id| id.to_string()).collect();
    assert_eq!(ids[3], format!("{}#3", tx.id));
}

#[test]
fn test_babbage_block() {
    let response = decode_vector("roll_forward_babbage");
    let forward = response.result.unwrap().roll_forward.unwrap();

    assert_eq!(forward.block.era(), Some(Era::Babbage));
    let point = forward.block.point().unwrap();
    assert_eq!(point.slot(), Some(16588737));
    assert_eq!(point.as_block().unwrap().block_no, 1048576);

    let tx = &forward.block.transactions()[0];
    assert_eq!(tx.body.references.len(), 1);
    assert!(tx.body.collateral_return.is_some());

    let big = &tx.body.outputs[0].value.assets;
    assert!(big.values().any(|q| q.to_string() == "1180591620717411303431"));

    // Sent as base64, held as hex.
    assert_eq!(
        tx.witness.datums["923918e403bf43c34b4ef6b48eb2ee04babed17320d8d1b9ff9ad086e86f44ec"],
        "d8799f581cc86e835a1b093aa81610fd3935f463ce529929cded8b75f7b51ce644429c0aff"
    );
}

#[test]
fn test_byron_block_point() {
    let response = decode_vector("roll_forward_byron");
    let forward = response.result.unwrap().roll_forward.unwrap();

    assert_eq!(forward.block.era(), Some(Era::Byron));
    assert!(forward.block.transactions().is_empty());
    assert_eq!(forward.block.point().and_then(|p| p.slot()), Some(4492800));
}

#[test]
fn test_roll_backward_points() {
    let to_block = decode_vector("roll_backward_point");
    let point = to_block.result.unwrap().roll_backward.unwrap().point;
    assert_eq!(point.slot(), Some(16588737));

    let to_origin = decode_vector("roll_backward_origin");
    let point = to_origin.result.unwrap().roll_backward.unwrap().point;
    assert_eq!(point, Point::origin());
}

#[test]
fn test_intersection_results() {
    let found = decode_vector("intersection_found");
    let result = found.result.unwrap();
    let found = result.intersection_found.unwrap();
    assert_eq!(found.point.slot(), Some(39916796));
    assert_eq!(found.tip.block_no, 3710963);
    assert!(result.roll_forward.is_none());

    let not_found = decode_vector("intersection_not_found");
    let tip = not_found.result.unwrap().intersection_not_found.unwrap().tip;
    assert_eq!(tip.slot, 59202548);
}

#[test]
fn test_item_keeps_attribute_names() {
    let response = decode_vector("roll_forward_babbage");
    let item = attr::to_item(&response);

    assert!(item.contains_key("type"));
    assert!(item.contains_key("methodname"));
    assert!(!item.contains_key("fault"));
}
