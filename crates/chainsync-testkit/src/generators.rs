//! Proptest generators for property-based testing.

use proptest::prelude::*;

use chainsync_core::{AssetId, BlockPosition, Int, Point, Points, TxId, Uint, Value, ORIGIN};

/// Generate a 32-byte hash as lowercase hex.
pub fn hash_hex() -> impl Strategy<Value = String> {
    any::<[u8; 32]>().prop_map(hex::encode)
}

/// Generate an unsigned quantity, sometimes wider than 64 bits.
pub fn uint() -> impl Strategy<Value = Uint> {
    prop_oneof![
        4 => any::<u64>().prop_map(Uint::from),
        4 => "[1-9][0-9]{19,40}".prop_map(|s| Uint::from_decimal(&s).unwrap_or_default()),
        2 => boundary_uint(),
    ]
}

/// Powers of two where the CBOR integer encoding changes shape.
const BOUNDARY_EXPONENTS: [u32; 4] = [63, 64, 127, 128];

/// `2^k`.
fn pow2(k: u32) -> Int {
    (0..k).fold(Int::from(1), |acc, _| &acc + &acc)
}

/// A boundary `±2^k + delta`, with `delta` in -1..=1.
fn boundary_int() -> impl Strategy<Value = Int> {
    (prop::sample::select(&BOUNDARY_EXPONENTS[..]), -1i64..=1, any::<bool>()).prop_map(
        |(k, delta, negative)| {
            let n = pow2(k) + Int::from(delta);
            if negative {
                -n
            } else {
                n
            }
        },
    )
}

/// A boundary `2^k - 1 + delta`, with `delta` in 0..=2.
fn boundary_uint() -> impl Strategy<Value = Uint> {
    (prop::sample::select(&BOUNDARY_EXPONENTS[..]), 0u64..=2).prop_map(|(k, delta)| {
        let below = (0..k).fold(Uint::zero(), |acc, _| &(&acc + &acc) + &Uint::from(1u64));
        below + Uint::from(delta)
    })
}

/// Generate a signed quantity, sometimes wider than 64 bits.
pub fn int() -> impl Strategy<Value = Int> {
    prop_oneof![
        4 => any::<i64>().prop_map(Int::from),
        4 => "-?[1-9][0-9]{19,40}".prop_map(|s| Int::from_decimal(&s).unwrap_or_default()),
        2 => boundary_int(),
    ]
}

/// Generate a block position.
pub fn block_position() -> impl Strategy<Value = BlockPosition> {
    (any::<u64>(), hash_hex(), prop_oneof![Just(0u64), any::<u64>()])
        .prop_map(|(slot, hash, block_no)| BlockPosition::new(slot, hash, block_no))
}

/// Generate a point, mostly block positions.
pub fn point() -> impl Strategy<Value = Point> {
    prop_oneof![
        1 => Just(Point::Origin(ORIGIN.to_string())),
        4 => block_position().prop_map(Point::Block),
    ]
}

/// Generate a set of candidate points.
pub fn points(max_len: usize) -> impl Strategy<Value = Points> {
    prop::collection::vec(point(), 0..=max_len).prop_map(Points::from)
}

/// Generate an asset identifier: a policy id, optionally with an asset name.
pub fn asset_id() -> impl Strategy<Value = AssetId> {
    ("[0-9a-f]{56}", prop::option::of("[0-9a-f]{2,16}")).prop_map(|(policy, name)| match name {
        Some(name) => AssetId::from_parts(&policy, &name),
        None => AssetId::new(policy),
    })
}

/// Generate a multi-asset value.
pub fn value() -> impl Strategy<Value = Value> {
    (uint(), prop::collection::btree_map(asset_id(), int(), 0..4))
        .prop_map(|(coins, assets)| Value::new(coins, assets))
}

/// Generate an output reference.
pub fn tx_id() -> impl Strategy<Value = TxId> {
    (hash_hex(), any::<u32>()).prop_map(|(hash, index)| TxId::new(&hash, u64::from(index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainsync_core::{attr, cbor, json, FromAttribute, ToAttribute};

    proptest! {
        #[test]
        fn test_point_survives_every_format(p in point()) {
            let bytes = json::to_vec(&p).unwrap();
            prop_assert_eq!(json::from_slice::<Point>(&bytes).unwrap(), p.clone());

            let bytes = cbor::to_vec(&p);
            prop_assert_eq!(cbor::from_slice::<Point>(&bytes).unwrap(), p.clone());

            prop_assert_eq!(Point::from_attribute(&p.to_attribute()).unwrap(), p);
        }

        #[test]
        fn test_value_survives_every_format(v in value()) {
            let bytes = json::to_vec(&v).unwrap();
            prop_assert_eq!(json::from_slice::<Value>(&bytes).unwrap(), v.clone());

            let bytes = cbor::to_vec(&v);
            prop_assert_eq!(cbor::from_slice::<Value>(&bytes).unwrap(), v.clone());

            let item = attr::from_json_bytes(&attr::to_json_bytes(&attr::to_item(&v)).unwrap()).unwrap();
            prop_assert_eq!(attr::from_item::<Value>(&item).unwrap(), v);
        }

        #[test]
        fn test_int_survives_every_format(n in int()) {
            let decoded: Int = cbor::from_slice(&cbor::to_vec(&n)).unwrap();
            prop_assert_eq!(&decoded, &n);
            let decoded: Int = json::from_slice(&json::to_vec(&n).unwrap()).unwrap();
            prop_assert_eq!(decoded, n);
        }

        #[test]
        fn test_cbor_is_deterministic(v in value()) {
            let bytes = cbor::to_vec(&v);
            let decoded: Value = cbor::from_slice(&bytes).unwrap();
            prop_assert_eq!(cbor::to_vec(&decoded), bytes);
        }

        #[test]
        fn test_sorted_points_rank_by_slot(mut ps in points(16)) {
            ps.sort();
            let slots: Vec<Option<u64>> = ps.iter().map(Point::slot).collect();
            let first_origin = slots.iter().position(Option::is_none).unwrap_or(slots.len());
            prop_assert!(slots[first_origin..].iter().all(Option::is_none));
            prop_assert!(slots[..first_origin].windows(2).all(|w| w[0] >= w[1]));
            prop_assert_eq!(ps.best().and_then(Point::slot), slots.first().copied().flatten());
        }

        #[test]
        fn test_tx_id_splits_back(id in tx_id()) {
            let parsed = TxId::parse(id.as_str()).unwrap();
            prop_assert_eq!(parsed.tx_hash(), id.tx_hash());
            prop_assert_eq!(parsed.index(), id.index());
        }
    }
}
