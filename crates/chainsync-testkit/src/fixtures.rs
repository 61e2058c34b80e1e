//! Canonical fixture table.
//!
//! Each fixture pins the exact bytes every codec produces for one value, so
//! the three formats are checked against the same source of truth.

use chainsync_core::{Int, Point, Value};

/// 2^70 + 7, a quantity beyond every native integer width the codecs use.
pub const BIG_QUANTITY: &str = "1180591620717411303431";

/// A value with its expected encoding in each format.
#[derive(Debug, Clone)]
pub struct Fixture<T> {
    pub name: &'static str,
    pub value: T,
    /// Compact JSON.
    pub json: &'static str,
    /// Deterministic CBOR, hex.
    pub cbor_hex: &'static str,
    /// The value's attribute in the DynamoDB JSON shape.
    pub attribute: &'static str,
}

impl<T> Fixture<T> {
    pub fn cbor(&self) -> Vec<u8> {
        hex::decode(self.cbor_hex).unwrap_or_default()
    }
}

/// Points in both variants.
pub fn point_fixtures() -> Vec<Fixture<Point>> {
    vec![
        Fixture {
            name: "origin",
            value: Point::origin(),
            json: r#""origin""#,
            cbor_hex: "666f726967696e",
            attribute: r#"{"S":"origin"}"#,
        },
        Fixture {
            name: "block with height",
            value: Point::block(42, "ab", 7),
            json: r#"{"slot":42,"hash":"ab","blockNo":7}"#,
            cbor_hex: "a3646861736862616264736c6f74182a67626c6f636b4e6f07",
            attribute: r#"{"M":{"blockNo":{"N":"7"},"hash":{"S":"ab"},"slot":{"N":"42"}}}"#,
        },
        Fixture {
            name: "block without height",
            value: Point::block(1, "ff", 0),
            json: r#"{"slot":1,"hash":"ff"}"#,
            cbor_hex: "a2646861736862666664736c6f7401",
            attribute: r#"{"M":{"blockNo":{"N":"0"},"hash":{"S":"ff"},"slot":{"N":"1"}}}"#,
        },
    ]
}

/// Values with and without native assets.
pub fn value_fixtures() -> Vec<Fixture<Value>> {
    let big = BIG_QUANTITY.parse::<Int>().unwrap_or_default();
    vec![
        Fixture {
            name: "coins only",
            value: Value::from_coins(1_000_000u64),
            json: r#"{"coins":1000000,"assets":{}}"#,
            cbor_hex: "a265636f696e731a000f424066617373657473a0",
            attribute: r#"{"M":{"assets":{"M":{}},"coins":{"N":"1000000"}}}"#,
        },
        Fixture {
            name: "assets beyond 64 bits",
            value: Value::from_coins(2u64)
                .with_asset("p.t", big)
                .with_asset("p", Int::from(-3)),
            json: r#"{"coins":2,"assets":{"p":-3,"p.t":1180591620717411303431}}"#,
            cbor_hex: "a265636f696e730266617373657473a261702263702e74c249400000000000000007",
            attribute: r#"{"M":{"assets":{"M":{"p":{"N":"-3"},"p.t":{"N":"1180591620717411303431"}}},"coins":{"N":"2"}}}"#,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainsync_core::{cbor, json, AttributeValue, FromAttribute, ToAttribute};

    fn check<T>(fixtures: Vec<Fixture<T>>)
    where
        T: PartialEq
            + std::fmt::Debug
            + serde::Serialize
            + serde::de::DeserializeOwned
            + chainsync_core::CborEncode
            + chainsync_core::CborDecode
            + ToAttribute
            + FromAttribute,
    {
        for f in fixtures {
            assert_eq!(json::to_string(&f.value).unwrap(), f.json, "{}", f.name);
            assert_eq!(json::from_str::<T>(f.json).unwrap(), f.value, "{}", f.name);

            assert_eq!(hex::encode(cbor::to_vec(&f.value)), f.cbor_hex, "{}", f.name);
            assert_eq!(cbor::from_slice::<T>(&f.cbor()).unwrap(), f.value, "{}", f.name);

            let attribute = f.value.to_attribute();
            assert_eq!(json::to_string(&attribute).unwrap(), f.attribute, "{}", f.name);
            let parsed: AttributeValue = json::from_str(f.attribute).unwrap();
            assert_eq!(T::from_attribute(&parsed).unwrap(), f.value, "{}", f.name);
        }
    }

    #[test]
    fn test_point_fixtures() {
        check(point_fixtures());
    }

    #[test]
    fn test_value_fixtures() {
        check(value_fixtures());
    }
}
