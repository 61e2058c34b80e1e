//! Strict JSON codec.
//!
//! Field names follow the upstream chain-sync schema and every record
//! rejects unknown fields. Numbers are read and written as raw tokens
//! (serde_json's `arbitrary_precision`), so coin and asset quantities of any
//! size survive unchanged.
//!
//! Decode errors carry a `line L column C` location. Custom errors raised by
//! the visitors in this module are prefixed with an [`ErrorKind`] tag so they
//! can be recovered from serde_json's message-only error type.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::{self, DeserializeOwned, Deserializer, MapAccess, Visitor};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::error::Category;

use crate::envelope::RawBytes;
use crate::error::{CodecError, ErrorKind, Result};
use crate::num::{Int, Uint};
use crate::point::{BlockPosition, Point};
use crate::txid::TxId;

/// Marker key serde_json uses to hand a raw number token to a visitor.
const NUMBER_TOKEN: &str = "$serde_json::private::Number";

/// Decode a value from JSON bytes.
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(CodecError::from)
}

/// Decode a value from a JSON string.
pub fn from_str<T: DeserializeOwned>(s: &str) -> Result<T> {
    serde_json::from_str(s).map_err(CodecError::from)
}

/// Encode a value as compact JSON bytes.
pub fn to_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(CodecError::from)
}

/// Encode a value as a compact JSON string.
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(CodecError::from)
}

/// Normalize a witness datum to hex.
///
/// A non-empty string made only of hex digits is taken as hex and
/// lowercased (an odd number of digits is `MalformedHex`). Anything else must
/// be standard base64 and is re-encoded as lowercase hex.
pub fn normalize_datum(datum: &str) -> Result<String> {
    if datum.is_empty() {
        return Ok(String::new());
    }
    if datum.bytes().all(|b| b.is_ascii_hexdigit()) {
        if datum.len() % 2 != 0 {
            return Err(CodecError::malformed_hex(format!(
                "odd number of digits in {datum:?}"
            )));
        }
        return Ok(datum.to_ascii_lowercase());
    }
    let bytes = STANDARD
        .decode(datum)
        .map_err(|e| CodecError::malformed_base64(format!("{datum:?}: {e}")))?;
    Ok(hex::encode(bytes))
}

pub(crate) fn deserialize_datums<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(hash, datum)| {
            let datum = normalize_datum(&datum).map_err(|e| tagged(e.at(&hash)))?;
            Ok((hash, datum))
        })
        .collect()
}

/// Smuggle a [`CodecError`] through serde's message-only error.
fn tagged<E: de::Error>(err: CodecError) -> E {
    let detail = match err.location() {
        "" => err.detail().to_string(),
        at => format!("{} (at {at})", err.detail()),
    };
    E::custom(format!("{}: {detail}", err.kind().as_str()))
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        let message = err.to_string();
        let message = message
            .rfind(" at line ")
            .map_or(message.as_str(), |i| &message[..i]);
        let error = match err.classify() {
            Category::Data => classify_data(message),
            Category::Syntax | Category::Eof | Category::Io => CodecError::syntax(message),
        };
        if err.line() == 0 {
            error
        } else {
            error.located(format!("line {} column {}", err.line(), err.column()))
        }
    }
}

fn classify_data(message: &str) -> CodecError {
    if let Some((tag, detail)) = message.split_once(": ") {
        if let Some(kind) = ErrorKind::from_tag(tag) {
            return CodecError::new(kind, detail);
        }
    }
    if let Some(rest) = message.strip_prefix("unknown field `") {
        return CodecError::unknown_field(rest.split('`').next().unwrap_or(rest));
    }
    if let Some(rest) = message.strip_prefix("missing field `") {
        return CodecError::missing_field(rest.split('`').next().unwrap_or(rest));
    }
    if message.starts_with("invalid value: integer") {
        return CodecError::range(message);
    }
    if message.starts_with("invalid type: floating point") {
        return CodecError::malformed_number(message);
    }
    CodecError::new(ErrorKind::UnexpectedType, message)
}

// Numbers

fn serialize_decimal<S: Serializer>(decimal: String, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let number: serde_json::Number = decimal.parse().map_err(ser::Error::custom)?;
    number.serialize(serializer)
}

/// Accepts integer tokens of any width and parses them into `T`.
struct DecimalVisitor<T>(PhantomData<T>);

impl<T: FromStr<Err = CodecError>> DecimalVisitor<T> {
    fn parse<E: de::Error>(decimal: &str) -> std::result::Result<T, E> {
        decimal.parse().map_err(tagged)
    }

    fn reject<E: de::Error>(found: &str) -> E {
        tagged(CodecError::malformed_number(format!("expected an integer, found {found}")))
    }
}

impl<'de, T: FromStr<Err = CodecError>> Visitor<'de> for DecimalVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<T, E> {
        Self::parse(&v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<T, E> {
        Self::parse(&v.to_string())
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> std::result::Result<T, E> {
        Self::parse(&v.to_string())
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> std::result::Result<T, E> {
        Self::parse(&v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<T, E> {
        Err(Self::reject(&format!("the float {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<T, E> {
        Err(Self::reject(&format!("the string {v:?}")))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<T, E> {
        Err(Self::reject(&format!("the boolean {v}")))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<T, E> {
        Err(Self::reject("null"))
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, _: A) -> std::result::Result<T, A::Error> {
        Err(Self::reject("an array"))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<T, A::Error> {
        match map.next_key::<String>()? {
            Some(key) if key == NUMBER_TOKEN => {
                let token = map.next_value::<String>()?;
                Self::parse(&token)
            }
            _ => Err(Self::reject("an object")),
        }
    }
}

impl Serialize for Int {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.to_i64() {
            Some(n) => serializer.serialize_i64(n),
            None => serialize_decimal(self.to_string(), serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Int {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(DecimalVisitor(PhantomData))
    }
}

impl Serialize for Uint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.to_u64() {
            Some(n) => serializer.serialize_u64(n),
            None => serialize_decimal(self.to_string(), serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Uint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(DecimalVisitor(PhantomData))
    }
}

// Points

impl Serialize for Point {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Point::Origin(s) => serializer.serialize_str(s),
            Point::Block(b) => b.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Point {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(PointVisitor)
    }
}

struct PointVisitor;

impl PointVisitor {
    fn reject<E: de::Error>(found: &str) -> E {
        tagged(CodecError::malformed_point(format!(
            "expected a string or an object, found {found}"
        )))
    }
}

impl<'de> Visitor<'de> for PointVisitor {
    type Value = Point;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a point string or a {slot, hash, blockNo} object")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Point, E> {
        Ok(Point::Origin(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Point, E> {
        Ok(Point::Origin(v))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> std::result::Result<Point, E> {
        Err(Self::reject("a boolean"))
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> std::result::Result<Point, E> {
        Err(Self::reject("a number"))
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> std::result::Result<Point, E> {
        Err(Self::reject("a number"))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> std::result::Result<Point, E> {
        Err(Self::reject("a number"))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Point, E> {
        Err(Self::reject("null"))
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Point, E> {
        Err(Self::reject("null"))
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, _: A) -> std::result::Result<Point, A::Error> {
        Err(Self::reject("an array"))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Point, A::Error> {
        const FIELDS: &[&str] = &["slot", "hash", "blockNo"];
        let mut slot = None;
        let mut hash = None;
        let mut block_no = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                NUMBER_TOKEN => return Err(Self::reject("a number")),
                "slot" => slot = Some(map.next_value::<u64>()?),
                "hash" => hash = Some(map.next_value::<String>()?),
                "blockNo" => block_no = Some(map.next_value::<u64>()?),
                other => return Err(de::Error::unknown_field(other, FIELDS)),
            }
        }
        match (slot, hash) {
            (Some(slot), Some(hash)) => Ok(Point::Block(BlockPosition {
                slot,
                hash,
                block_no: block_no.unwrap_or_default(),
            })),
            _ => Err(tagged(CodecError::malformed_point(
                "a block point needs both `slot` and `hash`",
            ))),
        }
    }
}

// Identifiers and blobs

impl Serialize for TxId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TxId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TxId::parse(&s).map_err(tagged)
    }
}

impl Serialize for RawBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for RawBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD
            .decode(s.as_bytes())
            .map(RawBytes::from)
            .map_err(|e| tagged(CodecError::malformed_base64(e.to_string())))
    }
}
