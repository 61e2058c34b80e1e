//! Format-generic encode/decode over the three wire formats.
//!
//! Every payload type implements all three codecs in `chainsync_core`; this
//! module picks one at runtime and recognizes input that was written in a
//! different format than the caller asked for.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use chainsync_core::attr::{self, AttributeRecord};
use chainsync_core::cbor::{self, CborDecode, CborEncode};
use chainsync_core::error::Result;
use chainsync_core::{json, CodecError};

/// Attribute type tags of the DynamoDB JSON shape.
const ATTRIBUTE_TAGS: [&str; 7] = ["S", "N", "B", "BOOL", "NULL", "M", "L"];

/// A wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Schema-strict protocol JSON.
    Json,
    /// Deterministic CBOR.
    Cbor,
    /// An attribute item in the DynamoDB JSON shape.
    Attribute,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Json, Format::Cbor, Format::Attribute];

    pub fn name(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Cbor => "cbor",
            Format::Attribute => "attribute",
        }
    }

    /// Guess the format of `bytes`.
    ///
    /// Well-formed JSON whose top level is a non-empty object of single-tag
    /// attribute values is an attribute item; any other well-formed JSON is
    /// protocol JSON. Otherwise the bytes are CBOR if they hold exactly one
    /// complete data item. Returns `None` for anything else.
    pub fn detect(bytes: &[u8]) -> Option<Format> {
        if let Ok(value) = serde_json::from_slice::<serde_json::Value>(bytes) {
            return Some(if looks_like_item(&value) {
                Format::Attribute
            } else {
                Format::Json
            });
        }

        cbor::read_item(bytes).ok().map(|_| Format::Cbor)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn looks_like_item(value: &serde_json::Value) -> bool {
    let serde_json::Value::Object(fields) = value else {
        return false;
    };
    !fields.is_empty()
        && fields.values().all(|v| match v {
            serde_json::Value::Object(tagged) => {
                tagged.len() == 1
                    && tagged
                        .keys()
                        .all(|tag| ATTRIBUTE_TAGS.contains(&tag.as_str()))
            }
            _ => false,
        })
}

/// A type carried by all three formats.
pub trait Payload:
    Serialize + DeserializeOwned + CborEncode + CborDecode + AttributeRecord
{
}

impl<T> Payload for T where
    T: Serialize + DeserializeOwned + CborEncode + CborDecode + AttributeRecord
{
}

/// Encode `value` in `format`.
pub fn encode<T: Payload>(format: Format, value: &T) -> Result<Vec<u8>> {
    match format {
        Format::Json => json::to_vec(value),
        Format::Cbor => Ok(cbor::to_vec(value)),
        Format::Attribute => attr::to_json_bytes(&attr::to_item(value)),
    }
}

/// Decode `bytes` as `format`.
///
/// When decoding fails and the input is recognizably another format, the
/// error is `FormatMismatch` instead of the underlying codec error.
pub fn decode<T: Payload>(format: Format, bytes: &[u8]) -> Result<T> {
    let decoded = match format {
        Format::Json => json::from_slice(bytes),
        Format::Cbor => cbor::from_slice(bytes),
        Format::Attribute => attr::from_json_bytes(bytes).and_then(|item| attr::from_item(&item)),
    };

    decoded.map_err(|err| match Format::detect(bytes) {
        Some(found) if found != format => {
            CodecError::format_mismatch(format.name(), found.name())
        }
        _ => err,
    })
}

/// Decode `bytes` as `from` and re-encode the value as `to`.
pub fn transcode<T: Payload>(from: Format, to: Format, bytes: &[u8]) -> Result<Vec<u8>> {
    let value: T = decode(from, bytes)?;
    encode(to, &value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainsync_core::{BlockPosition, ErrorKind, Int, Value};

    fn sample_value() -> Value {
        Value::from_coins(2_000_000u64)
            .with_asset("policy.token", Int::from(-5))
            .with_asset("policy", 1u64)
    }

    #[test]
    fn test_round_trip_every_format() {
        let value = sample_value();
        for format in Format::ALL {
            let bytes = encode(format, &value).unwrap();
            assert_eq!(Format::detect(&bytes), Some(format), "{format}");
            let decoded: Value = decode(format, &bytes).unwrap();
            assert_eq!(decoded, value, "{format}");
        }
    }

    #[test]
    fn test_detect() {
        assert_eq!(Format::detect(br#"{"slot":1,"hash":"ab"}"#), Some(Format::Json));
        assert_eq!(Format::detect(br#""origin""#), Some(Format::Json));
        assert_eq!(Format::detect(b"{}"), Some(Format::Json));
        assert_eq!(
            Format::detect(br#"{"slot":{"N":"1"},"hash":{"S":"ab"}}"#),
            Some(Format::Attribute)
        );
        assert_eq!(Format::detect(&[0xa1, 0x61, 0x61, 0x01]), Some(Format::Cbor));
        assert_eq!(Format::detect(&[0xa1, 0x61]), None);
        assert_eq!(Format::detect(b""), None);
    }

    #[test]
    fn test_format_mismatch() {
        let tip = BlockPosition::new(10, "ff", 2);
        let cbor_bytes = encode(Format::Cbor, &tip).unwrap();
        let item_bytes = encode(Format::Attribute, &tip).unwrap();
        let json_bytes = encode(Format::Json, &tip).unwrap();

        let err = decode::<BlockPosition>(Format::Json, &cbor_bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatMismatch);
        assert!(err.detail().contains("expected json"));
        assert!(err.detail().contains("found cbor"));

        let err = decode::<BlockPosition>(Format::Json, &item_bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatMismatch);

        let err = decode::<BlockPosition>(Format::Attribute, &json_bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatMismatch);
    }

    #[test]
    fn test_same_format_errors_pass_through() {
        let err = decode::<BlockPosition>(Format::Json, br#"{"slot":1,"hash":"ab","x":1}"#)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownField);

        let err = decode::<BlockPosition>(Format::Json, b"{\"slot\":").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_transcode_json_to_cbor_to_attribute() {
        let json_bytes = encode(Format::Json, &sample_value()).unwrap();
        let cbor_bytes = transcode::<Value>(Format::Json, Format::Cbor, &json_bytes).unwrap();
        let item_bytes = transcode::<Value>(Format::Cbor, Format::Attribute, &cbor_bytes).unwrap();
        let back = transcode::<Value>(Format::Attribute, Format::Json, &item_bytes).unwrap();
        assert_eq!(back, json_bytes);
    }
}
