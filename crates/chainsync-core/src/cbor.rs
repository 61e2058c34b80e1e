//! Compact binary codec (CBOR).
//!
//! Records are text-keyed maps using the same field names as the JSON
//! schema. Absent optional fields are omitted, unknown keys are rejected.
//! Encoding follows RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding; bignum tags (2/3) only beyond 64 bits
//! - Definite lengths only
//!
//! Non-integer numbers inside opaque JSON trees travel as decimal fractions
//! (tag 4) so their value is exact.
//!
//! Decoding then re-encoding a value produces identical bytes.

use std::collections::BTreeMap;
use std::fmt;

use ciborium::value::{Integer, Value};
use ciborium_ll::{simple, Decoder, Header};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::ToPrimitive;
use serde_json::Value as JsonValue;

use crate::envelope::*;
use crate::error::{CodecError, Result};
use crate::json::normalize_datum;
use crate::num::{Int, Uint};
use crate::point::{BlockPosition, Point};
use crate::txid::TxId;
use crate::value::{AssetId, Value as AssetValue};

/// RFC 8949 positive bignum tag.
const TAG_BIGPOS: u64 = 2;
/// RFC 8949 negative bignum tag.
const TAG_BIGNEG: u64 = 3;
/// RFC 8949 decimal fraction tag, `[exponent, mantissa]`.
const TAG_DECIMAL: u64 = 4;

/// Conversion into a CBOR data item.
pub trait CborEncode {
    fn to_cbor(&self) -> Value;

    /// Absent values are left out of the enclosing record.
    fn is_absent(&self) -> bool {
        false
    }
}

/// Conversion from a CBOR data item.
pub trait CborDecode: Sized {
    fn from_cbor(value: &Value) -> Result<Self>;

    /// Value to use when a record field is missing; `None` makes the field required.
    fn absent() -> Option<Self> {
        None
    }
}

/// Encode a value to canonical CBOR bytes.
pub fn to_vec<T: CborEncode + ?Sized>(value: &T) -> Vec<u8> {
    encode_canonical(&value.to_cbor())
}

/// Decode a value from CBOR bytes. The input must hold exactly one data item.
pub fn from_slice<T: CborDecode>(bytes: &[u8]) -> Result<T> {
    T::from_cbor(&read_item(bytes)?)
}

/// Read exactly one data item from `bytes`.
///
/// Bignum tags (2/3) are kept as tagged byte strings regardless of their
/// magnitude, so every integer the encoder writes can be read back.
pub fn read_item(bytes: &[u8]) -> Result<Value> {
    let mut decoder = Decoder::from(bytes);
    let value = read_value(&mut decoder, 0)?;
    let consumed = decoder.offset();
    if consumed != bytes.len() {
        return Err(CodecError::syntax(format!(
            "{} trailing bytes after data item",
            bytes.len() - consumed
        )));
    }
    Ok(value)
}

// Low-level decoder

/// Nesting limit for arrays, maps and tags.
const MAX_DEPTH: usize = 256;

fn decode_error<E: fmt::Debug>(e: E) -> CodecError {
    CodecError::syntax(format!("{e:?}"))
}

fn read_value(decoder: &mut Decoder<&[u8]>, depth: usize) -> Result<Value> {
    if depth > MAX_DEPTH {
        return Err(CodecError::syntax(format!("nesting deeper than {MAX_DEPTH}")));
    }
    Ok(match decoder.pull().map_err(decode_error)? {
        Header::Positive(n) => Value::Integer(n.into()),
        Header::Negative(n) => {
            let n = -1 - i128::from(n);
            Value::Integer(Integer::try_from(n).map_err(decode_error)?)
        }
        Header::Float(f) => Value::Float(f),
        Header::Simple(simple::FALSE) => Value::Bool(false),
        Header::Simple(simple::TRUE) => Value::Bool(true),
        Header::Simple(simple::NULL) | Header::Simple(simple::UNDEFINED) => Value::Null,
        Header::Simple(other) => {
            return Err(CodecError::syntax(format!("unsupported simple value {other}")))
        }
        Header::Tag(tag) => Value::Tag(tag, Box::new(read_value(decoder, depth + 1)?)),
        Header::Bytes(len) => {
            let mut out = Vec::new();
            let mut scratch = [0u8; 4096];
            let mut segments = decoder.bytes(len);
            while let Some(mut segment) = segments.pull().map_err(decode_error)? {
                while let Some(chunk) = segment.pull(&mut scratch).map_err(decode_error)? {
                    out.extend_from_slice(chunk);
                }
            }
            Value::Bytes(out)
        }
        Header::Text(len) => {
            let mut out = String::new();
            let mut scratch = [0u8; 4096];
            let mut segments = decoder.text(len);
            while let Some(mut segment) = segments.pull().map_err(decode_error)? {
                while let Some(chunk) = segment.pull(&mut scratch).map_err(decode_error)? {
                    out.push_str(chunk);
                }
            }
            Value::Text(out)
        }
        Header::Array(len) => {
            let mut items = Vec::new();
            while has_next(decoder, len, items.len())? {
                items.push(read_value(decoder, depth + 1)?);
            }
            Value::Array(items)
        }
        Header::Map(len) => {
            let mut entries = Vec::new();
            while has_next(decoder, len, entries.len())? {
                let key = read_value(decoder, depth + 1)?;
                let value = read_value(decoder, depth + 1)?;
                entries.push((key, value));
            }
            Value::Map(entries)
        }
        Header::Break => return Err(CodecError::syntax("unexpected break")),
    })
}

/// Whether another array element or map entry follows. Indefinite
/// containers end at a break; definite ones after `len` entries.
fn has_next(decoder: &mut Decoder<&[u8]>, len: Option<usize>, read: usize) -> Result<bool> {
    match len {
        Some(len) => Ok(read < len),
        None => match decoder.pull().map_err(decode_error)? {
            Header::Break => Ok(false),
            header => {
                decoder.push(header);
                Ok(true)
            }
        },
    }
}

// Canonical encoder

/// Encode a CBOR value to canonical bytes.
pub fn encode_canonical(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value);
    buf
}

fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr),
        Value::Map(entries) => encode_map_canonical(buf, entries),
        Value::Tag(tag, inner) => {
            encode_uint(buf, 6, *tag);
            encode_value_to(buf, inner);
        }
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        Value::Float(f) => {
            buf.push(0xfb);
            buf.extend_from_slice(&f.to_be_bytes());
        }
        // ciborium::Value is non-exhaustive; every current variant is handled above.
        _ => buf.push(0xf7),
    }
}

/// Major types 0 and 1.
fn encode_integer(buf: &mut Vec<u8>, i: Integer) {
    let n: i128 = i.into();
    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // -1 encodes as 0, -2 as 1, ...
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Smallest head for `n` under the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value_to(buf, item);
    }
}

/// Keys are sorted by their encoded bytes.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    let mut pairs: Vec<(Vec<u8>, &Value)> = entries
        .iter()
        .map(|(k, v)| (encode_canonical(k), v))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value);
    }
}

// Decoding helpers

fn as_map(value: &Value) -> Result<&[(Value, Value)]> {
    match value {
        Value::Map(entries) => Ok(entries),
        _ => Err(CodecError::unexpected_type("a map")),
    }
}

fn as_text(value: &Value) -> Result<&str> {
    match value {
        Value::Text(s) => Ok(s),
        _ => Err(CodecError::unexpected_type("a text string")),
    }
}

fn lookup<'a>(entries: &'a [(Value, Value)], key: &str) -> Option<&'a Value> {
    entries
        .iter()
        .find(|(k, _)| matches!(k, Value::Text(s) if s == key))
        .map(|(_, v)| v)
}

/// Reject keys outside `known`.
fn check_keys(entries: &[(Value, Value)], known: &[&str]) -> Result<()> {
    for (key, _) in entries {
        let key = as_text(key)?;
        if !known.contains(&key) {
            return Err(CodecError::unknown_field(key));
        }
    }
    Ok(())
}

/// Decode a record field, prefixing errors with its key.
fn field<T: CborDecode>(entries: &[(Value, Value)], key: &str) -> Result<T> {
    match lookup(entries, key) {
        Some(value) => T::from_cbor(value).map_err(|e| e.at(key)),
        None => T::absent().ok_or_else(|| CodecError::missing_field(key)),
    }
}

fn text_entry(key: &str, value: Value) -> (Value, Value) {
    (Value::Text(key.to_string()), value)
}

/// Implements [`CborEncode`] and [`CborDecode`] for a record, one `field: "key"` pair per member.
macro_rules! cbor_record {
    ($ty:ty { $($field:ident: $key:literal),* $(,)? }) => {
        impl CborEncode for $ty {
            fn to_cbor(&self) -> Value {
                let mut entries = Vec::new();
                $(
                    if !self.$field.is_absent() {
                        entries.push(text_entry($key, self.$field.to_cbor()));
                    }
                )*
                Value::Map(entries)
            }
        }

        impl CborDecode for $ty {
            fn from_cbor(value: &Value) -> Result<Self> {
                let entries = as_map(value)?;
                check_keys(entries, &[$($key),*])?;
                Ok(Self {
                    $($field: field(entries, $key)?,)*
                })
            }
        }
    };
}

// Primitives and containers

impl CborEncode for String {
    fn to_cbor(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl CborDecode for String {
    fn from_cbor(value: &Value) -> Result<Self> {
        as_text(value).map(str::to_string)
    }
}

fn big_from_cbor(value: &Value) -> Result<BigInt> {
    match value {
        Value::Integer(i) => Ok(BigInt::from(i128::from(*i))),
        Value::Tag(tag, inner) => match (*tag, inner.as_ref()) {
            (TAG_BIGPOS, Value::Bytes(b)) => Ok(BigInt::from(BigUint::from_bytes_be(b))),
            (TAG_BIGNEG, Value::Bytes(b)) => {
                Ok(-BigInt::from(BigUint::from_bytes_be(b)) - 1)
            }
            (tag, _) => Err(CodecError::malformed_number(format!(
                "tag {tag} is not a bignum"
            ))),
        },
        _ => Err(CodecError::malformed_number("expected an integer")),
    }
}

fn big_to_cbor(n: &BigInt) -> Value {
    if let Some(int) = n.to_i128().and_then(|i| Integer::try_from(i).ok()) {
        return Value::Integer(int);
    }
    let (tag, magnitude) = match n.sign() {
        Sign::Minus => (TAG_BIGNEG, (-n - 1u8).magnitude().to_bytes_be()),
        _ => (TAG_BIGPOS, n.magnitude().to_bytes_be()),
    };
    Value::Tag(tag, Box::new(Value::Bytes(magnitude)))
}

macro_rules! cbor_native_uint {
    ($($t:ty),*) => {
        $(
            impl CborEncode for $t {
                fn to_cbor(&self) -> Value {
                    Value::Integer((*self).into())
                }
            }

            impl CborDecode for $t {
                fn from_cbor(value: &Value) -> Result<Self> {
                    let n = big_from_cbor(value)?;
                    <$t>::try_from(&n).map_err(|_| {
                        CodecError::range(format!("{n} does not fit in {}", stringify!($t)))
                    })
                }
            }
        )*
    };
}

cbor_native_uint!(u32, u64);

impl CborEncode for Int {
    fn to_cbor(&self) -> Value {
        big_to_cbor(self.as_bigint())
    }
}

impl CborDecode for Int {
    fn from_cbor(value: &Value) -> Result<Self> {
        big_from_cbor(value).map(Int::from)
    }
}

impl CborEncode for Uint {
    fn to_cbor(&self) -> Value {
        big_to_cbor(&BigInt::from(self.as_biguint().clone()))
    }
}

impl CborDecode for Uint {
    fn from_cbor(value: &Value) -> Result<Self> {
        big_from_cbor(value).and_then(Uint::try_from)
    }
}

impl<T: CborEncode> CborEncode for Option<T> {
    fn to_cbor(&self) -> Value {
        self.as_ref().map_or(Value::Null, T::to_cbor)
    }

    fn is_absent(&self) -> bool {
        self.is_none()
    }
}

impl<T: CborDecode> CborDecode for Option<T> {
    fn from_cbor(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            v => T::from_cbor(v).map(Some),
        }
    }

    fn absent() -> Option<Self> {
        Some(None)
    }
}

impl<T: CborEncode> CborEncode for Vec<T> {
    fn to_cbor(&self) -> Value {
        Value::Array(self.iter().map(T::to_cbor).collect())
    }
}

impl<T: CborDecode> CborDecode for Vec<T> {
    fn from_cbor(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| T::from_cbor(item).map_err(|e| e.at_index(i)))
                .collect(),
            _ => Err(CodecError::unexpected_type("an array")),
        }
    }

    fn absent() -> Option<Self> {
        Some(Vec::new())
    }
}

/// Types usable as text map keys.
pub trait CborKey: Ord + Sized {
    fn as_key(&self) -> &str;
    fn from_key(key: &str) -> Self;
}

impl CborKey for String {
    fn as_key(&self) -> &str {
        self
    }

    fn from_key(key: &str) -> Self {
        key.to_string()
    }
}

impl CborKey for AssetId {
    fn as_key(&self) -> &str {
        self.as_str()
    }

    fn from_key(key: &str) -> Self {
        AssetId::from(key)
    }
}

impl<K: CborKey, V: CborEncode> CborEncode for BTreeMap<K, V> {
    fn to_cbor(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| text_entry(k.as_key(), v.to_cbor()))
                .collect(),
        )
    }
}

impl<K: CborKey, V: CborDecode> CborDecode for BTreeMap<K, V> {
    fn from_cbor(value: &Value) -> Result<Self> {
        as_map(value)?
            .iter()
            .map(|(k, v)| {
                let key = as_text(k)?;
                let value = V::from_cbor(v).map_err(|e| e.at(key))?;
                Ok((K::from_key(key), value))
            })
            .collect()
    }

    fn absent() -> Option<Self> {
        Some(BTreeMap::new())
    }
}

/// Opaque JSON trees map onto the JSON-compatible subset of CBOR.
impl CborEncode for JsonValue {
    fn to_cbor(&self) -> Value {
        match self {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => {
                let token = n.to_string();
                if let Ok(i) = Int::from_decimal(&token) {
                    return i.to_cbor();
                }
                match decimal_parts(&token) {
                    Some((exponent, mantissa)) => Value::Tag(
                        TAG_DECIMAL,
                        Box::new(Value::Array(vec![
                            Value::Integer(exponent.into()),
                            big_to_cbor(&mantissa),
                        ])),
                    ),
                    None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
                }
            }
            JsonValue::String(s) => Value::Text(s.clone()),
            JsonValue::Array(items) => Value::Array(items.iter().map(JsonValue::to_cbor).collect()),
            JsonValue::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| text_entry(k, v.to_cbor()))
                    .collect(),
            ),
        }
    }
}

impl CborDecode for JsonValue {
    fn from_cbor(value: &Value) -> Result<Self> {
        Ok(match value {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Tag(TAG_DECIMAL, inner) => {
                let token = match inner.as_ref() {
                    Value::Array(parts) if parts.len() == 2 => {
                        let exponent = big_from_cbor(&parts[0])?
                            .to_i64()
                            .ok_or_else(|| CodecError::range("decimal exponent out of range"))?;
                        decimal_token(exponent, &big_from_cbor(&parts[1])?)
                    }
                    _ => {
                        return Err(CodecError::malformed_number(
                            "a decimal fraction needs [exponent, mantissa]",
                        ))
                    }
                };
                let number: serde_json::Number = token
                    .parse()
                    .map_err(|e| CodecError::malformed_number(format!("{token}: {e}")))?;
                JsonValue::Number(number)
            }
            Value::Integer(_) | Value::Tag(..) => {
                let n = big_from_cbor(value)?;
                let number: serde_json::Number = n
                    .to_string()
                    .parse()
                    .map_err(|e| CodecError::malformed_number(format!("{n}: {e}")))?;
                JsonValue::Number(number)
            }
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .ok_or_else(|| CodecError::malformed_number(format!("{f} is not a JSON number")))?,
            Value::Text(s) => JsonValue::String(s.clone()),
            Value::Array(items) => JsonValue::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| JsonValue::from_cbor(item).map_err(|e| e.at_index(i)))
                    .collect::<Result<_>>()?,
            ),
            Value::Map(entries) => JsonValue::Object(
                entries
                    .iter()
                    .map(|(k, v)| {
                        let key = as_text(k)?;
                        let value = JsonValue::from_cbor(v).map_err(|e| e.at(key))?;
                        Ok((key.to_string(), value))
                    })
                    .collect::<Result<_>>()?,
            ),
            _ => return Err(CodecError::unexpected_type("a JSON-compatible data item")),
        })
    }
}

/// Split a JSON number token into `(exponent, mantissa)`, its exact value
/// being `mantissa * 10^exponent`.
fn decimal_parts(token: &str) -> Option<(i64, BigInt)> {
    let (significand, exp) = match token.find(|c: char| c == 'e' || c == 'E') {
        Some(i) => (&token[..i], token[i + 1..].parse::<i64>().ok()?),
        None => (token, 0),
    };
    let (int, frac) = significand.split_once('.').unwrap_or((significand, ""));
    let mantissa: BigInt = format!("{int}{frac}").parse().ok()?;
    let exponent = exp.checked_sub(i64::try_from(frac.len()).ok()?)?;
    Some((exponent, mantissa))
}

/// Render a decimal fraction as a JSON number token. Small negative
/// exponents use a decimal point, everything else exponent notation.
fn decimal_token(exponent: i64, mantissa: &BigInt) -> String {
    let scale = usize::try_from(exponent.unsigned_abs()).unwrap_or(usize::MAX);
    let digits = mantissa.magnitude().to_string();
    if exponent >= 0 || scale > digits.len() + 32 {
        return format!("{mantissa}e{exponent}");
    }
    let sign = if mantissa.sign() == Sign::Minus { "-" } else { "" };
    let digits = if digits.len() <= scale {
        format!("{}{digits}", "0".repeat(scale + 1 - digits.len()))
    } else {
        digits
    };
    let (int, frac) = digits.split_at(digits.len() - scale);
    format!("{sign}{int}.{frac}")
}

// Domain primitives

impl CborEncode for Point {
    fn to_cbor(&self) -> Value {
        match self {
            Point::Origin(s) => Value::Text(s.clone()),
            Point::Block(b) => b.to_cbor(),
        }
    }
}

impl CborDecode for Point {
    fn from_cbor(value: &Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(Point::Origin(s.clone())),
            Value::Map(_) => BlockPosition::from_cbor(value)
                .map(Point::Block)
                .map_err(|e| match e {
                    CodecError::MissingField { at, detail } => CodecError::MalformedPoint {
                        at,
                        detail: format!("a block point needs `{detail}`"),
                    },
                    other => other,
                }),
            _ => Err(CodecError::malformed_point(
                "expected a text string or a map",
            )),
        }
    }
}

impl CborEncode for BlockPosition {
    fn to_cbor(&self) -> Value {
        let mut entries = vec![
            text_entry("slot", self.slot.to_cbor()),
            text_entry("hash", self.hash.to_cbor()),
        ];
        if self.block_no != 0 {
            entries.push(text_entry("blockNo", self.block_no.to_cbor()));
        }
        Value::Map(entries)
    }
}

impl CborDecode for BlockPosition {
    fn from_cbor(value: &Value) -> Result<Self> {
        let entries = as_map(value)?;
        check_keys(entries, &["slot", "hash", "blockNo"])?;
        Ok(BlockPosition {
            slot: field(entries, "slot")?,
            hash: field(entries, "hash")?,
            block_no: field::<Option<u64>>(entries, "blockNo")?.unwrap_or_default(),
        })
    }
}

cbor_record!(AssetValue { coins: "coins", assets: "assets" });

impl CborEncode for TxId {
    fn to_cbor(&self) -> Value {
        Value::Text(self.as_str().to_string())
    }
}

impl CborDecode for TxId {
    fn from_cbor(value: &Value) -> Result<Self> {
        TxId::parse(as_text(value)?)
    }
}

impl CborEncode for RawBytes {
    fn to_cbor(&self) -> Value {
        Value::Bytes(self.0.to_vec())
    }
}

impl CborDecode for RawBytes {
    fn from_cbor(value: &Value) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(RawBytes::from(b.as_slice())),
            _ => Err(CodecError::unexpected_type("a byte string")),
        }
    }
}

// Envelopes

cbor_record!(Response {
    kind: "type",
    version: "version",
    servicename: "servicename",
    methodname: "methodname",
    result: "result",
    fault: "fault",
    reflection: "reflection",
});

cbor_record!(Fault { code: "code", string: "string" });

cbor_record!(ChainSyncResult {
    intersection_found: "IntersectionFound",
    intersection_not_found: "IntersectionNotFound",
    roll_forward: "RollForward",
    roll_backward: "RollBackward",
});

cbor_record!(IntersectionFound { point: "point", tip: "tip" });
cbor_record!(IntersectionNotFound { tip: "tip" });
cbor_record!(RollForward { block: "block", tip: "tip" });
cbor_record!(RollBackward { point: "point", tip: "tip" });

cbor_record!(Block {
    byron: "byron",
    shelley: "shelley",
    allegra: "allegra",
    mary: "mary",
    alonzo: "alonzo",
    babbage: "babbage",
});

cbor_record!(EraBlock { body: "body", header: "header", header_hash: "headerHash" });

cbor_record!(BlockHeader {
    block_hash: "blockHash",
    block_height: "blockHeight",
    block_size: "blockSize",
    slot: "slot",
    prev_hash: "prevHash",
    issuer_vk: "issuerVk",
    issuer_vrf: "issuerVrf",
    nonce: "nonce",
    leader_value: "leaderValue",
    vrf_input: "vrfInput",
    op_cert: "opCert",
    protocol_version: "protocolVersion",
    signature: "signature",
});

cbor_record!(VrfCert { output: "output", proof: "proof" });

cbor_record!(OpCert {
    hot_vk: "hotVk",
    count: "count",
    kes_period: "kesPeriod",
    sigma: "sigma",
});

cbor_record!(ProtocolVersion {
    major: "major",
    minor: "minor",
    patch: "patch",
    software: "software",
});

cbor_record!(ByronBlock { hash: "hash", header: "header", body: "body" });

cbor_record!(ByronHeader {
    slot: "slot",
    epoch: "epoch",
    block_height: "blockHeight",
    prev_hash: "prevHash",
    genesis_key: "genesisKey",
    protocol_magic_id: "protocolMagicId",
    protocol_version: "protocolVersion",
    software_version: "softwareVersion",
    signature: "signature",
    proof: "proof",
});

cbor_record!(ByronBody {
    tx_payload: "txPayload",
    dlg_payload: "dlgPayload",
    update_payload: "updatePayload",
});

cbor_record!(ByronTx { id: "id", body: "body", witness: "witness" });
cbor_record!(ByronTxBody { inputs: "inputs", outputs: "outputs" });

cbor_record!(Tx {
    id: "id",
    input_source: "inputSource",
    body: "body",
    witness: "witness",
    metadata: "metadata",
    raw: "raw",
});

cbor_record!(TxBody {
    inputs: "inputs",
    collaterals: "collaterals",
    references: "references",
    outputs: "outputs",
    collateral_return: "collateralReturn",
    total_collateral: "totalCollateral",
    certificates: "certificates",
    withdrawals: "withdrawals",
    fee: "fee",
    validity_interval: "validityInterval",
    time_to_live: "timeToLive",
    update: "update",
    mint: "mint",
    network: "network",
    script_integrity_hash: "scriptIntegrityHash",
    required_extra_signatures: "requiredExtraSignatures",
});

cbor_record!(TxIn { tx_id: "txId", index: "index" });

cbor_record!(TxOut {
    address: "address",
    value: "value",
    datum_hash: "datumHash",
    datum: "datum",
    script: "script",
});

cbor_record!(ValidityInterval {
    invalid_before: "invalidBefore",
    invalid_hereafter: "invalidHereafter",
});

cbor_record!(Script {
    native: "native",
    plutus_v1: "plutus:v1",
    plutus_v2: "plutus:v2",
});

cbor_record!(Redeemer { redeemer: "redeemer", execution_units: "executionUnits" });
cbor_record!(ExecutionUnits { memory: "memory", steps: "steps" });

cbor_record!(BootstrapWitness {
    signature: "signature",
    key: "key",
    chain_code: "chainCode",
    address_attributes: "addressAttributes",
});

// Datums are stored as raw bytes; text is accepted and normalized.

fn datums_to_cbor(datums: &BTreeMap<String, String>) -> Value {
    Value::Map(
        datums
            .iter()
            .map(|(hash, datum)| {
                let value = match hex::decode(datum) {
                    Ok(bytes) => Value::Bytes(bytes),
                    Err(_) => Value::Text(datum.clone()),
                };
                text_entry(hash, value)
            })
            .collect(),
    )
}

fn datums_from_cbor(value: &Value) -> Result<BTreeMap<String, String>> {
    as_map(value)?
        .iter()
        .map(|(k, v)| {
            let hash = as_text(k)?;
            let datum = match v {
                Value::Bytes(b) => hex::encode(b),
                Value::Text(s) => normalize_datum(s).map_err(|e| e.at(hash))?,
                _ => return Err(CodecError::unexpected_type("a byte string").at(hash)),
            };
            Ok((hash.to_string(), datum))
        })
        .collect()
}

impl CborEncode for Witness {
    fn to_cbor(&self) -> Value {
        Value::Map(vec![
            text_entry("signatures", self.signatures.to_cbor()),
            text_entry("scripts", self.scripts.to_cbor()),
            text_entry("datums", datums_to_cbor(&self.datums)),
            text_entry("redeemers", self.redeemers.to_cbor()),
            text_entry("bootstrap", self.bootstrap.to_cbor()),
        ])
    }
}

impl CborDecode for Witness {
    fn from_cbor(value: &Value) -> Result<Self> {
        let entries = as_map(value)?;
        check_keys(
            entries,
            &["signatures", "scripts", "datums", "redeemers", "bootstrap"],
        )?;
        let datums = match lookup(entries, "datums") {
            Some(v) => datums_from_cbor(v).map_err(|e| e.at("datums"))?,
            None => BTreeMap::new(),
        };
        Ok(Witness {
            signatures: field(entries, "signatures")?,
            scripts: field(entries, "scripts")?,
            datums,
            redeemers: field(entries, "redeemers")?,
            bootstrap: field(entries, "bootstrap")?,
        })
    }

    fn absent() -> Option<Self> {
        Some(Witness::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn roundtrip<T: CborEncode + CborDecode + PartialEq + std::fmt::Debug>(value: &T) {
        let bytes = to_vec(value);
        let decoded: T = from_slice(&bytes).unwrap();
        assert_eq!(&decoded, value);
        assert_eq!(to_vec(&decoded), bytes, "re-encoding must be byte-identical");
    }

    #[test]
    fn test_smallest_integer_heads() {
        assert_eq!(to_vec(&0u64), vec![0x00]);
        assert_eq!(to_vec(&23u64), vec![0x17]);
        assert_eq!(to_vec(&24u64), vec![0x18, 0x18]);
        assert_eq!(to_vec(&256u64), vec![0x19, 0x01, 0x00]);
        assert_eq!(to_vec(&Int::from(-1)), vec![0x20]);
        assert_eq!(to_vec(&Int::from(-25)), vec![0x38, 0x18]);
    }

    #[test]
    fn test_bignum_tags_beyond_u64() {
        let big = Uint::from_decimal("1180591620717411303431").unwrap(); // 2^70 + 7
        let bytes = to_vec(&big);
        assert_eq!(bytes[0], 0xc2);
        roundtrip(&big);

        let neg = Int::from_decimal("-1180591620717411303431").unwrap();
        assert_eq!(to_vec(&neg)[0], 0xc3);
        roundtrip(&neg);

        roundtrip(&Uint::from(u64::MAX));
        roundtrip(&Int::from(i64::MIN));
        roundtrip(&Int::from(-(1i128 << 64)));
    }

    #[test]
    fn test_bignum_boundaries() {
        // -(2^64)-1 is the first negative bignum; the rest straddle i128 and u128.
        for literal in [
            "18446744073709551616",
            "-18446744073709551616",
            "-18446744073709551617",
            "170141183460469231731687303715884105727",
            "170141183460469231731687303715884105728",
            "-170141183460469231731687303715884105728",
            "-170141183460469231731687303715884105729",
            "340282366920938463463374607431768211455",
            "-340282366920938463463374607431768211456",
            "-340282366920938463463374607431768211457",
        ] {
            let n = Int::from_decimal(literal).unwrap();
            let decoded: Int = from_slice(&to_vec(&n)).unwrap_or_else(|e| panic!("{literal}: {e}"));
            assert_eq!(decoded, n, "{literal}");
            assert_eq!(to_vec(&decoded), to_vec(&n), "{literal}");
        }
        assert_eq!(to_vec(&Int::from(-(1i128 << 64)))[0], 0x3b);
        assert_eq!(to_vec(&Int::from_decimal("-18446744073709551617").unwrap())[0], 0xc3);
    }

    #[test]
    fn test_indefinite_lengths_accepted() {
        // [_ "a", h'01'] and {_ "k": 1}
        let array = [0x9f, 0x61, b'a', 0x41, 0x01, 0xff];
        assert_eq!(
            read_item(&array).unwrap(),
            Value::Array(vec![Value::Text("a".into()), Value::Bytes(vec![1])])
        );
        let map = [0xbf, 0x61, b'k', 0x01, 0xff];
        assert_eq!(read_item(&map).unwrap(), Value::Map(vec![text_entry("k", Value::Integer(1.into()))]));
        assert_eq!(read_item(&[0xff]).unwrap_err().kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_number_errors() {
        let text = to_vec(&"12".to_string());
        assert_eq!(from_slice::<Int>(&text).unwrap_err().kind(), ErrorKind::MalformedNumber);
        let negative = to_vec(&Int::from(-1));
        assert_eq!(from_slice::<Uint>(&negative).unwrap_err().kind(), ErrorKind::RangeError);
        assert_eq!(from_slice::<u32>(&to_vec(&(1u64 << 40))).unwrap_err().kind(), ErrorKind::RangeError);
    }

    #[test]
    fn test_point_both_variants() {
        roundtrip(&Point::origin());
        roundtrip(&Point::block(456, "hash", 123));
        roundtrip(&Point::block(1, "ab", 0));
        assert_eq!(to_vec(&Point::origin())[0] >> 5, 3);
    }

    #[test]
    fn test_point_shape_errors() {
        let err = from_slice::<Point>(&to_vec(&7u64)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPoint);

        let missing_hash = encode_canonical(&Value::Map(vec![text_entry("slot", Value::Integer(1.into()))]));
        assert_eq!(from_slice::<Point>(&missing_hash).unwrap_err().kind(), ErrorKind::MalformedPoint);

        let extra = encode_canonical(&Value::Map(vec![
            text_entry("slot", Value::Integer(1.into())),
            text_entry("hash", Value::Text("a".into())),
            text_entry("era", Value::Text("x".into())),
        ]));
        let err = from_slice::<Point>(&extra).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownField);
        assert_eq!(err.detail(), "era");
    }

    #[test]
    fn test_canonical_key_order() {
        let value = Value::Map(vec![
            text_entry("bb", Value::Null),
            text_entry("a", Value::Null),
            text_entry("c", Value::Null),
        ]);
        // shorter encoded keys sort first: "a", "c", then "bb"
        assert_eq!(
            encode_canonical(&value),
            vec![0xa3, 0x61, b'a', 0xf6, 0x61, b'c', 0xf6, 0x62, b'b', b'b', 0xf6]
        );
    }

    #[test]
    fn test_value_implicit_zero_survives() {
        let v = AssetValue::from_coins(1u64).with_asset("A", 10).with_asset("B", 0);
        roundtrip(&v);
        let decoded: AssetValue = from_slice(&to_vec(&v)).unwrap();
        assert_eq!(decoded, AssetValue::from_coins(1u64).with_asset("A", 10));
    }

    #[test]
    fn test_datums_stored_as_bytes() {
        let mut witness = Witness::default();
        witness.datums.insert("a".into(), "d87980".into());
        let cbor = witness.to_cbor();
        let datums = lookup(as_map(&cbor).unwrap(), "datums").unwrap();
        assert_eq!(lookup(as_map(datums).unwrap(), "a"), Some(&Value::Bytes(vec![0xd8, 0x79, 0x80])));
        roundtrip(&witness);
    }

    #[test]
    fn test_text_datums_normalized() {
        let value = Value::Map(vec![text_entry(
            "datums",
            Value::Map(vec![text_entry("a", Value::Text("2HmA".into()))]),
        )]);
        let witness: Witness = from_slice(&encode_canonical(&value)).unwrap();
        assert_eq!(witness.datums["a"], "d87980");
    }

    #[test]
    fn test_unknown_key_path() {
        let tx_in = Value::Map(vec![
            text_entry("txId", Value::Text("ab".into())),
            text_entry("index", Value::Integer(0.into())),
            text_entry("spent", Value::Bool(true)),
        ]);
        let body = Value::Map(vec![
            text_entry("inputs", Value::Array(vec![tx_in])),
            text_entry("fee", Value::Integer(1.into())),
        ]);
        let err = from_slice::<TxBody>(&encode_canonical(&body)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownField);
        assert_eq!(err.location(), "inputs[0]");
    }

    #[test]
    fn test_opaque_json_roundtrip() {
        let json: JsonValue = serde_json::from_str(
            r#"{"any":[{"expiresAt":123},{"startsAt":-4}],"big":1180591620717411303431,"n":null,"t":true}"#,
        )
        .unwrap();
        roundtrip(&json);
    }

    #[test]
    fn test_opaque_decimals_exact() {
        for token in ["1e3", "0.1", "-0.5", "0.50", "123456789012345678901234567890.000001"] {
            let json: JsonValue = serde_json::from_str(&format!(r#"{{"x":{token}}}"#)).unwrap();
            let cbor = json.to_cbor();
            let x = lookup(as_map(&cbor).unwrap(), "x").unwrap();
            assert!(matches!(x, Value::Tag(TAG_DECIMAL, _)), "{token}");
            roundtrip(&json);
            let back: JsonValue = from_slice(&to_vec(&json)).unwrap();
            assert_eq!(back["x"].to_string(), token);
        }
        // exponent spelling is normalized, the value is not
        let json: JsonValue = serde_json::from_str("1.5E+3").unwrap();
        let back: JsonValue = from_slice(&to_vec(&json)).unwrap();
        assert_eq!(back.to_string(), "15e2");
    }

    #[test]
    fn test_uppercase_hex_datum_survives() {
        let witness: Witness = crate::json::from_str(r#"{"datums":{"a":"D87980"}}"#).unwrap();
        assert_eq!(witness.datums["a"], "d87980");
        roundtrip(&witness);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = to_vec(&1u64);
        bytes.push(0x00);
        assert_eq!(from_slice::<u64>(&bytes).unwrap_err().kind(), ErrorKind::Syntax);
        assert_eq!(from_slice::<u64>(&[0xff, 0xff]).unwrap_err().kind(), ErrorKind::Syntax);
    }
}
