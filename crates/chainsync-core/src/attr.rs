//! Durable attribute codec.
//!
//! Values are mapped onto DynamoDB-style typed attributes: `S` (string), `N`
//! (decimal number carried as a string), `B` (binary), `BOOL`, `NULL`, `M`
//! (map) and `L` (list). A record becomes an [`Item`], a map from attribute
//! name to attribute value.
//!
//! This is the on-disk format for persisted state, so attribute names are
//! declared here independently of the JSON field names. Decoding is lenient
//! about shape drift: unknown attributes are ignored and missing optional
//! attributes decode as `None` or empty. Witness datums written by older
//! versions as base64 are normalized to hex.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::envelope::*;
use crate::error::{CodecError, Result};
use crate::json::normalize_datum;
use crate::num::{Int, Uint};
use crate::point::{BlockPosition, Point};
use crate::txid::TxId;
use crate::value::{AssetId, Value};

/// A typed attribute value.
///
/// Serializes in the DynamoDB JSON shape: `{"S":"…"}`, `{"N":"…"}`,
/// `{"B":"<base64>"}`, `{"BOOL":true}`, `{"NULL":true}`, `{"M":{…}}`, `{"L":[…]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    N(String),
    B(#[serde(with = "blob")] Bytes),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    M(BTreeMap<String, AttributeValue>),
    L(Vec<AttributeValue>),
}

/// A persisted record: attribute name to value.
pub type Item = BTreeMap<String, AttributeValue>;

impl AttributeValue {
    fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::S(_) => "S",
            AttributeValue::N(_) => "N",
            AttributeValue::B(_) => "B",
            AttributeValue::Bool(_) => "BOOL",
            AttributeValue::Null(_) => "NULL",
            AttributeValue::M(_) => "M",
            AttributeValue::L(_) => "L",
        }
    }

    fn mismatch(&self, expected: &str) -> CodecError {
        CodecError::unexpected_type(&format!("{expected} attribute, found {}", self.type_name()))
    }
}

mod blob {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD
            .decode(s.as_bytes())
            .map(Bytes::from)
            .map_err(|e| serde::de::Error::custom(format!("malformed-base64: {e}")))
    }
}

/// Conversion into an attribute value.
pub trait ToAttribute {
    fn to_attribute(&self) -> AttributeValue;

    /// Absent values are left out of the enclosing item.
    fn is_absent(&self) -> bool {
        false
    }
}

/// Conversion from an attribute value.
pub trait FromAttribute: Sized {
    fn from_attribute(value: &AttributeValue) -> Result<Self>;

    /// Value to use when an attribute is missing; `None` makes it required.
    fn absent() -> Option<Self> {
        None
    }
}

/// A type persisted as a whole item.
pub trait AttributeRecord: Sized {
    fn to_fields(&self) -> Item;
    fn from_fields(fields: &Item) -> Result<Self>;
}

/// Encode a record as an item.
pub fn to_item<T: AttributeRecord>(value: &T) -> Item {
    value.to_fields()
}

/// Decode a record from an item.
pub fn from_item<T: AttributeRecord>(item: &Item) -> Result<T> {
    T::from_fields(item)
}

/// Serialize an item in the DynamoDB JSON shape.
pub fn to_json_bytes(item: &Item) -> Result<Vec<u8>> {
    crate::json::to_vec(item)
}

/// Parse an item from the DynamoDB JSON shape.
pub fn from_json_bytes(bytes: &[u8]) -> Result<Item> {
    crate::json::from_slice(bytes)
}

fn as_m(value: &AttributeValue) -> Result<&Item> {
    match value {
        AttributeValue::M(m) => Ok(m),
        other => Err(other.mismatch("an M")),
    }
}

fn as_s(value: &AttributeValue) -> Result<&str> {
    match value {
        AttributeValue::S(s) => Ok(s),
        other => Err(other.mismatch("an S")),
    }
}

fn as_n(value: &AttributeValue) -> Result<&str> {
    match value {
        AttributeValue::N(n) => Ok(n),
        other => Err(CodecError::malformed_number(format!(
            "expected an N attribute, found {}",
            other.type_name()
        ))),
    }
}

/// Decode a named attribute, prefixing errors with its name.
fn attribute<T: FromAttribute>(fields: &Item, name: &str) -> Result<T> {
    match fields.get(name) {
        Some(value) => T::from_attribute(value).map_err(|e| e.at(name)),
        None => T::absent().ok_or_else(|| CodecError::missing_field(name)),
    }
}

/// Implements the attribute traits for a record, one `field: "attribute"` pair per member.
macro_rules! attr_record {
    ($ty:ty { $($field:ident: $name:literal),* $(,)? }) => {
        impl AttributeRecord for $ty {
            fn to_fields(&self) -> Item {
                let mut fields = Item::new();
                $(
                    if !self.$field.is_absent() {
                        fields.insert($name.to_string(), self.$field.to_attribute());
                    }
                )*
                fields
            }

            fn from_fields(fields: &Item) -> Result<Self> {
                Ok(Self {
                    $($field: attribute(fields, $name)?,)*
                })
            }
        }

        impl ToAttribute for $ty {
            fn to_attribute(&self) -> AttributeValue {
                AttributeValue::M(self.to_fields())
            }
        }

        impl FromAttribute for $ty {
            fn from_attribute(value: &AttributeValue) -> Result<Self> {
                Self::from_fields(as_m(value)?)
            }
        }
    };
}

// Primitives and containers

impl ToAttribute for String {
    fn to_attribute(&self) -> AttributeValue {
        AttributeValue::S(self.clone())
    }
}

impl FromAttribute for String {
    fn from_attribute(value: &AttributeValue) -> Result<Self> {
        as_s(value).map(str::to_string)
    }
}

macro_rules! attr_native_uint {
    ($($t:ty),*) => {
        $(
            impl ToAttribute for $t {
                fn to_attribute(&self) -> AttributeValue {
                    AttributeValue::N(self.to_string())
                }
            }

            impl FromAttribute for $t {
                fn from_attribute(value: &AttributeValue) -> Result<Self> {
                    let n = Int::from_decimal(as_n(value)?)?;
                    <$t>::try_from(n.as_bigint()).map_err(|_| {
                        CodecError::range(format!("{n} does not fit in {}", stringify!($t)))
                    })
                }
            }
        )*
    };
}

attr_native_uint!(u32, u64);

impl ToAttribute for Int {
    fn to_attribute(&self) -> AttributeValue {
        AttributeValue::N(self.to_string())
    }
}

impl FromAttribute for Int {
    fn from_attribute(value: &AttributeValue) -> Result<Self> {
        Int::from_decimal(as_n(value)?)
    }
}

impl ToAttribute for Uint {
    fn to_attribute(&self) -> AttributeValue {
        AttributeValue::N(self.to_string())
    }
}

impl FromAttribute for Uint {
    fn from_attribute(value: &AttributeValue) -> Result<Self> {
        Uint::from_decimal(as_n(value)?)
    }
}

impl<T: ToAttribute> ToAttribute for Option<T> {
    fn to_attribute(&self) -> AttributeValue {
        self.as_ref()
            .map_or(AttributeValue::Null(true), T::to_attribute)
    }

    fn is_absent(&self) -> bool {
        self.is_none()
    }
}

impl<T: FromAttribute> FromAttribute for Option<T> {
    fn from_attribute(value: &AttributeValue) -> Result<Self> {
        match value {
            AttributeValue::Null(_) => Ok(None),
            v => T::from_attribute(v).map(Some),
        }
    }

    fn absent() -> Option<Self> {
        Some(None)
    }
}

impl<T: ToAttribute> ToAttribute for Vec<T> {
    fn to_attribute(&self) -> AttributeValue {
        AttributeValue::L(self.iter().map(T::to_attribute).collect())
    }
}

impl<T: FromAttribute> FromAttribute for Vec<T> {
    fn from_attribute(value: &AttributeValue) -> Result<Self> {
        match value {
            AttributeValue::L(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| T::from_attribute(item).map_err(|e| e.at_index(i)))
                .collect(),
            AttributeValue::Null(_) => Ok(Vec::new()),
            other => Err(other.mismatch("an L")),
        }
    }

    fn absent() -> Option<Self> {
        Some(Vec::new())
    }
}

/// Types usable as attribute map keys.
pub trait AttributeKey: Ord + Sized {
    fn as_key(&self) -> &str;
    fn from_key(key: &str) -> Self;
}

impl AttributeKey for String {
    fn as_key(&self) -> &str {
        self
    }

    fn from_key(key: &str) -> Self {
        key.to_string()
    }
}

impl AttributeKey for AssetId {
    fn as_key(&self) -> &str {
        self.as_str()
    }

    fn from_key(key: &str) -> Self {
        AssetId::from(key)
    }
}

impl<K: AttributeKey, V: ToAttribute> ToAttribute for BTreeMap<K, V> {
    fn to_attribute(&self) -> AttributeValue {
        AttributeValue::M(
            self.iter()
                .map(|(k, v)| (k.as_key().to_string(), v.to_attribute()))
                .collect(),
        )
    }
}

impl<K: AttributeKey, V: FromAttribute> FromAttribute for BTreeMap<K, V> {
    fn from_attribute(value: &AttributeValue) -> Result<Self> {
        if let AttributeValue::Null(_) = value {
            return Ok(BTreeMap::new());
        }
        as_m(value)?
            .iter()
            .map(|(k, v)| {
                let value = V::from_attribute(v).map_err(|e| e.at(k))?;
                Ok((K::from_key(k), value))
            })
            .collect()
    }

    fn absent() -> Option<Self> {
        Some(BTreeMap::new())
    }
}

impl ToAttribute for JsonValue {
    fn to_attribute(&self) -> AttributeValue {
        match self {
            JsonValue::Null => AttributeValue::Null(true),
            JsonValue::Bool(b) => AttributeValue::Bool(*b),
            JsonValue::Number(n) => AttributeValue::N(n.to_string()),
            JsonValue::String(s) => AttributeValue::S(s.clone()),
            JsonValue::Array(items) => {
                AttributeValue::L(items.iter().map(JsonValue::to_attribute).collect())
            }
            JsonValue::Object(map) => AttributeValue::M(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_attribute()))
                    .collect(),
            ),
        }
    }
}

impl FromAttribute for JsonValue {
    fn from_attribute(value: &AttributeValue) -> Result<Self> {
        Ok(match value {
            AttributeValue::Null(_) => JsonValue::Null,
            AttributeValue::Bool(b) => JsonValue::Bool(*b),
            AttributeValue::N(n) => JsonValue::Number(
                n.parse()
                    .map_err(|e| CodecError::malformed_number(format!("{n:?}: {e}")))?,
            ),
            AttributeValue::S(s) => JsonValue::String(s.clone()),
            AttributeValue::L(items) => JsonValue::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| JsonValue::from_attribute(item).map_err(|e| e.at_index(i)))
                    .collect::<Result<_>>()?,
            ),
            AttributeValue::M(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| {
                        let value = JsonValue::from_attribute(v).map_err(|e| e.at(k))?;
                        Ok((k.clone(), value))
                    })
                    .collect::<Result<_>>()?,
            ),
            AttributeValue::B(_) => return Err(value.mismatch("a JSON-compatible")),
        })
    }
}

// Domain primitives

impl ToAttribute for Point {
    fn to_attribute(&self) -> AttributeValue {
        match self {
            Point::Origin(s) => AttributeValue::S(s.clone()),
            Point::Block(b) => b.to_attribute(),
        }
    }
}

impl FromAttribute for Point {
    fn from_attribute(value: &AttributeValue) -> Result<Self> {
        match value {
            AttributeValue::S(s) => Ok(Point::Origin(s.clone())),
            AttributeValue::M(fields) => {
                let slot = fields.get("slot");
                let hash = fields.get("hash");
                if slot.is_none() || hash.is_none() {
                    return Err(CodecError::malformed_point(
                        "a block point needs both `slot` and `hash`",
                    ));
                }
                BlockPosition::from_fields(fields).map(Point::Block)
            }
            other => Err(CodecError::malformed_point(format!(
                "expected an S or M attribute, found {}",
                other.type_name()
            ))),
        }
    }
}

impl AttributeRecord for BlockPosition {
    fn to_fields(&self) -> Item {
        Item::from([
            ("slot".to_string(), self.slot.to_attribute()),
            ("hash".to_string(), self.hash.to_attribute()),
            ("blockNo".to_string(), self.block_no.to_attribute()),
        ])
    }

    fn from_fields(fields: &Item) -> Result<Self> {
        Ok(BlockPosition {
            slot: attribute(fields, "slot")?,
            hash: attribute(fields, "hash")?,
            block_no: attribute::<Option<u64>>(fields, "blockNo")?.unwrap_or_default(),
        })
    }
}

impl ToAttribute for BlockPosition {
    fn to_attribute(&self) -> AttributeValue {
        AttributeValue::M(self.to_fields())
    }
}

impl FromAttribute for BlockPosition {
    fn from_attribute(value: &AttributeValue) -> Result<Self> {
        Self::from_fields(as_m(value)?)
    }
}

attr_record!(Value { coins: "coins", assets: "assets" });

impl ToAttribute for TxId {
    fn to_attribute(&self) -> AttributeValue {
        AttributeValue::S(self.as_str().to_string())
    }
}

impl FromAttribute for TxId {
    fn from_attribute(value: &AttributeValue) -> Result<Self> {
        TxId::parse(as_s(value)?)
    }
}

impl ToAttribute for RawBytes {
    fn to_attribute(&self) -> AttributeValue {
        AttributeValue::B(self.0.clone())
    }
}

impl FromAttribute for RawBytes {
    fn from_attribute(value: &AttributeValue) -> Result<Self> {
        match value {
            AttributeValue::B(b) => Ok(RawBytes(b.clone())),
            other => Err(other.mismatch("a B")),
        }
    }
}

// Envelopes

attr_record!(Response {
    kind: "type",
    version: "version",
    servicename: "servicename",
    methodname: "methodname",
    result: "result",
    fault: "fault",
    reflection: "reflection",
});

attr_record!(Fault { code: "code", string: "string" });

attr_record!(ChainSyncResult {
    intersection_found: "IntersectionFound",
    intersection_not_found: "IntersectionNotFound",
    roll_forward: "RollForward",
    roll_backward: "RollBackward",
});

attr_record!(IntersectionFound { point: "point", tip: "tip" });
attr_record!(IntersectionNotFound { tip: "tip" });
attr_record!(RollForward { block: "block", tip: "tip" });
attr_record!(RollBackward { point: "point", tip: "tip" });

attr_record!(Block {
    byron: "byron",
    shelley: "shelley",
    allegra: "allegra",
    mary: "mary",
    alonzo: "alonzo",
    babbage: "babbage",
});

attr_record!(EraBlock { body: "body", header: "header", header_hash: "headerHash" });

attr_record!(BlockHeader {
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

attr_record!(VrfCert { output: "output", proof: "proof" });

attr_record!(OpCert {
    hot_vk: "hotVk",
    count: "count",
    kes_period: "kesPeriod",
    sigma: "sigma",
});

attr_record!(ProtocolVersion {
    major: "major",
    minor: "minor",
    patch: "patch",
    software: "software",
});

attr_record!(ByronBlock { hash: "hash", header: "header", body: "body" });

attr_record!(ByronHeader {
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

attr_record!(ByronBody {
    tx_payload: "txPayload",
    dlg_payload: "dlgPayload",
    update_payload: "updatePayload",
});

attr_record!(ByronTx { id: "id", body: "body", witness: "witness" });
attr_record!(ByronTxBody { inputs: "inputs", outputs: "outputs" });

attr_record!(Tx {
    id: "id",
    input_source: "inputSource",
    body: "body",
    witness: "witness",
    metadata: "metadata",
    raw: "raw",
});

attr_record!(TxBody {
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

attr_record!(TxIn { tx_id: "txId", index: "index" });

attr_record!(TxOut {
    address: "address",
    value: "value",
    datum_hash: "datumHash",
    datum: "datum",
    script: "script",
});

attr_record!(ValidityInterval {
    invalid_before: "invalidBefore",
    invalid_hereafter: "invalidHereafter",
});

attr_record!(Script {
    native: "native",
    plutus_v1: "plutus:v1",
    plutus_v2: "plutus:v2",
});

attr_record!(Redeemer { redeemer: "redeemer", execution_units: "executionUnits" });
attr_record!(ExecutionUnits { memory: "memory", steps: "steps" });

attr_record!(BootstrapWitness {
    signature: "signature",
    key: "key",
    chain_code: "chainCode",
    address_attributes: "addressAttributes",
});

// Datums are persisted as hex strings. Older items may hold base64 strings
// or binary attributes; both decode to hex.

fn datums_from_attribute(value: &AttributeValue) -> Result<BTreeMap<String, String>> {
    if let AttributeValue::Null(_) = value {
        return Ok(BTreeMap::new());
    }
    as_m(value)?
        .iter()
        .map(|(hash, datum)| {
            let datum = match datum {
                AttributeValue::S(s) => normalize_datum(s).map_err(|e| e.at(hash))?,
                AttributeValue::B(b) => hex::encode(b),
                other => return Err(other.mismatch("an S").at(hash)),
            };
            Ok((hash.clone(), datum))
        })
        .collect()
}

impl AttributeRecord for Witness {
    fn to_fields(&self) -> Item {
        Item::from([
            ("signatures".to_string(), self.signatures.to_attribute()),
            ("scripts".to_string(), self.scripts.to_attribute()),
            ("datums".to_string(), self.datums.to_attribute()),
            ("redeemers".to_string(), self.redeemers.to_attribute()),
            ("bootstrap".to_string(), self.bootstrap.to_attribute()),
        ])
    }

    fn from_fields(fields: &Item) -> Result<Self> {
        let datums = match fields.get("datums") {
            Some(v) => datums_from_attribute(v).map_err(|e| e.at("datums"))?,
            None => BTreeMap::new(),
        };
        Ok(Witness {
            signatures: attribute(fields, "signatures")?,
            scripts: attribute(fields, "scripts")?,
            datums,
            redeemers: attribute(fields, "redeemers")?,
            bootstrap: attribute(fields, "bootstrap")?,
        })
    }
}

impl ToAttribute for Witness {
    fn to_attribute(&self) -> AttributeValue {
        AttributeValue::M(self.to_fields())
    }
}

impl FromAttribute for Witness {
    fn from_attribute(value: &AttributeValue) -> Result<Self> {
        Self::from_fields(as_m(value)?)
    }

    fn absent() -> Option<Self> {
        Some(Witness::default())
    }
}
