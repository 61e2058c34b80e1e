//! Chain-sync response envelopes.
//!
//! These are plain aggregates of points, values, and opaque strings. Every
//! struct rejects unknown JSON fields so that upstream schema drift surfaces
//! as a decode error instead of silently dropped data. Sub-trees this layer
//! never interprets (native scripts, certificates, metadata, protocol
//! updates, Byron proofs) are carried as opaque JSON values.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::num::Uint;
use crate::point::{BlockPosition, Point};
use crate::txid::TxId;
use crate::value::Value;

/// Opaque binary blob (raw transaction or block bytes).
///
/// Base64 in JSON, a byte string in CBOR, a `B` attribute when persisted.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct RawBytes(pub Bytes);

impl RawBytes {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RawBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawBytes({} bytes)", self.0.len())
    }
}

impl From<Vec<u8>> for RawBytes {
    fn from(v: Vec<u8>) -> Self {
        Self(Bytes::from(v))
    }
}

impl From<&[u8]> for RawBytes {
    fn from(v: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(v))
    }
}

/// A JSON-WSP response from the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Response {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    pub servicename: String,
    pub methodname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ChainSyncResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<Fault>,
    #[serde(default)]
    pub reflection: Option<JsonValue>,
}

/// A JSON-WSP fault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fault {
    pub code: String,
    pub string: String,
}

/// Result of a `FindIntersect` or `RequestNext` call. Exactly one field is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainSyncResult {
    #[serde(rename = "IntersectionFound", default, skip_serializing_if = "Option::is_none")]
    pub intersection_found: Option<IntersectionFound>,
    #[serde(rename = "IntersectionNotFound", default, skip_serializing_if = "Option::is_none")]
    pub intersection_not_found: Option<IntersectionNotFound>,
    #[serde(rename = "RollForward", default, skip_serializing_if = "Option::is_none")]
    pub roll_forward: Option<RollForward>,
    #[serde(rename = "RollBackward", default, skip_serializing_if = "Option::is_none")]
    pub roll_backward: Option<RollBackward>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntersectionFound {
    pub point: Point,
    pub tip: BlockPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntersectionNotFound {
    pub tip: BlockPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RollForward {
    pub block: Block,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<BlockPosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RollBackward {
    pub point: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<BlockPosition>,
}

/// Ledger era of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Era {
    Byron,
    Shelley,
    Allegra,
    Mary,
    Alonzo,
    Babbage,
}

/// A block, keyed by era. Exactly one field is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Block {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byron: Option<ByronBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shelley: Option<EraBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allegra: Option<EraBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mary: Option<EraBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alonzo: Option<EraBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub babbage: Option<EraBlock>,
}

impl Block {
    pub fn era(&self) -> Option<Era> {
        if self.byron.is_some() {
            Some(Era::Byron)
        } else {
            self.post_byron().map(|(era, _)| era)
        }
    }

    fn post_byron(&self) -> Option<(Era, &EraBlock)> {
        [
            (Era::Shelley, &self.shelley),
            (Era::Allegra, &self.allegra),
            (Era::Mary, &self.mary),
            (Era::Alonzo, &self.alonzo),
            (Era::Babbage, &self.babbage),
        ]
        .into_iter()
        .find_map(|(era, block)| block.as_ref().map(|b| (era, b)))
    }

    /// Transactions of a Shelley-or-later block; empty for Byron.
    pub fn transactions(&self) -> &[Tx] {
        self.post_byron().map_or(&[], |(_, b)| b.body.as_slice())
    }

    /// The chain point this block occupies, when its header carries a slot.
    pub fn point(&self) -> Option<Point> {
        if let Some(byron) = &self.byron {
            let slot = byron.header.slot?;
            let block_no = byron.header.block_height.unwrap_or_default();
            return Some(Point::block(slot, byron.hash.clone(), block_no));
        }
        let (_, block) = self.post_byron()?;
        let slot = block.header.slot?;
        let block_no = block.header.block_height.unwrap_or_default();
        Some(Point::block(slot, block.header_hash.clone(), block_no))
    }
}

/// A Shelley-or-later block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct EraBlock {
    #[serde(default)]
    pub body: Vec<Tx>,
    pub header: BlockHeader,
    pub header_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct BlockHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_vk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_vrf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<VrfCert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_value: Option<VrfCert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vrf_input: Option<VrfCert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op_cert: Option<OpCert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<ProtocolVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VrfCert {
    pub output: String,
    pub proof: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct OpCert {
    pub hot_vk: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kes_period: Option<u64>,
    pub sigma: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProtocolVersion {
    pub major: u32,
    pub minor: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software: Option<JsonValue>,
}

/// A Byron block (standard or epoch-boundary).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ByronBlock {
    pub hash: String,
    pub header: ByronHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<ByronBody>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ByronHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genesis_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_magic_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<ProtocolVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_version: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<JsonValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ByronBody {
    #[serde(default)]
    pub tx_payload: Vec<ByronTx>,
    #[serde(default)]
    pub dlg_payload: Vec<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_payload: Option<JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ByronTx {
    pub id: String,
    pub body: ByronTxBody,
    #[serde(default)]
    pub witness: Vec<JsonValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ByronTxBody {
    #[serde(default)]
    pub inputs: Vec<TxIn>,
    #[serde(default)]
    pub outputs: Vec<TxOut>,
}

/// A Shelley-or-later transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Tx {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_source: Option<String>,
    pub body: TxBody,
    #[serde(default)]
    pub witness: Witness,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawBytes>,
}

impl Tx {
    /// Identifiers of the outputs this transaction creates.
    pub fn output_ids(&self) -> impl Iterator<Item = TxId> + '_ {
        (0..self.body.outputs.len()).map(move |i| TxId::new(&self.id, i as u64))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct TxBody {
    #[serde(default)]
    pub inputs: Vec<TxIn>,
    #[serde(default)]
    pub collaterals: Vec<TxIn>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<TxIn>,
    #[serde(default)]
    pub outputs: Vec<TxOut>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collateral_return: Option<TxOut>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_collateral: Option<Uint>,
    #[serde(default)]
    pub certificates: Vec<JsonValue>,
    #[serde(default)]
    pub withdrawals: BTreeMap<String, Uint>,
    pub fee: Uint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_interval: Option<ValidityInterval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_live: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mint: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_integrity_hash: Option<String>,
    #[serde(default)]
    pub required_extra_signatures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct TxIn {
    pub tx_id: String,
    pub index: u32,
}

impl TxIn {
    /// The `"<txId>#<index>"` form of this input.
    pub fn to_tx_id(&self) -> TxId {
        TxId::new(&self.tx_id, u64::from(self.index))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct TxOut {
    pub address: String,
    pub value: Value,
    #[serde(default)]
    pub datum_hash: Option<String>,
    #[serde(default)]
    pub datum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<Script>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ValidityInterval {
    #[serde(default)]
    pub invalid_before: Option<u64>,
    #[serde(default)]
    pub invalid_hereafter: Option<u64>,
}

/// Transaction witnesses.
///
/// `datums` maps a datum hash to the datum encoded as hex. The node may send
/// datums as hex or as base64; both are normalized to hex when decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Witness {
    #[serde(default)]
    pub signatures: BTreeMap<String, String>,
    #[serde(default)]
    pub scripts: BTreeMap<String, Script>,
    #[serde(default, deserialize_with = "crate::json::deserialize_datums")]
    pub datums: BTreeMap<String, String>,
    #[serde(default)]
    pub redeemers: BTreeMap<String, Redeemer>,
    #[serde(default)]
    pub bootstrap: Vec<BootstrapWitness>,
}

/// A script, keyed by language. Exactly one field is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<JsonValue>,
    #[serde(rename = "plutus:v1", default, skip_serializing_if = "Option::is_none")]
    pub plutus_v1: Option<String>,
    #[serde(rename = "plutus:v2", default, skip_serializing_if = "Option::is_none")]
    pub plutus_v2: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Redeemer {
    pub redeemer: String,
    pub execution_units: ExecutionUnits,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutionUnits {
    pub memory: u64,
    pub steps: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct BootstrapWitness {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_attributes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn era_block(slot: Option<u64>) -> EraBlock {
        EraBlock {
            body: Vec::new(),
            header: BlockHeader {
                slot,
                block_height: Some(42),
                ..BlockHeader::default()
            },
            header_hash: "beef".into(),
        }
    }

    #[test]
    fn test_block_era_and_point() {
        let block = Block {
            babbage: Some(era_block(Some(1000))),
            ..Block::default()
        };
        assert_eq!(block.era(), Some(Era::Babbage));
        assert_eq!(block.point(), Some(Point::block(1000, "beef", 42)));
        assert!(block.transactions().is_empty());
    }

    #[test]
    fn test_block_without_slot_has_no_point() {
        let block = Block {
            alonzo: Some(era_block(None)),
            ..Block::default()
        };
        assert_eq!(block.point(), None);
        assert_eq!(Block::default().era(), None);
    }

    #[test]
    fn test_txin_to_tx_id() {
        let input = TxIn {
            tx_id: "abc".into(),
            index: 7,
        };
        assert_eq!(input.to_tx_id().as_str(), "abc#7");
    }

    #[test]
    fn test_output_ids() {
        let tx = Tx {
            id: "ff".into(),
            input_source: None,
            body: TxBody {
                outputs: vec![
                    TxOut {
                        address: "addr1".into(),
                        value: Value::from_coins(1u64),
                        datum_hash: None,
                        datum: None,
                        script: None,
                    };
                    2
                ],
                ..TxBody::default()
            },
            witness: Witness::default(),
            metadata: None,
            raw: None,
        };
        let ids: Vec<_> = tx.output_ids().map(TxId::into_string).collect();
        assert_eq!(ids, vec!["ff#0", "ff#1"]);
    }
}
