//! Multi-asset values.
//!
//! A [`Value`] is an amount of the base currency plus a quantity for each
//! native asset. An asset that is absent and an asset explicitly mapped to
//! zero are the same amount, so equality is defined over the union of both
//! key sets rather than on the maps' shapes.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::num::{Int, Uint};

/// Identifier of a native asset: `"<policy>.<asset name>"`, or just
/// `"<policy>"` when the asset name is empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build from a policy id and a (hex) asset name.
    pub fn from_parts(policy_id: &str, asset_name: &str) -> Self {
        if asset_name.is_empty() {
            Self(policy_id.to_string())
        } else {
            Self(format!("{policy_id}.{asset_name}"))
        }
    }

    pub fn policy_id(&self) -> &str {
        self.0.split_once('.').map_or(&self.0, |(policy, _)| policy)
    }

    pub fn asset_name(&self) -> &str {
        self.0.split_once('.').map_or("", |(_, name)| name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AssetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Coins plus native-asset quantities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Value {
    pub coins: Uint,
    #[serde(default)]
    pub assets: BTreeMap<AssetId, Int>,
}

impl Value {
    pub fn new(coins: impl Into<Uint>, assets: BTreeMap<AssetId, Int>) -> Self {
        Self {
            coins: coins.into(),
            assets,
        }
    }

    /// A value holding only the base currency.
    pub fn from_coins(coins: impl Into<Uint>) -> Self {
        Self {
            coins: coins.into(),
            assets: BTreeMap::new(),
        }
    }

    /// Builder-style asset insertion.
    pub fn with_asset(mut self, asset: impl Into<AssetId>, quantity: impl Into<Int>) -> Self {
        self.assets.insert(asset.into(), quantity.into());
        self
    }

    /// Quantity held of `asset`; zero when absent.
    pub fn quantity_of(&self, asset: &AssetId) -> Int {
        self.assets.get(asset).cloned().unwrap_or_default()
    }

    /// True when both coins and every asset quantity are zero.
    pub fn is_zero(&self) -> bool {
        self.coins.is_zero() && self.assets.values().all(Int::is_zero)
    }

    /// The same value with zero-quantity entries removed.
    pub fn normalized(&self) -> Value {
        Value {
            coins: self.coins.clone(),
            assets: self
                .assets
                .iter()
                .filter(|(_, q)| !q.is_zero())
                .map(|(k, q)| (k.clone(), q.clone()))
                .collect(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.coins != other.coins {
            return false;
        }
        let zero = Int::zero();
        self.assets
            .keys()
            .chain(other.assets.keys())
            .all(|k| self.assets.get(k).unwrap_or(&zero) == other.assets.get(k).unwrap_or(&zero))
    }
}

impl Eq for Value {}

impl Add for &Value {
    type Output = Value;

    fn add(self, rhs: &Value) -> Value {
        let mut assets = self.assets.clone();
        for (id, quantity) in &rhs.assets {
            let sum = assets.get(id).map_or_else(|| quantity.clone(), |q| q + quantity);
            assets.insert(id.clone(), sum);
        }
        Value {
            coins: &self.coins + &rhs.coins,
            assets,
        }
    }
}
