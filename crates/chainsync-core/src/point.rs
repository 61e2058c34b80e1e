//! Chain points and intersection ranking.
//!
//! A [`Point`] is either the origin sentinel or a concrete block position.
//! The wire formats never carry an explicit discriminator: a bare string is
//! the origin, a structured value is a block position.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Canonical spelling of the origin sentinel.
pub const ORIGIN: &str = "origin";

/// A concrete position on the chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct BlockPosition {
    pub slot: u64,
    pub hash: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub block_no: u64,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl BlockPosition {
    pub fn new(slot: u64, hash: impl Into<String>, block_no: u64) -> Self {
        Self {
            slot,
            hash: hash.into(),
            block_no,
        }
    }

    /// Wrap as a [`Point`].
    pub fn point(self) -> Point {
        Point::Block(self)
    }
}

/// Which variant a [`Point`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointKind {
    Origin,
    Block,
}

/// A chain-sync point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Point {
    /// The origin sentinel. Holds whatever string was decoded (normally `"origin"`).
    Origin(String),
    /// A concrete `(slot, hash, blockNo)` position.
    Block(BlockPosition),
}

impl Point {
    /// The canonical origin point.
    pub fn origin() -> Self {
        Point::Origin(ORIGIN.to_string())
    }

    pub fn block(slot: u64, hash: impl Into<String>, block_no: u64) -> Self {
        Point::Block(BlockPosition::new(slot, hash, block_no))
    }

    pub fn kind(&self) -> PointKind {
        match self {
            Point::Origin(_) => PointKind::Origin,
            Point::Block(_) => PointKind::Block,
        }
    }

    pub fn as_origin(&self) -> Option<&str> {
        match self {
            Point::Origin(s) => Some(s),
            Point::Block(_) => None,
        }
    }

    pub fn as_block(&self) -> Option<&BlockPosition> {
        match self {
            Point::Origin(_) => None,
            Point::Block(b) => Some(b),
        }
    }

    /// Slot of a block position; `None` for the origin.
    pub fn slot(&self) -> Option<u64> {
        self.as_block().map(|b| b.slot)
    }

    /// Rank two points by recency.
    ///
    /// `Less` means `self` is the better resynchronization candidate: a block
    /// position with a greater slot ranks first, and any block position ranks
    /// before the origin. Two origins, or two block positions at the same
    /// slot, are `Equal`; their relative order after sorting is unspecified.
    pub fn recency_cmp(&self, other: &Point) -> Ordering {
        match (self, other) {
            (Point::Block(a), Point::Block(b)) => b.slot.cmp(&a.slot),
            (Point::Block(_), Point::Origin(_)) => Ordering::Less,
            (Point::Origin(_), Point::Block(_)) => Ordering::Greater,
            (Point::Origin(_), Point::Origin(_)) => Ordering::Equal,
        }
    }
}

impl From<BlockPosition> for Point {
    fn from(b: BlockPosition) -> Self {
        Point::Block(b)
    }
}

/// A working set of candidate points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Points(Vec<Point>);

impl Points {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, point: Point) {
        self.0.push(point);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Point> {
        self.0
    }

    /// Sort best-first by [`Point::recency_cmp`]. Not stable.
    pub fn sort(&mut self) {
        self.0.sort_unstable_by(Point::recency_cmp);
    }

    /// The best resynchronization candidate, without reordering.
    pub fn best(&self) -> Option<&Point> {
        self.0
            .iter()
            .reduce(|best, p| match p.recency_cmp(best) {
                Ordering::Less => p,
                _ => best,
            })
    }

    /// Keep only the first `n` points.
    pub fn truncate(&mut self, n: usize) {
        self.0.truncate(n);
    }
}

impl From<Vec<Point>> for Points {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

impl FromIterator<Point> for Points {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Points {
    type Item = Point;
    type IntoIter = std::vec::IntoIter<Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Points {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
