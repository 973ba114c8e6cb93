use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Dense, zero-based index into the network's vertex vector. Distinct from
/// [`NodeId`], the opaque external identifier supplied by the caller.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
pub struct NodeIndex(pub u32);

/// Dense, zero-based index into the network's edge vector.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
pub struct EdgeIndex(pub u32);

/// Opaque external node identifier. May be non-contiguous; sign carries no
/// meaning.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct NodeId(pub i64);

/// Opaque external edge identifier. May be negative or non-contiguous.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct EdgeId(pub i64);

impl NodeIndex {
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl EdgeIndex {
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl Display for NodeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for EdgeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
