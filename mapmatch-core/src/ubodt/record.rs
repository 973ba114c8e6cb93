use crate::network::{EdgeIndex, NodeIndex};

/// One precomputed shortest-path first-hop, valid for `cost <= delta` of
/// the table that produced it.
///
/// `first_n` is the node after `source` on the shortest path to
/// `target`; `prev_n` is the node before `target`; `next_e` is the edge
/// realizing `(source, first_n)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Record {
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub first_n: NodeIndex,
    pub prev_n: NodeIndex,
    pub next_e: EdgeIndex,
    pub cost: f64,
}
