use serde::{Deserialize, Serialize};

use crate::geo::LineString;

use super::ids::{EdgeId, NodeIndex};

/// A single directed edge in the road network. `index` is a dense,
/// zero-based position in the network's edge vector; `id` is the opaque
/// external identifier the caller's data uses. Edges are immutable after
/// network construction.
///
/// Invariant: `geom.length() == length`; the first point of `geom`
/// projects to `source`, the last to `target`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Edge {
    pub index: EdgeIndex,
    pub id: EdgeId,
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub length: f64,
    pub geom: LineString,
}
