use serde::{Deserialize, Serialize};

use crate::geo::{LineString, Point};
use crate::network::EdgeId;

/// One observation's resolved candidate: the edge it matched to and the
/// per-observation diagnostics callers may want to report.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchedCandidate {
    pub edge_id: EdgeId,
    pub offset: f64,
    pub error: f64,
    pub ep: f64,
    pub tp: f64,
    pub sp_dist: f64,
    pub projected_point: Point,
}

/// The outcome of matching one trajectory.
///
/// `opath[i]` is the edge matched to observation `i`; `cpath` is the
/// spatially contiguous traversal (length >= `opath.len()` whenever
/// non-empty); `cpath_indices[i]` is the position in `cpath` where
/// `opath[i]` appears. A trajectory whose path could not be bridged
/// (see the failure model) carries a non-empty `opath` but empty
/// `cpath`, `cpath_indices`, and `mgeom`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchResult {
    pub trajectory_id: i64,
    pub matched_candidates: Vec<MatchedCandidate>,
    pub opath: Vec<EdgeId>,
    pub cpath: Vec<EdgeId>,
    pub cpath_indices: Vec<usize>,
    pub mgeom: LineString,
}

impl MatchResult {
    /// An empty result for a trajectory rejected outright (no candidate
    /// for some observation, or disconnected from the first layer).
    pub fn empty(trajectory_id: i64) -> Self {
        Self {
            trajectory_id,
            matched_candidates: Vec::new(),
            opath: Vec::new(),
            cpath: Vec::new(),
            cpath_indices: Vec::new(),
            mgeom: LineString::new(vec![]),
        }
    }
}
