use crate::candidate::Candidate;
use crate::network::EdgeIndex;

use super::table::Ubodt;

/// Stitches the optimal candidate sequence into a spatially contiguous
/// edge path.
///
/// `opath` is the Viterbi-optimal candidate for every observation, in
/// trajectory order. Returns the complete edge path and, for each
/// observation, the index into that path of the edge it matched to. If
/// a gap between two consecutive candidates cannot be bridged by the
/// table (no record for the hand-off pair, and the edges are not
/// directly connected), both outputs come back empty -- the whole
/// trajectory's path is considered unreconstructable.
pub fn construct_complete_path(
    ubodt: &Ubodt,
    opath: &[&Candidate],
    reverse_tolerance: f64,
) -> (Vec<EdgeIndex>, Vec<usize>) {
    if opath.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let mut cpath = vec![opath[0].edge.index];
    let mut indices = vec![0usize];

    for pair in opath.windows(2) {
        let a = pair[0];
        let b = pair[1];

        let same_edge_forward = a.edge.index == b.edge.index && a.offset <= b.offset;
        let same_edge_near_reverse = a.edge.index == b.edge.index
            && a.offset > b.offset
            && (a.offset - b.offset) <= a.edge.length * reverse_tolerance;

        if same_edge_forward || same_edge_near_reverse {
            indices.push(cpath.len() - 1);
            continue;
        }

        if a.edge.target == b.edge.source {
            cpath.push(b.edge.index);
            indices.push(cpath.len() - 1);
            continue;
        }

        let segs = ubodt.reconstruct_edge_sequence(a.edge.target, b.edge.source);
        if segs.is_empty() {
            return (Vec::new(), Vec::new());
        }
        cpath.extend(segs);
        cpath.push(b.edge.index);
        indices.push(cpath.len() - 1);
    }

    (cpath, indices)
}
