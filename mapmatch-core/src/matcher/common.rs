use crate::candidate::Candidate;
use crate::geo::LineString;
use crate::network::{EdgeIndex, Network};
use crate::result::{MatchResult, MatchedCandidate};
use crate::transition::{ForwardOutcome, TransitionGraph};

/// One observation's resolved candidate together with the HMM
/// diagnostics attached to it: the node actually backtracked through the
/// lattice when the trajectory stayed connected that far, or -- past the
/// point a [`ForwardOutcome::Disconnected`] stopped the forward pass --
/// the locally best-emission candidate, since no transition information
/// reaches it.
pub struct ResolvedCandidate<'c> {
    pub candidate: &'c Candidate<'c>,
    pub ep: f64,
    pub tp: f64,
    pub sp_dist: f64,
}

/// Resolves one candidate per observation from a transition graph that
/// has already run its forward pass.
///
/// Layers `0..=last_connected` come from backtracking the highest
/// `cumu_log_prob` node in the last layer the forward pass actually
/// reached; any layers after that (when `outcome` is
/// `Disconnected`) never received a finite transition update, so each is
/// resolved independently by its own highest emission probability. This
/// is what keeps `opath` fully populated even for a trajectory whose
/// `cpath` reconstruction will fail later -- see the failure model.
pub fn resolve_opath<'c>(
    tg: &TransitionGraph,
    candidates: &'c [Vec<Candidate<'c>>],
    outcome: ForwardOutcome,
) -> Vec<ResolvedCandidate<'c>> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let last_connected = match outcome {
        ForwardOutcome::Complete => candidates.len() - 1,
        ForwardOutcome::Disconnected { reached_layer } => reached_layer - 1,
    };

    let mut resolved: Vec<ResolvedCandidate<'c>> = Vec::with_capacity(candidates.len());

    if let Some(path) = tg.backtrack(last_connected) {
        for (layer_idx, node_idx) in path {
            let node = &tg.layers[layer_idx].nodes[node_idx];
            resolved.push(ResolvedCandidate {
                candidate: &candidates[layer_idx][node.candidate_index],
                ep: node.ep,
                tp: node.tp,
                sp_dist: node.sp_dist,
            });
        }
    }

    for layer_idx in resolved.len()..candidates.len() {
        let layer_nodes = &tg.layers[layer_idx].nodes;
        let best = layer_nodes
            .iter()
            .max_by(|a, b| a.ep.total_cmp(&b.ep))
            .expect("every layer has at least one candidate (checked by caller)");
        resolved.push(ResolvedCandidate {
            candidate: &candidates[layer_idx][best.candidate_index],
            ep: best.ep,
            tp: best.tp,
            sp_dist: best.sp_dist,
        });
    }

    resolved
}

/// Assembles the final [`MatchResult`] from a resolved per-observation
/// candidate path and an already-reconstructed contiguous edge sequence.
///
/// `cpath`/`cpath_indices` come back empty from the caller when the gap
/// between consecutive candidates could not be bridged (see the failure
/// model); `mgeom` is left empty in that case too, while `opath` stays
/// fully populated from `resolved`.
pub fn build_match_result(
    trajectory_id: i64,
    network: &Network,
    resolved: &[ResolvedCandidate<'_>],
    cpath: Vec<EdgeIndex>,
    cpath_indices: Vec<usize>,
) -> MatchResult {
    let opath = resolved.iter().map(|r| r.candidate.edge.id).collect();

    let matched_candidates = resolved
        .iter()
        .map(|r| MatchedCandidate {
            edge_id: r.candidate.edge.id,
            offset: r.candidate.offset,
            error: r.candidate.error,
            ep: r.ep,
            tp: r.tp,
            sp_dist: r.sp_dist,
            projected_point: r.candidate.point,
        })
        .collect();

    let cpath_ids = cpath
        .iter()
        .map(|&idx| {
            network
                .edge(idx)
                .expect("cpath only ever contains edge indices drawn from this network")
                .id
        })
        .collect();

    let mgeom = if cpath.is_empty() {
        LineString::new(vec![])
    } else {
        let first = resolved.first().expect("non-empty cpath implies non-empty opath");
        let last = resolved.last().expect("non-empty cpath implies non-empty opath");
        network.complete_path_to_geometry(&cpath, first.candidate.offset, last.candidate.offset)
    };

    MatchResult {
        trajectory_id,
        matched_candidates,
        opath,
        cpath: cpath_ids,
        cpath_indices,
        mgeom,
    }
}
