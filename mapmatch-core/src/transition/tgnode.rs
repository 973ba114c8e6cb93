/// One candidate's position in the HMM lattice.
///
/// `candidate_index` indexes into that observation's candidate slice
/// (not a trajectory-wide candidate index). `prev` is a back-pointer
/// into the previous layer's node vector -- layer-local, never a shared
/// reference, so the lattice stays a plain `Vec<TGLayer>` with no
/// self-referential borrows.
#[derive(Clone, Debug)]
pub struct TGNode {
    pub candidate_index: usize,
    pub ep: f64,
    pub tp: f64,
    pub cumu_log_prob: f64,
    pub sp_dist: f64,
    pub prev: Option<usize>,
}

impl TGNode {
    pub fn initial(candidate_index: usize, ep: f64, cumu_log_prob: f64) -> Self {
        Self {
            candidate_index,
            ep,
            tp: 0.0,
            cumu_log_prob,
            sp_dist: 0.0,
            prev: None,
        }
    }
}

/// One observation's worth of lattice nodes.
#[derive(Clone, Debug, Default)]
pub struct TGLayer {
    pub nodes: Vec<TGNode>,
}

impl TGLayer {
    /// The node with the largest `cumu_log_prob`, ties broken by the
    /// first one reached. `None` for an empty layer or one where every
    /// node is still `-inf` (unreached).
    pub fn best(&self) -> Option<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.cumu_log_prob.is_finite())
            .max_by(|a, b| a.1.cumu_log_prob.total_cmp(&b.1.cumu_log_prob))
            .map(|(i, _)| i)
    }
}
