use crate::candidate::{emission_probability, Candidate};

use super::tgnode::{TGLayer, TGNode};

/// HMM transition probability from a shortest-path / Euclidean distance
/// ratio.
///
/// When the Euclidean gap dominates (the common case), both numerator
/// and denominator are nudged by `1e-6` so that a `0/0` pair (candidate
/// did not move) resolves to `1.0` rather than `NaN`; this is the
/// behavior pinned by [Testable property 9's toy-lattice expectations].
/// Otherwise (the path is indirect and longer than the straight line),
/// the ratio is taken the other way so the result still lands in
/// `(0, 1]`.
pub fn calc_tp(sp_dist: f64, eu_dist: f64) -> f64 {
    let tp = if eu_dist >= sp_dist {
        (sp_dist + 1e-6) / (eu_dist + 1e-6)
    } else {
        eu_dist / sp_dist
    };
    tp.clamp(f64::EPSILON, 1.0)
}

/// Outcome of running the forward pass over every layer transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// Every layer received at least one finite update.
    Complete,
    /// The transition into `reached_layer` produced no finite update for
    /// any node; layers at and after `reached_layer` were left alone.
    Disconnected { reached_layer: usize },
}

/// The layered HMM lattice: one [`TGLayer`] per observation.
pub struct TransitionGraph {
    pub layers: Vec<TGLayer>,
}

impl TransitionGraph {
    /// Builds the initial lattice from per-observation candidate lists.
    /// Layer 0 nodes start with `cumu_log_prob = log(ep)`; every other
    /// layer starts at `-inf` until the forward pass reaches it.
    pub fn build(candidates: &[Vec<Candidate<'_>>], gps_error: f64) -> Self {
        let layers = candidates
            .iter()
            .enumerate()
            .map(|(layer_idx, layer_candidates)| {
                let nodes = layer_candidates
                    .iter()
                    .enumerate()
                    .map(|(i, c)| {
                        let ep = emission_probability(c.error, gps_error);
                        let cumu_log_prob = if layer_idx == 0 { ep.ln() } else { f64::NEG_INFINITY };
                        TGNode::initial(i, ep, cumu_log_prob)
                    })
                    .collect();
                TGLayer { nodes }
            })
            .collect();
        Self { layers }
    }

    /// Runs the Viterbi forward pass. `eu_dists[i]` is the Euclidean
    /// distance between observations `i` and `i+1`. `sp_dist` computes
    /// the strategy-specific shortest-path distance between two
    /// candidates (FMM looks it up in a UBODT; STMATCH runs a bounded
    /// Dijkstra) given the pair, the transition's layer index, and its
    /// Euclidean gap (STMATCH needs the latter to size its per-pair
    /// search bound); it may return `f64::INFINITY` to reject a
    /// transition outright.
    pub fn forward_pass<F>(
        &mut self,
        candidates: &[Vec<Candidate<'_>>],
        eu_dists: &[f64],
        mut sp_dist: F,
    ) -> ForwardOutcome
    where
        F: FnMut(&Candidate<'_>, &Candidate<'_>, usize, f64) -> f64,
    {
        for layer_idx in 0..self.layers.len().saturating_sub(1) {
            let eu_dist = eu_dists[layer_idx];
            let mut any_update = false;

            for a_idx in 0..self.layers[layer_idx].nodes.len() {
                let a_cumu = self.layers[layer_idx].nodes[a_idx].cumu_log_prob;
                if !a_cumu.is_finite() {
                    continue;
                }
                let a_candidate = &candidates[layer_idx][self.layers[layer_idx].nodes[a_idx].candidate_index];

                for b_idx in 0..self.layers[layer_idx + 1].nodes.len() {
                    let b_candidate_index = self.layers[layer_idx + 1].nodes[b_idx].candidate_index;
                    let b_candidate = &candidates[layer_idx + 1][b_candidate_index];

                    let sp = sp_dist(a_candidate, b_candidate, layer_idx, eu_dist);
                    if !sp.is_finite() {
                        continue;
                    }
                    let tp = calc_tp(sp, eu_dist);
                    let b_ep = self.layers[layer_idx + 1].nodes[b_idx].ep;
                    let v = a_cumu + tp.ln() + b_ep.ln();

                    let b_node = &mut self.layers[layer_idx + 1].nodes[b_idx];
                    if v > b_node.cumu_log_prob {
                        b_node.cumu_log_prob = v;
                        b_node.prev = Some(a_idx);
                        b_node.tp = tp;
                        b_node.sp_dist = sp;
                        any_update = true;
                    }
                }
            }

            if !any_update {
                return ForwardOutcome::Disconnected {
                    reached_layer: layer_idx + 1,
                };
            }
        }

        ForwardOutcome::Complete
    }

    /// Back-tracks from the highest-probability node in `last_layer`
    /// (inclusive) to layer 0, returning `(layer_index, node_index)`
    /// pairs in trajectory order. `None` if `last_layer` has no finite
    /// node (nothing to back-track from).
    pub fn backtrack(&self, last_layer: usize) -> Option<Vec<(usize, usize)>> {
        let mut cur = self.layers[last_layer].best()?;
        let mut path = vec![(last_layer, cur)];

        for layer_idx in (0..last_layer).rev() {
            let prev = self.layers[layer_idx + 1].nodes[cur].prev?;
            path.push((layer_idx, prev));
            cur = prev;
        }

        path.reverse();
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{LineString, Point};
    use crate::network::{Edge, EdgeId, EdgeIndex, NodeIndex};

    fn edge(index: u32) -> Edge {
        Edge {
            index: EdgeIndex(index),
            id: EdgeId(index as i64),
            source: NodeIndex(0),
            target: NodeIndex(1),
            length: 10.0,
            geom: LineString::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]),
        }
    }

    #[test]
    fn calc_tp_is_one_when_both_distances_are_zero() {
        assert_eq!(calc_tp(0.0, 0.0), 1.0);
    }

    #[test]
    fn calc_tp_penalizes_indirect_paths() {
        let direct = calc_tp(1.0, 1.0);
        let indirect = calc_tp(5.0, 1.0);
        assert!(direct > indirect);
    }

    #[test]
    fn calc_tp_stays_in_unit_interval() {
        for (sp, eu) in [(0.0, 5.0), (5.0, 0.0), (3.0, 3.0), (100.0, 1.0)] {
            let tp = calc_tp(sp, eu);
            assert!(tp > 0.0 && tp <= 1.0, "tp out of range: {tp}");
        }
    }

    #[test]
    fn forward_pass_prefers_high_emission_high_transition_path() {
        let e0 = edge(0);
        let e1 = edge(1);
        let layer0 = vec![Candidate {
            index: 0,
            offset: 0.0,
            error: 0.0,
            edge: &e0,
            point: Point::new(0.0, 0.0),
        }];
        let layer1 = vec![
            Candidate {
                index: 1,
                offset: 0.0,
                error: 0.0,
                edge: &e1,
                point: Point::new(1.0, 0.0),
            },
            Candidate {
                index: 2,
                offset: 0.0,
                error: 10.0,
                edge: &e1,
                point: Point::new(1.0, 10.0),
            },
        ];
        let candidates = vec![layer0, layer1];
        let mut graph = TransitionGraph::build(&candidates, 0.5);
        let outcome = graph.forward_pass(&candidates, &[1.0], |_, _, _, _| 1.0);
        assert_eq!(outcome, ForwardOutcome::Complete);

        let path = graph.backtrack(1).unwrap();
        assert_eq!(path.len(), 2);
        let (_, best_idx) = path[1];
        assert_eq!(graph.layers[1].nodes[best_idx].candidate_index, 0);
    }

    #[test]
    fn forward_pass_reports_disconnection_when_no_transition_is_finite() {
        let e0 = edge(0);
        let e1 = edge(1);
        let layer0 = vec![Candidate {
            index: 0,
            offset: 0.0,
            error: 0.0,
            edge: &e0,
            point: Point::new(0.0, 0.0),
        }];
        let layer1 = vec![Candidate {
            index: 1,
            offset: 0.0,
            error: 0.0,
            edge: &e1,
            point: Point::new(1.0, 0.0),
        }];
        let candidates = vec![layer0, layer1];
        let mut graph = TransitionGraph::build(&candidates, 0.5);
        let outcome = graph.forward_pass(&candidates, &[1.0], |_, _, _, _| f64::INFINITY);
        assert_eq!(outcome, ForwardOutcome::Disconnected { reached_layer: 1 });
    }
}
