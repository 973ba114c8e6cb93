use std::cell::RefCell;

use crate::candidate::Candidate;
use crate::geo::{euclidean_segment_lengths, Point};
use crate::graph::NetworkGraph;
use crate::network::{EdgeIndex, Network};
use crate::result::MatchResult;
use crate::transition::{ForwardOutcome, TransitionGraph};

use super::common::{build_match_result, resolve_opath, ResolvedCandidate};
use super::composite_graph::CompositeGraph;
use super::config::MatcherConfig;
use super::dummy_graph::DummyGraph;
use super::error::MatchError;

/// STMATCH: candidate search, an on-demand bounded Dijkstra over a
/// per-trajectory [`CompositeGraph`] in place of a precomputed UBODT,
/// Viterbi, and its own path reconstruction over the base
/// [`NetworkGraph`].
pub struct StmatchMatcher<'a> {
    network: &'a Network,
    graph: &'a NetworkGraph,
    config: MatcherConfig,
}

/// Caches the single most recent bounded search, keyed by the source
/// candidate's pseudo-node id. `forward_pass` calls `sp_dist` with a
/// fixed `a` against every `b` in the next layer before moving to the
/// next `a`, so this turns what would be one bounded Dijkstra per
/// `(a, b)` pair into one per distinct `a`.
struct SearchCache<'a, 'n> {
    composite: CompositeGraph<'a>,
    entry: RefCell<Option<(u32, super::composite_graph::CompositeBoundedSearch)>>,
    _marker: std::marker::PhantomData<&'n ()>,
}

impl<'a, 'n> SearchCache<'a, 'n> {
    fn sp_dist(&self, a: &Candidate<'_>, b: &Candidate<'_>, delta: f64) -> f64 {
        let mut entry = self.entry.borrow_mut();
        let needs_recompute = match &*entry {
            Some((cached_index, _)) => *cached_index != a.index,
            None => true,
        };
        if needs_recompute {
            let search = self.composite.single_source_upper_bound_dijkstra(a.index, delta);
            *entry = Some((a.index, search));
        }
        entry
            .as_ref()
            .and_then(|(_, search)| search.dmap.get(&b.index).copied())
            .unwrap_or(f64::INFINITY)
    }
}

impl<'a> StmatchMatcher<'a> {
    pub fn new(network: &'a Network, graph: &'a NetworkGraph, config: MatcherConfig) -> Self {
        Self {
            network,
            graph,
            config,
        }
    }

    /// Matches one trajectory. `timestamps`, if present, must have one
    /// entry per point; their differences size each transition's Dijkstra
    /// bound via `vmax`/`factor` instead of the Euclidean-distance
    /// fallback.
    pub fn match_trajectory(
        &self,
        trajectory_id: i64,
        points: &[Point],
        timestamps: Option<&[f64]>,
    ) -> Result<MatchResult, MatchError> {
        let candidates = self
            .network
            .search_tr_cs_knn(points, self.config.k, self.config.radius);

        if candidates.iter().any(Vec::is_empty) {
            return Err(MatchError::EmptyCandidates);
        }

        let eu_dists = euclidean_segment_lengths(points);
        let dummy = DummyGraph::build(&candidates);
        let cache = SearchCache {
            composite: CompositeGraph::new(self.graph, &dummy),
            entry: RefCell::new(None),
            _marker: std::marker::PhantomData,
        };

        let factor = self.config.factor;
        let vmax = self.config.vmax;

        let mut tg = TransitionGraph::build(&candidates, self.config.gps_error);
        let outcome = tg.forward_pass(&candidates, &eu_dists, |a, b, layer_idx, eu_dist| {
            let delta = match timestamps {
                Some(ts) => factor * vmax * (ts[layer_idx + 1] - ts[layer_idx]),
                None => factor * (eu_dist * factor * 4.0),
            };
            cache.sp_dist(a, b, delta)
        });

        if let ForwardOutcome::Disconnected { reached_layer } = outcome {
            log::warn!(
                "trajectory {trajectory_id} disconnected between observations {} and {}",
                reached_layer - 1,
                reached_layer
            );
        }

        let resolved = resolve_opath(&tg, &candidates, outcome);
        let (cpath, cpath_indices) = self.reconstruct_path(&resolved);

        Ok(build_match_result(
            trajectory_id,
            self.network,
            &resolved,
            cpath,
            cpath_indices,
        ))
    }

    /// STMATCH's own cpath reconstruction: same-edge
    /// forward/near-reverse pairs need no insertion; otherwise a plain
    /// base-graph Dijkstra from `a.edge.target` to `b.edge.source`
    /// bridges the gap. Unlike FMM's UBODT-backed reconstruction this has
    /// no global distance bound, only whatever the base graph can reach.
    fn reconstruct_path(&self, resolved: &[ResolvedCandidate<'_>]) -> (Vec<EdgeIndex>, Vec<usize>) {
        if resolved.is_empty() {
            return (Vec::new(), Vec::new());
        }

        let reverse_tolerance = self.config.reverse_tolerance;
        let mut cpath = vec![resolved[0].candidate.edge.index];
        let mut indices = vec![0usize];

        for pair in resolved.windows(2) {
            let a = pair[0].candidate;
            let b = pair[1].candidate;

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

            match self.graph.dijkstra(a.edge.target, b.edge.source) {
                Ok(Some(bridge)) => {
                    cpath.extend(bridge);
                    cpath.push(b.edge.index);
                    indices.push(cpath.len() - 1);
                }
                _ => return (Vec::new(), Vec::new()),
            }
        }

        (cpath, indices)
    }
}
