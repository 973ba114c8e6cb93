use crate::candidate::Candidate;
use crate::geo::{euclidean_segment_lengths, Point};
use crate::network::Network;
use crate::result::MatchResult;
use crate::transition::{ForwardOutcome, TransitionGraph};
use crate::ubodt::{construct_complete_path, Ubodt};

use super::common::{build_match_result, resolve_opath};
use super::config::MatcherConfig;
use super::error::MatchError;

/// FMM: candidate search, UBODT-backed shortest-path lookups, Viterbi,
/// and path reconstruction via [`construct_complete_path`].
pub struct FmmMatcher<'a> {
    network: &'a Network,
    ubodt: &'a Ubodt,
    config: MatcherConfig,
}

impl<'a> FmmMatcher<'a> {
    pub fn new(network: &'a Network, ubodt: &'a Ubodt, config: MatcherConfig) -> Self {
        Self {
            network,
            ubodt,
            config,
        }
    }

    /// Matches one trajectory's GPS points. `Err(MatchError::EmptyCandidates)`
    /// rejects the whole trajectory outright; every other outcome
    /// (including a disconnected lattice or an unbridgeable gap) comes
    /// back `Ok` with the appropriate fields left empty, per the failure
    /// model.
    pub fn match_trajectory(&self, trajectory_id: i64, points: &[Point]) -> Result<MatchResult, MatchError> {
        let candidates = self
            .network
            .search_tr_cs_knn(points, self.config.k, self.config.radius);

        if candidates.iter().any(Vec::is_empty) {
            return Err(MatchError::EmptyCandidates);
        }

        let eu_dists = euclidean_segment_lengths(points);
        let mut tg = TransitionGraph::build(&candidates, self.config.gps_error);

        let ubodt = self.ubodt;
        let reverse_tolerance = self.config.reverse_tolerance;
        let outcome = tg.forward_pass(&candidates, &eu_dists, |a, b, _layer_idx, _eu_dist| {
            fmm_sp_dist(a, b, ubodt, reverse_tolerance)
        });

        if let ForwardOutcome::Disconnected { reached_layer } = outcome {
            log::warn!(
                "trajectory {trajectory_id} disconnected between observations {} and {}",
                reached_layer - 1,
                reached_layer
            );
        }

        let resolved = resolve_opath(&tg, &candidates, outcome);
        let opt_candidates: Vec<&Candidate<'_>> = resolved.iter().map(|r| r.candidate).collect();
        let (cpath, cpath_indices) = construct_complete_path(self.ubodt, &opt_candidates, reverse_tolerance);

        Ok(build_match_result(
            trajectory_id,
            self.network,
            &resolved,
            cpath,
            cpath_indices,
        ))
    }
}

/// FMM's strategy-specific shortest-path distance between two
/// consecutive candidates:
///
/// - same edge, forward: the offset difference.
/// - same edge, a small backward offset within `reverse_tolerance *
///   length`: an allowed U-turn, cost `0`.
/// - directly connected edges (`a.edge.target == b.edge.source`): the
///   two partial-edge lengths with no intermediate hop.
/// - otherwise, a UBODT lookup bridges the gap between the edges' end
///   nodes; a missing record (the true shortest path exceeds the table's
///   `delta`) rejects the transition with `+inf`.
fn fmm_sp_dist(a: &Candidate<'_>, b: &Candidate<'_>, ubodt: &Ubodt, reverse_tolerance: f64) -> f64 {
    if a.edge.index == b.edge.index {
        if a.offset <= b.offset {
            return b.offset - a.offset;
        }
        if a.offset - b.offset <= a.edge.length * reverse_tolerance {
            return 0.0;
        }
    }

    if a.edge.target == b.edge.source {
        return (a.edge.length - a.offset) + b.offset;
    }

    match ubodt.lookup(a.edge.target, b.edge.source) {
        Some(record) => (a.edge.length - a.offset) + record.cost + b.offset,
        None => f64::INFINITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LineString;
    use crate::network::{EdgeId, EdgeInput, NodeId, NodeIndex};
    use crate::ubodt::Record;

    fn line(pts: &[(f64, f64)]) -> LineString {
        LineString::new(pts.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    /// A 5x5 unit grid, columns/rows 0..=4, every adjacent pair of nodes
    /// connected by a bidirectional pair of unit-length edges -- the grid
    /// network scenario S1/S2/S3/S5 are defined against.
    fn grid_network() -> Network {
        let mut rows = Vec::new();
        let mut next_id = 0i64;
        let node_id = |x: i64, y: i64| NodeId(y * 5 + x);
        let node_pt = |x: i64, y: i64| Point::new(x as f64, y as f64);

        for y in 0..5 {
            for x in 0..5 {
                if x + 1 < 5 {
                    rows.push(EdgeInput {
                        id: EdgeId(next_id),
                        source: node_id(x, y),
                        target: node_id(x + 1, y),
                        geom: line(&[
                            (node_pt(x, y).x, node_pt(x, y).y),
                            (node_pt(x + 1, y).x, node_pt(x + 1, y).y),
                        ]),
                    });
                    next_id += 1;
                    rows.push(EdgeInput {
                        id: EdgeId(next_id),
                        source: node_id(x + 1, y),
                        target: node_id(x, y),
                        geom: line(&[
                            (node_pt(x + 1, y).x, node_pt(x + 1, y).y),
                            (node_pt(x, y).x, node_pt(x, y).y),
                        ]),
                    });
                    next_id += 1;
                }
                if y + 1 < 5 {
                    rows.push(EdgeInput {
                        id: EdgeId(next_id),
                        source: node_id(x, y),
                        target: node_id(x, y + 1),
                        geom: line(&[
                            (node_pt(x, y).x, node_pt(x, y).y),
                            (node_pt(x, y + 1).x, node_pt(x, y + 1).y),
                        ]),
                    });
                    next_id += 1;
                    rows.push(EdgeInput {
                        id: EdgeId(next_id),
                        source: node_id(x, y + 1),
                        target: node_id(x, y),
                        geom: line(&[
                            (node_pt(x, y + 1).x, node_pt(x, y + 1).y),
                            (node_pt(x, y).x, node_pt(x, y).y),
                        ]),
                    });
                    next_id += 1;
                }
            }
        }
        Network::build(rows).unwrap()
    }

    fn ubodt_for(network: &Network, delta: f64) -> Ubodt {
        let graph = crate::graph::NetworkGraph::build(network);
        crate::ubodt::generate_ubodt(network, &graph, delta, crate::ubodt::DEFAULT_MULTIPLIER)
    }

    #[test]
    fn matches_bidirectional_single_edge_trajectory() {
        // S3: a trajectory straddling one horizontal bidirectional edge.
        let network = grid_network();
        let ubodt = ubodt_for(&network, 5.0);
        let matcher = FmmMatcher::new(
            &network,
            &ubodt,
            MatcherConfig {
                k: 8,
                radius: 1.0,
                gps_error: 0.5,
                reverse_tolerance: 0.0,
                ..MatcherConfig::default()
            },
        );
        let points = vec![
            Point::new(1.9, 3.5),
            Point::new(1.6, 3.5),
            Point::new(1.0, 3.5),
            Point::new(0.6, 3.5),
        ];
        let result = matcher.match_trajectory(1, &points).unwrap();
        assert!(!result.cpath.is_empty());
        assert_eq!(result.cpath.len(), 1);
    }

    #[test]
    fn rejects_trajectory_with_no_candidates() {
        let network = grid_network();
        let ubodt = ubodt_for(&network, 5.0);
        let matcher = FmmMatcher::new(
            &network,
            &ubodt,
            MatcherConfig {
                radius: 0.01,
                ..MatcherConfig::default()
            },
        );
        let points = vec![Point::new(100.0, 100.0)];
        let err = matcher.match_trajectory(1, &points).unwrap_err();
        assert_eq!(err, MatchError::EmptyCandidates);
    }

    #[test]
    fn disconnected_island_leaves_opath_populated_but_cpath_empty() {
        // S4: second observation's only nearby edge sits on an isolated
        // component unreachable from the first observation's edge.
        let rows = vec![
            EdgeInput {
                id: EdgeId(0),
                source: NodeId(0),
                target: NodeId(1),
                geom: line(&[(0.0, 0.0), (1.0, 0.0)]),
            },
            EdgeInput {
                id: EdgeId(1),
                source: NodeId(100),
                target: NodeId(101),
                geom: line(&[(50.0, 50.0), (51.0, 50.0)]),
            },
        ];
        let network = Network::build(rows).unwrap();
        let ubodt = ubodt_for(&network, 5.0);
        let matcher = FmmMatcher::new(
            &network,
            &ubodt,
            MatcherConfig {
                k: 4,
                radius: 1.0,
                gps_error: 0.5,
                ..MatcherConfig::default()
            },
        );
        let points = vec![Point::new(0.5, 0.1), Point::new(50.5, 50.1)];
        let result = matcher.match_trajectory(1, &points).unwrap();
        assert_eq!(result.opath.len(), 2);
        assert!(result.cpath.is_empty());
        assert!(result.mgeom.num_points() == 0);
    }

    #[test]
    fn reverse_tolerance_allows_small_backward_offset() {
        // S5: two observations at offsets 0.9 and 0.1 on the same edge.
        let e0 = EdgeInput {
            id: EdgeId(0),
            source: NodeId(0),
            target: NodeId(1),
            geom: line(&[(0.0, 0.0), (1.0, 0.0)]),
        };
        let network = Network::build(vec![e0]).unwrap();
        let ubodt = ubodt_for(&network, 5.0);
        let a = &network.edges()[0];
        let candidate_a = Candidate {
            index: 0,
            offset: 0.9,
            error: 0.0,
            edge: a,
            point: Point::new(0.9, 0.0),
        };
        let candidate_b = Candidate {
            index: 1,
            offset: 0.1,
            error: 0.0,
            edge: a,
            point: Point::new(0.1, 0.0),
        };
        let sp = fmm_sp_dist(&candidate_a, &candidate_b, &ubodt, 0.5);
        assert_eq!(sp, 0.0);
        let _ = NodeIndex(0);
    }
}
