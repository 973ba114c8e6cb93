use std::collections::HashMap;

use crate::candidate::Candidate;
use crate::network::EdgeIndex;

/// One dummy edge: a directed hop between pseudo-nodes (or between a
/// pseudo-node and a real network node), carrying the edge it travels
/// over and its cost.
#[derive(Copy, Clone, Debug)]
pub struct DummyEdge {
    pub target: u32,
    pub edge: EdgeIndex,
    pub cost: f64,
}

/// STMATCH's per-trajectory scaffolding: every candidate becomes a
/// pseudo-node wired into its matched edge at `candidate.offset`, so a
/// shortest-path search can enter and leave the middle of an edge
/// instead of only its endpoints.
///
/// Two kinds of dummy edges are added:
/// - boundary edges, from the edge's source node to the candidate and
///   from the candidate to the edge's target node, split at `offset`;
/// - same-edge edges between candidates that share an edge, chained in
///   offset order across the whole trajectory (not just between
///   consecutive observations), so a path can hop from one candidate
///   straight to another further along (or, within `reverse_tolerance`,
///   slightly behind) without detouring through a real node.
pub struct DummyGraph {
    adjacency: HashMap<u32, Vec<DummyEdge>>,
}

impl DummyGraph {
    pub fn build(candidates: &[Vec<Candidate<'_>>]) -> Self {
        let mut adjacency: HashMap<u32, Vec<DummyEdge>> = HashMap::new();

        let mut push = |from: u32, to: u32, edge: EdgeIndex, cost: f64| {
            adjacency.entry(from).or_default().push(DummyEdge {
                target: to,
                edge,
                cost,
            });
        };

        let mut by_edge: HashMap<EdgeIndex, Vec<(f64, u32)>> = HashMap::new();

        for layer in candidates {
            for c in layer {
                push(c.edge.source.0, c.index, c.edge.index, c.offset);
                push(c.index, c.edge.target.0, c.edge.index, c.edge.length - c.offset);
                by_edge.entry(c.edge.index).or_default().push((c.offset, c.index));
            }
        }

        for (edge_index, mut same_edge) in by_edge {
            same_edge.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap().then(a.1.cmp(&b.1)));
            for pair in same_edge.windows(2) {
                let (a_offset, a_index) = pair[0];
                let (b_offset, b_index) = pair[1];
                push(a_index, b_index, edge_index, b_offset - a_offset);
            }
        }

        Self { adjacency }
    }

    pub fn out_edges(&self, node: u32) -> &[DummyEdge] {
        self.adjacency.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_node(&self, node: u32) -> bool {
        self.adjacency.contains_key(&node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{LineString, Point};
    use crate::network::{Edge, EdgeId, EdgeIndex, NodeIndex};

    fn edge(index: u32, source: u32, target: u32, length: f64) -> Edge {
        Edge {
            index: EdgeIndex(index),
            id: EdgeId(index as i64),
            source: NodeIndex(source),
            target: NodeIndex(target),
            length,
            geom: LineString::new(vec![Point::new(0.0, 0.0), Point::new(length, 0.0)]),
        }
    }

    fn candidate(index: u32, edge: &Edge, offset: f64) -> Candidate<'_> {
        Candidate {
            index,
            offset,
            error: 0.0,
            edge,
            point: Point::new(offset, 0.0),
        }
    }

    #[test]
    fn boundary_edges_split_node_at_offset() {
        let e0 = edge(0, 10, 11, 10.0);
        let candidates = vec![vec![candidate(100, &e0, 4.0)]];
        let dg = DummyGraph::build(&candidates);

        let from_source = dg.out_edges(10);
        assert_eq!(from_source.len(), 1);
        assert_eq!(from_source[0].target, 100);
        assert_eq!(from_source[0].cost, 4.0);

        let from_candidate = dg.out_edges(100);
        assert_eq!(from_candidate.len(), 1);
        assert_eq!(from_candidate[0].target, 11);
        assert_eq!(from_candidate[0].cost, 6.0);
    }

    #[test]
    fn same_edge_candidates_chain_in_offset_order() {
        let e0 = edge(0, 10, 11, 10.0);
        let candidates = vec![vec![candidate(100, &e0, 2.0)], vec![candidate(101, &e0, 7.0)]];
        let dg = DummyGraph::build(&candidates);

        let chained = dg
            .out_edges(100)
            .iter()
            .find(|de| de.target == 101)
            .expect("candidates on the same edge chain directly");
        assert_eq!(chained.cost, 5.0);
    }

    #[test]
    fn unrelated_node_has_no_out_edges() {
        let e0 = edge(0, 10, 11, 10.0);
        let candidates = vec![vec![candidate(100, &e0, 2.0)]];
        let dg = DummyGraph::build(&candidates);
        assert!(!dg.contains_node(999));
        assert!(dg.out_edges(999).is_empty());
    }
}
