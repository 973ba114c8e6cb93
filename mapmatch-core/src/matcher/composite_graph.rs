use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::graph::NetworkGraph;
use crate::network::{EdgeIndex, NodeIndex};

use super::dummy_graph::DummyGraph;

/// A thin routing view merging a trajectory's [`DummyGraph`] with the
/// base [`NetworkGraph`]: pseudo-node ids (candidates) live at and above
/// `n_nodes`, real node ids below it. Neither graph is copied; this just
/// folds both adjacency lookups into one `out_edges` so STMATCH can run
/// a single bounded search without materializing a merged graph.
pub struct CompositeGraph<'a> {
    network: &'a NetworkGraph,
    dummy: &'a DummyGraph,
    n_nodes: u32,
}

/// The result of a bounded single-source search over the composite node
/// space (both real node ids and candidate pseudo-node ids).
pub struct CompositeBoundedSearch {
    pub pmap: HashMap<u32, (u32, EdgeIndex)>,
    pub dmap: HashMap<u32, f64>,
}

#[derive(Copy, Clone, PartialEq)]
struct HeapEntry {
    dist: f64,
    node: u32,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .partial_cmp(&self.dist)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<'a> CompositeGraph<'a> {
    pub fn new(network: &'a NetworkGraph, dummy: &'a DummyGraph) -> Self {
        Self {
            network,
            dummy,
            n_nodes: network.n_nodes() as u32,
        }
    }

    pub fn is_real_node(&self, node: u32) -> bool {
        node < self.n_nodes
    }

    /// Every outgoing arc from `node`, real and dummy combined. A real
    /// node may have both: its ordinary network adjacency, and a dummy
    /// edge leading to any candidate split along one of its edges.
    pub fn out_edges(&self, node: u32) -> Vec<(u32, EdgeIndex, f64)> {
        let mut out = Vec::new();
        if self.is_real_node(node) {
            for arc in self.network.out_edges(NodeIndex(node)) {
                out.push((arc.target.0, arc.edge, arc.cost));
            }
        }
        for de in self.dummy.out_edges(node) {
            out.push((de.target, de.edge, de.cost));
        }
        out
    }

    /// Single-source Dijkstra bounded by `delta`, same contract as
    /// [`NetworkGraph::single_source_upper_bound_dijkstra`] but over the
    /// composite node space.
    pub fn single_source_upper_bound_dijkstra(&self, source: u32, delta: f64) -> CompositeBoundedSearch {
        let mut dmap: HashMap<u32, f64> = HashMap::new();
        let mut pmap: HashMap<u32, (u32, EdgeIndex)> = HashMap::new();
        let mut visited: HashMap<u32, bool> = HashMap::new();
        let mut heap = BinaryHeap::new();

        dmap.insert(source, 0.0);
        heap.push(HeapEntry { dist: 0.0, node: source });

        while let Some(HeapEntry { dist: d, node: u }) = heap.pop() {
            if d > delta {
                break;
            }
            if visited.get(&u).copied().unwrap_or(false) {
                continue;
            }
            visited.insert(u, true);

            for (target, edge, cost) in self.out_edges(u) {
                let alt = d + cost;
                if alt > delta {
                    continue;
                }
                let better = match dmap.get(&target) {
                    Some(&cur) => alt < cur,
                    None => true,
                };
                if better {
                    dmap.insert(target, alt);
                    pmap.insert(target, (u, edge));
                    heap.push(HeapEntry { dist: alt, node: target });
                }
            }
        }

        dmap.remove(&source);
        CompositeBoundedSearch { pmap, dmap }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Candidate;
    use crate::geo::{LineString, Point};
    use crate::network::{Edge, EdgeId, EdgeInput, Network, NodeId};

    fn line(pts: &[(f64, f64)]) -> LineString {
        LineString::new(pts.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    // 0 --e0(10.0)--> 1 --e1(10.0)--> 2
    fn chain_network() -> Network {
        let rows = vec![
            EdgeInput {
                id: EdgeId(0),
                source: NodeId(0),
                target: NodeId(1),
                geom: line(&[(0.0, 0.0), (10.0, 0.0)]),
            },
            EdgeInput {
                id: EdgeId(1),
                source: NodeId(1),
                target: NodeId(2),
                geom: line(&[(10.0, 0.0), (20.0, 0.0)]),
            },
        ];
        Network::build(rows).unwrap()
    }

    #[test]
    fn reaches_candidate_through_real_node_then_dummy_edge() {
        let network = chain_network();
        let graph = NetworkGraph::build(&network);
        let e1: &Edge = &network.edges()[1];

        let candidates = vec![vec![Candidate {
            index: network.n_nodes() as u32,
            offset: 4.0,
            error: 0.0,
            edge: e1,
            point: Point::new(14.0, 0.0),
        }]];
        let dummy = DummyGraph::build(&candidates);
        let composite = CompositeGraph::new(&graph, &dummy);

        let search = composite.single_source_upper_bound_dijkstra(0, 20.0);
        let candidate_node = network.n_nodes() as u32;
        assert_eq!(search.dmap.get(&candidate_node), Some(&14.0));
    }

    #[test]
    fn real_node_out_edges_include_network_and_dummy_adjacency() {
        let network = chain_network();
        let graph = NetworkGraph::build(&network);
        let e0: &Edge = &network.edges()[0];

        let candidates = vec![vec![Candidate {
            index: network.n_nodes() as u32,
            offset: 3.0,
            error: 0.0,
            edge: e0,
            point: Point::new(3.0, 0.0),
        }]];
        let dummy = DummyGraph::build(&candidates);
        let composite = CompositeGraph::new(&graph, &dummy);

        let out = composite.out_edges(0);
        assert_eq!(out.len(), 2);
        assert!(out.iter().any(|&(target, _, _)| target == 1));
        assert!(out.iter().any(|&(target, _, _)| target == network.n_nodes() as u32));
    }
}
