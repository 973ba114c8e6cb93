use std::collections::HashMap;

use crate::network::{EdgeIndex, Network, NodeIndex};

use super::error::GraphError;
use super::pq::Frontier;

/// One outgoing arc: the node it leads to, the edge that realizes it, and
/// that edge's length (the search cost).
#[derive(Copy, Clone, Debug)]
pub struct Arc {
    pub target: NodeIndex,
    pub edge: EdgeIndex,
    pub cost: f64,
}

/// A dense forward adjacency list over [`Network`], built once and reused
/// across many shortest-path queries. Costs are edge lengths; the network
/// is treated as directed, so a bidirectional road must appear as two
/// edge rows to be traversable both ways.
pub struct NetworkGraph {
    adjacency: Vec<Vec<Arc>>,
}

/// The result of a bounded single-source search: for every node reached
/// within the distance bound, its predecessor node/edge and its distance
/// from the source.
pub struct BoundedSearch {
    pub pmap: HashMap<NodeIndex, (NodeIndex, EdgeIndex)>,
    pub dmap: HashMap<NodeIndex, f64>,
}

impl NetworkGraph {
    pub fn build(network: &Network) -> Self {
        let mut adjacency = vec![Vec::new(); network.n_nodes()];
        for edge in network.edges() {
            adjacency[edge.source.as_usize()].push(Arc {
                target: edge.target,
                edge: edge.index,
                cost: edge.length,
            });
        }
        Self { adjacency }
    }

    pub fn n_nodes(&self) -> usize {
        self.adjacency.len()
    }

    fn neighbors(&self, node: NodeIndex) -> &[Arc] {
        &self.adjacency[node.as_usize()]
    }

    /// Public view of a node's outgoing arcs, used by the STMATCH
    /// composite graph to fold base-graph adjacency into its merged
    /// out-edge enumeration.
    pub fn out_edges(&self, node: NodeIndex) -> &[Arc] {
        &self.adjacency[node.as_usize()]
    }

    /// Finds the edge realizing the arc `(u, v)` whose length matches
    /// `cost` to within a small absolute tolerance. Used to turn a
    /// node-to-node shortest path back into an edge sequence when more
    /// than one parallel edge could connect the pair.
    pub fn edge_between_with_cost(
        &self,
        u: NodeIndex,
        v: NodeIndex,
        cost: f64,
    ) -> Result<EdgeIndex, GraphError> {
        self.neighbors(u)
            .iter()
            .find(|arc| arc.target == v && (arc.cost - cost).abs() <= 1e-6)
            .map(|arc| arc.edge)
            .ok_or(GraphError::EdgeLookupFailed(u, v))
    }

    /// Plain Dijkstra from `source` to `target`, returning the edge
    /// sequence of the shortest path. `Ok(Some(vec![]))` when
    /// `source == target`; `Ok(None)` when no path exists.
    pub fn dijkstra(
        &self,
        source: NodeIndex,
        target: NodeIndex,
    ) -> Result<Option<Vec<EdgeIndex>>, GraphError> {
        if source.as_usize() >= self.n_nodes() {
            return Err(GraphError::NodeIndexOutOfRange(source));
        }
        if target.as_usize() >= self.n_nodes() {
            return Err(GraphError::NodeIndexOutOfRange(target));
        }
        if source == target {
            return Ok(Some(Vec::new()));
        }

        let mut dist: HashMap<NodeIndex, f64> = HashMap::new();
        let mut prev: HashMap<NodeIndex, (NodeIndex, EdgeIndex)> = HashMap::new();
        let mut visited: HashMap<NodeIndex, bool> = HashMap::new();
        let mut frontier = Frontier::default();

        dist.insert(source, 0.0);
        frontier.push(source, 0.0);

        while let Some((u, d)) = frontier.pop() {
            if visited.get(&u).copied().unwrap_or(false) {
                continue;
            }
            visited.insert(u, true);
            if u == target {
                break;
            }

            for arc in self.neighbors(u) {
                let alt = d + arc.cost;
                let better = match dist.get(&arc.target) {
                    Some(&cur) => alt < cur,
                    None => true,
                };
                if better {
                    dist.insert(arc.target, alt);
                    prev.insert(arc.target, (u, arc.edge));
                    frontier.decrease_key(arc.target, alt);
                }
            }
        }

        if !visited.get(&target).copied().unwrap_or(false) {
            return Ok(None);
        }

        Ok(Some(reconstruct(target, source, &prev)))
    }

    /// A* from `source` to `target` using `heuristic(node) -> f64`, a
    /// lower bound on the remaining distance to `target` (e.g. Euclidean
    /// distance). Falls back to plain Dijkstra behavior when `heuristic`
    /// always returns `0.0`.
    pub fn astar<H>(
        &self,
        source: NodeIndex,
        target: NodeIndex,
        heuristic: H,
    ) -> Result<Option<Vec<EdgeIndex>>, GraphError>
    where
        H: Fn(NodeIndex) -> f64,
    {
        if source.as_usize() >= self.n_nodes() {
            return Err(GraphError::NodeIndexOutOfRange(source));
        }
        if target.as_usize() >= self.n_nodes() {
            return Err(GraphError::NodeIndexOutOfRange(target));
        }
        if source == target {
            return Ok(Some(Vec::new()));
        }

        let mut dist: HashMap<NodeIndex, f64> = HashMap::new();
        let mut prev: HashMap<NodeIndex, (NodeIndex, EdgeIndex)> = HashMap::new();
        let mut visited: HashMap<NodeIndex, bool> = HashMap::new();
        let mut frontier = Frontier::default();

        dist.insert(source, 0.0);
        frontier.push(source, heuristic(source));

        while let Some((u, _)) = frontier.pop() {
            if visited.get(&u).copied().unwrap_or(false) {
                continue;
            }
            visited.insert(u, true);
            if u == target {
                break;
            }
            let d = dist[&u];

            for arc in self.neighbors(u) {
                let alt = d + arc.cost;
                let better = match dist.get(&arc.target) {
                    Some(&cur) => alt < cur,
                    None => true,
                };
                if better {
                    dist.insert(arc.target, alt);
                    prev.insert(arc.target, (u, arc.edge));
                    frontier.decrease_key(arc.target, alt + heuristic(arc.target));
                }
            }
        }

        if !visited.get(&target).copied().unwrap_or(false) {
            return Ok(None);
        }

        Ok(Some(reconstruct(target, source, &prev)))
    }

    /// Single-source Dijkstra bounded by `delta`: expansion stops once the
    /// smallest frontier distance exceeds `delta`, so only nodes within
    /// `delta` of `source` are ever settled. This is the search UBODT
    /// precomputation runs once per source node.
    pub fn single_source_upper_bound_dijkstra(
        &self,
        source: NodeIndex,
        delta: f64,
    ) -> BoundedSearch {
        let mut dmap: HashMap<NodeIndex, f64> = HashMap::new();
        let mut pmap: HashMap<NodeIndex, (NodeIndex, EdgeIndex)> = HashMap::new();
        let mut visited: HashMap<NodeIndex, bool> = HashMap::new();
        let mut frontier = Frontier::default();

        dmap.insert(source, 0.0);
        frontier.push(source, 0.0);

        while let Some((u, d)) = frontier.pop() {
            if d > delta {
                break;
            }
            if visited.get(&u).copied().unwrap_or(false) {
                continue;
            }
            visited.insert(u, true);

            for arc in self.neighbors(u) {
                let alt = d + arc.cost;
                if alt > delta {
                    continue;
                }
                let better = match dmap.get(&arc.target) {
                    Some(&cur) => alt < cur,
                    None => true,
                };
                if better {
                    dmap.insert(arc.target, alt);
                    pmap.insert(arc.target, (u, arc.edge));
                    frontier.decrease_key(arc.target, alt);
                }
            }
        }

        dmap.remove(&source);
        BoundedSearch { pmap, dmap }
    }
}

fn reconstruct(
    target: NodeIndex,
    source: NodeIndex,
    prev: &HashMap<NodeIndex, (NodeIndex, EdgeIndex)>,
) -> Vec<EdgeIndex> {
    let mut edges = Vec::new();
    let mut cur = target;
    while cur != source {
        let (p, e) = prev[&cur];
        edges.push(e);
        cur = p;
    }
    edges.reverse();
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{LineString, Point};
    use crate::network::{EdgeId, EdgeInput, NodeId};

    fn line(pts: &[(f64, f64)]) -> LineString {
        LineString::new(pts.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    // 0 --e1(1.0)--> 1 --e2(1.0)--> 2, plus a direct 0 --e3(5.0)--> 2 shortcut
    fn three_node_network() -> Network {
        let rows = vec![
            EdgeInput {
                id: EdgeId(1),
                source: NodeId(0),
                target: NodeId(1),
                geom: line(&[(0.0, 0.0), (1.0, 0.0)]),
            },
            EdgeInput {
                id: EdgeId(2),
                source: NodeId(1),
                target: NodeId(2),
                geom: line(&[(1.0, 0.0), (2.0, 0.0)]),
            },
            EdgeInput {
                id: EdgeId(3),
                source: NodeId(0),
                target: NodeId(2),
                geom: line(&[(0.0, 0.0), (0.0, 5.0), (2.0, 5.0)]),
            },
        ];
        Network::build(rows).unwrap()
    }

    #[test]
    fn dijkstra_prefers_shorter_two_hop_path() {
        let net = three_node_network();
        let graph = NetworkGraph::build(&net);
        let path = graph
            .dijkstra(NodeIndex(0), NodeIndex(2))
            .unwrap()
            .unwrap();
        assert_eq!(path, vec![EdgeIndex(0), EdgeIndex(1)]);
    }

    #[test]
    fn dijkstra_same_source_and_target_is_empty_path() {
        let net = three_node_network();
        let graph = NetworkGraph::build(&net);
        let path = graph
            .dijkstra(NodeIndex(1), NodeIndex(1))
            .unwrap()
            .unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn dijkstra_reports_no_path_when_unreachable() {
        let net = three_node_network();
        let graph = NetworkGraph::build(&net);
        // node 2 has no outgoing edges, so 2 -> 0 is unreachable.
        let result = graph.dijkstra(NodeIndex(2), NodeIndex(0)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn astar_with_zero_heuristic_matches_dijkstra() {
        let net = three_node_network();
        let graph = NetworkGraph::build(&net);
        let path = graph
            .astar(NodeIndex(0), NodeIndex(2), |_| 0.0)
            .unwrap()
            .unwrap();
        assert_eq!(path, vec![EdgeIndex(0), EdgeIndex(1)]);
    }

    #[test]
    fn bounded_dijkstra_excludes_nodes_beyond_delta() {
        let net = three_node_network();
        let graph = NetworkGraph::build(&net);
        let search = graph.single_source_upper_bound_dijkstra(NodeIndex(0), 1.5);
        assert_eq!(search.dmap.get(&NodeIndex(1)), Some(&1.0));
        assert!(!search.dmap.contains_key(&NodeIndex(2)));
    }

    #[test]
    fn bounded_dijkstra_includes_nodes_within_delta() {
        let net = three_node_network();
        let graph = NetworkGraph::build(&net);
        let search = graph.single_source_upper_bound_dijkstra(NodeIndex(0), 2.0);
        assert_eq!(search.dmap.get(&NodeIndex(2)), Some(&2.0));
        assert_eq!(search.pmap.get(&NodeIndex(2)), Some(&(NodeIndex(1), EdgeIndex(1))));
    }

    #[test]
    fn edge_between_with_cost_resolves_parallel_edges() {
        let net = three_node_network();
        let graph = NetworkGraph::build(&net);
        let edge = graph
            .edge_between_with_cost(NodeIndex(0), NodeIndex(1), 1.0)
            .unwrap();
        assert_eq!(edge, EdgeIndex(0));
    }
}
