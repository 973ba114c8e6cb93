use std::collections::HashMap;

use rstar::{RTree, RTreeObject, AABB};

use crate::candidate::Candidate;
use crate::geo::{project_point_to_line, LineString, Point};

use super::edge::Edge;
use super::error::NetworkError;
use super::ids::{EdgeId, EdgeIndex, NodeId, NodeIndex};

/// An R-tree leaf: the bounding box of an edge's geometry paired with the
/// edge's dense index. Kept separate from [`Edge`] itself so the tree does
/// not need to own (or duplicate) the full geometry.
struct EdgeEnvelope {
    edge_index: EdgeIndex,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for EdgeEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn geom_envelope(geom: &LineString) -> AABB<[f64; 2]> {
    let pts = geom.points();
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in pts {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    AABB::from_corners([min_x, min_y], [max_x, max_y])
}

/// The road network: edges, external/internal id maps for nodes and edges,
/// node coordinates, and an R-tree over edge bounding boxes for candidate
/// search.
pub struct Network {
    edges: Vec<Edge>,
    node_points: Vec<Point>,
    node_id_to_index: HashMap<NodeId, NodeIndex>,
    node_index_to_id: Vec<NodeId>,
    edge_id_to_index: HashMap<EdgeId, EdgeIndex>,
    rtree: RTree<EdgeEnvelope>,
}

/// One row of network input: an opaque edge id, its source/target node
/// ids, and its geometry. `source` is the first point of `geom`, `target`
/// the last.
pub struct EdgeInput {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub geom: LineString,
}

impl Network {
    /// Builds a network from an iterator of edge rows. Duplicate
    /// `(source, target)` pairs are allowed and become parallel edges;
    /// duplicate edge `id` values are rejected.
    pub fn build<I>(rows: I) -> Result<Self, NetworkError>
    where
        I: IntoIterator<Item = EdgeInput>,
    {
        let mut edges: Vec<Edge> = Vec::new();
        let mut node_points: Vec<Point> = Vec::new();
        let mut node_id_to_index: HashMap<NodeId, NodeIndex> = HashMap::new();
        let mut node_index_to_id: Vec<NodeId> = Vec::new();
        let mut edge_id_to_index: HashMap<EdgeId, EdgeIndex> = HashMap::new();

        // A node id's point is fixed by whichever edge first names it; any
        // later edge naming the same id must agree on that point to within
        // floating-point jitter, or its geometry disagrees with a network
        // it has already claimed to share an endpoint with.
        const ENDPOINT_TOLERANCE: f64 = 1e-6;

        fn intern_node(
            id: NodeId,
            point: Point,
            edge_id: EdgeId,
            node_id_to_index: &mut HashMap<NodeId, NodeIndex>,
            node_index_to_id: &mut Vec<NodeId>,
            node_points: &mut Vec<Point>,
        ) -> Result<NodeIndex, NetworkError> {
            if let Some(&idx) = node_id_to_index.get(&id) {
                let existing = node_points[idx.as_usize()];
                if existing.distance(&point) > ENDPOINT_TOLERANCE {
                    return Err(NetworkError::InconsistentEndpoints {
                        edge_id,
                        detail: format!(
                            "node {id} previously placed at {existing:?}, edge geometry places it at {point:?}"
                        ),
                    });
                }
                return Ok(idx);
            }
            let idx = NodeIndex(node_points.len() as u32);
            node_id_to_index.insert(id, idx);
            node_index_to_id.push(id);
            node_points.push(point);
            Ok(idx)
        }

        for row in rows {
            if row.geom.num_points() < 2 {
                return Err(NetworkError::DegenerateGeometry(row.id));
            }
            if edge_id_to_index.contains_key(&row.id) {
                return Err(NetworkError::DuplicateEdgeId(row.id));
            }

            let source_point = row.geom.first().expect("checked num_points >= 2");
            let target_point = row.geom.last().expect("checked num_points >= 2");

            let source = intern_node(
                row.source,
                source_point,
                row.id,
                &mut node_id_to_index,
                &mut node_index_to_id,
                &mut node_points,
            )?;
            let target = intern_node(
                row.target,
                target_point,
                row.id,
                &mut node_id_to_index,
                &mut node_index_to_id,
                &mut node_points,
            )?;

            let index = EdgeIndex(edges.len() as u32);
            let length = row.geom.length();
            edge_id_to_index.insert(row.id, index);
            edges.push(Edge {
                index,
                id: row.id,
                source,
                target,
                length,
                geom: row.geom,
            });
        }

        let rtree_entries = edges
            .iter()
            .map(|e| EdgeEnvelope {
                edge_index: e.index,
                envelope: geom_envelope(&e.geom),
            })
            .collect::<Vec<_>>();
        let rtree = RTree::bulk_load(rtree_entries);

        Ok(Self {
            edges,
            node_points,
            node_id_to_index,
            node_index_to_id,
            edge_id_to_index,
            rtree,
        })
    }

    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn n_nodes(&self) -> usize {
        self.node_points.len()
    }

    pub fn edge(&self, index: EdgeIndex) -> Result<&Edge, NetworkError> {
        self.edges
            .get(index.as_usize())
            .ok_or(NetworkError::EdgeIndexOutOfRange(index.0))
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_point(&self, index: NodeIndex) -> Point {
        self.node_points[index.as_usize()]
    }

    pub fn node_id(&self, index: NodeIndex) -> NodeId {
        self.node_index_to_id[index.as_usize()]
    }

    pub fn node_index(&self, id: NodeId) -> Option<NodeIndex> {
        self.node_id_to_index.get(&id).copied()
    }

    pub fn edge_index(&self, id: EdgeId) -> Option<EdgeIndex> {
        self.edge_id_to_index.get(&id).copied()
    }

    /// Finds candidate edges for every observation in a trajectory.
    ///
    /// For each point, the R-tree is queried for edges whose bounding box
    /// intersects `p +/- radius`. Each hit is projected onto the edge's
    /// geometry; hits with `error > radius` are discarded. If more than
    /// `k` candidates survive, only the `k` smallest by `(error,
    /// edge.index)` are kept. Candidate indices are assigned so that later
    /// observations always receive strictly greater indices, starting
    /// just past the network's own node indices -- the convention
    /// STMATCH relies on to treat candidates as pseudo-nodes above the
    /// base graph's vertex range.
    ///
    /// Never fails itself; a caller matching a trajectory rejects it with
    /// `MatchError::EmptyCandidates` iff some observation has zero
    /// surviving candidates here.
    pub fn search_tr_cs_knn(
        &self,
        trajectory: &[Point],
        k: usize,
        radius: f64,
    ) -> Vec<Vec<Candidate<'_>>> {
        let mut next_index: u32 = self.n_nodes() as u32;
        let mut result = Vec::with_capacity(trajectory.len());

        for p in trajectory {
            let envelope = AABB::from_corners(
                [p.x - radius, p.y - radius],
                [p.x + radius, p.y + radius],
            );

            let mut candidates: Vec<(f64, EdgeIndex, f64, Point)> = self
                .rtree
                .locate_in_envelope_intersecting(&envelope)
                .filter_map(|leaf| {
                    let edge = &self.edges[leaf.edge_index.as_usize()];
                    let proj = project_point_to_line(p, &edge.geom);
                    if proj.error <= radius {
                        Some((proj.error, edge.index, proj.offset, proj.point))
                    } else {
                        None
                    }
                })
                .collect();

            candidates.sort_by(|a, b| {
                a.0.partial_cmp(&b.0)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.1.cmp(&b.1))
            });
            candidates.truncate(k);

            let layer = candidates
                .into_iter()
                .map(|(error, edge_index, offset, point)| {
                    let c = Candidate {
                        index: next_index,
                        offset,
                        error,
                        edge: &self.edges[edge_index.as_usize()],
                        point,
                    };
                    next_index += 1;
                    c
                })
                .collect();
            result.push(layer);
        }

        result
    }

    /// Reconstructs the clipped matched geometry for a contiguous edge
    /// path, given the projections of the trajectory's first and last
    /// observations onto the first and last edges of `cpath`.
    ///
    /// If `cpath` has a single edge, the result is the single cut between
    /// the two projection offsets on that edge. Otherwise, the head edge
    /// is cut from the first offset to its end, interior edges are
    /// appended whole, and the tail edge is cut from its start to the
    /// last offset. Consecutive duplicate points are elided.
    pub fn complete_path_to_geometry(
        &self,
        cpath: &[EdgeIndex],
        first_offset: f64,
        last_offset: f64,
    ) -> LineString {
        if cpath.is_empty() {
            return LineString::new(vec![]);
        }

        let mut points: Vec<Point> = Vec::new();

        if cpath.len() == 1 {
            let edge = &self.edges[cpath[0].as_usize()];
            let (a, b) = if first_offset <= last_offset {
                (first_offset, last_offset)
            } else {
                (last_offset, first_offset)
            };
            let cut = crate::geo::cutoff(&edge.geom, a, b);
            points.extend(cut.points());
        } else {
            let head = &self.edges[cpath[0].as_usize()];
            let head_cut = crate::geo::cutoff(&head.geom, first_offset, head.length);
            points.extend(head_cut.points());

            for &idx in &cpath[1..cpath.len() - 1] {
                let edge = &self.edges[idx.as_usize()];
                points.extend(edge.geom.points());
            }

            let tail = &self.edges[cpath[cpath.len() - 1].as_usize()];
            let tail_cut = crate::geo::cutoff(&tail.geom, 0.0, last_offset);
            points.extend(tail_cut.points());
        }

        points.dedup_by(|a, b| a == b);
        LineString::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(pts: &[(f64, f64)]) -> LineString {
        LineString::new(pts.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    fn grid_network() -> Network {
        // a 3-node, 2-edge chain: 0 --e1--> 1 --e2--> 2
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
        ];
        Network::build(rows).unwrap()
    }

    #[test]
    fn build_interns_nodes_and_edges() {
        let net = grid_network();
        assert_eq!(net.n_edges(), 2);
        assert_eq!(net.n_nodes(), 3);
    }

    #[test]
    fn inconsistent_endpoint_geometry_rejected() {
        // node 1 is first placed at (1.0, 0.0) by e1, then e2 claims the
        // same node id sits at (1.0, 5.0) instead.
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
                geom: line(&[(1.0, 5.0), (2.0, 5.0)]),
            },
        ];
        assert!(matches!(
            Network::build(rows),
            Err(NetworkError::InconsistentEndpoints { .. })
        ));
    }

    #[test]
    fn duplicate_edge_id_rejected() {
        let rows = vec![
            EdgeInput {
                id: EdgeId(1),
                source: NodeId(0),
                target: NodeId(1),
                geom: line(&[(0.0, 0.0), (1.0, 0.0)]),
            },
            EdgeInput {
                id: EdgeId(1),
                source: NodeId(1),
                target: NodeId(2),
                geom: line(&[(1.0, 0.0), (2.0, 0.0)]),
            },
        ];
        assert!(matches!(
            Network::build(rows),
            Err(NetworkError::DuplicateEdgeId(_))
        ));
    }

    #[test]
    fn knn_finds_nearby_edge_within_radius() {
        let net = grid_network();
        let traj = vec![Point::new(0.5, 0.1)];
        let candidates = net.search_tr_cs_knn(&traj, 4, 0.5);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].len(), 1);
        assert_eq!(candidates[0][0].edge.id, EdgeId(1));
    }

    #[test]
    fn knn_truncates_to_k() {
        let net = grid_network();
        let traj = vec![Point::new(1.0, 0.1)];
        let candidates = net.search_tr_cs_knn(&traj, 1, 2.0);
        assert_eq!(candidates[0].len(), 1);
    }

    #[test]
    fn knn_yields_no_candidates_outside_radius() {
        let net = grid_network();
        let traj = vec![Point::new(10.0, 10.0)];
        let candidates = net.search_tr_cs_knn(&traj, 4, 0.1);
        assert!(candidates[0].is_empty());
    }
}
