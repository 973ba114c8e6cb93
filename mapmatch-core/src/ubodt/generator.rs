use std::collections::HashMap;

use rayon::prelude::*;

use crate::graph::NetworkGraph;
use crate::network::{EdgeIndex, Network, NodeIndex};

use super::record::Record;
use super::table::{find_prime_number, Ubodt};

/// Walks the predecessor chain from `t` back toward `s`, returning the
/// node immediately after `s` on the shortest path (`first_n`) and the
/// edge realizing `(s, first_n)`.
fn first_hop(
    s: NodeIndex,
    t: NodeIndex,
    pmap: &HashMap<NodeIndex, (NodeIndex, EdgeIndex)>,
) -> (NodeIndex, EdgeIndex) {
    let mut cur = t;
    loop {
        let &(prev, edge) = pmap
            .get(&cur)
            .expect("every node present in pmap is reachable from s");
        if prev == s {
            return (cur, edge);
        }
        cur = prev;
    }
}

fn records_from_source(graph: &NetworkGraph, source: NodeIndex, delta: f64) -> Vec<Record> {
    let search = graph.single_source_upper_bound_dijkstra(source, delta);
    let mut records = Vec::with_capacity(search.dmap.len());

    for (&target, &cost) in search.dmap.iter() {
        if target == source || cost > delta {
            continue;
        }
        let (first_n, next_e) = first_hop(source, target, &search.pmap);
        let prev_n = search.pmap[&target].0;
        records.push(Record {
            source,
            target,
            first_n,
            prev_n,
            next_e,
            cost,
        });
    }

    records
}

/// Initial bucket sizing for a freshly generated table. The exact row
/// count is not known until every source has been searched, so this
/// picks the prime at least `4 * n_nodes`, a mild overestimate for
/// typical sparse road networks that keeps bucket chains short.
fn initial_bucket_count(network: &Network) -> usize {
    find_prime_number((network.n_nodes() as f64 * 4.0 / 2.0).ceil())
}

/// Runs the per-source bounded Dijkstra sequentially over every node in
/// the network and assembles the resulting records into a table.
pub fn generate_ubodt(network: &Network, graph: &NetworkGraph, delta: f64, multiplier: i64) -> Ubodt {
    let mut table = Ubodt::new(initial_bucket_count(network), multiplier);
    for i in 0..network.n_nodes() {
        let source = NodeIndex(i as u32);
        for record in records_from_source(graph, source, delta) {
            table.insert(record);
        }
    }
    table
}

/// Parallel UBODT precomputation: each source node's bounded Dijkstra
/// runs independently (rayon distributes them across a worker pool),
/// producing an independent batch of records with no shared mutable
/// search state. The resulting batches are inserted into a single table
/// by one thread -- the serialization point the concurrency model
/// reserves for the UBODT writer.
pub fn generate_ubodt_parallel(
    network: &Network,
    graph: &NetworkGraph,
    delta: f64,
    multiplier: i64,
) -> Ubodt {
    let batches: Vec<Vec<Record>> = (0..network.n_nodes())
        .into_par_iter()
        .map(|i| records_from_source(graph, NodeIndex(i as u32), delta))
        .collect();

    let mut table = Ubodt::new(initial_bucket_count(network), multiplier);
    for batch in batches {
        for record in batch {
            table.insert(record);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{LineString, Point};
    use crate::network::{EdgeId, EdgeInput, NodeId};

    fn line(pts: &[(f64, f64)]) -> LineString {
        LineString::new(pts.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    fn chain_network() -> Network {
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
                source: NodeId(2),
                target: NodeId(3),
                geom: line(&[(2.0, 0.0), (3.0, 0.0)]),
            },
        ];
        Network::build(rows).unwrap()
    }

    #[test]
    fn generator_respects_delta_bound() {
        let net = chain_network();
        let graph = NetworkGraph::build(&net);
        let table = generate_ubodt(&net, &graph, 2.0, super::super::table::DEFAULT_MULTIPLIER);

        assert!(table.lookup(NodeIndex(0), NodeIndex(2)).is_some());
        assert!(table.lookup(NodeIndex(0), NodeIndex(3)).is_none());
    }

    #[test]
    fn generator_fills_first_hop_and_prev_node() {
        let net = chain_network();
        let graph = NetworkGraph::build(&net);
        let table = generate_ubodt(&net, &graph, 5.0, super::super::table::DEFAULT_MULTIPLIER);

        let rec = table.lookup(NodeIndex(0), NodeIndex(3)).unwrap();
        assert_eq!(rec.first_n, NodeIndex(1));
        assert_eq!(rec.prev_n, NodeIndex(2));
        assert_eq!(rec.next_e, EdgeIndex(0));
        assert_eq!(rec.cost, 3.0);
    }

    #[test]
    fn sequential_and_parallel_generation_agree() {
        let net = chain_network();
        let graph = NetworkGraph::build(&net);
        let seq = generate_ubodt(&net, &graph, 5.0, super::super::table::DEFAULT_MULTIPLIER);
        let par = generate_ubodt_parallel(&net, &graph, 5.0, super::super::table::DEFAULT_MULTIPLIER);
        assert_eq!(seq.len(), par.len());
        for rec in seq.iter() {
            let found = par.lookup(rec.source, rec.target).unwrap();
            assert_eq!(found.cost, rec.cost);
            assert_eq!(found.first_n, rec.first_n);
        }
    }
}
