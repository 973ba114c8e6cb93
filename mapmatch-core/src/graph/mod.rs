//! Shortest-path search over the road network: plain Dijkstra, A*, and
//! the delta-bounded single-source search UBODT precomputation is built
//! on.

mod error;
mod network_graph;
mod pq;

pub use error::GraphError;
pub use network_graph::{Arc, BoundedSearch, NetworkGraph};
