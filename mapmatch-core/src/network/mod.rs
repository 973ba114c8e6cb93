//! Road network: edge/node tables, a spatial index over edge geometry, and
//! candidate kNN search.

mod edge;
mod error;
mod ids;
mod network;

pub use edge::Edge;
pub use error::NetworkError;
pub use ids::{EdgeId, EdgeIndex, NodeId, NodeIndex};
pub use network::{EdgeInput, Network};
