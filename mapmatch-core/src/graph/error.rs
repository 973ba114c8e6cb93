use crate::network::NodeIndex;

#[derive(thiserror::Error, Debug)]
pub enum GraphError {
    #[error("node index {0} out of range")]
    NodeIndexOutOfRange(NodeIndex),
    #[error("no outgoing edge from {0} to {1} with matching cost")]
    EdgeLookupFailed(NodeIndex, NodeIndex),
}
