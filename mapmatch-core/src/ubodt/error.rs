use crate::network::{EdgeId, NodeId};

#[derive(thiserror::Error, Debug)]
pub enum UbodtError {
    #[error("io error reading/writing ubodt: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed ubodt csv row: {0}")]
    Csv(#[from] csv::Error),
    #[error("ubodt record references unknown node id {0}")]
    UnknownNode(NodeId),
    #[error("ubodt record references unknown edge id {0}")]
    UnknownEdge(EdgeId),
    #[error("truncated binary ubodt record ({0} trailing bytes)")]
    TruncatedRecord(usize),
}
