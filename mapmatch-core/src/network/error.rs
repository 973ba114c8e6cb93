use super::ids::EdgeId;

#[derive(thiserror::Error, Debug)]
pub enum NetworkError {
    #[error("duplicate edge id {0} in network input")]
    DuplicateEdgeId(EdgeId),
    #[error("edge {edge_id} geometry endpoints do not match its declared source/target: {detail}")]
    InconsistentEndpoints { edge_id: EdgeId, detail: String },
    #[error("edge {0} has fewer than 2 points in its geometry")]
    DegenerateGeometry(EdgeId),
    #[error("edge index {0} out of range")]
    EdgeIndexOutOfRange(u32),
}
