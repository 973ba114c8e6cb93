/// Per-trajectory match failures that reject the whole trajectory
/// outright. A disconnected lattice is not one of these: it comes back
/// `Ok` with a partial result instead, per the failure model in
/// [`crate::result`] -- see [`crate::transition::ForwardOutcome`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchError {
    #[error("no candidate edge found for one or more observations")]
    EmptyCandidates,
}
