//! The matched outcome of one trajectory: per-observation candidates, the
//! contiguous edge traversal, and its clipped geometry.

mod match_result;

pub use match_result::{MatchResult, MatchedCandidate};
