//! The two interchangeable matching strategies -- FMM (UBODT-backed) and
//! STMATCH (on-demand bounded Dijkstra over a dummy-node composite graph)
//! -- plus the configuration and error types and path-reconstruction
//! helpers they share.

mod common;
mod composite_graph;
mod config;
mod dummy_graph;
mod error;
mod fmm;
mod stmatch;

pub use composite_graph::{CompositeBoundedSearch, CompositeGraph};
pub use config::{ConfigError, MatcherConfig};
pub use dummy_graph::{DummyEdge, DummyGraph};
pub use error::MatchError;
pub use fmm::FmmMatcher;
pub use stmatch::StmatchMatcher;
