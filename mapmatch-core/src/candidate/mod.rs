//! Projections of GPS observations onto nearby network edges.

mod candidate;

pub use candidate::{emission_probability, Candidate};
