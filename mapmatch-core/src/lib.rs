#![doc = include_str!("doc.md")]

pub mod candidate;
pub mod geo;
pub mod graph;
pub mod matcher;
pub mod network;
pub mod result;
pub mod transition;
pub mod ubodt;
