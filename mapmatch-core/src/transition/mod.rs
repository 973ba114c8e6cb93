//! The layered HMM lattice (one layer per GPS observation), its Viterbi
//! forward pass, and back-pointer reconstruction.

mod graph;
mod tgnode;

pub use graph::{calc_tp, ForwardOutcome, TransitionGraph};
pub use tgnode::{TGLayer, TGNode};
