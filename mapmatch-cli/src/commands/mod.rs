mod fmm;
mod stmatch;
mod ubodt_gen;

pub use fmm::run_fmm;
pub use stmatch::run_stmatch;
pub use ubodt_gen::run_ubodt_gen;
