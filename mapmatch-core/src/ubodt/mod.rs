//! Upper-bounded origin-destination table: precomputed shortest-path
//! first-hops for every node pair within a distance bound, plus the
//! per-source search that builds one and the CSV/binary codecs that
//! persist it.

mod error;
mod generator;
mod io;
mod path;
mod record;
mod table;

pub use error::UbodtError;
pub use generator::{generate_ubodt, generate_ubodt_parallel};
pub use io::{estimate_rows, read_binary, read_csv, write_binary, write_csv};
pub use path::construct_complete_path;
pub use record::Record;
pub use table::{find_prime_number, Ubodt, DEFAULT_MULTIPLIER};
