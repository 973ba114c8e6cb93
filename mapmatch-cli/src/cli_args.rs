use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "mapmatch", author, version, about = "UBODT precomputation and FMM / STMATCH map matching", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Log verbosity: off, error, warn, info, debug, trace.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Precompute an upper-bounded origin-destination table for a network.
    UbodtGen(UbodtGenArgs),
    /// Map-match trajectories against a precomputed UBODT (FMM).
    Fmm(FmmArgs),
    /// Map-match trajectories with on-demand bounded Dijkstra (STMATCH).
    Stmatch(StmatchArgs),
}

#[derive(Parser, Debug)]
pub struct UbodtGenArgs {
    /// Network edge CSV: `id;source;target;geom` with a header row.
    #[arg(long, value_name = "*.csv")]
    pub network: String,

    /// Upper bound on precomputed shortest-path cost.
    #[arg(long)]
    pub delta: f64,

    /// Hash table bucket-index seeding constant.
    #[arg(long, default_value_t = mapmatch_core::ubodt::DEFAULT_MULTIPLIER)]
    pub multiplier: i64,

    /// Output file. `.bin` selects the binary codec; anything else (`.csv`,
    /// `.txt`) selects CSV.
    #[arg(long, value_name = "PATH")]
    pub output: String,

    /// Distribute per-source searches across a rayon thread pool.
    #[arg(long, default_value_t = false)]
    pub use_omp: bool,
}

#[derive(Parser, Debug)]
pub struct MatchCommonArgs {
    /// Network edge CSV: `id;source;target;geom` with a header row.
    #[arg(long, value_name = "*.csv")]
    pub network: String,

    /// Trajectory CSV, either linestring-form (`id;geom[;timestamp]`) or
    /// point-form (`id;x;y;timestamp`).
    #[arg(long, value_name = "*.csv")]
    pub gps: String,

    /// Max candidates kept per observation.
    #[arg(long, default_value_t = 8)]
    pub candidates: usize,

    /// Candidate search radius, same units as the network.
    #[arg(long, default_value_t = 300.0)]
    pub radius: f64,

    /// Standard deviation of the emission-probability Gaussian.
    #[arg(long, default_value_t = 50.0)]
    pub error: f64,

    /// Fraction of an edge's length treated as a zero-cost same-edge U-turn.
    #[arg(long, default_value_t = 0.0)]
    pub reverse_tolerance: f64,

    /// Output CSV path.
    #[arg(long, value_name = "PATH")]
    pub output: String,

    /// Comma-separated output columns: id,opath,cpath,tpath,
    /// mgeom,pgeom,offset,error,spdist,ep,tp,length.
    #[arg(long, default_value = "id,opath,cpath,mgeom")]
    pub output_fields: String,

    /// Optional TOML/JSON settings file overriding the flags above.
    #[arg(long, value_name = "*.toml|*.json")]
    pub config: Option<String>,

    /// Worker pool size; defaults to the number of logical CPUs.
    #[arg(long)]
    pub jobs: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct FmmArgs {
    #[command(flatten)]
    pub common: MatchCommonArgs,

    /// Precomputed UBODT file (`.bin` or `.csv`/`.txt`).
    #[arg(long, value_name = "PATH")]
    pub ubodt: String,
}

#[derive(Parser, Debug)]
pub struct StmatchArgs {
    #[command(flatten)]
    pub common: MatchCommonArgs,

    /// Assumed maximum travel speed, used to bound per-pair search when
    /// observation timestamps are present.
    #[arg(long, default_value_t = 30.0)]
    pub vmax: f64,

    /// Multiplicative slack applied to the speed/time or Euclidean bound.
    #[arg(long, default_value_t = 1.5)]
    pub factor: f64,
}
