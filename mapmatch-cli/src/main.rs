mod cli_args;
mod commands;
mod error;
mod network_io;
mod output;
mod settings;
mod trajectory_io;

use clap::Parser;

use cli_args::{CliArgs, Command};
use error::CliError;

fn main() {
    let args = CliArgs::parse();
    init_logger(&args.log_level);

    let result = match &args.command {
        Command::UbodtGen(ubodt_args) => commands::run_ubodt_gen(ubodt_args),
        Command::Fmm(fmm_args) => commands::run_fmm(fmm_args),
        Command::Stmatch(stmatch_args) => commands::run_stmatch(stmatch_args),
    };

    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(exit_code(&e));
    }
}

fn init_logger(level: &str) {
    let filter = level.parse().unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new().filter_level(filter).init();
}

/// Config/IO/Network failures abort before matching starts; the specific
/// code only matters in that it is non-zero.
fn exit_code(e: &CliError) -> i32 {
    match e {
        CliError::Config(_) => 2,
        CliError::Io(_) => 3,
        CliError::Csv(_) => 4,
        CliError::Geo(_) => 5,
        CliError::Network(_) => 6,
        CliError::Ubodt(_) => 7,
        CliError::Settings(_) => 8,
        CliError::MalformedRow(_) => 9,
        CliError::UnknownOutputField(_) => 10,
    }
}
