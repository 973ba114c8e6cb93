use std::fs::File;
use std::io::BufReader;
use std::sync::Mutex;

use kdam::{Bar, BarExt};
use rayon::prelude::*;

use mapmatch_core::matcher::{FmmMatcher, MatcherConfig};
use mapmatch_core::ubodt::{read_binary, read_csv, Ubodt, DEFAULT_MULTIPLIER};

use crate::cli_args::FmmArgs;
use crate::error::CliError;
use crate::network_io::read_network;
use crate::output::{parse_output_fields, MatchWriter};
use crate::settings::{apply_overrides, load_overrides};
use crate::trajectory_io::read_trajectories;

/// `fmm`: candidate search, UBODT lookup, Viterbi, and path
/// reconstruction for every trajectory in the input file, run across a
/// worker pool -- trajectories are the unit of work, Network and Ubodt
/// are shared immutable state.
pub fn run_fmm(args: &FmmArgs) -> Result<(), CliError> {
    let common = &args.common;

    let mut config = MatcherConfig {
        k: common.candidates,
        radius: common.radius,
        gps_error: common.error,
        reverse_tolerance: common.reverse_tolerance,
        ..MatcherConfig::default()
    };
    if let Some(path) = &common.config {
        config = apply_overrides(config, &load_overrides(path)?);
    }
    config.validate()?;

    log::info!("reading network from {}", common.network);
    let network = read_network(&common.network)?;

    log::info!("reading UBODT from {}", args.ubodt);
    let ubodt = read_ubodt(&args.ubodt, &network)?;
    log::info!("UBODT has {} records", ubodt.len());

    log::info!("reading trajectories from {}", common.gps);
    let trajectories = read_trajectories(&common.gps)?;
    log::info!("matching {} trajectories", trajectories.len());

    if let Some(jobs) = common.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .map_err(|e| CliError::MalformedRow(e.to_string()))?;
    }

    let fields = parse_output_fields(&common.output_fields)?;
    let out_file = File::create(&common.output)?;
    let writer = MatchWriter::new(out_file, fields)?;

    let matcher = FmmMatcher::new(&network, &ubodt, config);
    let bar = Mutex::new(
        Bar::builder()
            .total(trajectories.len())
            .desc("fmm")
            .build()
            .map_err(CliError::MalformedRow)?,
    );

    trajectories
        .par_iter()
        .try_for_each(|traj| -> Result<(), CliError> {
            match matcher.match_trajectory(traj.id, &traj.points) {
                Ok(result) => writer.write(&network, &result)?,
                Err(_) => writer.write_failed(traj.id)?,
            }
            let _ = bar.lock().expect("progress bar mutex poisoned").update(1);
            Ok(())
        })?;

    println!();
    log::info!("wrote {}", common.output);

    Ok(())
}

fn read_ubodt(path: &str, network: &mapmatch_core::network::Network) -> Result<Ubodt, CliError> {
    let binary = path.ends_with(".bin");
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    if binary {
        Ok(read_binary(reader, network, DEFAULT_MULTIPLIER)?)
    } else {
        Ok(read_csv(reader, network, DEFAULT_MULTIPLIER)?)
    }
}
