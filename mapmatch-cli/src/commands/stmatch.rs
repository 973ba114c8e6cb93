use std::fs::File;
use std::sync::Mutex;

use kdam::{Bar, BarExt};
use rayon::prelude::*;

use mapmatch_core::graph::NetworkGraph;
use mapmatch_core::matcher::{MatcherConfig, StmatchMatcher};

use crate::cli_args::StmatchArgs;
use crate::error::CliError;
use crate::network_io::read_network;
use crate::output::{parse_output_fields, MatchWriter};
use crate::settings::{apply_overrides, load_overrides};
use crate::trajectory_io::read_trajectories;

/// `stmatch`: candidate search, on-demand bounded Dijkstra over a
/// per-trajectory dummy-node composite graph, Viterbi, and path
/// reconstruction -- the UBODT-free counterpart to `fmm`.
pub fn run_stmatch(args: &StmatchArgs) -> Result<(), CliError> {
    let common = &args.common;

    let mut config = MatcherConfig {
        k: common.candidates,
        radius: common.radius,
        gps_error: common.error,
        reverse_tolerance: common.reverse_tolerance,
        vmax: args.vmax,
        factor: args.factor,
    };
    if let Some(path) = &common.config {
        config = apply_overrides(config, &load_overrides(path)?);
    }
    config.validate()?;

    log::info!("reading network from {}", common.network);
    let network = read_network(&common.network)?;
    log::info!(
        "network has {} nodes, {} edges",
        network.n_nodes(),
        network.n_edges()
    );
    let graph = NetworkGraph::build(&network);

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

    let matcher = StmatchMatcher::new(&network, &graph, config);
    let bar = Mutex::new(
        Bar::builder()
            .total(trajectories.len())
            .desc("stmatch")
            .build()
            .map_err(CliError::MalformedRow)?,
    );

    trajectories
        .par_iter()
        .try_for_each(|traj| -> Result<(), CliError> {
            let timestamps = traj.timestamps.as_deref();
            match matcher.match_trajectory(traj.id, &traj.points, timestamps) {
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
