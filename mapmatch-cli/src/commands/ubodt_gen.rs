use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;

use mapmatch_core::graph::NetworkGraph;
use mapmatch_core::ubodt::{generate_ubodt, generate_ubodt_parallel, write_binary, write_csv};

use crate::cli_args::UbodtGenArgs;
use crate::error::CliError;
use crate::network_io::read_network;

/// `ubodt-gen`: builds the network and its graph, runs the per-source
/// bounded Dijkstra over every node, and writes the
/// resulting table in whichever codec the output extension selects.
pub fn run_ubodt_gen(args: &UbodtGenArgs) -> Result<(), CliError> {
    log::info!("reading network from {}", args.network);
    let network = read_network(&args.network)?;
    log::info!(
        "network has {} nodes, {} edges",
        network.n_nodes(),
        network.n_edges()
    );

    let graph = NetworkGraph::build(&network);

    let start = Instant::now();
    let table = if args.use_omp {
        log::info!("generating UBODT in parallel, delta={}", args.delta);
        generate_ubodt_parallel(&network, &graph, args.delta, args.multiplier)
    } else {
        log::info!("generating UBODT, delta={}", args.delta);
        generate_ubodt(&network, &graph, args.delta, args.multiplier)
    };
    log::info!(
        "generated {} records in {:.2}s",
        table.len(),
        start.elapsed().as_secs_f64()
    );

    let binary = args.output.ends_with(".bin");
    let file = File::create(&args.output)?;
    let writer = BufWriter::new(file);
    if binary {
        write_binary(writer, &table, &network)?;
    } else {
        write_csv(writer, &table, &network)?;
    }
    log::info!("wrote {}", args.output);

    Ok(())
}
