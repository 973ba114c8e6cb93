use std::fs::File;
use std::io::BufReader;

use mapmatch_core::geo::wkt_read_linestring;
use mapmatch_core::network::{EdgeId, EdgeInput, Network, NodeId};

use crate::error::CliError;

#[derive(serde::Deserialize)]
struct NetworkRow {
    id: i64,
    source: i64,
    target: i64,
    geom: String,
}

/// Reads a network edge table from a `;`-delimited CSV with header
/// `id;source;target;geom` and builds a [`Network`] from it. The one
/// concrete reader the CLI supplies; shapefile or other GIS ingestion
/// is left to upstream tooling.
pub fn read_network(path: &str) -> Result<Network, CliError> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_reader(BufReader::new(file));

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: NetworkRow = result?;
        let geom = wkt_read_linestring(&row.geom)?;
        rows.push(EdgeInput {
            id: EdgeId(row.id),
            source: NodeId(row.source),
            target: NodeId(row.target),
            geom,
        });
    }

    Ok(Network::build(rows)?)
}
