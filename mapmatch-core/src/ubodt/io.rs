use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::network::{EdgeId, Network, NodeId};

use super::error::UbodtError;
use super::record::Record;
use super::table::Ubodt;

/// Binary record width: 5 little-endian i32 ids followed by an
/// IEEE-754 little-endian f64 cost.
const BINARY_RECORD_BYTES: usize = 5 * 4 + 8;
/// Average CSV row width used to estimate a row count from file size.
const CSV_ROW_BYTES: u64 = 36;

/// Estimates the number of rows a UBODT file holds from its byte size,
/// used to size the table's bucket count before reading it back.
pub fn estimate_rows(file_bytes: u64, binary: bool) -> usize {
    let row_bytes = if binary {
        BINARY_RECORD_BYTES as u64
    } else {
        CSV_ROW_BYTES
    };
    (file_bytes / row_bytes.max(1)) as usize
}

#[derive(Serialize, Deserialize)]
struct CsvRow {
    source: i64,
    target: i64,
    next_n: i64,
    prev_n: i64,
    next_e: i64,
    distance: f64,
}

pub fn write_csv<W: Write>(writer: W, ubodt: &Ubodt, network: &Network) -> Result<(), UbodtError> {
    let mut w = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(writer);
    w.write_record(["source", "target", "next_n", "prev_n", "next_e", "distance"])?;
    for record in ubodt.iter() {
        let row = CsvRow {
            source: network.node_id(record.source).0,
            target: network.node_id(record.target).0,
            next_n: network.node_id(record.first_n).0,
            prev_n: network.node_id(record.prev_n).0,
            next_e: network.edge(record.next_e)?.id.0,
            distance: record.cost,
        };
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}

pub fn read_csv<R: Read>(reader: R, network: &Network, multiplier: i64) -> Result<Ubodt, UbodtError> {
    let mut r = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_reader(reader);

    let mut rows: Vec<CsvRow> = Vec::new();
    for result in r.deserialize() {
        rows.push(result?);
    }

    let mut table = Ubodt::with_estimated_rows(rows.len(), multiplier);
    for row in rows {
        table.insert(csv_row_to_record(row, network)?);
    }
    Ok(table)
}

fn csv_row_to_record(row: CsvRow, network: &Network) -> Result<Record, UbodtError> {
    Ok(Record {
        source: network
            .node_index(NodeId(row.source))
            .ok_or(UbodtError::UnknownNode(NodeId(row.source)))?,
        target: network
            .node_index(NodeId(row.target))
            .ok_or(UbodtError::UnknownNode(NodeId(row.target)))?,
        first_n: network
            .node_index(NodeId(row.next_n))
            .ok_or(UbodtError::UnknownNode(NodeId(row.next_n)))?,
        prev_n: network
            .node_index(NodeId(row.prev_n))
            .ok_or(UbodtError::UnknownNode(NodeId(row.prev_n)))?,
        next_e: network
            .edge_index(EdgeId(row.next_e))
            .ok_or(UbodtError::UnknownEdge(EdgeId(row.next_e)))?,
        cost: row.distance,
    })
}

pub fn write_binary<W: Write>(mut writer: W, ubodt: &Ubodt, network: &Network) -> Result<(), UbodtError> {
    let mut buf = [0u8; BINARY_RECORD_BYTES];
    for record in ubodt.iter() {
        let source = network.node_id(record.source).0 as i32;
        let target = network.node_id(record.target).0 as i32;
        let next_n = network.node_id(record.first_n).0 as i32;
        let prev_n = network.node_id(record.prev_n).0 as i32;
        let next_e = network.edge(record.next_e)?.id.0 as i32;

        buf[0..4].copy_from_slice(&source.to_le_bytes());
        buf[4..8].copy_from_slice(&target.to_le_bytes());
        buf[8..12].copy_from_slice(&next_n.to_le_bytes());
        buf[12..16].copy_from_slice(&prev_n.to_le_bytes());
        buf[16..20].copy_from_slice(&next_e.to_le_bytes());
        buf[20..28].copy_from_slice(&record.cost.to_le_bytes());
        writer.write_all(&buf)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_binary<R: Read>(
    mut reader: R,
    network: &Network,
    multiplier: i64,
) -> Result<Ubodt, UbodtError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    if bytes.len() % BINARY_RECORD_BYTES != 0 {
        return Err(UbodtError::TruncatedRecord(bytes.len() % BINARY_RECORD_BYTES));
    }

    let row_count = bytes.len() / BINARY_RECORD_BYTES;
    let mut table = Ubodt::with_estimated_rows(row_count, multiplier);

    for chunk in bytes.chunks_exact(BINARY_RECORD_BYTES) {
        let source = i32::from_le_bytes(chunk[0..4].try_into().expect("4 bytes")) as i64;
        let target = i32::from_le_bytes(chunk[4..8].try_into().expect("4 bytes")) as i64;
        let next_n = i32::from_le_bytes(chunk[8..12].try_into().expect("4 bytes")) as i64;
        let prev_n = i32::from_le_bytes(chunk[12..16].try_into().expect("4 bytes")) as i64;
        let next_e = i32::from_le_bytes(chunk[16..20].try_into().expect("4 bytes")) as i64;
        let cost = f64::from_le_bytes(chunk[20..28].try_into().expect("8 bytes"));

        let record = Record {
            source: network
                .node_index(NodeId(source))
                .ok_or(UbodtError::UnknownNode(NodeId(source)))?,
            target: network
                .node_index(NodeId(target))
                .ok_or(UbodtError::UnknownNode(NodeId(target)))?,
            first_n: network
                .node_index(NodeId(next_n))
                .ok_or(UbodtError::UnknownNode(NodeId(next_n)))?,
            prev_n: network
                .node_index(NodeId(prev_n))
                .ok_or(UbodtError::UnknownNode(NodeId(prev_n)))?,
            next_e: network
                .edge_index(EdgeId(next_e))
                .ok_or(UbodtError::UnknownEdge(EdgeId(next_e)))?,
            cost,
        };
        table.insert(record);
    }

    Ok(table)
}

impl From<crate::network::NetworkError> for UbodtError {
    fn from(e: crate::network::NetworkError) -> Self {
        UbodtError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{LineString, Point};
    use crate::network::{EdgeInput, NodeIndex};

    fn line(pts: &[(f64, f64)]) -> LineString {
        LineString::new(pts.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    fn tiny_network() -> Network {
        let rows = vec![
            EdgeInput {
                id: EdgeId(100),
                source: NodeId(1),
                target: NodeId(2),
                geom: line(&[(0.0, 0.0), (1.0, 0.0)]),
            },
            EdgeInput {
                id: EdgeId(200),
                source: NodeId(2),
                target: NodeId(3),
                geom: line(&[(1.0, 0.0), (2.0, 0.0)]),
            },
        ];
        Network::build(rows).unwrap()
    }

    fn sample_table(network: &Network) -> Ubodt {
        let mut table = Ubodt::new(13, super::super::table::DEFAULT_MULTIPLIER);
        table.insert(Record {
            source: network.node_index(NodeId(1)).unwrap(),
            target: network.node_index(NodeId(3)).unwrap(),
            first_n: network.node_index(NodeId(2)).unwrap(),
            prev_n: network.node_index(NodeId(2)).unwrap(),
            next_e: network.edge_index(EdgeId(100)).unwrap(),
            cost: 2.0,
        });
        table
    }

    #[test]
    fn csv_round_trip_preserves_records() {
        let network = tiny_network();
        let table = sample_table(&network);

        let mut buf = Vec::new();
        write_csv(&mut buf, &table, &network).unwrap();

        let read_back = read_csv(buf.as_slice(), &network, super::super::table::DEFAULT_MULTIPLIER).unwrap();
        assert_eq!(read_back.len(), 1);
        let rec = read_back
            .lookup(NodeIndex(0), network.node_index(NodeId(3)).unwrap())
            .unwrap();
        assert_eq!(rec.cost, 2.0);
    }

    #[test]
    fn binary_round_trip_preserves_records() {
        let network = tiny_network();
        let table = sample_table(&network);

        let mut buf = Vec::new();
        write_binary(&mut buf, &table, &network).unwrap();
        assert_eq!(buf.len(), BINARY_RECORD_BYTES);

        let read_back =
            read_binary(buf.as_slice(), &network, super::super::table::DEFAULT_MULTIPLIER).unwrap();
        assert_eq!(read_back.len(), 1);
        let rec = read_back
            .lookup(NodeIndex(0), network.node_index(NodeId(3)).unwrap())
            .unwrap();
        assert_eq!(rec.cost, 2.0);
    }

    #[test]
    fn estimate_rows_uses_average_csv_width() {
        assert_eq!(estimate_rows(360, false), 10);
        assert_eq!(estimate_rows(BINARY_RECORD_BYTES as u64 * 4, true), 4);
    }
}
