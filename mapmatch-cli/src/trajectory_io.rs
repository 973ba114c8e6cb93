use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;

use mapmatch_core::geo::{wkt_read_linestring, Point};

use crate::error::CliError;

/// One input trajectory: its external id, the GPS points in observation
/// order, and optional per-point timestamps (same count as `points`).
pub struct Trajectory {
    pub id: i64,
    pub points: Vec<Point>,
    pub timestamps: Option<Vec<f64>>,
}

/// Reads GPS trajectories from a `;`-delimited CSV. Two input shapes are
/// accepted, distinguished by the header row:
///
/// - linestring-form: `id;geom[;timestamp]`, one row per trajectory.
/// - point-form: `id;x;y;timestamp`, one row per observation; rows
///   sharing an `id` are grouped into a trajectory and sorted by
///   `(id, timestamp)`.
pub fn read_trajectories(path: &str) -> Result<Vec<Trajectory>, CliError> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_reader(BufReader::new(file));

    let headers = reader.headers()?.clone();
    let has_geom = headers.iter().any(|h| h == "geom");

    if has_geom {
        read_linestring_form(&mut reader)
    } else {
        read_point_form(&mut reader)
    }
}

#[derive(serde::Deserialize)]
struct LineRow {
    id: i64,
    geom: String,
    timestamp: Option<String>,
}

fn read_linestring_form<R: std::io::Read>(
    reader: &mut csv::Reader<R>,
) -> Result<Vec<Trajectory>, CliError> {
    let mut out = Vec::new();
    for result in reader.deserialize() {
        let row: LineRow = result?;
        let line = wkt_read_linestring(&row.geom)?;
        let points = line.points().to_vec();

        let timestamps = match row.timestamp {
            Some(ts) if !ts.trim().is_empty() => {
                let parsed = parse_doubles(&ts, row.id)?;
                if parsed.len() != points.len() {
                    return Err(CliError::MalformedRow(format!(
                        "trajectory {}: {} timestamps for {} points",
                        row.id,
                        parsed.len(),
                        points.len()
                    )));
                }
                Some(parsed)
            }
            _ => None,
        };

        out.push(Trajectory {
            id: row.id,
            points,
            timestamps,
        });
    }
    Ok(out)
}

#[derive(serde::Deserialize)]
struct PointRow {
    id: i64,
    x: f64,
    y: f64,
    timestamp: f64,
}

fn read_point_form<R: std::io::Read>(
    reader: &mut csv::Reader<R>,
) -> Result<Vec<Trajectory>, CliError> {
    let mut grouped: BTreeMap<i64, Vec<(f64, Point)>> = BTreeMap::new();
    for result in reader.deserialize() {
        let row: PointRow = result?;
        grouped
            .entry(row.id)
            .or_default()
            .push((row.timestamp, Point::new(row.x, row.y)));
    }

    let mut out = Vec::with_capacity(grouped.len());
    for (id, mut rows) in grouped {
        rows.sort_by(|a, b| a.0.total_cmp(&b.0));
        let timestamps = rows.iter().map(|(t, _)| *t).collect();
        let points = rows.into_iter().map(|(_, p)| p).collect();
        out.push(Trajectory {
            id,
            points,
            timestamps: Some(timestamps),
        });
    }
    Ok(out)
}

fn parse_doubles(s: &str, trajectory_id: i64) -> Result<Vec<f64>, CliError> {
    s.split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| CliError::MalformedRow(format!("trajectory {trajectory_id}: bad timestamp '{v}'")))
        })
        .collect()
}
