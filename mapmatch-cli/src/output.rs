use std::io::Write;
use std::sync::Mutex;

use mapmatch_core::geo::wkt_write_linestring;
use mapmatch_core::network::Network;
use mapmatch_core::result::MatchResult;

use crate::error::CliError;

/// The columns a caller may select, in the order the
/// `--output-fields` flag names them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputField {
    Id,
    Opath,
    Cpath,
    Tpath,
    Mgeom,
    Pgeom,
    Offset,
    Error,
    Spdist,
    Ep,
    Tp,
    Length,
}

impl OutputField {
    fn header(self) -> &'static str {
        match self {
            OutputField::Id => "id",
            OutputField::Opath => "opath",
            OutputField::Cpath => "cpath",
            OutputField::Tpath => "tpath",
            OutputField::Mgeom => "mgeom",
            OutputField::Pgeom => "pgeom",
            OutputField::Offset => "offset",
            OutputField::Error => "error",
            OutputField::Spdist => "spdist",
            OutputField::Ep => "ep",
            OutputField::Tp => "tp",
            OutputField::Length => "length",
        }
    }
}

pub fn parse_output_fields(spec: &str) -> Result<Vec<OutputField>, CliError> {
    spec.split(',')
        .map(|s| match s.trim() {
            "id" => Ok(OutputField::Id),
            "opath" => Ok(OutputField::Opath),
            "cpath" => Ok(OutputField::Cpath),
            "tpath" => Ok(OutputField::Tpath),
            "mgeom" => Ok(OutputField::Mgeom),
            "pgeom" => Ok(OutputField::Pgeom),
            "offset" => Ok(OutputField::Offset),
            "error" => Ok(OutputField::Error),
            "spdist" => Ok(OutputField::Spdist),
            "ep" => Ok(OutputField::Ep),
            "tp" => Ok(OutputField::Tp),
            "length" => Ok(OutputField::Length),
            other => Err(CliError::UnknownOutputField(other.to_string())),
        })
        .collect()
}

/// Serializes [`MatchResult`]s to the configured CSV columns. Writes are
/// serialized by a mutex around a single writer: each trajectory's row is
/// built locally and the lock is only held for the write itself.
pub struct MatchWriter<W: Write> {
    inner: Mutex<W>,
    fields: Vec<OutputField>,
}

impl<W: Write> MatchWriter<W> {
    pub fn new(mut writer: W, fields: Vec<OutputField>) -> Result<Self, CliError> {
        let header = fields
            .iter()
            .map(|f| f.header())
            .collect::<Vec<_>>()
            .join(";");
        writeln!(writer, "{header}")?;
        Ok(Self {
            inner: Mutex::new(writer),
            fields,
        })
    }

    /// Renders one result's row without touching the shared writer, then
    /// takes the lock only to append it.
    pub fn write(&self, network: &Network, result: &MatchResult) -> Result<(), CliError> {
        let row = render_row(&self.fields, network, result);
        let mut guard = self.inner.lock().expect("match writer mutex poisoned");
        writeln!(guard, "{row}")?;
        Ok(())
    }

    /// A trajectory rejected before matching even began (no candidate
    /// for some observation) or that timed out: an empty-path row with
    /// just the trajectory id populated, the documented sentinel for a
    /// per-trajectory failure.
    pub fn write_failed(&self, trajectory_id: i64) -> Result<(), CliError> {
        let empty = MatchResult::empty(trajectory_id);
        self.write_sentinel(&empty)
    }

    fn write_sentinel(&self, empty: &MatchResult) -> Result<(), CliError> {
        let row = self
            .fields
            .iter()
            .map(|f| match f {
                OutputField::Id => empty.trajectory_id.to_string(),
                _ => String::new(),
            })
            .collect::<Vec<_>>()
            .join(";");
        let mut guard = self.inner.lock().expect("match writer mutex poisoned");
        writeln!(guard, "{row}")?;
        Ok(())
    }
}

fn render_row(fields: &[OutputField], network: &Network, result: &MatchResult) -> String {
    fields
        .iter()
        .map(|f| render_field(*f, network, result))
        .collect::<Vec<_>>()
        .join(";")
}

fn render_field(field: OutputField, network: &Network, result: &MatchResult) -> String {
    match field {
        OutputField::Id => result.trajectory_id.to_string(),
        OutputField::Opath => join_ids(result.opath.iter().map(|e| e.0)),
        OutputField::Cpath => join_ids(result.cpath.iter().map(|e| e.0)),
        OutputField::Tpath => render_tpath(result),
        OutputField::Mgeom => wkt_write_linestring(&result.mgeom),
        OutputField::Pgeom => {
            let points = result
                .matched_candidates
                .iter()
                .map(|c| c.projected_point)
                .collect();
            wkt_write_linestring(&mapmatch_core::geo::LineString::new(points))
        }
        OutputField::Offset => join_f64(result.matched_candidates.iter().map(|c| c.offset)),
        OutputField::Error => join_f64(result.matched_candidates.iter().map(|c| c.error)),
        OutputField::Spdist => join_f64(result.matched_candidates.iter().map(|c| c.sp_dist)),
        OutputField::Ep => join_f64(result.matched_candidates.iter().map(|c| c.ep)),
        OutputField::Tp => join_f64(result.matched_candidates.iter().map(|c| c.tp)),
        OutputField::Length => join_f64(result.matched_candidates.iter().map(|c| {
            network
                .edge_index(c.edge_id)
                .and_then(|idx| network.edge(idx).ok())
                .map(|e| e.length)
                .unwrap_or(f64::NAN)
        })),
    }
}

fn join_ids<I: Iterator<Item = i64>>(ids: I) -> String {
    ids.map(|i| i.to_string()).collect::<Vec<_>>().join(",")
}

fn join_f64<I: Iterator<Item = f64>>(vals: I) -> String {
    vals.map(|v| v.to_string()).collect::<Vec<_>>().join(",")
}

/// `tpath[i]` is the comma-separated subpath of `cpath` spanning the gap
/// between observation `i` and `i+1`, read off `cpath_indices`.
fn render_tpath(result: &MatchResult) -> String {
    if result.cpath.is_empty() || result.cpath_indices.len() < 2 {
        return String::new();
    }
    let mut segments = Vec::with_capacity(result.cpath_indices.len() - 1);
    for w in result.cpath_indices.windows(2) {
        let (start, end) = (w[0], w[1]);
        let segment = result.cpath[start..=end]
            .iter()
            .map(|e| e.0.to_string())
            .collect::<Vec<_>>()
            .join(",");
        segments.push(segment);
    }
    segments.join("|")
}
