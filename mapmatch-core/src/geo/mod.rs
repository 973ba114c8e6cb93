//! 2D geometry primitives: points, linestrings, linear referencing and
//! segment cutting. The system is unit-agnostic -- the same `f64` values
//! are used whether the network is in planar meters or geographic degrees.

mod linestring;
mod point;
mod wkt_io;

pub use linestring::{cutoff, euclidean_segment_lengths, project_point_to_line, LineString, Projection};
pub use point::Point;
pub use wkt_io::{GeoError, wkt_read_linestring, wkt_read_point, wkt_write_linestring, wkt_write_point};
