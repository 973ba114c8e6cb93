use wkt::TryFromWkt;

use super::linestring::LineString;
use super::point::Point;

#[derive(thiserror::Error, Debug)]
pub enum GeoError {
    #[error("failed to parse WKT: {0}")]
    ParseError(String),
}

/// Parses a `POINT` WKT string.
pub fn wkt_read_point(s: &str) -> Result<Point, GeoError> {
    let geo: geo_types::Point<f64> =
        geo_types::Point::try_from_wkt_str(s).map_err(|e| GeoError::ParseError(e.to_string()))?;
    Ok(Point::new(geo.x(), geo.y()))
}

/// Parses a `LINESTRING` WKT string.
pub fn wkt_read_linestring(s: &str) -> Result<LineString, GeoError> {
    let geo: geo_types::LineString<f64> = geo_types::LineString::try_from_wkt_str(s)
        .map_err(|e| GeoError::ParseError(e.to_string()))?;
    let points = geo
        .points()
        .map(|p| Point::new(p.x(), p.y()))
        .collect::<Vec<_>>();
    Ok(LineString::new(points))
}

/// Writes a point as `POINT(x y)`.
pub fn wkt_write_point(p: &Point) -> String {
    format!("POINT({} {})", p.x, p.y)
}

/// Writes a linestring as `LINESTRING(x0 y0, x1 y1, ...)`.
pub fn wkt_write_linestring(l: &LineString) -> String {
    let coords = l
        .points()
        .iter()
        .map(|p| format!("{} {}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(", ");
    format!("LINESTRING({coords})")
}
