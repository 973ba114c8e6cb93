use serde::{Deserialize, Serialize};

use super::point::Point;

/// An ordered, finite sequence of points. Edges require at least two
/// points. `length` is maintained as the invariant `length == sum of
/// Euclidean segment lengths`.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct LineString {
    points: Vec<Point>,
    #[serde(skip)]
    length: f64,
}

impl LineString {
    pub fn new(points: Vec<Point>) -> Self {
        let length = sum_segment_lengths(&points);
        Self { points, length }
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn point_at(&self, i: usize) -> Point {
        self.points[i]
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn add_point(&mut self, p: Point) {
        if let Some(&last) = self.points.last() {
            self.length += last.distance(&p);
        }
        self.points.push(p);
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }
}

fn sum_segment_lengths(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| w[0].distance(&w[1]))
        .sum()
}

/// The result of projecting a point onto a linestring: the perpendicular
/// distance (`error`), the distance along the linestring from its first
/// point to the projection (`offset`), and the projected point itself.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projection {
    pub error: f64,
    pub offset: f64,
    pub point: Point,
}

/// Projects `p` onto `line`, returning the closest point on any segment,
/// the perpendicular distance to it, and the along-line offset of that
/// point from the line's start.
///
/// Each segment `p1 -> p2` is handled by clamping the projection ratio
/// `r = ((p - p1) . (p2 - p1)) / |p2 - p1|^2` to `[0, 1]`. A degenerate
/// (zero-length) segment is treated as `r = 0`, i.e. the segment's single
/// point. Ties in `error` across segments keep the earlier segment.
pub fn project_point_to_line(p: &Point, line: &LineString) -> Projection {
    let pts = line.points();
    debug_assert!(pts.len() >= 2, "linestring must have at least 2 points");

    let mut best: Option<Projection> = None;
    let mut cumulative = 0.0;

    for w in pts.windows(2) {
        let (p1, p2) = (w[0], w[1]);
        let seg_len = p1.distance(&p2);

        let (r, proj) = if seg_len == 0.0 {
            (0.0, p1)
        } else {
            let dx = p2.x - p1.x;
            let dy = p2.y - p1.y;
            let t = ((p.x - p1.x) * dx + (p.y - p1.y) * dy) / (dx * dx + dy * dy);
            let r = t.clamp(0.0, 1.0);
            (r, Point::new(p1.x + r * dx, p1.y + r * dy))
        };

        let error = p.distance(&proj);
        let offset = cumulative + r * seg_len;

        let better = match &best {
            None => true,
            Some(b) => error < b.error,
        };
        if better {
            best = Some(Projection {
                error,
                offset,
                point: proj,
            });
        }

        cumulative += seg_len;
    }

    best.expect("linestring has at least one segment")
}

/// Returns the sub-linestring of `line` spanning offsets `[a, b]`, where
/// `0 <= a <= b <= line.length()`. A vertex that falls exactly at `a` or
/// `b` is emitted once; interior cut points are inserted by interpolating
/// along the enclosing segment.
pub fn cutoff(line: &LineString, a: f64, b: f64) -> LineString {
    debug_assert!(a <= b);
    let pts = line.points();
    let mut out: Vec<Point> = Vec::new();
    let mut cumulative = 0.0;

    for w in pts.windows(2) {
        let (p1, p2) = (w[0], w[1]);
        let seg_len = p1.distance(&p2);
        let seg_start = cumulative;
        let seg_end = cumulative + seg_len;

        // Emit p1 if it lands inside [a, b] and hasn't been emitted yet.
        if seg_start >= a && seg_start <= b && out.last() != Some(&p1) {
            out.push(p1);
        }

        if seg_len > 0.0 {
            // Cut point at offset `a` within this segment.
            if a > seg_start && a < seg_end {
                let r = (a - seg_start) / seg_len;
                let cut = Point::new(p1.x + r * (p2.x - p1.x), p1.y + r * (p2.y - p1.y));
                if out.last() != Some(&cut) {
                    out.push(cut);
                }
            }
            // Cut point at offset `b` within this segment.
            if b > seg_start && b < seg_end {
                let r = (b - seg_start) / seg_len;
                let cut = Point::new(p1.x + r * (p2.x - p1.x), p1.y + r * (p2.y - p1.y));
                if out.last() != Some(&cut) {
                    out.push(cut);
                }
            }
        }

        if seg_end >= a && seg_end <= b && out.last() != Some(&p2) {
            out.push(p2);
        }

        cumulative = seg_end;
    }

    if out.len() < 2 {
        // `a == b` on a single vertex, or a zero-length cut: duplicate the
        // lone point so the result remains a valid (degenerate) linestring.
        if let Some(&only) = out.first() {
            out.push(only);
        }
    }

    LineString::new(out)
}


/// Euclidean segment lengths of a raw point sequence (the `n-1` gaps
/// between consecutive trajectory observations), used as the HMM
/// transition-probability denominators.
pub fn euclidean_segment_lengths(points: &[Point]) -> Vec<f64> {
    points.windows(2).map(|w| w[0].distance(&w[1])).collect()
}
