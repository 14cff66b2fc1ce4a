use std::cmp::Ordering;

use robust::{incircle, orient2d, Coord};

use crate::math::Point2;

/// Circle through the three vertices of a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circumcircle {
    /// Center of the circle.
    pub center: Point2,
    /// Squared radius.
    pub radius_squared: f64,
}

impl Circumcircle {
    /// Computes the circumcircle from the intersection of the perpendicular
    /// bisectors of chords `p1`–`p2` and `p1`–`p3`.
    ///
    /// Collinear input produces a non-finite center or radius, which
    /// [`is_degenerate`](Self::is_degenerate) reports.
    #[must_use]
    #[allow(clippy::many_single_char_names)]
    pub fn through(p1: &Point2, p2: &Point2, p3: &Point2) -> Self {
        let a = p2.x - p1.x;
        let b = p2.y - p1.y;
        let c = p3.x - p1.x;
        let d = p3.y - p1.y;

        let e = a * (p1.x + p2.x) + b * (p1.y + p2.y);
        let f = c * (p1.x + p3.x) + d * (p1.y + p3.y);

        let g = 2.0 * (a * (p3.y - p2.y) - b * (p3.x - p2.x));

        let center = Point2::new((d * e - b * f) / g, (a * f - c * e) / g);
        let dx = center.x - p1.x;
        let dy = center.y - p1.y;

        Self {
            center,
            radius_squared: dx * dx + dy * dy,
        }
    }

    /// Returns `true` unless the squared radius is finite and above `epsilon`.
    #[must_use]
    pub fn is_degenerate(&self, epsilon: f64) -> bool {
        !(self.radius_squared.is_finite() && self.radius_squared > epsilon)
    }
}

fn coord(p: &Point2) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}

/// Exact test for `d` lying strictly inside the circle through `a`, `b`, `c`.
///
/// Works for either winding of the triangle. Points on the circle, and any
/// point tested against a collinear triangle, report `false`.
#[must_use]
pub fn in_circumcircle(a: &Point2, b: &Point2, c: &Point2, d: &Point2) -> bool {
    let orientation = orient2d(coord(a), coord(b), coord(c));
    let det = incircle(coord(a), coord(b), coord(c), coord(d));
    match orientation.partial_cmp(&0.0) {
        Some(Ordering::Greater) => det > 0.0,
        Some(Ordering::Less) => det < 0.0,
        _ => false,
    }
}
