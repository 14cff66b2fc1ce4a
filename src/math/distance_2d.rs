use super::{Point2, Vector2, TOLERANCE};
use crate::error::{GeometryError, Result};

/// Foot of the perpendicular from a point onto a bounded segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// The projected point on the segment.
    pub point: Point2,
    /// Scalar projection parameter along the segment, in `[0, 1]`.
    pub parameter: f64,
    /// Squared distance from the query point to `point`.
    pub distance_squared: f64,
}

/// Returns the Euclidean distance between two points.
#[must_use]
pub fn distance(a: &Point2, b: &Point2) -> f64 {
    nalgebra::distance(a, b)
}

/// Returns the squared Euclidean distance between two points.
#[must_use]
pub fn distance_squared(a: &Point2, b: &Point2) -> f64 {
    nalgebra::distance_squared(a, b)
}

/// Returns `v` scaled to unit length.
///
/// # Errors
///
/// Returns `GeometryError::ZeroVector` if `v` has (near) zero length.
pub fn normalize(v: &Vector2) -> Result<Vector2> {
    let len = v.norm();
    if len < TOLERANCE {
        return Err(GeometryError::ZeroVector.into());
    }
    Ok(v / len)
}

/// Returns the midpoint of segment `a`–`b`.
#[must_use]
pub fn midpoint(a: &Point2, b: &Point2) -> Point2 {
    nalgebra::center(a, b)
}

/// Returns the arithmetic mean of `points`, or `None` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn centroid(points: &[Point2]) -> Option<Point2> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector2::zeros(), |acc, p| acc + p.coords);
    Some(Point2::from(sum / points.len() as f64))
}

/// Projects `point` perpendicularly onto the segment `a`–`b`.
///
/// Unlike a clamped closest-point query, this returns `None` when the foot
/// of the perpendicular falls outside the segment (parameter outside
/// `[0, 1]`) or when the segment has zero length.
#[must_use]
pub fn project_onto_segment(point: &Point2, a: &Point2, b: &Point2) -> Option<SegmentProjection> {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return None;
    }

    let t = (point - a).dot(&ab) / len_sq;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }

    let foot = a + ab * t;
    Some(SegmentProjection {
        point: foot,
        parameter: t,
        distance_squared: distance_squared(point, &foot),
    })
}
