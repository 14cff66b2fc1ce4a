use super::{Point2, TOLERANCE};

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Returns `true` if the closed polygon turns consistently in one direction.
///
/// Collinear vertices are tolerated. Fewer than three points is never convex.
#[must_use]
pub fn is_convex(points: &[Point2]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut turns_left: Option<bool> = None;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let cross = (b - a).perp(&(c - b));
        if cross.abs() < TOLERANCE {
            continue;
        }
        match turns_left {
            None => turns_left = Some(cross > 0.0),
            Some(left) if left != (cross > 0.0) => return false,
            Some(_) => {}
        }
    }
    turns_left.is_some()
}

/// Even-odd point-in-polygon test against a horizontal ray from `point`.
///
/// Comparisons are strict, so points exactly on an edge or vertex follow a
/// half-open rule: for an axis-aligned rectangle the minimum-x/minimum-y
/// boundary reports inside while the maximum-x/maximum-y boundary reports
/// outside. Callers must not rely on boundary membership either way.
#[must_use]
pub fn contains_point(points: &[Point2], point: &Point2) -> bool {
    let n = points.len();
    if n == 0 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = points[i];
        let pj = points[j];
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
