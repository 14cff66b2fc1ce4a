use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::math::Point2;

use super::circumcircle::{in_circumcircle, Circumcircle};
use super::{Triangulation, TriangulationParams};

/// An active triangle with its cached circumcircle.
#[derive(Debug, Clone, Copy)]
struct Cell {
    vertices: [usize; 3],
    circle: Circumcircle,
}

impl Cell {
    fn new(vertices: [usize; 3], points: &[Point2]) -> Self {
        let [a, b, c] = vertices;
        Self {
            vertices,
            circle: Circumcircle::through(&points[a], &points[b], &points[c]),
        }
    }

    /// Whether `point` invalidates this triangle: its circumcircle is not
    /// degenerate and strictly contains the point.
    fn conflicts_with(&self, point: &Point2, points: &[Point2], threshold: f64) -> bool {
        if self.circle.is_degenerate(threshold) {
            return false;
        }
        let [a, b, c] = self.vertices;
        in_circumcircle(&points[a], &points[b], &points[c], point)
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

/// Delaunay triangulation of an unordered point set.
///
/// Points are inserted one at a time in input order (Bowyer-Watson): every
/// triangle whose circumcircle strictly contains the new point is removed,
/// and the resulting cavity is fanned from the new point. A temporary
/// super-triangle encloses the input and is discarded at the end.
///
/// The in-circle test is exact, so cocircular input (regular polygons,
/// grids) still yields a cavity that is star-shaped around the new point.
///
/// Duplicate points are ignored. Collinear input yields no triangles.
pub struct Triangulate<'a> {
    points: &'a [Point2],
    params: TriangulationParams,
}

impl<'a> Triangulate<'a> {
    /// Creates a new `Triangulate` operation with default parameters.
    #[must_use]
    pub fn new(points: &'a [Point2]) -> Self {
        Self {
            points,
            params: TriangulationParams::default(),
        }
    }

    /// Overrides the triangulation parameters.
    #[must_use]
    pub fn with_params(mut self, params: TriangulationParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the triangulation.
    ///
    /// Returns `None` when fewer than three points are supplied. Triangle
    /// indices refer to positions in the input slice.
    #[must_use]
    pub fn execute(&self) -> Option<Triangulation> {
        let count = self.points.len();
        if count < 3 {
            return None;
        }

        let (center, extent) = bounds(self.points);
        let mut points = Vec::with_capacity(count + 3);
        points.extend_from_slice(self.points);
        points.extend(self.super_triangle(center, extent));

        let threshold = self.params.degenerate_epsilon * extent * extent;
        let mut cells = vec![Cell::new([count, count + 1, count + 2], &points)];
        let mut edges: Vec<(usize, usize)> = Vec::new();
        let mut seen: HashSet<(u64, u64)> = HashSet::with_capacity(count);

        for i in 0..count {
            let point = points[i];
            if !seen.insert(((point.x + 0.0).to_bits(), (point.y + 0.0).to_bits())) {
                trace!(point = i, "skipped duplicate point");
                continue;
            }

            let mut kept = Vec::with_capacity(cells.len() + 2);
            for cell in cells.drain(..) {
                if cell.conflicts_with(&point, &points, threshold) {
                    edges.extend(cell.edges());
                } else {
                    kept.push(cell);
                }
            }
            cells = kept;

            let removed = edges.len() / 3;
            retain_boundary_edges(&mut edges);

            for &(a, b) in &edges {
                cells.push(Cell::new([a, b, i], &points));
            }
            trace!(point = i, removed, added = edges.len(), "inserted point");
            edges.clear();
        }

        cells.retain(|cell| cell.vertices.iter().all(|&v| v < count));
        points.truncate(count);

        Some(Triangulation {
            triangles: cells.into_iter().map(|cell| cell.vertices).collect(),
        })
    }

    /// Three synthetic vertices enclosing every input point.
    fn super_triangle(&self, center: Point2, extent: f64) -> [Point2; 3] {
        let r = (extent * self.params.super_triangle_scale)
            .max(self.params.min_super_triangle_radius);
        [
            Point2::new(center.x, center.y - r),
            Point2::new(center.x + r, center.y + r),
            Point2::new(center.x - r, center.y + r),
        ]
    }
}

/// Center and largest side of the axis-aligned bounding box of `points`.
fn bounds(points: &[Point2]) -> (Point2, f64) {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let center = Point2::new((min_x + max_x) * 0.5, (min_y + max_y) * 0.5);
    (center, (max_x - min_x).max(max_y - min_y))
}

/// Drops every edge that occurs more than once, in either direction, keeping
/// the survivors in their original order.
///
/// Interior edges of a cavity are shared by exactly two removed triangles;
/// what is left is the cavity boundary.
fn retain_boundary_edges(edges: &mut Vec<(usize, usize)>) {
    let key = |&(a, b): &(usize, usize)| if a < b { (a, b) } else { (b, a) };
    let mut counts: HashMap<(usize, usize), usize> = HashMap::with_capacity(edges.len());
    for edge in edges.iter() {
        *counts.entry(key(edge)).or_insert(0) += 1;
    }
    edges.retain(|edge| counts.get(&key(edge)) == Some(&1));
}
