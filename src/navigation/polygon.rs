use crate::error::{GeometryError, Result};
use crate::math::distance_2d::centroid;
use crate::math::polygon_2d::{contains_point, is_convex, signed_area_2d};
use crate::math::Point2;

use super::NodeId;

/// A convex cell of the navigation mesh.
///
/// Convexity is a caller precondition and is not checked on construction;
/// [`is_convex`](Self::is_convex) is available for callers that want to
/// validate their input.
#[derive(Debug, Clone)]
pub struct NavPolygon {
    points: Vec<Point2>,
    graph_nodes: Vec<NodeId>,
}

impl NavPolygon {
    /// Creates a polygon from its ordered boundary points (either winding).
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if fewer than three points are given.
    pub fn new(points: Vec<Point2>) -> Result<Self> {
        if points.len() < 3 {
            return Err(GeometryError::Degenerate(format!(
                "polygon needs at least 3 points, got {}",
                points.len()
            ))
            .into());
        }
        Ok(Self {
            points,
            graph_nodes: Vec::new(),
        })
    }

    /// The ordered boundary points.
    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Mesh nodes sampled from this polygon, in registration order.
    ///
    /// Empty until the polygon is handed to a [`MeshGraph`](super::MeshGraph).
    #[must_use]
    pub fn graph_nodes(&self) -> &[NodeId] {
        &self.graph_nodes
    }

    /// Even-odd containment test. Boundary points follow the half-open rule
    /// of [`contains_point`].
    #[must_use]
    pub fn contains(&self, point: &Point2) -> bool {
        contains_point(&self.points, point)
    }

    /// Arithmetic mean of the vertices.
    #[must_use]
    pub fn centroid(&self) -> Point2 {
        // Construction guarantees a non-empty point list.
        centroid(&self.points).unwrap_or_else(Point2::origin)
    }

    /// Iterates over the boundary edges as `(previous, current)` pairs,
    /// starting with the closing edge from the last point to the first.
    pub fn edges(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[(i + n - 1) % n], self.points[i]))
    }

    /// Returns `true` if the boundary is convex.
    #[must_use]
    pub fn is_convex(&self) -> bool {
        is_convex(&self.points)
    }

    /// Enclosed area, independent of winding.
    #[must_use]
    pub fn area(&self) -> f64 {
        signed_area_2d(&self.points).abs()
    }

    pub(crate) fn clear_graph_nodes(&mut self) {
        self.graph_nodes.clear();
    }

    pub(crate) fn push_graph_node(&mut self, id: NodeId) {
        self.graph_nodes.push(id);
    }

    pub(crate) fn forget_graph_node(&mut self, id: NodeId) {
        self.graph_nodes.retain(|&n| n != id);
    }
}
