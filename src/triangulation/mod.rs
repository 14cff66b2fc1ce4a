mod circumcircle;
mod delaunay;

pub use circumcircle::{in_circumcircle, Circumcircle};
pub use delaunay::Triangulate;

use crate::error::{GeometryError, Result};
use crate::math::polygon_2d::signed_area_2d;
use crate::math::Point2;
use crate::navigation::NavPolygon;

/// Parameters controlling Delaunay triangulation.
#[derive(Debug, Clone, Copy)]
pub struct TriangulationParams {
    /// Half-size of the enclosing super-triangle relative to the input extent.
    pub super_triangle_scale: f64,
    /// Lower bound on the super-triangle half-size, for tiny or single-point
    /// extents.
    pub min_super_triangle_radius: f64,
    /// Degenerate-circle threshold, relative to the squared extent of the
    /// input's bounding box.
    ///
    /// A triangle whose squared circumradius is at or below
    /// `degenerate_epsilon * extent^2` is never invalidated by later points.
    /// Scaling the whole input therefore scales the threshold with it.
    pub degenerate_epsilon: f64,
}

impl Default for TriangulationParams {
    fn default() -> Self {
        Self {
            super_triangle_scale: 100.0,
            min_super_triangle_radius: 10_000.0,
            degenerate_epsilon: f64::from(f32::EPSILON),
        }
    }
}

/// Output of a triangulation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Triangulation {
    /// Triangle vertex indices into the input point list (each triple defines a triangle).
    pub triangles: Vec<[usize; 3]>,
}

impl Triangulation {
    /// Number of triangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Returns `true` if no triangle was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Triangle indices flattened into one sequence of triples.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        self.triangles.iter().flatten().copied().collect()
    }

    /// Builds one navigation polygon per triangle from the triangulated points.
    ///
    /// Every polygon is wound counter-clockwise, whatever the order of the
    /// triangle's indices.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if an index is out of range for `points`.
    pub fn to_polygons(&self, points: &[Point2]) -> Result<Vec<NavPolygon>> {
        self.triangles
            .iter()
            .map(|tri| {
                let mut corners = tri
                    .iter()
                    .map(|&i| {
                        points.get(i).copied().ok_or_else(|| {
                            GeometryError::Degenerate(format!(
                                "triangle index {i} out of range for {} points",
                                points.len()
                            ))
                        })
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                if signed_area_2d(&corners) < 0.0 {
                    corners.reverse();
                }
                NavPolygon::new(corners)
            })
            .collect()
    }
}
