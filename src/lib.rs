pub mod error;
pub mod math;
pub mod navigation;
pub mod triangulation;

pub use error::{GeometryError, GraphError, NavError, Result};
pub use math::Point2;
pub use navigation::{EdgeCost, MeshGraph, MeshGraphParams, NavPolygon, NodeId};
pub use triangulation::{Triangulate, Triangulation, TriangulationParams};
