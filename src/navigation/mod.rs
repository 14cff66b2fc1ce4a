mod mesh_graph;
mod node;
mod polygon;
mod search;

pub use mesh_graph::MeshGraph;
pub use node::{GraphNode, NodeId, NodeKind};
pub use polygon::NavPolygon;
pub use search::MeshEdge;

use crate::math::distance_2d::{distance, distance_squared};
use crate::math::Point2;

/// How the cost of an edge between two nodes is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeCost {
    /// Squared Euclidean distance.
    ///
    /// Paths with more, shorter hops are favored over fewer, longer ones,
    /// so results are not metrically shortest when hop counts differ.
    #[default]
    SquaredDistance,
    /// Euclidean distance. Yields true shortest paths over the node graph.
    Distance,
}

impl EdgeCost {
    /// Evaluates the cost of travelling from `a` to `b`.
    #[must_use]
    pub fn evaluate(self, a: &Point2, b: &Point2) -> f64 {
        match self {
            Self::SquaredDistance => distance_squared(a, b),
            Self::Distance => distance(a, b),
        }
    }
}

/// Parameters controlling mesh graph construction and search.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshGraphParams {
    /// Edge cost function used by path search.
    pub edge_cost: EdgeCost,
}
