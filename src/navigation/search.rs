//! `petgraph` view of a [`MeshGraph`].
//!
//! The node arena is walked in place: node handles are the graph's node
//! identifiers and every edge is weighted with the configured [`EdgeCost`],
//! so the stock `petgraph::algo` searches run without copying the mesh.

use std::collections::HashSet;
use std::iter::Copied;
use std::slice;

use petgraph::visit::{
    Data, EdgeRef, GraphBase, IntoEdgeReferences, IntoEdges, IntoNeighbors, Visitable,
};

use super::{EdgeCost, GraphNode, MeshGraph, NodeId};

/// A directed view of one undirected mesh edge, carrying its cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshEdge {
    source: NodeId,
    target: NodeId,
    cost: f64,
}

impl EdgeRef for MeshEdge {
    type NodeId = NodeId;
    type EdgeId = (NodeId, NodeId);
    type Weight = f64;

    fn source(&self) -> NodeId {
        self.source
    }

    fn target(&self) -> NodeId {
        self.target
    }

    fn weight(&self) -> &f64 {
        &self.cost
    }

    fn id(&self) -> (NodeId, NodeId) {
        (self.source, self.target)
    }
}

impl GraphBase for MeshGraph {
    type NodeId = NodeId;
    type EdgeId = (NodeId, NodeId);
}

impl Data for MeshGraph {
    type NodeWeight = GraphNode;
    type EdgeWeight = f64;
}

impl Visitable for MeshGraph {
    type Map = HashSet<NodeId>;

    fn visit_map(&self) -> HashSet<NodeId> {
        HashSet::with_capacity(self.node_count())
    }

    fn reset_map(&self, map: &mut HashSet<NodeId>) {
        map.clear();
    }
}

impl<'a> IntoNeighbors for &'a MeshGraph {
    type Neighbors = Copied<slice::Iter<'a, NodeId>>;

    // Stale handles have no neighbors.
    fn neighbors(self, a: NodeId) -> Self::Neighbors {
        MeshGraph::neighbors(self, a).unwrap_or_default().iter().copied()
    }
}

impl<'a> IntoEdgeReferences for &'a MeshGraph {
    type EdgeRef = MeshEdge;
    type EdgeReferences = Box<dyn Iterator<Item = MeshEdge> + 'a>;

    /// Each undirected edge once, from the node with the smaller handle.
    fn edge_references(self) -> Self::EdgeReferences {
        Box::new(
            self.nodes()
                .flat_map(move |(id, _)| IntoEdges::edges(self, id))
                .filter(|edge| edge.source < edge.target),
        )
    }
}

impl<'a> IntoEdges for &'a MeshGraph {
    type Edges = Box<dyn Iterator<Item = MeshEdge> + 'a>;

    fn edges(self, a: NodeId) -> Self::Edges {
        let Ok(node) = self.node(a) else {
            return Box::new(std::iter::empty());
        };
        let edge_cost = self.params().edge_cost;
        let from = node.position;
        Box::new(node.neighbors().iter().filter_map(move |&b| {
            let to = self.position(b).ok()?;
            Some(MeshEdge {
                source: a,
                target: b,
                cost: edge_cost.evaluate(&from, &to),
            })
        }))
    }
}

impl MeshGraph {
    /// Lower bound on the cost of reaching `goal` from `node`.
    ///
    /// Straight-line distance only bounds linear costs; squared costs fall
    /// back to zero, which makes A* behave as Dijkstra's algorithm.
    pub(crate) fn estimate_remaining(&self, node: NodeId, goal: NodeId) -> f64 {
        match self.params().edge_cost {
            EdgeCost::SquaredDistance => 0.0,
            EdgeCost::Distance => self.cost_between(node, goal).unwrap_or(0.0),
        }
    }
}
