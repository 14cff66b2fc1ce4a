use crate::math::Point2;

slotmap::new_key_type! {
    /// Opaque handle to a node in a [`MeshGraph`](super::MeshGraph).
    pub struct NodeId;
}

/// Whether a node is part of the mesh itself or was attached for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A polygon vertex, edge midpoint or centroid.
    Mesh,
    /// An ephemeral start/end node attached by the caller.
    Query,
}

/// Data associated with a graph node.
#[derive(Debug, Clone)]
pub struct GraphNode {
    /// Position of the node.
    pub position: Point2,
    /// Mesh or query node.
    pub kind: NodeKind,
    /// Index of the owning polygon, if any.
    ///
    /// Mesh nodes shared between polygons record the first polygon that
    /// registered them. Query nodes record the polygon they attached to.
    pub polygon: Option<usize>,
    neighbors: Vec<NodeId>,
}

impl GraphNode {
    pub(crate) fn new(position: Point2, kind: NodeKind, polygon: Option<usize>) -> Self {
        Self {
            position,
            kind,
            polygon,
            neighbors: Vec::new(),
        }
    }

    /// Nodes connected to this one, in connection order.
    #[must_use]
    pub fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }

    /// Adds `other` to the adjacency list. Returns `false` if already present.
    pub(crate) fn link(&mut self, other: NodeId) -> bool {
        if self.neighbors.contains(&other) {
            return false;
        }
        self.neighbors.push(other);
        true
    }

    /// Clears the adjacency list, returning the former neighbors.
    pub(crate) fn take_links(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.neighbors)
    }

    pub(crate) fn unlink(&mut self, other: NodeId) {
        self.neighbors.retain(|&n| n != other);
    }
}
