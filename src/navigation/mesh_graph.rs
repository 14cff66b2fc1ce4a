use std::collections::HashMap;

use petgraph::algo::astar;
use petgraph::visit::EdgeRef;
use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::error::{GraphError, Result};
use crate::math::distance_2d::{distance, midpoint, project_onto_segment};
use crate::math::Point2;

use super::{GraphNode, MeshGraphParams, NavPolygon, NodeId, NodeKind};

/// Exact-equality key for deduplicating sample points.
///
/// No tolerance is applied: points that differ in the last bit produce
/// distinct nodes. `-0.0` and `0.0` are treated as equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PointKey(u64, u64);

impl From<Point2> for PointKey {
    fn from(p: Point2) -> Self {
        Self((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
    }
}

/// A weighted undirected graph of sample points over a set of convex polygons.
///
/// Every polygon contributes its vertices, edge midpoints and centroid as
/// nodes, each connected to every other sample of the same polygon. Arbitrary
/// points are attached as query nodes and moved onto the mesh if they lie
/// outside it, so a path between two query nodes never leaves the polygons.
///
/// Replacing the polygon set rebuilds the graph from scratch and invalidates
/// every previously issued [`NodeId`], query nodes included.
#[derive(Debug, Default)]
pub struct MeshGraph {
    polygons: Vec<NavPolygon>,
    nodes: SlotMap<NodeId, GraphNode>,
    params: MeshGraphParams,
}

impl MeshGraph {
    /// Builds a graph over `polygons` with default parameters.
    #[must_use]
    pub fn new(polygons: Vec<NavPolygon>) -> Self {
        Self::with_params(polygons, MeshGraphParams::default())
    }

    /// Builds a graph over `polygons` with the given parameters.
    #[must_use]
    pub fn with_params(polygons: Vec<NavPolygon>, params: MeshGraphParams) -> Self {
        let mut graph = Self {
            polygons,
            nodes: SlotMap::with_key(),
            params,
        };
        graph.reset_nodes_for_polygons();
        graph
    }

    /// The polygons making up the mesh.
    #[must_use]
    pub fn polygons(&self) -> &[NavPolygon] {
        &self.polygons
    }

    /// The parameters this graph was built with.
    #[must_use]
    pub fn params(&self) -> MeshGraphParams {
        self.params
    }

    /// Replaces the polygon set and rebuilds every node.
    pub fn set_polygons(&mut self, polygons: Vec<NavPolygon>) {
        self.polygons = polygons;
        self.reset_nodes_for_polygons();
    }

    // --- Node access ---

    /// Returns the node data, or an error if the handle is stale.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownNode` if the node is not in the graph.
    pub fn node(&self, id: NodeId) -> Result<&GraphNode> {
        self.nodes.get(id).ok_or_else(|| GraphError::UnknownNode.into())
    }

    /// Returns the position of a node.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownNode` if the node is not in the graph.
    pub fn position(&self, id: NodeId) -> Result<Point2> {
        Ok(self.node(id)?.position)
    }

    /// Returns the nodes connected to `id`.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownNode` if the node is not in the graph.
    pub fn neighbors(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(self.node(id)?.neighbors())
    }

    /// Iterates over every node in the graph.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &GraphNode)> {
        self.nodes.iter()
    }

    /// Number of nodes, mesh and query alike.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.neighbors().len()).sum::<usize>() / 2
    }

    /// Cost of the edge between two nodes under the configured [`EdgeCost`](super::EdgeCost).
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownNode` if either node is not in the graph.
    pub fn cost_between(&self, a: NodeId, b: NodeId) -> Result<f64> {
        let pa = self.position(a)?;
        let pb = self.position(b)?;
        Ok(self.params.edge_cost.evaluate(&pa, &pb))
    }

    /// Index of the first polygon containing `point`.
    #[must_use]
    pub fn polygon_containing(&self, point: &Point2) -> Option<usize> {
        self.polygons.iter().position(|p| p.contains(point))
    }

    // --- Query nodes ---

    /// Adds an unconnected query node at `point`.
    pub fn add_node(&mut self, point: Point2) -> NodeId {
        self.nodes.insert(GraphNode::new(point, NodeKind::Query, None))
    }

    /// Connects a query node to the closest point on the navigation mesh.
    ///
    /// Links from an earlier connection are dropped first, so a moved query
    /// node can be reconnected in place. If a polygon contains the node it keeps its position and is connected
    /// to that polygon's samples. Otherwise the node is moved to the nearest
    /// perpendicular foot on any polygon edge and connected to the samples of
    /// the polygon owning that edge. Returns the (possibly moved) position.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownNode` if the node is not in the graph,
    /// `GraphError::NotAQueryNode` if it is a mesh sample,
    /// `GraphError::EmptyMesh` if there are no polygons, or
    /// `GraphError::UnattachablePoint` if no polygon contains the point and
    /// no edge admits a perpendicular foot for it.
    pub fn connect_node_to_closest_point(&mut self, id: NodeId) -> Result<Point2> {
        let node = self.node(id)?;
        if node.kind != NodeKind::Query {
            return Err(GraphError::NotAQueryNode.into());
        }
        let position = node.position;
        if self.polygons.is_empty() {
            return Err(GraphError::EmptyMesh.into());
        }

        let (polygon, snapped) = if let Some(index) = self.polygon_containing(&position) {
            debug!(polygon = index, "query node inside mesh");
            (index, position)
        } else {
            let Some((index, foot)) = self.closest_edge_projection(&position) else {
                warn!(x = position.x, y = position.y, "point has no projection onto the mesh");
                return Err(GraphError::UnattachablePoint {
                    x: position.x,
                    y: position.y,
                }
                .into());
            };
            debug!(
                polygon = index,
                moved = distance(&position, &foot),
                "query node snapped to mesh edge"
            );
            (index, foot)
        };

        self.disconnect(id);
        if let Some(node) = self.nodes.get_mut(id) {
            node.position = snapped;
            node.polygon = Some(polygon);
        }
        let samples = self.polygons[polygon].graph_nodes().to_vec();
        for other in samples {
            self.connect(id, other);
        }
        Ok(snapped)
    }

    /// Adds a query node at `point` and connects it to the mesh.
    ///
    /// Returns the handle and the snapped position. On failure nothing is
    /// left behind in the graph.
    ///
    /// # Errors
    ///
    /// See [`connect_node_to_closest_point`](Self::connect_node_to_closest_point).
    pub fn attach(&mut self, point: Point2) -> Result<(NodeId, Point2)> {
        let id = self.add_node(point);
        match self.connect_node_to_closest_point(id) {
            Ok(snapped) => Ok((id, snapped)),
            Err(e) => {
                self.nodes.remove(id);
                Err(e)
            }
        }
    }

    /// Removes a node and every edge touching it.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownNode` if the node is not in the graph.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        let node = self.nodes.remove(id).ok_or(GraphError::UnknownNode)?;
        for &other in node.neighbors() {
            if let Some(n) = self.nodes.get_mut(other) {
                n.unlink(id);
            }
        }
        if node.kind == NodeKind::Mesh {
            for polygon in &mut self.polygons {
                polygon.forget_graph_node(id);
            }
        }
        Ok(())
    }

    /// Removes several nodes.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownNode` at the first handle not in the graph;
    /// handles before it have already been removed.
    pub fn remove_nodes(&mut self, ids: &[NodeId]) -> Result<()> {
        for &id in ids {
            self.remove_node(id)?;
        }
        Ok(())
    }

    // --- Path queries ---

    /// Finds a path between two nodes.
    ///
    /// If both positions lie in the same polygon the straight two-node path
    /// is returned without searching. Otherwise the graph is searched using
    /// the configured edge cost. An unreachable goal yields an empty path.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownNode` if either node is not in the graph.
    pub fn find_path(&self, start: NodeId, end: NodeId) -> Result<Vec<NodeId>> {
        let from = self.position(start)?;
        let to = self.position(end)?;

        if self
            .polygons
            .iter()
            .any(|p| p.contains(&from) && p.contains(&to))
        {
            return Ok(vec![start, end]);
        }

        debug!(nodes = self.nodes.len(), "searching mesh graph");
        let found = astar(
            self,
            start,
            |node| node == end,
            |edge| *edge.weight(),
            |node| self.estimate_remaining(node, end),
        );
        Ok(found.map(|(_, path)| path).unwrap_or_default())
    }

    /// Like [`find_path`](Self::find_path) but returns node positions.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownNode` if either node is not in the graph.
    pub fn find_path_positions(&self, start: NodeId, end: NodeId) -> Result<Vec<Point2>> {
        self.find_path(start, end)?
            .into_iter()
            .map(|id| self.position(id))
            .collect()
    }

    /// Attaches `from` and `to`, finds a path between them and detaches both
    /// again. The first and last positions are the snapped endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if either point cannot be attached.
    pub fn plan_path(&mut self, from: Point2, to: Point2) -> Result<Vec<Point2>> {
        let (start, _) = self.attach(from)?;
        let (end, _) = match self.attach(to) {
            Ok(attached) => attached,
            Err(e) => {
                self.remove_node(start)?;
                return Err(e);
            }
        };
        let path = self.find_path_positions(start, end);
        self.remove_nodes(&[start, end])?;
        path
    }

    // --- Construction ---

    /// Discards every node and resamples all polygons.
    fn reset_nodes_for_polygons(&mut self) {
        self.nodes.clear();

        let mut point_to_node: HashMap<PointKey, NodeId> = HashMap::new();
        for index in 0..self.polygons.len() {
            self.polygons[index].clear_graph_nodes();
            let points = self.polygons[index].points().to_vec();
            let Some(&first_last) = points.last() else {
                continue;
            };

            let mut last = first_last;
            for &point in &points {
                self.add_point(point, index, &mut point_to_node);
                self.add_point(midpoint(&point, &last), index, &mut point_to_node);
                last = point;
            }
            let centroid = self.polygons[index].centroid();
            self.add_point(centroid, index, &mut point_to_node);
        }

        debug!(
            polygons = self.polygons.len(),
            nodes = self.nodes.len(),
            edges = self.edge_count(),
            "rebuilt navigation mesh graph"
        );
    }

    /// Registers a sample point of polygon `index`, reusing an existing node
    /// at the exact same coordinates, and connects it to the polygon's other
    /// samples.
    fn add_point(
        &mut self,
        point: Point2,
        index: usize,
        point_to_node: &mut HashMap<PointKey, NodeId>,
    ) {
        let nodes = &mut self.nodes;
        let id = *point_to_node
            .entry(PointKey::from(point))
            .or_insert_with(|| nodes.insert(GraphNode::new(point, NodeKind::Mesh, Some(index))));

        let existing = self.polygons[index].graph_nodes().to_vec();
        if existing.contains(&id) {
            return;
        }
        for other in existing {
            self.connect(id, other);
        }
        self.polygons[index].push_graph_node(id);
    }

    fn connect(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        if let Some(node) = self.nodes.get_mut(a) {
            node.link(b);
        }
        if let Some(node) = self.nodes.get_mut(b) {
            node.link(a);
        }
    }

    /// Removes every edge touching `id`, keeping the node itself.
    fn disconnect(&mut self, id: NodeId) {
        let old = self
            .nodes
            .get_mut(id)
            .map(GraphNode::take_links)
            .unwrap_or_default();
        for other in old {
            if let Some(node) = self.nodes.get_mut(other) {
                node.unlink(id);
            }
        }
    }

    /// Nearest perpendicular foot over every edge of every polygon.
    fn closest_edge_projection(&self, point: &Point2) -> Option<(usize, Point2)> {
        let mut best: Option<(usize, Point2, f64)> = None;
        for (index, polygon) in self.polygons.iter().enumerate() {
            for (a, b) in polygon.edges() {
                let Some(proj) = project_onto_segment(point, &a, &b) else {
                    continue;
                };
                if best.is_none_or(|(_, _, d)| proj.distance_squared < d) {
                    best = Some((index, proj.point, proj.distance_squared));
                }
            }
        }
        best.map(|(index, foot, _)| (index, foot))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::navigation::EdgeCost;
    use approx::assert_relative_eq;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> NavPolygon {
        NavPolygon::new(vec![
            Point2::new(x0, y0),
            Point2::new(x0, y1),
            Point2::new(x1, y1),
            Point2::new(x1, y0),
        ])
        .unwrap()
    }

    fn square() -> MeshGraph {
        MeshGraph::new(vec![rect(0.0, 0.0, 100.0, 100.0)])
    }

    fn two_squares(params: MeshGraphParams) -> MeshGraph {
        MeshGraph::with_params(
            vec![rect(0.0, 0.0, 100.0, 100.0), rect(100.0, 0.0, 200.0, 100.0)],
            params,
        )
    }

    fn by_coords(a: &Point2, b: &Point2) -> std::cmp::Ordering {
        a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
    }

    /// Node positions with their neighbor positions, sorted so that slot
    /// reuse in the arena does not affect comparison.
    fn signature(graph: &MeshGraph) -> Vec<(Point2, Vec<Point2>)> {
        let mut sig: Vec<(Point2, Vec<Point2>)> = graph
            .nodes()
            .map(|(_, n)| {
                let mut adj: Vec<Point2> = n
                    .neighbors()
                    .iter()
                    .map(|&id| graph.position(id).unwrap())
                    .collect();
                adj.sort_by(by_coords);
                (n.position, adj)
            })
            .collect();
        sig.sort_by(|a, b| by_coords(&a.0, &b.0));
        sig
    }

    // ── construction ──

    #[test]
    fn single_polygon_samples() {
        let graph = square();
        // 4 vertices + 4 midpoints + centroid, fully connected.
        assert_eq!(graph.node_count(), 9);
        assert_eq!(graph.edge_count(), 36);
        assert_eq!(graph.polygons()[0].graph_nodes().len(), 9);
        assert!(graph
            .nodes()
            .all(|(_, n)| n.kind == NodeKind::Mesh && n.polygon == Some(0)));
    }

    #[test]
    fn samples_of_a_polygon_are_fully_connected() {
        let graph = two_squares(MeshGraphParams::default());
        for polygon in graph.polygons() {
            let samples = polygon.graph_nodes();
            for &a in samples {
                for &b in samples {
                    if a != b {
                        assert!(graph.neighbors(a).unwrap().contains(&b));
                    }
                }
            }
        }
    }

    #[test]
    fn shared_samples_are_deduplicated() {
        let graph = two_squares(MeshGraphParams::default());
        // (100,0), (100,50) and (100,100) are shared.
        assert_eq!(graph.node_count(), 15);
        assert_eq!(graph.edge_count(), 36 + 36 - 3);
        let shared = graph
            .nodes()
            .find(|(_, n)| n.position == Point2::new(100.0, 50.0))
            .unwrap();
        assert_eq!(shared.1.polygon, Some(0));
        assert_eq!(shared.1.neighbors().len(), 14);
    }

    #[test]
    fn rebuild_is_deterministic() {
        let mut graph = two_squares(MeshGraphParams::default());
        let before = signature(&graph);
        graph.set_polygons(vec![rect(0.0, 0.0, 100.0, 100.0), rect(100.0, 0.0, 200.0, 100.0)]);
        assert_eq!(signature(&graph), before);
        assert_eq!(graph.node_count(), 15);
    }

    #[test]
    fn rebuild_invalidates_query_nodes() {
        let mut graph = square();
        let (id, _) = graph.attach(Point2::new(10.0, 10.0)).unwrap();
        graph.set_polygons(vec![rect(0.0, 0.0, 50.0, 50.0)]);
        assert!(graph.node(id).is_err());
        assert_eq!(graph.node_count(), 9);
    }

    // ── attach ──

    #[test]
    fn attach_inside_keeps_position() {
        let mut graph = square();
        let (id, snapped) = graph.attach(Point2::new(50.0, 50.0)).unwrap();
        assert_eq!(snapped, Point2::new(50.0, 50.0));
        let node = graph.node(id).unwrap();
        assert_eq!(node.kind, NodeKind::Query);
        assert_eq!(node.polygon, Some(0));
        assert_eq!(node.neighbors().len(), 9);
        assert_eq!(graph.node_count(), 10);
    }

    #[test]
    fn attach_outside_snaps_to_edge() {
        let mut graph = square();
        let (id, snapped) = graph.attach(Point2::new(200.0, 50.0)).unwrap();
        assert_relative_eq!(snapped.x, 100.0);
        assert_relative_eq!(snapped.y, 50.0);
        assert_eq!(graph.position(id).unwrap(), snapped);
        assert_eq!(graph.neighbors(id).unwrap().len(), 9);
    }

    #[test]
    fn attach_picks_nearest_polygon_edge() {
        let mut graph = MeshGraph::new(vec![
            rect(0.0, 0.0, 100.0, 100.0),
            rect(300.0, 0.0, 400.0, 100.0),
        ]);
        let (id, snapped) = graph.attach(Point2::new(280.0, 20.0)).unwrap();
        assert_relative_eq!(snapped.x, 300.0);
        assert_relative_eq!(snapped.y, 20.0);
        assert_eq!(graph.node(id).unwrap().polygon, Some(1));
    }

    #[test]
    fn attach_beyond_corner_is_unattachable() {
        let mut graph = square();
        let err = graph.attach(Point2::new(200.0, 200.0)).unwrap_err();
        assert!(matches!(
            err,
            crate::NavError::Graph(GraphError::UnattachablePoint { .. })
        ));
        assert_eq!(graph.node_count(), 9);
    }

    #[test]
    fn attach_to_empty_mesh() {
        let mut graph = MeshGraph::new(Vec::new());
        assert!(matches!(
            graph.attach(Point2::new(0.0, 0.0)),
            Err(crate::NavError::Graph(GraphError::EmptyMesh))
        ));
    }

    #[test]
    fn reconnecting_a_query_node_does_not_duplicate_edges() {
        let mut graph = square();
        let (id, _) = graph.attach(Point2::new(200.0, 50.0)).unwrap();
        let edges = graph.edge_count();
        let again = graph.connect_node_to_closest_point(id).unwrap();
        assert_eq!(again, Point2::new(100.0, 50.0));
        assert_eq!(graph.neighbors(id).unwrap().len(), 9);
        assert_eq!(graph.edge_count(), edges);
        for (other, node) in graph.nodes() {
            if other != id {
                assert_eq!(node.neighbors().iter().filter(|&&n| n == id).count(), 1);
            }
        }
    }

    #[test]
    fn mesh_nodes_cannot_be_attached() {
        let mut graph = two_squares(MeshGraphParams::default());
        let before = signature(&graph);
        let (shared, _) = graph
            .nodes()
            .find(|(_, n)| n.position == Point2::new(100.0, 50.0))
            .unwrap();
        assert!(matches!(
            graph.connect_node_to_closest_point(shared),
            Err(crate::NavError::Graph(GraphError::NotAQueryNode))
        ));
        assert_eq!(signature(&graph), before);
        assert_eq!(graph.node(shared).unwrap().polygon, Some(0));
    }

    // ── removal ──

    #[test]
    fn remove_query_nodes_restores_mesh() {
        let mut graph = square();
        let before = signature(&graph);
        let (a, _) = graph.attach(Point2::new(10.0, 10.0)).unwrap();
        let (b, _) = graph.attach(Point2::new(90.0, 90.0)).unwrap();
        graph.remove_nodes(&[a, b]).unwrap();
        assert_eq!(signature(&graph), before);
        assert!(graph.remove_node(a).is_err());
    }

    #[test]
    fn remove_mesh_node_scrubs_polygon() {
        let mut graph = square();
        let centroid = graph.polygons()[0].graph_nodes()[8];
        graph.remove_node(centroid).unwrap();
        assert_eq!(graph.polygons()[0].graph_nodes().len(), 8);
        assert_eq!(graph.edge_count(), 28);
    }

    // ── find_path ──

    #[test]
    fn same_polygon_shortcut() {
        let mut graph = two_squares(MeshGraphParams::default());
        let (a, _) = graph.attach(Point2::new(10.0, 10.0)).unwrap();
        let (b, _) = graph.attach(Point2::new(80.0, 70.0)).unwrap();
        assert_eq!(graph.find_path(a, b).unwrap(), vec![a, b]);
    }

    #[test]
    fn squared_cost_prefers_many_short_hops() {
        let mut graph = two_squares(MeshGraphParams::default());
        let (a, _) = graph.attach(Point2::new(10.0, 40.0)).unwrap();
        let (b, _) = graph.attach(Point2::new(190.0, 40.0)).unwrap();
        let path = graph.find_path_positions(a, b).unwrap();
        assert_eq!(path.first(), Some(&Point2::new(10.0, 40.0)));
        assert_eq!(path.last(), Some(&Point2::new(190.0, 40.0)));
        assert!(path.len() > 3, "path = {path:?}");
    }

    #[test]
    fn linear_cost_crosses_shared_midpoint() {
        let mut graph = two_squares(MeshGraphParams {
            edge_cost: EdgeCost::Distance,
        });
        let (a, _) = graph.attach(Point2::new(10.0, 40.0)).unwrap();
        let (b, _) = graph.attach(Point2::new(190.0, 40.0)).unwrap();
        let path = graph.find_path_positions(a, b).unwrap();
        assert_eq!(
            path,
            vec![
                Point2::new(10.0, 40.0),
                Point2::new(100.0, 50.0),
                Point2::new(190.0, 40.0)
            ]
        );
    }

    #[test]
    fn disconnected_polygons_have_no_path() {
        let mut graph = MeshGraph::new(vec![
            rect(0.0, 0.0, 100.0, 100.0),
            rect(300.0, 0.0, 400.0, 100.0),
        ]);
        let (a, _) = graph.attach(Point2::new(50.0, 50.0)).unwrap();
        let (b, _) = graph.attach(Point2::new(350.0, 50.0)).unwrap();
        assert!(graph.find_path(a, b).unwrap().is_empty());
    }

    #[test]
    fn unknown_node_is_an_error() {
        let mut graph = square();
        let (a, _) = graph.attach(Point2::new(50.0, 50.0)).unwrap();
        let (b, _) = graph.attach(Point2::new(20.0, 50.0)).unwrap();
        graph.remove_node(b).unwrap();
        assert!(matches!(
            graph.find_path(a, b),
            Err(crate::NavError::Graph(GraphError::UnknownNode))
        ));
    }

    #[test]
    fn plan_path_detaches_query_nodes() {
        let mut graph = two_squares(MeshGraphParams::default());
        let path = graph
            .plan_path(Point2::new(-50.0, 50.0), Point2::new(150.0, 150.0))
            .unwrap();
        assert_eq!(path.first(), Some(&Point2::new(0.0, 50.0)));
        assert_eq!(path.last(), Some(&Point2::new(150.0, 100.0)));
        assert_eq!(graph.node_count(), 15);
        assert_eq!(graph.edge_count(), 69);
    }

    #[test]
    fn plan_path_cleans_up_on_failure() {
        let mut graph = square();
        assert!(graph
            .plan_path(Point2::new(50.0, 50.0), Point2::new(500.0, 500.0))
            .is_err());
        assert_eq!(graph.node_count(), 9);
    }
}
