use thiserror::Error;

/// Top-level error type for mesh navigation.
#[derive(Debug, Error)]
pub enum NavError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to the navigation graph.
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    /// The handle does not name a node currently in the graph.
    #[error("unknown node")]
    UnknownNode,

    /// No polygon contains the point and no polygon edge admits a
    /// perpendicular foot for it.
    #[error("point ({x}, {y}) cannot be attached to the navigation mesh")]
    UnattachablePoint { x: f64, y: f64 },

    /// Only query nodes can be attached; mesh samples are fixed.
    #[error("node is a mesh sample, not a query node")]
    NotAQueryNode,

    #[error("navigation mesh has no polygons")]
    EmptyMesh,
}

/// Convenience type alias for results using [`NavError`].
pub type Result<T> = std::result::Result<T, NavError>;
