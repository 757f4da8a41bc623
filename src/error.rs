use thiserror::Error;

/// Malformed model data. These are data errors in the level, not degenerate geometry,
/// which is skipped silently.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("node {node_index} is out of range ({node_count} nodes)")]
    NodeOutOfRange { node_index: usize, node_count: usize },
    #[error("node {node_index} references surface {surface_index} ({surface_count} surfaces)")]
    SurfaceOutOfRange { node_index: usize, surface_index: usize, surface_count: usize },
    #[error("node {node_index} vertex pool {start}..{end} exceeds {vertex_count} vertices")]
    VertexPoolOutOfRange { node_index: usize, start: usize, end: usize, vertex_count: usize },
    #[error("vertex {vertex_index} references point {point_index} ({point_count} points)")]
    PointOutOfRange { vertex_index: usize, point_index: usize, point_count: usize },
    #[error("surface {surface_index} references point {point_index} ({point_count} points)")]
    SurfacePointOutOfRange { surface_index: usize, point_index: usize, point_count: usize },
    #[error("surface {surface_index} references vector {vector_index} ({vector_count} vectors)")]
    VectorOutOfRange { surface_index: usize, vector_index: usize, vector_count: usize },
    #[error("node {node_index} has {vertex_count} vertices, at most {max} are supported")]
    TooManyVertices { node_index: usize, vertex_count: usize, max: usize },
    #[error("vertex index {0} does not fit in a 32-bit index buffer")]
    VertexIndexOverflow(usize),
}

/// Errors from building or filling index buffers.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RenderError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("dynamic index buffer is not locked")]
    BufferNotLocked,
    #[error("dynamic index buffer overflow: {requested} indices at {next_index} exceeds capacity {capacity}")]
    CapacityExceeded { next_index: usize, requested: usize, capacity: usize },
}
