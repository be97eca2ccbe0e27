//! Error types.

use thiserror::Error;

/// Errors raised when building a grid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// One of the node dimensions is zero.
    #[error("grid dimensions must be at least one, got {0:?}")]
    EmptyDimension([usize; 3]),
    /// The coordinate buffer does not hold three values per node.
    #[error("expected {expected} coordinate values for dimensions {dims:?}, got {actual}")]
    CoordinateCount {
        /// Node dimensions of the grid.
        dims: [usize; 3],
        /// Required buffer length.
        expected: usize,
        /// Provided buffer length.
        actual: usize,
    },
    /// A point array does not have one value per node.
    #[error("point array '{name}' has {actual} values, the grid has {expected} nodes")]
    ArrayLength {
        /// Array name.
        name: String,
        /// Number of nodes.
        expected: usize,
        /// Number of values.
        actual: usize,
    },
    /// Hexahedral connectivity references a missing point or is not a multiple of eight.
    #[error("invalid hexahedral connectivity: {0}")]
    Connectivity(String),
}

/// Reasons for not generating ghost nodes.
///
/// [GhostError::InputIneligible] and [GhostError::TooLarge] are decided
/// collectively and reported identically on every rank.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GhostError {
    /// At least one chunk on some rank is not a structured grid of hexahedra.
    #[error("ghost nodes require structured grids of hexahedra on every domain")]
    InputIneligible,
    /// The global number of faces is above the configured limit.
    #[error("{faces} faces exceed the limit of {limit} for ghost node generation")]
    TooLarge {
        /// Faces summed over all ranks.
        faces: u64,
        /// Configured limit.
        limit: u64,
    },
    /// Attaching the ghost node array to a chunk failed.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Errors raised when exporting a partition.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing the file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The VTK writer rejected the model.
    #[error("vtk export failed: {0}")]
    Vtk(String),
}
