//! Chunk datasets.
//!
//! A chunk is one block of a spatially decomposed mesh. Only structured grids of
//! hexahedra take part in ghost node generation; other representations exist so
//! that a partition can hold them and be rejected.

use std::sync::Arc;

use crate::{error::GridError, geometry::BoundingBox};

/// Map logical node indices `(i, j, k)` to flat node indices.
///
/// Nodes are stored with `i` running fastest, so `(i, j, k)` lives at
/// `k * nx * ny + j * nx + i`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NodeIndexer {
    dims: [usize; 3],
}

impl NodeIndexer {
    /// Create an indexer for the node dimensions `[nx, ny, nz]`.
    pub fn new(dims: [usize; 3]) -> Self {
        Self { dims }
    }

    /// Node dimensions.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    /// True if there are no nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat index of the node `(i, j, k)`.
    #[inline]
    pub fn flat(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(i < self.dims[0] && j < self.dims[1] && k < self.dims[2]);
        k * self.dims[0] * self.dims[1] + j * self.dims[0] + i
    }

    /// Flat index of a node given as `[i, j, k]`.
    #[inline]
    pub fn flat_ijk(&self, ijk: [usize; 3]) -> usize {
        self.flat(ijk[0], ijk[1], ijk[2])
    }
}

/// Kind of a chunk dataset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GridKind {
    /// Curvilinear structured grid of hexahedra.
    StructuredHexahedral,
    /// Unstructured hexahedral mesh.
    Unstructured,
}

/// Values of a point array.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayData {
    /// One unsigned byte per node.
    UnsignedChar(Arc<[u8]>),
    /// One double per node.
    Double(Arc<[f64]>),
}

impl ArrayData {
    /// Number of values.
    pub fn len(&self) -> usize {
        match self {
            ArrayData::UnsignedChar(values) => values.len(),
            ArrayData::Double(values) => values.len(),
        }
    }

    /// True if the array holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte values, if this is a byte array.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ArrayData::UnsignedChar(values) => Some(&**values),
            ArrayData::Double(_) => None,
        }
    }
}

/// A named field with one value per node.
#[derive(Clone, Debug, PartialEq)]
pub struct PointArray {
    /// Array name.
    pub name: String,
    /// Array values.
    pub data: ArrayData,
}

/// A curvilinear structured grid.
///
/// Coordinates and point arrays are reference counted. Cloning the grid is
/// therefore a shallow copy and never duplicates node data.
#[derive(Clone, Debug, PartialEq)]
pub struct StructuredGrid {
    dims: [usize; 3],
    points: Arc<[f64]>,
    point_data: Vec<PointArray>,
}

impl StructuredGrid {
    /// Create a grid from node dimensions and `[x, y, z]` triples in node order.
    pub fn new(dims: [usize; 3], points: Vec<f64>) -> Result<Self, GridError> {
        if dims.iter().any(|&n| n == 0) {
            return Err(GridError::EmptyDimension(dims));
        }

        let expected = 3 * dims.iter().product::<usize>();
        if points.len() != expected {
            return Err(GridError::CoordinateCount {
                dims,
                expected,
                actual: points.len(),
            });
        }

        Ok(Self {
            dims,
            points: points.into(),
            point_data: Vec::new(),
        })
    }

    /// Node dimensions `[nx, ny, nz]`.
    pub fn dimensions(&self) -> [usize; 3] {
        self.dims
    }

    /// Indexer for this grid.
    pub fn indexer(&self) -> NodeIndexer {
        NodeIndexer::new(self.dims)
    }

    /// Number of nodes.
    pub fn number_of_points(&self) -> usize {
        self.dims.iter().product()
    }

    /// Coordinates of the node with flat index `index`.
    #[inline]
    pub fn point(&self, index: usize) -> [f64; 3] {
        let start = 3 * index;
        [
            self.points[start],
            self.points[start + 1],
            self.points[start + 2],
        ]
    }

    /// All coordinates as consecutive `[x, y, z]` triples.
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Bounding box of all nodes.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Point arrays attached to the grid.
    pub fn point_data(&self) -> &[PointArray] {
        &self.point_data
    }

    /// Look up a point array by name.
    pub fn array(&self, name: &str) -> Option<&PointArray> {
        self.point_data.iter().find(|array| array.name == name)
    }

    /// Attach a point array, replacing any array with the same name.
    pub fn add_array(&mut self, array: PointArray) -> Result<(), GridError> {
        let expected = self.number_of_points();
        if array.data.len() != expected {
            return Err(GridError::ArrayLength {
                name: array.name,
                expected,
                actual: array.data.len(),
            });
        }

        if let Some(existing) = self
            .point_data
            .iter_mut()
            .find(|existing| existing.name == array.name)
        {
            *existing = array;
        } else {
            self.point_data.push(array);
        }
        Ok(())
    }

    /// A copy that shares coordinates and arrays with this grid.
    pub fn shallow_copy(&self) -> Self {
        self.clone()
    }

    /// True if both grids share the same coordinate buffer.
    pub fn shares_points_with(&self, other: &StructuredGrid) -> bool {
        Arc::ptr_eq(&self.points, &other.points)
    }
}

/// An unstructured mesh of hexahedra.
#[derive(Clone, Debug, PartialEq)]
pub struct UnstructuredGrid {
    points: Arc<[f64]>,
    hexahedra: Arc<[usize]>,
}

impl UnstructuredGrid {
    /// Create a mesh from `[x, y, z]` triples and eight node indices per cell.
    pub fn new(points: Vec<f64>, hexahedra: Vec<usize>) -> Result<Self, GridError> {
        if points.len() % 3 != 0 {
            return Err(GridError::Connectivity(format!(
                "{} coordinate values do not form triples",
                points.len()
            )));
        }
        if hexahedra.len() % 8 != 0 {
            return Err(GridError::Connectivity(format!(
                "{} indices do not form hexahedra",
                hexahedra.len()
            )));
        }
        let npoints = points.len() / 3;
        if let Some(&bad) = hexahedra.iter().find(|&&index| index >= npoints) {
            return Err(GridError::Connectivity(format!(
                "node {} out of range for {} points",
                bad, npoints
            )));
        }

        Ok(Self {
            points: points.into(),
            hexahedra: hexahedra.into(),
        })
    }

    /// Number of nodes.
    pub fn number_of_points(&self) -> usize {
        self.points.len() / 3
    }

    /// Number of hexahedra.
    pub fn number_of_cells(&self) -> usize {
        self.hexahedra.len() / 8
    }
}

/// The dataset stored for one chunk.
#[derive(Clone, Debug, PartialEq)]
pub enum Dataset {
    /// A structured grid of hexahedra.
    Structured(StructuredGrid),
    /// An unstructured mesh.
    Unstructured(UnstructuredGrid),
}

impl Dataset {
    /// Kind of the dataset.
    pub fn kind(&self) -> GridKind {
        match self {
            Dataset::Structured(_) => GridKind::StructuredHexahedral,
            Dataset::Unstructured(_) => GridKind::Unstructured,
        }
    }

    /// The structured grid, if this is one.
    pub fn as_structured(&self) -> Option<&StructuredGrid> {
        match self {
            Dataset::Structured(grid) => Some(grid),
            Dataset::Unstructured(_) => None,
        }
    }

    /// Number of nodes.
    pub fn number_of_points(&self) -> usize {
        match self {
            Dataset::Structured(grid) => grid.number_of_points(),
            Dataset::Unstructured(grid) => grid.number_of_points(),
        }
    }
}

impl From<StructuredGrid> for Dataset {
    fn from(grid: StructuredGrid) -> Self {
        Dataset::Structured(grid)
    }
}

impl From<UnstructuredGrid> for Dataset {
    fn from(grid: UnstructuredGrid) -> Self {
        Dataset::Unstructured(grid)
    }
}
