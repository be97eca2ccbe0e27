//! Boundary faces of structured chunks.
//!
//! A structured block of hexahedra has six logical boundary faces, each made of
//! `(n1 - 1) * (n2 - 1)` quadrilaterals. A block that is a single node thick
//! along one axis is a sheet and only the quadrilaterals normal to that axis are
//! generated.
//!
//! Faces carry no identifier. A face is known by its position in the traversal of
//! [face_corners], and every pass over the faces of a chunk must go through that
//! function so that positional flags stay valid.

use itertools::iproduct;

use crate::{
    constants::BOX_LEN,
    geometry::BoundingBox,
    grid::{NodeIndexer, StructuredGrid},
};

/// A logical axis of a structured grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The `i` direction.
    X,
    /// The `j` direction.
    Y,
    /// The `k` direction.
    Z,
}

impl Axis {
    /// All axes in traversal order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Position of the axis in `[i, j, k]`.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two in-plane axes of a face normal to `self`, outer loop first.
    pub fn in_plane(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::X, Axis::Z),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }
}

/// Which face families a chunk produces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FaceLayout {
    /// A proper volume block: both extreme layers of all three families.
    Volume,
    /// A sheet with `nx == 1`: only the X family.
    ThinX,
    /// A sheet with `ny == 1`: only the Y family.
    ThinY,
    /// A sheet with `nz == 1`: only the Z family.
    ThinZ,
}

impl FaceLayout {
    /// Select the layout for node dimensions `[nx, ny, nz]`.
    ///
    /// A thin `z` takes precedence over a thin `y`, which takes precedence over
    /// a thin `x`.
    pub fn of(dims: [usize; 3]) -> Self {
        if dims[2] == 1 {
            FaceLayout::ThinZ
        } else if dims[1] == 1 {
            FaceLayout::ThinY
        } else if dims[0] == 1 {
            FaceLayout::ThinX
        } else {
            FaceLayout::Volume
        }
    }

    /// Node layers along `normal` that carry faces.
    pub fn layers(self, normal: Axis, dims: [usize; 3]) -> Vec<usize> {
        match (self, normal) {
            (FaceLayout::Volume, _) => vec![0, dims[normal.index()] - 1],
            (FaceLayout::ThinX, Axis::X)
            | (FaceLayout::ThinY, Axis::Y)
            | (FaceLayout::ThinZ, Axis::Z) => vec![0],
            _ => Vec::new(),
        }
    }

    /// Number of faces produced for `dims`.
    pub fn face_count(self, dims: [usize; 3]) -> usize {
        Axis::ALL
            .iter()
            .map(|&normal| {
                let (first, second) = normal.in_plane();
                self.layers(normal, dims).len()
                    * cells(dims, first)
                    * cells(dims, second)
            })
            .sum()
    }
}

#[inline]
fn cells(dims: [usize; 3], axis: Axis) -> usize {
    dims[axis.index()].saturating_sub(1)
}

/// The face count of a volume block, used to size the global problem.
///
/// Sheets are counted as if they were volumes. The value is an upper bound for
/// the faces a chunk actually produces.
pub fn full_face_count(dims: [usize; 3]) -> u64 {
    let [cx, cy, cz] = [
        cells(dims, Axis::X) as u64,
        cells(dims, Axis::Y) as u64,
        cells(dims, Axis::Z) as u64,
    ];
    2 * cx * cy + 2 * cx * cz + 2 * cy * cz
}

/// Iterate over the corner nodes of all boundary faces of a chunk.
///
/// Families come in the order X, Y, Z. Within a family the low layer comes
/// before the high layer, and within a layer the outer loop runs over the
/// first in-plane axis of [Axis::in_plane]. The corners of a face with lowest
/// in-plane cell `(a, b)` are returned as `(a, b), (a + 1, b), (a + 1, b + 1),
/// (a, b + 1)`.
pub fn face_corners(dims: [usize; 3]) -> impl Iterator<Item = [usize; 4]> {
    let layout = FaceLayout::of(dims);
    let indexer = NodeIndexer::new(dims);

    Axis::ALL.into_iter().flat_map(move |normal| {
        let (first, second) = normal.in_plane();
        let n_first = cells(dims, first);
        let n_second = cells(dims, second);

        layout
            .layers(normal, dims)
            .into_iter()
            .flat_map(move |layer| {
                iproduct!(0..n_first, 0..n_second).map(move |(a, b)| {
                    let node = |da: usize, db: usize| {
                        let mut ijk = [0; 3];
                        ijk[normal.index()] = layer;
                        ijk[first.index()] = a + da;
                        ijk[second.index()] = b + db;
                        indexer.flat_ijk(ijk)
                    };
                    [node(0, 0), node(1, 0), node(1, 1), node(0, 1)]
                })
            })
    })
}

/// Boundary faces of one chunk together with their externality flags.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkFaces {
    bounds: BoundingBox,
    extents: Vec<f64>,
    external: Vec<bool>,
}

impl ChunkFaces {
    /// Extract bounding box and face extents from a structured grid.
    ///
    /// All faces start out external.
    pub fn extract(grid: &StructuredGrid) -> Self {
        let dims = grid.dimensions();
        let nfaces = FaceLayout::of(dims).face_count(dims);

        let mut extents = Vec::<f64>::with_capacity(BOX_LEN * nfaces);

        for corners in face_corners(dims) {
            let face = BoundingBox::from_point_iter(corners.iter().map(|&node| grid.point(node)));
            extents.extend_from_slice(&face.coordinates());
        }

        debug_assert_eq!(extents.len(), BOX_LEN * nfaces);

        Self {
            bounds: grid.bounds(),
            extents,
            external: vec![true; nfaces],
        }
    }

    /// The faces of a chunk that is not present on this rank.
    pub fn absent() -> Self {
        Self {
            bounds: BoundingBox::empty(),
            extents: Vec::new(),
            external: Vec::new(),
        }
    }

    /// Bounding box of the chunk.
    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Number of faces.
    pub fn len(&self) -> usize {
        self.external.len()
    }

    /// True if the chunk has no faces.
    pub fn is_empty(&self) -> bool {
        self.external.is_empty()
    }

    /// Extents of all faces, six values per face.
    pub fn extents(&self) -> &[f64] {
        &self.extents
    }

    /// Extent of a single face.
    #[inline]
    pub fn extent(&self, face: usize) -> &[f64] {
        &self.extents[BOX_LEN * face..BOX_LEN * (face + 1)]
    }

    /// Externality flags in traversal order.
    pub fn external(&self) -> &[bool] {
        &self.external
    }

    /// True if `face` has not been matched.
    #[inline]
    pub fn is_external(&self, face: usize) -> bool {
        self.external[face]
    }

    /// Mark `face` as shared with another chunk.
    #[inline]
    pub fn set_internal(&mut self, face: usize) {
        self.external[face] = false;
    }

    /// Number of faces still external.
    pub fn external_count(&self) -> usize {
        self.external.iter().filter(|&&e| e).count()
    }
}
