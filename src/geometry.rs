//! Geometry information

use crate::constants::BOX_LEN;

/// An axis aligned bounding box.
///
/// The coordinates are stored as `[xmin, xmax, ymin, ymax, zmin, zmax]`. This is
/// also the layout in which boxes and face extents travel between ranks.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    coords: [f64; BOX_LEN],
}

impl BoundingBox {
    /// Create a new bounding box.
    ///
    /// The coordinates are given by `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    pub fn new(coords: [f64; BOX_LEN]) -> Self {
        Self { coords }
    }

    /// The box of an absent chunk.
    ///
    /// Every minimum is `+inf` and every maximum is `-inf`, so the box overlaps
    /// nothing, not even itself.
    pub fn empty() -> Self {
        Self {
            coords: [
                f64::INFINITY,
                f64::NEG_INFINITY,
                f64::INFINITY,
                f64::NEG_INFINITY,
                f64::INFINITY,
                f64::NEG_INFINITY,
            ],
        }
    }

    /// Read a box from the first six values of a slice.
    pub fn from_slice(values: &[f64]) -> Self {
        let mut coords = [0.0; BOX_LEN];
        coords.copy_from_slice(&values[..BOX_LEN]);
        Self { coords }
    }

    /// Give a slice of points. Compute an associated bounding box.
    ///
    /// The points are stored as consecutive `[x, y, z]` triples. An empty slice
    /// gives [BoundingBox::empty].
    pub fn from_points(points: &[f64]) -> BoundingBox {
        assert_eq!(points.len() % 3, 0);

        let points: &[[f64; 3]] = bytemuck::cast_slice(points);

        Self::from_point_iter(points.iter().copied())
    }

    /// Compute the bounding box of an iterator of points.
    pub fn from_point_iter<I: IntoIterator<Item = [f64; 3]>>(points: I) -> BoundingBox {
        let mut bbox = Self::empty();
        for point in points {
            bbox.include(point);
        }
        bbox
    }

    /// Grow the box so that it contains `point`.
    pub fn include(&mut self, point: [f64; 3]) {
        for (axis, &value) in point.iter().enumerate() {
            self.coords[2 * axis] = f64::min(self.coords[2 * axis], value);
            self.coords[2 * axis + 1] = f64::max(self.coords[2 * axis + 1], value);
        }
    }

    /// Return coordinates
    pub fn coordinates(&self) -> [f64; BOX_LEN] {
        self.coords
    }

    /// Minimum and maximum along `axis`.
    pub fn range(&self, axis: usize) -> (f64, f64) {
        (self.coords[2 * axis], self.coords[2 * axis + 1])
    }

    /// True if the two boxes are not disjoint along any axis.
    ///
    /// Touching boxes overlap. Boxes of absent chunks never overlap.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        (0..3).all(|axis| {
            let (amin, amax) = self.range(axis);
            let (bmin, bmax) = other.range(axis);
            !(amax < bmin || bmax < amin)
        })
    }

    /// True if `other` lies inside this box along every axis.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        (0..3).all(|axis| {
            let (amin, amax) = self.range(axis);
            let (bmin, bmax) = other.range(axis);
            amin <= bmin && bmax <= amax
        })
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [xmin, xmax, ymin, ymax, zmin, zmax] = self.coords;

        write!(
            f,
            "(xmin: {}, xmax: {}, ymin: {}, ymax: {}, zmin: {}, zmax: {})",
            xmin, xmax, ymin, ymax, zmin, zmax
        )
    }
}

/// Exact comparison of two six value extents.
///
/// Faces on both sides of a conforming interface are built from the same node
/// coordinates, so no tolerance is applied.
#[inline]
pub fn extents_match(first: &[f64], second: &[f64]) -> bool {
    first[..BOX_LEN] == second[..BOX_LEN]
}

/// True if the extent `face` lies inside the box `bbox`, both given as six values.
#[inline]
pub fn extent_inside(face: &[f64], bbox: &[f64]) -> bool {
    bbox[0] <= face[0]
        && face[1] <= bbox[1]
        && bbox[2] <= face[2]
        && face[3] <= bbox[3]
        && bbox[4] <= face[4]
        && face[5] <= bbox[5]
}
