//! Utility routines.

use itertools::{iproduct, Itertools};
use num::traits::Zero;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{error::GridError, grid::StructuredGrid};

/// Compute displacements from a vector of counts.
///
/// This is useful for global varcount operations. Let
/// count [ 3, 4, 5]. Then the corresponding displacements are
/// [0, 3, 7]. Note that the last element `5` is ignored.
pub fn displacements<T: Zero + Copy>(counts: &[T]) -> Vec<T> {
    counts
        .iter()
        .scan(T::zero(), |acc, &x| {
            let tmp = *acc;
            *acc = *acc + x;
            Some(tmp)
        })
        .collect()
}

/// Get a seeded rng
pub fn seeded_rng(seed: usize) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed as u64)
}

/// A structured block on a regular lattice.
///
/// Node `(i, j, k)` sits at `origin + spacing * (i, j, k)`.
pub fn cartesian_block(
    origin: [f64; 3],
    spacing: f64,
    dims: [usize; 3],
) -> Result<StructuredGrid, GridError> {
    lattice_block(origin, spacing, [0, 0, 0], dims)
}

/// Split a lattice of `cells` cells into `blocks` conforming structured blocks.
///
/// Neighbouring blocks share their interface nodes, and both sides compute the
/// coordinates of those nodes from the same global lattice index, so shared faces
/// are bitwise identical. Blocks are returned with the `x` block index running
/// fastest. Every axis needs at least as many cells as blocks.
pub fn decompose_box(
    origin: [f64; 3],
    spacing: f64,
    cells: [usize; 3],
    blocks: [usize; 3],
) -> Result<Vec<StructuredGrid>, GridError> {
    let splits = (0..3)
        .map(|axis| {
            (0..=blocks[axis])
                .map(|b| b * cells[axis] / blocks[axis].max(1))
                .collect_vec()
        })
        .collect_vec();

    iproduct!(0..blocks[2], 0..blocks[1], 0..blocks[0])
        .map(|(bz, by, bx)| {
            let block = [bx, by, bz];
            let start = [0, 1, 2].map(|axis| splits[axis][block[axis]]);
            let dims = [0, 1, 2].map(|axis| splits[axis][block[axis] + 1] - start[axis] + 1);
            lattice_block(origin, spacing, start, dims)
        })
        .collect()
}

fn lattice_block(
    origin: [f64; 3],
    spacing: f64,
    start: [usize; 3],
    dims: [usize; 3],
) -> Result<StructuredGrid, GridError> {
    let mut points = Vec::<f64>::with_capacity(3 * dims.iter().product::<usize>());

    for (k, j, i) in iproduct!(0..dims[2], 0..dims[1], 0..dims[0]) {
        points.push(origin[0] + spacing * (start[0] + i) as f64);
        points.push(origin[1] + spacing * (start[1] + j) as f64);
        points.push(origin[2] + spacing * (start[2] + k) as f64);
    }

    StructuredGrid::new(dims, points)
}
