//! Crate wide constants.

/// Upper bound on the number of structured faces summed over all ranks.
///
/// Matching is quadratic in the number of faces that survive the bounding box
/// pruning, so meshes above this size are not processed.
pub const MAX_GLOBAL_FACES: u64 = 20_000_000;

/// Name of the point array that carries the ghost node flags.
pub const GHOST_NODE_ARRAY_NAME: &str = "avtGhostNodes";

/// Value stored for a node that touches an external face.
pub const GHOST_NODE: u8 = 1;

/// Value stored for all other nodes.
pub const REAL_NODE: u8 = 0;

/// Number of doubles describing an axis aligned box.
pub const BOX_LEN: usize = 6;
