//! Generation of ghost nodes for distributed structured meshes.
//!
//! A node is a ghost node if it touches a boundary face of its chunk that is not
//! shared with any other chunk, on any rank. The pipeline is
//!
//! 1. check collectively that every chunk is a structured grid and that the
//!    global number of faces is manageable,
//! 2. extract bounding boxes and face extents of the local chunks,
//! 3. gather the geometry of all chunks on all ranks,
//! 4. match faces between local chunks and against remote chunks,
//! 5. flag the corner nodes of all faces that stayed external.

use std::sync::Arc;

use itertools::Itertools;
use log::{debug, warn};

use crate::{
    comm::Collectives,
    constants::{GHOST_NODE, GHOST_NODE_ARRAY_NAME, MAX_GLOBAL_FACES, REAL_NODE},
    error::GhostError,
    exchange::GlobalChunks,
    faces::{face_corners, full_face_count, ChunkFaces, FaceLayout},
    grid::{ArrayData, Dataset, NodeIndexer, PointArray, StructuredGrid},
    matching::{match_local, match_remote},
    partition::MeshPartition,
};

/// Statistics of a ghost node run on the calling rank.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GhostSummary {
    /// Present structured chunks.
    pub chunks: usize,
    /// Boundary faces of the local chunks.
    pub faces: usize,
    /// Faces that stayed external.
    pub external_faces: usize,
    /// Face pairs matched between local chunks.
    pub local_matches: usize,
    /// Local faces matched against chunks of other ranks.
    pub remote_matches: usize,
    /// Nodes flagged as ghost nodes.
    pub ghost_nodes: usize,
}

/// Flag the corner nodes of every external face.
///
/// `external` holds one flag per face in the order of [face_corners].
pub fn flag_ghost_nodes(dims: [usize; 3], external: &[bool]) -> Vec<u8> {
    debug_assert_eq!(FaceLayout::of(dims).face_count(dims), external.len());

    let mut flags = vec![REAL_NODE; NodeIndexer::new(dims).len()];

    for (corners, &is_external) in face_corners(dims).zip(external) {
        if is_external {
            for node in corners {
                flags[node] = GHOST_NODE;
            }
        }
    }

    flags
}

/// Generator of ghost node flags for a distributed partition.
pub struct GhostNodeGenerator<'g, C> {
    comm: &'g C,
    face_limit: u64,
    array_name: String,
}

impl<'g, C: Collectives> GhostNodeGenerator<'g, C> {
    /// Create a generator with the default face limit and array name.
    pub fn new(comm: &'g C) -> Self {
        Self {
            comm,
            face_limit: MAX_GLOBAL_FACES,
            array_name: GHOST_NODE_ARRAY_NAME.to_string(),
        }
    }

    /// Set the maximum number of faces summed over all ranks.
    pub fn with_face_limit(mut self, face_limit: u64) -> Self {
        self.face_limit = face_limit;
        self
    }

    /// Set the name of the point array that receives the flags.
    pub fn with_array_name(mut self, array_name: impl Into<String>) -> Self {
        self.array_name = array_name.into();
        self
    }

    /// Return the communicator.
    pub fn comm(&self) -> &C {
        self.comm
    }

    /// Maximum number of faces summed over all ranks.
    pub fn face_limit(&self) -> u64 {
        self.face_limit
    }

    /// Name of the ghost node array.
    pub fn array_name(&self) -> &str {
        &self.array_name
    }

    /// Collectively decide whether ghost nodes can be generated.
    ///
    /// Returns the global face count on success. Every rank receives the same
    /// result.
    pub fn check<P: MeshPartition>(&self, partition: &P) -> Result<u64, GhostError> {
        let rank = self.comm.rank();

        let mut structured = true;
        let mut faces = 0_u64;

        for domain in 0..partition.num_domains() {
            match partition.dataset(domain) {
                Some(Dataset::Structured(grid)) => faces += full_face_count(grid.dimensions()),
                Some(other) => {
                    debug!(
                        "rank {}: domain {} is {:?}, not a structured grid",
                        rank,
                        domain,
                        other.kind()
                    );
                    structured = false;
                }
                None => {}
            }
        }

        // Both reductions run on every rank so that all ranks stay in step.
        let structured = self.comm.all_reduce_and(structured);
        let faces = self.comm.all_reduce_sum(faces);

        if !structured {
            if rank == 0 {
                warn!("Not creating ghost nodes: some domains are not structured grids");
            }
            return Err(GhostError::InputIneligible);
        }

        if faces > self.face_limit {
            if rank == 0 {
                warn!(
                    "Not creating ghost nodes: {} faces exceed the limit of {}",
                    faces, self.face_limit
                );
            }
            return Err(GhostError::TooLarge {
                faces,
                limit: self.face_limit,
            });
        }

        Ok(faces)
    }

    /// Collectively decide whether ghost nodes can be generated.
    pub fn is_valid<P: MeshPartition>(&self, partition: &P) -> bool {
        self.check(partition).is_ok()
    }

    /// Generate ghost nodes and attach them to every structured chunk.
    ///
    /// Returns `false` and leaves the partition untouched if the input is
    /// rejected. This is a collective operation.
    pub fn create_ghosts<P: MeshPartition>(&self, partition: &mut P) -> bool {
        self.try_create_ghosts(partition).is_ok()
    }

    /// Generate ghost nodes and return statistics of the run.
    ///
    /// Each present chunk is replaced by a shallow copy that carries the ghost
    /// node array. The original datasets are not modified.
    pub fn try_create_ghosts<P: MeshPartition>(
        &self,
        partition: &mut P,
    ) -> Result<GhostSummary, GhostError> {
        self.check(partition)?;

        let ndomains = partition.num_domains();

        let mut chunks = (0..ndomains)
            .map(
                |domain| match partition.dataset(domain).and_then(Dataset::as_structured) {
                    Some(grid) => ChunkFaces::extract(grid),
                    None => ChunkFaces::absent(),
                },
            )
            .collect_vec();

        let global = GlobalChunks::exchange(&chunks, self.comm);

        let local_matches = match_local(&mut chunks);
        let remote_matches = match_remote(&mut chunks, &global);

        let mut summary = GhostSummary {
            local_matches,
            remote_matches,
            ..Default::default()
        };

        // Build all annotated copies before touching the partition.
        let mut annotated = Vec::<(usize, StructuredGrid)>::new();

        for (domain, faces) in chunks.iter().enumerate() {
            let Some(grid) = partition.dataset(domain).and_then(Dataset::as_structured) else {
                continue;
            };

            let flags = flag_ghost_nodes(grid.dimensions(), faces.external());

            summary.chunks += 1;
            summary.faces += faces.len();
            summary.external_faces += faces.external_count();
            summary.ghost_nodes += flags.iter().filter(|&&flag| flag == GHOST_NODE).count();

            let mut copy = grid.shallow_copy();
            copy.add_array(PointArray {
                name: self.array_name.clone(),
                data: ArrayData::UnsignedChar(Arc::from(flags)),
            })?;
            annotated.push((domain, copy));
        }

        for (domain, grid) in annotated {
            partition.set_dataset(domain, Dataset::Structured(grid));
        }

        debug!(
            "rank {}: {} chunks, {} faces, {} external, {} local and {} remote matches, {} ghost nodes",
            self.comm.rank(),
            summary.chunks,
            summary.faces,
            summary.external_faces,
            summary.local_matches,
            summary.remote_matches,
            summary.ghost_nodes
        );

        Ok(summary)
    }
}
