//! Matching of boundary faces between chunks.
//!
//! Two faces are the same if their six extent values are equal. A matched face
//! lies on an interface between chunks and is no longer external. Every face is
//! matched at most once; meshes are assumed to be conforming, so no face is
//! shared by more than two chunks.

use log::trace;

use crate::{
    constants::BOX_LEN,
    exchange::GlobalChunks,
    faces::ChunkFaces,
    geometry::{extent_inside, extents_match},
};

/// Match faces between all pairs of chunks on the calling rank.
///
/// Both faces of a match are cleared. Returns the number of matches.
pub fn match_local(chunks: &mut [ChunkFaces]) -> usize {
    let mut matches = 0;

    for index in 0..chunks.len() {
        let (head, tail) = chunks.split_at_mut(index + 1);
        let first = &mut head[index];

        for (offset, second) in tail.iter_mut().enumerate() {
            if !first.bounds().overlaps(second.bounds()) {
                continue;
            }

            let second_bounds = second.bounds().coordinates();
            let mut pair_matches = 0;

            for face in 0..first.len() {
                if !first.is_external(face) {
                    continue;
                }

                let extent = first.extent(face);
                if !extent_inside(extent, &second_bounds) {
                    continue;
                }

                let partner = (0..second.len()).find(|&candidate| {
                    second.is_external(candidate) && extents_match(extent, second.extent(candidate))
                });

                if let Some(partner) = partner {
                    first.set_internal(face);
                    second.set_internal(partner);
                    pair_matches += 1;
                }
            }

            trace!(
                "local chunks {} and {}: {} shared faces",
                index,
                index + 1 + offset,
                pair_matches
            );
            matches += pair_matches;
        }
    }

    matches
}

/// Match the faces of the local chunks against the chunks of all other ranks.
///
/// Only the local face of a match is cleared. The owner of the remote face
/// clears its side when it runs the same comparison. Returns the number of
/// matches.
pub fn match_remote(chunks: &mut [ChunkFaces], global: &GlobalChunks) -> usize {
    debug_assert_eq!(chunks.len(), global.local_range().len());

    let mut matches = 0;

    for (index, chunk) in chunks.iter_mut().enumerate() {
        for remote in 0..global.num_chunks() {
            if global.is_local(remote) {
                continue;
            }

            let remote_bounds = global.bounds(remote);
            if !chunk.bounds().overlaps(&remote_bounds) {
                continue;
            }

            let remote_bounds = remote_bounds.coordinates();
            let remote_extents = global.extents(remote);
            let mut pair_matches = 0;

            for face in 0..chunk.len() {
                if !chunk.is_external(face) {
                    continue;
                }

                let extent = chunk.extent(face);
                if !extent_inside(extent, &remote_bounds) {
                    continue;
                }

                if remote_extents
                    .chunks_exact(BOX_LEN)
                    .any(|other| extents_match(extent, other))
                {
                    chunk.set_internal(face);
                    pair_matches += 1;
                }
            }

            trace!(
                "local chunk {} and global chunk {} on rank {}: {} shared faces",
                index,
                remote,
                global.owner(remote),
                pair_matches
            );
            matches += pair_matches;
        }
    }

    matches
}

#[cfg(test)]
mod test {
    use itertools::Itertools;

    use super::{match_local, match_remote};
    use crate::{
        comm::{Collectives, ThreadComm},
        exchange::GlobalChunks,
        faces::ChunkFaces,
        tools::{cartesian_block, decompose_box},
    };

    #[test]
    fn test_adjacent_blocks_share_faces() {
        let blocks = decompose_box([0.0, 0.0, 0.0], 1.0, [4, 2, 2], [2, 1, 1]).unwrap();
        let mut chunks = blocks.iter().map(ChunkFaces::extract).collect_vec();

        // Each block is 3x3x3 nodes; the shared x layer has 2x2 quads.
        assert_eq!(match_local(&mut chunks), 4);

        // x-high family of the left block, x-low family of the right block.
        assert!(chunks[0].external()[4..8].iter().all(|&e| !e));
        assert!(chunks[1].external()[0..4].iter().all(|&e| !e));
        assert_eq!(chunks[0].external_count(), chunks[0].len() - 4);
        assert_eq!(chunks[1].external_count(), chunks[1].len() - 4);
    }

    #[test]
    fn test_distant_blocks_do_not_match() {
        let left = cartesian_block([0.0, 0.0, 0.0], 1.0, [2, 2, 2]).unwrap();
        let right = cartesian_block([5.0, 0.0, 0.0], 1.0, [2, 2, 2]).unwrap();
        let mut chunks = vec![ChunkFaces::extract(&left), ChunkFaces::extract(&right)];

        assert_eq!(match_local(&mut chunks), 0);
        assert!(chunks.iter().all(|c| c.external_count() == 6));
    }

    #[test]
    fn test_shifted_interface_does_not_match() {
        // The blocks touch but the nodes of the interface differ.
        let left = cartesian_block([0.0, 0.0, 0.0], 1.0, [2, 3, 2]).unwrap();
        let right = cartesian_block([1.0, 0.5, 0.0], 1.0, [2, 2, 2]).unwrap();
        let mut chunks = vec![ChunkFaces::extract(&left), ChunkFaces::extract(&right)];

        assert_eq!(match_local(&mut chunks), 0);
    }

    #[test]
    fn test_absent_chunk_is_ignored() {
        let block = cartesian_block([0.0, 0.0, 0.0], 1.0, [2, 2, 2]).unwrap();
        let mut chunks = vec![ChunkFaces::absent(), ChunkFaces::extract(&block)];

        assert_eq!(match_local(&mut chunks), 0);
        assert_eq!(chunks[1].external_count(), 6);
    }

    #[test]
    fn test_face_matches_once() {
        // A duplicated neighbour: the shared face of the left block is claimed by
        // the first copy and the second copy keeps its face external.
        let left = cartesian_block([0.0, 0.0, 0.0], 1.0, [2, 2, 2]).unwrap();
        let right = cartesian_block([1.0, 0.0, 0.0], 1.0, [2, 2, 2]).unwrap();
        let mut chunks = vec![
            ChunkFaces::extract(&left),
            ChunkFaces::extract(&right),
            ChunkFaces::extract(&right),
        ];

        match_local(&mut chunks);

        assert!(!chunks[0].is_external(1));
        assert!(!chunks[1].is_external(0));
        assert!(chunks[2].is_external(0));
    }

    #[test]
    fn test_remote_matching_clears_local_side() {
        let blocks = decompose_box([0.0, 0.0, 0.0], 0.25, [2, 2, 4], [1, 1, 2]).unwrap();

        let results = ThreadComm::run(2, |comm| {
            let mut local = vec![ChunkFaces::extract(&blocks[comm.rank()])];
            let global = GlobalChunks::exchange(&local, comm);
            let local_matches = match_local(&mut local);
            let remote_matches = match_remote(&mut local, &global);
            (local_matches, remote_matches, local.remove(0))
        });

        for (local_matches, remote_matches, chunk) in &results {
            assert_eq!(*local_matches, 0);
            assert_eq!(*remote_matches, 4);
            assert_eq!(chunk.external_count(), chunk.len() - 4);
        }

        // z-high family of the lower block, z-low family of the upper block.
        let lower = &results[0].2;
        let upper = &results[1].2;
        let nz_faces = 4;
        let z_high = lower.len() - nz_faces..lower.len();
        let z_low = upper.len() - 2 * nz_faces..upper.len() - nz_faces;
        assert!(lower.external()[z_high].iter().all(|&e| !e));
        assert!(upper.external()[z_low].iter().all(|&e| !e));
    }
}
