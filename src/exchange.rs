//! Exchange of chunk geometry between ranks.
//!
//! Global chunk indices enumerate the chunks of rank 0, then those of rank 1 and
//! so on. Boxes and face extents of all chunks are stored in flat buffers with
//! per chunk offsets.

use std::ops::Range;

use itertools::Itertools;
use log::debug;

use crate::{
    comm::Collectives, constants::BOX_LEN, faces::ChunkFaces, geometry::BoundingBox,
    tools::displacements,
};

/// Bounding boxes and face extents of every chunk on every rank.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalChunks {
    rank: usize,
    chunk_offsets: Vec<usize>,
    boxes: Vec<f64>,
    face_counts: Vec<usize>,
    face_offsets: Vec<usize>,
    extents: Vec<f64>,
}

/// Exclusive prefix sums followed by the total.
fn offsets(counts: &[usize]) -> Vec<usize> {
    let mut result = displacements(counts);
    result.push(counts.iter().sum());
    result
}

impl GlobalChunks {
    /// Gather the geometry of the local chunks from all ranks.
    ///
    /// This is a collective operation. With a single rank no communication takes
    /// place and the local buffers are used directly.
    pub fn exchange<C: Collectives>(local: &[ChunkFaces], comm: &C) -> Self {
        let rank = comm.rank();
        let size = comm.size();

        let local_boxes = local
            .iter()
            .flat_map(|chunk| chunk.bounds().coordinates())
            .collect_vec();
        let local_counts = local.iter().map(ChunkFaces::len).collect_vec();
        let local_extents = local
            .iter()
            .flat_map(|chunk| chunk.extents().iter().copied())
            .collect_vec();

        if size == 1 {
            return Self::from_parts(
                rank,
                vec![local.len()],
                local_boxes,
                local_counts,
                local_extents,
            );
        }

        // Number of chunks on every rank.
        let chunks_per_rank = comm.all_gather_count(local.len());

        let box_counts = chunks_per_rank.iter().map(|&n| BOX_LEN * n).collect_vec();
        let boxes = comm.all_gather_varcount_f64(&local_boxes, &box_counts);

        let face_counts = comm.all_gather_varcount_usize(&local_counts, &chunks_per_rank);

        // The extent counts per rank follow from the gathered face counts.
        let chunk_offsets = offsets(&chunks_per_rank);
        let extent_counts = (0..size)
            .map(|r| {
                BOX_LEN
                    * face_counts[chunk_offsets[r]..chunk_offsets[r + 1]]
                        .iter()
                        .sum::<usize>()
            })
            .collect_vec();
        let extents = comm.all_gather_varcount_f64(&local_extents, &extent_counts);

        debug!(
            "rank {}: gathered {} chunks with {} faces",
            rank,
            face_counts.len(),
            extents.len() / BOX_LEN
        );

        Self::from_parts(rank, chunks_per_rank, boxes, face_counts, extents)
    }

    fn from_parts(
        rank: usize,
        chunks_per_rank: Vec<usize>,
        boxes: Vec<f64>,
        face_counts: Vec<usize>,
        extents: Vec<f64>,
    ) -> Self {
        let chunk_offsets = offsets(&chunks_per_rank);
        let face_offsets = offsets(&face_counts);

        debug_assert_eq!(boxes.len(), BOX_LEN * face_counts.len());
        debug_assert_eq!(extents.len(), BOX_LEN * face_offsets[face_counts.len()]);

        Self {
            rank,
            chunk_offsets,
            boxes,
            face_counts,
            face_offsets,
            extents,
        }
    }

    /// Total number of chunks over all ranks.
    pub fn num_chunks(&self) -> usize {
        self.face_counts.len()
    }

    /// Number of ranks that took part in the exchange.
    pub fn num_ranks(&self) -> usize {
        self.chunk_offsets.len() - 1
    }

    /// Global indices of the chunks owned by the calling rank.
    pub fn local_range(&self) -> Range<usize> {
        self.chunk_offsets[self.rank]..self.chunk_offsets[self.rank + 1]
    }

    /// Global indices of the chunks owned by `rank`.
    pub fn rank_range(&self, rank: usize) -> Range<usize> {
        self.chunk_offsets[rank]..self.chunk_offsets[rank + 1]
    }

    /// Rank that owns a global chunk.
    pub fn owner(&self, chunk: usize) -> usize {
        debug_assert!(chunk < self.num_chunks());
        self.chunk_offsets.partition_point(|&offset| offset <= chunk) - 1
    }

    /// True if a global chunk belongs to the calling rank.
    pub fn is_local(&self, chunk: usize) -> bool {
        self.local_range().contains(&chunk)
    }

    /// Bounding box of a global chunk.
    pub fn bounds(&self, chunk: usize) -> BoundingBox {
        BoundingBox::from_slice(&self.boxes[BOX_LEN * chunk..BOX_LEN * (chunk + 1)])
    }

    /// Number of faces of a global chunk.
    pub fn face_count(&self, chunk: usize) -> usize {
        self.face_counts[chunk]
    }

    /// Face extents of a global chunk, six values per face.
    pub fn extents(&self, chunk: usize) -> &[f64] {
        &self.extents[BOX_LEN * self.face_offsets[chunk]..BOX_LEN * self.face_offsets[chunk + 1]]
    }

    /// Total number of faces over all ranks.
    pub fn total_faces(&self) -> usize {
        self.face_offsets[self.num_chunks()]
    }
}

#[cfg(test)]
mod test {
    use itertools::Itertools;

    use super::GlobalChunks;
    use crate::{
        comm::{Collectives, SerialComm, ThreadComm},
        faces::ChunkFaces,
        geometry::BoundingBox,
        tools::cartesian_block,
    };

    fn local_chunks(rank: usize) -> Vec<ChunkFaces> {
        // Rank r holds r + 1 chunks; the second chunk of every rank is absent.
        (0..=rank)
            .map(|index| {
                if index == 1 {
                    ChunkFaces::absent()
                } else {
                    let origin = [rank as f64, index as f64, 0.0];
                    ChunkFaces::extract(&cartesian_block(origin, 0.5, [2, 3, 2]).unwrap())
                }
            })
            .collect_vec()
    }

    #[test]
    fn test_serial_exchange_is_local_data() {
        let local = local_chunks(2);
        let global = GlobalChunks::exchange(&local, &SerialComm);

        assert_eq!(global.num_chunks(), 3);
        assert_eq!(global.local_range(), 0..3);
        for (index, chunk) in local.iter().enumerate() {
            assert_eq!(global.bounds(index), *chunk.bounds());
            assert_eq!(global.extents(index), chunk.extents());
        }
    }

    #[test]
    fn test_threaded_exchange() {
        let results = ThreadComm::run(3, |comm| {
            let local = local_chunks(comm.rank());
            (local, GlobalChunks::exchange(&local_chunks(comm.rank()), comm))
        });

        let all_local = results.iter().map(|(local, _)| local.clone()).concat();

        for (rank, (_, global)) in results.iter().enumerate() {
            assert_eq!(global.num_chunks(), 6);
            assert_eq!(global.num_ranks(), 3);
            assert_eq!(global.local_range(), global.rank_range(rank));
            assert_eq!(global.owner(0), 0);
            assert_eq!(global.owner(1), 1);
            assert_eq!(global.owner(2), 1);
            assert_eq!(global.owner(5), 2);

            for (index, chunk) in all_local.iter().enumerate() {
                assert_eq!(global.bounds(index), *chunk.bounds());
                assert_eq!(global.face_count(index), chunk.len());
                assert_eq!(global.extents(index), chunk.extents());
            }

            // Absent chunks travel as empty boxes.
            assert_eq!(global.bounds(2), BoundingBox::empty());
            assert_eq!(global.face_count(2), 0);
        }
    }

    #[test]
    fn test_rank_without_chunks() {
        let results = ThreadComm::run(2, |comm| {
            let local = if comm.rank() == 0 {
                Vec::new()
            } else {
                local_chunks(0)
            };
            GlobalChunks::exchange(&local, comm)
        });

        assert_eq!(results[0].local_range(), 0..0);
        assert_eq!(results[1].local_range(), 0..1);
        assert_eq!(results[0].owner(0), 1);
        assert_eq!(results[0].total_faces(), 10);
    }
}
