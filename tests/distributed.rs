//! Ghost node generation across several ranks, simulated with threads.

use itertools::Itertools;
use rand_distr::{Distribution, Normal};
use structured_ghosts::{
    comm::{Collectives, ThreadComm},
    constants::GHOST_NODE_ARRAY_NAME,
    error::GhostError,
    ghosts::GhostNodeGenerator,
    grid::{Dataset, StructuredGrid, UnstructuredGrid},
    partition::{MeshPartition, Partition},
    tools::{decompose_box, seeded_rng},
};

fn ghost_flags(grid: &StructuredGrid) -> &[u8] {
    grid.array(GHOST_NODE_ARRAY_NAME)
        .and_then(|array| array.data.as_bytes())
        .unwrap()
}

fn structured(partition: &Partition, domain: usize) -> &StructuredGrid {
    partition
        .dataset(domain)
        .and_then(Dataset::as_structured)
        .unwrap()
}

/// Check that a node is flagged exactly if it lies on the boundary of the unit box.
fn assert_flags_follow_outer_boundary(grid: &StructuredGrid) {
    let flags = ghost_flags(grid);
    for (node, &flag) in flags.iter().enumerate() {
        let outer = grid.point(node).iter().any(|&x| x == 0.0 || x == 1.0);
        assert_eq!(flag, outer as u8, "node {:?}", grid.point(node));
    }
}

#[test]
fn test_one_block_per_rank() {
    let blocks = decompose_box([0.0, 0.0, 0.0], 0.25, [4, 4, 4], [2, 2, 1]).unwrap();

    let results = ThreadComm::run(4, |comm| {
        let mut partition = Partition::from_datasets([blocks[comm.rank()].clone()]);
        let summary = GhostNodeGenerator::new(comm)
            .try_create_ghosts(&mut partition)
            .unwrap();
        (summary, partition)
    });

    for (summary, partition) in &results {
        // Every block has one x and one y interface of 2x4 quads.
        assert_eq!(summary.local_matches, 0);
        assert_eq!(summary.remote_matches, 16);
        assert_flags_follow_outer_boundary(structured(partition, 0));
    }
}

#[test]
fn test_several_blocks_per_rank() {
    let blocks = decompose_box([0.0, 0.0, 0.0], 0.25, [4, 4, 4], [2, 2, 2]).unwrap();

    let results = ThreadComm::run(2, |comm| {
        let mut partition =
            Partition::from_datasets(blocks.iter().skip(comm.rank()).step_by(2).cloned());
        let summary = GhostNodeGenerator::new(comm)
            .try_create_ghosts(&mut partition)
            .unwrap();
        (summary, partition)
    });

    for (summary, partition) in &results {
        assert_eq!(summary.chunks, 4);
        // Blocks with even x index sit on rank 0. The two y and two z interfaces
        // of a rank are local, the x interfaces remote. Every interface has 2x2
        // quads.
        assert_eq!(summary.local_matches, 4 * 4);
        assert_eq!(summary.remote_matches, 4 * 4);
        for domain in 0..partition.num_domains() {
            assert_flags_follow_outer_boundary(structured(partition, domain));
        }
    }
}

#[test]
fn test_absent_chunks_on_every_rank() {
    let blocks = decompose_box([0.0, 0.0, 0.0], 0.5, [2, 2, 2], [2, 1, 1]).unwrap();

    let results = ThreadComm::run(3, |comm| {
        let mut partition = match comm.rank() {
            0 => Partition::new(vec![Some(blocks[0].clone().into()), None]),
            1 => Partition::new(vec![None, None, Some(blocks[1].clone().into())]),
            _ => Partition::default(),
        };
        let summary = GhostNodeGenerator::new(comm)
            .try_create_ghosts(&mut partition)
            .unwrap();
        (summary, partition)
    });

    let (summary, partition) = &results[0];
    assert_eq!(summary.remote_matches, 4);
    assert!(partition.dataset(1).is_none());
    assert_flags_follow_outer_boundary(structured(partition, 0));

    let (summary, partition) = &results[1];
    assert_eq!(summary.remote_matches, 4);
    assert_flags_follow_outer_boundary(structured(partition, 2));

    let (summary, partition) = &results[2];
    assert_eq!(summary.chunks, 0);
    assert_eq!(partition.num_domains(), 0);
}

#[test]
fn test_unstructured_chunk_rejects_everywhere() {
    let blocks = decompose_box([0.0, 0.0, 0.0], 0.5, [3, 2, 2], [3, 1, 1]).unwrap();

    let results = ThreadComm::run(3, |comm| {
        let mut partition = Partition::from_datasets([blocks[comm.rank()].clone()]);
        if comm.rank() == 1 {
            let hexahedron = UnstructuredGrid::new(vec![0.0; 24], (0..8).collect()).unwrap();
            partition.push(Some(hexahedron.into()));
        }
        let before = partition.clone();
        let result = GhostNodeGenerator::new(comm).try_create_ghosts(&mut partition);
        (result, before == partition)
    });

    for (result, unchanged) in results {
        assert_eq!(result, Err(GhostError::InputIneligible));
        assert!(unchanged);
    }
}

#[test]
fn test_face_limit_is_global() {
    // Two 2x2x2 node blocks with 6 faces each.
    let blocks = decompose_box([0.0, 0.0, 0.0], 1.0, [2, 1, 1], [2, 1, 1]).unwrap();

    let rejected = ThreadComm::run(2, |comm| {
        let mut partition = Partition::from_datasets([blocks[comm.rank()].clone()]);
        let result = GhostNodeGenerator::new(comm)
            .with_face_limit(11)
            .try_create_ghosts(&mut partition);
        (result, structured(&partition, 0).point_data().is_empty())
    });

    for (result, unchanged) in rejected {
        assert_eq!(result, Err(GhostError::TooLarge { faces: 12, limit: 11 }));
        assert!(unchanged);
    }

    let accepted = ThreadComm::run(2, |comm| {
        let mut partition = Partition::from_datasets([blocks[comm.rank()].clone()]);
        GhostNodeGenerator::new(comm)
            .with_face_limit(12)
            .create_ghosts(&mut partition)
    });

    assert_eq!(accepted, vec![true, true]);
}

#[test]
fn test_perturbed_interface_stays_external() {
    let blocks = decompose_box([0.0, 0.0, 0.0], 0.5, [2, 2, 2], [2, 1, 1]).unwrap();

    // Move the interface nodes of the right block by a small random amount.
    let mut rng = seeded_rng(0);
    let normal = Normal::new(0.0, 1e-6).unwrap();
    let right = &blocks[1];
    let points = (0..right.number_of_points())
        .flat_map(|node| {
            let mut point = right.point(node);
            if point[0] == 0.5 {
                point[0] += normal.sample(&mut rng);
            }
            point
        })
        .collect_vec();
    let perturbed = StructuredGrid::new(right.dimensions(), points).unwrap();

    let results = ThreadComm::run(2, |comm| {
        let block = if comm.rank() == 0 {
            blocks[0].clone()
        } else {
            perturbed.clone()
        };
        let mut partition = Partition::from_datasets([block]);
        let summary = GhostNodeGenerator::new(comm)
            .try_create_ghosts(&mut partition)
            .unwrap();
        (summary, partition)
    });

    for (summary, partition) in &results {
        assert_eq!(summary.remote_matches, 0);
        let flags = ghost_flags(structured(partition, 0));
        assert!(flags.iter().all(|&flag| flag == 1));
    }
}
