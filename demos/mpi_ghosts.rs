//! Generate ghost nodes for a box split into one chunk per MPI rank.

use mpi::traits::Communicator;
use structured_ghosts::{
    comm::{Collectives, MpiComm},
    ghosts::GhostNodeGenerator,
    partition::Partition,
    tools::decompose_box,
};

pub fn main() {
    // Initialise MPI
    let universe = mpi::initialize().unwrap();

    // Get the world communicator
    let world = universe.world();
    let comm = MpiComm::new(&world);

    let rank = comm.rank();
    let size = comm.size();

    // Stack the chunks along z, four cells per rank.
    let blocks = decompose_box([0.0, 0.0, 0.0], 0.25, [4, 4, 4 * size], [1, 1, size]).unwrap();
    let mut partition = Partition::from_datasets([blocks[rank].clone()]);

    let summary = GhostNodeGenerator::new(&comm)
        .try_create_ghosts(&mut partition)
        .unwrap();

    // Inner ranks share two sides, the outer ranks one.
    let neighbours = [rank > 0, rank + 1 < size]
        .iter()
        .filter(|&&n| n)
        .count();
    assert_eq!(summary.remote_matches, 16 * neighbours);

    let ghost_nodes = comm.all_reduce_sum(summary.ghost_nodes as u64);

    if world.rank() == 0 {
        println!("Ranks: {}", size);
        println!("Ghost nodes over all ranks: {}", ghost_nodes);
    }
}
