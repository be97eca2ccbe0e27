//! Generate ghost nodes for a box split into several chunks on a single rank.
//!
//! Pass a directory as first argument to write the annotated chunks as VTK files.

use structured_ghosts::{
    comm::SerialComm, ghosts::GhostNodeGenerator, io::export_to_vtk, partition::Partition,
    tools::decompose_box,
};

pub fn main() {
    // A unit box with 8x8x8 cells split into 2x2x2 chunks.
    let blocks = decompose_box([0.0, 0.0, 0.0], 0.125, [8, 8, 8], [2, 2, 2]).unwrap();
    let mut partition = Partition::from_datasets(blocks);

    let generator = GhostNodeGenerator::new(&SerialComm);
    let summary = generator.try_create_ghosts(&mut partition).unwrap();

    println!("Chunks: {}", summary.chunks);
    println!("Faces: {}", summary.faces);
    println!("External faces: {}", summary.external_faces);
    println!("Matched faces: {}", summary.local_matches);
    println!("Ghost nodes: {}", summary.ghost_nodes);

    // Every chunk keeps three of its six sides on the outer boundary.
    assert_eq!(summary.local_matches, 12 * 16);

    if let Some(directory) = std::env::args().nth(1) {
        let written = export_to_vtk(&partition, &directory, "chunk").unwrap();
        println!("Wrote {} files to {}", written.len(), directory);
    }
}
