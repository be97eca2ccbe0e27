//! Ghost node generation for distributed structured meshes
#![cfg_attr(feature = "strict", deny(warnings), deny(unused_crate_dependencies))]
#![warn(missing_docs)]

pub mod comm;
pub mod constants;
pub mod error;
pub mod exchange;
pub mod faces;
pub mod geometry;
pub mod ghosts;
pub mod grid;
pub mod io;
pub mod matching;
pub mod partition;
pub mod tools;

pub use comm::{Collectives, SerialComm, ThreadComm};
#[cfg(feature = "mpi")]
pub use comm::MpiComm;
pub use error::{ExportError, GhostError, GridError};
pub use ghosts::{GhostNodeGenerator, GhostSummary};
pub use grid::{ArrayData, Dataset, PointArray, StructuredGrid, UnstructuredGrid};
pub use partition::{MeshPartition, Partition};
