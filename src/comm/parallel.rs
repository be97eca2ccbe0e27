//! MPI backed communicator.

use mpi::{
    collective::SystemOperation,
    datatype::PartitionMut,
    traits::{Communicator, CommunicatorCollectives, Equivalence},
};

use super::Collectives;
use crate::tools::displacements;

/// Collectives on top of an MPI communicator.
pub struct MpiComm<'c, C> {
    comm: &'c C,
}

impl<'c, C: CommunicatorCollectives> MpiComm<'c, C> {
    /// Wrap an MPI communicator.
    pub fn new(comm: &'c C) -> Self {
        Self { comm }
    }

    /// Return the communicator.
    pub fn comm(&self) -> &C {
        self.comm
    }
}

/// Gather variable sized arrays to all processes.
///
/// The counts are known on every rank, so no size exchange is needed here.
fn gather_varcount_to_all<T, C>(arr: &[T], counts: &[usize], comm: &C) -> Vec<T>
where
    T: Equivalence + Default + Clone,
    C: CommunicatorCollectives,
{
    let recv_len = counts.iter().sum::<usize>();

    let counts = counts.iter().map(|&c| c as i32).collect::<Vec<_>>();
    let recv_displs = displacements(&counts);

    let mut recvbuffer = vec![T::default(); recv_len];
    let mut receiv_partition = PartitionMut::new(&mut recvbuffer[..], counts, &recv_displs[..]);

    comm.all_gather_varcount_into(arr, &mut receiv_partition);

    recvbuffer
}

impl<C: CommunicatorCollectives> Collectives for MpiComm<'_, C> {
    fn rank(&self) -> usize {
        self.comm.rank() as usize
    }

    fn size(&self) -> usize {
        self.comm.size() as usize
    }

    fn all_gather_count(&self, value: usize) -> Vec<usize> {
        let mut counts = vec![0_usize; self.size()];
        self.comm.all_gather_into(&value, &mut counts[..]);
        counts
    }

    fn all_gather_varcount_f64(&self, local: &[f64], counts: &[usize]) -> Vec<f64> {
        gather_varcount_to_all(local, counts, self.comm)
    }

    fn all_gather_varcount_usize(&self, local: &[usize], counts: &[usize]) -> Vec<usize> {
        gather_varcount_to_all(local, counts, self.comm)
    }

    fn all_reduce_sum(&self, value: u64) -> u64 {
        let mut global: u64 = 0;
        self.comm
            .all_reduce_into(&value, &mut global, SystemOperation::sum());
        global
    }

    fn all_reduce_and(&self, value: bool) -> bool {
        let mut global = false;
        self.comm
            .all_reduce_into(&value, &mut global, SystemOperation::logical_and());
        global
    }
}
