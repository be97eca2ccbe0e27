//! Collective communication used by the ghost node pipeline.
//!
//! The algorithms never talk to a process-wide communicator. They receive a
//! [Collectives] implementation instead. Every rank has to call the same
//! collectives in the same order, otherwise the run deadlocks.

mod serial;
mod threaded;

#[cfg(feature = "mpi")]
mod parallel;

#[cfg(feature = "mpi")]
pub use parallel::MpiComm;
pub use serial::SerialComm;
pub use threaded::ThreadComm;

/// The collective operations needed to exchange chunk data between ranks.
pub trait Collectives {
    /// Rank of the calling process.
    fn rank(&self) -> usize;

    /// Number of ranks.
    fn size(&self) -> usize;

    /// Gather one count from every rank, in rank order.
    fn all_gather_count(&self, value: usize) -> Vec<usize>;

    /// Concatenate variable sized arrays from every rank.
    ///
    /// `counts[r]` is the length contributed by rank `r`, as returned by
    /// [Collectives::all_gather_count].
    fn all_gather_varcount_f64(&self, local: &[f64], counts: &[usize]) -> Vec<f64>;

    /// Concatenate variable sized index arrays from every rank.
    fn all_gather_varcount_usize(&self, local: &[usize], counts: &[usize]) -> Vec<usize>;

    /// Sum a value over all ranks.
    fn all_reduce_sum(&self, value: u64) -> u64;

    /// Logical and of a flag over all ranks.
    fn all_reduce_and(&self, value: bool) -> bool;
}

impl<T: Collectives + ?Sized> Collectives for &T {
    fn rank(&self) -> usize {
        (**self).rank()
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn all_gather_count(&self, value: usize) -> Vec<usize> {
        (**self).all_gather_count(value)
    }

    fn all_gather_varcount_f64(&self, local: &[f64], counts: &[usize]) -> Vec<f64> {
        (**self).all_gather_varcount_f64(local, counts)
    }

    fn all_gather_varcount_usize(&self, local: &[usize], counts: &[usize]) -> Vec<usize> {
        (**self).all_gather_varcount_usize(local, counts)
    }

    fn all_reduce_sum(&self, value: u64) -> u64 {
        (**self).all_reduce_sum(value)
    }

    fn all_reduce_and(&self, value: bool) -> bool {
        (**self).all_reduce_and(value)
    }
}
