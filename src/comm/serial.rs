//! Single process communicator.

use super::Collectives;

/// The communicator of a run without a parallel runtime.
///
/// There is a single rank and every collective returns the local contribution.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SerialComm;

impl Collectives for SerialComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_gather_count(&self, value: usize) -> Vec<usize> {
        vec![value]
    }

    fn all_gather_varcount_f64(&self, local: &[f64], counts: &[usize]) -> Vec<f64> {
        debug_assert_eq!(counts, [local.len()]);
        local.to_vec()
    }

    fn all_gather_varcount_usize(&self, local: &[usize], counts: &[usize]) -> Vec<usize> {
        debug_assert_eq!(counts, [local.len()]);
        local.to_vec()
    }

    fn all_reduce_sum(&self, value: u64) -> u64 {
        value
    }

    fn all_reduce_and(&self, value: bool) -> bool {
        value
    }
}
