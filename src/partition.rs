//! The local part of a distributed mesh.

use crate::grid::Dataset;

/// Access to the chunks held by the calling rank.
///
/// Every rank holds an ordered list of domains. A domain without data on this
/// rank is reported as `None` and takes part in the algorithms as an empty
/// chunk.
pub trait MeshPartition {
    /// Number of local domains, absent ones included.
    fn num_domains(&self) -> usize;

    /// The dataset of a local domain, if present.
    fn dataset(&self, domain: usize) -> Option<&Dataset>;

    /// Replace the dataset of a local domain.
    fn set_dataset(&mut self, domain: usize, dataset: Dataset);
}

/// An owned list of chunk datasets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Partition {
    domains: Vec<Option<Dataset>>,
}

impl Partition {
    /// Create a partition from a list of optional datasets.
    pub fn new(domains: Vec<Option<Dataset>>) -> Self {
        Self { domains }
    }

    /// Create a partition in which every domain is present.
    pub fn from_datasets<I, D>(datasets: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Dataset>,
    {
        Self {
            domains: datasets.into_iter().map(|d| Some(d.into())).collect(),
        }
    }

    /// Append a domain.
    pub fn push(&mut self, dataset: Option<Dataset>) {
        self.domains.push(dataset);
    }

    /// Iterate over all domains.
    pub fn iter(&self) -> impl Iterator<Item = Option<&Dataset>> + '_ {
        self.domains.iter().map(|d| d.as_ref())
    }
}

impl MeshPartition for Partition {
    fn num_domains(&self) -> usize {
        self.domains.len()
    }

    fn dataset(&self, domain: usize) -> Option<&Dataset> {
        self.domains.get(domain).and_then(|d| d.as_ref())
    }

    fn set_dataset(&mut self, domain: usize, dataset: Dataset) {
        if domain >= self.domains.len() {
            self.domains.resize(domain + 1, None);
        }
        self.domains[domain] = Some(dataset);
    }
}
