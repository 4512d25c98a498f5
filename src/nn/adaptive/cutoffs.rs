//! Vocabulary partition into a head shortlist and tail clusters.

use std::ops::Range;

use crate::error::{AdaptiveSoftmaxError, CutoffViolation, Result};

/// Where a class lives in the partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Predicted directly by the head.
    Shortlist,
    /// Member of tail cluster `cluster` at position `offset` inside it.
    Cluster {
        /// Cluster index (0-based)
        cluster: usize,
        /// Class index relative to the cluster start
        offset: usize,
    },
}

/// Validated cutoffs.
///
/// Stores the user cutoffs followed by `n_classes`, so cluster `i` spans
/// `bounds[i]..bounds[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cutoffs {
    bounds: Vec<usize>,
}

impl Cutoffs {
    /// Validate `cutoffs` against `n_classes`.
    ///
    /// Cutoffs must be non-empty, positive, strictly increasing and at most
    /// `n_classes - 1`. The first broken rule is reported.
    ///
    /// # Errors
    ///
    /// Returns [`AdaptiveSoftmaxError::InvalidCutoffs`].
    pub fn new(cutoffs: &[usize], n_classes: usize) -> Result<Self> {
        let reject = |violation| AdaptiveSoftmaxError::InvalidCutoffs {
            cutoffs: cutoffs.to_vec(),
            n_classes,
            violation,
        };

        if cutoffs.is_empty() {
            return Err(reject(CutoffViolation::Empty));
        }

        for (index, &value) in cutoffs.iter().enumerate() {
            if value == 0 {
                return Err(reject(CutoffViolation::NonPositive { index }));
            }
            if index > 0 {
                let previous = cutoffs[index - 1];
                if value == previous {
                    return Err(reject(CutoffViolation::Duplicate { index, value }));
                }
                if value < previous {
                    return Err(reject(CutoffViolation::NotIncreasing {
                        index,
                        previous,
                        value,
                    }));
                }
            }
            if value >= n_classes {
                return Err(reject(CutoffViolation::OutOfRange { index, value }));
            }
        }

        let mut bounds = cutoffs.to_vec();
        bounds.push(n_classes);
        Ok(Self { bounds })
    }

    /// Number of classes predicted directly by the head.
    #[must_use]
    pub fn shortlist_size(&self) -> usize {
        self.bounds[0]
    }

    /// Number of tail clusters.
    #[must_use]
    pub fn n_clusters(&self) -> usize {
        self.bounds.len() - 1
    }

    /// Total number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.bounds[self.bounds.len() - 1]
    }

    /// Output width of the head: shortlist plus one selector per cluster.
    #[must_use]
    pub fn head_size(&self) -> usize {
        self.shortlist_size() + self.n_clusters()
    }

    /// Class range covered by cluster `cluster`.
    ///
    /// # Panics
    ///
    /// Panics if `cluster >= n_clusters()`.
    #[must_use]
    pub fn cluster_range(&self, cluster: usize) -> Range<usize> {
        assert!(
            cluster < self.n_clusters(),
            "cluster {cluster} out of range ({} clusters)",
            self.n_clusters()
        );
        self.bounds[cluster]..self.bounds[cluster + 1]
    }

    /// Number of classes in cluster `cluster`.
    #[must_use]
    pub fn cluster_size(&self, cluster: usize) -> usize {
        self.cluster_range(cluster).len()
    }

    /// Locate `class` in the partition, or `None` if `class >= n_classes`.
    #[must_use]
    pub fn locate(&self, class: usize) -> Option<Segment> {
        if class < self.shortlist_size() {
            return Some(Segment::Shortlist);
        }
        if class >= self.n_classes() {
            return None;
        }
        // bounds[..n_clusters] are the cluster starts, sorted ascending
        let starts = &self.bounds[..self.n_clusters()];
        let cluster = starts.partition_point(|&start| start <= class) - 1;
        Some(Segment::Cluster {
            cluster,
            offset: class - starts[cluster],
        })
    }

    /// Cutoffs followed by `n_classes`.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.bounds
    }
}
