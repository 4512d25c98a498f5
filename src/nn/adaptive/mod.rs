//! Adaptive log-softmax with loss.
//!
//! An efficient softmax approximation for large output spaces (Grave et
//! al., 2017). Classes are sorted by frequency and split by `cutoffs` into
//! a head shortlist and tail clusters:
//!
//! - the head projects the input to the shortlist logits plus one logit
//!   per cluster,
//! - each cluster projects the input through a reduced hidden dimension
//!   (`in_features / div_value^(i + 1)`) to the classes of the cluster.
//!
//! The log-probability of a tail class is the head log-probability of its
//! cluster plus the cluster-local log-softmax of the class.
//!
//! # Example
//!
//! ```
//! use adaptive_softmax::nn::AdaptiveLogSoftmaxWithLoss;
//! use adaptive_softmax::tensor::Tensor;
//!
//! let asm = AdaptiveLogSoftmaxWithLoss::new(16, 20, &[5, 10, 15])?;
//! let x = Tensor::randn_seeded(&[4, 16], 0);
//!
//! let out = asm.forward(&x, &[0, 7, 12, 19])?;
//! assert_eq!(out.output.shape(), &[4]);
//!
//! let predictions = asm.predict(&x)?;
//! assert_eq!(predictions.len(), 4);
//! # Ok::<(), adaptive_softmax::error::AdaptiveSoftmaxError>(())
//! ```
//!
//! # References
//!
//! - Grave, E., Joulin, A., Cissé, M., Grangier, D., & Jégou, H. (2017).
//!   Efficient softmax approximation for GPUs. ICML.

mod cluster;
mod config;
mod cutoffs;

pub use cluster::ClusterProjection;
pub use config::AdaptiveSoftmaxConfig;
pub use cutoffs::{Cutoffs, Segment};

use std::ops::Range;

use tracing::{debug, instrument};

use super::functional as F;
use super::{Linear, Module};
use crate::error::{AdaptiveSoftmaxError, Result};
use crate::tensor::Tensor;

/// Result of [`AdaptiveLogSoftmaxWithLoss::forward`].
#[derive(Debug, Clone)]
pub struct AdaptiveOutput {
    /// Log-probability of each sample's target, `[N]` (`[]` for unbatched input)
    pub output: Tensor,
    /// Mean negative log-likelihood, `[1]`
    pub loss: Tensor,
}

impl AdaptiveOutput {
    /// Split into `(output, loss)`.
    #[must_use]
    pub fn into_parts(self) -> (Tensor, Tensor) {
        (self.output, self.loss)
    }
}

/// Adaptive log-softmax layer with NLL loss.
///
/// # Shape
///
/// - Input: `[N, in_features]` or `[in_features]`
/// - Target: `N` class indices (one for unbatched input)
/// - `log_prob` output: `[N, n_classes]` or `[n_classes]`
pub struct AdaptiveLogSoftmaxWithLoss {
    in_features: usize,
    div_value: f64,
    cutoffs: Cutoffs,
    /// `in_features -> shortlist_size + n_clusters`
    head: Linear,
    tail: Vec<ClusterProjection>,
}

impl AdaptiveLogSoftmaxWithLoss {
    /// Create a layer with the default `div_value` and no head bias.
    ///
    /// # Errors
    ///
    /// See [`AdaptiveSoftmaxConfig::validate`].
    pub fn new(in_features: usize, n_classes: usize, cutoffs: &[usize]) -> Result<Self> {
        Self::from_config(&AdaptiveSoftmaxConfig::new(in_features, n_classes, cutoffs))
    }

    /// Create a layer from a full configuration.
    ///
    /// # Errors
    ///
    /// See [`AdaptiveSoftmaxConfig::validate`].
    #[instrument(
        level = "debug",
        skip(config),
        fields(
            in_features = config.in_features,
            n_classes = config.n_classes,
            cutoffs = ?config.cutoffs,
        ),
        err
    )]
    pub fn from_config(config: &AdaptiveSoftmaxConfig) -> Result<Self> {
        let cutoffs = config.validate()?;
        let seed_for = |offset: u64| config.seed.map(|s| s.wrapping_add(offset));

        let head = if config.head_bias {
            Linear::with_seed(config.in_features, cutoffs.head_size(), seed_for(0))
        } else {
            Linear::without_bias_with_seed(config.in_features, cutoffs.head_size(), seed_for(0))
        };

        let tail: Vec<ClusterProjection> = (0..cutoffs.n_clusters())
            .map(|i| {
                let offset = 2 * i as u64;
                ClusterProjection::new(
                    config.in_features,
                    config.hidden_features(i),
                    cutoffs.cluster_size(i),
                    (seed_for(offset + 1), seed_for(offset + 2)),
                )
            })
            .collect();

        debug!(
            shortlist_size = cutoffs.shortlist_size(),
            n_clusters = cutoffs.n_clusters(),
            hidden = ?tail.iter().map(ClusterProjection::hidden_features).collect::<Vec<_>>(),
            "built adaptive softmax"
        );

        Ok(Self {
            in_features: config.in_features,
            div_value: config.div_value,
            cutoffs,
            head,
            tail,
        })
    }

    /// Log-probability of each target and the mean NLL loss.
    ///
    /// Only the clusters that contain at least one target are evaluated,
    /// and each only on the rows whose target it contains.
    ///
    /// # Errors
    ///
    /// - [`AdaptiveSoftmaxError::ShapeMismatch`] when the input is not
    ///   `[N, in_features]` / `[in_features]`, the batch is empty, or
    ///   `target.len()` differs from `N`
    /// - [`AdaptiveSoftmaxError::TargetOutOfRange`] when a target is
    ///   `>= n_classes`
    #[instrument(
        level = "debug",
        skip(self, input, target),
        fields(shape = ?input.shape(), targets = target.len()),
        err
    )]
    pub fn forward(&self, input: &Tensor, target: &[usize]) -> Result<AdaptiveOutput> {
        let (x, unbatched) = self.batch_view(input)?;
        let batch = x.shape()[0];

        if target.len() != batch {
            return Err(AdaptiveSoftmaxError::ShapeMismatch {
                expected: format!(
                    "input and target with the same size in the batch dimension ({batch})"
                ),
                actual: format!("{} targets", target.len()),
            });
        }
        self.check_targets(target)?;

        let shortlist_size = self.shortlist_size();
        let mut output = vec![0.0_f32; batch];
        let mut head_index = vec![0_usize; batch];
        let mut cluster_rows: Vec<Vec<(usize, usize)>> = vec![Vec::new(); self.n_clusters()];

        for (row, &class) in target.iter().enumerate() {
            match self.cutoffs.locate(class) {
                Some(Segment::Shortlist) => head_index[row] = class,
                Some(Segment::Cluster { cluster, offset }) => {
                    head_index[row] = shortlist_size + cluster;
                    cluster_rows[cluster].push((row, offset));
                }
                None => unreachable!("targets checked against n_classes"),
            }
        }

        for (cluster, members) in cluster_rows.iter().enumerate() {
            if members.is_empty() {
                continue;
            }
            let (rows, offsets): (Vec<usize>, Vec<usize>) = members.iter().copied().unzip();
            let logits = self.tail[cluster].forward(&x.index_select_rows(&rows));
            let local = F::log_softmax(&logits).gather_rows(&offsets);
            for (&row, &lp) in rows.iter().zip(local.data()) {
                output[row] = lp;
            }
        }

        let head_logprob = F::log_softmax(&self.head.forward(&x));
        for (o, &lp) in output
            .iter_mut()
            .zip(head_logprob.gather_rows(&head_index).data())
        {
            *o += lp;
        }

        let output = Tensor::from_vec(output, &[batch]);
        let loss = output.neg().mean();
        let output = if unbatched { output.view(&[]) } else { output };

        Ok(AdaptiveOutput { output, loss })
    }

    /// Log-probabilities of every class.
    ///
    /// # Errors
    ///
    /// [`AdaptiveSoftmaxError::ShapeMismatch`] when the input is not
    /// `[N, in_features]` / `[in_features]` or the batch is empty.
    #[instrument(level = "debug", skip(self, input), fields(shape = ?input.shape()), err)]
    pub fn log_prob(&self, input: &Tensor) -> Result<Tensor> {
        let (x, unbatched) = self.batch_view(input)?;
        let head_logprob = F::log_softmax(&self.head.forward(&x));
        let log_prob = self.full_log_prob(&x, &head_logprob);

        Ok(if unbatched {
            log_prob.view(&[self.n_classes()])
        } else {
            log_prob
        })
    }

    /// Most likely class of every sample.
    ///
    /// Equal to `log_prob(input)?.argmax_rows()`. Rows whose head argmax is
    /// a shortlist class are answered from the head alone; the full
    /// distribution is computed only for the remaining rows.
    ///
    /// # Errors
    ///
    /// [`AdaptiveSoftmaxError::ShapeMismatch`] when the input is not
    /// `[N, in_features]` / `[in_features]` or the batch is empty.
    #[instrument(level = "debug", skip(self, input), fields(shape = ?input.shape()), err)]
    pub fn predict(&self, input: &Tensor) -> Result<Vec<usize>> {
        let (x, _) = self.batch_view(input)?;
        let batch = x.shape()[0];
        let shortlist_size = self.shortlist_size();

        let head_logprob = F::log_softmax(&self.head.forward(&x));
        let mut prediction = head_logprob.argmax_rows();

        let tail_rows: Vec<usize> = prediction
            .iter()
            .enumerate()
            .filter(|&(_, &class)| class >= shortlist_size)
            .map(|(row, _)| row)
            .collect();

        if tail_rows.is_empty() {
            return Ok(prediction);
        }
        debug!(
            tail_rows = tail_rows.len(),
            batch, "head argmax outside shortlist, computing full distribution"
        );

        if tail_rows.len() == batch {
            return Ok(self.full_log_prob(&x, &head_logprob).argmax_rows());
        }

        let best = self
            .full_log_prob(
                &x.index_select_rows(&tail_rows),
                &head_logprob.index_select_rows(&tail_rows),
            )
            .argmax_rows();
        for (&row, class) in tail_rows.iter().zip(best) {
            prediction[row] = class;
        }

        Ok(prediction)
    }

    /// `[N, n_classes]` log-probabilities from the head log-softmax.
    fn full_log_prob(&self, x: &Tensor, head_logprob: &Tensor) -> Tensor {
        let batch = x.shape()[0];
        let shortlist_size = self.shortlist_size();
        let mut out = Tensor::zeros(&[batch, self.n_classes()]);

        for row in 0..batch {
            out.row_mut(row)[..shortlist_size]
                .copy_from_slice(&head_logprob.row(row)[..shortlist_size]);
        }

        for (cluster, projection) in self.tail.iter().enumerate() {
            let range = self.cutoffs.cluster_range(cluster);
            let local = F::log_softmax(&projection.forward(x));
            for row in 0..batch {
                let selector = head_logprob.row(row)[shortlist_size + cluster];
                for (dst, &lp) in out.row_mut(row)[range.clone()]
                    .iter_mut()
                    .zip(local.row(row))
                {
                    *dst = selector + lp;
                }
            }
        }

        out
    }

    /// Promote `input` to `[N, in_features]`, flagging unbatched input.
    fn batch_view(&self, input: &Tensor) -> Result<(Tensor, bool)> {
        let (x, unbatched) = match *input.shape() {
            [features] => (input.view(&[1, features]), true),
            [_, _] => (input.clone(), false),
            _ => {
                return Err(AdaptiveSoftmaxError::ShapeMismatch {
                    expected: format!("[N, {0}] or [{0}] input", self.in_features),
                    actual: format!("{:?}", input.shape()),
                })
            }
        };

        if x.shape()[1] != self.in_features {
            return Err(AdaptiveSoftmaxError::shape_mismatch(
                "in_features",
                self.in_features,
                x.shape()[1],
            ));
        }
        if x.shape()[0] == 0 {
            return Err(AdaptiveSoftmaxError::ShapeMismatch {
                expected: "a non-empty batch".to_string(),
                actual: format!("{:?}", input.shape()),
            });
        }

        Ok((x, unbatched))
    }

    fn check_targets(&self, target: &[usize]) -> Result<()> {
        let n_classes = self.n_classes();
        if target.iter().all(|&t| t < n_classes) {
            return Ok(());
        }
        let min = target.iter().copied().min().unwrap_or(0);
        let max = target.iter().copied().max().unwrap_or(0);
        Err(AdaptiveSoftmaxError::TargetOutOfRange {
            n_classes,
            min,
            max,
        })
    }

    /// Feature dimension of every input row.
    #[must_use]
    pub fn in_features(&self) -> usize {
        self.in_features
    }

    /// Vocabulary size.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.cutoffs.n_classes()
    }

    /// Cutoffs followed by `n_classes`.
    #[must_use]
    pub fn cutoffs(&self) -> &[usize] {
        self.cutoffs.as_slice()
    }

    /// Validated class partition.
    #[must_use]
    pub fn partition(&self) -> &Cutoffs {
        &self.cutoffs
    }

    /// Number of classes predicted directly by the head.
    #[must_use]
    pub fn shortlist_size(&self) -> usize {
        self.cutoffs.shortlist_size()
    }

    /// Number of tail clusters.
    #[must_use]
    pub fn n_clusters(&self) -> usize {
        self.cutoffs.n_clusters()
    }

    /// Output width of the head projection.
    #[must_use]
    pub fn head_size(&self) -> usize {
        self.cutoffs.head_size()
    }

    /// Divisor of the cluster hidden widths.
    #[must_use]
    pub fn div_value(&self) -> f64 {
        self.div_value
    }

    /// Class range of cluster `cluster`.
    ///
    /// # Panics
    ///
    /// Panics if `cluster >= n_clusters()`.
    #[must_use]
    pub fn cluster_range(&self, cluster: usize) -> Range<usize> {
        self.cutoffs.cluster_range(cluster)
    }

    /// Head projection.
    #[must_use]
    pub fn head(&self) -> &Linear {
        &self.head
    }

    /// Mutable head projection; call [`Self::refresh_caches`] after
    /// editing weights in place.
    pub fn head_mut(&mut self) -> &mut Linear {
        &mut self.head
    }

    /// Tail cluster projections.
    #[must_use]
    pub fn tail(&self) -> &[ClusterProjection] {
        &self.tail
    }

    /// Mutable tail projections; call [`Self::refresh_caches`] after
    /// editing weights in place.
    pub fn tail_mut(&mut self) -> &mut [ClusterProjection] {
        &mut self.tail
    }

    /// Head parameters followed by each cluster's down and up weights.
    #[must_use]
    pub fn parameters(&self) -> Vec<&Tensor> {
        let mut params = self.head.parameters();
        for cluster in &self.tail {
            params.extend(cluster.parameters());
        }
        params
    }

    /// Mutable parameters, same order as [`Self::parameters`].
    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = self.head.parameters_mut();
        for cluster in &mut self.tail {
            params.extend(cluster.parameters_mut());
        }
        params
    }

    /// Total number of learnable scalars.
    #[must_use]
    pub fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|p| p.numel()).sum()
    }

    /// Recompute cached transposed weights after in-place parameter edits.
    pub fn refresh_caches(&mut self) {
        self.head.refresh_caches();
        for cluster in &mut self.tail {
            cluster.refresh_caches();
        }
    }
}

impl std::fmt::Debug for AdaptiveLogSoftmaxWithLoss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptiveLogSoftmaxWithLoss")
            .field("in_features", &self.in_features)
            .field("n_classes", &self.n_classes())
            .field("cutoffs", &self.cutoffs())
            .field("div_value", &self.div_value)
            .field("head_bias", &self.head.has_bias())
            .finish_non_exhaustive()
    }
}
