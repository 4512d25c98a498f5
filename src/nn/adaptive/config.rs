//! Construction parameters for [`AdaptiveLogSoftmaxWithLoss`].
//!
//! [`AdaptiveLogSoftmaxWithLoss`]: super::AdaptiveLogSoftmaxWithLoss

use serde::{Deserialize, Serialize};

use super::cutoffs::Cutoffs;
use crate::error::{AdaptiveSoftmaxError, Result};

/// Adaptive softmax configuration.
///
/// `div_value`, `head_bias` and `seed` may be omitted when deserializing.
///
/// # Example
///
/// ```
/// use adaptive_softmax::nn::AdaptiveSoftmaxConfig;
///
/// let config = AdaptiveSoftmaxConfig::new(16, 20, vec![5, 10, 15])
///     .with_div_value(2.0)
///     .with_head_bias(true);
/// assert_eq!(config.hidden_features(2), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveSoftmaxConfig {
    /// Feature dimension of every input row
    pub in_features: usize,
    /// Vocabulary size
    pub n_classes: usize,
    /// Class boundaries between shortlist and clusters
    pub cutoffs: Vec<usize>,
    /// Shrink factor of cluster hidden sizes
    #[serde(default = "default_div_value")]
    pub div_value: f64,
    /// Whether the head projection has a bias
    #[serde(default)]
    pub head_bias: bool,
    /// Seed for reproducible weight initialisation
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_div_value() -> f64 {
    AdaptiveSoftmaxConfig::DEFAULT_DIV_VALUE
}

impl AdaptiveSoftmaxConfig {
    /// Default `div_value`.
    pub const DEFAULT_DIV_VALUE: f64 = 4.0;

    /// Configuration with default `div_value`, no head bias and no seed.
    #[must_use]
    pub fn new(in_features: usize, n_classes: usize, cutoffs: impl Into<Vec<usize>>) -> Self {
        Self {
            in_features,
            n_classes,
            cutoffs: cutoffs.into(),
            div_value: Self::DEFAULT_DIV_VALUE,
            head_bias: false,
            seed: None,
        }
    }

    /// Set the hidden-width divisor.
    #[must_use]
    pub fn with_div_value(mut self, div_value: f64) -> Self {
        self.div_value = div_value;
        self
    }

    /// Give the head projection a bias.
    #[must_use]
    pub fn with_head_bias(mut self, head_bias: bool) -> Self {
        self.head_bias = head_bias;
        self
    }

    /// Seed every projection's initialisation.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Hidden width of cluster `cluster`:
    /// `max(1, floor(in_features / div_value^(cluster + 1)))`.
    #[must_use]
    pub fn hidden_features(&self, cluster: usize) -> usize {
        let exponent = i32::try_from(cluster + 1).unwrap_or(i32::MAX);
        let hidden = (self.in_features as f64 / self.div_value.powi(exponent)).floor();
        // float-to-int `as` saturates, NaN maps to 0
        (hidden as usize).max(1)
    }

    /// Check every parameter and build the class partition.
    ///
    /// # Errors
    ///
    /// [`AdaptiveSoftmaxError::InvalidHyperparameter`] for a zero
    /// dimension or a `div_value` that is not a finite number above 1,
    /// [`AdaptiveSoftmaxError::InvalidCutoffs`] for bad cutoffs.
    pub fn validate(&self) -> Result<Cutoffs> {
        if self.in_features == 0 {
            return Err(AdaptiveSoftmaxError::invalid_hyperparameter(
                "in_features",
                self.in_features,
                "> 0",
            ));
        }
        if self.n_classes == 0 {
            return Err(AdaptiveSoftmaxError::invalid_hyperparameter(
                "n_classes",
                self.n_classes,
                "> 0",
            ));
        }
        if !(self.div_value.is_finite() && self.div_value > 1.0) {
            return Err(AdaptiveSoftmaxError::invalid_hyperparameter(
                "div_value",
                self.div_value,
                "a finite value > 1",
            ));
        }
        Cutoffs::new(&self.cutoffs, self.n_classes)
    }
}
