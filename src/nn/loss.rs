//! Negative log likelihood loss.
//!
//! # Example
//!
//! ```
//! use adaptive_softmax::nn::loss::NLLLoss;
//! use adaptive_softmax::tensor::Tensor;
//!
//! let log_probs = Tensor::new(&[-2.0, -0.1, -3.0], &[1, 3]);
//! let loss = NLLLoss::new().forward(&log_probs, &[1]);
//! assert!((loss.item() - 0.1).abs() < 1e-6);
//! ```
//!
//! # References
//!
//! - Bishop, C. M. (2006). Pattern Recognition and Machine Learning. Springer.

use crate::tensor::Tensor;

/// Reduction mode for loss functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reduction {
    /// Return loss per element (no reduction)
    None,
    /// Return mean of losses (default)
    #[default]
    Mean,
}

impl Reduction {
    /// Apply the reduction to a per-sample loss vector.
    #[must_use]
    pub fn apply(self, losses: Tensor) -> Tensor {
        match self {
            Reduction::None => losses,
            Reduction::Mean => losses.mean(),
        }
    }
}

/// Negative Log Likelihood loss.
///
/// Expects log-probabilities as input (use after log_softmax).
#[derive(Debug, Clone, Copy, Default)]
pub struct NLLLoss {
    reduction: Reduction,
}

impl NLLLoss {
    /// Create an NLLLoss with mean reduction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an NLLLoss with the given reduction.
    #[must_use]
    pub fn with_reduction(reduction: Reduction) -> Self {
        Self { reduction }
    }

    /// Compute `-log_probs[i, targets[i]]`, reduced.
    ///
    /// # Panics
    ///
    /// Panics if `log_probs` is not `[N, C]`, `targets` does not hold `N`
    /// entries, or a target is `>= C`.
    #[must_use]
    pub fn forward(&self, log_probs: &Tensor, targets: &[usize]) -> Tensor {
        assert_eq!(log_probs.ndim(), 2, "NLLLoss expects [N, C] log-probabilities");
        self.reduction.apply(log_probs.gather_rows(targets).neg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nll_loss() {
        // Log-probs where class 1 has highest probability
        let log_probs = Tensor::new(&[-2.0, -0.1, -3.0], &[1, 3]);

        let criterion = NLLLoss::new();
        let loss = criterion.forward(&log_probs, &[1]);

        // NLL = -log_probs[target] = -(-0.1) = 0.1
        assert!((loss.item() - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_reduction_modes() {
        let log_probs = Tensor::new(&[-1.0, -2.0, -3.0, -4.0], &[2, 2]);
        let targets = [0, 1];

        let loss = NLLLoss::with_reduction(Reduction::None).forward(&log_probs, &targets);
        assert_eq!(loss.shape(), &[2]);
        assert_eq!(loss.data(), &[1.0, 4.0]);

        let loss = NLLLoss::with_reduction(Reduction::Mean).forward(&log_probs, &targets);
        assert!((loss.item() - 2.5).abs() < 1e-5);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_nll_loss_target_out_of_bounds_panics() {
        let log_probs = Tensor::new(&[-0.5, -1.0], &[1, 2]);
        let _ = NLLLoss::new().forward(&log_probs, &[2]);
    }
}
