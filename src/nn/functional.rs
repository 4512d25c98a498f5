//! Functional interface for log-softmax.
//!
//! Stateless functions over the last dimension of a tensor. A 1D tensor is
//! one row; a 2D tensor `[N, C]` is `N` independent rows.
//!
//! # Example
//!
//! ```
//! use adaptive_softmax::nn::F;
//! use adaptive_softmax::tensor::Tensor;
//!
//! let logits = Tensor::new(&[1.0, 2.0, 3.0, 0.0, 0.0, 0.0], &[2, 3]);
//! let log_probs = F::log_softmax(&logits);
//! let row_sums = log_probs.exp().sum_rows();
//! assert!(row_sums.data().iter().all(|s| (s - 1.0).abs() < 1e-6));
//! ```

use crate::tensor::Tensor;

/// Log-softmax on a 1D slice of f32 values.
///
/// Equation: log\_softmax(x)\_i = x\_i - max - log(sum exp(x\_j - max))
#[must_use]
pub fn log_softmax_1d(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let log_sum_exp: f32 = logits.iter().map(|&x| (x - max).exp()).sum::<f32>().ln();
    logits.iter().map(|&x| x - max - log_sum_exp).collect()
}

/// Log-softmax along the last dimension of a 1D or 2D tensor.
#[must_use]
pub fn log_softmax(x: &Tensor) -> Tensor {
    rowwise(x, log_softmax_1d)
}

fn rowwise(x: &Tensor, f: fn(&[f32]) -> Vec<f32>) -> Tensor {
    assert!(
        matches!(x.ndim(), 1 | 2),
        "log_softmax supports 1D or 2D tensors, got shape {:?}",
        x.shape()
    );
    let cols = x.shape()[x.ndim() - 1];
    if cols == 0 {
        return x.clone();
    }

    let mut output = Vec::with_capacity(x.numel());
    for row in x.data().chunks(cols) {
        output.extend(f(row));
    }
    Tensor::from_vec(output, x.shape())
}
