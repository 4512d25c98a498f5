//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use adaptive_softmax::prelude::*;
//! ```

pub use crate::error::{AdaptiveSoftmaxError, CutoffViolation, Result};
pub use crate::nn::{
    AdaptiveLogSoftmaxWithLoss, AdaptiveOutput, AdaptiveSoftmaxConfig, Linear, Module, NLLLoss,
    Reduction, F,
};
pub use crate::tensor::Tensor;
