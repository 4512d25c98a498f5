//! Neural network modules.
//!
//! Organized around the [`Module`] trait, following the `PyTorch` module
//! API (Paszke et al., 2019):
//!
//! - **Layers**: [`Linear`], [`AdaptiveLogSoftmaxWithLoss`]
//! - **Losses**: [`NLLLoss`]
//! - **Functional**: [`F::log_softmax`]
//!
//! # Example
//!
//! ```
//! use adaptive_softmax::nn::{AdaptiveLogSoftmaxWithLoss, AdaptiveSoftmaxConfig};
//! use adaptive_softmax::tensor::Tensor;
//!
//! let config = AdaptiveSoftmaxConfig::new(8, 10, vec![4, 8])
//!     .with_div_value(2.0)
//!     .with_seed(42);
//! let asm = AdaptiveLogSoftmaxWithLoss::from_config(&config)?;
//!
//! let x = Tensor::randn_seeded(&[3, 8], 1);
//! let log_prob = asm.log_prob(&x)?;
//! assert_eq!(log_prob.shape(), &[3, 10]);
//! # Ok::<(), adaptive_softmax::error::AdaptiveSoftmaxError>(())
//! ```
//!
//! # References
//!
//! - Paszke, A., et al. (2019). `PyTorch`: An imperative style, high-performance
//!   deep learning library. `NeurIPS`.
//! - Grave, E., et al. (2017). Efficient softmax approximation for GPUs. ICML.

pub mod adaptive;
pub mod functional;
pub(crate) mod init;
mod linear;
pub mod loss;
mod module;

pub use adaptive::{
    AdaptiveLogSoftmaxWithLoss, AdaptiveOutput, AdaptiveSoftmaxConfig, ClusterProjection, Cutoffs,
    Segment,
};
pub use functional as F;
pub use init::xavier_uniform;
pub use linear::Linear;
pub use loss::{NLLLoss, Reduction};
pub use module::Module;
