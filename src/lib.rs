//! Adaptive log-softmax with loss in pure Rust.
//!
//! A hierarchical softmax approximation for classification over large
//! vocabularies (language modeling). Frequent classes sit in a head
//! shortlist; the rest are split into clusters with progressively smaller
//! projections, so most samples never touch the full output layer.
//!
//! # Quick Start
//!
//! ```
//! use adaptive_softmax::prelude::*;
//!
//! let asm = AdaptiveLogSoftmaxWithLoss::from_config(
//!     &AdaptiveSoftmaxConfig::new(16, 20, vec![5, 10, 15]).with_div_value(2.0),
//! )?;
//!
//! let x = Tensor::randn_seeded(&[8, 16], 7);
//! let target = [0, 3, 5, 9, 10, 14, 15, 19];
//!
//! let out = asm.forward(&x, &target)?;
//! assert!(out.loss.item() > 0.0);
//!
//! let log_prob = asm.log_prob(&x)?;
//! let probs = log_prob.exp().sum_rows();
//! assert!(probs.data().iter().all(|p| (p - 1.0).abs() < 1e-5));
//!
//! assert_eq!(asm.predict(&x)?, log_prob.argmax_rows());
//! # Ok::<(), AdaptiveSoftmaxError>(())
//! ```
//!
//! # Modules
//!
//! - [`tensor`]: Dense row-major `f32` tensor
//! - [`nn`]: Linear layer, NLL loss, log-softmax, adaptive softmax
//! - [`error`]: Error type shared by every fallible operation

pub mod error;
pub mod nn;
pub mod prelude;
pub mod tensor;

pub use error::{AdaptiveSoftmaxError, Result};
