//! Fully connected (linear) layer.
//!
//! Implements the transformation y = xW^T + b.
//!
//! # References
//!
//! - Glorot, X., & Bengio, Y. (2010). Understanding the difficulty of training
//!   deep feedforward neural networks. AISTATS.

use super::init::xavier_uniform;
use super::module::Module;
use crate::tensor::Tensor;

/// Fully connected layer: y = xW^T + b
///
/// Weight initialization follows Xavier/Glorot (Glorot & Bengio, 2010).
///
/// # Shape
///
/// - Input: `(*, in_features)` where `*` means any number of batch dimensions
/// - Output: `(*, out_features)`
///
/// # Example
///
/// ```
/// use adaptive_softmax::nn::{Linear, Module};
/// use adaptive_softmax::tensor::Tensor;
///
/// let layer = Linear::new(20, 30);
/// let x = Tensor::ones(&[128, 20]);
/// let output = layer.forward(&x);
///
/// assert_eq!(output.shape(), &[128, 30]);
/// ```
#[derive(Clone)]
pub struct Linear {
    /// Weight matrix, shape: [out_features, in_features]
    weight: Tensor,

    /// Cached transposed weight [in_features, out_features] for forward
    weight_t: Tensor,

    /// Bias vector, shape: [out_features], or None if bias=false
    bias: Option<Tensor>,

    /// Number of input features
    in_features: usize,

    /// Number of output features
    out_features: usize,
}

impl Linear {
    /// Create a new Linear layer with Xavier initialization.
    ///
    /// # Arguments
    ///
    /// * `in_features` - Number of input features
    /// * `out_features` - Number of output features
    #[must_use]
    pub fn new(in_features: usize, out_features: usize) -> Self {
        Self::with_seed(in_features, out_features, None)
    }

    /// Create a Linear layer with a specific random seed.
    #[must_use]
    pub fn with_seed(in_features: usize, out_features: usize, seed: Option<u64>) -> Self {
        let mut layer = Self::without_bias_with_seed(in_features, out_features, seed);
        layer.bias = Some(Tensor::zeros(&[out_features]));
        layer
    }

    /// Create a Linear layer without bias.
    #[must_use]
    pub fn without_bias(in_features: usize, out_features: usize) -> Self {
        Self::without_bias_with_seed(in_features, out_features, None)
    }

    /// Create a Linear layer without bias with a specific random seed.
    #[must_use]
    pub fn without_bias_with_seed(
        in_features: usize,
        out_features: usize,
        seed: Option<u64>,
    ) -> Self {
        let weight = xavier_uniform(
            &[out_features, in_features],
            in_features,
            out_features,
            seed,
        );
        let weight_t = weight.transpose();

        Self {
            weight,
            weight_t,
            bias: None,
            in_features,
            out_features,
        }
    }

    /// Get the input feature dimension.
    #[must_use]
    pub fn in_features(&self) -> usize {
        self.in_features
    }

    /// Get the output feature dimension.
    #[must_use]
    pub fn out_features(&self) -> usize {
        self.out_features
    }

    /// Check if this layer has a bias term.
    #[must_use]
    pub fn has_bias(&self) -> bool {
        self.bias.is_some()
    }

    /// Replace the weight tensor and refresh the cached transpose.
    ///
    /// # Panics
    ///
    /// Panics if `weight` is not `[out_features, in_features]`.
    pub fn set_weight(&mut self, weight: Tensor) {
        assert_eq!(
            weight.shape(),
            &[self.out_features, self.in_features],
            "set_weight: expected shape [{}, {}]",
            self.out_features,
            self.in_features
        );
        self.weight_t = weight.transpose();
        self.weight = weight;
    }

    /// Replace (or add) the bias vector.
    ///
    /// # Panics
    ///
    /// Panics if `bias` is not `[out_features]`.
    pub fn set_bias(&mut self, bias: Tensor) {
        assert_eq!(
            bias.shape(),
            &[self.out_features],
            "set_bias: expected shape [{}]",
            self.out_features
        );
        self.bias = Some(bias);
    }

    /// Get reference to weight tensor.
    #[must_use]
    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    /// Mutable weight for in-place edits.
    ///
    /// Call [`Module::refresh_caches`] afterwards, otherwise `forward` keeps
    /// using the previous weights.
    pub fn weight_mut(&mut self) -> &mut Tensor {
        &mut self.weight
    }

    /// Get reference to bias tensor if present.
    #[must_use]
    pub fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }

    /// Mutable bias, if present.
    pub fn bias_mut(&mut self) -> Option<&mut Tensor> {
        self.bias.as_mut()
    }
}

impl Module for Linear {
    fn forward(&self, input: &Tensor) -> Tensor {
        // y = x @ W^T + b
        let input_shape = input.shape();
        let ndim = input_shape.len();

        // Flatten batch dimensions, promote a single vector to a batch of one
        let (reshaped, batch_shape) = match ndim {
            0 => panic!("Linear requires at least a 1D input"),
            1 => (input.view(&[1, input_shape[0]]), Some(Vec::new())),
            2 => (input.clone(), None),
            _ => {
                let batch_size: usize = input_shape[..ndim - 1].iter().product();
                let batch_shape: Vec<usize> = input_shape[..ndim - 1].to_vec();
                (
                    input.view(&[batch_size, input_shape[ndim - 1]]),
                    Some(batch_shape),
                )
            }
        };

        let output = reshaped.matmul(&self.weight_t);

        let output = match &self.bias {
            Some(b) => output.broadcast_add(b),
            None => output,
        };

        match batch_shape {
            Some(mut shape) => {
                shape.push(self.out_features);
                output.view(&shape)
            }
            None => output,
        }
    }

    fn parameters(&self) -> Vec<&Tensor> {
        match &self.bias {
            Some(b) => vec![&self.weight, b],
            None => vec![&self.weight],
        }
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        match &mut self.bias {
            Some(b) => vec![&mut self.weight, b],
            None => vec![&mut self.weight],
        }
    }

    fn refresh_caches(&mut self) {
        self.weight_t = self.weight.transpose();
    }
}

impl std::fmt::Debug for Linear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Linear")
            .field("in_features", &self.in_features)
            .field("out_features", &self.out_features)
            .field("bias", &self.bias.is_some())
            .finish_non_exhaustive()
    }
}
