//! Two-stage projection of one tail cluster.

use crate::nn::{Linear, Module};
use crate::tensor::Tensor;

/// Bias-free `in_features -> hidden -> size` projection of a tail cluster.
#[derive(Debug, Clone)]
pub struct ClusterProjection {
    down: Linear,
    up: Linear,
}

impl ClusterProjection {
    /// Create the projection; `seeds` initialise the down and up weights.
    #[must_use]
    pub fn new(
        in_features: usize,
        hidden_features: usize,
        out_features: usize,
        seeds: (Option<u64>, Option<u64>),
    ) -> Self {
        Self {
            down: Linear::without_bias_with_seed(in_features, hidden_features, seeds.0),
            up: Linear::without_bias_with_seed(hidden_features, out_features, seeds.1),
        }
    }

    /// Reduced dimension between the two stages.
    #[must_use]
    pub fn hidden_features(&self) -> usize {
        self.down.out_features()
    }

    /// Number of classes in the cluster.
    #[must_use]
    pub fn out_features(&self) -> usize {
        self.up.out_features()
    }

    /// First stage, `[hidden, in_features]` weight.
    #[must_use]
    pub fn down(&self) -> &Linear {
        &self.down
    }

    /// Second stage, `[size, hidden]` weight.
    #[must_use]
    pub fn up(&self) -> &Linear {
        &self.up
    }

    /// Mutable first stage.
    pub fn down_mut(&mut self) -> &mut Linear {
        &mut self.down
    }

    /// Mutable second stage.
    pub fn up_mut(&mut self) -> &mut Linear {
        &mut self.up
    }
}

impl Module for ClusterProjection {
    fn forward(&self, input: &Tensor) -> Tensor {
        self.up.forward(&self.down.forward(input))
    }

    fn parameters(&self) -> Vec<&Tensor> {
        let mut params = self.down.parameters();
        params.extend(self.up.parameters());
        params
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = self.down.parameters_mut();
        params.extend(self.up.parameters_mut());
        params
    }

    fn refresh_caches(&mut self) {
        self.down.refresh_caches();
        self.up.refresh_caches();
    }
}
