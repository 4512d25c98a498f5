//! Base trait for neural network modules.

use crate::tensor::Tensor;

/// Interface shared by every layer that maps one tensor to another.
///
/// Parameters are exposed as plain tensors so an external optimizer can
/// update them in place between forward passes. After such an update,
/// call [`Module::refresh_caches`] so derived state (for example a cached
/// transposed weight) matches the new parameters.
pub trait Module {
    /// Apply the module to `input`.
    fn forward(&self, input: &Tensor) -> Tensor;

    /// All learnable parameters, in a stable order.
    fn parameters(&self) -> Vec<&Tensor> {
        Vec::new()
    }

    /// Mutable access to all learnable parameters, same order as
    /// [`Module::parameters`].
    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        Vec::new()
    }

    /// Total number of learnable scalars.
    fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|p| p.numel()).sum()
    }

    /// Recompute caches derived from the parameters.
    fn refresh_caches(&mut self) {}
}
