//! Tensor operations.
//!
//! Matrix multiplication goes through trueno's SIMD-accelerated matmul;
//! the remaining operations are plain loops over the row-major buffer.

use super::Tensor;

// ============================================================================
// Element-wise Operations
// ============================================================================

impl Tensor {
    /// Negation: z = -self
    #[must_use]
    pub fn neg(&self) -> Tensor {
        self.map(|v| -v)
    }

    /// Scalar multiplication: z = self * scalar
    #[must_use]
    pub fn mul_scalar(&self, scalar: f32) -> Tensor {
        self.map(|v| v * scalar)
    }

    /// Element-wise absolute value
    #[must_use]
    pub fn abs(&self) -> Tensor {
        self.map(f32::abs)
    }

    /// Element-wise exponential: z = exp(self)
    #[must_use]
    pub fn exp(&self) -> Tensor {
        self.map(f32::exp)
    }

    fn map(&self, f: impl Fn(f32) -> f32) -> Tensor {
        let data: Vec<f32> = self.data().iter().map(|&v| f(v)).collect();
        Tensor::from_vec(data, self.shape())
    }
}

// ============================================================================
// Reduction Operations
// ============================================================================

impl Tensor {
    /// Sum all elements: z = sum(self)
    #[must_use]
    pub fn sum(&self) -> Tensor {
        let sum: f32 = self.data().iter().sum();
        Tensor::new(&[sum], &[1])
    }

    /// Mean of all elements: z = mean(self)
    #[must_use]
    pub fn mean(&self) -> Tensor {
        self.sum().mul_scalar(1.0 / self.numel() as f32)
    }

    /// Sum along the last dimension of a 2D tensor: `[N, C]` -> `[N]`.
    #[must_use]
    pub fn sum_rows(&self) -> Tensor {
        assert_eq!(self.ndim(), 2, "sum_rows requires a 2D tensor");
        let rows = self.shape()[0];
        let data: Vec<f32> = (0..rows).map(|i| self.row(i).iter().sum()).collect();
        Tensor::from_vec(data, &[rows])
    }

    /// Index of the maximum of every row of a 2D tensor.
    ///
    /// Ties resolve to the first maximal column.
    #[must_use]
    pub fn argmax_rows(&self) -> Vec<usize> {
        assert_eq!(self.ndim(), 2, "argmax_rows requires a 2D tensor");
        (0..self.shape()[0])
            .map(|i| argmax(self.row(i)))
            .collect()
    }
}

/// Index of the first maximum of a slice (0 for an empty slice).
pub(crate) fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (j, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = j;
        }
    }
    best
}

// ============================================================================
// Linear Algebra
// ============================================================================

impl Tensor {
    /// Matrix multiplication: z = self @ other
    ///
    /// Supports 2D tensors only.
    #[must_use]
    pub fn matmul(&self, other: &Tensor) -> Tensor {
        assert_eq!(self.ndim(), 2, "matmul requires 2D tensors");
        assert_eq!(other.ndim(), 2, "matmul requires 2D tensors");

        let (m, k1) = (self.shape()[0], self.shape()[1]);
        let (k2, n) = (other.shape()[0], other.shape()[1]);
        assert_eq!(k1, k2, "matmul dimension mismatch: {k1} vs {k2}");

        if m == 0 || n == 0 || k1 == 0 {
            return Tensor::zeros(&[m, n]);
        }

        let a_matrix =
            trueno::Matrix::from_vec(m, k1, self.data().to_vec()).expect("valid matrix dimensions");
        let b_matrix = trueno::Matrix::from_vec(k2, n, other.data().to_vec())
            .expect("valid matrix dimensions");
        let result_matrix = a_matrix.matmul(&b_matrix).expect("matmul should succeed");

        Tensor::from_vec(result_matrix.as_slice().to_vec(), &[m, n])
    }

    /// Transpose a 2D tensor.
    #[must_use]
    pub fn transpose(&self) -> Tensor {
        assert_eq!(self.ndim(), 2, "transpose requires 2D tensor");

        let (rows, cols) = (self.shape()[0], self.shape()[1]);
        let mut data = vec![0.0; rows * cols];

        for i in 0..rows {
            for j in 0..cols {
                data[j * rows + i] = self.data()[i * cols + j];
            }
        }

        Tensor::from_vec(data, &[cols, rows])
    }

    /// Broadcast addition: z = matrix + vector (broadcasts over rows).
    ///
    /// # Shape
    ///
    /// - self: `[N, M]` (2D matrix)
    /// - other: `[M]` (1D vector)
    /// - output: `[N, M]`
    #[must_use]
    pub fn broadcast_add(&self, other: &Tensor) -> Tensor {
        assert_eq!(self.ndim(), 2, "broadcast_add requires 2D matrix");
        assert_eq!(other.ndim(), 1, "broadcast_add requires 1D vector");
        assert_eq!(
            self.shape()[1],
            other.shape()[0],
            "Matrix columns {} must match vector length {}",
            self.shape()[1],
            other.shape()[0]
        );

        let cols = self.shape()[1];
        let data: Vec<f32> = self
            .data()
            .iter()
            .enumerate()
            .map(|(idx, &v)| v + other.data()[idx % cols])
            .collect();

        Tensor::from_vec(data, self.shape())
    }

    /// Reshape tensor to a new shape.
    ///
    /// The total number of elements must remain the same.
    #[must_use]
    pub fn view(&self, new_shape: &[usize]) -> Tensor {
        let old_numel = self.numel();
        let new_numel: usize = new_shape.iter().product();
        assert_eq!(
            old_numel, new_numel,
            "view: number of elements must match ({old_numel} vs {new_numel})"
        );

        Tensor::new(self.data(), new_shape)
    }
}

// ============================================================================
// Indexing
// ============================================================================

impl Tensor {
    /// Select rows of a 2D tensor: `[N, C]` -> `[indices.len(), C]`.
    #[must_use]
    pub fn index_select_rows(&self, indices: &[usize]) -> Tensor {
        assert_eq!(self.ndim(), 2, "index_select_rows requires a 2D tensor");
        let (rows, cols) = (self.shape()[0], self.shape()[1]);
        let mut data = Vec::with_capacity(indices.len() * cols);
        for &i in indices {
            assert!(i < rows, "row index {i} out of bounds for {rows} rows");
            data.extend_from_slice(self.row(i));
        }
        Tensor::from_vec(data, &[indices.len(), cols])
    }

    /// Pick one column per row: `out[i] = self[i, indices[i]]`.
    #[must_use]
    pub fn gather_rows(&self, indices: &[usize]) -> Tensor {
        assert_eq!(self.ndim(), 2, "gather_rows requires a 2D tensor");
        let (rows, cols) = (self.shape()[0], self.shape()[1]);
        assert_eq!(
            indices.len(),
            rows,
            "gather_rows: {} indices for {rows} rows",
            indices.len()
        );
        let data: Vec<f32> = indices
            .iter()
            .enumerate()
            .map(|(i, &j)| {
                assert!(j < cols, "gather index {j} out of bounds for {cols} columns");
                self.data()[i * cols + j]
            })
            .collect();
        Tensor::from_vec(data, &[rows])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elementwise() {
        let a = Tensor::from_slice(&[1.0, -2.0, 3.0]);
        assert_eq!(a.neg().data(), &[-1.0, 2.0, -3.0]);
        assert_eq!(a.abs().data(), &[1.0, 2.0, 3.0]);
        assert_eq!(a.mul_scalar(2.0).data(), &[2.0, -4.0, 6.0]);
        assert_eq!(Tensor::from_slice(&[0.0]).exp().data(), &[1.0]);
    }

    #[test]
    fn test_reductions() {
        let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        assert!((a.sum().item() - 10.0).abs() < 1e-6);
        assert!((a.mean().item() - 2.5).abs() < 1e-6);
        assert_eq!(a.sum_rows().data(), &[3.0, 7.0]);
    }

    #[test]
    fn test_argmax_rows_first_max_wins() {
        let a = Tensor::new(&[1.0, 3.0, 3.0, 5.0, 0.0, -1.0], &[2, 3]);
        assert_eq!(a.argmax_rows(), vec![1, 0]);
    }

    #[test]
    fn test_matmul() {
        let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let b = Tensor::new(&[1.0, 0.0, 0.0, 1.0, 1.0, 1.0], &[3, 2]);
        let c = a.matmul(&b);
        assert_eq!(c.shape(), &[2, 2]);
        let expected = [4.0, 5.0, 10.0, 11.0];
        for (x, y) in c.data().iter().zip(expected.iter()) {
            assert!((x - y).abs() < 1e-5);
        }
    }

    #[test]
    fn test_matmul_empty_rows() {
        let a = Tensor::zeros(&[0, 3]);
        let b = Tensor::ones(&[3, 2]);
        assert_eq!(a.matmul(&b).shape(), &[0, 2]);
    }

    #[test]
    #[should_panic(expected = "matmul dimension mismatch")]
    fn test_matmul_mismatch_panics() {
        let a = Tensor::ones(&[2, 3]);
        let b = Tensor::ones(&[2, 3]);
        let _ = a.matmul(&b);
    }

    #[test]
    fn test_transpose() {
        let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let t = a.transpose();
        assert_eq!(t.shape(), &[3, 2]);
        assert_eq!(t.data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_broadcast_add() {
        let m = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        let bias = Tensor::new(&[10.0, 20.0], &[2]);
        assert_eq!(m.broadcast_add(&bias).data(), &[11.0, 22.0, 13.0, 24.0]);
    }

    #[test]
    fn test_view() {
        let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let b = a.view(&[3, 2]);
        assert_eq!(b.shape(), &[3, 2]);
        assert_eq!(b.data(), a.data());
    }

    #[test]
    fn test_index_select_rows() {
        let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[3, 2]);
        let s = a.index_select_rows(&[2, 0]);
        assert_eq!(s.shape(), &[2, 2]);
        assert_eq!(s.data(), &[5.0, 6.0, 1.0, 2.0]);
        assert_eq!(a.index_select_rows(&[]).shape(), &[0, 2]);
    }

    #[test]
    fn test_gather_rows() {
        let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        assert_eq!(a.gather_rows(&[2, 0]).data(), &[3.0, 4.0]);
    }

    #[test]
    #[should_panic(expected = "gather index 3 out of bounds")]
    fn test_gather_rows_out_of_bounds_panics() {
        let a = Tensor::zeros(&[1, 3]);
        let _ = a.gather_rows(&[3]);
    }
}
