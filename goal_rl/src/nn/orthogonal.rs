//! Linear layer with orthogonal weight initialization.
//!
//! Orthogonal weight matrices have unit singular values, so activations and
//! gradients keep their norm through the layer. For the small MLPs used as
//! manipulation policies this noticeably stabilizes the first few thousand
//! updates compared to uniform fan-in init, especially with the near-zero
//! policy head gains.
//!
//! Burn has no QR decomposition, so orthogonalization runs classical
//! Gram-Schmidt over columns at init time. Layers here are a few hundred
//! units wide at most, which keeps that affordable.

use burn::module::{Module, Param};
use burn::prelude::*;
use burn::tensor::Distribution;

/// Configuration for [`OrthogonalLinear`].
#[derive(Debug, Clone)]
pub struct OrthogonalLinearConfig {
    /// Number of input features.
    pub d_input: usize,
    /// Number of output features.
    pub d_output: usize,
    /// Gain multiplying the orthogonal weights. See [`crate::nn::gains`].
    pub gain: f64,
    /// Whether to include a bias term (initialized to zero).
    pub bias: bool,
}

impl OrthogonalLinearConfig {
    pub fn new(d_input: usize, d_output: usize) -> Self {
        Self {
            d_input,
            d_output,
            gain: 1.0,
            bias: true,
        }
    }

    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_bias(mut self, bias: bool) -> Self {
        self.bias = bias;
        self
    }

    /// Initialize the layer on `device`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> OrthogonalLinear<B> {
        let weight =
            generate_orthogonal_weights::<B>(self.d_output, self.d_input, self.gain, device);

        let bias = self
            .bias
            .then(|| Param::from_tensor(Tensor::zeros([self.d_output], device)));

        OrthogonalLinear {
            weight: Param::from_tensor(weight),
            bias,
            d_input: self.d_input,
            d_output: self.d_output,
        }
    }
}

/// Linear layer `y = x W^T + b` with orthogonally initialized `W`.
#[derive(Module, Debug)]
pub struct OrthogonalLinear<B: Backend> {
    /// Weight matrix of shape [d_output, d_input].
    pub weight: Param<Tensor<B, 2>>,
    /// Optional bias of shape [d_output].
    pub bias: Option<Param<Tensor<B, 1>>>,
    d_input: usize,
    d_output: usize,
}

impl<B: Backend> OrthogonalLinear<B> {
    /// Apply the layer to a `[batch, d_input]` tensor.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let output = input.matmul(self.weight.val().transpose());
        match &self.bias {
            Some(bias) => output + bias.val().unsqueeze_dim(0),
            None => output,
        }
    }

    pub fn d_input(&self) -> usize {
        self.d_input
    }

    pub fn d_output(&self) -> usize {
        self.d_output
    }
}

/// Build an orthogonal `[rows, cols]` weight tensor scaled by `gain`.
///
/// Tall (and square) matrices get orthonormal columns; wide matrices are
/// transposed, orthogonalized, and transposed back so their rows are
/// orthonormal instead.
pub fn generate_orthogonal_weights<B: Backend>(
    rows: usize,
    cols: usize,
    gain: f64,
    device: &B::Device,
) -> Tensor<B, 2> {
    let random = Tensor::<B, 2>::random([rows, cols], Distribution::Normal(0.0, 1.0), device);

    let orthogonal = if rows >= cols {
        orthogonalize_columns::<B>(random, device)
    } else {
        orthogonalize_columns::<B>(random.transpose(), device).transpose()
    };

    orthogonal * (gain as f32)
}

/// Gram-Schmidt over the columns of `matrix`.
fn orthogonalize_columns<B: Backend>(matrix: Tensor<B, 2>, device: &B::Device) -> Tensor<B, 2> {
    let [rows, cols] = matrix.dims();

    let mut columns: Vec<Tensor<B, 1>> = (0..cols)
        .map(|i| matrix.clone().slice([0..rows, i..i + 1]).squeeze::<1>())
        .collect();

    for i in 0..cols {
        let mut v = columns[i].clone();

        // Remove components along already-orthogonalized columns.
        for j in 0..i {
            let u = &columns[j];
            let uv = dot::<B>(&v, u);
            let uu = dot::<B>(u, u);
            let projection = u.clone() * (uv / (uu + 1e-10));
            v = v - projection;
        }

        let norm: f32 = v
            .clone()
            .powf_scalar(2.0)
            .sum()
            .sqrt()
            .into_scalar()
            .elem();

        columns[i] = if norm > 1e-10 {
            v / norm
        } else {
            // Degenerate column (linearly dependent draw): replace with a
            // fresh unit vector.
            let fresh = Tensor::random([rows], Distribution::Normal(0.0, 1.0), device);
            let fresh_norm = fresh.clone().powf_scalar(2.0).sum().sqrt();
            fresh / fresh_norm
        };
    }

    let stacked: Vec<Tensor<B, 2>> = columns.into_iter().map(|c| c.unsqueeze_dim(1)).collect();
    Tensor::cat(stacked, 1)
}

fn dot<B: Backend>(a: &Tensor<B, 1>, b: &Tensor<B, 1>) -> f32 {
    (a.clone() * b.clone()).sum().into_scalar().elem()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray<f32>;

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let layer: OrthogonalLinear<B> = OrthogonalLinearConfig::new(6, 3).init(&device);

        let input = Tensor::random([4, 6], Distribution::Normal(0.0, 1.0), &device);
        assert_eq!(layer.forward(input).dims(), [4, 3]);
    }

    #[test]
    fn test_square_matrix_orthogonal() {
        let device = Default::default();
        let w = generate_orthogonal_weights::<B>(4, 4, 1.0, &device);

        let product = w.clone().matmul(w.transpose());
        let identity = Tensor::<B, 2>::eye(4, &device);
        let diff: f32 = (product - identity).abs().mean().into_scalar().elem();

        assert!(diff < 0.1, "W W^T should approximate identity, diff {diff}");
    }

    #[test]
    fn test_tall_matrix_orthonormal_columns() {
        let device = Default::default();
        let w = generate_orthogonal_weights::<B>(10, 4, 1.0, &device);
        assert_eq!(w.dims(), [10, 4]);

        let product = w.clone().transpose().matmul(w);
        let identity = Tensor::<B, 2>::eye(4, &device);
        let diff: f32 = (product - identity).abs().mean().into_scalar().elem();

        assert!(diff < 0.1, "W^T W should approximate identity, diff {diff}");
    }

    #[test]
    fn test_wide_matrix_orthonormal_rows() {
        let device = Default::default();
        let w = generate_orthogonal_weights::<B>(3, 8, 1.0, &device);
        assert_eq!(w.dims(), [3, 8]);

        let product = w.clone().matmul(w.transpose());
        let identity = Tensor::<B, 2>::eye(3, &device);
        let diff: f32 = (product - identity).abs().mean().into_scalar().elem();

        assert!(diff < 0.1, "W W^T should approximate identity, diff {diff}");
    }

    #[test]
    fn test_gain_scales_magnitude() {
        let device = Default::default();
        let small = generate_orthogonal_weights::<B>(6, 6, 0.01, &device);
        let large = generate_orthogonal_weights::<B>(6, 6, 1.0, &device);

        let small_mean: f32 = small.abs().mean().into_scalar().elem();
        let large_mean: f32 = large.abs().mean().into_scalar().elem();

        assert!(large_mean > small_mean * 10.0);
    }

    #[test]
    fn test_bias_optional() {
        let device = Default::default();
        let with_bias: OrthogonalLinear<B> = OrthogonalLinearConfig::new(4, 2).init(&device);
        let without: OrthogonalLinear<B> =
            OrthogonalLinearConfig::new(4, 2).with_bias(false).init(&device);

        assert!(with_bias.bias.is_some());
        assert!(without.bias.is_none());
        assert_eq!(with_bias.d_input(), 4);
        assert_eq!(with_bias.d_output(), 2);
    }
}
