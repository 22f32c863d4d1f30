//! Attribution engines.
//!
//! The pipeline only depends on the [`Explainer`] trait. This module also
//! provides an Integrated Gradients engine over any `burn` model implementing
//! [`PairModel`], and [`LinearPairModel`] as a simple loadable model.

use std::marker::PhantomData;
use std::path::Path;

use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{Tensor, TensorData};
use finemap_core::SIDES;
use ndarray::{Array2, Array3, Axis, Ix3};

use crate::error::{ExplainError, Result};
use crate::sample::SamplePair;

/// Default CPU backend for attribution.
pub type DefaultBackend = burn_autodiff::Autodiff<burn_ndarray::NdArray>;

/// Computes attribution for a prepared sample.
///
/// Implementations must return a pair with the same shapes as the input.
/// Any closure `Fn(&SamplePair, usize) -> Result<SamplePair>` is an
/// `Explainer`, which makes deterministic stubs easy to write in tests.
pub trait Explainer: Send + Sync {
    /// Attribute the model output to every `(position, track)` entry of
    /// `sample`. `num_steps` is passed through to the algorithm.
    fn explain(&self, sample: &SamplePair, num_steps: usize) -> Result<SamplePair>;

    /// Get the name of this engine for logging.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Explainer for F
where
    F: Fn(&SamplePair, usize) -> Result<SamplePair> + Send + Sync,
{
    fn explain(&self, sample: &SamplePair, num_steps: usize) -> Result<SamplePair> {
        self(sample, num_steps)
    }
}

/// A model scoring an interaction from its two prepared sides.
pub trait PairModel<B: Backend>: Send + Sync {
    /// Forward pass.
    ///
    /// # Arguments
    ///
    /// * `left` - Side 0 input of shape (batch, positions, tracks)
    /// * `right` - Side 1 input of shape (batch, positions, tracks)
    ///
    /// # Returns
    ///
    /// Scores of shape (batch, n_outputs).
    fn forward(&self, left: Tensor<B, 3>, right: Tensor<B, 3>) -> Tensor<B, 2>;

    /// `(positions, tracks)` the model accepts per side, if fixed.
    fn input_dims(&self) -> Option<(usize, usize)> {
        None
    }
}

/// Linear interaction score: the sum of `w * x` over both sides.
///
/// Its Integrated Gradients attribution with a zero baseline is exactly
/// `w * x`, which makes it a convenient reference model.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearPairModel {
    left: Array2<f32>,
    right: Array2<f32>,
}

impl LinearPairModel {
    /// Create a model from per-side `(positions, tracks)` weights.
    ///
    /// # Errors
    ///
    /// Returns an error if the two sides differ in shape.
    pub fn new(left: Array2<f32>, right: Array2<f32>) -> Result<Self> {
        if left.dim() != right.dim() {
            return Err(ExplainError::Config(format!(
                "model weights differ between sides: {:?} vs {:?}",
                left.dim(),
                right.dim()
            )));
        }
        Ok(Self { left, right })
    }

    /// Create a model from a `(2, positions, tracks)` weight tensor.
    ///
    /// # Errors
    ///
    /// Returns an error if the side axis is not 2.
    pub fn from_weights(weights: Array3<f32>) -> Result<Self> {
        if weights.len_of(Axis(0)) != SIDES {
            return Err(ExplainError::Config(format!(
                "model weights must have shape (2, positions, tracks), got {:?}",
                weights.shape()
            )));
        }
        Self::new(
            weights.index_axis(Axis(0), 0).to_owned(),
            weights.index_axis(Axis(0), 1).to_owned(),
        )
    }

    /// Load weights from a NumPy `.npy` file of shape `(2, positions, tracks)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or has the wrong shape.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let weights = finemap_data::read_npy_f32::<Ix3, _>(path.as_ref())?;
        let model = Self::from_weights(weights)?;
        tracing::info!(
            "Loaded linear model with input {:?} from {}",
            model.left.dim(),
            path.as_ref().display()
        );
        Ok(model)
    }
}

fn to_tensor<B: Backend>(values: &Array2<f32>, scale: f32, device: &B::Device) -> Tensor<B, 3> {
    let (positions, tracks) = values.dim();
    let data: Vec<f32> = values.iter().map(|&v| v * scale).collect();
    Tensor::from_data(TensorData::new(data, [1, positions, tracks]), device)
}

impl<B: Backend> PairModel<B> for LinearPairModel {
    fn forward(&self, left: Tensor<B, 3>, right: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch, _, _] = left.dims();
        let device = left.device();
        let w_left = to_tensor::<B>(&self.left, 1.0, &device).repeat_dim(0, batch);
        let w_right = to_tensor::<B>(&self.right, 1.0, &device).repeat_dim(0, batch);

        let score = (left * w_left).sum_dim(2).sum_dim(1) + (right * w_right).sum_dim(2).sum_dim(1);
        score.reshape([batch, 1])
    }

    fn input_dims(&self) -> Option<(usize, usize)> {
        Some(self.left.dim())
    }
}

/// Integrated Gradients over a [`PairModel`].
///
/// Integrates the gradient of the summed model output along the straight
/// path from a zero baseline to the input, using a trapezoidal Riemann sum
/// with `num_steps` intervals, and multiplies by `input - baseline`.
///
/// Reference: Sundararajan et al., "Axiomatic Attribution for Deep Networks", ICML 2017.
///
/// # Example
///
/// ```rust,ignore
/// use finemap_explain::{DefaultBackend, IntegratedGradients, LinearPairModel};
///
/// let model = LinearPairModel::load("model.npy")?;
/// let engine = IntegratedGradients::<DefaultBackend, _>::new(model, Default::default());
/// let attribution = engine.explain(&prepared, 50)?;
/// ```
pub struct IntegratedGradients<B: AutodiffBackend, M> {
    model: M,
    device: B::Device,
    _backend: PhantomData<B>,
}

impl<B: AutodiffBackend, M: PairModel<B>> IntegratedGradients<B, M> {
    /// Create an engine for `model` running on `device`.
    pub fn new(model: M, device: B::Device) -> Self {
        Self {
            model,
            device,
            _backend: PhantomData,
        }
    }

    /// Gradient of the summed output at `alpha * sample`.
    fn gradients_at(&self, sample: &SamplePair, alpha: f32) -> Result<SamplePair> {
        let left = to_tensor::<B>(&sample.left, alpha, &self.device).require_grad();
        let right = to_tensor::<B>(&sample.right, alpha, &self.device).require_grad();

        let output = self.model.forward(left.clone(), right.clone());
        let grads = output.sum().backward();

        let to_array = |tensor: Tensor<B, 3>, dim: (usize, usize)| -> Result<Array2<f32>> {
            let grad = tensor
                .grad(&grads)
                .ok_or_else(|| ExplainError::Engine("input has no gradient".to_string()))?;
            let values = grad
                .into_data()
                .to_vec::<f32>()
                .map_err(|e| ExplainError::Engine(format!("failed to read gradient: {e:?}")))?;
            Ok(Array2::from_shape_vec(dim, values)?)
        };

        Ok(SamplePair::new(
            to_array(left, sample.left.dim())?,
            to_array(right, sample.right.dim())?,
        ))
    }
}

impl<B: AutodiffBackend, M: PairModel<B>> Explainer for IntegratedGradients<B, M> {
    fn explain(&self, sample: &SamplePair, num_steps: usize) -> Result<SamplePair> {
        let dims = sample.left.dim();
        if sample.right.dim() != dims {
            return Err(ExplainError::Engine(format!(
                "sides differ in shape: {:?} vs {:?}",
                dims,
                sample.right.dim()
            )));
        }
        if let Some(expected) = self.model.input_dims() {
            if expected != dims {
                return Err(ExplainError::Engine(format!(
                    "model expects input {expected:?} per side, got {dims:?}"
                )));
            }
        }

        let n_steps = num_steps.max(1);
        let mut integral_left = Array2::<f32>::zeros(dims);
        let mut integral_right = Array2::<f32>::zeros(dims);

        for step in 0..=n_steps {
            let alpha = step as f32 / n_steps as f32;
            let grads = self.gradients_at(sample, alpha)?;

            // Trapezoidal rule: weight endpoints by 0.5
            let weight = if step == 0 || step == n_steps { 0.5 } else { 1.0 };
            integral_left.scaled_add(weight, &grads.left);
            integral_right.scaled_add(weight, &grads.right);
        }

        let step_size = 1.0 / n_steps as f32;
        Ok(SamplePair::new(
            &sample.left * &integral_left * step_size,
            &sample.right * &integral_right * step_size,
        ))
    }

    fn name(&self) -> &str {
        "IntegratedGradients"
    }
}
