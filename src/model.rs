use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::artifact;
use crate::error::{ArtifactError, PredictError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    fn apply(self, z: f64) -> f64 {
        match self {
            Activation::Linear => z,
            Activation::Relu => z.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-z).exp()),
            Activation::Tanh => z.tanh(),
        }
    }
}

/// Fully connected layer. `weights` is laid out inputs x outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Array2<f64>,
    pub bias: Array1<f64>,
    #[serde(default)]
    pub activation: Activation,
}

impl DenseLayer {
    pub fn n_inputs(&self) -> usize {
        self.weights.nrows()
    }

    pub fn n_outputs(&self) -> usize {
        self.weights.ncols()
    }

    fn forward(&self, input: ArrayView1<f64>) -> Array1<f64> {
        let z = input.dot(&self.weights) + &self.bias;
        z.mapv_into(|v| self.activation.apply(v))
    }
}

/// Trained regression network mapping a scaled feature row to a final mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarksModel {
    layers: Vec<DenseLayer>,
}

impl MarksModel {
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self, ArtifactError> {
        let model = Self { layers };
        model.validate()?;
        Ok(model)
    }

    /// Plain linear regression: `intercept + coefficients . x`.
    pub fn linear(coefficients: Array1<f64>, intercept: f64) -> Result<Self, ArtifactError> {
        let n = coefficients.len();
        let weights = coefficients
            .into_shape((n, 1))
            .map_err(|e| ArtifactError::Invalid(e.to_string()))?;
        Self::new(vec![DenseLayer {
            weights,
            bias: Array1::from_elem(1, intercept),
            activation: Activation::Linear,
        }])
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub fn n_inputs(&self) -> usize {
        self.layers.first().map(DenseLayer::n_inputs).unwrap_or(0)
    }

    pub fn n_outputs(&self) -> usize {
        self.layers.last().map(DenseLayer::n_outputs).unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.layers.is_empty() {
            return Err(ArtifactError::Invalid("model has no layers".into()));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.bias.len() != layer.n_outputs() {
                return Err(ArtifactError::Invalid(format!(
                    "layer {i}: bias has {} entries for {} outputs",
                    layer.bias.len(),
                    layer.n_outputs()
                )));
            }
            if layer.weights.iter().chain(layer.bias.iter()).any(|v| !v.is_finite()) {
                return Err(ArtifactError::Invalid(format!("layer {i}: non-finite parameters")));
            }
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[0].n_outputs() != pair[1].n_inputs() {
                return Err(ArtifactError::Invalid(format!(
                    "layer {} outputs {} values but layer {} expects {}",
                    i,
                    pair[0].n_outputs(),
                    i + 1,
                    pair[1].n_inputs()
                )));
            }
        }
        if self.n_outputs() != 1 {
            return Err(ArtifactError::Invalid(format!(
                "regression model must have one output, found {}",
                self.n_outputs()
            )));
        }
        Ok(())
    }

    pub fn predict(&self, input: ArrayView1<f64>) -> Result<f64, PredictError> {
        if input.len() != self.n_inputs() {
            return Err(PredictError::ShapeMismatch {
                expected: self.n_inputs(),
                got: input.len(),
            });
        }
        let mut activations = input.to_owned();
        for layer in &self.layers {
            activations = layer.forward(activations.view());
        }
        match activations.as_slice() {
            Some([value]) => Ok(*value),
            _ => Err(PredictError::OutputWidth { got: activations.len() }),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let model: Self = artifact::read(path.as_ref())?;
        model.validate()?;
        Ok(model)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        artifact::write(self, path.as_ref())
    }
}
