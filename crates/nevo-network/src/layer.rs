//! A single fully-connected layer: one weight matrix and one bias row.

use rand::Rng;

use crate::matrix::{Matrix, ShapeError};

/// One network layer holding an `outputs × inputs` weight matrix and a
/// `1 × outputs` bias row.
///
/// Layers are created at network construction and deep-copied whenever their
/// owning network is copied, mutated, or merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    weights: Matrix,
    bias: Matrix,
}

impl Layer {
    /// Creates a layer with weights and bias initialized uniformly in
    /// `[-scale, scale]`.
    #[must_use]
    pub fn new<R>(inputs: usize, outputs: usize, scale: f64, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut weights = Matrix::zeros(outputs, inputs);
        let mut bias = Matrix::zeros(1, outputs);
        weights.randomize(scale, rng);
        bias.randomize(scale, rng);
        Self { weights, bias }
    }

    pub(crate) fn from_parts(weights: Matrix, bias: Matrix) -> Self {
        Self { weights, bias }
    }

    /// Returns the layer's input width.
    #[must_use]
    pub fn inputs(&self) -> usize {
        self.weights.cols()
    }

    /// Returns the layer's output width.
    ///
    /// The bias column count always equals this value.
    #[must_use]
    pub fn outputs(&self) -> usize {
        self.weights.rows()
    }

    /// Returns the weight matrix.
    #[must_use]
    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    /// Returns the bias row.
    #[must_use]
    pub fn bias(&self) -> &Matrix {
        &self.bias
    }

    pub(crate) fn apply_deltas(
        &mut self,
        weight_delta: &Matrix,
        bias_delta: &Matrix,
    ) -> Result<(), ShapeError> {
        self.weights.add(weight_delta)?;
        self.bias.add(bias_delta)?;
        Ok(())
    }

    /// Perturbs each weight and bias element independently with probability
    /// `rate`, adding a uniform draw bounded by `scale`.
    pub fn perturb<R>(&mut self, scale: f64, rate: f64, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.weights.perturb(scale, rate, rng);
        self.bias.perturb(scale, rate, rng);
    }

    /// Returns a new layer whose weights and bias are the element-wise
    /// average of the two operands.
    pub fn merged(a: &Self, b: &Self) -> Result<Self, ShapeError> {
        Ok(Self {
            weights: Matrix::merged(&a.weights, &b.weights)?,
            bias: Matrix::merged(&a.bias, &b.bias)?,
        })
    }
}
