//! Activation function catalog.
//!
//! Networks apply one activation to every layer. Each variant provides the
//! forward mapping ([`Activation::apply`]) and its derivative expressed in
//! terms of the *activated* value ([`Activation::derive`]). Backpropagation
//! caches layer outputs rather than pre-activations, so derivatives must be
//! computable from the output alone (e.g. sigmoid's `y * (1 - y)`).

use serde::{Deserialize, Serialize};

/// An element-wise activation function.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Logistic sigmoid `1 / (1 + e^-x)`, squashing into `(0, 1)`.
    #[default]
    Sigmoid,
    /// Hyperbolic tangent, squashing into `(-1, 1)`.
    Tanh,
    /// Rectified linear unit `max(0, x)`.
    Relu,
    /// Leaky rectifier: `x` for positive inputs, `0.01 * x` otherwise.
    LeakyRelu,
    /// Identity; useful for regression output layers.
    Linear,
}

impl Activation {
    /// Applies the activation to a single pre-activation value.
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Tanh => x.tanh(),
            Self::Relu => x.max(0.0),
            Self::LeakyRelu => {
                if x > 0.0 {
                    x
                } else {
                    0.01 * x
                }
            }
            Self::Linear => x,
        }
    }

    /// Computes the derivative from an already-activated value `y`.
    #[must_use]
    pub fn derive(self, y: f64) -> f64 {
        match self {
            Self::Sigmoid => y * (1.0 - y),
            Self::Tanh => 1.0 - y * y,
            Self::Relu => {
                if y > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::LeakyRelu => {
                if y > 0.0 {
                    1.0
                } else {
                    0.01
                }
            }
            Self::Linear => 1.0,
        }
    }
}
