//! Lossless parameter snapshots.
//!
//! A [`NetworkSnapshot`] captures a network's full identity for persistence:
//! every weight and bias value plus the scalar hyperparameters. The training
//! trace is history, not identity, and is not part of the snapshot.
//! Round-tripping through
//! [`NeuralNetwork::snapshot`](crate::network::NeuralNetwork::snapshot) and
//! [`NeuralNetwork::from_snapshot`](crate::network::NeuralNetwork::from_snapshot)
//! is bit-exact for every `f64`.

use serde::{Deserialize, Serialize};

use crate::{activation::Activation, decay::RateDecay};

/// Serialized form of one layer: dimensions plus row-major parameter buffers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    pub inputs: usize,
    pub outputs: usize,
    /// Weight values, row-major, `outputs * inputs` elements.
    pub weights: Vec<f64>,
    /// Bias values, `outputs` elements.
    pub bias: Vec<f64>,
}

/// Serialized form of a whole network: parameters and hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub input_width: usize,
    pub layers: Vec<LayerSnapshot>,
    pub activation: Activation,
    pub decay: RateDecay,
    pub learning_rate: f64,
    pub initial_learning_rate: f64,
    pub momentum: f64,
    pub mutation_rate: f64,
    pub iteration: u64,
}
