//! Feed-forward neural networks built from first principles.
//!
//! This crate implements the numeric core of the Nevo project: a dense
//! [`Matrix`](matrix::Matrix) type, fully-connected [`Layer`](layer::Layer)s,
//! and a [`NeuralNetwork`](network::NeuralNetwork) that can improve either by
//! backpropagation or by the genetic operators its sibling crate
//! `nevo-evolution` drives.
//!
//! # Modules
//!
//! - [`matrix`]: Dense row-major `f64` matrices with the handful of
//!   operations a network needs
//! - [`activation`]: The activation catalog (sigmoid, tanh, ReLU, leaky
//!   ReLU, linear)
//! - [`decay`]: Learning-rate decay schedules
//! - [`layer`]: One fully-connected layer (weights plus bias)
//! - [`network`]: The network itself and its learning operations
//! - [`snapshot`]: Serializable captures of a network's full parameter set
//! - [`trace`]: Per-iteration cost and confusion counts recorded while
//!   training
//!
//! # Examples
//!
//! ## Training a network on a fixed sample
//!
//! ```
//! use nevo_network::network::{NetworkConfig, NeuralNetwork};
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg64;
//!
//! let mut rng = Pcg64::seed_from_u64(7);
//! let mut network = NeuralNetwork::new(&[2, 3, 1], NetworkConfig::default(), &mut rng).unwrap();
//!
//! let first = network.learn(&[0.0, 1.0], &[1.0]).unwrap();
//! for _ in 0..100 {
//!     network.learn(&[0.0, 1.0], &[1.0]).unwrap();
//! }
//! let last = network.learn(&[0.0, 1.0], &[1.0]).unwrap();
//! assert!(last < first);
//! ```
//!
//! ## Saving and restoring a network
//!
//! ```
//! use nevo_network::network::{NetworkConfig, NeuralNetwork};
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg64;
//!
//! let mut rng = Pcg64::seed_from_u64(7);
//! let network = NeuralNetwork::new(&[2, 3, 1], NetworkConfig::default(), &mut rng).unwrap();
//!
//! let json = serde_json::to_string(&network.snapshot()).unwrap();
//! let restored = NeuralNetwork::from_snapshot(serde_json::from_str(&json).unwrap()).unwrap();
//! assert_eq!(restored.predict(&[0.5, 0.5]).unwrap(), network.predict(&[0.5, 0.5]).unwrap());
//! ```

pub mod activation;
pub mod decay;
pub mod layer;
pub mod matrix;
pub mod network;
pub mod snapshot;
pub mod trace;

pub use self::{
    activation::Activation,
    decay::RateDecay,
    layer::Layer,
    matrix::{Matrix, ShapeError},
    network::{NetworkConfig, NetworkError, NeuralNetwork},
    snapshot::{LayerSnapshot, NetworkSnapshot},
    trace::{ConfusionCounts, IterationRecord, TrainingTrace},
};
