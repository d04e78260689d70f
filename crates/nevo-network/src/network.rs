//! The feed-forward network engine.
//!
//! A [`NeuralNetwork`] is an ordered stack of [`Layer`]s plus the scalar
//! hyperparameters that drive both of its learning paths:
//!
//! - **Gradient descent**: [`learn`](NeuralNetwork::learn) runs one
//!   backpropagation step for a single sample;
//!   [`train`](NeuralNetwork::train) repeats it over uniformly sampled rows.
//! - **Genetic variation**: [`mutated`](NeuralNetwork::mutated) derives a
//!   perturbed copy and [`merged`](NeuralNetwork::merged) averages parents
//!   into a child (crossover).
//!
//! The two paths share one learning rate on purpose: the rate scales gradient
//! steps *and* bounds mutation magnitude, so the decay schedule
//! ([`RateDecay`]) anneals both. Mutation probability is the separate
//! `mutation_rate` knob.
//!
//! Activations flow through the network as row vectors: each layer computes
//! `activate(x · Wᵀ + bias)`, the row form of the usual `W · x + b`.
//!
//! # Examples
//!
//! ```
//! use nevo_network::network::{NetworkConfig, NeuralNetwork};
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg64;
//!
//! let mut rng = Pcg64::seed_from_u64(1);
//! let network = NeuralNetwork::new(&[2, 3, 1], NetworkConfig::default(), &mut rng).unwrap();
//! let output = network.predict(&[0.0, 1.0]).unwrap();
//! assert_eq!(output.len(), 1);
//! ```

use rand::Rng;

use crate::{
    activation::Activation,
    decay::RateDecay,
    layer::Layer,
    matrix::{Matrix, ShapeError},
    snapshot::{LayerSnapshot, NetworkSnapshot},
    trace::{ConfusionCounts, IterationRecord, TrainingTrace},
};

/// Scale of the uniform parameter initialization at construction.
const INIT_SCALE: f64 = 1.0;

/// Hyperparameters for constructing a [`NeuralNetwork`].
///
/// All three rates are validated to lie within `[0, 1]` at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkConfig {
    /// Activation applied by every layer.
    pub activation: Activation,
    /// Learning-rate decay schedule.
    pub decay: RateDecay,
    /// Initial learning rate; also the initial mutation magnitude.
    pub learning_rate: f64,
    /// Decay speed for [`RateDecay::Sgd`]; unused by [`RateDecay::None`].
    pub momentum: f64,
    /// Per-parameter probability that a mutation perturbs the parameter.
    pub mutation_rate: f64,
}

impl Default for NetworkConfig {
    /// Sigmoid activation, inverse decay with a gentle `0.01` momentum,
    /// learning rate `0.1`, and mutation touching every parameter.
    fn default() -> Self {
        Self {
            activation: Activation::Sigmoid,
            decay: RateDecay::Sgd,
            learning_rate: 0.1,
            momentum: 0.01,
            mutation_rate: 1.0,
        }
    }
}

/// Error raised by network construction, prediction, or training.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum NetworkError {
    /// A matrix operation was attempted on incompatible shapes.
    #[display("{_0}")]
    Shape(ShapeError),
    #[display("input has {actual} values, but the network expects {expected}")]
    InputWidth { expected: usize, actual: usize },
    #[display("target has {actual} values, but the network outputs {expected}")]
    TargetWidth { expected: usize, actual: usize },
    #[display("a network needs at least two layer sizes, got {count}")]
    TooFewLayers { count: usize },
    #[display("layer {index} has zero width")]
    ZeroWidthLayer { index: usize },
    #[display("{name} must be within [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },
    #[display("training set is empty")]
    EmptyTrainingSet,
    #[display("got {inputs} input rows but {targets} target rows")]
    SampleCountMismatch { inputs: usize, targets: usize },
    #[display("cannot merge an empty set of networks")]
    EmptyMergeSet,
    #[display("networks have different topologies")]
    TopologyMismatch,
    #[display("snapshot layer {layer} expects {expected} {kind} values, got {actual}")]
    SnapshotElementCount {
        layer: usize,
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
    #[display("snapshot layer {layer} takes {inputs} inputs, but the previous width is {previous}")]
    SnapshotChainMismatch {
        layer: usize,
        previous: usize,
        inputs: usize,
    },
}

impl From<ShapeError> for NetworkError {
    fn from(err: ShapeError) -> Self {
        Self::Shape(err)
    }
}

fn validate_rate(name: &'static str, value: f64) -> Result<(), NetworkError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(NetworkError::RateOutOfRange { name, value })
    }
}

/// A feed-forward network of fully-connected layers.
///
/// A network's identity is its full parameter set (every weight and bias);
/// fitness never lives here but on whatever agent wraps the network. Copies
/// are deep and share no mutable state.
#[derive(Debug, Clone)]
pub struct NeuralNetwork {
    input_width: usize,
    layers: Vec<Layer>,
    activation: Activation,
    decay: RateDecay,
    learning_rate: f64,
    initial_learning_rate: f64,
    momentum: f64,
    mutation_rate: f64,
    iteration: u64,
    trace: TrainingTrace,
}

impl NeuralNetwork {
    /// Creates a network with randomized parameters.
    ///
    /// `layer_sizes` lists every width from the input layer to the output
    /// layer, so it needs at least two entries, all non-zero. The config's
    /// rates must lie within `[0, 1]`.
    pub fn new<R>(
        layer_sizes: &[usize],
        config: NetworkConfig,
        rng: &mut R,
    ) -> Result<Self, NetworkError>
    where
        R: Rng + ?Sized,
    {
        if layer_sizes.len() < 2 {
            return Err(NetworkError::TooFewLayers {
                count: layer_sizes.len(),
            });
        }
        if let Some(index) = layer_sizes.iter().position(|width| *width == 0) {
            return Err(NetworkError::ZeroWidthLayer { index });
        }
        validate_rate("learning rate", config.learning_rate)?;
        validate_rate("momentum", config.momentum)?;
        validate_rate("mutation rate", config.mutation_rate)?;

        let layers = layer_sizes
            .windows(2)
            .map(|pair| Layer::new(pair[0], pair[1], INIT_SCALE, rng))
            .collect();
        Ok(Self {
            input_width: layer_sizes[0],
            layers,
            activation: config.activation,
            decay: config.decay,
            learning_rate: config.learning_rate,
            initial_learning_rate: config.learning_rate,
            momentum: config.momentum,
            mutation_rate: config.mutation_rate,
            iteration: 0,
            trace: TrainingTrace::default(),
        })
    }

    /// Returns the declared input width.
    #[must_use]
    pub const fn input_width(&self) -> usize {
        self.input_width
    }

    /// Returns the output layer's width.
    #[must_use]
    pub fn output_width(&self) -> usize {
        self.layers.last().map_or(0, Layer::outputs)
    }

    /// Returns the layers in input-to-output order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Returns the activation function shared by every layer.
    #[must_use]
    pub const fn activation(&self) -> Activation {
        self.activation
    }

    /// Returns the learning-rate decay schedule.
    #[must_use]
    pub const fn decay(&self) -> RateDecay {
        self.decay
    }

    /// Returns the current learning rate.
    #[must_use]
    pub const fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Returns the learning rate the network was constructed with.
    #[must_use]
    pub const fn initial_learning_rate(&self) -> f64 {
        self.initial_learning_rate
    }

    /// Returns the decay momentum.
    #[must_use]
    pub const fn momentum(&self) -> f64 {
        self.momentum
    }

    /// Returns the per-parameter mutation probability.
    #[must_use]
    pub const fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    /// Returns how many iterations the rate schedule has advanced through.
    #[must_use]
    pub const fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Returns the training trace recorded by [`learn`](Self::learn).
    #[must_use]
    pub const fn trace(&self) -> &TrainingTrace {
        &self.trace
    }

    fn check_input_width(&self, input: &[f64]) -> Result<(), NetworkError> {
        if input.len() == self.input_width {
            Ok(())
        } else {
            Err(NetworkError::InputWidth {
                expected: self.input_width,
                actual: input.len(),
            })
        }
    }

    /// Runs the forward pass and returns every activation, input row first.
    fn forward(&self, input: &[f64]) -> Result<Vec<Matrix>, ShapeError> {
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        let mut current = Matrix::from_row(input);
        for layer in &self.layers {
            let mut next = Matrix::multiply(&current, &layer.weights().transposed())?;
            next.add_bias(layer.bias())?;
            next.activate(self.activation);
            activations.push(std::mem::replace(&mut current, next));
        }
        activations.push(current);
        Ok(activations)
    }

    /// Computes the network's output for one input row.
    ///
    /// Pure: repeated calls with the same input yield the same output and
    /// never touch network state. Fails if the input width does not match.
    pub fn predict(&self, input: &[f64]) -> Result<Vec<f64>, NetworkError> {
        self.check_input_width(input)?;
        let mut activations = self.forward(input)?;
        let output = activations.pop().expect("forward output is never empty");
        Ok(output.into_values())
    }

    /// Runs one backpropagation step for a single sample and returns its
    /// cost (mean squared error).
    ///
    /// The output-layer error is `expected - actual`; each hidden layer's
    /// error is the next layer's error pushed back through the next layer's
    /// pre-update weights. Per layer, the gradient is the activated output's
    /// derivative times the error, scaled by the current learning rate; the
    /// weight delta is `gradientᵀ × previous activation` and the bias moves
    /// by the gradient directly.
    ///
    /// Side effects: the iteration counter advances, the learning rate decays
    /// one step, and one record is appended to the [trace](Self::trace).
    pub fn learn(&mut self, input: &[f64], expected: &[f64]) -> Result<f64, NetworkError> {
        self.check_input_width(input)?;
        let output_width = self.output_width();
        if expected.len() != output_width {
            return Err(NetworkError::TargetWidth {
                expected: output_width,
                actual: expected.len(),
            });
        }

        let activations = self.forward(input)?;
        let output = activations.last().expect("forward output is never empty");

        let target = Matrix::from_row(expected);
        let mut error = Matrix::subtract(&target, output)?;
        #[expect(clippy::cast_precision_loss)]
        let cost = error.values().iter().map(|e| e * e).sum::<f64>() / output_width as f64;
        let counts = ConfusionCounts::from_outputs(output.values(), expected);

        let iteration = self.iteration;
        let rate = self.decay_rate();

        for index in (0..self.layers.len()).rev() {
            let mut gradient = activations[index + 1].derived(self.activation);
            gradient.hadamard(&error)?;
            gradient.scale(rate);
            let weight_delta = Matrix::multiply(&gradient.transposed(), &activations[index])?;
            // Hidden error must use this layer's pre-update weights.
            let next_error = if index > 0 {
                Some(Matrix::multiply(&error, self.layers[index].weights())?)
            } else {
                None
            };
            self.layers[index].apply_deltas(&weight_delta, &gradient)?;
            if let Some(next) = next_error {
                error = next;
            }
        }

        self.trace.record(iteration, IterationRecord { cost, counts });
        Ok(cost)
    }

    /// Trains for `rounds` steps, each on a uniformly sampled row.
    ///
    /// This is stochastic minibatch-of-one training: there is no shuffling
    /// and no guarantee every row is visited.
    pub fn train<R>(
        &mut self,
        inputs: &[Vec<f64>],
        targets: &[Vec<f64>],
        rounds: usize,
        rng: &mut R,
    ) -> Result<(), NetworkError>
    where
        R: Rng + ?Sized,
    {
        if inputs.is_empty() {
            return Err(NetworkError::EmptyTrainingSet);
        }
        if inputs.len() != targets.len() {
            return Err(NetworkError::SampleCountMismatch {
                inputs: inputs.len(),
                targets: targets.len(),
            });
        }
        for _ in 0..rounds {
            let index = rng.random_range(0..inputs.len());
            self.learn(&inputs[index], &targets[index])?;
        }
        Ok(())
    }

    /// Returns a deep copy with every parameter independently perturbed.
    ///
    /// Each weight and bias element moves with probability `mutation_rate`
    /// by a uniform draw in `[-learning_rate, learning_rate]`. Reusing the
    /// current learning rate as the mutation magnitude means the decay
    /// schedule shrinks mutations over successive generations.
    #[must_use]
    pub fn mutated<R>(&self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut clone = self.clone();
        for layer in &mut clone.layers {
            layer.perturb(self.learning_rate, self.mutation_rate, rng);
        }
        clone
    }

    /// Merges two or more networks into a new one by element-wise averaging
    /// of every corresponding weight and bias matrix (crossover).
    ///
    /// The slice is folded pairwise left to right, so with more than two
    /// parents the later ones carry more weight. The child inherits the first
    /// parent's hyperparameters, iteration counter, and trace; no operand is
    /// mutated. Fails on an empty slice or mismatched topologies.
    pub fn merged(parents: &[&Self]) -> Result<Self, NetworkError> {
        let (first, rest) = parents.split_first().ok_or(NetworkError::EmptyMergeSet)?;
        let mut child = (*first).clone();
        for parent in rest {
            if parent.input_width != child.input_width
                || parent.layers.len() != child.layers.len()
            {
                return Err(NetworkError::TopologyMismatch);
            }
            for (own, theirs) in child.layers.iter_mut().zip(&parent.layers) {
                *own = Layer::merged(own, theirs).map_err(|_| NetworkError::TopologyMismatch)?;
            }
        }
        Ok(child)
    }

    /// Advances the decay schedule one iteration and returns the learning
    /// rate for the step that is about to run.
    ///
    /// [`RateDecay::None`] keeps the initial rate;
    /// [`RateDecay::Sgd`] yields `initial / (1 + momentum * iteration)`.
    pub fn decay_rate(&mut self) -> f64 {
        self.learning_rate =
            self.decay
                .rate_at(self.initial_learning_rate, self.momentum, self.iteration);
        self.iteration += 1;
        self.learning_rate
    }

    /// Captures the full parameter set and hyperparameters.
    ///
    /// The training trace is history, not identity, and is not captured.
    #[must_use]
    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot {
            input_width: self.input_width,
            layers: self
                .layers
                .iter()
                .map(|layer| LayerSnapshot {
                    inputs: layer.inputs(),
                    outputs: layer.outputs(),
                    weights: layer.weights().values().to_vec(),
                    bias: layer.bias().values().to_vec(),
                })
                .collect(),
            activation: self.activation,
            decay: self.decay,
            learning_rate: self.learning_rate,
            initial_learning_rate: self.initial_learning_rate,
            momentum: self.momentum,
            mutation_rate: self.mutation_rate,
            iteration: self.iteration,
        }
    }

    /// Restores a network from a snapshot, re-validating topology, element
    /// counts, and rate ranges.
    ///
    /// The restored network starts with an empty trace.
    pub fn from_snapshot(snapshot: NetworkSnapshot) -> Result<Self, NetworkError> {
        if snapshot.layers.is_empty() {
            return Err(NetworkError::TooFewLayers { count: 1 });
        }
        if snapshot.input_width == 0 {
            return Err(NetworkError::ZeroWidthLayer { index: 0 });
        }
        validate_rate("learning rate", snapshot.learning_rate)?;
        validate_rate("initial learning rate", snapshot.initial_learning_rate)?;
        validate_rate("momentum", snapshot.momentum)?;
        validate_rate("mutation rate", snapshot.mutation_rate)?;

        let mut layers = Vec::with_capacity(snapshot.layers.len());
        let mut previous = snapshot.input_width;
        for (index, layer) in snapshot.layers.into_iter().enumerate() {
            if layer.outputs == 0 {
                return Err(NetworkError::ZeroWidthLayer { index: index + 1 });
            }
            if layer.inputs != previous {
                return Err(NetworkError::SnapshotChainMismatch {
                    layer: index,
                    previous,
                    inputs: layer.inputs,
                });
            }
            let expected_weights = layer.outputs * layer.inputs;
            let actual_weights = layer.weights.len();
            let weights = Matrix::from_vec(layer.outputs, layer.inputs, layer.weights).ok_or(
                NetworkError::SnapshotElementCount {
                    layer: index,
                    kind: "weight",
                    expected: expected_weights,
                    actual: actual_weights,
                },
            )?;
            let actual_bias = layer.bias.len();
            let bias = Matrix::from_vec(1, layer.outputs, layer.bias).ok_or(
                NetworkError::SnapshotElementCount {
                    layer: index,
                    kind: "bias",
                    expected: layer.outputs,
                    actual: actual_bias,
                },
            )?;
            previous = layer.outputs;
            layers.push(Layer::from_parts(weights, bias));
        }

        Ok(Self {
            input_width: snapshot.input_width,
            layers,
            activation: snapshot.activation,
            decay: snapshot.decay,
            learning_rate: snapshot.learning_rate,
            initial_learning_rate: snapshot.initial_learning_rate,
            momentum: snapshot.momentum,
            mutation_rate: snapshot.mutation_rate,
            iteration: snapshot.iteration,
            trace: TrainingTrace::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    fn rng() -> Pcg64 {
        Pcg64::seed_from_u64(42)
    }

    fn config(learning_rate: f64, decay: RateDecay) -> NetworkConfig {
        NetworkConfig {
            activation: Activation::Sigmoid,
            decay,
            learning_rate,
            momentum: 0.0,
            mutation_rate: 1.0,
        }
    }

    /// Builds a network with explicit parameters and linear activation.
    fn linear_network(input_width: usize, layers: &[(Vec<Vec<f64>>, Vec<f64>)]) -> NeuralNetwork {
        let snapshot = NetworkSnapshot {
            input_width,
            layers: layers
                .iter()
                .map(|(weight_rows, bias)| LayerSnapshot {
                    inputs: weight_rows[0].len(),
                    outputs: weight_rows.len(),
                    weights: weight_rows.concat(),
                    bias: bias.clone(),
                })
                .collect(),
            activation: Activation::Linear,
            decay: RateDecay::None,
            learning_rate: 0.5,
            initial_learning_rate: 0.5,
            momentum: 0.0,
            mutation_rate: 1.0,
            iteration: 0,
        };
        NeuralNetwork::from_snapshot(snapshot).expect("snapshot is well-formed")
    }

    fn sample_cost(network: &NeuralNetwork, input: &[f64], target: &[f64]) -> f64 {
        let output = network.predict(input).expect("input width matches");
        #[expect(clippy::cast_precision_loss)]
        let width = target.len() as f64;
        output
            .iter()
            .zip(target)
            .map(|(o, t)| (t - o) * (t - o))
            .sum::<f64>()
            / width
    }

    #[test]
    fn test_new_requires_two_layer_sizes() {
        let err = NeuralNetwork::new(&[3], NetworkConfig::default(), &mut rng())
            .expect_err("one size is not enough");
        assert_eq!(err, NetworkError::TooFewLayers { count: 1 });
    }

    #[test]
    fn test_new_rejects_zero_width_layer() {
        let err = NeuralNetwork::new(&[2, 0, 1], NetworkConfig::default(), &mut rng())
            .expect_err("zero width");
        assert_eq!(err, NetworkError::ZeroWidthLayer { index: 1 });
    }

    #[test]
    fn test_new_rejects_out_of_range_rates() {
        let bad_learning = NetworkConfig {
            learning_rate: 1.5,
            ..NetworkConfig::default()
        };
        let err = NeuralNetwork::new(&[2, 1], bad_learning, &mut rng())
            .expect_err("rate above one is invalid");
        assert_eq!(
            err,
            NetworkError::RateOutOfRange {
                name: "learning rate",
                value: 1.5,
            }
        );

        let bad_momentum = NetworkConfig {
            momentum: -0.1,
            ..NetworkConfig::default()
        };
        assert!(matches!(
            NeuralNetwork::new(&[2, 1], bad_momentum, &mut rng()),
            Err(NetworkError::RateOutOfRange {
                name: "momentum",
                ..
            })
        ));

        let bad_mutation = NetworkConfig {
            mutation_rate: 2.0,
            ..NetworkConfig::default()
        };
        assert!(matches!(
            NeuralNetwork::new(&[2, 1], bad_mutation, &mut rng()),
            Err(NetworkError::RateOutOfRange {
                name: "mutation rate",
                ..
            })
        ));
    }

    #[test]
    fn test_layer_dimensions_chain() {
        let network = NeuralNetwork::new(&[4, 3, 2], NetworkConfig::default(), &mut rng())
            .expect("valid topology");
        assert_eq!(network.input_width(), 4);
        assert_eq!(network.output_width(), 2);
        let layers = network.layers();
        assert_eq!((layers[0].inputs(), layers[0].outputs()), (4, 3));
        assert_eq!((layers[1].inputs(), layers[1].outputs()), (3, 2));
    }

    #[test]
    fn test_predict_known_values() {
        // Identity first layer, then sum the two units and add 0.5.
        let network = linear_network(
            2,
            &[
                (vec![vec![1.0, 0.0], vec![0.0, 1.0]], vec![0.0, 0.0]),
                (vec![vec![1.0, 1.0]], vec![0.5]),
            ],
        );
        let output = network.predict(&[2.0, 3.0]).expect("width matches");
        assert_eq!(output, vec![5.5]);
    }

    #[test]
    fn test_predict_is_deterministic_and_pure() {
        let network = NeuralNetwork::new(&[3, 5, 2], NetworkConfig::default(), &mut rng())
            .expect("valid topology");
        let before = network.snapshot();
        let first = network.predict(&[0.1, -0.2, 0.3]).expect("width matches");
        let second = network.predict(&[0.1, -0.2, 0.3]).expect("width matches");
        assert_eq!(first, second);
        assert_eq!(network.snapshot(), before, "predict must not mutate state");
    }

    #[test]
    fn test_predict_rejects_wrong_input_width() {
        let network = NeuralNetwork::new(&[2, 1], NetworkConfig::default(), &mut rng())
            .expect("valid topology");
        assert_eq!(
            network.predict(&[1.0, 2.0, 3.0]),
            Err(NetworkError::InputWidth {
                expected: 2,
                actual: 3,
            })
        );
    }

    #[test]
    fn test_learn_rejects_wrong_target_width() {
        let mut network = NeuralNetwork::new(&[2, 1], NetworkConfig::default(), &mut rng())
            .expect("valid topology");
        assert_eq!(
            network.learn(&[1.0, 0.0], &[1.0, 0.0]),
            Err(NetworkError::TargetWidth {
                expected: 1,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_train_reduces_cost_on_fixed_pair() {
        let mut network =
            NeuralNetwork::new(&[2, 2, 1], config(0.5, RateDecay::None), &mut rng())
                .expect("valid topology");
        let inputs = vec![vec![0.3, 0.9]];
        let targets = vec![vec![0.8]];

        let before = sample_cost(&network, &inputs[0], &targets[0]);
        network
            .train(&inputs, &targets, 1_000, &mut rng())
            .expect("training set is valid");
        let after = sample_cost(&network, &inputs[0], &targets[0]);

        assert!(
            after < before,
            "cost must decrease after training: before {before}, after {after}",
        );
        assert!(after < 1e-3, "1000 steps on one pair should nearly fit it");
    }

    #[test]
    fn test_learn_advances_iteration_and_decays_rate() {
        let mut network = NeuralNetwork::new(
            &[2, 1],
            NetworkConfig {
                decay: RateDecay::Sgd,
                learning_rate: 0.6,
                momentum: 0.5,
                ..NetworkConfig::default()
            },
            &mut rng(),
        )
        .expect("valid topology");

        network.learn(&[0.0, 1.0], &[1.0]).expect("widths match");
        // First step runs at the initial rate.
        assert_eq!(network.iteration(), 1);
        assert_eq!(network.learning_rate(), 0.6);

        network.learn(&[0.0, 1.0], &[1.0]).expect("widths match");
        assert_eq!(network.iteration(), 2);
        assert_eq!(network.learning_rate(), 0.6 / 1.5);

        let keys = network.trace().records().keys().copied().collect::<Vec<_>>();
        assert_eq!(keys, vec![0, 1]);
    }

    #[test]
    fn test_train_rejects_bad_sets() {
        let mut network = NeuralNetwork::new(&[2, 1], NetworkConfig::default(), &mut rng())
            .expect("valid topology");
        assert_eq!(
            network.train(&[], &[], 10, &mut rng()),
            Err(NetworkError::EmptyTrainingSet)
        );
        assert_eq!(
            network.train(&[vec![0.0, 0.0]], &[vec![0.0], vec![1.0]], 10, &mut rng()),
            Err(NetworkError::SampleCountMismatch {
                inputs: 1,
                targets: 2,
            })
        );
    }

    #[test]
    fn test_mutated_with_rate_zero_is_identity() {
        let network = NeuralNetwork::new(
            &[2, 3, 1],
            NetworkConfig {
                mutation_rate: 0.0,
                ..NetworkConfig::default()
            },
            &mut rng(),
        )
        .expect("valid topology");
        let clone = network.mutated(&mut rng());
        assert_eq!(clone.snapshot(), network.snapshot());
    }

    #[test]
    fn test_mutated_perturbs_within_learning_rate() {
        let network =
            NeuralNetwork::new(&[2, 3, 1], config(0.25, RateDecay::None), &mut rng())
                .expect("valid topology");
        let mutant = network.mutated(&mut rng());

        let before = network.snapshot();
        let after = mutant.snapshot();
        assert_ne!(after, before, "rate-1 mutation must move parameters");
        for (own, theirs) in before.layers.iter().zip(&after.layers) {
            for (prior, moved) in own
                .weights
                .iter()
                .chain(&own.bias)
                .zip(theirs.weights.iter().chain(&theirs.bias))
            {
                assert!(
                    (moved - prior).abs() <= 0.25,
                    "perturbation must stay within the learning rate",
                );
            }
        }
    }

    #[test]
    fn test_merged_averages_parameters() {
        let a = linear_network(2, &[(vec![vec![2.0, 4.0]], vec![1.0])]);
        let b = linear_network(2, &[(vec![vec![6.0, 0.0]], vec![3.0])]);
        let child = NeuralNetwork::merged(&[&a, &b]).expect("same topology");
        let snapshot = child.snapshot();
        assert_eq!(snapshot.layers[0].weights, vec![4.0, 2.0]);
        assert_eq!(snapshot.layers[0].bias, vec![2.0]);

        // Pairwise fold: with three parents the last carries half the weight.
        let c = linear_network(2, &[(vec![vec![0.0, 0.0]], vec![0.0])]);
        let folded = NeuralNetwork::merged(&[&a, &b, &c]).expect("same topology");
        assert_eq!(folded.snapshot().layers[0].weights, vec![2.0, 1.0]);

        // Operands are untouched.
        assert_eq!(a.snapshot().layers[0].weights, vec![2.0, 4.0]);
    }

    #[test]
    fn test_merged_rejects_empty_and_mismatched() {
        assert_eq!(
            NeuralNetwork::merged(&[]).map(|n| n.snapshot()),
            Err(NetworkError::EmptyMergeSet)
        );
        let a = NeuralNetwork::new(&[2, 2, 1], NetworkConfig::default(), &mut rng())
            .expect("valid topology");
        let b = NeuralNetwork::new(&[2, 3, 1], NetworkConfig::default(), &mut rng())
            .expect("valid topology");
        assert!(matches!(
            NeuralNetwork::merged(&[&a, &b]),
            Err(NetworkError::TopologyMismatch)
        ));
    }

    #[test]
    fn test_snapshot_round_trip_is_lossless() {
        let mut source_rng = rng();
        let network = NeuralNetwork::new(&[3, 4, 2], NetworkConfig::default(), &mut source_rng)
            .expect("valid topology")
            .mutated(&mut source_rng);
        let snapshot = network.snapshot();

        let restored = NeuralNetwork::from_snapshot(snapshot.clone()).expect("snapshot is valid");
        assert_eq!(restored.snapshot(), snapshot);

        let json = serde_json::to_string(&snapshot).expect("serializable");
        let parsed: NetworkSnapshot = serde_json::from_str(&json).expect("parsable");
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_from_snapshot_validates() {
        let valid = NeuralNetwork::new(&[2, 2, 1], NetworkConfig::default(), &mut rng())
            .expect("valid topology")
            .snapshot();

        let mut wrong_count = valid.clone();
        wrong_count.layers[0].weights.pop();
        assert!(matches!(
            NeuralNetwork::from_snapshot(wrong_count),
            Err(NetworkError::SnapshotElementCount {
                layer: 0,
                kind: "weight",
                ..
            })
        ));

        let mut broken_chain = valid.clone();
        broken_chain.layers[1].inputs = 3;
        assert!(matches!(
            NeuralNetwork::from_snapshot(broken_chain),
            Err(NetworkError::SnapshotChainMismatch { layer: 1, .. })
        ));

        let mut bad_rate = valid;
        bad_rate.momentum = 7.0;
        assert!(matches!(
            NeuralNetwork::from_snapshot(bad_rate),
            Err(NetworkError::RateOutOfRange {
                name: "momentum",
                ..
            })
        ));
    }

    #[test]
    fn test_xor_regression() {
        let inputs = vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 1.0],
        ];
        let targets = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];

        // Eight hidden units keep gradient descent clear of the local minima
        // a minimal XOR topology can stall in.
        let mut training_rng = Pcg64::seed_from_u64(1729);
        let mut network =
            NeuralNetwork::new(&[2, 8, 1], config(0.5, RateDecay::None), &mut training_rng)
                .expect("valid topology");
        network
            .train(&inputs, &targets, 50_000, &mut training_rng)
            .expect("training set is valid");

        for (input, target) in inputs.iter().zip(&targets) {
            let output = network.predict(input).expect("width matches");
            assert!(
                (output[0] - target[0]).abs() < 0.3,
                "prediction {output:?} for {input:?} must come within 0.3 of {target:?}",
            );
        }
    }
}
