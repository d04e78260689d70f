use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use nevo_network::{Activation, NetworkConfig, NeuralNetwork, RateDecay};
use rand::SeedableRng as _;
use rand_pcg::Pcg64;

use self::{evolve::EvolveArg, train::TrainArg};

mod evolve;
mod train;

/// The XOR truth table both commands learn, row by row.
const XOR_INPUTS: [[f64; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
const XOR_TARGETS: [[f64; 1]; 4] = [[0.0], [1.0], [1.0], [0.0]];

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train a network on XOR with backpropagation
    Train(#[clap(flatten)] TrainArg),
    /// Evolve a population of networks on XOR with the genetic trainer
    Evolve(#[clap(flatten)] EvolveArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Evolve(arg) => evolve::run(&arg)?,
    }
    Ok(())
}

/// Network construction flags shared by both commands.
#[derive(Debug, Clone, clap::Args)]
struct NetworkArg {
    /// Layer widths from input to output, comma separated
    #[arg(long, value_delimiter = ',', default_value = "2,4,1")]
    layers: Vec<usize>,
    /// Neuron activation function (sigmoid, tanh, relu, leakyrelu, linear)
    #[arg(long, default_value = "sigmoid")]
    activation: Activation,
    /// Learning-rate decay schedule (none, sgd)
    #[arg(long, default_value = "none")]
    decay: RateDecay,
    /// Initial learning rate
    #[arg(long, default_value_t = 0.5)]
    learning_rate: f64,
    /// Momentum for the decay schedule
    #[arg(long, default_value_t = 0.01)]
    momentum: f64,
    /// Probability that a weight is perturbed during mutation
    #[arg(long, default_value_t = 1.0)]
    mutation_rate: f64,
    /// RNG seed for reproducible runs (defaults to OS entropy)
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl NetworkArg {
    fn config(&self) -> NetworkConfig {
        NetworkConfig {
            activation: self.activation,
            decay: self.decay,
            learning_rate: self.learning_rate,
            momentum: self.momentum,
            mutation_rate: self.mutation_rate,
        }
    }

    fn rng(&self) -> Pcg64 {
        match self.seed {
            Some(seed) => {
                eprintln!("Seeded run: {seed}");
                Pcg64::seed_from_u64(seed)
            }
            None => Pcg64::from_os_rng(),
        }
    }

    fn build_network(&self, rng: &mut Pcg64) -> anyhow::Result<NeuralNetwork> {
        let network = NeuralNetwork::new(&self.layers, self.config(), rng).with_context(|| {
            format!("invalid network configuration for layers {:?}", self.layers)
        })?;
        if network.input_width() != 2 || network.output_width() != 1 {
            anyhow::bail!(
                "XOR needs a 2-input, 1-output network, got {}-input, {}-output",
                network.input_width(),
                network.output_width(),
            );
        }
        Ok(network)
    }
}

/// Prints the network's output for each XOR row next to the expected value.
fn report_predictions(network: &NeuralNetwork) -> anyhow::Result<()> {
    eprintln!("Predictions:");
    for (input, target) in XOR_INPUTS.iter().zip(&XOR_TARGETS) {
        let output = network.predict(input).context("failed to run prediction")?;
        eprintln!("  {input:?} => {:.4} (expected {:.0})", output[0], target[0]);
    }
    Ok(())
}
