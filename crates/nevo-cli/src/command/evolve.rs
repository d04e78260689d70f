use anyhow::Context as _;
use chrono::Utc;
use nevo_evolution::{Agent, Batch, BoxedAgent, BoxedAgentFactory, EvolutionConfig};
use nevo_network::NeuralNetwork;

use crate::{model::TrainedModel, util::Output};

use super::{NetworkArg, XOR_INPUTS, XOR_TARGETS, report_predictions};

/// Fitness above which an agent counts as having solved XOR.
const GOAL_FITNESS: f64 = -0.05;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvolveArg {
    #[command(flatten)]
    network: NetworkArg,
    /// Number of networks per generation
    #[arg(long, default_value_t = 50)]
    population: usize,
    /// Number of parents merged into the next seed
    #[arg(long, default_value_t = 3)]
    parents: usize,
    /// Fraction of ranked survivors eligible as parents
    #[arg(long, default_value_t = 0.2)]
    elite_fraction: f64,
    /// Number of generations to run
    #[arg(long, default_value_t = 30)]
    generations: u64,
    /// Number of evaluation worker threads
    #[arg(long, default_value_t = 16)]
    workers: usize,
}

/// Scores a network by how close it comes to the XOR truth table. Fitness is
/// the negated total squared error, so 0.0 is perfect.
struct XorAgent {
    brain: NeuralNetwork,
    fitness: f64,
}

impl Agent for XorAgent {
    fn step(&mut self) -> bool {
        self.fitness = -XOR_INPUTS
            .iter()
            .zip(&XOR_TARGETS)
            .map(|(input, target)| {
                let output = self.brain.predict(input).expect("width checked at startup");
                (output[0] - target[0]).powi(2)
            })
            .sum::<f64>();
        false
    }

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn is_immature(&self) -> bool {
        false
    }

    fn reached_goal(&self) -> bool {
        self.fitness > GOAL_FITNESS
    }

    fn brain(&self) -> &NeuralNetwork {
        &self.brain
    }

    fn log_message(&self) -> String {
        format!("xor error {:.6}", -self.fitness)
    }
}

fn xor_factory() -> BoxedAgentFactory {
    Box::new(|brain: NeuralNetwork| -> BoxedAgent {
        Box::new(XorAgent {
            brain,
            fitness: f64::MIN,
        })
    })
}

pub(crate) fn run(arg: &EvolveArg) -> anyhow::Result<()> {
    let EvolveArg {
        network,
        population,
        parents,
        elite_fraction,
        generations,
        workers,
    } = arg;
    let mut rng = network.rng();
    let seed = network.build_network(&mut rng)?;

    let config = EvolutionConfig {
        population_size: *population,
        parent_count: *parents,
        elite_fraction: *elite_fraction,
        worker_count: *workers,
        generation_cap: Some(*generations),
        ..EvolutionConfig::default()
    };
    let mut batch =
        Batch::new(seed, config, xor_factory()).context("invalid evolution configuration")?;

    eprintln!("Evolving XOR networks for {generations} generations");
    while batch.process_generation(&mut rng).is_some() {
        report_round(&batch);
    }

    let best = batch
        .retained_best()
        .context("no generation produced a finished specimen")?;
    let best_fitness = best
        .fitness()
        .context("no generation produced a finished specimen")?;
    report_predictions(best.network())?;

    let model = TrainedModel {
        name: "xor-evolve".to_owned(),
        trained_at: Utc::now(),
        final_score: best_fitness,
        snapshot: best.network().snapshot(),
    };
    Output::save_json(&model, network.output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &network.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Final fitness: {:.6}", model.final_score);

    Ok(())
}

fn report_round(batch: &Batch) {
    let Some(outcome) = batch.latest() else {
        return;
    };
    eprintln!("Generation #{}:", outcome.id());
    if let Some(stats) = outcome.fitness_stats() {
        eprintln!("  Fitness:");
        eprintln!("    Best:    {:.6}", stats.max);
        eprintln!("    Mean:    {:.6}", stats.mean);
        eprintln!("    Std dev: {:.6}", stats.std_dev);
    }
    if let Some(best) = outcome.best() {
        eprintln!("  Top specimen: slot {} ({})", best.slot(), best.log_message());
    }
    let failed = outcome
        .specimens()
        .iter()
        .filter(|specimen| specimen.is_failed())
        .count();
    if failed > 0 {
        eprintln!("  Failed agents: {failed}");
    }
    if outcome.reached_goal() {
        eprintln!("  Goal reached!");
    }
}
