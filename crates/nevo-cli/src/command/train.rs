use anyhow::Context as _;
use chrono::Utc;
use nevo_network::{ConfusionCounts, NeuralNetwork, TrainingTrace, trace::CLASSIFICATION_THRESHOLD};
use nevo_stats::descriptive::DescriptiveStats;

use crate::{model::TrainedModel, util::Output};

use super::{NetworkArg, XOR_INPUTS, XOR_TARGETS, report_predictions};

/// How many windows the cost trajectory report is split into.
const COST_WINDOWS: usize = 10;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    #[command(flatten)]
    network: NetworkArg,
    /// Number of backpropagation rounds
    #[arg(long, default_value_t = 20_000)]
    rounds: usize,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg { network, rounds } = arg;
    let mut rng = network.rng();
    let mut net = network.build_network(&mut rng)?;

    let inputs: Vec<Vec<f64>> = XOR_INPUTS.iter().map(|row| row.to_vec()).collect();
    let targets: Vec<Vec<f64>> = XOR_TARGETS.iter().map(|row| row.to_vec()).collect();

    eprintln!("Training on XOR for {rounds} rounds");
    net.train(&inputs, &targets, *rounds, &mut rng)
        .context("training failed")?;

    report_cost_windows(net.trace());
    report_classification(net.trace().cumulative());
    report_predictions(&net)?;

    let final_cost = mean_cost(&net, &inputs, &targets)?;
    let model = TrainedModel {
        name: "xor-train".to_owned(),
        trained_at: Utc::now(),
        final_score: final_cost,
        snapshot: net.snapshot(),
    };
    Output::save_json(&model, network.output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &network.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Final cost: {:.6}", model.final_score);

    Ok(())
}

/// Summarizes the recorded costs window by window, so the decline is visible
/// without dumping every round.
fn report_cost_windows(trace: &TrainingTrace) {
    let costs: Vec<f64> = trace.costs().collect();
    let window = (costs.len() / COST_WINDOWS).max(1);
    eprintln!("Cost by training window:");
    for (index, chunk) in costs.chunks(window).enumerate() {
        let Some(stats) = DescriptiveStats::new(chunk.iter().copied()) else {
            continue;
        };
        eprintln!(
            "  from round {:>6}: mean {:.6}, min {:.6}, max {:.6}",
            index * window,
            stats.mean,
            stats.min,
            stats.max,
        );
    }
}

fn report_classification(counts: ConfusionCounts) {
    eprintln!("Classification at threshold {CLASSIFICATION_THRESHOLD}:");
    eprintln!("  Accuracy:  {:.3}", counts.accuracy());
    eprintln!("  Precision: {:.3}", counts.precision());
    eprintln!("  Recall:    {:.3}", counts.recall());
    eprintln!("  F1 score:  {:.3}", counts.f1());
}

/// Mean cost over the whole sample set after training, the score stored in
/// the model file.
fn mean_cost(
    network: &NeuralNetwork,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
) -> anyhow::Result<f64> {
    let mut total = 0.0;
    for (input, target) in inputs.iter().zip(targets) {
        let output = network.predict(input)?;
        let error: f64 = output
            .iter()
            .zip(target)
            .map(|(actual, expected)| (expected - actual).powi(2))
            .sum();
        #[expect(clippy::cast_precision_loss)]
        let width = target.len() as f64;
        total += error / width;
    }
    #[expect(clippy::cast_precision_loss)]
    let count = inputs.len() as f64;
    Ok(total / count)
}
