//! The outer evolution driver.
//!
//! A [`Batch`] owns the current seed network and the agent factory, runs
//! one [`Generation`] per call to
//! [`process_generation`](Batch::process_generation), and keeps two pieces
//! of history: the latest round's full outcome and the best specimen seen
//! across every round (the retained best). The seed the batch holds after a
//! round is the merged child, which is usually *not* the round's best
//! network, so both are exposed separately.

use nevo_network::NeuralNetwork;
use nevo_stats::descriptive::DescriptiveStats;
use rand::Rng;

use crate::{
    agent::BoxedAgentFactory,
    config::{ConfigError, EvolutionConfig},
    generation::{Generation, GenerationOutcome, Specimen},
};

/// Drives the generation loop until the configured cap, tracking the best
/// specimen along the way.
pub struct Batch {
    seed: NeuralNetwork,
    config: EvolutionConfig,
    factory: BoxedAgentFactory,
    next_generation_id: u64,
    latest: Option<GenerationOutcome>,
    retained_best: Option<Specimen>,
}

impl Batch {
    /// Creates a batch, validating the configuration up front.
    pub fn new(
        seed: NeuralNetwork,
        config: EvolutionConfig,
        factory: BoxedAgentFactory,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            seed,
            config,
            factory,
            next_generation_id: 0,
            latest: None,
            retained_best: None,
        })
    }

    /// Runs one generation and returns the new seed network, or `None` once
    /// the generation cap is reached.
    pub fn process_generation<R>(&mut self, rng: &mut R) -> Option<&NeuralNetwork>
    where
        R: Rng + ?Sized,
    {
        if self
            .config
            .generation_cap
            .is_some_and(|cap| self.next_generation_id >= cap)
        {
            return None;
        }

        let generation =
            Generation::new(self.next_generation_id, &self.config, self.factory.as_ref());
        let outcome = generation.run(&self.seed, rng);
        self.next_generation_id += 1;
        self.seed = outcome.next_seed().clone();
        if let Some(best) = outcome.best() {
            let improved = self
                .retained_best
                .as_ref()
                .is_none_or(|retained| best.fitness() > retained.fitness());
            if improved {
                self.retained_best = Some(best.clone());
            }
        }
        self.latest = Some(outcome);
        Some(&self.seed)
    }

    /// The network the next generation will mutate from.
    #[must_use]
    pub const fn seed(&self) -> &NeuralNetwork {
        &self.seed
    }

    /// The evolution parameters this batch runs with.
    #[must_use]
    pub const fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// How many generations have completed.
    #[must_use]
    pub const fn generations_completed(&self) -> u64 {
        self.next_generation_id
    }

    /// The most recent round's outcome.
    #[must_use]
    pub const fn latest(&self) -> Option<&GenerationOutcome> {
        self.latest.as_ref()
    }

    /// The best network of the most recent round.
    #[must_use]
    pub fn best_network(&self) -> Option<&NeuralNetwork> {
        self.latest
            .as_ref()
            .and_then(GenerationOutcome::best)
            .map(Specimen::network)
    }

    /// The best specimen seen across every round so far.
    #[must_use]
    pub const fn retained_best(&self) -> Option<&Specimen> {
        self.retained_best.as_ref()
    }

    /// Networks of the latest round's top `count` specimens, best first.
    #[must_use]
    pub fn top_networks(&self, count: usize) -> Vec<&NeuralNetwork> {
        self.latest
            .as_ref()
            .map(|outcome| outcome.top_networks(count))
            .unwrap_or_default()
    }

    /// Fitness statistics of the latest round.
    #[must_use]
    pub fn fitness_stats(&self) -> Option<DescriptiveStats> {
        self.latest
            .as_ref()
            .and_then(GenerationOutcome::fitness_stats)
    }

    /// `true` if any specimen of the latest round reached its goal.
    #[must_use]
    pub fn reached_goal(&self) -> bool {
        self.latest
            .as_ref()
            .is_some_and(GenerationOutcome::reached_goal)
    }
}
