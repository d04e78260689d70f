//! One round of the genetic algorithm.
//!
//! A [`Generation`] is short-lived: the [`Batch`](crate::batch::Batch) builds
//! a fresh one per round, runs it against the current seed network, and keeps
//! only the [`GenerationOutcome`].
//!
//! # Round lifecycle
//!
//! 1. **Spawn**: slot 0 receives an identity copy of the seed (the unmutated
//!    control); slots `1..N` receive `seed.mutated(rng)` copies. All mutation
//!    draws come from the injected RNG before any worker starts.
//! 2. **Run**: slots are dispatched to a fixed pool of scoped worker
//!    threads. Each worker pulls slot indices from an atomic counter, spawns
//!    the agent around a clone of that slot's brain, and steps it until it
//!    finishes or the step budget runs out.
//! 3. **Rank**: after the join barrier, specimens are sorted descending by
//!    fitness; failed slots (the agent panicked) sink to the end.
//! 4. **Select**: the elite pool is the top `ceil(N * elite_fraction)`
//!    ranked specimens, clamped to the successful count. Parents beyond the
//!    round's best are drawn from the pool by roulette wheel.
//! 5. **Reproduce**: parent networks are merged by element-wise averaging
//!    and the child's learning rate is decayed one step, which also shrinks
//!    the mutation magnitude of the following round.
//!
//! # Selection pressure
//!
//! Roulette selection is fitness-proportional with re-selection allowed.
//! Negative fitness contributes no wheel mass, so domains with negative
//! scores degenerate toward best-only selection rather than inverting the
//! pressure. When the whole wheel is massless the top-ranked pool member
//! wins by default.
//!
//! # Failure model
//!
//! Each slot's agent runs inside `catch_unwind`: a panicking agent demotes
//! its slot to a failed specimen (ranked last, zero selection mass, panic
//! text as its log line) instead of tearing down the round. If every slot
//! fails, the round hands the seed back unchanged.

use std::{
    any::Any,
    cmp,
    panic::{self, AssertUnwindSafe},
    sync::atomic::{self, AtomicUsize},
    thread,
};

use nevo_network::NeuralNetwork;
use nevo_stats::descriptive::DescriptiveStats;
use rand::Rng;

use crate::{agent::AgentFactory, config::EvolutionConfig};

/// The result of one population slot: the network that ran, the fitness it
/// earned, and the flags its agent reported.
#[derive(Debug, Clone)]
pub struct Specimen {
    slot: usize,
    network: NeuralNetwork,
    fitness: Option<f64>,
    immature: bool,
    reached_goal: bool,
    log_message: String,
}

impl Specimen {
    /// Returns the population slot this specimen ran in.
    #[must_use]
    pub const fn slot(&self) -> usize {
        self.slot
    }

    /// Returns the network the agent finished with.
    #[must_use]
    pub const fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    /// Returns the fitness, or `None` if the agent panicked.
    #[must_use]
    pub const fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// `true` if the agent panicked mid-run.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        self.fitness.is_none()
    }

    /// `true` if the agent reported its result as immature.
    #[must_use]
    pub const fn is_immature(&self) -> bool {
        self.immature
    }

    /// `true` if the agent reached the caller-defined goal.
    #[must_use]
    pub const fn reached_goal(&self) -> bool {
        self.reached_goal
    }

    /// The agent's diagnostic line, or the panic message for failed slots.
    #[must_use]
    pub fn log_message(&self) -> &str {
        &self.log_message
    }
}

/// Everything a finished round produced.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    id: u64,
    specimens: Vec<Specimen>,
    next_seed: NeuralNetwork,
}

impl GenerationOutcome {
    /// The id of the generation that produced this outcome.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Specimens in rank order: descending fitness, failed slots last.
    #[must_use]
    pub fn specimens(&self) -> &[Specimen] {
        &self.specimens
    }

    /// The seed network for the next round.
    #[must_use]
    pub const fn next_seed(&self) -> &NeuralNetwork {
        &self.next_seed
    }

    /// The best specimen that finished, if any did.
    #[must_use]
    pub fn best(&self) -> Option<&Specimen> {
        self.specimens.iter().find(|specimen| !specimen.is_failed())
    }

    /// Networks of the top `count` finished specimens, best first.
    #[must_use]
    pub fn top_networks(&self, count: usize) -> Vec<&NeuralNetwork> {
        self.specimens
            .iter()
            .filter(|specimen| !specimen.is_failed())
            .take(count)
            .map(Specimen::network)
            .collect()
    }

    /// `true` if any agent reported reaching its goal.
    #[must_use]
    pub fn reached_goal(&self) -> bool {
        self.specimens.iter().any(Specimen::reached_goal)
    }

    /// Fitness statistics over the finished specimens.
    #[must_use]
    pub fn fitness_stats(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.specimens.iter().filter_map(Specimen::fitness))
    }
}

/// A single spawn → run → rank → select → reproduce round.
pub struct Generation<'a> {
    id: u64,
    config: &'a EvolutionConfig,
    factory: &'a dyn AgentFactory,
}

impl<'a> Generation<'a> {
    /// Creates a round for an already-validated config.
    #[must_use]
    pub fn new(id: u64, config: &'a EvolutionConfig, factory: &'a dyn AgentFactory) -> Self {
        Self {
            id,
            config,
            factory,
        }
    }

    /// This round's id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Runs the full round and returns the ranked outcome.
    ///
    /// Mutation and selection draws are taken from `rng` on the calling
    /// thread only, so a seeded run is reproducible regardless of worker
    /// scheduling.
    pub fn run<R>(&self, seed: &NeuralNetwork, rng: &mut R) -> GenerationOutcome
    where
        R: Rng + ?Sized,
    {
        let brains = self.spawn_brains(seed, rng);
        let mut specimens = self.run_agents(&brains);
        rank(&mut specimens);
        let next_seed = self.reproduce(seed, &specimens, rng);
        GenerationOutcome {
            id: self.id,
            specimens,
            next_seed,
        }
    }

    /// Slot 0 keeps the seed untouched as a control; every other slot gets
    /// an independently mutated copy.
    fn spawn_brains<R>(&self, seed: &NeuralNetwork, rng: &mut R) -> Vec<NeuralNetwork>
    where
        R: Rng + ?Sized,
    {
        (0..self.config.population_size)
            .map(|slot| {
                if slot == 0 {
                    seed.clone()
                } else {
                    seed.mutated(rng)
                }
            })
            .collect()
    }

    /// Evaluates every slot on the worker pool and collects the specimens
    /// after the join barrier.
    fn run_agents(&self, brains: &[NeuralNetwork]) -> Vec<Specimen> {
        let step_limit = self.config.step_limit;
        let factory = self.factory;
        let next_slot = AtomicUsize::new(0);
        thread::scope(|s| {
            let workers = (0..self.config.worker_count)
                .map(|_| {
                    s.spawn(|| {
                        let mut completed = Vec::new();
                        loop {
                            let slot = next_slot.fetch_add(1, atomic::Ordering::Relaxed);
                            let Some(brain) = brains.get(slot) else {
                                break;
                            };
                            completed.push(run_slot(slot, brain, factory, step_limit));
                        }
                        completed
                    })
                })
                .collect::<Vec<_>>();
            workers
                .into_iter()
                .flat_map(|worker| worker.join().expect("workers catch agent panics"))
                .collect()
        })
    }

    /// Selects parents from the ranked specimens and merges them into the
    /// next seed.
    ///
    /// The immaturity shortcut considers surviving specimens only; a failed
    /// slot does not block it.
    fn reproduce<R>(
        &self,
        seed: &NeuralNetwork,
        specimens: &[Specimen],
        rng: &mut R,
    ) -> NeuralNetwork
    where
        R: Rng + ?Sized,
    {
        let successful = specimens
            .iter()
            .take_while(|specimen| !specimen.is_failed())
            .count();
        if successful == 0 {
            return seed.clone();
        }
        let survivors = &specimens[..successful];
        if specimens.len() < 2 {
            return survivors[0].network.clone();
        }

        if self.config.immaturity_shortcut && survivors.iter().all(Specimen::is_immature) {
            let parents = survivors
                .iter()
                .take(2)
                .map(Specimen::network)
                .collect::<Vec<_>>();
            return child_of(&parents);
        }

        let pool = elite_pool(survivors, self.config.elite_fraction, specimens.len());
        let mut parents = Vec::with_capacity(self.config.parent_count);
        parents.push(&survivors[0].network);
        for _ in 1..self.config.parent_count {
            parents.push(&roulette_select(pool, rng).network);
        }
        child_of(&parents)
    }
}

/// Merges the parents and advances the child's decay schedule one step.
fn child_of(parents: &[&NeuralNetwork]) -> NeuralNetwork {
    let mut child = NeuralNetwork::merged(parents).expect("parents share the seed's topology");
    child.decay_rate();
    child
}

/// Sorts descending by fitness with failed slots last. Ranking first
/// normalizes to slot order, so ties are deterministic no matter which
/// worker finished first.
fn rank(specimens: &mut [Specimen]) {
    specimens.sort_by_key(Specimen::slot);
    specimens.sort_by(|a, b| match (a.fitness, b.fitness) {
        (Some(a_fitness), Some(b_fitness)) => b_fitness.total_cmp(&a_fitness),
        (Some(_), None) => cmp::Ordering::Less,
        (None, Some(_)) => cmp::Ordering::Greater,
        (None, None) => cmp::Ordering::Equal,
    });
}

/// The top `ceil(population × elite_fraction)` ranked specimens, at least
/// one and at most every survivor.
fn elite_pool(survivors: &[Specimen], elite_fraction: f64, population: usize) -> &[Specimen] {
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let size = (population as f64 * elite_fraction).ceil() as usize;
    &survivors[..size.clamp(1, survivors.len())]
}

/// Fitness-proportional draw over the elite pool.
///
/// Negative fitness contributes no wheel mass. When the wheel cannot be
/// sampled proportionally (no positive mass, or an infinite score swamping
/// the sum), the top-ranked member wins by default.
fn roulette_select<'pool, R>(pool: &'pool [Specimen], rng: &mut R) -> &'pool Specimen
where
    R: Rng + ?Sized,
{
    assert!(!pool.is_empty(), "selection pool must not be empty");
    let total = pool.iter().map(wheel_mass).sum::<f64>();
    if total <= 0.0 || !total.is_finite() {
        return &pool[0];
    }
    let draw = rng.random_range(0.0..total);
    let mut accumulated = 0.0;
    for specimen in pool {
        accumulated += wheel_mass(specimen);
        if accumulated > draw {
            return specimen;
        }
    }
    // Float accumulation can land the draw past the final mass.
    &pool[pool.len() - 1]
}

fn wheel_mass(specimen: &Specimen) -> f64 {
    specimen.fitness.map_or(0.0, |fitness| fitness.max(0.0))
}

/// Runs one slot to completion on the calling worker thread.
///
/// The agent's whole lifetime sits inside `catch_unwind`, so a panic
/// anywhere in the agent demotes the slot instead of unwinding the worker.
fn run_slot(
    slot: usize,
    brain: &NeuralNetwork,
    factory: &dyn AgentFactory,
    step_limit: u64,
) -> Specimen {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut agent = factory.spawn_agent(brain.clone());
        let mut steps = 0;
        while steps < step_limit && agent.step() {
            steps += 1;
        }
        Specimen {
            slot,
            network: agent.brain().clone(),
            fitness: Some(agent.fitness()),
            immature: agent.is_immature(),
            reached_goal: agent.reached_goal(),
            log_message: agent.log_message(),
        }
    }));
    outcome.unwrap_or_else(|payload| Specimen {
        slot,
        network: brain.clone(),
        fitness: None,
        immature: false,
        reached_goal: false,
        log_message: panic_message(payload.as_ref()),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "agent panicked".to_owned()
    }
}
