//! Generation-based evolution of neural networks.
//!
//! This crate drives populations of [`Agent`]s, each wrapping a
//! [`NeuralNetwork`](nevo_network::NeuralNetwork), through repeated rounds of
//! mutate → evaluate → rank → select → merge. The network crate supplies the
//! genetic operators (`mutated`, `merged`); this crate supplies the loop
//! around them.
//!
//! # How a batch evolves
//!
//! 1. **Spawn**: each generation copies the seed network into N population
//!    slots, mutating every slot but the first.
//! 2. **Evaluate**: agents run concurrently on a bounded worker pool until
//!    they finish or exhaust the step budget.
//! 3. **Rank**: specimens are ordered by descending fitness; a panicking
//!    agent demotes its slot rather than aborting the round.
//! 4. **Select & merge**: the round's best network plus roulette-selected
//!    elites are averaged into the next seed, whose learning rate then decays
//!    one step (shrinking future mutations).
//!
//! # Modules
//!
//! - [`agent`]: The [`Agent`] capability contract and closure-friendly
//!   [`AgentFactory`]
//! - [`config`]: [`EvolutionConfig`] and its validation
//! - [`generation`]: One GA round and its ranked [`GenerationOutcome`]
//! - [`batch`]: The outer loop with retained-best tracking
//!
//! # Example
//!
//! ```
//! use nevo_evolution::{Agent, Batch, BoxedAgent, EvolutionConfig};
//! use nevo_network::{NetworkConfig, NeuralNetwork};
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg64;
//!
//! // Reward networks whose output on [1, 1] is as large as possible.
//! struct SumAgent {
//!     brain: NeuralNetwork,
//!     fitness: f64,
//! }
//!
//! impl Agent for SumAgent {
//!     fn step(&mut self) -> bool {
//!         self.fitness = self.brain.predict(&[1.0, 1.0]).unwrap()[0];
//!         false
//!     }
//!     fn fitness(&self) -> f64 {
//!         self.fitness
//!     }
//!     fn is_immature(&self) -> bool {
//!         false
//!     }
//!     fn reached_goal(&self) -> bool {
//!         false
//!     }
//!     fn brain(&self) -> &NeuralNetwork {
//!         &self.brain
//!     }
//!     fn log_message(&self) -> String {
//!         format!("sum {}", self.fitness)
//!     }
//! }
//!
//! let mut rng = Pcg64::seed_from_u64(5);
//! let seed = NeuralNetwork::new(&[2, 1], NetworkConfig::default(), &mut rng).unwrap();
//! let factory = |brain: NeuralNetwork| -> BoxedAgent {
//!     Box::new(SumAgent {
//!         brain,
//!         fitness: f64::MIN,
//!     })
//! };
//! let config = EvolutionConfig {
//!     population_size: 8,
//!     parent_count: 2,
//!     worker_count: 2,
//!     step_limit: 1,
//!     generation_cap: Some(2),
//!     ..EvolutionConfig::default()
//! };
//!
//! let mut batch = Batch::new(seed, config, Box::new(factory)).unwrap();
//! while batch.process_generation(&mut rng).is_some() {}
//!
//! assert_eq!(batch.generations_completed(), 2);
//! assert!(batch.retained_best().is_some());
//! ```

pub mod agent;
pub mod batch;
pub mod config;
pub mod generation;

pub use self::{
    agent::{Agent, AgentFactory, BoxedAgent, BoxedAgentFactory},
    batch::Batch,
    config::{ConfigError, EvolutionConfig},
    generation::{Generation, GenerationOutcome, Specimen},
};
