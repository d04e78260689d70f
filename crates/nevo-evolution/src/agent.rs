//! The capability contract between the evolutionary loop and the domain.
//!
//! The loop knows nothing about what an agent actually does; it only spawns
//! agents around networks, steps them, and reads their scores. Anything that
//! can wrap a [`NeuralNetwork`] and report a fitness can be evolved.
//!
//! Factories are shared read-only across the worker threads of a generation,
//! so [`AgentFactory`] requires [`Sync`]. The agents themselves live and die
//! on a single worker thread and carry no such bound.

use nevo_network::NeuralNetwork;

/// One evolvable candidate: a network plus the domain logic that scores it.
///
/// An agent is created once per population slot per generation and never
/// re-mutated mid-run. The loop drives [`step`](Self::step) until it returns
/// `false` or the configured step budget runs out, then reads the final
/// fitness and flags exactly once.
pub trait Agent {
    /// Advances the agent by one unit of work.
    ///
    /// Returns `true` to keep running, `false` once the agent is finished.
    fn step(&mut self) -> bool;

    /// The agent's score so far; higher is better.
    ///
    /// Must be totally ordered (no NaN) and should only improve or hold
    /// steady as the run progresses.
    fn fitness(&self) -> f64;

    /// `true` while the agent considers its own result too undeveloped for
    /// fitness-proportional selection.
    fn is_immature(&self) -> bool;

    /// `true` once the agent has reached the caller-defined goal.
    fn reached_goal(&self) -> bool;

    /// Read access to the network driving this agent.
    fn brain(&self) -> &NeuralNetwork;

    /// A one-line diagnostic describing the agent's result.
    fn log_message(&self) -> String;
}

/// An owned, dynamically typed [`Agent`].
pub type BoxedAgent = Box<dyn Agent>;

/// Spawns agents around the networks a generation hands out.
///
/// Blanket-implemented for any `Fn(NeuralNetwork) -> BoxedAgent + Sync`
/// closure, so a plain closure is usually all a caller needs.
pub trait AgentFactory: Sync {
    /// Wraps `brain` in a fresh agent.
    fn spawn_agent(&self, brain: NeuralNetwork) -> BoxedAgent;
}

/// An owned, dynamically typed [`AgentFactory`].
pub type BoxedAgentFactory = Box<dyn AgentFactory>;

impl<F> AgentFactory for F
where
    F: Fn(NeuralNetwork) -> BoxedAgent + Sync,
{
    fn spawn_agent(&self, brain: NeuralNetwork) -> BoxedAgent {
        self(brain)
    }
}
