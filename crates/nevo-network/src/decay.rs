//! Learning-rate decay catalog.
//!
//! A network's learning rate is re-derived from its initial rate every time
//! the iteration counter advances. The same schedule doubles as the annealing
//! curve for genetic mutation, since mutation magnitude follows the current
//! learning rate.

use serde::{Deserialize, Serialize};

/// A learning-rate decay schedule.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "snake_case")]
pub enum RateDecay {
    /// No decay; the rate stays at its initial value.
    #[default]
    None,
    /// Inverse decay `initial / (1 + momentum * iteration)`.
    Sgd,
}

impl RateDecay {
    /// Computes the learning rate at a given iteration.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn rate_at(self, initial: f64, momentum: f64, iteration: u64) -> f64 {
        match self {
            Self::None => initial,
            Self::Sgd => initial / (1.0 + momentum * iteration as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_keeps_initial_rate() {
        assert_eq!(RateDecay::None.rate_at(0.3, 0.9, 0), 0.3);
        assert_eq!(RateDecay::None.rate_at(0.3, 0.9, 10_000), 0.3);
    }

    #[test]
    fn test_sgd_decays_monotonically() {
        let initial = 0.5;
        let momentum = 0.1;
        assert_eq!(RateDecay::Sgd.rate_at(initial, momentum, 0), initial);
        assert_eq!(RateDecay::Sgd.rate_at(initial, momentum, 10), 0.25);
        let mut previous = f64::INFINITY;
        for iteration in 0..100 {
            let rate = RateDecay::Sgd.rate_at(initial, momentum, iteration);
            assert!(rate <= previous, "rate must not grow across iterations");
            previous = rate;
        }
    }

    #[test]
    fn test_sgd_zero_momentum_is_constant() {
        assert_eq!(RateDecay::Sgd.rate_at(0.5, 0.0, 1_000), 0.5);
    }
}
