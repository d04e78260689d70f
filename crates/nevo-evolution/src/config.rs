//! Parameters of the evolutionary loop, validated before any round runs.

/// Error raised when an [`EvolutionConfig`] is rejected.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be at least 1")]
    ZeroPopulation,
    #[display("parent count must be at least 1")]
    ZeroParents,
    #[display("parent count {parents} exceeds population size {population}")]
    TooManyParents { parents: usize, population: usize },
    #[display("elite fraction must be within (0, 1], got {value}")]
    EliteFractionOutOfRange { value: f64 },
    #[display("worker count must be at least 1")]
    ZeroWorkers,
    #[display("step limit must be at least 1")]
    ZeroStepLimit,
}

/// Controls how a [`Batch`](crate::batch::Batch) evolves its population.
///
/// Validated once at batch construction; the same config drives every
/// generation of the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionConfig {
    /// Number of agents per generation (slot 0 is the unmutated control).
    pub population_size: usize,
    /// Number of parents merged into the next seed (best network included).
    pub parent_count: usize,
    /// Fraction of the ranked population eligible for roulette selection.
    pub elite_fraction: f64,
    /// Worker threads evaluating agents concurrently.
    pub worker_count: usize,
    /// Upper bound on `step()` invocations per agent; keeps rounds finite.
    pub step_limit: u64,
    /// When every specimen reports itself immature, merge the top two and
    /// skip roulette selection.
    pub immaturity_shortcut: bool,
    /// Stop after this many generations; `None` runs unbounded.
    pub generation_cap: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            parent_count: 3,
            elite_fraction: 0.2,
            worker_count: 16,
            step_limit: 10_000,
            immaturity_shortcut: false,
            generation_cap: None,
        }
    }
}

impl EvolutionConfig {
    /// Checks every parameter range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::ZeroPopulation);
        }
        if self.parent_count == 0 {
            return Err(ConfigError::ZeroParents);
        }
        if self.parent_count > self.population_size {
            return Err(ConfigError::TooManyParents {
                parents: self.parent_count,
                population: self.population_size,
            });
        }
        let fraction_valid = self.elite_fraction > 0.0 && self.elite_fraction <= 1.0;
        if !fraction_valid {
            return Err(ConfigError::EliteFractionOutOfRange {
                value: self.elite_fraction,
            });
        }
        if self.worker_count == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.step_limit == 0 {
            return Err(ConfigError::ZeroStepLimit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EvolutionConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert!(!config.immaturity_shortcut, "shortcut must default to off");
        assert_eq!(config.generation_cap, None);
    }

    #[test]
    fn test_rejects_zero_population() {
        let config = EvolutionConfig {
            population_size: 0,
            ..EvolutionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroPopulation));
    }

    #[test]
    fn test_rejects_zero_parents() {
        let config = EvolutionConfig {
            parent_count: 0,
            ..EvolutionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroParents));
    }

    #[test]
    fn test_rejects_parent_count_above_population() {
        let config = EvolutionConfig {
            population_size: 4,
            parent_count: 5,
            ..EvolutionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooManyParents {
                parents: 5,
                population: 4,
            })
        );
    }

    #[test]
    fn test_rejects_elite_fraction_outside_half_open_range() {
        for value in [0.0, -0.5, 1.1, f64::NAN] {
            let config = EvolutionConfig {
                elite_fraction: value,
                ..EvolutionConfig::default()
            };
            assert!(
                matches!(
                    config.validate(),
                    Err(ConfigError::EliteFractionOutOfRange { .. })
                ),
                "elite fraction {value} must be rejected",
            );
        }
        let full = EvolutionConfig {
            elite_fraction: 1.0,
            ..EvolutionConfig::default()
        };
        assert_eq!(full.validate(), Ok(()), "a whole-population pool is legal");
    }

    #[test]
    fn test_rejects_zero_workers_and_zero_step_limit() {
        let no_workers = EvolutionConfig {
            worker_count: 0,
            ..EvolutionConfig::default()
        };
        assert_eq!(no_workers.validate(), Err(ConfigError::ZeroWorkers));

        let no_steps = EvolutionConfig {
            step_limit: 0,
            ..EvolutionConfig::default()
        };
        assert_eq!(no_steps.validate(), Err(ConfigError::ZeroStepLimit));
    }
}
