//! Survival selection: forming the next population from the current one
//! and the evaluated offspring.

use super::sampling::fitness_weighted_sample;
use super::types::{Individual, Population};
use crate::error::ConfigError;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Replacement policy. Both variants keep the population size unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SurvivalSelection {
    /// Sort ascending by fitness and overwrite the two weakest slots with
    /// the first two offspring. Further offspring are discarded.
    ReplaceWorst,

    /// Pool population and offspring, then draw P survivors without
    /// replacement with probability proportional to `fitness^k`.
    #[default]
    ProbSurvival,
}

impl SurvivalSelection {
    pub fn name(&self) -> &'static str {
        match self {
            SurvivalSelection::ReplaceWorst => "del_rep_2",
            SurvivalSelection::ProbSurvival => "prob_survival",
        }
    }

    /// Builds the next generation.
    ///
    /// `exponent` is the weighting exponent `k`, used by
    /// [`SurvivalSelection::ProbSurvival`] only.
    pub fn select<R: Rng>(
        &self,
        population: Population,
        offspring: Vec<Individual>,
        exponent: f64,
        rng: &mut R,
    ) -> Population {
        let size = population.len();
        let next = match self {
            SurvivalSelection::ReplaceWorst => replace_worst(population, offspring),
            SurvivalSelection::ProbSurvival => prob_survival(population, offspring, exponent, rng),
        };
        debug_assert_eq!(next.len(), size);
        next
    }
}

impl fmt::Display for SurvivalSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SurvivalSelection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "del_rep_2" => Ok(SurvivalSelection::ReplaceWorst),
            "prob_survival" => Ok(SurvivalSelection::ProbSurvival),
            other => Err(ConfigError::UnknownStrategy {
                role: "survival selection",
                name: other.to_string(),
            }),
        }
    }
}

/// Elitist replacement of the two lowest-fitness slots.
fn replace_worst(population: Population, offspring: Vec<Individual>) -> Population {
    let mut individuals = population.into_individuals();
    individuals.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));

    for (slot, child) in individuals.iter_mut().zip(offspring.into_iter().take(2)) {
        *slot = child;
    }
    Population::new(individuals)
}

/// Fitness-weighted resample of the combined pool.
fn prob_survival<R: Rng>(
    population: Population,
    offspring: Vec<Individual>,
    exponent: f64,
    rng: &mut R,
) -> Population {
    let size = population.len();
    let mut pool: Vec<Option<Individual>> = population
        .into_individuals()
        .into_iter()
        .chain(offspring)
        .map(Some)
        .collect();

    let fitness: Vec<f64> = pool
        .iter()
        .map(|ind| ind.as_ref().map_or(0.0, Individual::fitness))
        .collect();

    fitness_weighted_sample(&fitness, exponent, size, rng)
        .into_iter()
        .filter_map(|i| pool[i].take())
        .collect()
}
