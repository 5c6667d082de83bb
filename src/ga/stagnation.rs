//! Stagnation detection and genocide.
//!
//! The detector tracks a champion fitness and counts consecutive
//! generations without an improvement larger than `tolerance`. Once the
//! count reaches the limit, [`genocide`] replaces part of the population
//! with fresh random permutations, keeping a fitness-weighted sample of the
//! rest.

use super::fitness::FitnessEvaluator;
use super::init::random_permutation;
use super::sampling::fitness_weighted_sample;
use super::types::{Individual, Population};
use crate::error::ConfigError;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Which population statistic is fed to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StagnationMetric {
    /// Best fitness in the population.
    #[default]
    Best,
    /// Mean fitness of the population.
    Mean,
}

impl StagnationMetric {
    pub fn name(&self) -> &'static str {
        match self {
            StagnationMetric::Best => "max",
            StagnationMetric::Mean => "mean",
        }
    }

    /// The candidate value for `population`, or `None` if it is empty.
    pub fn measure(&self, population: &Population) -> Option<f64> {
        match self {
            StagnationMetric::Best => population.best_fitness(),
            StagnationMetric::Mean => population.mean_fitness(),
        }
    }
}

impl fmt::Display for StagnationMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StagnationMetric {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max" => Ok(StagnationMetric::Best),
            "mean" => Ok(StagnationMetric::Mean),
            other => Err(ConfigError::UnknownStrategy {
                role: "stagnation metric",
                name: other.to_string(),
            }),
        }
    }
}

/// Champion/counter state machine.
///
/// # Examples
///
/// ```
/// use queens_ga::ga::StagnationDetector;
///
/// let mut detector = StagnationDetector::new(2, 1e-2);
/// assert!(!detector.check(0.5)); // first value becomes champion
/// assert!(!detector.check(0.5)); // count = 1
/// assert!(detector.check(0.5)); // count = 2, stagnant
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StagnationDetector {
    champion: Option<f64>,
    stagnant_count: usize,
    max_stagnant: usize,
    tolerance: f64,
}

impl StagnationDetector {
    pub fn new(max_stagnant: usize, tolerance: f64) -> Self {
        Self {
            champion: None,
            stagnant_count: 0,
            max_stagnant,
            tolerance,
        }
    }

    /// Feeds one generation's candidate; returns `true` when stagnant.
    pub fn check(&mut self, candidate: f64) -> bool {
        match self.champion {
            None => {
                self.champion = Some(candidate);
                false
            }
            Some(champion) if candidate - champion > self.tolerance => {
                self.champion = Some(candidate);
                self.stagnant_count = 0;
                false
            }
            Some(_) => {
                self.stagnant_count += 1;
                self.stagnant_count >= self.max_stagnant
            }
        }
    }

    /// Clears the counter after a genocide; the champion is kept.
    pub fn reset_count(&mut self) {
        self.stagnant_count = 0;
    }

    /// Back to the run-start state.
    pub fn reset(&mut self) {
        self.champion = None;
        self.stagnant_count = 0;
    }

    pub fn champion(&self) -> Option<f64> {
        self.champion
    }

    pub fn stagnant_count(&self) -> usize {
        self.stagnant_count
    }
}

/// Number of survivors kept by a genocide: `round(P·(1-fraction))`.
pub fn genocide_survivors(population_size: usize, fraction: f64) -> usize {
    let keep = (population_size as f64 * (1.0 - fraction)).round();
    (keep.max(0.0) as usize).min(population_size)
}

/// Replaces `P - keep` individuals with fresh evaluated random permutations.
///
/// Survivors are drawn without replacement with weight `fitness^exponent`
/// and come first in the returned population.
pub fn genocide<R: Rng>(
    population: Population,
    fraction: f64,
    exponent: f64,
    evaluator: &mut FitnessEvaluator,
    rng: &mut R,
) -> Population {
    let size = population.len();
    let keep = genocide_survivors(size, fraction);

    let fitness = population.fitness_values();
    let mut slots: Vec<Option<Individual>> =
        population.into_individuals().into_iter().map(Some).collect();
    let mut next: Vec<Individual> = fitness_weighted_sample(&fitness, exponent, keep, rng)
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect();

    let genome_size = evaluator.genome_size();
    let fresh: Vec<Vec<usize>> = (0..size - next.len())
        .map(|_| random_permutation(genome_size, rng))
        .collect();
    next.extend(evaluator.evaluate_into(fresh));

    Population::new(next)
}
