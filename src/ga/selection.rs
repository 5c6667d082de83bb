//! Parent selection.
//!
//! A tournament samples a fraction of the population, ranks the sample by
//! fitness and returns its two best members as a parent pair.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Miller & Goldberg (1995), "Genetic Algorithms, Tournament Selection,
//!   and the Effects of Noise"

use super::types::Population;
use crate::error::ConfigError;
use rand::seq::index;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Parent selection strategy.
///
/// All strategies assume **maximization** (higher fitness = better).
///
/// # Examples
///
/// ```
/// use queens_ga::ga::ParentSelection;
///
/// let sel: ParentSelection = "tournament".parse().unwrap();
/// assert_eq!(sel, ParentSelection::Tournament);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParentSelection {
    /// Tournament selection over a sampled group.
    ///
    /// The group is drawn **without replacement**, so a pair never holds
    /// the same slot twice. Larger groups mean stronger selection pressure.
    ///
    /// # Complexity
    /// O(k log k) per pair for a group of size k
    #[default]
    Tournament,
}

impl ParentSelection {
    pub fn name(&self) -> &'static str {
        match self {
            ParentSelection::Tournament => "tournament",
        }
    }

    /// Selects `offspring_pairs(P, offspring_rate)` parent pairs.
    ///
    /// `group_fraction` is the share of the population sampled per
    /// tournament; the resulting group holds at least two individuals.
    /// Returns indices into `population`. A population with fewer than two
    /// individuals yields no pairs.
    pub fn select_pairs<R: Rng>(
        &self,
        population: &Population,
        offspring_rate: f64,
        group_fraction: f64,
        rng: &mut R,
    ) -> Vec<(usize, usize)> {
        let n = population.len();
        if n < 2 {
            return Vec::new();
        }
        let pairs = offspring_pairs(n, offspring_rate);
        let group = tournament_group_size(n, group_fraction);

        match self {
            ParentSelection::Tournament => (0..pairs)
                .map(|_| tournament_pair(population, group, rng))
                .collect(),
        }
    }
}

impl fmt::Display for ParentSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParentSelection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tournament" => Ok(ParentSelection::Tournament),
            other => Err(ConfigError::UnknownStrategy {
                role: "parent selection",
                name: other.to_string(),
            }),
        }
    }
}

/// Number of parent pairs produced per generation: `round(rate·P/2)`.
pub fn offspring_pairs(population_size: usize, offspring_rate: f64) -> usize {
    (offspring_rate * population_size as f64 / 2.0).round() as usize
}

/// Tournament group size `floor(P·fraction)`, clamped to `[2, P]`.
pub fn tournament_group_size(population_size: usize, fraction: f64) -> usize {
    let k = (population_size as f64 * fraction).floor() as usize;
    k.clamp(2, population_size.max(2))
}

/// One tournament: sample `group` slots, return the two fittest (stable on ties).
fn tournament_pair<R: Rng>(population: &Population, group: usize, rng: &mut R) -> (usize, usize) {
    let mut contestants = index::sample(rng, population.len(), group).into_vec();
    contestants.sort_by(|&a, &b| population[b].fitness().total_cmp(&population[a].fitness()));
    (contestants[0], contestants[1])
}

// ============================================================================
// Tests
// ============================================================================
