//! Population initialization.

use crate::error::ConfigError;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// How the initial genomes are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Initialization {
    /// Each gene drawn independently and uniformly from `1..=N`.
    /// Same-row conflicts are possible.
    Random,

    /// Each genome an independent random permutation of `1..=N`.
    #[default]
    RandomPermutation,
}

impl Initialization {
    /// Legacy identifier for this strategy.
    pub fn name(&self) -> &'static str {
        match self {
            Initialization::Random => "random",
            Initialization::RandomPermutation => "random_permutations",
        }
    }

    /// Whether every generated genome is a permutation.
    pub fn yields_permutations(&self) -> bool {
        matches!(self, Initialization::RandomPermutation)
    }

    /// Generates `count` genomes of length `genome_size`.
    pub fn generate<R: Rng>(&self, genome_size: usize, count: usize, rng: &mut R) -> Vec<Vec<usize>> {
        (0..count)
            .map(|_| match self {
                Initialization::Random => random_genome(genome_size, rng),
                Initialization::RandomPermutation => random_permutation(genome_size, rng),
            })
            .collect()
    }
}

impl fmt::Display for Initialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Initialization {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(Initialization::Random),
            "random_permutations" => Ok(Initialization::RandomPermutation),
            other => Err(ConfigError::UnknownStrategy {
                role: "initialization",
                name: other.to_string(),
            }),
        }
    }
}

/// Uniform random genome; values may repeat.
pub fn random_genome<R: Rng>(genome_size: usize, rng: &mut R) -> Vec<usize> {
    (0..genome_size)
        .map(|_| rng.random_range(1..=genome_size))
        .collect()
}

/// Random permutation of `1..=genome_size`.
pub fn random_permutation<R: Rng>(genome_size: usize, rng: &mut R) -> Vec<usize> {
    let mut genes: Vec<usize> = (1..=genome_size).collect();
    genes.shuffle(rng);
    genes
}
