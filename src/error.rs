//! Error types for the GA engine.
//!
//! Configuration problems are reported before any generation runs.
//! Invariant violations describe operator contract defects and are asserted
//! in debug builds rather than recovered from at runtime.

use thiserror::Error;

/// Invalid or unsupported configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// An identifier that names no known strategy for the given role.
    #[error("unknown {role} strategy `{name}`")]
    UnknownStrategy {
        /// Pluggable role, e.g. "recombination".
        role: &'static str,
        /// The rejected identifier.
        name: String,
    },

    /// A numeric parameter outside its accepted range.
    #[error("{field} = {value} is out of range (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn out_of_range(field: &'static str, value: f64, expected: &'static str) -> Self {
        Self::OutOfRange {
            field,
            value,
            expected,
        }
    }
}

/// A genome that breaks the representation contract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("genome length {actual} differs from genome size {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("gene value {value} at position {position} is outside 1..={genome_size}")]
    ValueOutOfRange {
        position: usize,
        value: usize,
        genome_size: usize,
    },

    #[error("genome is not a permutation of 1..={genome_size}: value {value} repeats")]
    NotAPermutation { value: usize, genome_size: usize },
}

/// Top-level error type for engine construction and seeded runs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GaError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("empty population")]
    EmptyPopulation,

    #[error("seeded population has {actual} individuals, configuration expects {expected}")]
    PopulationSizeMismatch { expected: usize, actual: usize },
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, GaError>;
