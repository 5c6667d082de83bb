//! Genetic algorithm for the N-Queens problem.
//!
//! A genome is a row-per-column placement: entry `i` holds the row
//! (`1..=N`) of the queen in column `i`. Fitness is the normalized share of
//! non-attacking queen pairs, so 1.0 is a solution.
//!
//! # Pipeline
//!
//! Each generation runs
//! [`ParentSelection`] → [`Recombination`] → [`Mutation`] →
//! [`FitnessEvaluator`] → [`SurvivalSelection`] → [`StagnationDetector`]
//! (→ [`genocide`]) → [`RateSchedule`].
//!
//! # Key Types
//!
//! - [`GaConfig`]: parameters and strategy choices, validated up front
//! - [`GaEngine`]: one run, steppable, with observer hooks
//! - [`GaRunner`]: one-call entry point
//! - [`GaResult`]: final population, best individual and histories
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Eiben & Smith (2015), *Introduction to Evolutionary Computing*

mod config;
pub mod fitness;
pub mod init;
pub mod mutation;
pub mod recombination;
mod runner;
pub mod sampling;
pub mod schedule;
mod selection;
pub mod stagnation;
mod survival;
pub mod termination;
pub mod types;

pub use config::{GaConfig, StrategyNames, MIN_GENOME_SIZE};
pub use fitness::{FitnessCache, FitnessEvaluator};
pub use init::Initialization;
pub use mutation::Mutation;
pub use recombination::Recombination;
pub use runner::{GaEngine, GaResult, GaRunner, GenerationStats, RunStatus};
pub use schedule::{RateSchedule, Rates};
pub use selection::{offspring_pairs, tournament_group_size, ParentSelection};
pub use stagnation::{genocide, genocide_survivors, StagnationDetector, StagnationMetric};
pub use survival::SurvivalSelection;
pub use termination::{
    EvaluationBudget, GenerationBudget, Termination, TerminationPolicy, TerminationState,
};
pub use types::{conflicts, score, Individual, Population};
