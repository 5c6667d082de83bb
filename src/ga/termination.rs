//! Termination policies.
//!
//! A policy sees the run counters and budgets after every generation.
//! A found solution always ends the run, whatever the policy says.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Counters and budgets handed to a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerminationState {
    /// Fitness evaluations counted so far.
    pub evaluations: usize,
    pub max_evaluations: usize,
    /// Completed generations.
    pub generation: usize,
    pub max_generations: usize,
    /// Whether the population holds a conflict-free board.
    pub solved: bool,
}

/// Decides when the generational loop stops.
///
/// Implemented for the built-in [`Termination`] variants, for
/// [`EvaluationBudget`] and [`GenerationBudget`], and for any
/// `Fn(&TerminationState) -> bool` closure.
pub trait TerminationPolicy {
    /// Whether the run should stop now.
    fn should_terminate(&self, state: &TerminationState) -> bool;

    /// Why the run stopped, for logs.
    fn reason(&self) -> &'static str {
        "termination policy satisfied"
    }
}

impl<F> TerminationPolicy for F
where
    F: Fn(&TerminationState) -> bool,
{
    fn should_terminate(&self, state: &TerminationState) -> bool {
        self(state)
    }
}

/// Stop once the evaluation counter reaches the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationBudget;

impl TerminationPolicy for EvaluationBudget {
    fn should_terminate(&self, state: &TerminationState) -> bool {
        state.solved || state.evaluations >= state.max_evaluations
    }

    fn reason(&self) -> &'static str {
        "evaluation budget exhausted"
    }
}

/// Stop once the generation counter reaches the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationBudget;

impl TerminationPolicy for GenerationBudget {
    fn should_terminate(&self, state: &TerminationState) -> bool {
        state.solved || state.generation >= state.max_generations
    }

    fn reason(&self) -> &'static str {
        "generation budget exhausted"
    }
}

/// Configurable termination identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    #[default]
    EvaluationCount,
    IterationCount,
}

impl Termination {
    pub fn name(&self) -> &'static str {
        match self {
            Termination::EvaluationCount => "evaluation_count",
            Termination::IterationCount => "iteration_count",
        }
    }
}

impl TerminationPolicy for Termination {
    fn should_terminate(&self, state: &TerminationState) -> bool {
        match self {
            Termination::EvaluationCount => EvaluationBudget.should_terminate(state),
            Termination::IterationCount => GenerationBudget.should_terminate(state),
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Termination::EvaluationCount => EvaluationBudget.reason(),
            Termination::IterationCount => GenerationBudget.reason(),
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Termination {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "evaluation_count" => Ok(Termination::EvaluationCount),
            "iteration_count" => Ok(Termination::IterationCount),
            other => Err(ConfigError::UnknownStrategy {
                role: "termination",
                name: other.to_string(),
            }),
        }
    }
}
