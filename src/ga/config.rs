//! GA configuration.
//!
//! [`GaConfig`] holds every parameter of a run and the operator chosen for
//! each pluggable role. [`StrategyNames`] carries the same choices as plain
//! identifiers, e.g. when read from an experiment table.

use super::init::Initialization;
use super::mutation::Mutation;
use super::recombination::Recombination;
use super::schedule::{RateSchedule, Rates};
use super::selection::ParentSelection;
use super::stagnation::StagnationMetric;
use super::survival::SurvivalSelection;
use super::termination::Termination;
use crate::error::ConfigError;

/// Smallest board the interior-cut operators accept.
pub const MIN_GENOME_SIZE: usize = 4;

/// Configuration for the N-Queens genetic algorithm.
///
/// # Defaults
///
/// ```
/// use queens_ga::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.genome_size, 8);
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_evaluations, 10_000);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use queens_ga::ga::{GaConfig, Mutation, Recombination};
///
/// let config = GaConfig::default()
///     .with_genome_size(12)
///     .with_recombination(Recombination::Ox)
///     .with_mutation(Mutation::Swap)
///     .with_mutation_rate(0.2)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
///
/// Builders store values as given; [`GaConfig::validate`] rejects anything
/// out of range.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Board size N: genome length and value range `1..=N`.
    pub genome_size: usize,

    /// Number of individuals P.
    pub population_size: usize,

    /// Offspring per generation as a fraction of P; pairs = `round(rate·P/2)`.
    pub offspring_rate: f64,

    /// Share of P sampled per tournament.
    pub tournament_group_size: f64,

    /// Base probability of recombining a parent pair.
    pub recombination_rate: f64,

    /// Base probability of mutating an offspring.
    pub mutation_rate: f64,

    /// Consecutive non-improving generations that count as stagnation.
    pub max_stagnant_generations: usize,

    /// Improvement (absolute) needed to replace the champion.
    pub stagnation_tolerance: f64,

    /// Base share of the population replaced by a genocide.
    pub genocide_fraction: f64,

    /// Exponent `k` of the `fitness^k` selection weights.
    pub weight_exponent: f64,

    /// Evaluation budget for [`Termination::EvaluationCount`].
    pub max_evaluations: usize,

    /// Generation budget for [`Termination::IterationCount`].
    pub max_generations: usize,

    /// Fitness cache capacity; 0 disables the cache.
    pub fitness_cache_capacity: usize,

    /// Whether to evaluate batches in parallel (needs the `parallel` feature).
    pub parallel: bool,

    /// Random seed for reproducibility; `None` draws one from entropy.
    pub seed: Option<u64>,

    /// Whether stagnation triggers a genocide.
    pub genocide_enabled: bool,

    pub initialization: Initialization,
    pub parent_selection: ParentSelection,
    pub recombination: Recombination,
    pub mutation: Mutation,
    pub survival: SurvivalSelection,
    pub termination: Termination,
    pub schedule: RateSchedule,
    pub stagnation_metric: StagnationMetric,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            genome_size: 8,
            population_size: 100,
            offspring_rate: 0.2,
            tournament_group_size: 0.2,
            recombination_rate: 0.8,
            mutation_rate: 0.1,
            max_stagnant_generations: 5,
            stagnation_tolerance: 1e-2,
            genocide_fraction: 0.5,
            weight_exponent: 5.0,
            max_evaluations: 10_000,
            max_generations: 10_000,
            fitness_cache_capacity: 0,
            parallel: false,
            seed: None,
            genocide_enabled: true,
            initialization: Initialization::default(),
            parent_selection: ParentSelection::default(),
            recombination: Recombination::default(),
            mutation: Mutation::default(),
            survival: SurvivalSelection::default(),
            termination: Termination::default(),
            schedule: RateSchedule::default(),
            stagnation_metric: StagnationMetric::default(),
        }
    }
}

impl GaConfig {
    pub fn with_genome_size(mut self, n: usize) -> Self {
        self.genome_size = n;
        self
    }

    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_offspring_rate(mut self, rate: f64) -> Self {
        self.offspring_rate = rate;
        self
    }

    pub fn with_tournament_group_size(mut self, fraction: f64) -> Self {
        self.tournament_group_size = fraction;
        self
    }

    pub fn with_recombination_rate(mut self, rate: f64) -> Self {
        self.recombination_rate = rate;
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the stagnation limit and improvement tolerance.
    pub fn with_stagnation(mut self, max_generations: usize, tolerance: f64) -> Self {
        self.max_stagnant_generations = max_generations;
        self.stagnation_tolerance = tolerance;
        self
    }

    pub fn with_genocide_fraction(mut self, fraction: f64) -> Self {
        self.genocide_fraction = fraction;
        self
    }

    pub fn with_genocide_enabled(mut self, enabled: bool) -> Self {
        self.genocide_enabled = enabled;
        self
    }

    pub fn with_weight_exponent(mut self, k: f64) -> Self {
        self.weight_exponent = k;
        self
    }

    /// Sets the evaluation budget and selects [`Termination::EvaluationCount`].
    pub fn with_max_evaluations(mut self, n: usize) -> Self {
        self.max_evaluations = n;
        self.termination = Termination::EvaluationCount;
        self
    }

    /// Sets the generation budget and selects [`Termination::IterationCount`].
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self.termination = Termination::IterationCount;
        self
    }

    pub fn with_fitness_cache(mut self, capacity: usize) -> Self {
        self.fitness_cache_capacity = capacity;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_initialization(mut self, init: Initialization) -> Self {
        self.initialization = init;
        self
    }

    pub fn with_parent_selection(mut self, selection: ParentSelection) -> Self {
        self.parent_selection = selection;
        self
    }

    pub fn with_recombination(mut self, op: Recombination) -> Self {
        self.recombination = op;
        self
    }

    pub fn with_mutation(mut self, op: Mutation) -> Self {
        self.mutation = op;
        self
    }

    pub fn with_survival(mut self, survival: SurvivalSelection) -> Self {
        self.survival = survival;
        self
    }

    /// Selects the termination policy.
    ///
    /// [`with_max_evaluations`](Self::with_max_evaluations) and
    /// [`with_max_generations`](Self::with_max_generations) also select a
    /// policy, so a later call to either overrides this one.
    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    pub fn with_schedule(mut self, schedule: RateSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_stagnation_metric(mut self, metric: StagnationMetric) -> Self {
        self.stagnation_metric = metric;
        self
    }

    /// Replaces every strategy from its identifier.
    ///
    /// Fails on the first unknown identifier; `self` is consumed either way.
    pub fn with_strategy_names(mut self, names: &StrategyNames) -> Result<Self, ConfigError> {
        self.initialization = names.initialization.parse()?;
        self.parent_selection = names.parent_selection.parse()?;
        self.recombination = names.recombination.parse()?;
        self.mutation = names.mutation.parse()?;
        self.survival = names.survival.parse()?;
        self.termination = names.termination.parse()?;
        self.schedule = match (names.schedule.parse::<RateSchedule>()?, self.schedule) {
            // keep a custom exponent when the kind does not change
            (RateSchedule::Dynamic { .. }, current @ RateSchedule::Dynamic { .. }) => current,
            (parsed, _) => parsed,
        };
        self.stagnation_metric = names.stagnation_metric.parse()?;
        Ok(self)
    }

    /// Identifiers of the configured strategies.
    pub fn strategy_names(&self) -> StrategyNames {
        StrategyNames {
            initialization: self.initialization.name().to_string(),
            parent_selection: self.parent_selection.name().to_string(),
            recombination: self.recombination.name().to_string(),
            mutation: self.mutation.name().to_string(),
            survival: self.survival.name().to_string(),
            termination: self.termination.name().to_string(),
            schedule: self.schedule.name().to_string(),
            stagnation_metric: self.stagnation_metric.name().to_string(),
        }
    }

    /// Base rates before scheduling.
    pub fn base_rates(&self) -> Rates {
        Rates {
            recombination: self.recombination_rate,
            mutation: self.mutation_rate,
            genocide_fraction: self.genocide_fraction,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.genome_size < MIN_GENOME_SIZE {
            return Err(ConfigError::out_of_range(
                "genome_size",
                self.genome_size as f64,
                ">= 4",
            ));
        }
        if self.population_size < 2 {
            return Err(ConfigError::out_of_range(
                "population_size",
                self.population_size as f64,
                ">= 2",
            ));
        }

        let unit = [
            ("offspring_rate", self.offspring_rate),
            ("recombination_rate", self.recombination_rate),
            ("mutation_rate", self.mutation_rate),
            ("genocide_fraction", self.genocide_fraction),
        ];
        for (field, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::out_of_range(field, value, "0.0..=1.0"));
            }
        }

        if !(self.tournament_group_size > 0.0 && self.tournament_group_size <= 1.0) {
            return Err(ConfigError::out_of_range(
                "tournament_group_size",
                self.tournament_group_size,
                "(0.0, 1.0]",
            ));
        }
        if self.max_stagnant_generations == 0 {
            return Err(ConfigError::out_of_range(
                "max_stagnant_generations",
                0.0,
                ">= 1",
            ));
        }
        if !(self.stagnation_tolerance >= 0.0 && self.stagnation_tolerance.is_finite()) {
            return Err(ConfigError::out_of_range(
                "stagnation_tolerance",
                self.stagnation_tolerance,
                "finite, >= 0",
            ));
        }
        if !(self.weight_exponent >= 0.0 && self.weight_exponent.is_finite()) {
            return Err(ConfigError::out_of_range(
                "weight_exponent",
                self.weight_exponent,
                "finite, >= 0",
            ));
        }
        if let RateSchedule::Dynamic { exponent } = self.schedule {
            if !(exponent > 0.0 && exponent.is_finite()) {
                return Err(ConfigError::out_of_range(
                    "schedule exponent",
                    exponent,
                    "finite, > 0",
                ));
            }
        }
        match self.termination {
            Termination::EvaluationCount if self.max_evaluations == 0 => {
                Err(ConfigError::out_of_range("max_evaluations", 0.0, ">= 1"))
            }
            Termination::IterationCount if self.max_generations == 0 => {
                Err(ConfigError::out_of_range("max_generations", 0.0, ">= 1"))
            }
            _ => Ok(()),
        }
    }
}

/// Strategy identifiers, one per pluggable role.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrategyNames {
    pub initialization: String,
    pub parent_selection: String,
    pub recombination: String,
    pub mutation: String,
    pub survival: String,
    pub termination: String,
    pub schedule: String,
    pub stagnation_metric: String,
}

impl Default for StrategyNames {
    fn default() -> Self {
        GaConfig::default().strategy_names()
    }
}
