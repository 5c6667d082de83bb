//! Generational loop.
//!
//! [`GaEngine`] owns one run: population, RNG, stagnation state, rates and
//! counters. Each [`GaEngine::step`] performs
//! parent selection → recombination → mutation → evaluation → survival →
//! stagnation check → (genocide) → rate update.
//!
//! [`GaRunner`] is the one-call entry point.

use super::config::{GaConfig, StrategyNames};
use super::fitness::FitnessEvaluator;
use super::schedule::Rates;
use super::stagnation::{genocide, StagnationDetector};
use super::termination::{TerminationPolicy, TerminationState};
use super::types::{check_genome, is_permutation, Individual, Population};
use crate::error::{EngineResult, GaError};
use crate::random::rng_from;
use log::{debug, info};
use rand::rngs::StdRng;
use std::fmt;

/// Lifecycle of a run. `Solved` and `BudgetExhausted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunStatus {
    Init,
    Running,
    Solved,
    BudgetExhausted,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Solved | RunStatus::BudgetExhausted)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunStatus::Init => "init",
            RunStatus::Running => "running",
            RunStatus::Solved => "solved",
            RunStatus::BudgetExhausted => "budget exhausted",
        })
    }
}

/// Summary of one generation, passed to observers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    /// Zero-based index of the generation that just ran.
    pub generation: usize,
    /// Evaluations counted after this generation.
    pub evaluations: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub min_fitness: f64,
    /// Rates this generation ran with.
    pub rates: Rates,
    /// Number of offspring produced.
    pub offspring: usize,
    /// Whether a genocide replaced part of the population.
    pub genocide: bool,
    /// Individuals repeating an earlier genome, after survival and genocide.
    pub duplicates: usize,
    /// Mean gene agreement of the offspring with a random half of the
    /// parent population. `None` when no offspring were produced.
    pub offspring_similarity: Option<f64>,
    /// Whether the population now holds a solution.
    pub solved: bool,
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaResult {
    /// Best individual seen during the run.
    pub best: Individual,

    /// Same as `best.fitness()`.
    pub best_fitness: f64,

    /// `Solved` or `BudgetExhausted`.
    pub status: RunStatus,

    /// Generations executed.
    pub generations: usize,

    /// Evaluations counted (initial population excluded).
    pub evaluations: usize,

    /// Final population.
    pub population: Population,

    /// Population best fitness: initial value, then one entry per generation.
    pub fitness_history: Vec<f64>,

    /// Population mean fitness, same layout as `fitness_history`.
    pub mean_history: Vec<f64>,

    /// Zero-based generations at which a genocide fired.
    pub genocide_generations: Vec<usize>,

    /// Identifiers of the strategies used.
    pub strategies: StrategyNames,
}

impl GaResult {
    pub fn is_solved(&self) -> bool {
        self.status == RunStatus::Solved
    }
}

/// A single GA run that can be stepped or driven to termination.
///
/// # Usage
///
/// ```
/// use queens_ga::ga::{GaConfig, GaEngine};
///
/// let config = GaConfig::default().with_genome_size(6).with_seed(7);
/// let mut engine = GaEngine::new(config).unwrap();
/// let stats = engine.step();
/// assert_eq!(stats.generation, 0);
/// assert_eq!(engine.generation(), 1);
/// ```
#[derive(Debug)]
pub struct GaEngine {
    config: GaConfig,
    rng: StdRng,
    evaluator: FitnessEvaluator,
    population: Population,
    detector: StagnationDetector,
    rates: Rates,
    generation: usize,
    evaluations: usize,
    status: RunStatus,
    best: Individual,
    fitness_history: Vec<f64>,
    mean_history: Vec<f64>,
    genocide_generations: Vec<usize>,
}

impl GaEngine {
    /// Validates `config` and creates an evaluated initial population.
    pub fn new(config: GaConfig) -> EngineResult<Self> {
        config.validate()?;
        let mut rng = rng_from(config.seed);
        let genomes =
            config
                .initialization
                .generate(config.genome_size, config.population_size, &mut rng);
        debug_assert!(
            !config.initialization.yields_permutations()
                || genomes.iter().all(|g| is_permutation(g, config.genome_size))
        );
        Self::build(config, rng, genomes)
    }

    /// Starts from the given genomes instead of a random population.
    ///
    /// Each genome must have length `genome_size` and values in
    /// `1..=genome_size`; their count must equal `population_size`.
    pub fn with_population(config: GaConfig, genomes: Vec<Vec<usize>>) -> EngineResult<Self> {
        config.validate()?;
        if genomes.is_empty() {
            return Err(GaError::EmptyPopulation);
        }
        if genomes.len() != config.population_size {
            return Err(GaError::PopulationSizeMismatch {
                expected: config.population_size,
                actual: genomes.len(),
            });
        }
        for genes in &genomes {
            check_genome(genes, config.genome_size)?;
        }
        let rng = rng_from(config.seed);
        Self::build(config, rng, genomes)
    }

    fn build(config: GaConfig, rng: StdRng, genomes: Vec<Vec<usize>>) -> EngineResult<Self> {
        let mut evaluator = FitnessEvaluator::new(config.genome_size)
            .with_cache(config.fitness_cache_capacity)
            .with_parallel(config.parallel);
        let population = Population::new(evaluator.evaluate_into(genomes));
        let best = population.best().cloned().ok_or(GaError::EmptyPopulation)?;

        let mean = population.mean_fitness().unwrap_or(0.0);
        let rates = config
            .schedule
            .rates(0, config.genome_size, config.base_rates());
        let detector =
            StagnationDetector::new(config.max_stagnant_generations, config.stagnation_tolerance);

        Ok(Self {
            fitness_history: vec![best.fitness()],
            mean_history: vec![mean],
            config,
            rng,
            evaluator,
            population,
            detector,
            rates,
            generation: 0,
            evaluations: 0,
            status: RunStatus::Init,
            best,
            genocide_generations: Vec::new(),
        })
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Generations completed so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Rates the next generation will run with.
    pub fn rates(&self) -> Rates {
        self.rates
    }

    pub fn detector(&self) -> &StagnationDetector {
        &self.detector
    }

    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    pub fn best(&self) -> &Individual {
        &self.best
    }

    /// Whether the current population holds a conflict-free board.
    pub fn is_solved(&self) -> bool {
        self.population.best().is_some_and(Individual::is_solution)
    }

    /// Counters and budgets as seen by a termination policy.
    pub fn termination_state(&self) -> TerminationState {
        TerminationState {
            evaluations: self.evaluations,
            max_evaluations: self.config.max_evaluations,
            generation: self.generation,
            max_generations: self.config.max_generations,
            solved: self.is_solved(),
        }
    }

    /// Runs one generation.
    pub fn step(&mut self) -> GenerationStats {
        if self.status == RunStatus::Init {
            self.status = RunStatus::Running;
        }
        let rates = self.rates;
        let population_size = self.population.len();

        // 1. Parent selection
        let pairs = self.config.parent_selection.select_pairs(
            &self.population,
            self.config.offspring_rate,
            self.config.tournament_group_size,
            &mut self.rng,
        );

        // 2. Recombination
        let mut offspring = self.config.recombination.recombine(
            &self.population,
            &pairs,
            rates.recombination,
            &mut self.rng,
        );

        // 3. Mutation
        self.config
            .mutation
            .apply(&mut offspring, rates.mutation, &mut self.rng);
        debug_assert!(offspring
            .iter()
            .all(|g| check_genome(g, self.config.genome_size).is_ok()));

        let offspring_similarity = self
            .population
            .offspring_similarity(&offspring, &mut self.rng);

        // 4. Evaluation
        let offspring_count = offspring.len();
        let offspring = self.evaluator.evaluate_into(offspring);

        // 5. Survival
        let current = std::mem::take(&mut self.population);
        self.population = self.config.survival.select(
            current,
            offspring,
            self.config.weight_exponent,
            &mut self.rng,
        );
        self.evaluations += offspring_count + population_size;

        // 6. Stagnation and genocide
        let solved = self.is_solved();
        let mut genocide_fired = false;
        if !solved {
            let candidate = self
                .config
                .stagnation_metric
                .measure(&self.population)
                .unwrap_or(0.0);
            if self.detector.check(candidate) {
                if self.config.genocide_enabled {
                    let before = self.population.duplicate_count();
                    let current = std::mem::take(&mut self.population);
                    self.population = genocide(
                        current,
                        rates.genocide_fraction,
                        self.config.weight_exponent,
                        &mut self.evaluator,
                        &mut self.rng,
                    );
                    genocide_fired = true;
                    self.genocide_generations.push(self.generation);
                    debug!(
                        "generation {}: genocide (fraction {:.3}), duplicates {} -> {}",
                        self.generation,
                        rates.genocide_fraction,
                        before,
                        self.population.duplicate_count()
                    );
                }
                self.detector.reset_count();
            }
        }
        // Fresh genocide genomes can themselves be solutions.
        let solved = solved || self.is_solved();

        // 7. Bookkeeping and next-generation rates
        let best_fitness = self.population.best_fitness().unwrap_or(0.0);
        let mean_fitness = self.population.mean_fitness().unwrap_or(0.0);
        if let Some(best) = self.population.best() {
            if best.fitness() > self.best.fitness() {
                self.best = best.clone();
            }
        }
        self.fitness_history.push(best_fitness);
        self.mean_history.push(mean_fitness);

        let stats = GenerationStats {
            generation: self.generation,
            evaluations: self.evaluations,
            best_fitness,
            mean_fitness,
            min_fitness: self.population.min_fitness().unwrap_or(0.0),
            rates,
            offspring: offspring_count,
            genocide: genocide_fired,
            duplicates: self.population.duplicate_count(),
            offspring_similarity,
            solved,
        };

        self.generation += 1;
        self.rates =
            self.config
                .schedule
                .rates(self.generation, self.config.genome_size, self.config.base_rates());
        if solved {
            self.status = RunStatus::Solved;
        }

        debug!(
            "generation {}: best {:.4}, mean {:.4}, evaluations {}, offspring similarity {:.3}",
            stats.generation,
            stats.best_fitness,
            stats.mean_fitness,
            stats.evaluations,
            stats.offspring_similarity.unwrap_or(0.0)
        );
        stats
    }

    /// Runs until solved or until the configured budget is spent.
    pub fn run(self) -> GaResult {
        self.run_with_observer(|_| {})
    }

    /// Like [`run`](Self::run), calling `observer` after every generation.
    pub fn run_with_observer<F>(self, observer: F) -> GaResult
    where
        F: FnMut(&GenerationStats),
    {
        let policy = self.config.termination;
        self.run_with_termination(&policy, observer)
    }

    /// Runs under a custom termination policy. A solution always stops the
    /// run, whatever the policy reports.
    pub fn run_with_termination<T, F>(mut self, policy: &T, mut observer: F) -> GaResult
    where
        T: TerminationPolicy + ?Sized,
        F: FnMut(&GenerationStats),
    {
        info!(
            "GA run: N={}, P={}, {} / {} / {} / {} / {}, schedule {}, termination {}",
            self.config.genome_size,
            self.config.population_size,
            self.config.initialization,
            self.config.parent_selection,
            self.config.recombination,
            self.config.mutation,
            self.config.survival,
            self.config.schedule,
            self.config.termination,
        );

        self.status = RunStatus::Running;
        loop {
            let state = self.termination_state();
            if state.solved {
                self.status = RunStatus::Solved;
                break;
            }
            if policy.should_terminate(&state) {
                self.status = RunStatus::BudgetExhausted;
                debug!("{}", policy.reason());
                break;
            }
            let stats = self.step();
            observer(&stats);
        }

        info!(
            "GA finished: {} after {} generations, {} evaluations, best fitness {:.4} ({} conflicts)",
            self.status,
            self.generation,
            self.evaluations,
            self.best.fitness(),
            self.best.conflicts()
        );
        self.into_result()
    }

    /// Consumes the engine into its result without running further.
    pub fn into_result(self) -> GaResult {
        let strategies = self.config.strategy_names();
        let status = match self.status {
            s if s.is_terminal() => s,
            _ if self.is_solved() => RunStatus::Solved,
            _ => RunStatus::BudgetExhausted,
        };
        GaResult {
            best_fitness: self.best.fitness(),
            best: self.best,
            status,
            generations: self.generation,
            evaluations: self.evaluations,
            population: self.population,
            fitness_history: self.fitness_history,
            mean_history: self.mean_history,
            genocide_generations: self.genocide_generations,
            strategies,
        }
    }
}

/// One-call entry points.
///
/// ```
/// use queens_ga::ga::{GaConfig, GaRunner};
///
/// let config = GaConfig::default().with_seed(42);
/// let result = GaRunner::run(&config).unwrap();
/// assert!(result.is_solved() || result.evaluations >= config.max_evaluations);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA from a random initial population.
    pub fn run(config: &GaConfig) -> EngineResult<GaResult> {
        Ok(GaEngine::new(config.clone())?.run())
    }

    /// Runs the GA from a supplied initial population.
    pub fn run_with_population(
        config: &GaConfig,
        genomes: Vec<Vec<usize>>,
    ) -> EngineResult<GaResult> {
        Ok(GaEngine::with_population(config.clone(), genomes)?.run())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, InvariantViolation};
    use crate::ga::schedule::RateSchedule;
    use crate::ga::survival::SurvivalSelection;
    use crate::ga::termination::Termination;

    fn identity(n: usize) -> Vec<usize> {
        (1..=n).collect()
    }

    #[test]
    fn test_default_run_terminates() {
        let config = GaConfig::default().with_seed(42);
        let result = GaRunner::run(&config).unwrap();
        match result.status {
            RunStatus::Solved => {
                assert_eq!(result.best.conflicts(), 0);
                assert_eq!(result.best_fitness, 1.0);
            }
            RunStatus::BudgetExhausted => assert!(result.evaluations >= 10_000),
            other => panic!("non-terminal status {other:?}"),
        }
        assert_eq!(result.fitness_history.len(), result.generations + 1);
        assert_eq!(result.population.len(), 100);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = GaConfig::default().with_genome_size(2);
        assert!(matches!(
            GaEngine::new(config),
            Err(GaError::Config(ConfigError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_evaluation_accounting() {
        // P = 20, offspring pairs = round(0.2 * 20 / 2) = 2 -> 4 offspring
        let config = GaConfig::default()
            .with_genome_size(10)
            .with_population_size(20)
            .with_seed(3);
        let mut engine = GaEngine::new(config).unwrap();
        assert_eq!(engine.evaluations(), 0);
        let stats = engine.step();
        assert_eq!(stats.offspring, 4);
        assert_eq!(engine.evaluations(), 24);
        engine.step();
        assert_eq!(engine.evaluations(), 48);
    }

    #[test]
    fn test_generation_budget() {
        let config = GaConfig::default()
            .with_genome_size(30)
            .with_population_size(20)
            .with_max_generations(7)
            .with_seed(1);
        let result = GaRunner::run(&config).unwrap();
        if !result.is_solved() {
            assert_eq!(result.generations, 7);
            assert_eq!(result.status, RunStatus::BudgetExhausted);
        }
    }

    #[test]
    fn test_seeded_solution_stops_immediately() {
        let solution = vec![2, 4, 1, 3];
        let mut genomes = vec![identity(4); 9];
        genomes.push(solution.clone());
        let config = GaConfig::default()
            .with_genome_size(4)
            .with_population_size(10)
            .with_seed(5);
        let result = GaRunner::run_with_population(&config, genomes).unwrap();
        assert_eq!(result.status, RunStatus::Solved);
        assert_eq!(result.generations, 0);
        assert_eq!(result.evaluations, 0);
        assert_eq!(result.best.genes(), solution.as_slice());
    }

    #[test]
    fn test_seeded_population_validation() {
        let config = GaConfig::default().with_genome_size(4).with_population_size(2);
        assert_eq!(
            GaEngine::with_population(config.clone(), vec![]).unwrap_err(),
            GaError::EmptyPopulation
        );
        assert_eq!(
            GaEngine::with_population(config.clone(), vec![identity(4)]).unwrap_err(),
            GaError::PopulationSizeMismatch {
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(
            GaEngine::with_population(config, vec![identity(4), vec![1, 2, 3]]).unwrap_err(),
            GaError::Invariant(InvariantViolation::LengthMismatch {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn test_observer_sees_every_generation() {
        let config = GaConfig::default()
            .with_genome_size(20)
            .with_population_size(30)
            .with_max_generations(12)
            .with_seed(9);
        let mut seen = Vec::new();
        let result = GaEngine::new(config)
            .unwrap()
            .run_with_observer(|s| seen.push(s.generation));
        assert_eq!(seen, (0..result.generations).collect::<Vec<_>>());
    }

    #[test]
    fn test_custom_termination_policy() {
        let config = GaConfig::default()
            .with_genome_size(24)
            .with_population_size(20)
            .with_seed(11);
        let stop_at_three = |s: &TerminationState| s.generation >= 3;
        let result = GaEngine::new(config)
            .unwrap()
            .run_with_termination(&stop_at_three, |_| {});
        assert!(result.generations <= 3);
        if !result.is_solved() {
            assert_eq!(result.generations, 3);
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let config = GaConfig::default()
            .with_genome_size(10)
            .with_max_generations(20)
            .with_seed(123);
        let a = GaRunner::run(&config).unwrap();
        let b = GaRunner::run(&config).unwrap();
        assert_eq!(a.fitness_history, b.fitness_history);
        assert_eq!(a.population, b.population);
    }

    #[test]
    fn test_genocide_on_frozen_population() {
        let config = GaConfig::default()
            .with_genome_size(8)
            .with_population_size(100)
            .with_recombination_rate(0.0)
            .with_mutation_rate(0.0)
            .with_survival(SurvivalSelection::ReplaceWorst)
            .with_schedule(RateSchedule::Static)
            .with_stagnation(3, 1e-2)
            .with_max_generations(4)
            .with_seed(42);
        let mut engine = GaEngine::with_population(config, vec![identity(8); 100]).unwrap();

        for g in 0..3 {
            let stats = engine.step();
            assert!(!stats.genocide, "no genocide before the limit (generation {g})");
            assert_eq!(stats.duplicates, 99);
        }
        let stats = engine.step();
        assert!(stats.genocide);
        assert!(stats.duplicates < 99);
        assert_eq!(engine.detector().stagnant_count(), 0);
    }

    #[test]
    fn test_solution_from_genocide_is_reported() {
        let config = GaConfig::default()
            .with_genome_size(4)
            .with_population_size(10)
            .with_recombination_rate(0.0)
            .with_mutation_rate(0.0)
            .with_stagnation(1, 1e-2)
            .with_max_generations(50);

        let mut genocide_seen = false;
        for seed in 0..20 {
            let mut engine = GaEngine::with_population(
                config.clone().with_seed(seed),
                vec![identity(4); 10],
            )
            .unwrap();
            while !engine.status().is_terminal() && engine.generation() < 50 {
                let stats = engine.step();
                genocide_seen |= stats.genocide;
                if stats.best_fitness == 1.0 {
                    assert!(stats.solved, "seed {seed}: solution at generation {}", stats.generation);
                    assert_eq!(engine.status(), RunStatus::Solved);
                }
            }
        }
        assert!(genocide_seen);
    }

    #[test]
    fn test_offspring_similarity_on_frozen_population() {
        let config = GaConfig::default()
            .with_recombination_rate(0.0)
            .with_mutation_rate(0.0)
            .with_max_generations(2)
            .with_seed(3);
        let mut engine = GaEngine::with_population(config, vec![identity(8); 100]).unwrap();
        let stats = engine.step();
        assert!(stats.offspring > 0);
        assert_eq!(stats.offspring_similarity, Some(1.0));
    }

    #[test]
    fn test_genocide_disabled() {
        let config = GaConfig::default()
            .with_recombination_rate(0.0)
            .with_mutation_rate(0.0)
            .with_survival(SurvivalSelection::ReplaceWorst)
            .with_stagnation(2, 1e-2)
            .with_genocide_enabled(false)
            .with_max_generations(10)
            .with_seed(42);
        let result = GaRunner::run_with_population(&config, vec![identity(8); 100]).unwrap();
        assert!(result.genocide_generations.is_empty());
        assert_eq!(result.population.duplicate_count(), 99);
    }

    #[test]
    fn test_rates_follow_schedule() {
        let config = GaConfig::default().with_genome_size(8).with_seed(1);
        let mut engine = GaEngine::new(config).unwrap();
        assert!((engine.rates().recombination - 0.8).abs() < 1e-12);
        engine.step();
        let expected = RateSchedule::default().rates(1, 8, engine.config().base_rates());
        assert_eq!(engine.rates(), expected);
    }

    #[test]
    fn test_result_carries_strategy_names() {
        let config = GaConfig::default()
            .with_termination(Termination::IterationCount)
            .with_max_generations(2)
            .with_seed(2);
        let result = GaRunner::run(&config).unwrap();
        assert_eq!(result.strategies, config.strategy_names());
    }
}
