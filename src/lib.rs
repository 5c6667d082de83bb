//! Generational genetic algorithm for the N-Queens placement problem.
//!
//! Provides a pluggable evolutionary pipeline:
//!
//! - **Initialization**: uniform random genomes or random permutations.
//! - **Parent selection**: tournament over a sampled share of the population.
//! - **Recombination**: cut-based crossovers, PMX, OX and a repaired PMX.
//! - **Mutation**: swap, inversion, creep, scramble and duplicate replacement.
//! - **Survival**: replace-worst-two or fitness-weighted resampling.
//! - **Diversity recovery**: stagnation detection that triggers a partial
//!   population reset ("genocide").
//! - **Rate schedule**: static rates or a generation-indexed shift from
//!   recombination-led exploration to mutation-led exploitation.
//!
//! # Architecture
//!
//! All algorithm code lives in [`ga`]. Errors are in [`error`]; RNG
//! construction in [`random`]. The crate logs through the `log` facade and
//! installs no logger. With the `parallel` feature, fitness batches can be
//! evaluated with rayon; with `serde`, configurations and results derive
//! `Serialize`/`Deserialize`.
//!
//! # Example
//!
//! ```
//! use queens_ga::ga::{GaConfig, GaRunner, Recombination};
//!
//! let config = GaConfig::default()
//!     .with_genome_size(8)
//!     .with_recombination(Recombination::Pmx)
//!     .with_seed(42);
//! let result = GaRunner::run(&config).unwrap();
//! if result.is_solved() {
//!     assert_eq!(result.best.conflicts(), 0);
//! }
//! ```

pub mod error;
pub mod ga;
pub mod random;

pub use error::{ConfigError, EngineResult, GaError, InvariantViolation};
