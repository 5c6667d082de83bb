//! Generation-indexed rate schedules.
//!
//! # Dynamic schedule
//!
//! With `t = g^e` for generation `g` and exponent `e` (default 0.75):
//!
//! ```text
//! exploration  = max(0.1, N / (N + t))
//! exploitation = max(0.1, 1 - exploration)
//! genocide     = max(1/6, 1 - N / (N + t))
//!
//! recombination_rate = base_recombination * exploration
//! mutation_rate      = base_mutation      * exploitation
//! genocide_fraction  = base_genocide      * genocide
//! ```
//!
//! Early generations favor recombination; later ones shift toward mutation
//! and a gentler genocide.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Default generation exponent of the dynamic schedule.
pub const DEFAULT_EXPONENT: f64 = 0.75;

/// Floor of both the exploration and the exploitation factor.
pub const FACTOR_FLOOR: f64 = 0.1;

/// Floor of the genocide factor.
pub const GENOCIDE_FLOOR: f64 = 1.0 / 6.0;

/// Rates in effect for one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rates {
    pub recombination: f64,
    pub mutation: f64,
    pub genocide_fraction: f64,
}

/// Per-generation multipliers of the dynamic schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Factors {
    pub exploration: f64,
    pub exploitation: f64,
    pub genocide: f64,
}

impl Factors {
    /// Factors for generation `generation` and genome size `genome_size`.
    pub fn at(generation: usize, genome_size: usize, exponent: f64) -> Self {
        let n = genome_size as f64;
        let t = (generation as f64).powf(exponent);
        let ratio = if n + t > 0.0 { n / (n + t) } else { 1.0 };

        let exploration = ratio.max(FACTOR_FLOOR);
        Self {
            exploration,
            exploitation: (1.0 - exploration).max(FACTOR_FLOOR),
            genocide: (1.0 - ratio).max(GENOCIDE_FLOOR),
        }
    }
}

/// How the base rates evolve over a run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RateSchedule {
    /// Base rates every generation.
    Static,

    /// Exploration-to-exploitation shift driven by `generation^exponent`.
    Dynamic { exponent: f64 },
}

impl Default for RateSchedule {
    fn default() -> Self {
        RateSchedule::Dynamic {
            exponent: DEFAULT_EXPONENT,
        }
    }
}

impl RateSchedule {
    pub fn name(&self) -> &'static str {
        match self {
            RateSchedule::Static => "static",
            RateSchedule::Dynamic { .. } => "dynamic",
        }
    }

    /// Rates for `generation`, derived from `base`.
    pub fn rates(&self, generation: usize, genome_size: usize, base: Rates) -> Rates {
        match *self {
            RateSchedule::Static => base,
            RateSchedule::Dynamic { exponent } => {
                let f = Factors::at(generation, genome_size, exponent);
                Rates {
                    recombination: base.recombination * f.exploration,
                    mutation: base.mutation * f.exploitation,
                    genocide_fraction: base.genocide_fraction * f.genocide,
                }
            }
        }
    }
}

impl fmt::Display for RateSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RateSchedule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(RateSchedule::Static),
            "dynamic" => Ok(RateSchedule::default()),
            other => Err(ConfigError::UnknownStrategy {
                role: "rate schedule",
                name: other.to_string(),
            }),
        }
    }
}
