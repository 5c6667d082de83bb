//! Fitness-weighted sampling without replacement.
//!
//! Shared by probabilistic survival and genocide. Each candidate gets
//! weight `fitness^k`; `k` sharpens the pressure toward the fittest.
//!
//! Sampling uses the Efraimidis–Spirakis key `ln(u) / w`: keeping the `m`
//! largest keys has the same distribution as drawing `m` times in sequence
//! and renormalizing the remaining weights after each draw.
//!
//! # References
//!
//! - Efraimidis & Spirakis (2006), "Weighted random sampling with a reservoir"

use log::warn;
use rand::seq::{index, SliceRandom};
use rand::Rng;

/// Selection weights `fitness^exponent`. Negative or NaN inputs weigh zero.
pub fn fitness_weights(fitness: &[f64], exponent: f64) -> Vec<f64> {
    fitness
        .iter()
        .map(|&f| {
            let w = f.max(0.0).powf(exponent);
            if w.is_finite() && w > 0.0 {
                w
            } else {
                0.0
            }
        })
        .collect()
}

/// Draws `amount` distinct indices from `0..weights.len()`, each draw
/// proportional to its weight among the indices not yet drawn.
///
/// Zero-weight indices are only drawn after every positive-weight index has
/// been taken, uniformly at random. If every weight is zero the draw is
/// uniform. `amount` is capped at `weights.len()`.
pub fn weighted_sample<R: Rng>(weights: &[f64], amount: usize, rng: &mut R) -> Vec<usize> {
    let amount = amount.min(weights.len());
    if amount == 0 {
        return Vec::new();
    }

    let (positive, mut zero): (Vec<usize>, Vec<usize>) =
        (0..weights.len()).partition(|&i| weights[i] > 0.0 && weights[i].is_finite());

    if positive.is_empty() {
        warn!(
            "all {} selection weights are zero; sampling {} uniformly",
            weights.len(),
            amount
        );
        return index::sample(rng, weights.len(), amount).into_vec();
    }

    let mut keyed: Vec<(f64, usize)> = positive
        .into_iter()
        .map(|i| {
            // u in (0, 1] keeps ln(u) finite
            let u = 1.0 - rng.random::<f64>();
            (u.ln() / weights[i], i)
        })
        .collect();
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut picked: Vec<usize> = keyed.into_iter().take(amount).map(|(_, i)| i).collect();
    if picked.len() < amount {
        zero.shuffle(rng);
        picked.extend(zero.into_iter().take(amount - picked.len()));
    }
    picked
}

/// Shorthand for `weighted_sample(&fitness_weights(fitness, exponent), ..)`.
pub fn fitness_weighted_sample<R: Rng>(
    fitness: &[f64],
    exponent: f64,
    amount: usize,
    rng: &mut R,
) -> Vec<usize> {
    weighted_sample(&fitness_weights(fitness, exponent), amount, rng)
}
