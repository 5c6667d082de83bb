//! Recombination (crossover) operators.
//!
//! Every operator takes two parents of length N and returns two freshly
//! allocated children of length N.
//!
//! # Operators
//!
//! - [`even_cut_crossover`]: fixed midpoint cut and crossfill
//! - [`one_point_crossover`]: random cut in `[1, N-2]`
//! - [`two_point_crossover`]: inclusive segment `[A, B]` swapped between children
//! - [`pmx_crossover`] (PMX): Goldberg & Lingle (1985), preserves absolute position
//! - [`order_crossover`] (OX): Davis (1985), preserves relative order
//! - [`Recombination::PmxRepair`]: PMX followed by duplicate replacement
//!
//! PMX, OX and the composite return permutations whenever both parents are
//! permutations of `1..=N`.
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Goldberg & Lingle (1985), "Alleles, Loci, and the Traveling Salesman Problem"

use super::mutation::duplicate_replacement;
use super::types::{check_genome, is_permutation, Population};
use crate::error::ConfigError;
use rand::seq::index;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Crossover operator applied to each parent pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Recombination {
    /// Midpoint cut, first half from one parent and second half from the other.
    EvenCut,
    /// Single random cut point.
    OnePoint,
    /// Two random cut points; the inclusive segment comes from the own parent.
    TwoPoint,
    /// Partially mapped crossover.
    #[default]
    Pmx,
    /// Ordered crossover.
    Ox,
    /// PMX followed by duplicate replacement on both children.
    PmxRepair,
}

impl Recombination {
    pub const ALL: [Recombination; 6] = [
        Recombination::EvenCut,
        Recombination::OnePoint,
        Recombination::TwoPoint,
        Recombination::Pmx,
        Recombination::Ox,
        Recombination::PmxRepair,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Recombination::EvenCut => "even_cut_and_crossfill",
            Recombination::OnePoint => "one_point_crossover",
            Recombination::TwoPoint => "two_point_crossover",
            Recombination::Pmx => "partially_mapped_crossover",
            Recombination::Ox => "ordered_crossover",
            Recombination::PmxRepair => "pmx_dp_rm",
        }
    }

    /// Whether permutation parents always produce permutation children.
    pub fn preserves_permutations(&self) -> bool {
        matches!(
            self,
            Recombination::Pmx | Recombination::Ox | Recombination::PmxRepair
        )
    }

    /// Applies the operator to one parent pair.
    pub fn crossover<R: Rng>(
        &self,
        parent1: &[usize],
        parent2: &[usize],
        rng: &mut R,
    ) -> (Vec<usize>, Vec<usize>) {
        debug_assert_eq!(parent1.len(), parent2.len(), "parents must have equal length");

        let children = match self {
            Recombination::EvenCut => even_cut_crossover(parent1, parent2),
            Recombination::OnePoint => one_point_crossover(parent1, parent2, rng),
            Recombination::TwoPoint => two_point_crossover(parent1, parent2, rng),
            Recombination::Pmx => pmx_crossover(parent1, parent2, rng),
            Recombination::Ox => order_crossover(parent1, parent2, rng),
            Recombination::PmxRepair => {
                let (mut c1, mut c2) = pmx_crossover(parent1, parent2, rng);
                duplicate_replacement(&mut c1, rng);
                duplicate_replacement(&mut c2, rng);
                (c1, c2)
            }
        };

        let n = parent1.len();
        debug_assert!(
            check_genome(&children.0, n).is_ok() && check_genome(&children.1, n).is_ok(),
            "{} produced a malformed child",
            self.name()
        );
        debug_assert!(
            !(self.preserves_permutations()
                && is_permutation(parent1, n)
                && is_permutation(parent2, n))
                || (is_permutation(&children.0, n) && is_permutation(&children.1, n)),
            "{} broke permutation validity",
            self.name()
        );
        children
    }

    /// Produces offspring for every parent pair.
    ///
    /// Each pair is recombined with probability `rate`; otherwise copies of
    /// both parents pass through. Output order follows `pairs`, two
    /// children per pair.
    pub fn recombine<R: Rng>(
        &self,
        population: &Population,
        pairs: &[(usize, usize)],
        rate: f64,
        rng: &mut R,
    ) -> Vec<Vec<usize>> {
        let mut offspring = Vec::with_capacity(pairs.len() * 2);
        for &(a, b) in pairs {
            let (p1, p2) = (population[a].genes(), population[b].genes());
            let (c1, c2) = if rng.random::<f64>() < rate {
                self.crossover(p1, p2, rng)
            } else {
                (p1.to_vec(), p2.to_vec())
            };
            offspring.push(c1);
            offspring.push(c2);
        }
        offspring
    }
}

impl fmt::Display for Recombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Recombination {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Recombination::ALL
            .into_iter()
            .find(|r| r.name() == s)
            .ok_or_else(|| ConfigError::UnknownStrategy {
                role: "recombination",
                name: s.to_string(),
            })
    }
}

// ============================================================================
// Cut-based operators
// ============================================================================

/// Midpoint crossfill. The cut sits at `ceil(N/2)`.
pub fn even_cut_crossover(parent1: &[usize], parent2: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let cut = parent1.len().div_ceil(2);
    crossfill(parent1, parent2, cut)
}

/// One random cut point in `[1, N-2]`.
pub fn one_point_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let n = parent1.len();
    if n < 3 {
        return (parent1.to_vec(), parent2.to_vec());
    }
    let cut = rng.random_range(1..n - 1);
    crossfill(parent1, parent2, cut)
}

fn crossfill(parent1: &[usize], parent2: &[usize], cut: usize) -> (Vec<usize>, Vec<usize>) {
    let mut child1 = Vec::with_capacity(parent1.len());
    child1.extend_from_slice(&parent1[..cut]);
    child1.extend_from_slice(&parent2[cut..]);

    let mut child2 = Vec::with_capacity(parent2.len());
    child2.extend_from_slice(&parent2[..cut]);
    child2.extend_from_slice(&parent1[cut..]);
    (child1, child2)
}

/// Two-point crossover.
///
/// Picks `A` in `[1, N-2]` and `B` in `[A+1, N-1]`. Inside `[A, B]` each
/// child keeps its own parent's genes; outside, it takes the other parent's.
pub fn two_point_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let n = parent1.len();
    if n < 3 {
        return (parent1.to_vec(), parent2.to_vec());
    }
    let (a, b) = interior_cut_points(n, rng);

    let pick = |own: &[usize], other: &[usize]| -> Vec<usize> {
        (0..n)
            .map(|i| if (a..=b).contains(&i) { own[i] } else { other[i] })
            .collect()
    };
    (pick(parent1, parent2), pick(parent2, parent1))
}

// ============================================================================
// Permutation operators
// ============================================================================

/// Partially Mapped Crossover (PMX).
///
/// # Algorithm (Goldberg & Lingle, 1985)
///
/// 1. Pick two distinct cut indices in `1..n`; the segment `[start, end]` is
///    inclusive and never starts at the first gene
/// 2. Copy the segment from the own parent
/// 3. For every position outside the segment, take the other parent's value
///    and, while that value already occurs in the copied segment, replace it
///    by the other parent's value at the position where it occurs
///
/// For permutation parents the mapping chain always ends on a value
/// missing from the segment, so the child is a permutation.
///
/// # Complexity
/// O(n²) worst case (chain following), O(n) typical
pub fn pmx_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let n = parent1.len();
    if n < 3 {
        return (parent1.to_vec(), parent2.to_vec());
    }
    let cuts = index::sample(rng, n - 1, 2);
    let (start, end) = {
        let (x, y) = (cuts.index(0) + 1, cuts.index(1) + 1);
        (x.min(y), x.max(y))
    };

    let child1 = pmx_build_child(parent1, parent2, start, end);
    let child2 = pmx_build_child(parent2, parent1, start, end);
    (child1, child2)
}

/// Build one PMX child: segment from `template`, the rest mapped from `donor`.
fn pmx_build_child(template: &[usize], donor: &[usize], start: usize, end: usize) -> Vec<usize> {
    let n = template.len();

    // Segment position of each value copied from the template.
    let mut segment_pos: Vec<Option<usize>> = vec![None; n + 1];
    for (i, &v) in template.iter().enumerate().take(end + 1).skip(start) {
        if v <= n {
            segment_pos[v] = Some(i);
        }
    }

    let mut child = donor.to_vec();
    child[start..=end].copy_from_slice(&template[start..=end]);

    for (i, slot) in child.iter_mut().enumerate() {
        if (start..=end).contains(&i) {
            continue;
        }
        let mut value = donor[i];
        // Chains longer than n only arise from non-permutation parents.
        for _ in 0..n {
            match segment_pos.get(value).copied().flatten() {
                Some(pos) => value = donor[pos],
                None => break,
            }
        }
        *slot = value;
    }
    child
}

/// Ordered Crossover (OX).
///
/// # Algorithm (Davis, 1985)
///
/// 1. Pick `A` in `[1, N-2]` and `B` in `[A+1, N-1]`; the segment is `[A, B)`
/// 2. Copy the segment's distinct values, in order, starting at `A`
/// 3. Fill the remaining slots, starting at `B` and wrapping, with the other
///    parent's values read from `B` onward, skipping values already present
/// 4. Any slot still empty receives the missing values in ascending order
///
/// Children are always permutations of `1..=N`.
///
/// # Complexity
/// O(n) time, O(n) space
pub fn order_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let n = parent1.len();
    if n < 3 {
        return (parent1.to_vec(), parent2.to_vec());
    }
    let (a, b) = interior_cut_points(n, rng);

    let child1 = ox_build_child(parent1, parent2, a, b);
    let child2 = ox_build_child(parent2, parent1, a, b);
    (child1, child2)
}

/// Build one OX child: distinct segment values from `template`, fill from `donor`.
fn ox_build_child(template: &[usize], donor: &[usize], start: usize, end: usize) -> Vec<usize> {
    let n = template.len();
    const EMPTY: usize = 0;
    let mut child = vec![EMPTY; n];
    let mut present = vec![false; n + 1];

    // Step 1: distinct segment values, packed from `start`
    let mut pos = start;
    for &v in &template[start..end] {
        if (1..=n).contains(&v) && !present[v] {
            present[v] = true;
            child[pos] = v;
            pos += 1;
        }
    }

    // Step 2: donor order from `end`, wrapping, then missing values ascending
    let from_donor = (0..n).map(|offset| donor[(end + offset) % n]);
    let mut fill = from_donor.chain(1..=n).filter(|&v| {
        let fresh = (1..=n).contains(&v) && !present[v];
        if fresh {
            present[v] = true;
        }
        fresh
    });

    for offset in 0..n {
        let i = (end + offset) % n;
        if child[i] == EMPTY {
            if let Some(v) = fill.next() {
                child[i] = v;
            }
        }
    }
    child
}

// ============================================================================
// Helpers
// ============================================================================

/// Cut points `A` in `[1, N-2]` and `B` in `[A+1, N-1]`. Requires `n >= 3`.
fn interior_cut_points<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let a = rng.random_range(1..n - 1);
    let b = rng.random_range(a + 1..n);
    (a, b)
}

// ============================================================================
// Tests
// ============================================================================
