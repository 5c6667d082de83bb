//! Mutation operators.
//!
//! Each operator mutates one genome in place and keeps its length.
//!
//! - [`swap_mutation`]: exchange two distinct positions, O(1)
//! - [`inversion_mutation`]: reverse an interior segment, O(n)
//! - [`duplicate_replacement`]: repair into a permutation, O(n)
//! - [`creep_mutation`]: nudge one gene by ±1 within `[1, N]`, O(1)
//! - [`scramble_mutation`]: reassign a random subset of positions, O(n)

use crate::error::ConfigError;
use rand::seq::{index, SliceRandom};
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Mutation operator applied per individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mutation {
    Swap,
    Inversion,
    /// Repair operator; a no-op on a valid permutation.
    #[default]
    DuplicateReplacement,
    Creep,
    Scramble,
}

impl Mutation {
    pub const ALL: [Mutation; 5] = [
        Mutation::Swap,
        Mutation::Inversion,
        Mutation::DuplicateReplacement,
        Mutation::Creep,
        Mutation::Scramble,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Swap => "swap_mutation",
            Mutation::Inversion => "inversion_mutation",
            Mutation::DuplicateReplacement => "duplicate_replacement",
            Mutation::Creep => "creep_mutation",
            Mutation::Scramble => "scramble_mutation",
        }
    }

    /// Whether a permutation stays a permutation under this operator.
    pub fn preserves_permutations(&self) -> bool {
        matches!(
            self,
            Mutation::Swap | Mutation::Inversion | Mutation::DuplicateReplacement
        )
    }

    /// Mutates one genome unconditionally.
    pub fn mutate<R: Rng>(&self, genes: &mut [usize], rng: &mut R) {
        let before = genes.len();
        match self {
            Mutation::Swap => swap_mutation(genes, rng),
            Mutation::Inversion => inversion_mutation(genes, rng),
            Mutation::DuplicateReplacement => duplicate_replacement(genes, rng),
            Mutation::Creep => creep_mutation(genes, rng),
            Mutation::Scramble => scramble_mutation(genes, rng),
        }
        debug_assert_eq!(genes.len(), before);
    }

    /// Mutates each genome independently with probability `rate`.
    ///
    /// Returns how many genomes were mutated.
    pub fn apply<R: Rng>(&self, genomes: &mut [Vec<usize>], rate: f64, rng: &mut R) -> usize {
        let mut mutated = 0;
        for genes in genomes.iter_mut() {
            if rng.random::<f64>() < rate {
                self.mutate(genes, rng);
                mutated += 1;
            }
        }
        mutated
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mutation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mutation::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| ConfigError::UnknownStrategy {
                role: "mutation",
                name: s.to_string(),
            })
    }
}

/// Swap mutation: exchange the values at two distinct positions.
pub fn swap_mutation<R: Rng>(genes: &mut [usize], rng: &mut R) {
    let n = genes.len();
    if n < 2 {
        return;
    }
    let picked = index::sample(rng, n, 2);
    genes.swap(picked.index(0), picked.index(1));
}

/// Inversion mutation: reverse `[i, j]` for two distinct interior indices
/// drawn from `1..=N-2`. The first and last positions never move.
pub fn inversion_mutation<R: Rng>(genes: &mut [usize], rng: &mut R) {
    let n = genes.len();
    if n < 4 {
        return;
    }
    let picked = index::sample(rng, n - 2, 2);
    let (a, b) = (picked.index(0) + 1, picked.index(1) + 1);
    genes[a.min(b)..=a.max(b)].reverse();
}

/// Duplicate replacement: turn any genome into a permutation of `1..=N`.
///
/// For every value that occurs more than once, one randomly chosen
/// occurrence is kept. The surplus occurrences, together with any
/// out-of-range values, are reassigned to the missing values in ascending
/// order. A valid permutation is left untouched.
pub fn duplicate_replacement<R: Rng>(genes: &mut [usize], rng: &mut R) {
    let n = genes.len();
    let mut positions: Vec<Vec<usize>> = vec![Vec::new(); n + 1];
    let mut surplus: Vec<usize> = Vec::new();

    for (i, &v) in genes.iter().enumerate() {
        if (1..=n).contains(&v) {
            positions[v].push(i);
        } else {
            surplus.push(i);
        }
    }

    let mut missing = Vec::new();
    for (value, slots) in positions.iter_mut().enumerate().skip(1) {
        match slots.len() {
            0 => missing.push(value),
            1 => {}
            _ => {
                slots.shuffle(rng);
                surplus.extend_from_slice(&slots[1..]);
            }
        }
    }
    if missing.is_empty() {
        return;
    }

    // Out-of-range positions first, then duplicates by ascending value.
    surplus.sort_by_key(|&i| {
        let v = genes[i];
        if (1..=n).contains(&v) {
            v
        } else {
            0
        }
    });
    for (slot, value) in surplus.into_iter().zip(missing) {
        genes[slot] = value;
    }
}

/// Creep mutation: move one gene by one row, staying inside `[1, N]`.
///
/// At 1 the gene can only go up, at N only down.
pub fn creep_mutation<R: Rng>(genes: &mut [usize], rng: &mut R) {
    let n = genes.len();
    if n < 2 {
        return;
    }
    let pos = rng.random_range(0..n);
    let v = genes[pos].clamp(1, n);
    genes[pos] = if v == 1 {
        2
    } else if v == n || rng.random_bool(0.5) {
        v - 1
    } else {
        v + 1
    };
}

/// Scramble mutation: pick a random number of distinct positions and give
/// each a fresh uniform value in `[1, N]`.
pub fn scramble_mutation<R: Rng>(genes: &mut [usize], rng: &mut R) {
    let n = genes.len();
    if n == 0 {
        return;
    }
    let count = rng.random_range(1..=n);
    for pos in index::sample(rng, n, count) {
        genes[pos] = rng.random_range(1..=n);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::init::random_permutation;
    use crate::ga::types::{check_genome, is_permutation};
    use crate::random::create_rng;

    #[test]
    fn test_swap_changes_exactly_two() {
        let mut rng = create_rng(42);
        for _ in 0..100 {
            let original = random_permutation(8, &mut rng);
            let mut genes = original.clone();
            swap_mutation(&mut genes, &mut rng);
            let diff = genes.iter().zip(&original).filter(|(a, b)| a != b).count();
            assert_eq!(diff, 2);
            assert!(is_permutation(&genes, 8));
        }
    }

    #[test]
    fn test_inversion_keeps_boundaries() {
        let mut rng = create_rng(42);
        for _ in 0..100 {
            let mut genes: Vec<usize> = (1..=8).collect();
            inversion_mutation(&mut genes, &mut rng);
            assert_eq!(genes[0], 1);
            assert_eq!(genes[7], 8);
            assert!(is_permutation(&genes, 8));
            assert_ne!(genes, (1..=8).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_inversion_too_short_is_noop() {
        let mut rng = create_rng(42);
        let mut genes = vec![1, 2, 3];
        inversion_mutation(&mut genes, &mut rng);
        assert_eq!(genes, vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicate_replacement_repairs() {
        let mut rng = create_rng(42);
        let mut genes = vec![3, 3, 3, 1, 1, 8, 8, 2];
        duplicate_replacement(&mut genes, &mut rng);
        assert!(is_permutation(&genes, 8), "got {genes:?}");
    }

    #[test]
    fn test_duplicate_replacement_noop_on_permutation() {
        let mut rng = create_rng(42);
        let original = random_permutation(10, &mut rng);
        let mut genes = original.clone();
        duplicate_replacement(&mut genes, &mut rng);
        assert_eq!(genes, original);
    }

    #[test]
    fn test_duplicate_replacement_all_same() {
        let mut rng = create_rng(42);
        let mut genes = vec![5; 6];
        duplicate_replacement(&mut genes, &mut rng);
        assert!(is_permutation(&genes, 6));
    }

    #[test]
    fn test_duplicate_replacement_out_of_range() {
        let mut rng = create_rng(42);
        let mut genes = vec![0, 9, 2, 2];
        duplicate_replacement(&mut genes, &mut rng);
        assert!(is_permutation(&genes, 4), "got {genes:?}");
    }

    #[test]
    fn test_creep_boundaries() {
        let mut rng = create_rng(42);
        for _ in 0..50 {
            let mut low = vec![1; 5];
            creep_mutation(&mut low, &mut rng);
            assert_eq!(low.iter().filter(|&&v| v == 2).count(), 1);

            let mut high = vec![5; 5];
            creep_mutation(&mut high, &mut rng);
            assert_eq!(high.iter().filter(|&&v| v == 4).count(), 1);
        }
    }

    #[test]
    fn test_creep_stays_in_range() {
        let mut rng = create_rng(42);
        let mut genes = random_permutation(8, &mut rng);
        for _ in 0..1000 {
            creep_mutation(&mut genes, &mut rng);
            assert!(check_genome(&genes, 8).is_ok(), "got {genes:?}");
        }
    }

    #[test]
    fn test_scramble_stays_in_range() {
        let mut rng = create_rng(42);
        for _ in 0..100 {
            let mut genes = random_permutation(8, &mut rng);
            scramble_mutation(&mut genes, &mut rng);
            assert!(check_genome(&genes, 8).is_ok());
        }
    }

    #[test]
    fn test_apply_rate_bounds() {
        let mut rng = create_rng(42);
        let mut genomes: Vec<Vec<usize>> = (0..20).map(|_| random_permutation(8, &mut rng)).collect();
        let snapshot = genomes.clone();

        assert_eq!(Mutation::Swap.apply(&mut genomes, 0.0, &mut rng), 0);
        assert_eq!(genomes, snapshot);

        assert_eq!(Mutation::Swap.apply(&mut genomes, 1.0, &mut rng), 20);
        assert!(genomes.iter().zip(&snapshot).all(|(a, b)| a != b));
    }

    #[test]
    fn test_parse_all_names() {
        for m in Mutation::ALL {
            assert_eq!(m.name().parse::<Mutation>(), Ok(m));
        }
        assert!("gaussian".parse::<Mutation>().is_err());
    }
}
