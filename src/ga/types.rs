//! Individual and population model.
//!
//! A genome is a `Vec<usize>` of length N whose entry at column `i` is the
//! row (1-based) of the queen in that column. Permutation-regime genomes
//! contain every value of `1..=N` exactly once.

use crate::error::InvariantViolation;
use rand::seq::index;
use rand::Rng;
use std::collections::HashSet;

/// Counts attacking queen pairs (same row or same diagonal). O(N²).
pub fn conflicts(genes: &[usize]) -> usize {
    let n = genes.len();
    let mut count = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (genes[i], genes[j]);
            if a == b || a.abs_diff(b) == j - i {
                count += 1;
            }
        }
    }
    count
}

/// Maximum number of conflicting pairs for a board of size `n`.
pub fn max_conflicts(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Normalized score `1 - C / (N·(N-1)/2)`, in `[0, 1]`.
///
/// A board with fewer than two queens has no pairs and scores 1.0.
pub fn score(conflicts: usize, n: usize) -> f64 {
    let max = max_conflicts(n);
    if max == 0 {
        return 1.0;
    }
    1.0 - conflicts as f64 / max as f64
}

/// Checks length and value range of a genome.
pub fn check_genome(genes: &[usize], genome_size: usize) -> Result<(), InvariantViolation> {
    if genes.len() != genome_size {
        return Err(InvariantViolation::LengthMismatch {
            expected: genome_size,
            actual: genes.len(),
        });
    }
    for (position, &value) in genes.iter().enumerate() {
        if value == 0 || value > genome_size {
            return Err(InvariantViolation::ValueOutOfRange {
                position,
                value,
                genome_size,
            });
        }
    }
    Ok(())
}

/// Checks that a genome is a permutation of `1..=genome_size`.
pub fn check_permutation(genes: &[usize], genome_size: usize) -> Result<(), InvariantViolation> {
    check_genome(genes, genome_size)?;
    let mut seen = vec![false; genome_size + 1];
    for &value in genes {
        if seen[value] {
            return Err(InvariantViolation::NotAPermutation { value, genome_size });
        }
        seen[value] = true;
    }
    Ok(())
}

/// Returns `true` if `genes` is a permutation of `1..=genome_size`.
pub fn is_permutation(genes: &[usize], genome_size: usize) -> bool {
    check_permutation(genes, genome_size).is_ok()
}

/// One candidate board with its evaluated fitness.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Individual {
    genes: Vec<usize>,
    fitness: f64,
}

impl Individual {
    /// Wraps an evaluated genome.
    pub fn new(genes: Vec<usize>, fitness: f64) -> Self {
        Self { genes, fitness }
    }

    pub fn genes(&self) -> &[usize] {
        &self.genes
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn genome_size(&self) -> usize {
        self.genes.len()
    }

    /// Number of attacking pairs on the decoded board.
    pub fn conflicts(&self) -> usize {
        conflicts(&self.genes)
    }

    /// Whether this individual is a conflict-free placement.
    pub fn is_solution(&self) -> bool {
        self.fitness >= 1.0
    }

    /// Renders the board, top row first, `Q` for a queen and `.` otherwise.
    pub fn board(&self) -> String {
        let n = self.genes.len();
        let mut out = String::with_capacity(n * (n + 1));
        for row in (1..=n).rev() {
            for &gene in &self.genes {
                out.push(if gene == row { 'Q' } else { '.' });
            }
            out.push('\n');
        }
        out
    }
}

/// Ordered, fixed-size collection of individuals.
///
/// Each slot owns its genome; cloning an individual into the population
/// always copies the gene buffer.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    pub fn new(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn into_individuals(self) -> Vec<Individual> {
        self.individuals
    }

    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.iter()
    }

    pub fn fitness_values(&self) -> Vec<f64> {
        self.individuals.iter().map(Individual::fitness).collect()
    }

    /// Individual with the highest fitness (first one on ties).
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.iter().reduce(|best, ind| {
            if ind.fitness > best.fitness {
                ind
            } else {
                best
            }
        })
    }

    pub fn best_fitness(&self) -> Option<f64> {
        self.best().map(Individual::fitness)
    }

    pub fn min_fitness(&self) -> Option<f64> {
        self.individuals.iter().map(Individual::fitness).reduce(f64::min)
    }

    pub fn mean_fitness(&self) -> Option<f64> {
        if self.individuals.is_empty() {
            return None;
        }
        let sum: f64 = self.individuals.iter().map(Individual::fitness).sum();
        Some(sum / self.individuals.len() as f64)
    }

    /// Number of individuals whose genome repeats an earlier one.
    pub fn duplicate_count(&self) -> usize {
        let mut seen: HashSet<&[usize]> = HashSet::with_capacity(self.individuals.len());
        self.individuals
            .iter()
            .filter(|ind| !seen.insert(ind.genes()))
            .count()
    }

    /// Mean element-wise agreement between each offspring genome and a
    /// random half of the population (sampled without replacement).
    ///
    /// Returns 1.0 when the offspring copy a converged population and
    /// `None` when there are no offspring or the sample is empty.
    pub fn offspring_similarity<R: Rng>(&self, offspring: &[Vec<usize>], rng: &mut R) -> Option<f64> {
        let sample_size = self.individuals.len() / 2;
        if sample_size == 0 || offspring.is_empty() {
            return None;
        }
        let sample = index::sample(rng, self.individuals.len(), sample_size);

        let mut total = 0.0;
        for i in sample.iter() {
            let member = self.individuals[i].genes();
            for child in offspring {
                total += similarity(child, member);
            }
        }
        Some(total / (sample_size * offspring.len()) as f64)
    }
}

/// Fraction of positions at which two genomes agree.
pub fn similarity(a: &[usize], b: &[usize]) -> f64 {
    if a.is_empty() {
        return 1.0;
    }
    let matches = a.iter().zip(b).filter(|(x, y)| x == y).count();
    matches as f64 / a.len().max(b.len()) as f64
}

impl std::ops::Index<usize> for Population {
    type Output = Individual;

    fn index(&self, index: usize) -> &Self::Output {
        &self.individuals[index]
    }
}

impl FromIterator<Individual> for Population {
    fn from_iter<T: IntoIterator<Item = Individual>>(iter: T) -> Self {
        Self {
            individuals: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Population {
    type Item = Individual;
    type IntoIter = std::vec::IntoIter<Individual>;

    fn into_iter(self) -> Self::IntoIter {
        self.individuals.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    // A known 8-queens solution.
    const SOLUTION_8: [usize; 8] = [1, 5, 8, 6, 3, 7, 2, 4];

    #[test]
    fn test_conflicts_solution() {
        assert_eq!(conflicts(&SOLUTION_8), 0);
    }

    #[test]
    fn test_conflicts_diagonal() {
        // Identity: every pair shares the main diagonal.
        assert_eq!(conflicts(&[1, 2, 3, 4]), 6);
    }

    #[test]
    fn test_conflicts_same_row() {
        // All queens on one row: every pair conflicts exactly once.
        assert_eq!(conflicts(&[2, 2, 2]), 3);
    }

    #[test]
    fn test_score_bounds() {
        assert_eq!(score(0, 8), 1.0);
        assert_eq!(score(28, 8), 0.0);
        assert!((score(7, 8) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_score_single_queen() {
        assert_eq!(score(0, 1), 1.0);
    }

    #[test]
    fn test_check_genome() {
        assert!(check_genome(&[1, 2, 3, 4], 4).is_ok());
        assert_eq!(
            check_genome(&[1, 2, 3], 4),
            Err(InvariantViolation::LengthMismatch {
                expected: 4,
                actual: 3
            })
        );
        assert!(matches!(
            check_genome(&[1, 0, 3, 4], 4),
            Err(InvariantViolation::ValueOutOfRange { position: 1, .. })
        ));
        assert!(matches!(
            check_genome(&[1, 5, 3, 4], 4),
            Err(InvariantViolation::ValueOutOfRange { value: 5, .. })
        ));
    }

    #[test]
    fn test_check_permutation() {
        assert!(is_permutation(&[3, 1, 4, 2], 4));
        assert_eq!(
            check_permutation(&[3, 1, 3, 2], 4),
            Err(InvariantViolation::NotAPermutation {
                value: 3,
                genome_size: 4
            })
        );
    }

    #[test]
    fn test_individual_solution_and_board() {
        let ind = Individual::new(vec![2, 4, 1, 3], 1.0);
        assert!(ind.is_solution());
        assert_eq!(ind.conflicts(), 0);
        assert_eq!(ind.board(), ".Q..\n...Q\nQ...\n..Q.\n");
    }

    #[test]
    fn test_population_stats() {
        let pop = Population::new(vec![
            Individual::new(vec![1, 2, 3, 4], 0.0),
            Individual::new(vec![2, 4, 1, 3], 1.0),
            Individual::new(vec![1, 3, 2, 4], 0.5),
        ]);
        assert_eq!(pop.best_fitness(), Some(1.0));
        assert_eq!(pop.best().map(|b| b.genes().to_vec()), Some(vec![2, 4, 1, 3]));
        assert_eq!(pop.min_fitness(), Some(0.0));
        assert!((pop.mean_fitness().unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_population_stats() {
        let pop = Population::default();
        assert!(pop.best().is_none());
        assert!(pop.mean_fitness().is_none());
        assert!(pop.min_fitness().is_none());
    }

    #[test]
    fn test_duplicate_count() {
        let pop = Population::new(vec![
            Individual::new(vec![1, 2, 3, 4], 0.0),
            Individual::new(vec![1, 2, 3, 4], 0.0),
            Individual::new(vec![2, 4, 1, 3], 1.0),
            Individual::new(vec![1, 2, 3, 4], 0.0),
        ]);
        assert_eq!(pop.duplicate_count(), 2);
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity(&[1, 2, 3, 4], &[1, 2, 3, 4]), 1.0);
        assert_eq!(similarity(&[1, 2, 3, 4], &[4, 3, 2, 1]), 0.0);
        assert_eq!(similarity(&[1, 2, 3, 4], &[1, 2, 4, 3]), 0.5);
    }

    #[test]
    fn test_offspring_similarity_converged() {
        let mut rng = create_rng(42);
        let pop: Population = (0..10)
            .map(|_| Individual::new(vec![1, 2, 3, 4], 0.0))
            .collect();
        let offspring = vec![vec![1, 2, 3, 4]; 4];
        assert_eq!(pop.offspring_similarity(&offspring, &mut rng), Some(1.0));
    }

    #[test]
    fn test_offspring_similarity_against_sample() {
        let mut rng = create_rng(42);
        let pop: Population = (0..6)
            .map(|_| Individual::new(vec![1, 2, 3, 4], 0.0))
            .collect();
        // One identical child and one sharing half its positions.
        let offspring = vec![vec![1, 2, 3, 4], vec![1, 2, 4, 3]];
        let sim = pop.offspring_similarity(&offspring, &mut rng).unwrap();
        assert!((sim - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_offspring_similarity_empty() {
        let mut rng = create_rng(42);
        let single: Population = vec![Individual::new(vec![1, 2, 3, 4], 0.0)].into_iter().collect();
        assert_eq!(single.offspring_similarity(&[vec![1, 2, 3, 4]], &mut rng), None);

        let pop: Population = (0..4)
            .map(|_| Individual::new(vec![1, 2, 3, 4], 0.0))
            .collect();
        assert_eq!(pop.offspring_similarity(&[], &mut rng), None);
    }
}
