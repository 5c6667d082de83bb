//! Conflict-based fitness evaluation.
//!
//! Scores are `1 - conflicts / (N·(N-1)/2)`. The optional [`FitnessCache`]
//! memoizes scores by gene vector; it changes performance only, never
//! results.

use super::types::{conflicts, score, Individual};
use std::collections::{HashMap, VecDeque};

/// Bounded score cache keyed by the gene vector.
///
/// Eviction is first-in first-out once `capacity` entries are held.
#[derive(Debug, Clone)]
pub struct FitnessCache {
    capacity: usize,
    scores: HashMap<Vec<usize>, f64>,
    order: VecDeque<Vec<usize>>,
    hits: u64,
    misses: u64,
}

impl FitnessCache {
    /// Creates an empty cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            scores: HashMap::with_capacity(capacity.min(1 << 16)),
            order: VecDeque::with_capacity(capacity.min(1 << 16)),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, genes: &[usize]) -> Option<f64> {
        match self.scores.get(genes) {
            Some(&s) => {
                self.hits += 1;
                Some(s)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, genes: Vec<usize>, score: f64) {
        if self.capacity == 0 || self.scores.contains_key(&genes) {
            return;
        }
        if self.scores.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.scores.remove(&oldest);
            }
        }
        self.order.push_back(genes.clone());
        self.scores.insert(genes, score);
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

/// Evaluates genomes of a fixed size, single or batched.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    genome_size: usize,
    parallel: bool,
    cache: Option<FitnessCache>,
}

impl FitnessEvaluator {
    /// Evaluator without memoization.
    pub fn new(genome_size: usize) -> Self {
        Self {
            genome_size,
            parallel: false,
            cache: None,
        }
    }

    /// Enables a bounded cache; a capacity of 0 disables it.
    pub fn with_cache(mut self, capacity: usize) -> Self {
        self.cache = (capacity > 0).then(|| FitnessCache::new(capacity));
        self
    }

    /// Evaluates cache misses in parallel (requires the `parallel` feature,
    /// otherwise ignored).
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn genome_size(&self) -> usize {
        self.genome_size
    }

    pub fn cache(&self) -> Option<&FitnessCache> {
        self.cache.as_ref()
    }

    /// Scores one genome.
    pub fn evaluate(&mut self, genes: &[usize]) -> f64 {
        if let Some(cache) = self.cache.as_mut() {
            if let Some(s) = cache.get(genes) {
                return s;
            }
        }
        let s = score(conflicts(genes), self.genome_size);
        if let Some(cache) = self.cache.as_mut() {
            cache.insert(genes.to_vec(), s);
        }
        s
    }

    /// Scores a batch; the result is aligned with `genomes` by index.
    pub fn evaluate_batch(&mut self, genomes: &[Vec<usize>]) -> Vec<f64> {
        let mut scores = vec![0.0; genomes.len()];
        let mut pending: Vec<usize> = Vec::with_capacity(genomes.len());

        match self.cache.as_mut() {
            Some(cache) => {
                for (i, genes) in genomes.iter().enumerate() {
                    match cache.get(genes) {
                        Some(s) => scores[i] = s,
                        None => pending.push(i),
                    }
                }
            }
            None => pending.extend(0..genomes.len()),
        }

        let to_score: Vec<&[usize]> = pending.iter().map(|&i| genomes[i].as_slice()).collect();
        let computed = score_many(&to_score, self.genome_size, self.parallel);

        for (&i, s) in pending.iter().zip(computed) {
            scores[i] = s;
            if let Some(cache) = self.cache.as_mut() {
                cache.insert(genomes[i].clone(), s);
            }
        }

        if let Some(cache) = &self.cache {
            log::trace!(
                "fitness cache: {} entries, {} hits, {} misses",
                cache.len(),
                cache.hits(),
                cache.misses()
            );
        }
        scores
    }

    /// Scores a batch and pairs each genome with its fitness.
    pub fn evaluate_into(&mut self, genomes: Vec<Vec<usize>>) -> Vec<Individual> {
        let scores = self.evaluate_batch(&genomes);
        genomes
            .into_iter()
            .zip(scores)
            .map(|(genes, fitness)| Individual::new(genes, fitness))
            .collect()
    }
}

#[cfg(feature = "parallel")]
fn score_many(genomes: &[&[usize]], genome_size: usize, parallel: bool) -> Vec<f64> {
    use rayon::prelude::*;

    if parallel {
        genomes
            .par_iter()
            .map(|g| score(conflicts(g), genome_size))
            .collect()
    } else {
        genomes
            .iter()
            .map(|g| score(conflicts(g), genome_size))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn score_many(genomes: &[&[usize]], genome_size: usize, _parallel: bool) -> Vec<f64> {
    genomes
        .iter()
        .map(|g| score(conflicts(g), genome_size))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_solution() {
        let mut eval = FitnessEvaluator::new(8);
        assert_eq!(eval.evaluate(&[1, 5, 8, 6, 3, 7, 2, 4]), 1.0);
    }

    #[test]
    fn test_evaluate_worst() {
        // Identity board: all 28 pairs on one diagonal.
        let mut eval = FitnessEvaluator::new(8);
        let genes: Vec<usize> = (1..=8).collect();
        assert_eq!(eval.evaluate(&genes), 0.0);
    }

    #[test]
    fn test_batch_aligned() {
        let mut eval = FitnessEvaluator::new(4);
        let genomes = vec![vec![1, 2, 3, 4], vec![2, 4, 1, 3], vec![1, 1, 1, 1]];
        let scores = eval.evaluate_batch(&genomes);
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0], 0.0);
        assert_eq!(scores[1], 1.0);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn test_cache_does_not_change_results() {
        let genomes = vec![
            vec![1, 3, 2, 4],
            vec![2, 4, 1, 3],
            vec![1, 3, 2, 4],
            vec![4, 4, 1, 2],
        ];
        let mut plain = FitnessEvaluator::new(4);
        let mut cached = FitnessEvaluator::new(4).with_cache(16);
        assert_eq!(plain.evaluate_batch(&genomes), cached.evaluate_batch(&genomes));
        assert_eq!(plain.evaluate_batch(&genomes), cached.evaluate_batch(&genomes));

        let cache = cached.cache().unwrap();
        assert_eq!(cache.len(), 3);
        assert!(cache.hits() >= 4);
    }

    #[test]
    fn test_cache_fifo_eviction() {
        let mut cache = FitnessCache::new(2);
        assert_eq!(cache.capacity(), 2);
        cache.insert(vec![1, 2], 0.0);
        cache.insert(vec![2, 1], 0.0);
        cache.insert(vec![1, 1], 0.0);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&[1, 2]), None);
        assert_eq!(cache.get(&[1, 1]), Some(0.0));
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let eval = FitnessEvaluator::new(8).with_cache(0);
        assert!(eval.cache().is_none());
    }

    #[test]
    fn test_evaluate_into() {
        let mut eval = FitnessEvaluator::new(4);
        let inds = eval.evaluate_into(vec![vec![2, 4, 1, 3]]);
        assert_eq!(inds.len(), 1);
        assert_eq!(inds[0].fitness(), 1.0);
        assert_eq!(inds[0].genes(), &[2, 4, 1, 3]);
    }
}
