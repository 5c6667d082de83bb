//! Criterion benchmarks for queens-ga.
//!
//! Measures fitness evaluation, the permutation crossovers and complete
//! runs at a few board sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use queens_ga::ga::init::random_permutation;
use queens_ga::ga::{FitnessEvaluator, GaConfig, GaRunner, Recombination};
use queens_ga::random::create_rng;

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_fitness_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("fitness_batch");

    for n in [8usize, 32, 128] {
        let mut rng = create_rng(42);
        let genomes: Vec<Vec<usize>> = (0..100).map(|_| random_permutation(n, &mut rng)).collect();

        group.bench_with_input(BenchmarkId::new("uncached", n), &genomes, |b, g| {
            let mut evaluator = FitnessEvaluator::new(n);
            b.iter(|| black_box(evaluator.evaluate_batch(black_box(g))))
        });
        group.bench_with_input(BenchmarkId::new("cached", n), &genomes, |b, g| {
            let mut evaluator = FitnessEvaluator::new(n).with_cache(1024);
            b.iter(|| black_box(evaluator.evaluate_batch(black_box(g))))
        });
    }
    group.finish();
}

fn bench_crossover(c: &mut Criterion) {
    let mut group = c.benchmark_group("crossover");

    for op in [Recombination::Pmx, Recombination::Ox, Recombination::PmxRepair] {
        for n in [8usize, 64] {
            let mut rng = create_rng(42);
            let p1 = random_permutation(n, &mut rng);
            let p2 = random_permutation(n, &mut rng);
            group.bench_with_input(
                BenchmarkId::new(op.name(), n),
                &(p1, p2),
                |b, (p1, p2)| b.iter(|| black_box(op.crossover(p1, p2, &mut rng))),
            );
        }
    }
    group.finish();
}

fn bench_ga_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("ga_run");
    group.sample_size(10);

    for (n, pop, gen) in [(8usize, 100usize, 200usize), (16, 100, 100), (32, 200, 50)] {
        let config = GaConfig {
            genome_size: n,
            population_size: pop,
            seed: Some(42),
            ..GaConfig::default()
        }
        .with_max_generations(gen);
        group.bench_with_input(
            BenchmarkId::new(format!("n{}_p{}_g{}", n, pop, gen), n),
            &config,
            |b, c| {
                b.iter(|| {
                    let result = GaRunner::run(black_box(c));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_fitness_batch, bench_crossover, bench_ga_run);
criterion_main!(benches);
