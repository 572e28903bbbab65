//! Benchmarks for symbios-ga.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use symbios_ga::{
    build_batches, DataEntry, Member, NeatConfig, NeatContext, NeatGenome, NeatSolver,
    SolverOptions,
};

fn xor_data() -> Vec<DataEntry> {
    vec![
        DataEntry::new(vec![0.0, 0.0], vec![0.0]),
        DataEntry::new(vec![0.0, 1.0], vec![1.0]),
        DataEntry::new(vec![1.0, 0.0], vec![1.0]),
        DataEntry::new(vec![1.0, 1.0], vec![0.0]),
    ]
}

/// A genome grown by repeated structural mutation.
fn grown_genome(seed: u64, steps: usize, ctx: &NeatContext) -> NeatGenome {
    let config = NeatConfig {
        add_connection_chance: 0.6,
        add_node_chance: 0.2,
        ..NeatConfig::new(4, 2)
    };
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut genome = NeatGenome::minimal(config);
    for _ in 0..steps {
        genome.mutate(&mut rng, ctx);
    }
    genome
}

fn bench_build_batches(c: &mut Criterion) {
    c.bench_function("build_batches_10k_16", |b| {
        b.iter(|| black_box(build_batches(black_box(10_000), black_box(16))));
    });
}

fn bench_mutation(c: &mut Criterion) {
    let ctx = NeatContext::new(Vec::new());
    let genome = grown_genome(42, 50, &ctx);
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    c.bench_function("genome_mutation", |b| {
        let mut g = genome.clone();
        b.iter(|| {
            g.mutate(&mut rng, &ctx);
            black_box(&g);
        });
    });
}

fn bench_crossover(c: &mut Criterion) {
    let ctx = NeatContext::new(Vec::new());
    let parent1 = grown_genome(1, 50, &ctx);
    let parent2 = grown_genome(2, 50, &ctx);
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    c.bench_function("genome_crossover", |b| {
        b.iter(|| {
            black_box(parent1.crossover(&parent2, &mut rng, &ctx));
        });
    });
}

fn bench_feed(c: &mut Criterion) {
    let ctx = NeatContext::new(Vec::new());
    let genome = grown_genome(7, 80, &ctx);

    c.bench_function("genome_feed", |b| {
        b.iter(|| {
            black_box(genome.feed(black_box(&[0.5, -0.5, 0.25, 1.0])).ok());
        });
    });
}

fn bench_compatibility_distance(c: &mut Criterion) {
    let ctx = NeatContext::new(Vec::new());
    let genome1 = grown_genome(3, 80, &ctx);
    let genome2 = grown_genome(4, 80, &ctx);

    c.bench_function("compatibility_distance", |b| {
        b.iter(|| {
            black_box(genome1.compatibility_distance(&genome2));
        });
    });
}

fn bench_neat_run(c: &mut Criterion) {
    let options = SolverOptions {
        population_size: 50,
        max_generations: 5,
        mutation_chance: 0.5,
        n_batches: 4,
        seed: Some(42),
        ..SolverOptions::default()
    };

    c.bench_function("neat_xor_50x5", |b| {
        b.iter_batched(
            || NeatSolver::new(NeatConfig::new(2, 1), options.clone(), xor_data()),
            |solver| black_box(solver.and_then(NeatSolver::solve).ok()),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_build_batches,
    bench_mutation,
    bench_crossover,
    bench_feed,
    bench_compatibility_distance,
    bench_neat_run,
);
criterion_main!(benches);
