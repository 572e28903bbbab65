//! The generation engine.
//!
//! A [`Solver`] owns one run: the current population, the run context shared
//! by all members, and a worker pool with one thread per batch. Every
//! generation goes through the same phases, each of which fans out over the
//! batches and waits for all of them before the next phase starts:
//!
//! 1. distances (only with speciation),
//! 2. fitness, summed through an atomic counter,
//! 3. survival chances (single-threaded),
//! 4. breeding into a fresh population.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

use crate::batching::{build_batches, split_batches_mut, BatchRange};
use crate::error::SolverError;
use crate::member::Member;

/// User-defined parameters of a genetic algorithm run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Number of members in each generation.
    pub population_size: usize,
    /// Number of generations to simulate.
    pub max_generations: u32,
    /// Chance that a newly bred member is mutated.
    pub mutation_chance: f64,
    /// Requested number of batches (and worker threads); clamped to
    /// `[1, population_size]`.
    pub n_batches: usize,
    /// Compute pairwise distances before evaluating fitness.
    pub speciation: bool,
    /// Report the best fitness of every generation at `info` level.
    pub verbose: bool,
    /// Seed for parent selection and breeding. `None` draws one from the
    /// thread RNG.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 100,
            mutation_chance: 0.05,
            n_batches: 1,
            speciation: false,
            verbose: false,
            seed: None,
        }
    }
}

/// State of a single run of the genetic algorithm.
pub struct Solver<M: Member> {
    population: Vec<M>,
    options: SolverOptions,
    context: M::Context,
    batches: Vec<BatchRange>,
    pool: ThreadPool,
    rng: ChaCha8Rng,
    generation: u32,
}

impl<M: Member> std::fmt::Debug for Solver<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver")
            .field("options", &self.options)
            .field("batches", &self.batches)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl<M: Member> Solver<M> {
    /// Create a solver for the given first generation.
    ///
    /// # Errors
    ///
    /// Fails if the population size is zero or differs from `members.len()`,
    /// if `max_generations` is zero, if `mutation_chance` is not in `[0, 1]`,
    /// or if the worker pool cannot be started.
    pub fn new(
        members: Vec<M>,
        mut options: SolverOptions,
        context: M::Context,
    ) -> Result<Self, SolverError> {
        if options.population_size == 0 {
            return Err(SolverError::EmptyPopulation);
        }
        if members.len() != options.population_size {
            return Err(SolverError::PopulationMismatch {
                expected: options.population_size,
                found: members.len(),
            });
        }
        if options.max_generations == 0 {
            return Err(SolverError::NoGenerations);
        }
        if !(0.0..=1.0).contains(&options.mutation_chance) {
            return Err(SolverError::InvalidMutationChance(options.mutation_chance));
        }

        options.n_batches = options.n_batches.clamp(1, options.population_size);
        let batches = build_batches(options.population_size, options.n_batches);
        let pool = ThreadPoolBuilder::new()
            .num_threads(options.n_batches)
            .thread_name(|i| format!("ga-worker-{i}"))
            .build()?;
        let rng = match options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };

        Ok(Self {
            population: members,
            options,
            context,
            batches,
            pool,
            rng,
            generation: 1,
        })
    }

    /// The current population.
    #[must_use]
    pub fn population(&self) -> &[M] {
        &self.population
    }

    /// The generation about to be (or being) evaluated, starting at 1.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Options in effect, with the batch count already clamped.
    #[must_use]
    pub const fn options(&self) -> &SolverOptions {
        &self.options
    }

    #[must_use]
    pub const fn context(&self) -> &M::Context {
        &self.context
    }

    #[must_use]
    pub fn batches(&self) -> &[BatchRange] {
        &self.batches
    }

    /// Run the algorithm up to the last generation and return the member of
    /// that generation with the highest fitness score.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Fitness`] if any member fails to compute its
    /// fitness; the run stops at that generation.
    pub fn solve(mut self) -> Result<M, SolverError> {
        tracing::debug!(
            population_size = self.options.population_size,
            max_generations = self.options.max_generations,
            mutation_chance = self.options.mutation_chance,
            n_batches = self.options.n_batches,
            speciation = self.options.speciation,
            "starting genetic algorithm"
        );

        loop {
            if self.options.speciation {
                self.compute_distances();
            }

            let fitness_sum = self.compute_fitness()?;
            let best = self.best_index();

            tracing::debug!(
                generation = self.generation,
                best_fitness = self.population[best].fitness_score(),
                fitness_sum,
                "generation evaluated"
            );
            if self.options.verbose {
                tracing::info!(
                    "[GENERATION {}] Best fitness score: {}",
                    self.generation,
                    self.population[best].fitness_score()
                );
            }

            if self.generation >= self.options.max_generations {
                return Ok(self.population.swap_remove(best));
            }

            self.assign_survival_chances(fitness_sum);
            self.population = self.breed();
            self.generation += 1;
        }
    }

    /// Give every member its distance to every other member.
    fn compute_distances(&mut self) {
        let population = &self.population;
        let context = &self.context;

        let rows: Vec<Vec<Vec<f64>>> = self.pool.install(|| {
            self.batches
                .par_iter()
                .map(|batch| {
                    batch
                        .indices()
                        .map(|i| {
                            population
                                .iter()
                                .map(|other| population[i].distance(other, context))
                                .collect()
                        })
                        .collect()
                })
                .collect()
        });

        for (member, row) in self.population.iter_mut().zip(rows.into_iter().flatten()) {
            member.record_distances(&row, &self.context);
        }
    }

    /// Compute every member's fitness and return the total.
    fn compute_fitness(&mut self) -> Result<u64, SolverError> {
        M::begin_generation(&self.context);

        let context = &self.context;
        let fitness_sum = AtomicU64::new(0);
        let chunks = split_batches_mut(&mut self.population, &self.batches);

        self.pool.install(|| {
            chunks
                .into_par_iter()
                .zip(self.batches.par_iter())
                .try_for_each(|(chunk, batch)| {
                    for (member, index) in chunk.iter_mut().zip(batch.indices()) {
                        member
                            .compute_fitness(context)
                            .map_err(|e| SolverError::fitness(index, e))?;
                        fitness_sum.fetch_add(u64::from(member.fitness_score()), Ordering::SeqCst);
                    }
                    Ok::<(), SolverError>(())
                })
        })?;

        Ok(fitness_sum.into_inner())
    }

    /// Index of the fittest member; ties go to the earliest one.
    fn best_index(&self) -> usize {
        let mut best = 0;
        for (i, member) in self.population.iter().enumerate().skip(1) {
            if member.fitness_score() > self.population[best].fitness_score() {
                best = i;
            }
        }
        best
    }

    #[allow(clippy::cast_precision_loss)]
    fn assign_survival_chances(&mut self, fitness_sum: u64) {
        let uniform = 1.0 / self.population.len() as f64;
        for member in &mut self.population {
            let chance = if fitness_sum == 0 {
                uniform
            } else {
                f64::from(member.fitness_score()) / fitness_sum as f64
            };
            member.set_survival_chance(chance);
        }
    }

    /// Produce the next generation. Each batch breeds the members of its own
    /// index range with its own RNG; results are concatenated in batch order.
    fn breed(&mut self) -> Vec<M> {
        let seeds: Vec<u64> = self.batches.iter().map(|_| self.rng.random()).collect();
        let population = &self.population;
        let context = &self.context;
        let mutation_chance = self.options.mutation_chance;

        let children: Vec<Vec<M>> = self.pool.install(|| {
            self.batches
                .par_iter()
                .zip(seeds)
                .map(|(batch, seed)| {
                    let mut rng = ChaCha8Rng::seed_from_u64(seed);
                    batch
                        .indices()
                        .map(|_| {
                            let first = pick_member(population, &mut rng);
                            let second = pick_member(population, &mut rng);
                            let mut child = first.crossover(second, &mut rng, context);
                            if rng.random::<f64>() < mutation_chance {
                                child.mutate(&mut rng, context);
                            }
                            child
                        })
                        .collect()
                })
                .collect()
        });

        children.into_iter().flatten().collect()
    }
}

/// Pick a random member; members with a higher survival chance are more
/// likely to be picked.
///
/// Falls back to the last member if rounding leaves the draw unmatched.
///
/// # Panics
///
/// Panics if `population` is empty.
pub fn pick_member<'a, M: Member, R: Rng>(population: &'a [M], rng: &mut R) -> &'a M {
    let mut draw = rng.random::<f64>();
    for member in population {
        let chance = member.survival_chance();
        if draw < chance {
            return member;
        }
        draw -= chance;
    }
    &population[population.len() - 1]
}
