//! Single-machine scheduling with a custom [`Member`].
//!
//! Searches for an order of 15 jobs that minimises total tardiness, i.e. the
//! sum of how far past its due time each job finishes.
//!
//! Run with: `cargo run --example scheduling`

use std::convert::Infallible;

use rand::seq::SliceRandom;
use rand::Rng;
use symbios_ga::{Member, MemberData, Solver, SolverOptions};

const N_JOBS: usize = 15;
const MAX_TARDINESS: u32 = 1000;

#[derive(Debug, Clone, Copy)]
struct Job {
    execution_time: u32,
    due_time: u32,
}

const fn job(execution_time: u32, due_time: u32) -> Job {
    Job {
        execution_time,
        due_time,
    }
}

const JOBS: [Job; N_JOBS] = [
    job(4, 10),
    job(3, 8),
    job(2, 7),
    job(5, 12),
    job(7, 15),
    job(3, 14),
    job(6, 13),
    job(2, 9),
    job(4, 11),
    job(5, 18),
    job(6, 20),
    job(2, 10),
    job(3, 17),
    job(5, 16),
    job(4, 19),
];

/// Total tardiness of a job order, capped at `MAX_TARDINESS`.
///
/// Time is discrete: a job starting at `t` occupies slots `t..t + execution_time`.
fn tardiness(sequence: &[usize; N_JOBS]) -> u32 {
    let mut total = 0;
    let mut start = 0;
    for &id in sequence {
        let end = start + JOBS[id].execution_time - 1;
        total += end.saturating_sub(JOBS[id].due_time);
        start = end + 1;
    }
    total.min(MAX_TARDINESS)
}

#[derive(Debug, Clone)]
struct Schedule {
    data: MemberData,
    sequence: [usize; N_JOBS],
}

impl Schedule {
    fn random<R: Rng>(rng: &mut R) -> Self {
        let mut sequence: [usize; N_JOBS] = std::array::from_fn(|i| i);
        sequence.shuffle(rng);
        Self {
            data: MemberData::default(),
            sequence,
        }
    }
}

impl Member for Schedule {
    type Context = ();
    type Error = Infallible;

    fn fitness_score(&self) -> u32 {
        self.data.fitness_score
    }

    fn survival_chance(&self) -> f64 {
        self.data.survival_chance
    }

    fn set_survival_chance(&mut self, chance: f64) {
        self.data.survival_chance = chance;
    }

    fn compute_fitness(&mut self, _ctx: &()) -> Result<(), Infallible> {
        // MAX^2 - tardiness^2: low tardiness scores high
        let t = tardiness(&self.sequence);
        self.data.fitness_score = (MAX_TARDINESS + t) * (MAX_TARDINESS - t);
        Ok(())
    }

    fn crossover<R: Rng>(&self, other: &Self, _rng: &mut R, _ctx: &()) -> Self {
        let fitter = if self.fitness_score() >= other.fitness_score() {
            self
        } else {
            other
        };
        Self {
            data: MemberData::default(),
            sequence: fitter.sequence,
        }
    }

    fn mutate<R: Rng>(&mut self, rng: &mut R, _ctx: &()) {
        self.sequence.shuffle(rng);
    }
}

fn main() -> Result<(), symbios_ga::SolverError> {
    tracing_subscriber::fmt::init();

    let options = SolverOptions {
        population_size: 1000,
        max_generations: 300,
        mutation_chance: 0.05,
        n_batches: 10,
        verbose: true,
        ..SolverOptions::default()
    };

    let mut rng = rand::rng();
    let population = (0..options.population_size)
        .map(|_| Schedule::random(&mut rng))
        .collect();

    let best = Solver::new(population, options, ())?.solve()?;

    println!("Best sequence: {:?}", best.sequence);
    println!("Best tardiness: {}", tardiness(&best.sequence));
    Ok(())
}
