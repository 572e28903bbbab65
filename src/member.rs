//! The capability contract every candidate solution implements.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A single individual of the population.
///
/// The solver is generic over this trait and never looks inside a member;
/// it only reads and writes the two bookkeeping fields and calls the
/// genetic operators.
///
/// # Thread Safety
///
/// Members are evaluated and bred on several worker threads at once, each
/// touching only its own members. Anything shared between members must live
/// in [`Context`](Member::Context) behind proper synchronization.
///
/// # Example
///
/// ```rust
/// use rand::Rng;
/// use symbios_ga::{Member, MemberData};
///
/// #[derive(Clone)]
/// struct Guess {
///     data: MemberData,
///     value: u32,
/// }
///
/// impl Member for Guess {
///     type Context = u32; // the number to guess
///     type Error = std::convert::Infallible;
///
///     fn fitness_score(&self) -> u32 {
///         self.data.fitness_score
///     }
///     fn survival_chance(&self) -> f64 {
///         self.data.survival_chance
///     }
///     fn set_survival_chance(&mut self, chance: f64) {
///         self.data.survival_chance = chance;
///     }
///     fn compute_fitness(&mut self, target: &u32) -> Result<(), Self::Error> {
///         self.data.fitness_score = 100u32.saturating_sub(self.value.abs_diff(*target));
///         Ok(())
///     }
///     fn crossover<R: Rng>(&self, other: &Self, _rng: &mut R, _ctx: &u32) -> Self {
///         Guess { data: MemberData::default(), value: (self.value + other.value) / 2 }
///     }
///     fn mutate<R: Rng>(&mut self, rng: &mut R, _ctx: &u32) {
///         self.value = rng.random_range(0..100);
///     }
/// }
/// ```
pub trait Member: Send + Sync + Sized {
    /// Run-scoped collaborators shared by all members (evaluation data,
    /// innovation registries, ...). Owned by the solver.
    type Context: Sync;

    /// Failure raised by [`compute_fitness`](Member::compute_fitness).
    type Error: std::error::Error + Send + Sync + 'static;

    /// The most recently computed fitness score. Higher is better.
    fn fitness_score(&self) -> u32;

    /// Probability weight used when this member is picked as a parent.
    fn survival_chance(&self) -> f64;

    /// Set by the solver once per generation.
    fn set_survival_chance(&mut self, chance: f64);

    /// Compute and store this member's fitness score.
    ///
    /// # Errors
    ///
    /// An error aborts the whole run.
    fn compute_fitness(&mut self, ctx: &Self::Context) -> Result<(), Self::Error>;

    /// Create a child combining this member with `other`. Neither parent is
    /// modified.
    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R, ctx: &Self::Context) -> Self;

    /// Randomly modify this member in place.
    fn mutate<R: Rng>(&mut self, rng: &mut R, ctx: &Self::Context);

    /// Genetic distance to `other`, used when speciation is enabled.
    ///
    /// Callers must not assume the measure is symmetric.
    fn distance(&self, _other: &Self, _ctx: &Self::Context) -> f64 {
        0.0
    }

    /// Receive this member's distance to every member of the population, in
    /// population order (its own entry included).
    fn record_distances(&mut self, _distances: &[f64], _ctx: &Self::Context) {}

    /// Called once per generation, before any fitness is computed.
    fn begin_generation(_ctx: &Self::Context) {}
}

/// The bookkeeping every member carries, meant to be embedded in a custom
/// member type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberData {
    pub fitness_score: u32,
    pub survival_chance: f64,
}
