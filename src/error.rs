//! Error types for the solver.

use thiserror::Error;

/// Errors reported by [`Solver`](crate::Solver) construction and runs.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The configured population size is zero.
    #[error("population size must be greater than zero")]
    EmptyPopulation,
    /// The initial population does not have the configured size.
    #[error("initial population doesn't match population size (expected {expected}, found {found})")]
    PopulationMismatch { expected: usize, found: usize },
    /// The run would never evaluate a generation.
    #[error("max generations must be greater than zero")]
    NoGenerations,
    /// The mutation chance is not a probability.
    #[error("mutation chance must be within [0, 1], got {0}")]
    InvalidMutationChance(f64),
    /// The worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// A member failed to compute its fitness; the run is aborted.
    #[error("fitness evaluation failed for member {index}: {source}")]
    Fitness {
        index: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl SolverError {
    pub(crate) fn fitness<E>(index: usize, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Fitness {
            index,
            source: Box::new(source),
        }
    }
}
