//! Running the generation engine on NEAT genomes.

use crate::error::SolverError;
use crate::evaluator::{DataEntry, DataSet};
use crate::genome::{NeatConfig, NeatGenome};
use crate::innovation::InnovationRegistry;
use crate::solver::{Solver, SolverOptions};

/// Everything NEAT genomes share during a run.
///
/// The registry is cleared at the start of every generation, so identical
/// structural mutations made within one generation receive the same
/// innovation numbers.
#[derive(Debug, Default)]
pub struct NeatContext {
    registry: InnovationRegistry,
    data: DataSet,
}

impl NeatContext {
    #[must_use]
    pub fn new(data: DataSet) -> Self {
        Self {
            registry: InnovationRegistry::new(),
            data,
        }
    }

    /// Evaluation data, fixed for the whole run.
    #[must_use]
    pub fn data(&self) -> &[DataEntry] {
        &self.data
    }

    #[must_use]
    pub const fn registry(&self) -> &InnovationRegistry {
        &self.registry
    }
}

/// A [`Solver`] over a population of minimal NEAT genomes.
///
/// Speciation is always on: a genome's fitness is shared among the genomes
/// similar to it.
#[derive(Debug)]
pub struct NeatSolver {
    solver: Solver<NeatGenome>,
}

impl NeatSolver {
    /// Build a solver whose first generation is `options.population_size`
    /// unconnected genomes shaped by `config`.
    ///
    /// # Errors
    ///
    /// See [`Solver::new`].
    pub fn new(
        config: NeatConfig,
        mut options: SolverOptions,
        data: DataSet,
    ) -> Result<Self, SolverError> {
        if !options.speciation {
            tracing::debug!("enabling speciation for NEAT run");
            options.speciation = true;
        }

        let population = (0..options.population_size)
            .map(|_| NeatGenome::minimal(config.clone()))
            .collect();
        let solver = Solver::new(population, options, NeatContext::new(data))?;
        Ok(Self { solver })
    }

    #[must_use]
    pub const fn solver(&self) -> &Solver<NeatGenome> {
        &self.solver
    }

    /// Run to the last generation and return its fittest genome.
    ///
    /// # Errors
    ///
    /// Fails if a genome cannot be evaluated against the data set, e.g. when
    /// an entry does not match the configured input/output counts.
    pub fn solve(self) -> Result<NeatGenome, SolverError> {
        self.solver.solve()
    }
}
