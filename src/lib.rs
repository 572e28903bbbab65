//! # Symbios GA
//!
//! A batch-parallel genetic algorithm engine, with a NEAT genome built on
//! top of it.
//!
//! ## Features
//!
//! - **Generic Engine**: [`Solver`] runs any type implementing [`Member`];
//!   it only needs a fitness score, a survival chance, crossover and mutation
//! - **Batch Parallelism**: the population is split into contiguous batches,
//!   one worker thread each, with a barrier between generation phases
//! - **Fitness-Proportional Selection**: parents are drawn with probability
//!   proportional to fitness, uniformly when every fitness is zero
//! - **NEAT Genome**: layered feed-forward networks that grow connections and
//!   hidden nodes, with per-generation innovation numbers and fitness sharing
//!
//! ## Quick Start
//!
//! ```rust
//! use symbios_ga::{DataEntry, NeatConfig, NeatSolver, SolverOptions};
//!
//! let data = vec![
//!     DataEntry::new(vec![0.0, 0.0], vec![0.0]),
//!     DataEntry::new(vec![0.0, 1.0], vec![1.0]),
//!     DataEntry::new(vec![1.0, 0.0], vec![1.0]),
//!     DataEntry::new(vec![1.0, 1.0], vec![0.0]),
//! ];
//! let options = SolverOptions {
//!     population_size: 20,
//!     max_generations: 5,
//!     mutation_chance: 0.3,
//!     n_batches: 2,
//!     seed: Some(42),
//!     ..SolverOptions::default()
//! };
//!
//! let solver = NeatSolver::new(NeatConfig::new(2, 1), options, data).unwrap();
//! let best = solver.solve().unwrap();
//! println!("XOR(1, 0) = {:?}", best.feed(&[1.0, 0.0]).unwrap());
//! ```
//!
//! ## Architecture
//!
//! ### Generations
//!
//! Each generation runs up to four phases over the batches, each finishing
//! before the next begins: pairwise distances (with speciation), fitness,
//! survival chances, and breeding. Fitness is summed through an atomic
//! counter; breeding writes every batch's children into its own buffer and
//! the buffers are concatenated in batch order.
//!
//! ### Innovation Numbers
//!
//! Structural mutations ask an [`InnovationRegistry`] for their genes. The
//! same mutation on the same connection within one generation yields the
//! same innovation number; the registry is cleared between generations but
//! its counter keeps increasing.
//!
//! ### Layered Evaluation
//!
//! Every node sits on a layer; inputs on layer 0, outputs on the maximum
//! depth. Connections always point to a strictly higher layer, so a network
//! is evaluated by processing connections grouped by sender layer.

pub mod activation;
pub mod batching;
pub mod error;
pub mod evaluator;
pub mod gene;
pub mod genome;
pub mod innovation;
pub mod member;
pub mod neat;
pub mod solver;

// Re-exports for convenience
pub use activation::Activation;
pub use batching::{build_batches, BatchRange};
pub use error::SolverError;
pub use evaluator::{DataEntry, DataSet, EvaluatorError, LayeredNetwork};
pub use gene::{ConnectionGene, ConnectionKey, NodeGene};
pub use genome::{NeatConfig, NeatGenome};
pub use innovation::{InnovationRegistry, MutationKind, MutationRecord};
pub use member::{Member, MemberData};
pub use neat::{NeatContext, NeatSolver};
pub use solver::{pick_member, Solver, SolverOptions};
