//! XOR example using the NEAT solver.
//!
//! Evolves a layered network that approximates XOR, the classic
//! neuroevolution benchmark.
//!
//! Run with: `cargo run --example xor`

use std::error::Error;

use symbios_ga::{DataEntry, Member, NeatConfig, NeatSolver, SolverOptions};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    println!("NEAT XOR Example");
    println!("================\n");

    let data = vec![
        DataEntry::new(vec![0.0, 0.0], vec![0.0]),
        DataEntry::new(vec![0.0, 1.0], vec![1.0]),
        DataEntry::new(vec![1.0, 0.0], vec![1.0]),
        DataEntry::new(vec![1.0, 1.0], vec![0.0]),
    ];

    let config = NeatConfig {
        add_connection_chance: 0.3,
        add_node_chance: 0.1,
        weight_mutation_chance: 0.5,
        ..NeatConfig::new(2, 1)
    };

    let options = SolverOptions {
        population_size: 150,
        max_generations: 100,
        mutation_chance: 0.8,
        n_batches: 4,
        verbose: true,
        seed: Some(42),
        ..SolverOptions::default()
    };

    println!("Population: {}", options.population_size);
    println!("Generations: {}", options.max_generations);
    println!("Batches: {}", options.n_batches);
    println!();

    let champion = NeatSolver::new(config, options, data.clone())?.solve()?;

    println!();
    println!("Evolution Complete!");
    println!("==================");
    println!("Best fitness: {}", champion.fitness_score());
    println!("Nodes: {}", champion.nodes().len());
    println!("Connections: {}", champion.num_enabled_connections());
    println!("Hidden nodes: {}", champion.hidden_ids().len());

    println!("\nChampion XOR outputs:");
    for entry in &data {
        let output = champion.feed(&entry.input)?[0];
        let expected = entry.output[0];
        let rounded = if output > 0.5 { 1.0 } else { 0.0 };
        let status = if (rounded - expected).abs() < 0.1 {
            "✓"
        } else {
            "✗"
        };
        println!(
            "  {} XOR {} = {:.4} (expected {}) {}",
            entry.input[0], entry.input[1], output, expected, status
        );
    }

    Ok(())
}
