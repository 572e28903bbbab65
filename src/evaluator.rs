//! Layered feed-forward evaluation of NEAT genomes.
//!
//! A [`LayeredNetwork`] is a compiled, evaluation-ready view of a genome:
//! enabled connections are bucketed by the layer of their sender node, and
//! buckets are processed in increasing layer order. Because every connection
//! points strictly forward, a node's accumulator is complete before any of
//! its outgoing connections are read.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activation::Activation;
use crate::genome::NeatGenome;

/// Error type for network evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluatorError {
    /// The input vector does not match the number of input nodes.
    #[error("input length mismatch: expected {expected}, got {found}")]
    InputLength { expected: usize, found: usize },
    /// A data entry does not match the network's input/output counts.
    #[error(
        "data entry {entry} has shape {inputs}x{outputs}, network expects {expected_inputs}x{expected_outputs}"
    )]
    DataShape {
        entry: usize,
        inputs: usize,
        outputs: usize,
        expected_inputs: usize,
        expected_outputs: usize,
    },
}

/// One training sample: an input vector and the output expected for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEntry {
    pub input: Vec<f64>,
    pub output: Vec<f64>,
}

impl DataEntry {
    #[must_use]
    pub fn new(input: Vec<f64>, output: Vec<f64>) -> Self {
        Self { input, output }
    }
}

/// Ordered evaluation data, fixed for the duration of a run.
pub type DataSet = Vec<DataEntry>;

#[derive(Debug, Clone, Copy)]
struct Link {
    sender: usize,
    receiver: usize,
    weight: f64,
}

/// A compiled layered network.
#[derive(Debug, Clone)]
pub struct LayeredNetwork {
    /// Activation function of every node, indexed by node id.
    activations: Vec<Activation>,
    /// Enabled connections grouped by sender layer, lowest layer first.
    layers: Vec<Vec<Link>>,
    num_inputs: usize,
    num_outputs: usize,
}

impl LayeredNetwork {
    /// Compile a genome into a layered network.
    #[must_use]
    pub fn new(genome: &NeatGenome) -> Self {
        let nodes = genome.nodes();
        let depth = nodes.iter().map(|n| n.layer).max().unwrap_or(0) as usize;

        let mut layers: Vec<Vec<Link>> = vec![Vec::new(); depth + 1];
        for conn in genome.connections().iter().filter(|c| c.enabled) {
            let (Some(sender), Some(_)) = (nodes.get(conn.key.sender), nodes.get(conn.key.receiver))
            else {
                continue;
            };
            layers[sender.layer as usize].push(Link {
                sender: conn.key.sender,
                receiver: conn.key.receiver,
                weight: conn.weight,
            });
        }

        Self {
            activations: nodes.iter().map(|n| n.activation).collect(),
            layers,
            num_inputs: genome.num_inputs(),
            num_outputs: genome.num_outputs(),
        }
    }

    /// Propagate `input` through the network and return the output vector
    /// in output-node order.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError::InputLength`] if `input` does not have one
    /// value per input node.
    pub fn evaluate(&self, input: &[f64]) -> Result<Vec<f64>, EvaluatorError> {
        if input.len() != self.num_inputs {
            return Err(EvaluatorError::InputLength {
                expected: self.num_inputs,
                found: input.len(),
            });
        }

        let mut accumulators = vec![0.0; self.activations.len()];
        accumulators[..self.num_inputs].copy_from_slice(input);

        for layer in &self.layers {
            for link in layer {
                let signal = self.activations[link.sender].apply(accumulators[link.sender]);
                accumulators[link.receiver] += signal * link.weight;
            }
        }

        let outputs = (self.num_inputs..self.num_inputs + self.num_outputs)
            .map(|id| self.activations[id].apply(accumulators[id]))
            .collect();
        Ok(outputs)
    }

    /// Check that a data entry fits this network.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError::DataShape`] on any length mismatch.
    pub fn check_entry(&self, index: usize, entry: &DataEntry) -> Result<(), EvaluatorError> {
        if entry.input.len() == self.num_inputs && entry.output.len() == self.num_outputs {
            return Ok(());
        }
        Err(EvaluatorError::DataShape {
            entry: index,
            inputs: entry.input.len(),
            outputs: entry.output.len(),
            expected_inputs: self.num_inputs,
            expected_outputs: self.num_outputs,
        })
    }

    #[must_use]
    pub const fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    #[must_use]
    pub const fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    /// Number of enabled connections compiled into the network.
    #[must_use]
    pub fn num_links(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::NeatConfig;
    use crate::innovation::InnovationRegistry;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_unconnected_outputs_are_sigmoid_of_zero() {
        let genome = NeatGenome::minimal(NeatConfig::new(2, 2));
        let network = LayeredNetwork::new(&genome);

        let outputs = network.evaluate(&[0.3, -0.7]).unwrap();
        assert_eq!(outputs.len(), 2);
        for out in outputs {
            assert!((out - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_single_connection_weight() {
        let registry = InnovationRegistry::new();
        let mut rng = test_rng();
        let mut genome = NeatGenome::minimal(NeatConfig::new(1, 1));
        genome.add_connection(0, 1, &registry, &mut rng).unwrap();
        genome.connections_mut()[0].weight = 2.0;

        let network = LayeredNetwork::new(&genome);
        let out = network.evaluate(&[1.5]).unwrap()[0];
        assert!((out - Activation::Sigmoid.apply(3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_hidden_node_uses_tanh() {
        let registry = InnovationRegistry::new();
        let mut rng = test_rng();
        let mut genome = NeatGenome::minimal(NeatConfig::new(1, 1));
        genome.add_connection(0, 1, &registry, &mut rng).unwrap();
        let hidden = genome.add_node(0, &registry, &mut rng).unwrap();
        for conn in genome.connections_mut() {
            conn.weight = 1.0;
        }

        let network = LayeredNetwork::new(&genome);
        let out = network.evaluate(&[0.5]).unwrap()[0];

        // direct path 0.5 plus tanh(0.5) through the hidden node
        let expected = Activation::Sigmoid.apply(0.5 + 0.5_f64.tanh());
        assert_eq!(genome.nodes()[hidden].layer, 1);
        assert!((out - expected).abs() < 1e-12);
    }

    #[test]
    fn test_disabled_connections_are_skipped() {
        let registry = InnovationRegistry::new();
        let mut rng = test_rng();
        let mut genome = NeatGenome::minimal(NeatConfig::new(1, 1));
        genome.add_connection(0, 1, &registry, &mut rng).unwrap();
        genome.connections_mut()[0].enabled = false;

        let network = LayeredNetwork::new(&genome);
        assert_eq!(network.num_links(), 0);
        assert!((network.evaluate(&[10.0]).unwrap()[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_input_length_mismatch() {
        let genome = NeatGenome::minimal(NeatConfig::new(2, 1));
        let network = LayeredNetwork::new(&genome);
        assert_eq!(
            network.evaluate(&[1.0]),
            Err(EvaluatorError::InputLength {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_check_entry() {
        let genome = NeatGenome::minimal(NeatConfig::new(2, 1));
        let network = LayeredNetwork::new(&genome);
        assert!(network
            .check_entry(0, &DataEntry::new(vec![0.0, 1.0], vec![1.0]))
            .is_ok());
        let err = network
            .check_entry(3, &DataEntry::new(vec![0.0, 1.0], vec![1.0, 0.0]))
            .unwrap_err();
        assert!(err.to_string().contains("data entry 3"));
    }
}
