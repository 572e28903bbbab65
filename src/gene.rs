//! Gene types for NEAT genomes.
//!
//! This module defines the fundamental building blocks of NEAT networks:
//! - [`NodeGene`]: a neuron placed on a layer
//! - [`ConnectionGene`]: a weighted, lineage-tagged link between two nodes

use serde::{Deserialize, Serialize};

use crate::activation::Activation;

/// A node gene representing a neuron in the NEAT network.
///
/// The `id` is the node's position in its genome's node list, so ids are
/// directly comparable between genomes that grew the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGene {
    /// Position of this node in the genome's node list.
    pub id: usize,
    /// Layer index: 0 for inputs, the configured maximum depth for outputs.
    pub layer: u32,
    /// The activation function applied to this node's accumulator.
    pub activation: Activation,
}

impl NodeGene {
    /// Create a new node.
    #[must_use]
    pub const fn new(id: usize, layer: u32, activation: Activation) -> Self {
        Self {
            id,
            layer,
            activation,
        }
    }
}

/// The (sender, receiver) pair identifying a structural connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionKey {
    /// Node the signal leaves from.
    pub sender: usize,
    /// Node the signal arrives at.
    pub receiver: usize,
}

impl ConnectionKey {
    #[must_use]
    pub const fn new(sender: usize, receiver: usize) -> Self {
        Self { sender, receiver }
    }
}

/// A connection gene representing a weighted link between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionGene {
    /// Endpoints of this connection.
    pub key: ConnectionKey,
    /// The connection weight.
    pub weight: f64,
    /// Disabled connections are skipped during evaluation but kept for crossover.
    pub enabled: bool,
    /// Lineage tag assigned by the innovation registry when the structure first appeared.
    pub innovation: u64,
}

impl ConnectionGene {
    /// Create a new enabled connection.
    #[must_use]
    pub const fn new(key: ConnectionKey, weight: f64, innovation: u64) -> Self {
        Self {
            key,
            weight,
            enabled: true,
            innovation,
        }
    }
}
