//! NEAT genome implementation on a layered node graph.
//!
//! A [`NeatGenome`] keeps its nodes in a flat list (a node's id is its
//! position) and its connections ordered by innovation number. Every
//! connection points from a lower layer to a strictly higher one, so the
//! network is acyclic by construction and can be evaluated layer by layer.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::evaluator::{DataEntry, EvaluatorError, LayeredNetwork};
use crate::gene::{ConnectionGene, ConnectionKey, NodeGene};
use crate::innovation::{InnovationRegistry, MutationKind};
use crate::member::{Member, MemberData};
use crate::neat::NeatContext;

/// Configuration for NEAT genome creation, mutation and scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeatConfig {
    /// Number of input nodes.
    pub num_inputs: usize,
    /// Number of output nodes.
    pub num_outputs: usize,
    /// Layer of the output nodes; hidden nodes live strictly between 0 and this.
    pub max_depth: u32,
    /// Activation of nodes created by splitting a connection.
    pub hidden_activation: Activation,
    /// Activation of output nodes.
    pub output_activation: Activation,
    /// Probability that a mutation tries to add a connection.
    pub add_connection_chance: f64,
    /// Probability that a mutation tries to add a node (taken after `add_connection_chance`).
    pub add_node_chance: f64,
    /// Per-connection probability of replacing the weight during weight mutation.
    pub weight_mutation_chance: f64,
    /// Range for new weights: [-weight_range, weight_range].
    pub weight_range: f64,
    /// Coefficient for excess genes in compatibility distance.
    pub compatibility_excess_coeff: f64,
    /// Coefficient for disjoint genes in compatibility distance.
    pub compatibility_disjoint_coeff: f64,
    /// Coefficient for the mean weight difference of matching genes.
    pub compatibility_weight_coeff: f64,
    /// Genomes with fewer connections than this are not normalised by size.
    pub small_genome_threshold: usize,
    /// Distances below this count the other genome as similar.
    pub similarity_threshold: f64,
    /// Multiplier applied to the raw fitness before truncation.
    pub fitness_scale: f64,
    /// Power applied to `(num_outputs - error)` for each data entry.
    pub fitness_exponent: i32,
}

impl Default for NeatConfig {
    fn default() -> Self {
        Self {
            num_inputs: 2,
            num_outputs: 1,
            max_depth: 20,
            hidden_activation: Activation::Tanh,
            output_activation: Activation::Sigmoid,
            add_connection_chance: 0.3,
            add_node_chance: 0.05,
            weight_mutation_chance: 0.1,
            weight_range: 1.0,
            compatibility_excess_coeff: 1.0,
            compatibility_disjoint_coeff: 1.0,
            compatibility_weight_coeff: 0.4,
            small_genome_threshold: 20,
            similarity_threshold: 0.3,
            fitness_scale: 10_000.0,
            fitness_exponent: 2,
        }
    }
}

impl NeatConfig {
    /// Default configuration for a network of the given shape.
    #[must_use]
    pub fn new(num_inputs: usize, num_outputs: usize) -> Self {
        Self {
            num_inputs,
            num_outputs,
            ..Default::default()
        }
    }
}

/// A NEAT genome representing a layered feed-forward network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeatGenome {
    data: MemberData,
    nodes: Vec<NodeGene>,
    /// Ordered by innovation number.
    connections: Vec<ConnectionGene>,
    /// Number of population members closer than the similarity threshold.
    similar: u32,
    #[serde(default)]
    config: NeatConfig,
}

impl NeatGenome {
    /// Create a genome with only input and output nodes and no connections.
    ///
    /// Inputs get ids `0..num_inputs` on layer 0, outputs the following ids
    /// on layer `max_depth`.
    #[must_use]
    pub fn minimal(config: NeatConfig) -> Self {
        let inputs = (0..config.num_inputs).map(|id| NodeGene::new(id, 0, Activation::Identity));
        let outputs = (0..config.num_outputs).map(|i| {
            NodeGene::new(config.num_inputs + i, config.max_depth, config.output_activation)
        });
        let nodes = inputs.chain(outputs).collect();

        Self {
            data: MemberData::default(),
            nodes,
            connections: Vec::new(),
            similar: 0,
            config,
        }
    }

    #[must_use]
    pub fn nodes(&self) -> &[NodeGene] {
        &self.nodes
    }

    /// Connections ordered by innovation number.
    #[must_use]
    pub fn connections(&self) -> &[ConnectionGene] {
        &self.connections
    }

    /// Mutable access to connection weights and enabled flags.
    ///
    /// Innovation numbers and keys must not be changed through this slice.
    pub fn connections_mut(&mut self) -> &mut [ConnectionGene] {
        &mut self.connections
    }

    #[must_use]
    pub fn config(&self) -> &NeatConfig {
        &self.config
    }

    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.config.num_inputs
    }

    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.config.num_outputs
    }

    /// Number of population members found similar during the last speciation pass.
    #[must_use]
    pub const fn similar_count(&self) -> u32 {
        self.similar
    }

    /// Ids of nodes created by mutation.
    #[must_use]
    pub fn hidden_ids(&self) -> Vec<usize> {
        let first_hidden = self.config.num_inputs + self.config.num_outputs;
        self.nodes
            .iter()
            .filter(|n| n.id >= first_hidden)
            .map(|n| n.id)
            .collect()
    }

    /// Get the number of enabled connections.
    #[must_use]
    pub fn num_enabled_connections(&self) -> usize {
        self.connections.iter().filter(|c| c.enabled).count()
    }

    /// Find a connection by its endpoints.
    #[must_use]
    pub fn find_connection(&self, key: ConnectionKey) -> Option<&ConnectionGene> {
        self.connections.iter().find(|c| c.key == key)
    }

    /// Find a connection by its innovation number.
    #[must_use]
    pub fn find_connection_by_innovation(&self, innovation: u64) -> Option<&ConnectionGene> {
        self.connections
            .binary_search_by_key(&innovation, |c| c.innovation)
            .ok()
            .map(|idx| &self.connections[idx])
    }

    /// Whether `key` links two existing nodes from a lower to a strictly higher layer.
    fn is_forward(&self, key: ConnectionKey) -> bool {
        match (self.nodes.get(key.sender), self.nodes.get(key.receiver)) {
            (Some(sender), Some(receiver)) => sender.layer < receiver.layer,
            _ => false,
        }
    }

    /// Check the feed-forward invariant on every connection.
    #[must_use]
    pub fn is_feed_forward(&self) -> bool {
        self.connections.iter().all(|c| self.is_forward(c.key))
    }

    fn insert_connection(&mut self, connection: ConnectionGene) {
        let at = self
            .connections
            .partition_point(|c| c.innovation <= connection.innovation);
        self.connections.insert(at, connection);
    }

    fn random_weight<R: Rng>(&self, rng: &mut R) -> f64 {
        let range = self.config.weight_range;
        rng.random::<f64>() * 2.0 * range - range
    }

    /// Add a connection from `sender` to `receiver`.
    ///
    /// Returns the connection's innovation number, or `None` if the
    /// connection would be a self-loop, would not point to a strictly higher
    /// layer, already exists, or references an unknown node.
    pub fn add_connection<R: Rng>(
        &mut self,
        sender: usize,
        receiver: usize,
        registry: &InnovationRegistry,
        rng: &mut R,
    ) -> Option<u64> {
        let key = ConnectionKey::new(sender, receiver);
        if sender == receiver || !self.is_forward(key) || self.find_connection(key).is_some() {
            return None;
        }

        let weight = self.random_weight(rng);
        let connection = registry.get_or_create(key, MutationKind::AddConnection, weight);
        self.insert_connection(connection);
        Some(connection.innovation)
    }

    /// Add a node by splitting the connection at `conn_index`.
    ///
    /// The new node sits one layer above the connection's sender and is
    /// wired `sender -> node -> receiver`; the split connection is kept.
    /// Returns the new node's id, or `None` if the connection is disabled or
    /// the new layer would reach `max_depth` or the receiver's layer.
    pub fn add_node<R: Rng>(
        &mut self,
        conn_index: usize,
        registry: &InnovationRegistry,
        rng: &mut R,
    ) -> Option<usize> {
        let split = *self.connections.get(conn_index)?;
        if !split.enabled {
            return None;
        }

        let sender_layer = self.nodes.get(split.key.sender)?.layer;
        let receiver_layer = self.nodes.get(split.key.receiver)?.layer;
        let layer = sender_layer + 1;
        if layer >= self.config.max_depth || layer >= receiver_layer {
            return None;
        }

        let id = self.nodes.len();
        let weights = (self.random_weight(rng), self.random_weight(rng));
        let (incoming, outgoing) = registry.get_or_create_split(
            ConnectionKey::new(split.key.sender, id),
            ConnectionKey::new(id, split.key.receiver),
            weights,
        );

        self.nodes
            .push(NodeGene::new(id, layer, self.config.hidden_activation));
        self.insert_connection(incoming);
        self.insert_connection(outgoing);
        Some(id)
    }

    /// Replace each weight with a fresh random one with probability
    /// `weight_mutation_chance`.
    pub fn mutate_weights<R: Rng>(&mut self, rng: &mut R) {
        let chance = self.config.weight_mutation_chance;
        let range = self.config.weight_range;
        for conn in &mut self.connections {
            if rng.random::<f64>() < chance {
                conn.weight = rng.random::<f64>() * 2.0 * range - range;
            }
        }
    }

    /// Try to connect two random nodes.
    fn mutate_add_connection<R: Rng>(&mut self, registry: &InnovationRegistry, rng: &mut R) {
        if self.nodes.is_empty() {
            return;
        }
        let sender = rng.random_range(0..self.nodes.len());
        let receiver = rng.random_range(0..self.nodes.len());
        self.add_connection(sender, receiver, registry, rng);
    }

    /// Try to split a random connection.
    fn mutate_add_node<R: Rng>(&mut self, registry: &InnovationRegistry, rng: &mut R) {
        if self.connections.is_empty() {
            return;
        }
        let conn_index = rng.random_range(0..self.connections.len());
        self.add_node(conn_index, registry, rng);
    }

    /// Apply exactly one of: add connection, add node, mutate weights.
    ///
    /// Structural mutations that turn out to be invalid leave the genome
    /// unchanged.
    pub fn mutate_with<R: Rng>(&mut self, registry: &InnovationRegistry, rng: &mut R) {
        let roll = rng.random::<f64>();
        let add_connection = self.config.add_connection_chance;
        let add_node = add_connection + self.config.add_node_chance;

        if roll < add_connection {
            self.mutate_add_connection(registry, rng);
        } else if roll < add_node {
            self.mutate_add_node(registry, rng);
        } else {
            self.mutate_weights(rng);
        }
    }

    /// Compute compatibility distance to another genome for speciation.
    ///
    /// Connections are compared position by position in innovation order:
    /// equal innovations match, unequal ones are disjoint, and positions past
    /// the shorter genome are excess. Gene counts are normalised by the longer
    /// genome's length, floored at `small_genome_threshold`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compatibility_distance(&self, other: &Self) -> f64 {
        let longest = self.connections.len().max(other.connections.len());
        let mut matching = 0usize;
        let mut disjoint = 0usize;
        let mut excess = 0usize;
        let mut weight_diff_sum = 0.0;

        for i in 0..longest {
            match (self.connections.get(i), other.connections.get(i)) {
                (Some(a), Some(b)) if a.innovation == b.innovation => {
                    matching += 1;
                    weight_diff_sum += (a.weight - b.weight).abs();
                }
                (Some(_), Some(_)) => disjoint += 1,
                _ => excess += 1,
            }
        }

        let n = longest.max(self.config.small_genome_threshold).max(1) as f64;
        let avg_weight_diff = if matching > 0 {
            weight_diff_sum / matching as f64
        } else {
            0.0
        };

        (self.config.compatibility_excess_coeff * excess as f64 / n)
            + (self.config.compatibility_disjoint_coeff * disjoint as f64 / n)
            + (self.config.compatibility_weight_coeff * avg_weight_diff)
    }

    /// Feed an input vector through the network.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError::InputLength`] if `input` has the wrong length.
    pub fn feed(&self, input: &[f64]) -> Result<Vec<f64>, EvaluatorError> {
        LayeredNetwork::new(self).evaluate(input)
    }

    /// Score this genome against `data`, adjusted by its similar count.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError::DataShape`] if an entry does not match the
    /// network's input/output counts.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn evaluate_fitness(&self, data: &[DataEntry]) -> Result<u32, EvaluatorError> {
        let network = LayeredNetwork::new(self);
        let num_outputs = self.num_outputs() as f64;

        let mut raw = 0.0;
        for (index, entry) in data.iter().enumerate() {
            network.check_entry(index, entry)?;
            let outputs = network.evaluate(&entry.input)?;
            let error: f64 = outputs
                .iter()
                .zip(&entry.output)
                .map(|(out, expected)| (out - expected).abs())
                .sum();
            raw += (num_outputs - error).powi(self.config.fitness_exponent);
        }

        // zero when speciation is off
        let similar = self.similar.max(1);
        Ok((self.config.fitness_scale * raw / f64::from(similar)) as u32)
    }

    /// Count the distances below the similarity threshold.
    pub fn set_similar_from(&mut self, distances: &[f64]) {
        let threshold = self.config.similarity_threshold;
        let count = distances.iter().filter(|&&d| d < threshold).count();
        self.similar = u32::try_from(count).unwrap_or(u32::MAX);
    }
}

impl Member for NeatGenome {
    type Context = NeatContext;
    type Error = EvaluatorError;

    fn fitness_score(&self) -> u32 {
        self.data.fitness_score
    }

    fn survival_chance(&self) -> f64 {
        self.data.survival_chance
    }

    fn set_survival_chance(&mut self, chance: f64) {
        self.data.survival_chance = chance;
    }

    fn compute_fitness(&mut self, ctx: &NeatContext) -> Result<(), EvaluatorError> {
        self.data.fitness_score = self.evaluate_fitness(ctx.data())?;
        Ok(())
    }

    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R, _ctx: &NeatContext) -> Self {
        // `self` is the dominant parent: positions it lacks are never inherited.
        let mut child = Self::minimal(self.config.clone());
        child.nodes.clone_from(&self.nodes);
        if other.nodes.len() > self.nodes.len() {
            child
                .nodes
                .extend_from_slice(&other.nodes[self.nodes.len()..]);
        }

        let mut inherited = HashSet::with_capacity(self.connections.len());
        for (i, own) in self.connections.iter().enumerate() {
            let gene = match other.connections.get(i) {
                Some(theirs) if rng.random::<f64>() >= 0.5 => *theirs,
                _ => *own,
            };
            if child.is_forward(gene.key) && inherited.insert(gene.key) {
                child.connections.push(gene);
            }
        }
        child.connections.sort_by_key(|c| c.innovation);
        child
    }

    fn mutate<R: Rng>(&mut self, rng: &mut R, ctx: &NeatContext) {
        self.mutate_with(ctx.registry(), rng);
    }

    fn distance(&self, other: &Self, _ctx: &NeatContext) -> f64 {
        self.compatibility_distance(other)
    }

    fn record_distances(&mut self, distances: &[f64], _ctx: &NeatContext) {
        self.set_similar_from(distances);
    }

    fn begin_generation(ctx: &NeatContext) {
        ctx.registry().clear();
    }
}
