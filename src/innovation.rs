//! Run-scoped innovation tracking for NEAT.
//!
//! Every structural mutation (a new connection, or a node inserted into an
//! existing connection) is tagged with an innovation number. Numbers come from
//! a single counter owned by the [`InnovationRegistry`], which lives in the
//! solver's run context rather than in process-wide state.
//!
//! Within a generation the registry also remembers which mutations already
//! happened, keyed by `(sender, receiver)`. When two genomes independently
//! produce the same structural change they receive identical connection
//! genes, which is what makes crossover between differently-shaped genomes
//! line up. The history is cleared once per generation; the counter never
//! goes backwards.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::gene::{ConnectionGene, ConnectionKey};

/// The kind of structural mutation that produced a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationKind {
    /// A new connection between two existing nodes.
    AddConnection,
    /// One of the two connections created when a node splits a connection.
    AddNode,
}

/// The canonical outcome of a structural mutation in the current generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub connection: ConnectionGene,
}

#[derive(Debug, Default)]
struct Ledger {
    next_innovation: u64,
    history: HashMap<ConnectionKey, MutationRecord>,
}

impl Ledger {
    fn allocate(&mut self, key: ConnectionKey, kind: MutationKind, weight: f64) -> ConnectionGene {
        let connection = ConnectionGene::new(key, weight, self.next_innovation);
        self.next_innovation += 1;
        self.history.insert(key, MutationRecord { kind, connection });
        tracing::trace!(
            sender = key.sender,
            receiver = key.receiver,
            innovation = connection.innovation,
            ?kind,
            "allocated innovation"
        );
        connection
    }

    fn lookup(&self, key: &ConnectionKey, kind: MutationKind) -> Option<ConnectionGene> {
        self.history
            .get(key)
            .filter(|record| record.kind == kind)
            .map(|record| record.connection)
    }
}

/// Mutation ledger shared by every genome of a run.
///
/// All read-check-insert sequences happen under one mutex, so genomes
/// mutating on different worker threads see a consistent history.
#[derive(Debug, Default)]
pub struct InnovationRegistry {
    ledger: Mutex<Ledger>,
}

impl InnovationRegistry {
    /// Create an empty registry whose first innovation number is 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        // The ledger stays consistent even if a holder panicked mid-generation.
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the connection recorded for `key` with the same `kind`, or
    /// allocate a fresh innovation number and record it.
    ///
    /// A reused record carries the weight chosen by the genome that first
    /// made the mutation; `weight` is only used for new records.
    pub fn get_or_create(&self, key: ConnectionKey, kind: MutationKind, weight: f64) -> ConnectionGene {
        let mut ledger = self.ledger();
        match ledger.lookup(&key, kind) {
            Some(connection) => connection,
            None => ledger.allocate(key, kind, weight),
        }
    }

    /// Obtain the pair of connections produced by splitting a connection
    /// with a new node: `sender -> node` and `node -> receiver`.
    ///
    /// The pair is reused only when both keys already carry
    /// [`MutationKind::AddNode`] records; otherwise both get new numbers.
    pub fn get_or_create_split(
        &self,
        incoming: ConnectionKey,
        outgoing: ConnectionKey,
        weights: (f64, f64),
    ) -> (ConnectionGene, ConnectionGene) {
        let mut ledger = self.ledger();
        let existing = (
            ledger.lookup(&incoming, MutationKind::AddNode),
            ledger.lookup(&outgoing, MutationKind::AddNode),
        );
        if let (Some(first), Some(second)) = existing {
            return (first, second);
        }
        let first = ledger.allocate(incoming, MutationKind::AddNode, weights.0);
        let second = ledger.allocate(outgoing, MutationKind::AddNode, weights.1);
        (first, second)
    }

    /// Look up the record for `key` without modifying the registry.
    #[must_use]
    pub fn get(&self, key: &ConnectionKey) -> Option<MutationRecord> {
        self.ledger().history.get(key).copied()
    }

    /// Forget the mutations of the current generation. Innovation numbers
    /// keep increasing from where they were.
    pub fn clear(&self) {
        self.ledger().history.clear();
    }

    /// Number of mutations recorded since the last [`clear`](Self::clear).
    #[must_use]
    pub fn len(&self) -> usize {
        self.ledger().history.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The innovation number the next new mutation will receive.
    #[must_use]
    pub fn peek_next_innovation(&self) -> u64 {
        self.ledger().next_innovation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_same_key_reuses_innovation() {
        let registry = InnovationRegistry::new();
        let key = ConnectionKey::new(0, 2);

        let first = registry.get_or_create(key, MutationKind::AddConnection, 0.5);
        let second = registry.get_or_create(key, MutationKind::AddConnection, -0.9);

        assert_eq!(first.innovation, second.innovation);
        assert!((second.weight - 0.5).abs() < 1e-12, "reuse keeps the first weight");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_keys_get_increasing_innovations() {
        let registry = InnovationRegistry::new();
        let a = registry.get_or_create(ConnectionKey::new(0, 2), MutationKind::AddConnection, 0.0);
        let b = registry.get_or_create(ConnectionKey::new(1, 2), MutationKind::AddConnection, 0.0);
        assert_eq!(a.innovation, 0);
        assert_eq!(b.innovation, 1);
    }

    #[test]
    fn test_kind_mismatch_allocates_new_record() {
        let registry = InnovationRegistry::new();
        let key = ConnectionKey::new(0, 3);
        let conn = registry.get_or_create(key, MutationKind::AddConnection, 0.1);
        let (split_in, _) =
            registry.get_or_create_split(key, ConnectionKey::new(3, 2), (0.2, 0.3));
        assert_ne!(conn.innovation, split_in.innovation);
        assert_eq!(registry.get(&key).map(|r| r.kind), Some(MutationKind::AddNode));
    }

    #[test]
    fn test_split_reuse_requires_both_records() {
        let registry = InnovationRegistry::new();
        let incoming = ConnectionKey::new(0, 4);
        let outgoing = ConnectionKey::new(4, 2);

        let (a1, b1) = registry.get_or_create_split(incoming, outgoing, (0.1, 0.2));
        let (a2, b2) = registry.get_or_create_split(incoming, outgoing, (0.7, 0.8));
        assert_eq!((a1.innovation, b1.innovation), (a2.innovation, b2.innovation));

        // Only one half matches: the pair is new.
        let (a3, b3) = registry.get_or_create_split(incoming, ConnectionKey::new(4, 3), (0.0, 0.0));
        assert_ne!(a3.innovation, a1.innovation);
        assert!(b3.innovation > b1.innovation);
    }

    #[test]
    fn test_clear_keeps_counter() {
        let registry = InnovationRegistry::new();
        let key = ConnectionKey::new(0, 2);
        let before = registry.get_or_create(key, MutationKind::AddConnection, 0.0);

        registry.clear();
        assert!(registry.is_empty());

        let after = registry.get_or_create(key, MutationKind::AddConnection, 0.0);
        assert!(after.innovation > before.innovation);
        assert_eq!(registry.peek_next_innovation(), after.innovation + 1);
    }

    #[test]
    fn test_concurrent_discovery_agrees() {
        let registry = Arc::new(InnovationRegistry::new());
        let key = ConnectionKey::new(1, 5);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry
                        .get_or_create(key, MutationKind::AddConnection, f64::from(i))
                        .innovation
                })
            })
            .collect();

        let innovations: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(innovations.iter().all(|&inn| inn == innovations[0]));
        assert_eq!(registry.peek_next_innovation(), 1);
    }
}
