//! Pending transaction pool
//!
//! Holds transactions proposed for future blocks. Nothing is validated on
//! insertion; a pooled transaction is only checked once a block containing
//! it is offered to the chain.

use crate::types::*;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct TransactionPool {
    by_hash: HashMap<Hash, Transaction>,
    order: Vec<Hash>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `tx`, returning `false` if a transaction with the same hash is
    /// already pooled.
    pub fn add_transaction(&mut self, tx: Transaction) -> bool {
        let hash = tx.hash();
        if self.by_hash.contains_key(&hash) {
            return false;
        }
        self.by_hash.insert(hash, tx);
        self.order.push(hash);
        true
    }

    pub fn remove_transaction(&mut self, hash: &Hash) -> Option<Transaction> {
        let tx = self.by_hash.remove(hash)?;
        self.order.retain(|h| h != hash);
        Some(tx)
    }

    pub fn get_transaction(&self, hash: &Hash) -> Option<&Transaction> {
        self.by_hash.get(hash)
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.by_hash.contains_key(hash)
    }

    /// Pooled transactions in insertion order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.order
            .iter()
            .filter_map(|h| self.by_hash.get(h))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }
}
