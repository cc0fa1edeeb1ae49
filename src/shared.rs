//! Thread-safe chain handle
//!
//! Mutations hold the write lock for their whole read-modify-write, so two
//! blocks racing to extend the same parent are serialized and see a
//! consistent parent snapshot. Readers get owned copies; snapshots are cheap
//! to clone.

use crate::chain::{BlockChain, ChainUpdate};
use crate::error::Result;
use crate::mining;
use crate::signature::{Secp256k1Verifier, SignatureVerifier};
use crate::types::*;
use crate::utxo::UtxoSet;
use parking_lot::RwLock;
use std::sync::Arc;

pub struct SharedBlockChain<V = Secp256k1Verifier> {
    inner: Arc<RwLock<BlockChain<V>>>,
}

impl<V: SignatureVerifier> SharedBlockChain<V> {
    pub fn new(chain: BlockChain<V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    pub fn add_block(&self, block: Block) -> bool {
        self.inner.write().add_block(block)
    }

    pub fn try_add_block(&self, block: Block) -> Result<ChainUpdate> {
        self.inner.write().try_add_block(block)
    }

    pub fn add_transaction(&self, tx: Transaction) -> bool {
        self.inner.write().add_transaction(tx)
    }

    /// Assemble and add a block on the best tip from the pending pool.
    pub fn create_block(&self, coinbase_owner: ByteString) -> Result<Block> {
        mining::create_block(&mut *self.inner.write(), coinbase_owner)
    }

    pub fn max_height_block(&self) -> Block {
        self.inner.read().max_height_block().clone()
    }

    pub fn max_height_utxo_set(&self) -> UtxoSet {
        self.inner.read().max_height_utxo_set().clone()
    }

    pub fn max_height(&self) -> Natural {
        self.inner.read().max_height()
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.inner.read().transaction_pool().transactions()
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().node_count()
    }

    /// Run `f` with shared access to the chain.
    pub fn with_chain<R>(&self, f: impl FnOnce(&BlockChain<V>) -> R) -> R {
        f(&self.inner.read())
    }
}

impl<V> Clone for SharedBlockChain<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}
