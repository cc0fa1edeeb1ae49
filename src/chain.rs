//! Chain index: fork choice and bounded block history
//!
//! Every accepted block is recorded with its height and the UTXO snapshot it
//! produces. The block of greatest height is the best tip; the first block to
//! reach a height keeps the tip until a strictly higher block arrives.
//! Blocks more than `cutoff_age` below the tip are evicted, after which a
//! block naming one of them as parent is treated like one with an unknown
//! parent.

use crate::block::{apply_block, connect_block};
use crate::config::ChainConfig;
use crate::error::{ConsensusError, Result};
use crate::mempool::TransactionPool;
use crate::signature::{Secp256k1Verifier, SignatureVerifier};
use crate::types::*;
use crate::utxo::UtxoSet;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct ChainNode {
    height: Natural,
    utxo_set: UtxoSet,
}

/// Outcome of an accepted block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainUpdate {
    pub hash: Hash,
    pub height: Natural,
    /// The block became the new best tip.
    pub new_tip: bool,
    /// Number of nodes evicted as a consequence.
    pub pruned: usize,
}

#[derive(Debug)]
pub struct BlockChain<V = Secp256k1Verifier> {
    nodes: HashMap<Hash, ChainNode>,
    max_height: Natural,
    max_height_hash: Hash,
    max_height_block: Block,
    max_height_utxo_set: UtxoSet,
    tx_pool: TransactionPool,
    config: ChainConfig,
    verifier: V,
}

impl BlockChain<Secp256k1Verifier> {
    /// Create a chain holding only `genesis`, with default configuration and
    /// secp256k1 signature verification. `genesis` is assumed valid.
    pub fn new(genesis: Block) -> Self {
        Self::with_verifier(genesis, Secp256k1Verifier::new())
    }
}

impl<V: SignatureVerifier> BlockChain<V> {
    /// Chain with default configuration and a custom signature verifier.
    pub fn with_verifier(genesis: Block, verifier: V) -> Self {
        Self::build(genesis, ChainConfig::default(), verifier)
    }

    /// Chain with explicit configuration. Fails if `config` does not validate.
    pub fn with_config(genesis: Block, config: ChainConfig, verifier: V) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(genesis, config, verifier))
    }

    fn build(genesis: Block, config: ChainConfig, verifier: V) -> Self {
        let utxo_set = apply_block(&UtxoSet::new(), &genesis);
        let hash = genesis.hash();

        let mut nodes = HashMap::new();
        nodes.insert(hash, ChainNode { height: 0, utxo_set: utxo_set.clone() });

        Self {
            nodes,
            max_height: 0,
            max_height_hash: hash,
            max_height_block: genesis,
            max_height_utxo_set: utxo_set,
            tx_pool: TransactionPool::new(),
            config,
            verifier,
        }
    }

    /// Add `block` if its parent is indexed and all of its transactions are
    /// valid. Returns `false` otherwise, leaving the chain untouched.
    pub fn add_block(&mut self, block: Block) -> bool {
        match self.try_add_block(block) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("Rejected block: {}", e);
                false
            }
        }
    }

    /// Same as [`BlockChain::add_block`] but reports why a block was rejected.
    pub fn try_add_block(&mut self, block: Block) -> Result<ChainUpdate> {
        let prev_hash = block.prev_block_hash.ok_or(ConsensusError::MissingParent)?;
        let hash = block.hash();

        let parent = self
            .nodes
            .get(&prev_hash)
            .ok_or_else(|| ConsensusError::UnknownParent(hex::encode(prev_hash)))?;

        // Re-offered block whose parent is still indexed
        if let Some(node) = self.nodes.get(&hash) {
            return Ok(ChainUpdate { hash, height: node.height, new_tip: false, pruned: 0 });
        }

        let (result, utxo_set) = connect_block(
            &block,
            &parent.utxo_set,
            self.config.intra_block_policy,
            &self.verifier,
        );
        if let ValidationResult::Invalid(reason) = result {
            return Err(ConsensusError::BlockValidation(reason));
        }

        let height = parent.height + 1;
        self.nodes.insert(hash, ChainNode { height, utxo_set: utxo_set.clone() });

        let new_tip = height > self.max_height;
        if new_tip {
            log::info!("New best tip {} at height {}", hex::encode(hash), height);
            self.max_height = height;
            self.max_height_hash = hash;
            self.max_height_block = block;
            self.max_height_utxo_set = utxo_set;
        }

        let pruned = self.prune();
        Ok(ChainUpdate { hash, height, new_tip, pruned })
    }

    /// Drop every node strictly below `max_height - cutoff_age`.
    fn prune(&mut self) -> usize {
        let floor = self.max_height.saturating_sub(self.config.cutoff_age);
        let before = self.nodes.len();
        self.nodes.retain(|_, node| node.height >= floor);
        let pruned = before - self.nodes.len();
        if pruned > 0 {
            log::debug!("Pruned {} blocks below height {}", pruned, floor);
        }
        pruned
    }

    /// Block at the best tip.
    pub fn max_height_block(&self) -> &Block {
        &self.max_height_block
    }

    /// Hash of the best tip.
    pub fn max_height_hash(&self) -> Hash {
        self.max_height_hash
    }

    /// UTXO set for mining a new block on top of the best tip.
    pub fn max_height_utxo_set(&self) -> &UtxoSet {
        &self.max_height_utxo_set
    }

    /// Height of the best tip; genesis is height 0.
    pub fn max_height(&self) -> Natural {
        self.max_height
    }

    /// Whether `hash` is currently indexed. False once pruned.
    pub fn contains_block(&self, hash: &Hash) -> bool {
        self.nodes.contains_key(hash)
    }

    /// Height of an indexed block.
    pub fn height_of(&self, hash: &Hash) -> Option<Natural> {
        self.nodes.get(hash).map(|node| node.height)
    }

    /// Snapshot after `hash`, while that block is still indexed.
    pub fn utxo_set_of(&self, hash: &Hash) -> Option<&UtxoSet> {
        self.nodes.get(hash).map(|node| &node.utxo_set)
    }

    /// Number of blocks currently indexed.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Add a transaction to the pending pool. No validation is performed.
    pub fn add_transaction(&mut self, tx: Transaction) -> bool {
        self.tx_pool.add_transaction(tx)
    }

    /// Pending transactions not yet included by [`crate::mining::create_block`].
    pub fn transaction_pool(&self) -> &TransactionPool {
        &self.tx_pool
    }

    /// Mutable access to the pending pool.
    pub fn transaction_pool_mut(&mut self) -> &mut TransactionPool {
        &mut self.tx_pool
    }

    /// Active chain configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Signature verifier used when validating blocks.
    pub fn verifier(&self) -> &V {
        &self.verifier
    }
}
