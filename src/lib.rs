//! # UTXO Chain
//!
//! State-transition and fork-choice core of a minimal UTXO ledger.
//!
//! Given a stream of candidate blocks, the crate decides which blocks are
//! valid, keeps the set of unspent outputs reachable from the best chain tip,
//! and bounds memory by evicting history that can no longer matter.
//!
//! ## Architecture
//!
//! Leaves first:
//! - [`utxo`] - persistent UTXO set snapshots
//! - [`transaction`] - per-transaction validation rules
//! - [`block`] - block application and connection
//! - [`chain`] - chain index, fork choice and pruning
//! - [`mempool`] - pending transaction pool
//! - [`mining`] - block assembly for an external miner
//! - [`shared`] - lock-protected chain handle
//!
//! ## Design Principles
//!
//! 1. **Pure validation**: validating a transaction or block never mutates a snapshot
//! 2. **Explicit ownership**: chain state lives in a [`chain::BlockChain`] value, never a global
//! 3. **Bounded history**: blocks older than the cutoff age are forgotten and cannot be extended
//!
//! ## Usage
//!
//! ```rust
//! use utxo_chain::chain::BlockChain;
//! use utxo_chain::types::*;
//!
//! let genesis = Block::new(None, vec![0x02; 33], 25);
//! let mut chain = BlockChain::new(genesis.clone());
//!
//! let next = Block::new(Some(genesis.hash()), vec![0x03; 33], 25);
//! assert!(chain.add_block(next));
//! assert_eq!(chain.max_height(), 1);
//! ```

pub mod types;
pub mod constants;
pub mod hashing;
pub mod signature;
pub mod utxo;
pub mod transaction;
pub mod block;
pub mod chain;
pub mod mempool;
pub mod mining;
pub mod shared;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use chain::{BlockChain, ChainUpdate};
pub use config::ChainConfig;
pub use error::{ConsensusError, Result};
pub use mempool::TransactionPool;
pub use signature::{Secp256k1Verifier, SignatureVerifier};
pub use utxo::UtxoSet;

/// Stateless entry points to the ledger rules, bound to one signature
/// verifier and one intra-block policy.
///
/// # Examples
///
/// ```
/// use utxo_chain::ChainRules;
/// use utxo_chain::types::*;
///
/// let rules = ChainRules::new();
/// let genesis = Block::new(None, vec![0x02; 33], 25);
/// let utxo_set = rules.apply_block(&utxo_chain::UtxoSet::new(), &genesis);
///
/// assert_eq!(utxo_set.len(), 1);
/// ```
pub struct ChainRules<V = Secp256k1Verifier> {
    verifier: V,
    policy: IntraBlockPolicy,
}

impl ChainRules<Secp256k1Verifier> {
    /// Rules with secp256k1 verification and the default intra-block policy
    pub fn new() -> Self {
        Self::with_verifier(Secp256k1Verifier::new(), IntraBlockPolicy::default())
    }
}

impl Default for ChainRules<Secp256k1Verifier> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: SignatureVerifier> ChainRules<V> {
    /// Rules with a custom verifier and intra-block policy
    pub fn with_verifier(verifier: V, policy: IntraBlockPolicy) -> Self {
        Self { verifier, policy }
    }

    /// Intra-block policy used by [`ChainRules::validate_block`]
    pub fn policy(&self) -> IntraBlockPolicy {
        self.policy
    }

    /// Validate a transaction against a UTXO set
    ///
    /// # Examples
    ///
    /// ```
    /// use utxo_chain::ChainRules;
    /// use utxo_chain::types::*;
    ///
    /// let rules = ChainRules::new();
    /// let utxo_set = utxo_chain::UtxoSet::new();
    ///
    /// // Spends an output that does not exist
    /// let mut tx = Transaction::new();
    /// tx.add_input([1; 32], 0);
    /// tx.add_output(5, vec![0x02; 33]);
    ///
    /// let result = rules.validate_transaction(&tx, &utxo_set);
    /// assert!(matches!(result, ValidationResult::Invalid(_)));
    /// ```
    pub fn validate_transaction(&self, tx: &Transaction, utxo_set: &UtxoSet) -> ValidationResult {
        transaction::check_tx(tx, utxo_set, &self.verifier)
    }

    /// Validate a transaction, reporting a failure as an error
    ///
    /// # Examples
    ///
    /// ```
    /// use utxo_chain::{ChainRules, ConsensusError};
    /// use utxo_chain::types::*;
    ///
    /// let rules = ChainRules::new();
    /// let err = rules.check_transaction(&Transaction::new(), &utxo_chain::UtxoSet::new()).unwrap_err();
    /// assert!(matches!(err, ConsensusError::TransactionValidation(_)));
    /// ```
    pub fn check_transaction(&self, tx: &Transaction, utxo_set: &UtxoSet) -> Result<()> {
        match self.validate_transaction(tx, utxo_set) {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(reason) => Err(ConsensusError::TransactionValidation(reason)),
        }
    }

    /// Boolean form of [`ChainRules::validate_transaction`]
    pub fn is_valid_tx(&self, tx: &Transaction, utxo_set: &UtxoSet) -> bool {
        transaction::is_valid_tx(tx, utxo_set, &self.verifier)
    }

    /// Select a mutually valid subset of `candidates` and the resulting set
    pub fn handle_transactions(&self, candidates: &[Transaction], utxo_set: &UtxoSet) -> (Vec<Transaction>, UtxoSet) {
        transaction::handle_txs(candidates, utxo_set, &self.verifier)
    }

    /// Apply a block without validating it
    pub fn apply_block(&self, utxo_set: &UtxoSet, block: &Block) -> UtxoSet {
        block::apply_block(utxo_set, block)
    }

    /// Validate and apply a block on top of `utxo_set`
    ///
    /// # Examples
    ///
    /// ```
    /// use utxo_chain::ChainRules;
    /// use utxo_chain::types::*;
    ///
    /// let rules = ChainRules::new();
    /// let genesis = Block::new(None, vec![0x02; 33], 25);
    /// let utxo_set = rules.apply_block(&utxo_chain::UtxoSet::new(), &genesis);
    ///
    /// // A block carrying only its coinbase is always valid
    /// let block = Block::new(Some(genesis.hash()), vec![0x03; 33], 25);
    /// let (result, next) = rules.validate_block(&block, &utxo_set);
    /// assert_eq!(result, ValidationResult::Valid);
    /// assert_eq!(next.len(), 2);
    /// ```
    pub fn validate_block(&self, block: &Block, utxo_set: &UtxoSet) -> (ValidationResult, UtxoSet) {
        block::connect_block(block, utxo_set, self.policy, &self.verifier)
    }
}
