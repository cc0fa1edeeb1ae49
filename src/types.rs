//! Core ledger types for block and transaction validation

use serde::{Deserialize, Serialize};

/// Hash type: 256-bit hash
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Natural number type
pub type Natural = u64;

/// Amount type. Signed so that negative declared values can be represented
/// and rejected by validation.
pub type Amount = i64;

/// OutPoint: 𝒪 = ℍ × ℕ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: Natural,
}

impl OutPoint {
    /// Output `index` of the transaction with hash `hash`
    pub fn new(hash: Hash, index: Natural) -> Self {
        Self { hash, index }
    }
}

/// Transaction Input: ℐ = 𝒪 × 𝕊
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prevout: OutPoint,
    pub signature: ByteString,
}

/// Transaction Output: 𝒯 = ℤ × 𝕊
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: Amount,
    pub owner: ByteString,
}

/// Transaction: 𝒯𝒳 = ℐ* × 𝒯* × ℕ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    /// Distinguishes otherwise identical transactions, e.g. two coinbases
    /// paying the same owner.
    pub nonce: Natural,
}

impl Transaction {
    /// Empty transaction with no inputs, no outputs and nonce 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Reward transaction: no inputs, a single output of `value` to `owner`.
    pub fn coinbase(value: Amount, owner: ByteString, nonce: Natural) -> Self {
        Self {
            inputs: vec![],
            outputs: vec![TransactionOutput { value, owner }],
            nonce,
        }
    }

    /// Append an unsigned input claiming output `output_index` of `prev_tx_hash`
    pub fn add_input(&mut self, prev_tx_hash: Hash, output_index: Natural) {
        self.inputs.push(TransactionInput {
            prevout: OutPoint::new(prev_tx_hash, output_index),
            signature: vec![],
        });
    }

    /// Append an output paying `value` to `owner`
    pub fn add_output(&mut self, value: Amount, owner: ByteString) {
        self.outputs.push(TransactionOutput { value, owner });
    }

    /// Attach `signature` to the input at `index`. Out-of-range indices are ignored.
    pub fn add_signature(&mut self, signature: ByteString, index: usize) {
        if let Some(input) = self.inputs.get_mut(index) {
            input.signature = signature;
        }
    }

    /// Coinbase shape: no inputs and exactly one output
    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_empty() && self.outputs.len() == 1
    }

    /// Content hash; covers signatures, so it is only final once the
    /// transaction is fully signed.
    pub fn hash(&self) -> Hash {
        crate::hashing::tx_hash(self)
    }

    /// Bytes the owner of the output spent by input `index` must sign.
    pub fn raw_data_to_sign(&self, index: usize) -> ByteString {
        crate::hashing::raw_data_to_sign(self, index)
    }

    /// Identifier of this transaction's output at `index`.
    pub fn outpoint(&self, index: Natural) -> OutPoint {
        OutPoint::new(self.hash(), index)
    }
}

/// Block: ℬ = ℍ? × 𝒯𝒳 × 𝒯𝒳*
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// `None` only for the genesis block.
    pub prev_block_hash: Option<Hash>,
    pub coinbase: Transaction,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Create an empty block on top of `prev_block_hash` whose coinbase pays
    /// `coinbase_value` to `coinbase_owner`.
    ///
    /// The coinbase nonce is derived from the parent hash so that blocks mined
    /// by the same owner on different parents do not produce colliding
    /// reward outputs.
    pub fn new(prev_block_hash: Option<Hash>, coinbase_owner: ByteString, coinbase_value: Amount) -> Self {
        let nonce = prev_block_hash
            .map(|h| {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(&h[..8]);
                Natural::from_le_bytes(bytes)
            })
            .unwrap_or(0);

        Self {
            prev_block_hash,
            coinbase: Transaction::coinbase(coinbase_value, coinbase_owner, nonce),
            transactions: vec![],
        }
    }

    /// Append `tx` after the block's existing transactions
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    /// Genesis blocks carry no parent reference
    pub fn is_genesis(&self) -> bool {
        self.prev_block_hash.is_none()
    }

    /// Block identity: SHA-256 over parent, coinbase and transactions
    pub fn hash(&self) -> Hash {
        crate::hashing::block_hash(self)
    }
}

/// Validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(String),
}

impl ValidationResult {
    /// Check if the result is [`ValidationResult::Valid`]
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// How transactions of one block are checked against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntraBlockPolicy {
    /// Every transaction is checked against the unmodified parent snapshot.
    /// Two transactions spending the same prior output are both accepted.
    Independent,
    /// Every transaction is checked against the snapshot left by the
    /// transactions before it in the block.
    #[default]
    Sequential,
}
