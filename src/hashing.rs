//! Canonical encodings and hashes of transactions and blocks
//!
//! All integers are little-endian; variable-length byte strings are prefixed
//! with their length as a u64.

use crate::types::*;
use sha2::{Digest, Sha256};

const SIGNING_TAG: &[u8] = b"utxo-chain/sig";

/// RawTx: 𝒯𝒳 → 𝕊, the full encoding including signatures
pub fn raw_tx(tx: &Transaction) -> ByteString {
    let mut buf = Vec::with_capacity(16 + tx.inputs.len() * 112 + tx.outputs.len() * 49);
    encode_tx(&mut buf, tx, false);
    buf
}

/// RawDataToSign: 𝒯𝒳 × ℕ → 𝕊
///
/// Every signature field is blanked and the position of the signed input is
/// committed, so a signature is bound to one input of one transaction.
pub fn raw_data_to_sign(tx: &Transaction, index: usize) -> ByteString {
    let mut buf = Vec::with_capacity(SIGNING_TAG.len() + 8 + tx.inputs.len() * 48);
    buf.extend_from_slice(SIGNING_TAG);
    buf.extend_from_slice(&(index as u64).to_le_bytes());
    encode_tx(&mut buf, tx, true);
    buf
}

/// Transaction hash: SHA-256(RawTx(tx))
pub fn tx_hash(tx: &Transaction) -> Hash {
    Sha256::digest(raw_tx(tx)).into()
}

/// Block hash: SHA-256 over parent reference, coinbase and transactions
pub fn block_hash(block: &Block) -> Hash {
    let mut hasher = Sha256::new();
    match &block.prev_block_hash {
        Some(prev) => {
            hasher.update([1u8]);
            hasher.update(prev);
        }
        None => hasher.update([0u8]),
    }
    hasher.update(raw_tx(&block.coinbase));
    hasher.update((block.transactions.len() as u64).to_le_bytes());
    for tx in &block.transactions {
        hasher.update(raw_tx(tx));
    }
    hasher.finalize().into()
}

fn encode_tx(buf: &mut Vec<u8>, tx: &Transaction, blank_signatures: bool) {
    buf.extend_from_slice(&(tx.inputs.len() as u64).to_le_bytes());
    for input in &tx.inputs {
        buf.extend_from_slice(&input.prevout.hash);
        buf.extend_from_slice(&input.prevout.index.to_le_bytes());
        if !blank_signatures {
            put_bytes(buf, &input.signature);
        }
    }
    buf.extend_from_slice(&(tx.outputs.len() as u64).to_le_bytes());
    for output in &tx.outputs {
        buf.extend_from_slice(&output.value.to_le_bytes());
        put_bytes(buf, &output.owner);
    }
    buf.extend_from_slice(&tx.nonce.to_le_bytes());
}

fn put_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
    buf.extend_from_slice(bytes);
}
