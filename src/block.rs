//! Block application and connection

use crate::constants::COINBASE_OUTPUT_INDEX;
use crate::signature::SignatureVerifier;
use crate::transaction::check_tx;
use crate::types::*;
use crate::utxo::UtxoSet;

/// ConnectBlock: ℬ × 𝒰𝒮 × 𝒫 → {valid, invalid} × 𝒰𝒮
///
/// For block b = (prev, cb, txs) on top of parent snapshot us:
/// 1. Check every tx ∈ txs under `policy`
///    - Independent: against us itself
///    - Sequential: against us with the preceding txs of b applied
/// 2. If any check fails: return (invalid, us)
/// 3. Return (valid, ApplyBlock(us, b))
///
/// The coinbase is never validated.
pub fn connect_block<V: SignatureVerifier + ?Sized>(
    block: &Block,
    utxo_set: &UtxoSet,
    policy: IntraBlockPolicy,
    verifier: &V,
) -> (ValidationResult, UtxoSet) {
    match policy {
        IntraBlockPolicy::Independent => {
            for (i, tx) in block.transactions.iter().enumerate() {
                if let ValidationResult::Invalid(reason) = check_tx(tx, utxo_set, verifier) {
                    return (
                        ValidationResult::Invalid(format!("Invalid transaction at index {}: {}", i, reason)),
                        utxo_set.clone(),
                    );
                }
            }
            (ValidationResult::Valid, apply_block(utxo_set, block))
        }
        IntraBlockPolicy::Sequential => {
            let mut working = utxo_set.branch();
            for (i, tx) in block.transactions.iter().enumerate() {
                if let ValidationResult::Invalid(reason) = check_tx(tx, &working, verifier) {
                    return (
                        ValidationResult::Invalid(format!("Invalid transaction at index {}: {}", i, reason)),
                        utxo_set.clone(),
                    );
                }
                apply_transaction(tx, &mut working);
            }
            apply_coinbase(block, &mut working);
            (ValidationResult::Valid, working)
        }
    }
}

/// ApplyBlock: 𝒰𝒮 × ℬ → 𝒰𝒮
///
/// For block b = (prev, cb, txs) and UTXO set us:
/// 1. For each tx ∈ txs in order: us ← ApplyTransaction(tx, us)
/// 2. us ← us ∪ {(cb.id, 0) ↦ cb.outputs[0]}
/// 3. Return us
///
/// Performs no validation. `utxo_set` itself is left untouched.
pub fn apply_block(utxo_set: &UtxoSet, block: &Block) -> UtxoSet {
    let mut result = utxo_set.branch();
    for tx in &block.transactions {
        apply_transaction(tx, &mut result);
    }
    apply_coinbase(block, &mut result);
    result
}

/// ApplyTransaction: 𝒯𝒳 × 𝒰𝒮 → 𝒰𝒮
///
/// us' = (us \ {i.prevout : i ∈ tx.inputs}) ∪ {(tx.id, i) ↦ tx.outputs[i]}
pub fn apply_transaction(tx: &Transaction, utxo_set: &mut UtxoSet) {
    for input in &tx.inputs {
        utxo_set.remove_utxo(&input.prevout);
    }

    let tx_id = tx.hash();
    for (i, output) in tx.outputs.iter().enumerate() {
        utxo_set.add_utxo(OutPoint::new(tx_id, i as Natural), output.clone());
    }
}

fn apply_coinbase(block: &Block, utxo_set: &mut UtxoSet) {
    if let Some(reward) = block.coinbase.outputs.first() {
        utxo_set.add_utxo(
            OutPoint::new(block.coinbase.hash(), COINBASE_OUTPUT_INDEX),
            reward.clone(),
        );
    }
}
