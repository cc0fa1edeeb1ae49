//! Transaction validation against a UTXO set snapshot

use crate::block::apply_transaction;
use crate::signature::SignatureVerifier;
use crate::types::*;
use crate::utxo::UtxoSet;
use std::collections::HashSet;

/// CheckTx: 𝒯𝒳 × 𝒰𝒮 → {valid, invalid}
///
/// A transaction tx = (ins, outs) is valid against us if and only if:
/// 1. |ins| > 0
/// 2. ∀i ∈ ins: i.prevout ∈ us
/// 3. ∀i ∈ ins: Verify(us(i.prevout).owner, RawDataToSign(tx, i), i.signature)
/// 4. no prevout is claimed by two inputs
/// 5. ∀o ∈ outs: o.value ≥ 0
/// 6. Σᵢ us(i.prevout).value ≥ Σₒ o.value
///
/// Never mutates `utxo_set`.
pub fn check_tx<V: SignatureVerifier + ?Sized>(
    tx: &Transaction,
    utxo_set: &UtxoSet,
    verifier: &V,
) -> ValidationResult {
    // 1. Check inputs are not empty
    if tx.inputs.is_empty() {
        return ValidationResult::Invalid("Transaction has no inputs".to_string());
    }

    // 2. Check every claimed output is unspent
    for (i, input) in tx.inputs.iter().enumerate() {
        if !utxo_set.contains(&input.prevout) {
            return ValidationResult::Invalid(format!("Input {} not found in UTXO set", i));
        }
    }

    // 3. Check signatures against the owners recorded in the set
    for (i, input) in tx.inputs.iter().enumerate() {
        let owner = match utxo_set.get(&input.prevout) {
            Some(output) => &output.owner,
            None => return ValidationResult::Invalid(format!("Input {} not found in UTXO set", i)),
        };
        if !verifier.verify(owner, &tx.raw_data_to_sign(i), &input.signature) {
            return ValidationResult::Invalid(format!("Invalid signature at input {}", i));
        }
    }

    // 4. Check no output is claimed twice
    let mut claimed = HashSet::with_capacity(tx.inputs.len());
    for (i, input) in tx.inputs.iter().enumerate() {
        if !claimed.insert(input.prevout) {
            return ValidationResult::Invalid(format!("Output claimed twice at input {}", i));
        }
    }

    // 5. Check output values are non-negative
    for (i, output) in tx.outputs.iter().enumerate() {
        if output.value < 0 {
            return ValidationResult::Invalid(format!(
                "Negative output value {} at index {}",
                output.value, i
            ));
        }
    }

    // 6. Check value conservation
    match tx_fee(tx, utxo_set) {
        Some(fee) if fee >= 0 => ValidationResult::Valid,
        Some(_) => ValidationResult::Invalid("Insufficient input value".to_string()),
        None => ValidationResult::Invalid("Value overflow".to_string()),
    }
}

/// Boolean form of [`check_tx`].
pub fn is_valid_tx<V: SignatureVerifier + ?Sized>(tx: &Transaction, utxo_set: &UtxoSet, verifier: &V) -> bool {
    check_tx(tx, utxo_set, verifier).is_valid()
}

/// Fee: Σ inputs − Σ outputs, with input values taken from `utxo_set`.
///
/// `None` if an input is missing from the set or a sum overflows. The result
/// may be negative for a transaction that spends more than it claims.
pub fn tx_fee(tx: &Transaction, utxo_set: &UtxoSet) -> Option<Amount> {
    let mut total_in: Amount = 0;
    for input in &tx.inputs {
        let value = utxo_set.get(&input.prevout)?.value;
        total_in = total_in.checked_add(value)?;
    }

    let mut total_out: Amount = 0;
    for output in &tx.outputs {
        total_out = total_out.checked_add(output.value)?;
    }

    total_in.checked_sub(total_out)
}

/// HandleTxs: 𝒯𝒳* × 𝒰𝒮 → 𝒯𝒳* × 𝒰𝒮
///
/// Select a mutually valid subset of `candidates` and return it together
/// with the UTXO set that results from applying it to `utxo_set`.
///
/// Candidates are swept repeatedly, so a transaction that spends the output
/// of another candidate is accepted once that candidate has been. Among
/// conflicting candidates the earliest one in `candidates` wins.
pub fn handle_txs<V: SignatureVerifier + ?Sized>(
    candidates: &[Transaction],
    utxo_set: &UtxoSet,
    verifier: &V,
) -> (Vec<Transaction>, UtxoSet) {
    let mut working = utxo_set.branch();
    let mut accepted = Vec::new();
    let mut pending: Vec<&Transaction> = candidates.iter().collect();

    loop {
        let before = pending.len();
        pending.retain(|tx| {
            if is_valid_tx(tx, &working, verifier) {
                apply_transaction(tx, &mut working);
                accepted.push((*tx).clone());
                false
            } else {
                true
            }
        });
        if pending.is_empty() || pending.len() == before {
            break;
        }
    }

    log::debug!(
        "handle_txs accepted {} of {} candidate transactions",
        accepted.len(),
        candidates.len()
    );
    (accepted, working)
}
