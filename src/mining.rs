//! Block assembly on top of the best tip
//!
//! There is no proof-of-work: a created block is simply the best-tip
//! extension built from the pending pool, offered straight to the chain.

use crate::chain::BlockChain;
use crate::error::Result;
use crate::signature::SignatureVerifier;
use crate::transaction::{handle_txs, is_valid_tx, tx_fee};
use crate::types::*;
use crate::utxo::UtxoSet;
use std::cmp::Reverse;
use std::collections::HashSet;

/// SelectTransactions: 𝒯𝒳* × 𝒰𝒮 × 𝒫 → 𝒯𝒳*
///
/// For candidate transactions txs and tip UTXO set us:
/// 1. Order txs by fee against us, highest first (unknown fees last)
/// 2. Keep the largest prefix-greedy subset a block under `policy` accepts
///    - Independent: each tx valid against us and claiming no output an
///      earlier selected tx claims
///    - Sequential: HandleTxs(txs, us)
pub fn select_transactions<V: SignatureVerifier + ?Sized>(
    candidates: &[Transaction],
    utxo_set: &UtxoSet,
    policy: IntraBlockPolicy,
    verifier: &V,
) -> Vec<Transaction> {
    let mut ordered: Vec<Transaction> = candidates.to_vec();
    ordered.sort_by_cached_key(|tx| Reverse(tx_fee(tx, utxo_set)));

    match policy {
        IntraBlockPolicy::Sequential => handle_txs(&ordered, utxo_set, verifier).0,
        IntraBlockPolicy::Independent => {
            let mut claimed = HashSet::new();
            ordered
                .into_iter()
                .filter(|tx| {
                    if !is_valid_tx(tx, utxo_set, verifier) {
                        return false;
                    }
                    if tx.inputs.iter().any(|i| claimed.contains(&i.prevout)) {
                        return false;
                    }
                    claimed.extend(tx.inputs.iter().map(|i| i.prevout));
                    true
                })
                .collect()
        }
    }
}

/// CreateBlock: ℬℂ × 𝕊 → ℬ
///
/// 1. Select transactions from the pending pool against the best-tip snapshot
/// 2. Build a block on the best tip paying `config.coinbase_value` to
///    `coinbase_owner`
/// 3. Offer it to the chain; on acceptance drop the included transactions
///    from the pool
pub fn create_block<V: SignatureVerifier>(chain: &mut BlockChain<V>, coinbase_owner: ByteString) -> Result<Block> {
    let selected = select_transactions(
        &chain.transaction_pool().transactions(),
        chain.max_height_utxo_set(),
        chain.config().intra_block_policy,
        chain.verifier(),
    );

    let mut block = Block::new(
        Some(chain.max_height_hash()),
        coinbase_owner,
        chain.config().coinbase_value,
    );
    for tx in selected {
        block.add_transaction(tx);
    }

    chain.try_add_block(block.clone())?;

    let pool = chain.transaction_pool_mut();
    for tx in &block.transactions {
        pool.remove_transaction(&tx.hash());
    }
    log::debug!(
        "Created block {} with {} transactions, {} left pending",
        hex::encode(block.hash()),
        block.transactions.len(),
        pool.len()
    );
    Ok(block)
}
