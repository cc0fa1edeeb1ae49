//! Integration tests for utxo-chain
//!
//! Transactions are signed with real secp256k1 keys and verified by the
//! default verifier.

use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use utxo_chain::signature::message_digest;
use utxo_chain::*;

struct Key {
    secret: SecretKey,
    owner: Vec<u8>,
}

fn key(seed: u8) -> Key {
    let secp = Secp256k1::new();
    let secret = SecretKey::from_slice(&[seed; 32]).unwrap();
    let owner = PublicKey::from_secret_key(&secp, &secret).serialize().to_vec();
    Key { secret, owner }
}

fn sign_input(tx: &mut Transaction, index: usize, key: &Key) {
    let secp = Secp256k1::new();
    let msg = Message::from_digest_slice(&message_digest(&tx.raw_data_to_sign(index))).unwrap();
    let sig = secp.sign_ecdsa(&msg, &key.secret);
    tx.add_signature(sig.serialize_der().to_vec(), index);
}

fn spend(outpoint: OutPoint, outputs: &[(Amount, &Key)], signer: &Key) -> Transaction {
    let mut tx = Transaction::new();
    tx.add_input(outpoint.hash, outpoint.index);
    for (value, to) in outputs {
        tx.add_output(*value, to.owner.clone());
    }
    sign_input(&mut tx, 0, signer);
    tx
}

/// Genesis pays 10 to A; returns the chain, genesis and O1.
fn genesis_chain(policy: IntraBlockPolicy, a: &Key) -> (BlockChain, Block, OutPoint) {
    let genesis = Block::new(None, a.owner.clone(), 10);
    let o1 = genesis.coinbase.outpoint(0);
    let config = ChainConfig::default().with_policy(policy);
    let chain = BlockChain::with_config(genesis.clone(), config, Secp256k1Verifier::new()).unwrap();
    (chain, genesis, o1)
}

#[test]
fn test_spend_with_fee_is_valid() {
    let (a, b) = (key(1), key(2));
    let (chain, _, o1) = genesis_chain(IntraBlockPolicy::Sequential, &a);

    let tx = spend(o1, &[(4, &b), (5, &a)], &a);
    let rules = ChainRules::new();
    assert_eq!(rules.validate_transaction(&tx, chain.max_height_utxo_set()), ValidationResult::Valid);
    assert_eq!(transaction::tx_fee(&tx, chain.max_height_utxo_set()), Some(1));
}

#[test]
fn test_intra_block_double_spend_sequential_policy_rejects_block() {
    let (a, b, c) = (key(1), key(2), key(3));
    let (mut chain, genesis, o1) = genesis_chain(IntraBlockPolicy::Sequential, &a);

    let tx1 = spend(o1, &[(4, &b), (5, &a)], &a);
    let tx2 = spend(o1, &[(3, &c)], &a);

    // Each is individually valid against the parent snapshot
    assert!(transaction::is_valid_tx(&tx1, chain.max_height_utxo_set(), chain.verifier()));
    assert!(transaction::is_valid_tx(&tx2, chain.max_height_utxo_set(), chain.verifier()));

    let mut block = Block::new(Some(genesis.hash()), key(9).owner, 25);
    block.add_transaction(tx1);
    block.add_transaction(tx2);

    assert!(!chain.add_block(block));
    assert_eq!(chain.max_height(), 0);
    assert_eq!(chain.node_count(), 1);
}

#[test]
fn test_intra_block_double_spend_independent_policy_accepts_block() {
    let (a, b, c) = (key(1), key(2), key(3));
    let (mut chain, genesis, o1) = genesis_chain(IntraBlockPolicy::Independent, &a);

    let tx1 = spend(o1, &[(4, &b), (5, &a)], &a);
    let tx2 = spend(o1, &[(3, &c)], &a);

    let mut block = Block::new(Some(genesis.hash()), key(9).owner, 25);
    block.add_transaction(tx1.clone());
    block.add_transaction(tx2.clone());

    assert!(chain.add_block(block));
    let utxo = chain.max_height_utxo_set();
    assert!(!utxo.contains(&o1));
    assert!(utxo.contains(&tx1.outpoint(0)));
    assert!(utxo.contains(&tx1.outpoint(1)));
    assert!(utxo.contains(&tx2.outpoint(0)));
}

#[test]
fn test_applied_block_consumes_inputs_and_adds_outputs() {
    let (a, b) = (key(1), key(2));
    let miner = key(9);
    let (mut chain, genesis, o1) = genesis_chain(IntraBlockPolicy::Sequential, &a);

    let tx = spend(o1, &[(4, &b), (5, &a)], &a);
    let mut block = Block::new(Some(genesis.hash()), miner.owner.clone(), 25);
    block.add_transaction(tx.clone());
    assert!(chain.add_block(block.clone()));

    let utxo = chain.max_height_utxo_set();
    assert!(!utxo.contains(&o1));

    let to_b = utxo.get(&tx.outpoint(0)).unwrap();
    assert_eq!((to_b.value, &to_b.owner), (4, &b.owner));
    let change = utxo.get(&tx.outpoint(1)).unwrap();
    assert_eq!((change.value, &change.owner), (5, &a.owner));
    let reward = utxo.get(&block.coinbase.outpoint(0)).unwrap();
    assert_eq!((reward.value, &reward.owner), (25, &miner.owner));
    assert_eq!(utxo.len(), 3);
}

#[test]
fn test_double_spend_across_blocks_rejected() {
    let (a, b, c) = (key(1), key(2), key(3));
    let (mut chain, genesis, o1) = genesis_chain(IntraBlockPolicy::Independent, &a);

    let mut first = Block::new(Some(genesis.hash()), key(9).owner, 25);
    first.add_transaction(spend(o1, &[(10, &b)], &a));
    assert!(chain.add_block(first.clone()));

    let mut second = Block::new(Some(first.hash()), key(9).owner, 25);
    second.add_transaction(spend(o1, &[(10, &c)], &a));
    assert!(!chain.add_block(second));
    assert_eq!(chain.max_height(), 1);
}

#[test]
fn test_spend_on_competing_branch_is_independent() {
    let (a, b, c) = (key(1), key(2), key(3));
    let (mut chain, genesis, o1) = genesis_chain(IntraBlockPolicy::Sequential, &a);

    let mut left = Block::new(Some(genesis.hash()), key(8).owner, 25);
    left.add_transaction(spend(o1, &[(10, &b)], &a));
    assert!(chain.add_block(left));

    // O1 is still unspent on a sibling branch
    let mut right = Block::new(Some(genesis.hash()), key(9).owner, 25);
    right.add_transaction(spend(o1, &[(10, &c)], &a));
    assert!(chain.add_block(right.clone()));

    assert!(chain.utxo_set_of(&genesis.hash()).unwrap().contains(&o1));
    assert!(!chain.utxo_set_of(&right.hash()).unwrap().contains(&o1));
}

#[test]
fn test_coinbase_reward_spendable_in_next_block() {
    let (a, b) = (key(1), key(2));
    let miner = key(9);
    let (mut chain, genesis, _) = genesis_chain(IntraBlockPolicy::Sequential, &a);

    let first = Block::new(Some(genesis.hash()), miner.owner.clone(), 25);
    assert!(chain.add_block(first.clone()));

    let mut second = Block::new(Some(first.hash()), miner.owner.clone(), 25);
    second.add_transaction(spend(first.coinbase.outpoint(0), &[(25, &b)], &miner));
    assert!(chain.add_block(second));
    assert_eq!(chain.max_height(), 2);
}

#[test]
fn test_signature_from_wrong_key_rejected() {
    let (a, b, mallory) = (key(1), key(2), key(66));
    let (mut chain, genesis, o1) = genesis_chain(IntraBlockPolicy::Sequential, &a);

    let mut block = Block::new(Some(genesis.hash()), key(9).owner, 25);
    block.add_transaction(spend(o1, &[(10, &b)], &mallory));
    assert!(!chain.add_block(block));
}

#[test]
fn test_signature_replayed_at_other_input_rejected() {
    let a = key(1);
    let b = key(2);
    let genesis = Block::new(None, a.owner.clone(), 10);
    let mut chain = BlockChain::new(genesis.clone());

    // Give A two outputs
    let mut split = Transaction::new();
    split.add_input(genesis.coinbase.hash(), 0);
    split.add_output(5, a.owner.clone());
    split.add_output(5, a.owner.clone());
    sign_input(&mut split, 0, &a);
    let mut block = Block::new(Some(genesis.hash()), key(9).owner, 25);
    block.add_transaction(split.clone());
    assert!(chain.add_block(block));

    let mut tx = Transaction::new();
    tx.add_input(split.hash(), 0);
    tx.add_input(split.hash(), 1);
    tx.add_output(10, b.owner.clone());
    sign_input(&mut tx, 0, &a);
    let replayed = tx.inputs[0].signature.clone();
    tx.add_signature(replayed, 1);
    assert!(!chain_rules().is_valid_tx(&tx, chain.max_height_utxo_set()));

    sign_input(&mut tx, 1, &a);
    assert!(chain_rules().is_valid_tx(&tx, chain.max_height_utxo_set()));
}

#[test]
fn test_negative_output_rejected_even_when_covered() {
    let (a, b) = (key(1), key(2));
    let (chain, _, o1) = genesis_chain(IntraBlockPolicy::Sequential, &a);
    let tx = spend(o1, &[(-1, &b), (2, &a)], &a);
    assert!(!chain_rules().is_valid_tx(&tx, chain.max_height_utxo_set()));
}

#[test]
fn test_outputs_exceeding_inputs_rejected() {
    let (a, b) = (key(1), key(2));
    let (chain, _, o1) = genesis_chain(IntraBlockPolicy::Sequential, &a);
    let tx = spend(o1, &[(11, &b)], &a);
    assert!(!chain_rules().is_valid_tx(&tx, chain.max_height_utxo_set()));
}

#[test]
fn test_independent_transactions_order_does_not_matter() {
    let a = key(1);
    let b = key(2);
    let genesis = Block::new(None, a.owner.clone(), 10);
    let mut chain = BlockChain::new(genesis.clone());

    let mut split = Transaction::new();
    split.add_input(genesis.coinbase.hash(), 0);
    split.add_output(5, a.owner.clone());
    split.add_output(5, a.owner.clone());
    sign_input(&mut split, 0, &a);
    let mut block = Block::new(Some(genesis.hash()), key(9).owner, 25);
    block.add_transaction(split.clone());
    assert!(chain.add_block(block.clone()));

    let tx1 = spend(split.outpoint(0), &[(5, &b)], &a);
    let tx2 = spend(split.outpoint(1), &[(4, &b)], &a);

    let mut forward = Block::new(Some(block.hash()), key(7).owner, 25);
    forward.add_transaction(tx1.clone());
    forward.add_transaction(tx2.clone());
    let mut backward = Block::new(Some(block.hash()), key(8).owner, 25);
    backward.add_transaction(tx2);
    backward.add_transaction(tx1);

    assert!(chain.add_block(forward));
    assert!(chain.add_block(backward));
}

fn chain_rules() -> ChainRules {
    ChainRules::new()
}
