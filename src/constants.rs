//! Ledger constants

/// Blocks whose height is more than this far below the best tip are evicted
/// from the chain index and can no longer be extended.
pub const CUT_OFF_AGE: u64 = 10;

/// Value of the reward output minted by every block's coinbase.
pub const COINBASE_VALUE: i64 = 25;

/// Index of the coinbase output that enters the UTXO set.
pub const COINBASE_OUTPUT_INDEX: u64 = 0;

/// Maximum number of stacked snapshot layers before a UTXO set is flattened.
pub const MAX_SNAPSHOT_DEPTH: usize = 32;
