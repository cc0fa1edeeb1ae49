//! Chain configuration

use crate::constants::*;
use crate::error::{ConsensusError, Result};
use crate::types::{Amount, IntraBlockPolicy};
use serde::{Deserialize, Serialize};

/// Tunable chain parameters. Every field falls back to its default when
/// absent from a serialized config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Height distance behind the best tip for which blocks are retained.
    pub cutoff_age: u64,
    /// Reward minted by blocks assembled through [`crate::mining::create_block`].
    pub coinbase_value: Amount,
    pub intra_block_policy: IntraBlockPolicy,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            cutoff_age: CUT_OFF_AGE,
            coinbase_value: COINBASE_VALUE,
            intra_block_policy: IntraBlockPolicy::default(),
        }
    }
}

impl ChainConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ChainConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject parameter combinations the chain cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.coinbase_value < 0 {
            return Err(ConsensusError::Config(format!(
                "coinbase_value must be non-negative, got {}",
                self.coinbase_value
            )));
        }
        Ok(())
    }

    pub fn with_policy(mut self, policy: IntraBlockPolicy) -> Self {
        self.intra_block_policy = policy;
        self
    }

    pub fn with_cutoff_age(mut self, cutoff_age: u64) -> Self {
        self.cutoff_age = cutoff_age;
        self
    }
}
