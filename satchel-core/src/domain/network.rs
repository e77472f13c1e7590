//! Network domain model

use serde::{Deserialize, Serialize};

/// The chain a wallet capability is currently pointed at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub chain_id: u64,
    pub name: String,
}

impl Network {
    /// Build a network from its chain ID using the conventional names
    pub fn from_chain_id(chain_id: u64) -> Self {
        Self {
            chain_id,
            name: Self::name_for_chain(chain_id).to_string(),
        }
    }

    /// Conventional short name for a chain ID, `"unknown"` when unlisted
    pub fn name_for_chain(chain_id: u64) -> &'static str {
        match chain_id {
            1 => "mainnet",
            5 => "goerli",
            10 => "optimism",
            56 => "bnb",
            100 => "xdai",
            137 => "matic",
            8453 => "base",
            17000 => "holesky",
            31337 => "anvil",
            42161 => "arbitrum",
            59144 => "linea",
            84532 => "base-sepolia",
            11155111 => "sepolia",
            _ => "unknown",
        }
    }
}
