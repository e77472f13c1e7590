//! Demo wallet for onboarding and testing
//!
//! An in-process stand-in for an injected wallet: one pre-funded account on a
//! local development chain. Transfers are "mined" immediately. State lives
//! only as long as the process.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::domain::units::WEI_PER_ETHER;
use crate::domain::{Network, Wei};
use crate::ports::{ProviderError, ProviderResult, TransactionReceipt, WalletCapability};

/// Address of the demo account
pub const DEMO_ADDRESS: &str = "0xde40a1ce00000000000000000000000000000001";

/// Chain ID the demo wallet reports (local development chain)
pub const DEMO_CHAIN_ID: u64 = 31337;

/// Starting balance of the demo account, in ether
pub const DEMO_STARTING_ETHER: u128 = 10;

#[derive(Debug)]
struct DemoState {
    balance: Wei,
    nonce: u64,
    mined: HashMap<String, u64>,
    block_number: u64,
}

/// In-memory wallet capability
#[derive(Debug)]
pub struct DemoWallet {
    address: String,
    chain_id: u64,
    state: Mutex<DemoState>,
}

impl Default for DemoWallet {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoWallet {
    pub fn new() -> Self {
        Self::with_balance(Wei::new(DEMO_STARTING_ETHER * WEI_PER_ETHER))
    }

    pub fn with_balance(balance: Wei) -> Self {
        Self {
            address: DEMO_ADDRESS.to_string(),
            chain_id: DEMO_CHAIN_ID,
            state: Mutex::new(DemoState {
                balance,
                nonce: 0,
                mined: HashMap::new(),
                block_number: 1,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, DemoState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deterministic pseudo transaction hash
    fn transaction_hash(&self, to: &str, value: Wei, nonce: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.address.as_bytes());
        hasher.update(to.to_lowercase().as_bytes());
        hasher.update(value.value().to_be_bytes());
        hasher.update(nonce.to_be_bytes());
        format!("0x{}", hex::encode(hasher.finalize()))
    }
}

#[async_trait]
impl WalletCapability for DemoWallet {
    fn name(&self) -> &str {
        "demo"
    }

    fn is_wallet_capable(&self) -> bool {
        true
    }

    async fn request_accounts(&self) -> ProviderResult<()> {
        Ok(())
    }

    async fn get_address(&self) -> ProviderResult<String> {
        Ok(self.address.clone())
    }

    async fn get_balance(&self, address: &str) -> ProviderResult<Wei> {
        if address.eq_ignore_ascii_case(&self.address) {
            Ok(self.state().balance)
        } else {
            Ok(Wei::ZERO)
        }
    }

    async fn get_network(&self) -> ProviderResult<Network> {
        Ok(Network::from_chain_id(self.chain_id))
    }

    async fn sign_and_send_transaction(&self, to: &str, value: Wei) -> ProviderResult<String> {
        if to.trim().is_empty() {
            return Err(ProviderError::InvalidParams("missing recipient".to_string()));
        }

        let mut state = self.state();
        let remaining = state.balance.checked_sub(value).ok_or_else(|| ProviderError::Rpc {
            code: -32000,
            message: "insufficient funds for transfer".to_string(),
        })?;

        let hash = self.transaction_hash(to, value, state.nonce);
        state.balance = remaining;
        state.nonce += 1;
        state.block_number += 1;
        let block = state.block_number;
        state.mined.insert(hash.clone(), block);

        Ok(hash)
    }

    async fn wait_for_confirmation(&self, transaction_hash: &str) -> ProviderResult<TransactionReceipt> {
        let block = self
            .state()
            .mined
            .get(transaction_hash)
            .copied()
            .ok_or_else(|| ProviderError::InvalidParams(format!("unknown transaction {}", transaction_hash)))?;

        Ok(TransactionReceipt {
            transaction_hash: transaction_hash.to_string(),
            block_number: Some(block),
            success: true,
        })
    }
}
