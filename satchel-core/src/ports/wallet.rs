//! Wallet capability port
//!
//! Defines the interface to an externally supplied, already-unlocked signer
//! (a browser-extension style wallet, a local signer daemon, or the demo
//! wallet). The controller never sees anything beyond these calls.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Network, Wei};

/// Failure reported by a wallet capability
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The user or the wallet declined the request
    #[error("request rejected: {0}")]
    UserRejected(String),

    #[error("method not supported: {0}")]
    Unsupported(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// Error object returned by the wallet
    #[error("wallet error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Receipt of a mined transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub block_number: Option<u64>,
    /// False when the transaction was mined but reverted
    pub success: bool,
}

/// Wallet capability trait
///
/// Every async method is a single attempt; implementations never retry.
#[async_trait]
pub trait WalletCapability: Send + Sync {
    /// Display name (e.g., "json-rpc", "demo")
    fn name(&self) -> &str;

    /// Whether this capability matches the expected wallet signature
    fn is_wallet_capable(&self) -> bool;

    /// Whether the capability exposes an account-access request method
    fn supports_request_accounts(&self) -> bool {
        true
    }

    /// Ask the wallet to authorize account access. May prompt the user.
    async fn request_accounts(&self) -> ProviderResult<()>;

    /// Address of the active, already authorized account
    async fn get_address(&self) -> ProviderResult<String>;

    async fn get_balance(&self, address: &str) -> ProviderResult<Wei>;

    async fn get_network(&self) -> ProviderResult<Network>;

    /// Sign and broadcast a value transfer, returning the transaction hash
    async fn sign_and_send_transaction(&self, to: &str, value: Wei) -> ProviderResult<String>;

    /// Wait until the transaction is mined. Unbounded; callers add a timeout.
    async fn wait_for_confirmation(&self, transaction_hash: &str)
        -> ProviderResult<TransactionReceipt>;
}

/// Where a wallet capability may be injected from
pub trait HostEnvironment: Send + Sync {
    /// The injected capability, if any
    fn injected(&self) -> Option<Arc<dyn WalletCapability>>;

    /// Human-readable explanation used when nothing is injected
    fn missing_reason(&self) -> String;
}
