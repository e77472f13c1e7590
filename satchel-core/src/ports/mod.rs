//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod session_store;
mod wallet;

pub use session_store::SessionStore;
pub use wallet::{
    HostEnvironment, ProviderError, ProviderResult, TransactionReceipt, WalletCapability,
};
