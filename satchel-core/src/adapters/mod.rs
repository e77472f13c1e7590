//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - JSON-RPC over HTTP for the WalletCapability port
//! - Demo wallet for onboarding and testing
//! - Configuration-driven HostEnvironment
//! - JSON file and in-memory SessionStore

pub mod demo;
pub mod host;
pub mod jsonrpc;
pub mod store;

#[cfg(test)]
pub mod jsonrpc_mock;
