//! Host environment adapter
//!
//! Decides which wallet capability, if any, is injected into this process.
//! Configuration plays the role of the browser's injected provider object.

use std::sync::Arc;

use anyhow::Result;

use crate::adapters::demo::DemoWallet;
use crate::adapters::jsonrpc::JsonRpcWallet;
use crate::config::Config;
use crate::ports::{HostEnvironment, WalletCapability};

const NOT_CONFIGURED: &str = "No wallet found. Set SATCHEL_RPC_URL (or wallet.rpcUrl in \
settings.json) to a wallet endpoint, or run 'satchel demo on'.";

/// Host environment holding at most one injected capability
pub struct InjectedHost {
    capability: Option<Arc<dyn WalletCapability>>,
    missing_reason: String,
}

impl InjectedHost {
    /// Host with the given capability injected
    pub fn with_capability(capability: Arc<dyn WalletCapability>) -> Self {
        Self {
            capability: Some(capability),
            missing_reason: String::new(),
        }
    }

    /// Host with nothing injected
    pub fn empty(reason: impl Into<String>) -> Self {
        Self {
            capability: None,
            missing_reason: reason.into(),
        }
    }

    /// Build from configuration: demo mode wins over an RPC URL
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.demo_mode {
            return Ok(Self::with_capability(Arc::new(DemoWallet::new())));
        }

        match &config.rpc_url {
            Some(url) => {
                let wallet = JsonRpcWallet::new(url, config.receipt_poll_interval)?;
                Ok(Self::with_capability(Arc::new(wallet)))
            }
            None => Ok(Self::empty(NOT_CONFIGURED)),
        }
    }
}

impl HostEnvironment for InjectedHost {
    fn injected(&self) -> Option<Arc<dyn WalletCapability>> {
        self.capability.clone()
    }

    fn missing_reason(&self) -> String {
        self.missing_reason.clone()
    }
}
