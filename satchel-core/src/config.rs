//! Configuration management
//!
//! Settings live in `settings.json` inside the satchel directory:
//! ```json
//! {
//!   "app": { "demoMode": false },
//!   "wallet": {
//!     "rpcUrl": "http://127.0.0.1:8545",
//!     "confirmationTimeoutSecs": 120,
//!     "receiptPollIntervalMs": 1000
//!   }
//! }
//! ```
//! Keys this crate does not manage are preserved on save.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Default bound on waiting for a transfer to be mined
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;

/// Default interval between receipt polls
pub const DEFAULT_RECEIPT_POLL_INTERVAL_MS: u64 = 1000;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    wallet: WalletSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    demo_mode: bool,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalletSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rpc_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confirmation_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    receipt_poll_interval_ms: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Satchel configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub demo_mode: bool,
    /// Wallet JSON-RPC endpoint; `None` means no wallet is injected
    pub rpc_url: Option<String>,
    pub confirmation_timeout: Duration,
    pub receipt_poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            demo_mode: false,
            rpc_url: None,
            confirmation_timeout: Duration::from_secs(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
            receipt_poll_interval: Duration::from_millis(DEFAULT_RECEIPT_POLL_INTERVAL_MS),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "true" | "1" | "yes" | "TRUE" | "YES" => Some(true),
        "false" | "0" | "no" | "FALSE" | "NO" => Some(false),
        _ => None,
    }
}

fn read_settings(settings_path: &Path) -> Result<SettingsFile> {
    if settings_path.exists() {
        let content = std::fs::read_to_string(settings_path)
            .with_context(|| format!("Failed to read {:?}", settings_path))?;
        Ok(serde_json::from_str(&content).unwrap_or_default())
    } else {
        Ok(SettingsFile::default())
    }
}

impl Config {
    /// Load config from the satchel directory
    ///
    /// Environment overrides (for CI/testing and one-off runs):
    /// - `SATCHEL_DEMO_MODE`: enable or disable the demo wallet
    /// - `SATCHEL_RPC_URL`: wallet JSON-RPC endpoint
    pub fn load(satchel_dir: &Path) -> Result<Self> {
        Self::load_with_env(satchel_dir, |key| std::env::var(key).ok())
    }

    /// Load config with an explicit environment lookup
    pub fn load_with_env(satchel_dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw = read_settings(&satchel_dir.join("settings.json"))?;

        let demo_mode = env("SATCHEL_DEMO_MODE")
            .as_deref()
            .and_then(parse_flag)
            .unwrap_or(raw.app.demo_mode);

        let rpc_url = env("SATCHEL_RPC_URL")
            .or(raw.wallet.rpc_url)
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        if let Some(url) = &rpc_url {
            Url::parse(url).with_context(|| format!("Invalid wallet RPC URL: {}", url))?;
        }

        Ok(Self {
            demo_mode,
            rpc_url,
            confirmation_timeout: Duration::from_secs(
                raw.wallet
                    .confirmation_timeout_secs
                    .unwrap_or(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
            ),
            receipt_poll_interval: Duration::from_millis(
                raw.wallet
                    .receipt_poll_interval_ms
                    .unwrap_or(DEFAULT_RECEIPT_POLL_INTERVAL_MS),
            ),
        })
    }

    /// Save config to the satchel directory
    /// Preserves other settings that the CLI doesn't manage
    pub fn save(&self, satchel_dir: &Path) -> Result<()> {
        let settings_path = satchel_dir.join("settings.json");

        let mut settings = read_settings(&settings_path)?;

        settings.app.demo_mode = self.demo_mode;
        settings.wallet.rpc_url = self.rpc_url.clone();
        settings.wallet.confirmation_timeout_secs = Some(self.confirmation_timeout.as_secs());
        settings.wallet.receipt_poll_interval_ms =
            Some(self.receipt_poll_interval.as_millis() as u64);

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Enable demo mode
    pub fn enable_demo_mode(&mut self) {
        self.demo_mode = true;
    }

    /// Disable demo mode
    pub fn disable_demo_mode(&mut self) {
        self.demo_mode = false;
    }
}
