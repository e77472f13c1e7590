//! Wallet session domain model
//!
//! State machine:
//! ```text
//! Disconnected --connect/resume--> Connecting --ok--> Connected
//!      ^                               |                 |  ^
//!      |                            failure          send |  | done
//!      +-------------------------------+                 v  |
//!      +--------------disconnect (any state)-- SendingTransaction
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::network::Network;
use super::units::Wei;

/// Store key holding the last connected account address
pub const CONNECTED_ACCOUNT_KEY: &str = "connectedAccount";

/// Store key holding `"true"` after an explicit disconnect
pub const USER_DISCONNECTED_KEY: &str = "userDisconnected";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    SendingTransaction,
}

impl SessionState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        match (self, target) {
            (SessionState::Disconnected, SessionState::Connecting) => true,
            (SessionState::Connecting, SessionState::Connected) => true,
            (SessionState::Connecting, SessionState::Disconnected) => true,
            (SessionState::Connected, SessionState::SendingTransaction) => true,
            (SessionState::SendingTransaction, SessionState::Connected) => true,
            // Disconnect is allowed from anywhere
            (_, SessionState::Disconnected) => true,
            (a, b) if *a == b => true,
            _ => false,
        }
    }

    /// True while an operation is suspended on the wallet
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::Connecting | SessionState::SendingTransaction)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::SendingTransaction => "sending_transaction",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SessionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disconnected" => Ok(SessionState::Disconnected),
            "connecting" => Ok(SessionState::Connecting),
            "connected" => Ok(SessionState::Connected),
            "sending_transaction" => Ok(SessionState::SendingTransaction),
            _ => Err(format!("Unknown session state: {}", s)),
        }
    }
}

/// In-memory view of the connected account
///
/// Either fully populated (address, balance and network) or fully empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    pub account_address: Option<String>,
    pub balance_wei: Option<Wei>,
    pub network: Option<Network>,
    pub user_disconnected: bool,
}

impl Session {
    /// A fully populated session
    pub fn connected(address: impl Into<String>, balance: Wei, network: Network) -> Self {
        Self {
            account_address: Some(address.into()),
            balance_wei: Some(balance),
            network: Some(network),
            user_disconnected: false,
        }
    }

    /// An empty session, remembering whether the user chose to disconnect
    pub fn empty(user_disconnected: bool) -> Self {
        Self {
            user_disconnected,
            ..Self::default()
        }
    }

    pub fn network_name(&self) -> Option<&str> {
        self.network.as_ref().map(|n| n.name.as_str())
    }

    /// Balance formatted for display, e.g. `"2.0"`
    pub fn balance_ether(&self) -> Option<String> {
        self.balance_wei.map(|b| b.to_ether_string())
    }
}

/// The only session state that survives a restart
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSessionRecord {
    pub connected_account: Option<String>,
    pub user_disconnected: bool,
}

impl PersistedSessionRecord {
    /// Record written after a successful connect or resume
    pub fn connected(address: impl Into<String>) -> Self {
        Self {
            connected_account: Some(address.into()),
            user_disconnected: false,
        }
    }

    /// Record written after an explicit disconnect
    pub fn disconnected() -> Self {
        Self {
            connected_account: None,
            user_disconnected: true,
        }
    }

    /// Build from raw store entries
    ///
    /// An absent or unrecognised `userDisconnected` value counts as `false`.
    pub fn from_entries(connected_account: Option<String>, user_disconnected: Option<String>) -> Self {
        Self {
            connected_account: connected_account.filter(|a| !a.trim().is_empty()),
            user_disconnected: user_disconnected.as_deref().map(str::trim) == Some("true"),
        }
    }

    /// Whether a startup resume should be attempted
    pub fn is_resumable(&self) -> bool {
        self.connected_account.is_some() && !self.user_disconnected
    }

    pub fn user_disconnected_value(&self) -> &'static str {
        if self.user_disconnected {
            "true"
        } else {
            "false"
        }
    }
}

/// Serializable view of the controller for the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub account_address: Option<String>,
    pub balance_wei: Option<Wei>,
    pub balance_ether: Option<String>,
    pub network_name: Option<String>,
    pub chain_id: Option<u64>,
    pub user_disconnected: bool,
    /// The single current error message
    pub error: Option<String>,
    /// Outcome of the last transfer
    pub transaction_status: Option<String>,
    pub transfer_pending: bool,
}

impl SessionSnapshot {
    pub fn new(state: SessionState, session: &Session) -> Self {
        Self {
            state,
            account_address: session.account_address.clone(),
            balance_wei: session.balance_wei,
            balance_ether: session.balance_ether(),
            network_name: session.network_name().map(str::to_string),
            chain_id: session.network.as_ref().map(|n| n.chain_id),
            user_disconnected: session.user_disconnected,
            error: None,
            transaction_status: None,
            transfer_pending: false,
        }
    }
}
