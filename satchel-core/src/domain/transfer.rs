//! Transfer request and result

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::units::{parse_ether, Wei};

/// A single-recipient value transfer as entered by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub recipient_address: String,
    pub amount_eth: String,
}

impl TransferRequest {
    pub fn new(recipient_address: impl Into<String>, amount_eth: impl Into<String>) -> Self {
        Self {
            recipient_address: recipient_address.into(),
            amount_eth: amount_eth.into(),
        }
    }

    /// Check both fields and convert the amount to wei
    pub fn validate(&self) -> Result<ValidatedTransfer> {
        let recipient = self.recipient_address.trim();
        if recipient.is_empty() || self.amount_eth.trim().is_empty() {
            return Err(Error::validation(
                "Please enter a valid recipient address and amount.",
            ));
        }

        Ok(ValidatedTransfer {
            recipient: recipient.to_string(),
            value: parse_ether(&self.amount_eth)?,
        })
    }
}

/// A transfer ready for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTransfer {
    pub recipient: String,
    pub value: Wei,
}

/// Outcome of a confirmed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    pub transaction_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    pub confirmed_at: DateTime<Utc>,
}
