//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// Every failure that crosses the controller boundary is one of these kinds.
/// Provider failures are converted before they reach the presentation layer.
#[derive(Error, Debug)]
pub enum Error {
    /// No wallet capability was detected in the host environment
    #[error("No wallet provider available: {0}")]
    ProviderUnavailable(String),

    /// The capability does not expose a required method
    #[error("Wallet capability missing: {0}")]
    CapabilityMissing(String),

    /// The user or the wallet refused account access
    #[error("Account access denied: {0}")]
    AccessDenied(String),

    #[error("Failed to connect wallet: {0}")]
    Connect(String),

    #[error("Failed to fetch account: {0}")]
    SessionFetch(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// Operation not allowed in the current session state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a transaction error
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(msg.into())
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ProviderUnavailable(_) => "provider_unavailable",
            Error::CapabilityMissing(_) => "capability_missing",
            Error::AccessDenied(_) => "access_denied",
            Error::Connect(_) => "connect",
            Error::SessionFetch(_) => "session_fetch",
            Error::Validation(_) => "validation",
            Error::Transaction(_) => "transaction",
            Error::InvalidState(_) => "invalid_state",
            Error::Storage(_) => "storage",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
        }
    }

    /// Fixed description of the error kind
    ///
    /// Carries none of the message text, which can echo user input or
    /// wallet-supplied detail. Used where errors are recorded rather than shown.
    pub fn summary(&self) -> &'static str {
        match self {
            Error::ProviderUnavailable(_) => "No wallet provider available",
            Error::CapabilityMissing(_) => "Wallet capability missing",
            Error::AccessDenied(_) => "Account access denied",
            Error::Connect(_) => "Failed to connect wallet",
            Error::SessionFetch(_) => "Failed to fetch account",
            Error::Validation(_) => "Invalid transfer request",
            Error::Transaction(_) => "Transaction failed",
            Error::InvalidState(_) => "Operation not allowed in the current session state",
            Error::Storage(_) => "Session storage failed",
            Error::Io(_) => "IO error",
            Error::Json(_) => "JSON error",
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Create a failed result with context
    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                let mut context = HashMap::new();
                context.insert("kind".to_string(), serde_json::Value::from(e.kind()));
                Self::fail_with_context(e.to_string(), context)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_result_ok() {
        let result: OperationResult<i32> = OperationResult::ok(42);
        assert!(result.success);
        assert_eq!(result.data, Some(42));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_operation_result_fail() {
        let result: OperationResult<i32> = OperationResult::fail("Something went wrong");
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.error, Some("Something went wrong".to_string()));
    }

    #[test]
    fn test_from_result_carries_kind() {
        let ok: Result<i32> = Ok(42);
        let result: OperationResult<i32> = ok.into();
        assert!(result.success);

        let err: Result<i32> = Err(Error::validation("bad input"));
        let result: OperationResult<i32> = err.into();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("Validation error"));
        let context = result.context.unwrap();
        assert_eq!(context["kind"], "validation");
    }

    #[test]
    fn test_summary_omits_message() {
        let err = Error::Transaction("insufficient funds for 0xabc have 5 want 7".to_string());
        assert_eq!(err.summary(), "Transaction failed");
        assert!(err.to_string().contains("0xabc"));
    }
}
