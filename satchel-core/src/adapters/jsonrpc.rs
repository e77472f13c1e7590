//! JSON-RPC wallet client
//!
//! Talks to an EIP-1193 style wallet endpoint over HTTP (a local signer, a
//! wallet bridge, or a development node with unlocked accounts). Accounts
//! must already be unlocked on the other side; this client never handles keys.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use url::Url;

use crate::domain::{Network, Wei};
use crate::ports::{ProviderError, ProviderResult, TransactionReceipt, WalletCapability};

/// EIP-1193 "user rejected request"
const USER_REJECTED_CODE: i64 = 4001;

/// EIP-1193 "unauthorized"
const UNAUTHORIZED_CODE: i64 = 4100;

/// JSON-RPC "method not found"
const METHOD_NOT_FOUND_CODE: i64 = -32601;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: JsonValue,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<JsonValue>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Receipt as returned by `eth_getTransactionReceipt`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: String,
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

fn address_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid address regex"))
}

/// Check an address is `0x` followed by 40 hex digits
pub fn is_valid_address(address: &str) -> bool {
    address_shape().is_match(address)
}

/// Parse a hex quantity such as `"0x1bc16d674ec80000"`
fn parse_quantity(raw: &str) -> ProviderResult<u128> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| ProviderError::InvalidResponse(format!("expected hex quantity, got {}", raw)))?;
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16)
        .map_err(|e| ProviderError::InvalidResponse(format!("bad hex quantity {}: {}", raw, e)))
}

fn to_quantity(value: u128) -> String {
    format!("{:#x}", value)
}

/// Wallet capability backed by a JSON-RPC endpoint
#[derive(Debug)]
pub struct JsonRpcWallet {
    client: Client,
    endpoint: Url,
    next_id: AtomicU64,
    poll_interval: Duration,
}

impl JsonRpcWallet {
    /// Create a client for the given endpoint URL
    pub fn new(endpoint: &str, poll_interval: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint).context("Invalid wallet RPC URL")?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            anyhow::bail!("Wallet RPC URL must use http or https");
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            next_id: AtomicU64::new(1),
            poll_interval,
        })
    }

    /// Issue a single JSON-RPC call
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: JsonValue,
    ) -> ProviderResult<T> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Transport(format!(
                "Wallet endpoint returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("{} response: {}", method, e)))?;

        if let Some(error) = body.error {
            return Err(Self::map_rpc_error(error));
        }

        let result = body.result.unwrap_or(JsonValue::Null);
        serde_json::from_value(result)
            .map_err(|e| ProviderError::InvalidResponse(format!("{} result: {}", method, e)))
    }

    fn map_request_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Transport(format!(
                "Wallet request timed out after {} seconds",
                REQUEST_TIMEOUT.as_secs()
            ))
        } else if error.is_connect() {
            ProviderError::Transport(format!("Unable to connect to wallet at {}", self.endpoint))
        } else {
            ProviderError::Transport(format!("Wallet request failed: {}", error))
        }
    }

    fn map_rpc_error(error: RpcErrorObject) -> ProviderError {
        match error.code {
            USER_REJECTED_CODE | UNAUTHORIZED_CODE => ProviderError::UserRejected(error.message),
            METHOD_NOT_FOUND_CODE => ProviderError::Unsupported(error.message),
            code => ProviderError::Rpc {
                code,
                message: error.message,
            },
        }
    }

    fn first_account(accounts: Vec<String>) -> ProviderResult<String> {
        accounts
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::UserRejected("no authorized accounts".to_string()))
    }

    fn map_receipt(receipt: RpcReceipt) -> ProviderResult<TransactionReceipt> {
        let block_number = match receipt.block_number.as_deref() {
            Some(raw) => Some(u64::try_from(parse_quantity(raw)?).map_err(|_| {
                ProviderError::InvalidResponse(format!("block number out of range: {}", raw))
            })?),
            None => None,
        };
        // Pre-Byzantium receipts carry no status; treat them as successful
        let success = match receipt.status.as_deref() {
            Some(raw) => parse_quantity(raw)? == 1,
            None => true,
        };

        Ok(TransactionReceipt {
            transaction_hash: receipt.transaction_hash,
            block_number,
            success,
        })
    }
}

#[async_trait]
impl WalletCapability for JsonRpcWallet {
    fn name(&self) -> &str {
        "json-rpc"
    }

    fn is_wallet_capable(&self) -> bool {
        true
    }

    async fn request_accounts(&self) -> ProviderResult<()> {
        let accounts: Vec<String> = self.call("eth_requestAccounts", json!([])).await?;
        Self::first_account(accounts).map(|_| ())
    }

    async fn get_address(&self) -> ProviderResult<String> {
        let accounts: Vec<String> = self.call("eth_accounts", json!([])).await?;
        Self::first_account(accounts)
    }

    async fn get_balance(&self, address: &str) -> ProviderResult<Wei> {
        let raw: String = self.call("eth_getBalance", json!([address, "latest"])).await?;
        parse_quantity(&raw).map(Wei::new)
    }

    async fn get_network(&self) -> ProviderResult<Network> {
        let raw: String = self.call("eth_chainId", json!([])).await?;
        let chain_id = u64::try_from(parse_quantity(&raw)?)
            .map_err(|_| ProviderError::InvalidResponse(format!("chain id out of range: {}", raw)))?;
        Ok(Network::from_chain_id(chain_id))
    }

    async fn sign_and_send_transaction(&self, to: &str, value: Wei) -> ProviderResult<String> {
        if !is_valid_address(to) {
            return Err(ProviderError::InvalidParams(
                "recipient must be 0x followed by 40 hex digits".to_string(),
            ));
        }

        let from = self.get_address().await?;
        let transaction = json!({
            "from": from,
            "to": to,
            "value": to_quantity(value.value()),
        });

        self.call("eth_sendTransaction", json!([transaction])).await
    }

    async fn wait_for_confirmation(&self, transaction_hash: &str) -> ProviderResult<TransactionReceipt> {
        loop {
            let receipt: Option<RpcReceipt> = self
                .call("eth_getTransactionReceipt", json!([transaction_hash]))
                .await?;

            if let Some(receipt) = receipt {
                return Self::map_receipt(receipt);
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
