//! Mock JSON-RPC wallet endpoint for testing
//!
//! A tiny HTTP server that answers the wallet methods used by
//! `JsonRpcWallet`, so the client can be exercised without a real node:
//! - `eth_requestAccounts` / `eth_accounts` return the configured accounts
//! - `eth_getBalance` returns the configured balance
//! - `eth_chainId` returns the configured chain
//! - `eth_sendTransaction` records the transaction and returns a fixed hash
//! - `eth_getTransactionReceipt` returns null for the first N polls

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::{json, Value as JsonValue};

/// Mock JSON-RPC server
pub struct MockRpcServer {
    port: u16,
    running: Arc<AtomicBool>,
    state: Arc<Mutex<MockState>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Configuration for mock responses
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub accounts: Vec<String>,
    pub balance_wei: u128,
    pub chain_id: u64,
    /// Answer `eth_requestAccounts` with error 4001
    pub reject_access: bool,
    /// Answer `eth_sendTransaction` with this error
    pub send_error: Option<(i64, String)>,
    /// Number of receipt polls answered with null before the receipt appears
    pub pending_polls: usize,
    /// Receipt status quantity (`0x1` success, `0x0` reverted)
    pub receipt_status: String,
    pub transaction_hash: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            accounts: vec!["0x00000000000000000000000000000000000000aa".to_string()],
            balance_wei: 2_000_000_000_000_000_000,
            chain_id: 1,
            reject_access: false,
            send_error: None,
            pending_polls: 0,
            receipt_status: "0x1".to_string(),
            transaction_hash: format!("0xdeadbeef{}", "0".repeat(56)),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    methods: Vec<String>,
    sent: Vec<JsonValue>,
    receipt_polls: usize,
}

impl MockRpcServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let state = Arc::new(Mutex::new(MockState::default()));

        // Non-blocking so the accept loop can observe shutdown
        listener.set_nonblocking(true)?;

        let running_clone = running.clone();
        let state_clone = state.clone();
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let state = state_clone.clone();
                        thread::spawn(move || {
                            handle_connection(stream, &cfg, &state);
                        });
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            state,
            thread_handle: Some(thread_handle),
        })
    }

    /// Get the endpoint URL for this mock server
    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Methods called so far, in order
    pub fn methods(&self) -> Vec<String> {
        self.state.lock().unwrap().methods.clone()
    }

    /// Transactions passed to `eth_sendTransaction`
    pub fn sent_transactions(&self) -> Vec<JsonValue> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockRpcServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read one HTTP request and return its body
fn read_body(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buffer = [0; 4096];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&data[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    Some(String::from_utf8_lossy(&data[header_end..]).to_string())
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, state: &Mutex<MockState>) {
    let _ = stream.set_nonblocking(false);

    let Some(body) = read_body(&mut stream) else {
        return;
    };

    let request: JsonValue = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(_) => {
            send_response(&mut stream, 400, "Bad Request", r#"{"error": "Invalid JSON"}"#);
            return;
        }
    };

    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or("").to_string();
    let params = request["params"].clone();

    state.lock().unwrap().methods.push(method.clone());

    let outcome: Result<JsonValue, (i64, String)> = match method.as_str() {
        "eth_requestAccounts" if config.reject_access => {
            Err((4001, "User rejected the request.".to_string()))
        }
        "eth_requestAccounts" | "eth_accounts" => Ok(json!(config.accounts)),
        "eth_getBalance" => Ok(json!(format!("{:#x}", config.balance_wei))),
        "eth_chainId" => Ok(json!(format!("{:#x}", config.chain_id))),
        "eth_sendTransaction" => match &config.send_error {
            Some((code, message)) => Err((*code, message.clone())),
            None => {
                state.lock().unwrap().sent.push(params[0].clone());
                Ok(json!(config.transaction_hash))
            }
        },
        "eth_getTransactionReceipt" => {
            let mut guard = state.lock().unwrap();
            guard.receipt_polls += 1;
            if guard.receipt_polls <= config.pending_polls {
                Ok(JsonValue::Null)
            } else {
                Ok(json!({
                    "transactionHash": params[0],
                    "blockNumber": "0x2a",
                    "status": config.receipt_status,
                }))
            }
        }
        _ => Err((-32601, format!("the method {} does not exist", method))),
    };

    let response = match outcome {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err((code, message)) => {
            json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
        }
    };

    send_response(&mut stream, 200, "OK", &response.to_string());
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::adapters::jsonrpc::JsonRpcWallet;
    use crate::domain::Wei;
    use crate::ports::{ProviderError, WalletCapability};

    const RECIPIENT: &str = "0x00000000000000000000000000000000000000bb";

    fn wallet(server: &MockRpcServer) -> JsonRpcWallet {
        JsonRpcWallet::new(&server.url(), Duration::from_millis(5)).unwrap()
    }

    #[tokio::test]
    async fn test_reads_account_balance_and_network() {
        let server = MockRpcServer::start(MockConfig::default()).unwrap();
        let wallet = wallet(&server);

        let address = wallet.get_address().await.unwrap();
        assert_eq!(address, "0x00000000000000000000000000000000000000aa");
        assert_eq!(
            wallet.get_balance(&address).await.unwrap(),
            Wei::new(2_000_000_000_000_000_000)
        );
        assert_eq!(wallet.get_network().await.unwrap().name, "mainnet");
    }

    #[tokio::test]
    async fn test_request_accounts_rejected() {
        let server = MockRpcServer::start(MockConfig {
            reject_access: true,
            ..Default::default()
        })
        .unwrap();

        let err = wallet(&server).request_accounts().await.unwrap_err();
        assert!(matches!(err, ProviderError::UserRejected(_)));
    }

    #[tokio::test]
    async fn test_no_accounts_is_rejection() {
        let server = MockRpcServer::start(MockConfig {
            accounts: vec![],
            ..Default::default()
        })
        .unwrap();

        let err = wallet(&server).get_address().await.unwrap_err();
        assert!(matches!(err, ProviderError::UserRejected(_)));
    }

    #[tokio::test]
    async fn test_send_and_confirm_after_pending_polls() {
        let server = MockRpcServer::start(MockConfig {
            pending_polls: 2,
            ..Default::default()
        })
        .unwrap();
        let wallet = wallet(&server);

        let hash = wallet
            .sign_and_send_transaction(RECIPIENT, Wei::new(500_000_000_000_000_000))
            .await
            .unwrap();
        assert!(hash.starts_with("0xdeadbeef"));

        let receipt = wallet.wait_for_confirmation(&hash).await.unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.block_number, Some(42));

        let sent = server.sent_transactions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["to"], RECIPIENT);
        assert_eq!(sent[0]["value"], "0x6f05b59d3b20000");
        assert_eq!(sent[0]["from"], "0x00000000000000000000000000000000000000aa");

        let polls = server
            .methods()
            .iter()
            .filter(|m| *m == "eth_getTransactionReceipt")
            .count();
        assert_eq!(polls, 3);
    }

    #[tokio::test]
    async fn test_send_error_surfaces() {
        let server = MockRpcServer::start(MockConfig {
            send_error: Some((-32000, "insufficient funds for gas * price + value".to_string())),
            ..Default::default()
        })
        .unwrap();

        let err = wallet(&server)
            .sign_and_send_transaction(RECIPIENT, Wei::new(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("insufficient funds"));
    }

    #[tokio::test]
    async fn test_invalid_recipient_not_sent() {
        let server = MockRpcServer::start(MockConfig::default()).unwrap();

        let err = wallet(&server)
            .sign_and_send_transaction("0xBBB", Wei::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidParams(_)));
        assert!(server.sent_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_method_is_unsupported() {
        let server = MockRpcServer::start(MockConfig::default()).unwrap();
        let wallet = wallet(&server);

        let err = wallet
            .call::<JsonValue>("wallet_switchEthereumChain", json!([]))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unsupported(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let server = MockRpcServer::start(MockConfig::default()).unwrap();
        let url = server.url();
        drop(server);

        let wallet = JsonRpcWallet::new(&url, Duration::from_millis(5)).unwrap();
        let err = wallet.get_address().await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
