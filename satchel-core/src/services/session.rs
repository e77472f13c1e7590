//! Wallet session controller
//!
//! Owns the connection lifecycle for a single wallet account: resuming a
//! remembered session, connecting, disconnecting, refreshing balance and
//! network, and submitting value transfers.
//!
//! All mutable state sits behind one mutex that is released before every
//! wallet call. Each operation captures the session generation when it
//! starts; `disconnect` bumps it, so an operation that was suspended on the
//! wallet when the user disconnected finds a stale generation on return and
//! leaves the session alone.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;

use crate::domain::result::{Error, Result};
use crate::domain::{
    PersistedSessionRecord, Session, SessionSnapshot, SessionState, TransactionResult,
    TransferRequest, Wei, CONNECTED_ACCOUNT_KEY, USER_DISCONNECTED_KEY,
};
use crate::ports::{ProviderError, SessionStore};
use crate::services::gateway::{ProviderGateway, ProviderHandle};
use crate::services::logging::{LogEvent, LoggingService};

struct Inner {
    state: SessionState,
    session: Session,
    handle: Option<ProviderHandle>,
    draft: Option<TransferRequest>,
    last_error: Option<String>,
    last_status: Option<String>,
    generation: u64,
    record: PersistedSessionRecord,
}

/// Controller for one wallet session
pub struct WalletSessionController {
    gateway: ProviderGateway,
    store: Arc<dyn SessionStore>,
    confirmation_timeout: Duration,
    logger: Option<Arc<LoggingService>>,
    inner: Mutex<Inner>,
}

/// Fetch address, balance and network without prompting
async fn fetch_session(handle: &ProviderHandle) -> std::result::Result<Session, ProviderError> {
    let capability = handle.capability();
    let address = capability.get_address().await?;
    let balance = capability.get_balance(&address).await?;
    let network = capability.get_network().await?;
    Ok(Session::connected(address, balance, network))
}

fn write_record(store: &dyn SessionStore, record: &PersistedSessionRecord) -> Result<()> {
    store.apply(&[
        (CONNECTED_ACCOUNT_KEY, record.connected_account.as_deref()),
        (USER_DISCONNECTED_KEY, Some(record.user_disconnected_value())),
    ])
}

impl WalletSessionController {
    /// Create a controller, reading the persisted record once
    pub fn new(
        gateway: ProviderGateway,
        store: Arc<dyn SessionStore>,
        confirmation_timeout: Duration,
    ) -> Result<Self> {
        let record = PersistedSessionRecord::from_entries(
            store.get(CONNECTED_ACCOUNT_KEY)?,
            store.get(USER_DISCONNECTED_KEY)?,
        );

        Ok(Self {
            gateway,
            store,
            confirmation_timeout,
            logger: None,
            inner: Mutex::new(Inner {
                state: SessionState::Disconnected,
                session: Session::empty(record.user_disconnected),
                handle: None,
                draft: None,
                last_error: None,
                last_status: None,
                generation: 0,
                record,
            }),
        })
    }

    /// Record structured events through the given logger
    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn log(&self, event: LogEvent) {
        if let Some(logger) = &self.logger {
            let _ = logger.log(event);
        }
    }

    fn log_failure(&self, event: &str, provider: Option<&str>, error: &Error) {
        let mut entry = LogEvent::new(event).with_error(error.kind(), error.summary());
        if let Some(provider) = provider {
            entry = entry.with_provider(provider);
        }
        self.log(entry);
    }

    /// Move from `from` to `to`, returning the generation the operation runs under
    fn begin(&self, from: SessionState, to: SessionState, action: &str) -> Result<u64> {
        let mut inner = self.lock();
        if inner.state.is_busy() {
            return Err(Error::invalid_state(format!(
                "Cannot {} while {}: another wallet operation is in progress",
                action, inner.state
            )));
        }
        if inner.state != from {
            return Err(Error::invalid_state(format!(
                "Cannot {} while {}",
                action, inner.state
            )));
        }
        debug_assert!(inner.state.can_transition_to(to));

        inner.state = to;
        inner.last_error = None;
        Ok(inner.generation)
    }

    /// Persist and publish a freshly fetched session
    fn commit_connected(
        &self,
        generation: u64,
        handle: ProviderHandle,
        session: Session,
    ) -> Result<Session> {
        let mut inner = self.lock();
        if inner.generation != generation {
            return Err(Error::invalid_state("Wallet was disconnected while connecting"));
        }

        let address = session.account_address.clone().unwrap_or_default();
        let record = PersistedSessionRecord::connected(address);
        write_record(self.store.as_ref(), &record)?;

        inner.record = record;
        inner.session = session.clone();
        inner.handle = Some(handle);
        inner.state = SessionState::Connected;
        Ok(session)
    }

    /// Return to `Disconnected` after a failed connect or resume
    fn abort_connecting(&self, generation: u64, error: &Error) {
        let mut inner = self.lock();
        if inner.generation != generation {
            return;
        }
        inner.state = SessionState::Disconnected;
        inner.session = Session::empty(inner.record.user_disconnected);
        inner.handle = None;
        inner.last_error = Some(error.to_string());
    }

    /// Resume the remembered session without prompting
    ///
    /// Returns `Ok(None)` when there is nothing to resume: no remembered
    /// account, the user disconnected explicitly, or already connected.
    /// A failure leaves the persisted record untouched.
    pub async fn resume_if_possible(&self) -> Result<Option<Session>> {
        {
            let inner = self.lock();
            if !inner.record.is_resumable() || inner.state == SessionState::Connected {
                return Ok(None);
            }
        }

        let generation = self.begin(SessionState::Disconnected, SessionState::Connecting, "resume")?;

        let handle = match self.gateway.acquire().into_handle() {
            Ok(handle) => handle,
            Err(e) => {
                let err = Error::SessionFetch(e.to_string());
                self.abort_connecting(generation, &err);
                self.log_failure("session_resume_failed", None, &err);
                return Err(err);
            }
        };

        let result = match fetch_session(&handle).await {
            Ok(session) => self.commit_connected(generation, handle.clone(), session),
            Err(e) => Err(Error::SessionFetch(e.to_string())),
        };

        match result {
            Ok(session) => {
                self.log(LogEvent::new("session_resumed").with_provider(handle.name()));
                Ok(Some(session))
            }
            Err(err) => {
                self.abort_connecting(generation, &err);
                self.log_failure("session_resume_failed", Some(handle.name()), &err);
                Err(err)
            }
        }
    }

    /// Connect to the injected wallet, prompting for account access
    pub async fn connect(&self) -> Result<Session> {
        let generation = self.begin(SessionState::Disconnected, SessionState::Connecting, "connect")?;

        let handle = match self.gateway.acquire().into_handle() {
            Ok(handle) => handle,
            Err(err) => {
                self.abort_connecting(generation, &err);
                self.log_failure("wallet_connect_failed", None, &err);
                return Err(err);
            }
        };

        let result = match self.gateway.request_access(&handle).await {
            Ok(()) => match fetch_session(&handle).await {
                Ok(session) => self.commit_connected(generation, handle.clone(), session),
                Err(e) => Err(Error::Connect(e.to_string())),
            },
            Err(e) => Err(Error::Connect(e.to_string())),
        };

        match result {
            Ok(session) => {
                self.log(LogEvent::new("wallet_connected").with_provider(handle.name()));
                Ok(session)
            }
            Err(err) => {
                self.abort_connecting(generation, &err);
                self.log_failure("wallet_connect_failed", Some(handle.name()), &err);
                Err(err)
            }
        }
    }

    /// Forget the session and remember that the user chose to disconnect
    ///
    /// Allowed from any state and never fails. An operation suspended on the
    /// wallet will not repopulate the session when it returns.
    pub fn disconnect(&self) {
        let (provider, stored) = {
            let mut inner = self.lock();
            inner.generation += 1;

            let record = PersistedSessionRecord::disconnected();
            let stored = write_record(self.store.as_ref(), &record);
            let provider = inner.handle.take().map(|h| h.name().to_string());

            inner.record = record;
            inner.state = SessionState::Disconnected;
            inner.session = Session::empty(true);
            inner.draft = None;
            inner.last_error = None;
            inner.last_status = None;
            (provider, stored)
        };

        let mut event = LogEvent::new("wallet_disconnected");
        if let Some(provider) = provider {
            event = event.with_provider(provider);
        }
        if let Err(e) = stored {
            event = event.with_error(e.kind(), e.summary());
        }
        self.log(event);
    }

    /// Send a transfer, waiting up to the configured confirmation timeout
    pub async fn send_transfer(&self, request: &TransferRequest) -> Result<TransactionResult> {
        self.send_transfer_with_timeout(request, self.confirmation_timeout)
            .await
    }

    /// Send a transfer and wait for it to be mined
    ///
    /// The session stays `Connected` whatever the outcome. An elapsed
    /// timeout is reported as a transaction error; the transaction may
    /// still be mined later.
    pub async fn send_transfer_with_timeout(
        &self,
        request: &TransferRequest,
        timeout: Duration,
    ) -> Result<TransactionResult> {
        {
            let inner = self.lock();
            if inner.state != SessionState::Connected {
                let action = if inner.state.is_busy() {
                    format!("send while {}: another wallet operation is in progress", inner.state)
                } else {
                    format!("send while {}", inner.state)
                };
                return Err(Error::invalid_state(format!("Cannot {}", action)));
            }
        }

        let transfer = match request.validate() {
            Ok(transfer) => transfer,
            Err(err) => {
                self.lock().last_error = Some(err.to_string());
                self.log_failure("transfer_failed", None, &err);
                return Err(err);
            }
        };

        let generation = self.begin(
            SessionState::Connected,
            SessionState::SendingTransaction,
            "send",
        )?;
        let (handle, address) = {
            let inner = self.lock();
            (inner.handle.clone(), inner.session.account_address.clone())
        };
        let Some(handle) = handle else {
            let err = Error::invalid_state("No wallet connected");
            self.finish_send(generation, Err(&err), None);
            return Err(err);
        };

        let capability = handle.capability().clone();
        let outcome = async {
            let hash = capability
                .sign_and_send_transaction(&transfer.recipient, transfer.value)
                .await
                .map_err(|e| Error::transaction(e.to_string()))?;

            let receipt = tokio::time::timeout(timeout, capability.wait_for_confirmation(&hash))
                .await
                .map_err(|_| {
                    Error::transaction(format!(
                        "Timed out after {}s waiting for confirmation of {}",
                        timeout.as_secs(),
                        hash
                    ))
                })?
                .map_err(|e| Error::transaction(e.to_string()))?;

            if !receipt.success {
                return Err(Error::transaction(format!("Transaction {} reverted", hash)));
            }

            Ok::<_, Error>(TransactionResult {
                transaction_hash: hash,
                block_number: receipt.block_number,
                confirmed_at: Utc::now(),
            })
        }
        .await;

        match outcome {
            Ok(result) => {
                let balance = match &address {
                    Some(address) => capability.get_balance(address).await.ok(),
                    None => None,
                };
                self.finish_send(generation, Ok(&result), balance);
                self.log(LogEvent::new("transfer_sent").with_provider(handle.name()));
                Ok(result)
            }
            Err(err) => {
                self.finish_send(generation, Err(&err), None);
                self.log_failure("transfer_failed", Some(handle.name()), &err);
                Err(err)
            }
        }
    }

    fn finish_send(
        &self,
        generation: u64,
        outcome: std::result::Result<&TransactionResult, &Error>,
        balance: Option<Wei>,
    ) {
        let mut inner = self.lock();
        if inner.generation != generation {
            return;
        }

        inner.state = SessionState::Connected;
        inner.draft = None;
        match outcome {
            Ok(result) => {
                inner.last_status = Some(format!("Transaction sent: {}", result.transaction_hash));
                if let Some(balance) = balance {
                    inner.session.balance_wei = Some(balance);
                }
            }
            Err(err) => {
                inner.last_status = Some("Transaction failed".to_string());
                inner.last_error = Some(err.to_string());
            }
        }
    }

    /// Re-read balance and network for the connected account
    ///
    /// On failure the previous values are kept.
    pub async fn refresh(&self) -> Result<Session> {
        let (generation, handle, address) = {
            let mut inner = self.lock();
            if inner.state != SessionState::Connected {
                return Err(Error::invalid_state(format!("Cannot refresh while {}", inner.state)));
            }
            inner.last_error = None;
            (
                inner.generation,
                inner.handle.clone(),
                inner.session.account_address.clone(),
            )
        };
        let (Some(handle), Some(address)) = (handle, address) else {
            return Err(Error::invalid_state("No wallet connected"));
        };

        let capability = handle.capability();
        let fetched = async {
            let balance = capability.get_balance(&address).await?;
            let network = capability.get_network().await?;
            Ok::<_, ProviderError>((balance, network))
        }
        .await;

        let mut inner = self.lock();
        match fetched {
            Ok((balance, network)) => {
                if inner.generation == generation {
                    inner.session.balance_wei = Some(balance);
                    inner.session.network = Some(network);
                }
                let session = inner.session.clone();
                drop(inner);
                self.log(LogEvent::new("session_refreshed").with_provider(handle.name()));
                Ok(session)
            }
            Err(e) => {
                let err = Error::SessionFetch(e.to_string());
                if inner.generation == generation {
                    inner.last_error = Some(err.to_string());
                }
                drop(inner);
                self.log_failure("session_refresh_failed", Some(handle.name()), &err);
                Err(err)
            }
        }
    }

    /// Stage a transfer form while connected
    pub fn stage_transfer(&self, request: TransferRequest) -> Result<()> {
        let mut inner = self.lock();
        if inner.state != SessionState::Connected {
            return Err(Error::invalid_state(format!(
                "Cannot stage a transfer while {}",
                inner.state
            )));
        }
        inner.draft = Some(request);
        Ok(())
    }

    pub fn pending_transfer(&self) -> Option<TransferRequest> {
        self.lock().draft.clone()
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    pub fn session(&self) -> Session {
        self.lock().session.clone()
    }

    /// The record as last read from or written to the store
    pub fn persisted_record(&self) -> PersistedSessionRecord {
        self.lock().record.clone()
    }

    /// Name of the connected wallet, if any
    pub fn provider_name(&self) -> Option<String> {
        self.lock().handle.as_ref().map(|h| h.name().to_string())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.lock();
        let mut snapshot = SessionSnapshot::new(inner.state, &inner.session);
        snapshot.error = inner.last_error.clone();
        snapshot.transaction_status = inner.last_status.clone();
        snapshot.transfer_pending = inner.draft.is_some();
        snapshot
    }
}
