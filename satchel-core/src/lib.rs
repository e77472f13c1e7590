//! Satchel Core - wallet session controller
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (Session, Wei, TransferRequest, etc.)
//! - **ports**: Trait definitions for external dependencies (WalletCapability, SessionStore)
//! - **services**: Business logic orchestration (ProviderGateway, WalletSessionController)
//! - **adapters**: Concrete implementations (JSON-RPC wallet, demo wallet, session file)

pub mod adapters;
pub mod config;
pub mod domain;
mod log_migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::host::InjectedHost;
use adapters::store::JsonFileStore;
use config::Config;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{
    Network, PersistedSessionRecord, Session, SessionSnapshot, SessionState, TransactionResult,
    TransferRequest, Wei,
};
pub use services::{ProviderGateway, WalletSessionController};

/// Main context for Satchel operations
///
/// This is the primary entry point for all business logic. It wires the
/// configuration, the session store, the provider gateway and the
/// controller together.
pub struct SatchelContext {
    pub config: Config,
    pub logger: Option<Arc<LoggingService>>,
    pub controller: WalletSessionController,
}

impl SatchelContext {
    /// Create a new Satchel context
    ///
    /// `logger` is optional; a context without one records no events.
    pub fn new(satchel_dir: &Path, logger: Option<Arc<LoggingService>>) -> Result<Self> {
        let config = Config::load(satchel_dir)?;
        Self::with_config(satchel_dir, config, logger)
    }

    /// Create a context from an already loaded configuration
    pub fn with_config(
        satchel_dir: &Path,
        config: Config,
        logger: Option<Arc<LoggingService>>,
    ) -> Result<Self> {
        let host = InjectedHost::from_config(&config)?;
        let gateway = ProviderGateway::new(Arc::new(host));
        let store = Arc::new(JsonFileStore::in_dir(satchel_dir));

        let mut controller =
            WalletSessionController::new(gateway, store, config.confirmation_timeout)?;
        if let Some(logger) = &logger {
            controller = controller.with_logger(Arc::clone(logger));
        }

        Ok(Self {
            config,
            logger,
            controller,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_context_resumes_across_restarts() {
        let dir = tempdir().unwrap();
        let config = Config {
            demo_mode: true,
            ..Config::default()
        };

        {
            let ctx = SatchelContext::with_config(dir.path(), config.clone(), None).unwrap();
            ctx.controller.connect().await.unwrap();
        }

        let ctx = SatchelContext::with_config(dir.path(), config, None).unwrap();
        assert_eq!(ctx.controller.state(), SessionState::Disconnected);
        let resumed = ctx.controller.resume_if_possible().await.unwrap();
        assert!(resumed.is_some());
        assert_eq!(ctx.controller.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_context_logs_controller_events() {
        let dir = tempdir().unwrap();
        let logger = Arc::new(LoggingService::new(dir.path(), EntryPoint::Embedded, "test").unwrap());

        let ctx = SatchelContext::with_config(dir.path(), Config::default(), Some(logger.clone()))
            .unwrap();
        let err = ctx.controller.connect().await.unwrap_err();
        assert!(matches!(err, Error::ProviderUnavailable(_)));

        let errors = logger.get_errors(10).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].event, "wallet_connect_failed");
        assert_eq!(errors[0].error_kind.as_deref(), Some("provider_unavailable"));
    }
}
