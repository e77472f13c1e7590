//! Provider gateway - detects the injected wallet and requests account access

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::ports::{HostEnvironment, ProviderError, WalletCapability};

/// A detected wallet capability
#[derive(Clone)]
pub struct ProviderHandle {
    capability: Arc<dyn WalletCapability>,
}

impl ProviderHandle {
    pub fn name(&self) -> &str {
        self.capability.name()
    }

    pub fn capability(&self) -> &Arc<dyn WalletCapability> {
        &self.capability
    }
}

impl std::fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("name", &self.name())
            .finish()
    }
}

/// Outcome of looking for a wallet capability
///
/// Absence is not an error here; callers decide what it means.
#[derive(Debug, Clone)]
pub enum Acquired {
    Available(ProviderHandle),
    Unavailable { reason: String },
}

impl Acquired {
    /// Convert to a handle, treating absence as `ProviderUnavailable`
    pub fn into_handle(self) -> Result<ProviderHandle> {
        match self {
            Acquired::Available(handle) => Ok(handle),
            Acquired::Unavailable { reason } => Err(Error::ProviderUnavailable(reason)),
        }
    }
}

/// Gateway between the session controller and the host environment
pub struct ProviderGateway {
    host: Arc<dyn HostEnvironment>,
}

impl ProviderGateway {
    pub fn new(host: Arc<dyn HostEnvironment>) -> Self {
        Self { host }
    }

    /// Look for an injected capability that identifies as a wallet
    pub fn acquire(&self) -> Acquired {
        match self.host.injected() {
            Some(capability) if capability.is_wallet_capable() => {
                Acquired::Available(ProviderHandle { capability })
            }
            Some(capability) => Acquired::Unavailable {
                reason: format!(
                    "The injected provider '{}' is not a wallet.",
                    capability.name()
                ),
            },
            None => Acquired::Unavailable {
                reason: self.host.missing_reason(),
            },
        }
    }

    /// Ask the wallet to authorize account access
    ///
    /// Single attempt. May prompt the user on the wallet side.
    pub async fn request_access(&self, handle: &ProviderHandle) -> Result<()> {
        if !handle.capability.supports_request_accounts() {
            return Err(Error::CapabilityMissing(format!(
                "'{}' cannot request account access",
                handle.name()
            )));
        }

        handle
            .capability
            .request_accounts()
            .await
            .map_err(access_error)
    }
}

fn access_error(error: ProviderError) -> Error {
    match error {
        ProviderError::UserRejected(message) => Error::AccessDenied(message),
        ProviderError::Unsupported(message) => Error::CapabilityMissing(message),
        other => Error::Connect(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::demo::DemoWallet;
    use crate::adapters::host::InjectedHost;
    use crate::domain::{Network, Wei};
    use crate::ports::{ProviderResult, TransactionReceipt};
    use async_trait::async_trait;

    /// Capability with configurable identity and access behaviour
    struct StubCapability {
        wallet: bool,
        request_method: bool,
        access: ProviderResult<()>,
    }

    #[async_trait]
    impl WalletCapability for StubCapability {
        fn name(&self) -> &str {
            "stub"
        }

        fn is_wallet_capable(&self) -> bool {
            self.wallet
        }

        fn supports_request_accounts(&self) -> bool {
            self.request_method
        }

        async fn request_accounts(&self) -> ProviderResult<()> {
            self.access.clone()
        }

        async fn get_address(&self) -> ProviderResult<String> {
            unimplemented!()
        }

        async fn get_balance(&self, _address: &str) -> ProviderResult<Wei> {
            unimplemented!()
        }

        async fn get_network(&self) -> ProviderResult<Network> {
            unimplemented!()
        }

        async fn sign_and_send_transaction(&self, _to: &str, _value: Wei) -> ProviderResult<String> {
            unimplemented!()
        }

        async fn wait_for_confirmation(&self, _hash: &str) -> ProviderResult<TransactionReceipt> {
            unimplemented!()
        }
    }

    fn gateway_with(stub: StubCapability) -> ProviderGateway {
        ProviderGateway::new(Arc::new(InjectedHost::with_capability(Arc::new(stub))))
    }

    fn stub(access: ProviderResult<()>) -> StubCapability {
        StubCapability {
            wallet: true,
            request_method: true,
            access,
        }
    }

    #[test]
    fn test_acquire_absent_reports_reason() {
        let gateway = ProviderGateway::new(Arc::new(InjectedHost::empty("No wallet found.")));
        match gateway.acquire() {
            Acquired::Unavailable { reason } => assert_eq!(reason, "No wallet found."),
            Acquired::Available(_) => panic!("expected no provider"),
        }
    }

    #[test]
    fn test_acquire_rejects_non_wallet() {
        let gateway = gateway_with(StubCapability {
            wallet: false,
            request_method: true,
            access: Ok(()),
        });
        let err = gateway.acquire().into_handle().unwrap_err();
        assert!(matches!(err, Error::ProviderUnavailable(_)));
    }

    #[test]
    fn test_acquire_demo_wallet() {
        let gateway =
            ProviderGateway::new(Arc::new(InjectedHost::with_capability(Arc::new(DemoWallet::new()))));
        let handle = gateway.acquire().into_handle().unwrap();
        assert_eq!(handle.name(), "demo");
    }

    #[tokio::test]
    async fn test_request_access_granted() {
        let gateway = gateway_with(stub(Ok(())));
        let handle = gateway.acquire().into_handle().unwrap();
        gateway.request_access(&handle).await.unwrap();
    }

    #[tokio::test]
    async fn test_request_access_rejected() {
        let gateway = gateway_with(stub(Err(ProviderError::UserRejected(
            "User rejected the request.".to_string(),
        ))));
        let handle = gateway.acquire().into_handle().unwrap();
        let err = gateway.request_access(&handle).await.unwrap_err();
        assert!(matches!(err, Error::AccessDenied(_)));
    }

    #[tokio::test]
    async fn test_request_access_without_method() {
        let gateway = gateway_with(StubCapability {
            wallet: true,
            request_method: false,
            access: Ok(()),
        });
        let handle = gateway.acquire().into_handle().unwrap();
        let err = gateway.request_access(&handle).await.unwrap_err();
        assert!(matches!(err, Error::CapabilityMissing(_)));
    }

    #[tokio::test]
    async fn test_request_access_transport_failure() {
        let gateway = gateway_with(stub(Err(ProviderError::Transport(
            "Unable to connect to wallet".to_string(),
        ))));
        let handle = gateway.acquire().into_handle().unwrap();
        let err = gateway.request_access(&handle).await.unwrap_err();
        assert!(matches!(err, Error::Connect(_)));
    }
}
