//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

pub mod gateway;
pub mod logging;
mod session;

pub use gateway::{Acquired, ProviderGateway, ProviderHandle};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use session::WalletSessionController;
