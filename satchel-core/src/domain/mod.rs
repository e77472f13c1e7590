//! Core domain entities
//!
//! Pure data structures with validation logic - no I/O or external dependencies.

mod network;
pub mod result;
mod session;
mod transfer;
pub mod units;

pub use network::Network;
pub use session::{
    PersistedSessionRecord, Session, SessionSnapshot, SessionState, CONNECTED_ACCOUNT_KEY,
    USER_DISCONNECTED_KEY,
};
pub use transfer::{TransactionResult, TransferRequest, ValidatedTransfer};
pub use units::Wei;
