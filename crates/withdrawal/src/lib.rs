//! Withdrawal request lifecycle.
//!
//! Requests are queued by the protocol when a withdrawal is requested and can
//! be claimed once their exit delay has passed. Their state is always derived
//! from chain data, never invented locally.

pub mod state;
pub mod tracker;
pub mod types;

pub use state::{ManagerReader, RequestSource};
pub use tracker::{WithdrawalSummary, WithdrawalTracker};
pub use types::{RequestRecord, WithdrawalRequest, WithdrawalState};
