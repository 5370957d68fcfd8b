//! User actions against the SuperCluster protocol.
//!
//! Each action turns validated user input into a [`TransactionSequence`],
//! which the [`TransactionSequencer`] submits step by step through whichever
//! wallet the session uses.

pub mod amount;
pub mod claim;
pub mod deposit;
pub mod error;
pub mod resolver;
pub mod sequence;
pub mod withdraw;
pub mod wrap;

use alloy_primitives::{Address, TxHash};
use config::NetworkConfig;
pub use error::{normalize, ActionError, OperationError, PreconditionError, RawError};
pub use sequence::{
    Call, SequenceOutcome, SequenceStatus, TransactionOutcome, TransactionSequence,
    TransactionSequencer,
};

/// Trait for user actions executed as a transaction sequence.
pub trait Action: Send + Sync {
    /// What the caller gets back once the sequence went through.
    type Output: Send;

    /// Short machine readable name, used in logs and metrics.
    fn kind(&self) -> &'static str;

    /// Validate the input and build the calls to submit.
    ///
    /// Runs after the wallet and chain checks. An error here means nothing is sent.
    fn plan(&self, network: &NetworkConfig) -> Result<TransactionSequence, PreconditionError>;

    /// Turn the sequence outcome into the action's result.
    fn complete(&self, outcome: SequenceOutcome, account: Address) -> Self::Output;

    /// Get a human-readable description of this action.
    fn description(&self) -> String;
}

/// Result of an action without a derived identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReceipt {
    /// Hash of the final transaction
    pub tx_hash: TxHash,
    /// Every submitted step, in order
    pub steps: Vec<TransactionOutcome>,
    /// False when the final transaction is still pending
    pub confirmed: bool,
}

impl From<SequenceOutcome> for ActionReceipt {
    fn from(outcome: SequenceOutcome) -> Self {
        Self {
            tx_hash: outcome.tx_hash(),
            confirmed: outcome.confirmed(),
            steps: outcome.steps().cloned().collect(),
        }
    }
}
