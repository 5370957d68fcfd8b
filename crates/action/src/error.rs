//! Error normalization.
//!
//! Wallets, nodes and the client itself fail in many shapes. Everything that
//! reaches a user goes through [`normalize`] first, which yields a single
//! presentable message and whether the failure was the user cancelling.

use alloy_primitives::TxHash;
use client::WalletError;
use thiserror::Error;

use crate::sequence::TransactionOutcome;

/// Message used when a failure carries no usable text.
pub const FALLBACK_MESSAGE: &str = "Transaction failed. Please try again.";

const REJECTION_PHRASES: [&str; 2] = ["user denied", "user rejected"];

/// Check failed before anything was submitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("Wallet is not connected.")]
    NotConnected,

    #[error("Please switch to the correct network first.")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("Enter a valid amount.")]
    InvalidAmount,

    #[error("Amount exceeds your {symbol} balance.")]
    ExceedsBalance { symbol: String },
}

/// A sequence step failed. Earlier steps stay confirmed on chain.
#[derive(Error, Debug, Clone)]
#[error("{label} failed: {error}")]
pub struct SequenceFailure {
    /// Zero based index of the failing step
    pub step: usize,
    pub label: &'static str,
    /// Confirmed steps before the failure
    pub completed: Vec<TransactionOutcome>,
    /// Hash of the failing step when it was submitted before failing
    pub pending: Option<TxHash>,
    #[source]
    pub error: WalletError,
}

impl SequenceFailure {
    /// True when some earlier step already landed.
    pub fn is_partial(&self) -> bool {
        !self.completed.is_empty()
    }
}

/// Failure of a user action.
#[derive(Error, Debug, Clone)]
pub enum ActionError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// Reading wallet state before submitting failed
    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Sequence(#[from] SequenceFailure),
}

impl ActionError {
    pub fn normalize(&self) -> OperationError {
        normalize(&RawError::from(self))
    }
}

/// User facing failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct OperationError {
    pub message: String,
    pub is_user_rejection: bool,
}

/// Failure text as reported by its source, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawError {
    pub short_message: Option<String>,
    pub message: Option<String>,
}

impl RawError {
    pub fn new(short_message: Option<&str>, message: Option<&str>) -> Self {
        Self {
            short_message: short_message.map(str::to_string),
            message: message.map(str::to_string),
        }
    }

    fn short(&self) -> Option<&str> {
        self.short_message.as_deref().filter(|s| !s.is_empty())
    }

    fn long(&self) -> Option<&str> {
        self.message.as_deref().filter(|s| !s.is_empty())
    }
}

impl From<&WalletError> for RawError {
    fn from(err: &WalletError) -> Self {
        Self {
            short_message: err.short_message(),
            message: Some(err.to_string()),
        }
    }
}

impl From<&PreconditionError> for RawError {
    fn from(err: &PreconditionError) -> Self {
        Self::new(Some(&err.to_string()), None)
    }
}

impl From<&ActionError> for RawError {
    fn from(err: &ActionError) -> Self {
        match err {
            ActionError::Precondition(e) => e.into(),
            ActionError::Wallet(e) => e.into(),
            ActionError::Sequence(failure) => (&failure.error).into(),
        }
    }
}

impl From<&eyre::Report> for RawError {
    fn from(report: &eyre::Report) -> Self {
        let short_message = report
            .chain()
            .find_map(|e| e.downcast_ref::<WalletError>())
            .and_then(WalletError::short_message);

        Self {
            short_message,
            message: Some(report.to_string()),
        }
    }
}

/// Reduce a raw failure to one message and a rejection flag.
///
/// The message prefers the short form, then the long form, then a fixed
/// fallback. Rejection is detected in either field regardless of which one
/// supplied the message.
pub fn normalize(raw: &RawError) -> OperationError {
    let message = raw
        .short()
        .or_else(|| raw.long())
        .unwrap_or(FALLBACK_MESSAGE)
        .to_string();

    let is_user_rejection = [raw.short(), raw.long()]
        .into_iter()
        .flatten()
        .any(is_rejection_text);

    OperationError {
        message,
        is_user_rejection,
    }
}

fn is_rejection_text(text: &str) -> bool {
    let lower = text.to_lowercase();
    REJECTION_PHRASES.iter().any(|phrase| lower.contains(phrase))
}
