//! Per-form submission state.
//!
//! Each user facing form allows one submission at a time. A trigger arriving
//! while a submission is in flight is ignored, not queued.

use action::OperationError;
use alloy_primitives::{TxHash, U256};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, MutexGuard, PoisonError,
};

/// Outcome to present once a submission ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
    /// The user cancelled in the wallet. Nothing to report.
    Dismissed,
}

/// Point in time view of a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSnapshot {
    pub is_submitting: bool,
    /// Last failure. User rejections are never stored here.
    pub error: Option<String>,
    pub tx_hash: Option<TxHash>,
    /// Request id of the last withdrawal request, if it could be resolved
    pub latest_request_id: Option<String>,
    /// Request currently being claimed
    pub claiming_id: Option<U256>,
    pub notice: Option<Notice>,
}

#[derive(Default)]
pub struct FormState {
    submitting: AtomicBool,
    state: Mutex<FormSnapshot>,
}

/// Held for the duration of a submission. Dropping it re-opens the form.
pub struct Submission<'a> {
    form: &'a FormState,
}

impl Drop for Submission<'_> {
    fn drop(&mut self) {
        self.form.lock().claiming_id = None;
        self.form.submitting.store(false, Ordering::SeqCst);
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FormSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Start a submission, clearing the previous result.
    ///
    /// Returns None if a submission is already in flight.
    pub fn begin(&self) -> Option<Submission<'_>> {
        self.submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;

        let mut state = self.lock();
        state.error = None;
        state.tx_hash = None;
        state.latest_request_id = None;
        state.notice = None;
        Some(Submission { form: self })
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            is_submitting: self.is_submitting(),
            ..self.lock().clone()
        }
    }

    pub fn reset_error(&self) {
        self.lock().error = None;
    }

    /// Clear everything except an in-flight submission.
    pub fn reset(&self) {
        *self.lock() = FormSnapshot::default();
    }

    pub(crate) fn set_claiming(&self, id: U256) {
        self.lock().claiming_id = Some(id);
    }

    pub(crate) fn succeed(&self, tx_hash: TxHash, request_id: Option<String>, message: String) {
        let mut state = self.lock();
        state.tx_hash = Some(tx_hash);
        state.latest_request_id = request_id;
        state.notice = Some(Notice::Success(message));
    }

    pub(crate) fn fail(&self, message: String, is_user_rejection: bool) {
        let mut state = self.lock();
        if is_user_rejection {
            state.notice = Some(Notice::Dismissed);
        } else {
            state.error = Some(message.clone());
            state.notice = Some(Notice::Error(message));
        }
    }
}

/// How a session call ended, with wallet cancellations split from failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled<T> {
    Done(T),
    /// The user declined in the wallet
    Cancelled,
    /// Another submission of the same form was in flight
    Ignored,
}

impl<T> Settled<T> {
    pub fn from_result(result: Result<Option<T>, OperationError>) -> Result<Self, OperationError> {
        match result {
            Ok(Some(value)) => Ok(Self::Done(value)),
            Ok(None) => Ok(Self::Ignored),
            Err(e) if e.is_user_rejection => Ok(Self::Cancelled),
            Err(e) => Err(e),
        }
    }
}
