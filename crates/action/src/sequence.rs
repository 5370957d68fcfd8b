//! Dependency-gated execution of on-chain calls.
//!
//! A [`TransactionSequence`] is one user action spread over several
//! transactions, e.g. an ERC20 approval followed by the call spending it.
//! Each step is only submitted once the previous one is confirmed on chain.

use crate::{
    error::{ActionError, PreconditionError, SequenceFailure},
    Action,
};
use alloy_primitives::{Address, Bytes, TxHash};
use client::{Receipt, ReceiptClient, WalletAdapter, WalletError};
use config::NetworkConfig;
use tracing::{info, warn};

/// A single contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub label: &'static str,
    pub target: Address,
    pub calldata: Bytes,
}

impl Call {
    pub fn new(label: &'static str, target: Address, calldata: impl Into<Bytes>) -> Self {
        Self {
            label,
            target,
            calldata: calldata.into(),
        }
    }
}

/// Ordered, non-empty list of calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSequence {
    earlier: Vec<Call>,
    last: Call,
}

impl TransactionSequence {
    pub const fn new(call: Call) -> Self {
        Self {
            earlier: Vec::new(),
            last: call,
        }
    }

    /// Append a call that depends on every call before it.
    pub fn then(mut self, call: Call) -> Self {
        let previous = std::mem::replace(&mut self.last, call);
        self.earlier.push(previous);
        self
    }

    pub fn len(&self) -> usize {
        self.earlier.len() + 1
    }

    pub fn calls(&self) -> impl Iterator<Item = &Call> {
        self.earlier.iter().chain(std::iter::once(&self.last))
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.calls().map(|call| call.label).collect()
    }
}

/// A submitted step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub label: &'static str,
    pub tx_hash: TxHash,
    /// None while the transaction is still pending
    pub receipt: Option<Receipt>,
}

impl TransactionOutcome {
    pub fn confirmed(&self) -> bool {
        self.receipt.as_ref().is_some_and(|r| r.success)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStatus {
    /// Every step confirmed
    Confirmed,
    /// Final step submitted, confirmation still outstanding
    Pending,
}

/// Result of a sequence that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceOutcome {
    pub earlier: Vec<TransactionOutcome>,
    pub last: TransactionOutcome,
    pub status: SequenceStatus,
}

impl SequenceOutcome {
    /// Hash of the final step.
    pub const fn tx_hash(&self) -> TxHash {
        self.last.tx_hash
    }

    pub fn confirmed(&self) -> bool {
        self.status == SequenceStatus::Confirmed
    }

    pub fn steps(&self) -> impl Iterator<Item = &TransactionOutcome> {
        self.earlier.iter().chain(std::iter::once(&self.last))
    }
}

/// Runs actions through a wallet and waits on their receipts.
pub struct TransactionSequencer<W, R> {
    wallet: W,
    receipts: R,
    network: NetworkConfig,
}

impl<W, R> TransactionSequencer<W, R>
where
    W: WalletAdapter,
    R: ReceiptClient,
{
    pub const fn new(wallet: W, receipts: R, network: NetworkConfig) -> Self {
        Self {
            wallet,
            receipts,
            network,
        }
    }

    pub const fn wallet(&self) -> &W {
        &self.wallet
    }

    pub const fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Connected account and chain, checked against the configured network.
    pub async fn preflight(&self) -> Result<Address, ActionError> {
        let account = self
            .wallet
            .account()
            .await?
            .ok_or(PreconditionError::NotConnected)?;

        let chain_id = self.wallet.chain_id().await?;
        if !self.network.is_correct_chain(chain_id) {
            return Err(PreconditionError::WrongNetwork {
                expected: self.network.chain_id,
                actual: chain_id,
            }
            .into());
        }

        Ok(account)
    }

    /// Check preconditions, then submit and confirm each step of `action` in order.
    ///
    /// Nothing is submitted when a precondition fails.
    pub async fn execute<A: Action>(&self, action: &A) -> Result<A::Output, ActionError> {
        let account = self.preflight().await?;
        self.execute_as(account, action).await
    }

    /// Like [`execute`](Self::execute) for an `account` that already passed
    /// [`preflight`](Self::preflight).
    pub async fn execute_as<A: Action>(
        &self,
        account: Address,
        action: &A,
    ) -> Result<A::Output, ActionError> {
        let sequence = action.plan(&self.network)?;

        info!(
            action = %action.description(),
            account = %account,
            steps = sequence.len(),
            "Executing transaction sequence"
        );

        let outcome = self.run(sequence, account).await?;
        Ok(action.complete(outcome, account))
    }

    async fn run(
        &self,
        sequence: TransactionSequence,
        from: Address,
    ) -> Result<SequenceOutcome, SequenceFailure> {
        let TransactionSequence { earlier, last } = sequence;
        let mut completed = Vec::with_capacity(earlier.len());

        for (step, call) in earlier.into_iter().enumerate() {
            let failure = |error: WalletError,
                           pending: Option<TxHash>,
                           completed: &[TransactionOutcome]| SequenceFailure {
                step,
                label: call.label,
                completed: completed.to_vec(),
                pending,
                error,
            };

            let tx_hash = self
                .submit(step, &call, from)
                .await
                .map_err(|e| failure(e, None, &completed))?;

            let receipt = self
                .confirm(step, &call, tx_hash)
                .await
                .map_err(|e| failure(e, Some(tx_hash), &completed))?;

            completed.push(TransactionOutcome {
                label: call.label,
                tx_hash,
                receipt: Some(receipt),
            });
        }

        let step = completed.len();
        let failure = |error: WalletError,
                       pending: Option<TxHash>,
                       completed: Vec<TransactionOutcome>| SequenceFailure {
            step,
            label: last.label,
            completed,
            pending,
            error,
        };

        let tx_hash = match self.submit(step, &last, from).await {
            Ok(tx_hash) => tx_hash,
            Err(e) => return Err(failure(e, None, completed)),
        };

        let (receipt, status) = match self.confirm(step, &last, tx_hash).await {
            Ok(receipt) => (Some(receipt), SequenceStatus::Confirmed),
            Err(WalletError::ConfirmationTimeout(_)) => {
                warn!(
                    step,
                    label = last.label,
                    tx_hash = %tx_hash,
                    "Final transaction still pending, check later"
                );
                (None, SequenceStatus::Pending)
            }
            Err(e) => return Err(failure(e, Some(tx_hash), completed)),
        };

        Ok(SequenceOutcome {
            earlier: completed,
            last: TransactionOutcome {
                label: last.label,
                tx_hash,
                receipt,
            },
            status,
        })
    }

    async fn submit(&self, step: usize, call: &Call, from: Address) -> Result<TxHash, WalletError> {
        let tx_hash = self
            .wallet
            .send(call.target, call.calldata.clone(), from)
            .await?;

        info!(
            step,
            label = call.label,
            target = %call.target,
            tx_hash = %tx_hash,
            "Transaction submitted"
        );
        Ok(tx_hash)
    }

    async fn confirm(
        &self,
        step: usize,
        call: &Call,
        tx_hash: TxHash,
    ) -> Result<Receipt, WalletError> {
        let receipt = self.receipts.wait_for_receipt(tx_hash).await?;
        if !receipt.success {
            warn!(step, label = call.label, tx_hash = %tx_hash, "Transaction reverted");
            return Err(WalletError::Reverted(tx_hash));
        }

        info!(
            step,
            label = call.label,
            tx_hash = %tx_hash,
            block = ?receipt.block_number,
            gas_used = receipt.gas_used,
            "Transaction confirmed"
        );
        Ok(receipt)
    }
}
