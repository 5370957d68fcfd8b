//! One user's staking session.
//!
//! Glues the form guards, the transaction sequencer, balances and the
//! withdrawal tracker together. Every operation returns `Ok(None)` when its
//! form is already submitting.

use crate::{
    form::FormState,
    metrics::{Metrics, SequenceResult},
};
use action::{
    claim::Claim,
    deposit::Deposit,
    error::ActionError,
    withdraw::{Withdraw, WithdrawReceipt},
    wrap::{Unwrap, Wrap},
    Action, ActionReceipt, OperationError, RawError, TransactionOutcome, TransactionSequencer,
};
use alloy_primitives::{Address, TxHash, U256};
use balance::{BalanceBook, Monitor};
use client::{ReceiptClient, WalletAdapter};
use config::NetworkConfig;
use pilot::PilotStore;
use std::{sync::Arc, time::Instant};
use tracing::{debug, info, warn};
use withdrawal::{RequestSource, WithdrawalRequest, WithdrawalSummary, WithdrawalTracker};

/// Failure before or during an action.
enum Failure {
    Action(ActionError),
    Read(eyre::Report),
}

impl Failure {
    fn normalize(&self) -> OperationError {
        match self {
            Self::Action(e) => e.normalize(),
            Self::Read(e) => action::normalize(&RawError::from(e)),
        }
    }

    fn result(&self, normalized: &OperationError) -> SequenceResult {
        match self {
            _ if normalized.is_user_rejection => SequenceResult::Rejected,
            Self::Action(ActionError::Precondition(_)) => SequenceResult::Invalid,
            _ => SequenceResult::Failed,
        }
    }
}

impl From<ActionError> for Failure {
    fn from(err: ActionError) -> Self {
        Self::Action(err)
    }
}

pub struct StakingSession<W, R, M, S> {
    sequencer: TransactionSequencer<W, R>,
    pilots: Arc<PilotStore>,
    balances: BalanceBook<M>,
    tracker: WithdrawalTracker<S>,
    metrics: Metrics,
    pub deposit_form: FormState,
    /// Shared by wrap and unwrap
    pub wrap_form: FormState,
    pub withdraw_form: FormState,
    pub claim_form: FormState,
}

impl<W, R, M, S> StakingSession<W, R, M, S>
where
    W: WalletAdapter,
    R: ReceiptClient,
    M: Monitor,
    S: RequestSource,
{
    pub fn new(
        sequencer: TransactionSequencer<W, R>,
        pilots: Arc<PilotStore>,
        balances: BalanceBook<M>,
        tracker: WithdrawalTracker<S>,
        metrics: Metrics,
    ) -> Self {
        Self {
            sequencer,
            pilots,
            balances,
            tracker,
            metrics,
            deposit_form: FormState::new(),
            wrap_form: FormState::new(),
            withdraw_form: FormState::new(),
            claim_form: FormState::new(),
        }
    }

    pub const fn network(&self) -> &NetworkConfig {
        self.sequencer.network()
    }

    pub const fn pilots(&self) -> &Arc<PilotStore> {
        &self.pilots
    }

    /// Explorer link for a transaction.
    pub fn explorer_url(&self, tx_hash: TxHash) -> String {
        self.network().explorer_tx_url(tx_hash)
    }

    /// Approve and deposit USDC. Routed through `pilot`, or the selected pilot.
    pub async fn deposit(
        &self,
        amount: &str,
        pilot: Option<Address>,
    ) -> Result<Option<ActionReceipt>, OperationError> {
        let Some(_submission) = self.deposit_form.begin() else {
            debug!("Deposit already in flight, ignoring");
            return Ok(None);
        };
        let started = Instant::now();
        let usdc = self.network().contracts.usdc;

        let result = async {
            let (account, balance) = self.account_and_balance(usdc).await?;
            let action = Deposit {
                amount: amount.to_string(),
                balance,
                pilot: self.route_through(pilot).await,
            };
            let receipt = self.sequencer.execute_as(account, &action).await?;
            Ok::<_, Failure>((account, action, receipt))
        }
        .await;

        match result {
            Ok((account, action, receipt)) => {
                self.record_success(&action, &receipt.steps, receipt.tx_hash, started);
                self.deposit_form.succeed(
                    receipt.tx_hash,
                    None,
                    success_message(receipt.confirmed, "Deposit successful! Refreshing balance..."),
                );
                self.refetch_balances(account, &[usdc, self.network().contracts.s_token])
                    .await;
                Ok(Some(receipt))
            }
            Err(failure) => Err(self.record_failure(&self.deposit_form, "deposit", failure, started)),
        }
    }

    /// Approve and wrap sUSDC into wsUSDC.
    pub async fn wrap(&self, amount: &str) -> Result<Option<ActionReceipt>, OperationError> {
        let s_token = self.network().contracts.s_token;
        self.convert(amount, s_token, |balance| Wrap {
            amount: amount.to_string(),
            balance,
        }, "Wrap successful! Refreshing balance...")
        .await
    }

    /// Unwrap wsUSDC back into sUSDC.
    pub async fn unwrap(&self, amount: &str) -> Result<Option<ActionReceipt>, OperationError> {
        let ws_token = self.network().contracts.ws_token;
        self.convert(amount, ws_token, |balance| Unwrap {
            amount: amount.to_string(),
            balance,
        }, "Unwrap successful! Refreshing balance...")
        .await
    }

    async fn convert<A>(
        &self,
        amount: &str,
        token: Address,
        build: impl FnOnce(U256) -> A,
        message: &str,
    ) -> Result<Option<ActionReceipt>, OperationError>
    where
        A: Action<Output = ActionReceipt>,
    {
        let Some(_submission) = self.wrap_form.begin() else {
            debug!(amount, "Wrap form already submitting, ignoring");
            return Ok(None);
        };
        let started = Instant::now();

        let result = async {
            let (account, balance) = self.account_and_balance(token).await?;
            let action = build(balance);
            let receipt = self.sequencer.execute_as(account, &action).await?;
            Ok::<_, Failure>((account, action, receipt))
        }
        .await;

        match result {
            Ok((account, action, receipt)) => {
                self.record_success(&action, &receipt.steps, receipt.tx_hash, started);
                self.wrap_form
                    .succeed(receipt.tx_hash, None, success_message(receipt.confirmed, message));
                let contracts = &self.network().contracts;
                self.refetch_balances(account, &[contracts.s_token, contracts.ws_token])
                    .await;
                Ok(Some(receipt))
            }
            Err(failure) => Err(self.record_failure(&self.wrap_form, "wrap", failure, started)),
        }
    }

    /// Request a withdrawal of sUSDC. The request id is resolved from the receipt when possible.
    pub async fn request_withdraw(
        &self,
        amount: &str,
        pilot: Option<Address>,
    ) -> Result<Option<WithdrawReceipt>, OperationError> {
        let Some(_submission) = self.withdraw_form.begin() else {
            debug!("Withdrawal request already in flight, ignoring");
            return Ok(None);
        };
        let started = Instant::now();
        let s_token = self.network().contracts.s_token;

        let result = async {
            let (account, balance) = self.account_and_balance(s_token).await?;
            let action = Withdraw {
                amount: amount.to_string(),
                balance,
                pilot: self.route_through(pilot).await,
            };
            let receipt = self.sequencer.execute_as(account, &action).await?;
            Ok::<_, Failure>((account, action, receipt))
        }
        .await;

        match result {
            Ok((account, action, receipt)) => {
                self.record_success(&action, &receipt.steps, receipt.tx_hash, started);
                self.withdraw_form.succeed(
                    receipt.tx_hash,
                    receipt.request_id.clone(),
                    success_message(receipt.confirmed, "Withdrawal request submitted successfully!"),
                );
                self.refetch_balances(account, &[s_token]).await;
                self.refresh_tracker(account).await;
                Ok(Some(receipt))
            }
            Err(failure) => {
                Err(self.record_failure(&self.withdraw_form, "withdraw", failure, started))
            }
        }
    }

    /// Claim a ready withdrawal request.
    pub async fn claim(&self, request_id: U256) -> Result<Option<ActionReceipt>, OperationError> {
        let Some(_submission) = self.claim_form.begin() else {
            debug!(request_id = %request_id, "Claim already in flight, ignoring");
            return Ok(None);
        };
        self.claim_form.set_claiming(request_id);
        let started = Instant::now();

        let result = async {
            let account = self.sequencer.preflight().await?;
            let action = Claim { request_id };
            let receipt = self.sequencer.execute_as(account, &action).await?;
            Ok::<_, Failure>((account, action, receipt))
        }
        .await;

        match result {
            Ok((account, action, receipt)) => {
                self.record_success(&action, &receipt.steps, receipt.tx_hash, started);
                self.claim_form.succeed(
                    receipt.tx_hash,
                    None,
                    success_message(receipt.confirmed, "USDC claimed successfully!"),
                );
                if receipt.confirmed {
                    self.tracker.mark_claimed(request_id).await;
                }
                self.refetch_balances(account, &[self.network().contracts.usdc])
                    .await;
                self.refresh_tracker(account).await;
                Ok(Some(receipt))
            }
            Err(failure) => Err(self.record_failure(&self.claim_form, "claim", failure, started)),
        }
    }

    /// Re-read withdrawal requests of the connected account.
    pub async fn refresh_requests(&self) -> Result<Vec<WithdrawalRequest>, OperationError> {
        let account = self
            .sequencer
            .preflight()
            .await
            .map_err(|e| ActionError::normalize(&e))?;
        let requests = self
            .tracker
            .refresh(account)
            .await
            .map_err(|e| action::normalize(&RawError::from(&e)))?;
        self.metrics.set_withdrawals(&self.tracker.summary().await);
        Ok(requests)
    }

    pub async fn withdrawal_summary(&self) -> WithdrawalSummary {
        self.tracker.summary().await
    }

    /// Re-read every tracked balance of the connected account.
    pub async fn balances(&self) -> Result<Vec<(String, String)>, OperationError> {
        let account = self
            .sequencer
            .preflight()
            .await
            .map_err(|e| ActionError::normalize(&e))?;
        self.balances
            .refetch(account, &self.tracked_tokens())
            .await
            .map_err(|e| action::normalize(&RawError::from(&e)))?;

        let tokens = &self.network().tokens;
        let contracts = &self.network().contracts;
        let mut out = Vec::new();
        for (symbol, token) in [
            (&tokens.usdc.symbol, contracts.usdc),
            (&tokens.s_token.symbol, contracts.s_token),
            (&tokens.ws_token.symbol, contracts.ws_token),
        ] {
            let formatted = self
                .balances
                .formatted(token, account)
                .await
                .unwrap_or_else(|| "0".to_string());
            out.push((symbol.clone(), formatted));
        }
        Ok(out)
    }

    /// Gas token balance of the connected account.
    pub async fn gas_balance(&self) -> Result<String, OperationError> {
        let account = self
            .sequencer
            .preflight()
            .await
            .map_err(|e| ActionError::normalize(&e))?;
        self.balances
            .gas(account)
            .await
            .map_err(|e| action::normalize(&RawError::from(&e)))
    }

    fn tracked_tokens(&self) -> [Address; 3] {
        let contracts = &self.network().contracts;
        [contracts.usdc, contracts.s_token, contracts.ws_token]
    }

    /// Connected account and its on-chain balance of `token`, read fresh so
    /// rebases and outside transfers are seen by the amount check.
    async fn account_and_balance(&self, token: Address) -> Result<(Address, U256), Failure> {
        let account = self.sequencer.preflight().await?;
        self.balances
            .refetch(account, &[token])
            .await
            .map_err(Failure::Read)?;
        let balance = self
            .balances
            .balance(token, account)
            .await
            .unwrap_or_default();
        Ok((account, balance))
    }

    /// Explicit pilot, or the one currently persisted in the store.
    async fn route_through(&self, pilot: Option<Address>) -> Address {
        match pilot {
            Some(pilot) => pilot,
            None => self.pilots.latest().await,
        }
    }

    async fn refetch_balances(&self, account: Address, tokens: &[Address]) {
        if let Err(e) = self.balances.refetch(account, tokens).await {
            warn!(account = %account, error = %e, "Balance refetch failed");
        }
    }

    async fn refresh_tracker(&self, account: Address) {
        match self.tracker.refresh(account).await {
            Ok(_) => self.metrics.set_withdrawals(&self.tracker.summary().await),
            Err(e) => warn!(account = %account, error = %e, "Withdrawal refresh failed"),
        }
    }

    fn record_success<A: Action>(
        &self,
        action: &A,
        steps: &[TransactionOutcome],
        tx_hash: TxHash,
        started: Instant,
    ) {
        let confirmed = steps.iter().all(TransactionOutcome::confirmed);
        let result = if confirmed {
            SequenceResult::Confirmed
        } else {
            SequenceResult::Pending
        };

        self.metrics
            .record_submitted(steps.iter().map(|step| step.label));
        self.metrics
            .record_sequence(action.kind(), result, started.elapsed());
        info!(
            action = %action.description(),
            tx_hash = %tx_hash,
            confirmed,
            "Action completed"
        );
    }

    fn record_failure(
        &self,
        form: &FormState,
        kind: &'static str,
        failure: Failure,
        started: Instant,
    ) -> OperationError {
        let normalized = failure.normalize();
        let result = failure.result(&normalized);

        if let Failure::Action(ActionError::Sequence(sequence)) = &failure {
            self.metrics
                .record_submitted(sequence.completed.iter().map(|step| step.label));
            if sequence.pending.is_some() {
                self.metrics.record_submitted([sequence.label]);
            }
        }
        self.metrics.record_sequence(kind, result, started.elapsed());

        match result {
            SequenceResult::Rejected => info!(kind, "Action cancelled by user"),
            _ => warn!(kind, error = %normalized.message, "Action failed"),
        }
        form.fail(normalized.message.clone(), normalized.is_user_rejection);
        normalized
    }
}

fn success_message(confirmed: bool, message: &str) -> String {
    if confirmed {
        message.to_string()
    } else {
        "Transaction submitted and still pending, check later.".to_string()
    }
}
