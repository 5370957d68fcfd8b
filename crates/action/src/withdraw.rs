use crate::{
    amount::{ensure_within_balance, parse_amount},
    error::PreconditionError,
    resolver::resolve_identifier,
    Action, Call, SequenceOutcome, TransactionOutcome, TransactionSequence,
};
use alloy_primitives::{Address, TxHash, U256};
use alloy_sol_types::SolCall;
use binding::supercluster::ISuperCluster::{self, TokenWithdrawn};
use config::NetworkConfig;
use tracing::{info, warn};

/// Request a withdrawal of sUSDC back to USDC through a pilot.
#[derive(Debug, Clone)]
pub struct Withdraw {
    pub amount: String,
    /// sUSDC balance in base units
    pub balance: U256,
    pub pilot: Address,
}

/// Submitted withdrawal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawReceipt {
    pub tx_hash: TxHash,
    /// Decimal request id from the `TokenWithdrawn` event, if one was found
    pub request_id: Option<String>,
    pub confirmed: bool,
    pub steps: Vec<TransactionOutcome>,
}

impl Action for Withdraw {
    type Output = WithdrawReceipt;

    fn kind(&self) -> &'static str {
        "withdraw"
    }

    fn plan(&self, network: &NetworkConfig) -> Result<TransactionSequence, PreconditionError> {
        let token = &network.tokens.s_token;
        let amount = parse_amount(&self.amount, token.decimals)?;
        ensure_within_balance(amount, self.balance, &token.symbol)?;

        let withdraw = ISuperCluster::withdrawCall {
            pilot: self.pilot,
            token: network.contracts.usdc,
            amount,
        };
        Ok(TransactionSequence::new(Call::new(
            "withdraw",
            network.contracts.super_cluster,
            withdraw.abi_encode(),
        )))
    }

    /// A confirmed request without a matching event is still a success.
    fn complete(&self, outcome: SequenceOutcome, account: Address) -> WithdrawReceipt {
        let request_id = outcome
            .last
            .receipt
            .as_ref()
            .and_then(|receipt| resolve_identifier::<TokenWithdrawn>(&receipt.logs, account));

        match &request_id {
            Some(id) => info!(request_id = %id, tx_hash = %outcome.tx_hash(), "Withdrawal requested"),
            None if outcome.confirmed() => {
                warn!(tx_hash = %outcome.tx_hash(), "Withdrawal confirmed but no request id found")
            }
            None => {}
        }

        WithdrawReceipt {
            tx_hash: outcome.tx_hash(),
            request_id,
            confirmed: outcome.confirmed(),
            steps: outcome.steps().cloned().collect(),
        }
    }

    fn description(&self) -> String {
        format!("Request withdrawal of {} sUSDC through pilot {}", self.amount, self.pilot)
    }
}
