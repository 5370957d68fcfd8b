//! Conversion between the rebasing sUSDC and the fixed-balance wsUSDC.

use crate::{
    amount::{ensure_within_balance, parse_amount},
    error::PreconditionError,
    Action, ActionReceipt, Call, SequenceOutcome, TransactionSequence,
};
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use binding::{supercluster::IWsToken, token::IERC20};
use config::NetworkConfig;

/// Wrap sUSDC into wsUSDC.
#[derive(Debug, Clone)]
pub struct Wrap {
    pub amount: String,
    /// sUSDC balance in base units
    pub balance: U256,
}

impl Action for Wrap {
    type Output = ActionReceipt;

    fn kind(&self) -> &'static str {
        "wrap"
    }

    fn plan(&self, network: &NetworkConfig) -> Result<TransactionSequence, PreconditionError> {
        let token = &network.tokens.s_token;
        let amount = parse_amount(&self.amount, token.decimals)?;
        ensure_within_balance(amount, self.balance, &token.symbol)?;

        let contracts = &network.contracts;
        let approve = IERC20::approveCall {
            spender: contracts.ws_token,
            amount,
        };
        let wrap = IWsToken::wrapCall {
            sTokenAmount: amount,
        };

        Ok(
            TransactionSequence::new(Call::new("approve", contracts.s_token, approve.abi_encode()))
                .then(Call::new("wrap", contracts.ws_token, wrap.abi_encode())),
        )
    }

    fn complete(&self, outcome: SequenceOutcome, _account: Address) -> ActionReceipt {
        outcome.into()
    }

    fn description(&self) -> String {
        format!("Wrap {} sUSDC", self.amount)
    }
}

/// Unwrap wsUSDC back into sUSDC. No approval needed.
#[derive(Debug, Clone)]
pub struct Unwrap {
    pub amount: String,
    /// wsUSDC balance in base units
    pub balance: U256,
}

impl Action for Unwrap {
    type Output = ActionReceipt;

    fn kind(&self) -> &'static str {
        "unwrap"
    }

    fn plan(&self, network: &NetworkConfig) -> Result<TransactionSequence, PreconditionError> {
        let token = &network.tokens.ws_token;
        let amount = parse_amount(&self.amount, token.decimals)?;
        ensure_within_balance(amount, self.balance, &token.symbol)?;

        let unwrap = IWsToken::unwrapCall {
            wsTokenAmount: amount,
        };
        Ok(TransactionSequence::new(Call::new(
            "unwrap",
            network.contracts.ws_token,
            unwrap.abi_encode(),
        )))
    }

    fn complete(&self, outcome: SequenceOutcome, _account: Address) -> ActionReceipt {
        outcome.into()
    }

    fn description(&self) -> String {
        format!("Unwrap {} wsUSDC", self.amount)
    }
}
