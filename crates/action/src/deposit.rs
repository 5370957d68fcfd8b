use crate::{
    amount::{ensure_within_balance, parse_amount},
    error::PreconditionError,
    Action, ActionReceipt, Call, SequenceOutcome, TransactionSequence,
};
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use binding::{supercluster::ISuperCluster, token::IERC20};
use config::NetworkConfig;

/// Deposit USDC through a pilot, receiving sUSDC.
#[derive(Debug, Clone)]
pub struct Deposit {
    /// Amount as entered, in whole USDC
    pub amount: String,
    /// Current USDC balance of the account, in base units
    pub balance: U256,
    /// Pilot the deposit is routed through
    pub pilot: Address,
}

impl Action for Deposit {
    type Output = ActionReceipt;

    fn kind(&self) -> &'static str {
        "deposit"
    }

    /// `approve(superCluster, amount)` on USDC, then `deposit(pilot, usdc, amount)`.
    fn plan(&self, network: &NetworkConfig) -> Result<TransactionSequence, PreconditionError> {
        let token = &network.tokens.usdc;
        let amount = parse_amount(&self.amount, token.decimals)?;
        ensure_within_balance(amount, self.balance, &token.symbol)?;

        let contracts = &network.contracts;
        let approve = IERC20::approveCall {
            spender: contracts.super_cluster,
            amount,
        };
        let deposit = ISuperCluster::depositCall {
            pilot: self.pilot,
            token: contracts.usdc,
            amount,
        };

        Ok(
            TransactionSequence::new(Call::new("approve", contracts.usdc, approve.abi_encode()))
                .then(Call::new(
                    "deposit",
                    contracts.super_cluster,
                    deposit.abi_encode(),
                )),
        )
    }

    fn complete(&self, outcome: SequenceOutcome, _account: Address) -> ActionReceipt {
        outcome.into()
    }

    fn description(&self) -> String {
        format!("Deposit {} USDC through pilot {}", self.amount, self.pilot)
    }
}
