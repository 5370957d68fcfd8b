use crate::{
    error::PreconditionError, Action, ActionReceipt, Call, SequenceOutcome, TransactionSequence,
};
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use binding::supercluster::IWithdrawManager;
use config::NetworkConfig;

/// Claim a withdrawal request whose exit delay has passed.
#[derive(Debug, Clone)]
pub struct Claim {
    pub request_id: U256,
}

impl Action for Claim {
    type Output = ActionReceipt;

    fn kind(&self) -> &'static str {
        "claim"
    }

    fn plan(&self, network: &NetworkConfig) -> Result<TransactionSequence, PreconditionError> {
        let claim = IWithdrawManager::claimCall {
            requestId: self.request_id,
        };
        Ok(TransactionSequence::new(Call::new(
            "claim",
            network.contracts.withdraw_manager,
            claim.abi_encode(),
        )))
    }

    fn complete(&self, outcome: SequenceOutcome, _account: Address) -> ActionReceipt {
        outcome.into()
    }

    fn description(&self) -> String {
        format!("Claim withdrawal request {}", self.request_id)
    }
}
