//! Balance reads for the staking client.
//!
//! [`Monitor`] performs single on-chain reads. [`BalanceBook`] keeps the last
//! known token balances of the connected account so they can be shown and
//! checked against without a round trip, and is refetched after every
//! confirmed action.

pub mod book;
pub mod monitor;

pub use book::BalanceBook;
pub use monitor::BalanceMonitor;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Amount of one token held by one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub holder: Address,
    /// Token contract, `Address::ZERO` for the gas token
    pub token: Address,
    pub amount: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceQuery {
    /// ERC20 `balanceOf`
    Token { token: Address, holder: Address },
    /// Native balance used to pay for transactions
    Gas { holder: Address },
}

impl BalanceQuery {
    pub const fn holder(&self) -> Address {
        match self {
            Self::Token { holder, .. } | Self::Gas { holder } => *holder,
        }
    }
}

/// Source of on-chain balances.
pub trait Monitor: Send + Sync {
    fn query_balance(
        &self,
        query: BalanceQuery,
    ) -> impl Future<Output = eyre::Result<Balance>> + Send;
}
