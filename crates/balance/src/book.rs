use crate::{BalanceQuery, Monitor};
use alloy_primitives::{utils::format_units, Address, U256};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Last fetched balances, keyed by (token, holder).
///
/// Nothing is refreshed implicitly. Callers `refetch` after an action confirms.
pub struct BalanceBook<M> {
    monitor: M,
    decimals: HashMap<Address, u8>,
    balances: RwLock<HashMap<(Address, Address), U256>>,
}

impl<M> BalanceBook<M>
where
    M: Monitor,
{
    /// Create a book for the given tokens and their decimal precision.
    pub fn new(monitor: M, tokens: impl IntoIterator<Item = (Address, u8)>) -> Self {
        Self {
            monitor,
            decimals: tokens.into_iter().collect(),
            balances: RwLock::new(HashMap::new()),
        }
    }

    pub fn decimals(&self, token: Address) -> Option<u8> {
        self.decimals.get(&token).copied()
    }

    /// Cached raw balance, None if never fetched.
    pub async fn balance(&self, token: Address, holder: Address) -> Option<U256> {
        self.balances.read().await.get(&(token, holder)).copied()
    }

    /// Cached balance rendered with the token's decimals, trailing zeros removed.
    pub async fn formatted(&self, token: Address, holder: Address) -> Option<String> {
        let amount = self.balance(token, holder).await?;
        let decimals = self.decimals(token)?;
        format_units(amount, decimals).ok().map(trim_fraction)
    }

    /// Re-read `tokens` for `holder`. The cache is only updated if every read succeeds.
    pub async fn refetch(&self, holder: Address, tokens: &[Address]) -> eyre::Result<()> {
        let mut fresh = Vec::with_capacity(tokens.len());
        for &token in tokens {
            let balance = self
                .monitor
                .query_balance(BalanceQuery::Token { token, holder })
                .await?;
            fresh.push(balance);
        }

        let mut balances = self.balances.write().await;
        for balance in fresh {
            debug!(token = %balance.token, holder = %holder, amount = %balance.amount, "Balance updated");
            balances.insert((balance.token, holder), balance.amount);
        }
        Ok(())
    }

    /// Gas token balance of `holder`, always read fresh.
    pub async fn gas(&self, holder: Address) -> eyre::Result<String> {
        let balance = self.monitor.query_balance(BalanceQuery::Gas { holder }).await?;
        Ok(trim_fraction(format_units(balance.amount, "ether")?))
    }
}

fn trim_fraction(value: String) -> String {
    if !value.contains('.') {
        return value;
    }
    value.trim_end_matches('0').trim_end_matches('.').to_string()
}
