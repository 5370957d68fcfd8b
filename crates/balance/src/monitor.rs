use crate::{Balance, BalanceQuery, Monitor};
use alloy_primitives::Address;
use alloy_provider::Provider;
use binding::token::IERC20;
use eyre::{Result, WrapErr};
use tracing::debug;

/// Reads balances straight from an RPC provider.
pub struct BalanceMonitor<P> {
    provider: P,
}

impl<P> BalanceMonitor<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P> Monitor for BalanceMonitor<P>
where
    P: Provider + Clone,
{
    async fn query_balance(&self, query: BalanceQuery) -> Result<Balance> {
        let holder = query.holder();
        let (token, amount) = match query {
            BalanceQuery::Token { token, .. } => {
                let amount = IERC20::new(token, &self.provider)
                    .balanceOf(holder)
                    .call()
                    .await
                    .wrap_err_with(|| format!("Failed to read balance of token {token}"))?;
                (token, amount)
            }
            BalanceQuery::Gas { .. } => {
                let amount = self
                    .provider
                    .get_balance(holder)
                    .await
                    .wrap_err("Failed to read gas balance")?;
                (Address::ZERO, amount)
            }
        };
        debug!(token = %token, holder = %holder, amount = %amount, "Read balance");

        Ok(Balance {
            holder,
            token,
            amount,
        })
    }
}
