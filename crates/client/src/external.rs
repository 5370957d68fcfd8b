use crate::{WalletAdapter, WalletError};
use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;

/// Key-backed wallet reached through an alloy provider that already carries its signer.
#[derive(Debug, Clone)]
pub struct ExternalWallet<P> {
    provider: P,
    account: Address,
}

impl<P> ExternalWallet<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, account: Address) -> Self {
        Self { provider, account }
    }

    pub const fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P> WalletAdapter for ExternalWallet<P>
where
    P: Provider + Clone,
{
    async fn account(&self) -> Result<Option<Address>, WalletError> {
        Ok(Some(self.account))
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn send(
        &self,
        target: Address,
        calldata: Bytes,
        from: Address,
    ) -> Result<TxHash, WalletError> {
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(target)
            .with_input(calldata);

        let pending = self.provider.send_transaction(tx).await?;
        Ok(*pending.tx_hash())
    }
}
