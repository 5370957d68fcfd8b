use crate::types::RequestRecord;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::BlockNumberOrTag;
use binding::supercluster::IWithdrawManager;
use std::future::Future;
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use tracing::{debug, warn};

/// Source of raw withdrawal requests and of chain time.
pub trait RequestSource: Send + Sync {
    /// Every request ever created for `owner`.
    fn requests(
        &self,
        owner: Address,
    ) -> impl Future<Output = eyre::Result<Vec<RequestRecord>>> + Send;

    /// Timestamp of the latest block.
    fn now(&self) -> impl Future<Output = eyre::Result<u64>> + Send;
}

/// Reads requests from the WithdrawManager contract.
pub struct ManagerReader<P> {
    provider: P,
    manager: Address,
}

impl<P> ManagerReader<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, manager: Address) -> Self {
        Self { provider, manager }
    }

    async fn request_ids(&self, owner: Address) -> eyre::Result<Vec<U256>> {
        let contract = IWithdrawManager::new(self.manager, &self.provider);
        Ok(contract.getUserRequestIds(owner).call().await?)
    }

    async fn request(&self, id: U256) -> eyre::Result<RequestRecord> {
        let contract = IWithdrawManager::new(self.manager, &self.provider);
        let request = contract.getRequest(id).call().await?;

        Ok(RequestRecord {
            id,
            owner: request.user,
            amount: request.amount,
            claimable_at: request.claimableAt.saturating_to::<u64>(),
            claimed: request.claimed,
        })
    }

    async fn latest_timestamp(&self) -> eyre::Result<u64> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await?
            .ok_or_else(|| eyre::eyre!("latest block not available"))?;
        Ok(block.header.timestamp)
    }
}

/// Run a read with exponential backoff: 100ms, 200ms, 400ms, 800ms, 1.6s (max 5 attempts).
async fn with_retry<T, F, Fut>(what: &'static str, read: F) -> eyre::Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = eyre::Result<T>>,
{
    let retry_strategy = ExponentialBackoff::from_millis(100).take(5);

    Retry::spawn(retry_strategy, || async {
        read().await.map_err(|e| {
            warn!(read = what, error = %e, "WithdrawManager read failed, will retry");
            e
        })
    })
    .await
}

impl<P> RequestSource for ManagerReader<P>
where
    P: Provider + Clone,
{
    async fn requests(&self, owner: Address) -> eyre::Result<Vec<RequestRecord>> {
        let ids = with_retry("getUserRequestIds", || self.request_ids(owner)).await?;
        debug!(owner = %owner, count = ids.len(), "Fetched withdrawal request ids");

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            records.push(with_retry("getRequest", || self.request(id)).await?);
        }
        Ok(records)
    }

    async fn now(&self) -> eyre::Result<u64> {
        with_retry("latestBlock", || self.latest_timestamp()).await
    }
}
