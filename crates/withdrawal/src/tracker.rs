use crate::{
    state::RequestSource,
    types::{WithdrawalRequest, WithdrawalState},
};
use alloy_primitives::{Address, U256};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Aggregates over the current snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WithdrawalSummary {
    pub pending_count: usize,
    pub pending_amount: U256,
    pub ready_count: usize,
    pub ready_amount: U256,
    pub claimed_count: usize,
}

#[derive(Default)]
struct Snapshot {
    /// Refresh ticket the snapshot came from
    ticket: u64,
    requests: Vec<WithdrawalRequest>,
}

/// Tracks the withdrawal requests of one account.
///
/// Each refresh replaces the snapshot. When refreshes overlap, the one started
/// last wins and results of older ones are dropped.
pub struct WithdrawalTracker<S> {
    source: S,
    tickets: AtomicU64,
    snapshot: RwLock<Snapshot>,
}

impl<S> WithdrawalTracker<S>
where
    S: RequestSource,
{
    pub fn new(source: S) -> Self {
        Self {
            source,
            tickets: AtomicU64::new(0),
            snapshot: RwLock::new(Snapshot::default()),
        }
    }

    /// Re-read every request of `owner` and derive their states.
    ///
    /// Requests are ordered ready first, then pending, then claimed, newest first
    /// within each group.
    pub async fn refresh(&self, owner: Address) -> eyre::Result<Vec<WithdrawalRequest>> {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;

        let records = self.source.requests(owner).await?;
        let now = self.source.now().await?;

        let mut requests: Vec<_> = records
            .iter()
            .filter(|record| record.owner == owner)
            .map(|record| WithdrawalRequest::from_record(record, now))
            .collect();
        requests.sort_by(|a, b| a.state.rank().cmp(&b.state.rank()).then(b.id.cmp(&a.id)));

        let mut snapshot = self.snapshot.write().await;
        if ticket < snapshot.ticket {
            debug!(ticket, latest = snapshot.ticket, "Dropping stale withdrawal refresh");
            return Ok(snapshot.requests.clone());
        }
        snapshot.ticket = ticket;
        snapshot.requests = requests.clone();

        info!(
            owner = %owner,
            total = requests.len(),
            now,
            "Withdrawal requests refreshed"
        );
        Ok(requests)
    }

    /// Current snapshot.
    pub async fn requests(&self) -> Vec<WithdrawalRequest> {
        self.snapshot.read().await.requests.clone()
    }

    pub async fn summary(&self) -> WithdrawalSummary {
        let snapshot = self.snapshot.read().await;
        summarize(&snapshot.requests)
    }

    /// Optimistically mark a request as claimed until the next refresh.
    ///
    /// Returns false if the request is unknown or not claimable.
    pub async fn mark_claimed(&self, id: U256) -> bool {
        let mut snapshot = self.snapshot.write().await;
        let Some(request) = snapshot
            .requests
            .iter_mut()
            .find(|r| r.id == id && r.state == WithdrawalState::ReadyToClaim)
        else {
            return false;
        };
        request.state = WithdrawalState::Claimed;
        snapshot
            .requests
            .sort_by(|a, b| a.state.rank().cmp(&b.state.rank()).then(b.id.cmp(&a.id)));
        true
    }
}

fn summarize(requests: &[WithdrawalRequest]) -> WithdrawalSummary {
    requests
        .iter()
        .fold(WithdrawalSummary::default(), |mut summary, request| {
            match request.state {
                WithdrawalState::Pending => {
                    summary.pending_count += 1;
                    summary.pending_amount += request.amount;
                }
                WithdrawalState::ReadyToClaim => {
                    summary.ready_count += 1;
                    summary.ready_amount += request.amount;
                }
                WithdrawalState::Claimed => summary.claimed_count += 1,
            }
            summary
        })
}
