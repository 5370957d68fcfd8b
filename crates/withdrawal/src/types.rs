use alloy_primitives::{Address, U256};

/// Request as stored by the WithdrawManager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    pub id: U256,
    pub owner: Address,
    pub amount: U256,
    /// Unix timestamp from which the request can be claimed
    pub claimable_at: u64,
    pub claimed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WithdrawalState {
    /// Exit delay not elapsed yet
    Pending,
    ReadyToClaim,
    Claimed,
}

impl WithdrawalState {
    /// Derive the state of `record` at chain time `now`.
    pub const fn derive(record: &RequestRecord, now: u64) -> Self {
        if record.claimed {
            Self::Claimed
        } else if now >= record.claimable_at {
            Self::ReadyToClaim
        } else {
            Self::Pending
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::ReadyToClaim => "ready",
            Self::Claimed => "claimed",
        }
    }

    /// Display order: claimable first, history last.
    pub(crate) const fn rank(&self) -> u8 {
        match self {
            Self::ReadyToClaim => 0,
            Self::Pending => 1,
            Self::Claimed => 2,
        }
    }
}

/// Withdrawal request with its derived state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalRequest {
    pub id: U256,
    pub owner: Address,
    pub amount: U256,
    pub claimable_at: u64,
    pub state: WithdrawalState,
}

impl WithdrawalRequest {
    pub const fn from_record(record: &RequestRecord, now: u64) -> Self {
        Self {
            id: record.id,
            owner: record.owner,
            amount: record.amount,
            claimable_at: record.claimable_at,
            state: WithdrawalState::derive(record, now),
        }
    }
}
