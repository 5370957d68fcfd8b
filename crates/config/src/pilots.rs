//! Directory of known pilots.
//!
//! A pilot is the delegate a deposit or withdrawal is routed through inside the
//! protocol. The directory only provides display names; any valid address may
//! be selected.

use alloy_primitives::{address, Address};

/// A named pilot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PilotInfo {
    pub name: &'static str,
    pub address: Address,
}

/// Pilots shown by the selector. The first entry is the protocol default on testnet.
pub const PILOT_DIRECTORY: [PilotInfo; 3] = [
    PilotInfo {
        name: "Atlas Core Pilot",
        address: address!("0x3a1f0e2d4c6b8a9f7e5d3c1b0a2f4e6d8c0b1a93"),
    },
    PilotInfo {
        name: "YieldWave Labs",
        address: address!("0x8c1f10c0ae63b51c8ba3b2ac7184998f5e552f10"),
    },
    PilotInfo {
        name: "Horizon Shield",
        address: address!("0x4b6c94f5ca817bc7d0b6c0d7f6e7f0a3ad5a1a31"),
    },
];

impl PilotInfo {
    /// Look up a pilot by address.
    pub fn find(address: Address) -> Option<Self> {
        PILOT_DIRECTORY.iter().copied().find(|p| p.address == address)
    }
}
