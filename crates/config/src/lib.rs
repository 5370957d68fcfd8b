//! Configuration types for the SuperCluster staking client.
//!
//! This crate provides:
//! - Network configuration (chain id, explorer, contract addresses, token decimals)
//! - The chain guard used before every mutating operation
//! - The directory of known pilots

pub mod network;
pub mod pilots;

pub use network::{ContractsConfig, NetworkConfig, NetworkConfigBuilder, TokenConfig, TokensConfig};
pub use pilots::{PilotInfo, PILOT_DIRECTORY};
