//! Contract bindings for all external contracts.
//!
//! This crate consolidates the Solidity interfaces the staking client talks to:
//! - SuperCluster protocol contracts (SuperCluster, wsToken wrapper, WithdrawManager)
//! - ERC20 tokens (USDC and the sToken receipt token)
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod supercluster;
pub mod token;
