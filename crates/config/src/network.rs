//! Network configuration for the staking client.
//!
//! Provides chain-specific contract addresses and token parameters, plus the
//! chain guard every mutating operation consults before building a sequence.

use alloy_primitives::{address, Address, TxHash};
use serde::{Deserialize, Serialize};

/// Protocol contract addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractsConfig {
    /// Deposit token (USDC)
    pub usdc: Address,
    /// SuperCluster protocol entry point
    pub super_cluster: Address,
    /// Rebasing receipt token (sUSDC)
    pub s_token: Address,
    /// Fixed-balance wrapper (wsUSDC)
    pub ws_token: Address,
    /// WithdrawManager holding queued withdrawal requests
    pub withdraw_manager: Address,
    /// Pilot used when no selection has been persisted
    pub default_pilot: Address,
}

/// Display symbol and decimal precision of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub symbol: String,
    pub decimals: u8,
}

impl TokenConfig {
    pub fn new(symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
        }
    }
}

/// Token parameters for every token the client handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokensConfig {
    pub usdc: TokenConfig,
    pub s_token: TokenConfig,
    pub ws_token: TokenConfig,
}

/// Complete network configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Human readable network name, used in "switch network" prompts
    pub name: String,
    /// Chain ID every transaction must be sent on
    pub chain_id: u64,
    /// Block explorer base url (no trailing slash)
    pub explorer: String,
    pub contracts: ContractsConfig,
    pub tokens: TokensConfig,
}

impl NetworkConfig {
    /// Arbitrum Sepolia testnet deployment.
    pub fn testnet() -> Self {
        Self {
            name: "Arbitrum Sepolia".to_string(),
            chain_id: 421614,
            explorer: "https://sepolia.arbiscan.io".to_string(),
            contracts: ContractsConfig {
                usdc: address!("0x7b4f2a8e1c3d5f60718293a4b5c6d7e8f9012a3b"),
                super_cluster: address!("0x2e5a1c9d8b7f6e4d3c2b1a0f9e8d7c6b5a4f3e2d"),
                s_token: address!("0x9c8b7a6f5e4d3c2b1a0f9e8d7c6b5a4f3e2d1c0b"),
                ws_token: address!("0x4d3c2b1a0f9e8d7c6b5a4f3e2d1c0b9a8f7e6d5c"),
                withdraw_manager: address!("0x6f5e4d3c2b1a0f9e8d7c6b5a4f3e2d1c0b9a8f7e"),
                default_pilot: address!("0x3a1f0e2d4c6b8a9f7e5d3c1b0a2f4e6d8c0b1a93"),
            },
            tokens: TokensConfig {
                usdc: TokenConfig::new("USDC", 6),
                s_token: TokenConfig::new("sUSDC", 6),
                ws_token: TokenConfig::new("wsUSDC", 6),
            },
        }
    }

    /// Chain guard: true only when `chain_id` is the chain this deployment lives on.
    pub const fn is_correct_chain(&self, chain_id: u64) -> bool {
        self.chain_id == chain_id
    }

    /// Explorer link for a transaction.
    pub fn explorer_tx_url(&self, tx_hash: TxHash) -> String {
        format!("{}/tx/{}", self.explorer.trim_end_matches('/'), tx_hash)
    }
}

/// Builder for custom network configurations.
#[derive(Debug, Clone)]
pub struct NetworkConfigBuilder {
    config: NetworkConfig,
}

impl NetworkConfigBuilder {
    /// Start with testnet defaults.
    pub fn testnet() -> Self {
        Self {
            config: NetworkConfig::testnet(),
        }
    }

    /// Override the chain id and network name.
    pub fn chain(mut self, chain_id: u64, name: impl Into<String>) -> Self {
        self.config.chain_id = chain_id;
        self.config.name = name.into();
        self
    }

    /// Override the block explorer url.
    pub fn explorer(mut self, explorer: impl Into<String>) -> Self {
        self.config.explorer = explorer.into();
        self
    }

    /// Override the SuperCluster address.
    pub fn super_cluster(mut self, address: Address) -> Self {
        self.config.contracts.super_cluster = address;
        self
    }

    /// Override the WithdrawManager address.
    pub fn withdraw_manager(mut self, address: Address) -> Self {
        self.config.contracts.withdraw_manager = address;
        self
    }

    /// Override the default pilot.
    pub fn default_pilot(mut self, address: Address) -> Self {
        self.config.contracts.default_pilot = address;
        self
    }

    /// Override token parameters.
    pub fn tokens(mut self, tokens: TokensConfig) -> Self {
        self.config.tokens = tokens;
        self
    }

    /// Build the network configuration.
    pub fn build(self) -> NetworkConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    #[test]
    fn test_testnet_config() {
        let config = NetworkConfig::testnet();
        assert_eq!(config.chain_id, 421614);
        assert_eq!(config.tokens.usdc.decimals, 6);
        assert_ne!(config.contracts.default_pilot, Address::ZERO);
    }

    #[test]
    fn test_chain_guard() {
        let config = NetworkConfig::testnet();
        assert!(config.is_correct_chain(421614));
        assert!(!config.is_correct_chain(1));
        assert!(!config.is_correct_chain(0));
    }

    #[test]
    fn test_custom_config_builder() {
        let custom_cluster = address!("1111111111111111111111111111111111111111");

        let config = NetworkConfigBuilder::testnet()
            .chain(31337, "Anvil")
            .super_cluster(custom_cluster)
            .build();

        assert_eq!(config.contracts.super_cluster, custom_cluster);
        assert!(config.is_correct_chain(31337));
        assert_eq!(config.name, "Anvil");
    }

    #[test]
    fn test_explorer_tx_url() {
        let config = NetworkConfigBuilder::testnet()
            .explorer("https://explorer.example/")
            .build();
        let hash = b256!("1111111111111111111111111111111111111111111111111111111111111111");

        assert_eq!(
            config.explorer_tx_url(hash),
            "https://explorer.example/tx/0x1111111111111111111111111111111111111111111111111111111111111111"
        );
    }

    #[test]
    fn test_network_config_from_toml() {
        let config = NetworkConfig::testnet();
        let encoded = toml::to_string(&config).unwrap();
        let decoded: NetworkConfig = toml::from_str(&encoded).unwrap();
        assert_eq!(decoded, config);
    }
}
