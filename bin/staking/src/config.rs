use config::NetworkConfig;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Top-level staking client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// RPC endpoint url used for reads, receipts and the external wallet
    pub rpc_url: String,

    /// Embedded signer endpoint. Used when no private key is supplied.
    #[serde(default)]
    pub embedded_signer_url: Option<String>,

    /// JSON file holding the selected pilot
    #[serde(default = "default_pilot_store")]
    pub pilot_store: PathBuf,

    /// How long to wait for each receipt. 0 waits indefinitely.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Serve Prometheus metrics on this port when set
    #[serde(default)]
    pub metrics_port: Option<u16>,

    /// Replaces the built-in testnet deployment
    #[serde(default)]
    pub network: Option<NetworkConfig>,
}

fn default_pilot_store() -> PathBuf {
    PathBuf::from("staking-store.json")
}

const fn default_confirmation_timeout_secs() -> u64 {
    180
}

const fn default_poll_interval_ms() -> u64 {
    2_000
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> eyre::Result<Self> {
        let config: Self = toml::from_str(contents)?;
        Ok(config)
    }

    pub const fn confirmation_timeout(&self) -> Option<Duration> {
        match self.confirmation_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn network(&self) -> NetworkConfig {
        self.network.clone().unwrap_or_else(NetworkConfig::testnet)
    }
}
