//! Chain access for the staking client.
//!
//! Two wallet paths are supported behind [`WalletAdapter`]: an embedded signer
//! reached over EIP-1193 style JSON-RPC, and an external key-backed wallet bound
//! to an alloy provider. Receipts are read back through [`ReceiptClient`].

mod embedded;
mod external;
mod receipt;
mod wallet;

use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
pub use embedded::EmbeddedWallet;
pub use external::ExternalWallet;
pub use receipt::{ChainClient, Receipt, ReceiptClient};
use thiserror::Error;
pub use wallet::{WalletAdapter, WalletError, WalletSession};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),
}

fn parse_url(rpc_url: &str) -> Result<reqwest::Url, ClientError> {
    reqwest::Url::parse(rpc_url).map_err(|e| ClientError::InvalidUrl(format!("{rpc_url}: {e}")))
}

/// Read-only provider for balance, request and receipt reads.
pub fn create_provider(rpc_url: &str) -> Result<impl Provider + Clone, ClientError> {
    Ok(ProviderBuilder::new().connect_http(parse_url(rpc_url)?))
}

/// Provider that signs and sends with `private_key`. Backs [`ExternalWallet`].
pub fn create_wallet_provider(
    rpc_url: &str,
    private_key: &str,
) -> Result<impl Provider + Clone, ClientError> {
    let url = parse_url(rpc_url)?;
    let wallet = EthereumWallet::from(parse_signer(private_key)?);
    Ok(ProviderBuilder::new().wallet(wallet).connect_http(url))
}

/// Address controlled by a private key.
pub fn signer_address(private_key: &str) -> Result<Address, ClientError> {
    Ok(parse_signer(private_key)?.address())
}

fn parse_signer(private_key: &str) -> Result<PrivateKeySigner, ClientError> {
    private_key
        .parse::<PrivateKeySigner>()
        .map_err(|e| ClientError::InvalidPrivateKey(e.to_string()))
}
