use crate::{EmbeddedWallet, ExternalWallet};
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_provider::Provider;
use alloy_transport::TransportError;
use std::future::Future;
use thiserror::Error;

/// Failure reported by a wallet or while waiting on a transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// JSON-RPC error object returned by the wallet or node
    #[error("{message}")]
    Rpc { code: i64, message: String },

    /// Network failure or malformed response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Wallet exposes no account
    #[error("Wallet is not connected.")]
    NoAccount,

    /// Transaction was mined but reverted
    #[error("Transaction reverted")]
    Reverted(TxHash),

    /// Transaction was submitted but no receipt arrived in time
    #[error("Transaction {0} is still pending, check later")]
    ConfirmationTimeout(TxHash),
}

impl WalletError {
    /// Concise, user presentable form of the error when one is known.
    ///
    /// JSON-RPC errors carry the wallet's own message (e.g. "User rejected the
    /// request."), transport failures have no short form.
    pub fn short_message(&self) -> Option<String> {
        match self {
            Self::Rpc { message, .. } => Some(message.clone()),
            Self::Transport(_) => None,
            other => Some(other.to_string()),
        }
    }
}

impl From<TransportError> for WalletError {
    fn from(err: TransportError) -> Self {
        match err.as_error_resp() {
            Some(payload) => Self::Rpc {
                code: payload.code,
                message: payload.message.to_string(),
            },
            None => Self::Transport(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// A connected wallet able to submit transactions.
pub trait WalletAdapter: Send + Sync {
    /// Currently connected account, if any.
    fn account(&self) -> impl Future<Output = Result<Option<Address>, WalletError>> + Send;

    /// Chain the wallet is connected to.
    fn chain_id(&self) -> impl Future<Output = Result<u64, WalletError>> + Send;

    /// Submit a call to `target` with `calldata`, returning the transaction hash.
    ///
    /// Does not retry. Any wallet error, including a user rejection, is returned as is.
    fn send(
        &self,
        target: Address,
        calldata: Bytes,
        from: Address,
    ) -> impl Future<Output = Result<TxHash, WalletError>> + Send;
}

/// The wallet path chosen for this session.
pub enum WalletSession<P> {
    Embedded(EmbeddedWallet),
    External(ExternalWallet<P>),
}

impl<P> WalletSession<P> {
    /// Name of the active wallet path, for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Embedded(_) => "embedded",
            Self::External(_) => "external",
        }
    }
}

impl<P> WalletAdapter for WalletSession<P>
where
    P: Provider + Clone,
{
    async fn account(&self) -> Result<Option<Address>, WalletError> {
        match self {
            Self::Embedded(wallet) => wallet.account().await,
            Self::External(wallet) => wallet.account().await,
        }
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        match self {
            Self::Embedded(wallet) => wallet.chain_id().await,
            Self::External(wallet) => wallet.chain_id().await,
        }
    }

    async fn send(
        &self,
        target: Address,
        calldata: Bytes,
        from: Address,
    ) -> Result<TxHash, WalletError> {
        match self {
            Self::Embedded(wallet) => wallet.send(target, calldata, from).await,
            Self::External(wallet) => wallet.send(target, calldata, from).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message() {
        let rpc = WalletError::Rpc {
            code: 4001,
            message: "User rejected the request.".to_string(),
        };
        assert_eq!(
            rpc.short_message().as_deref(),
            Some("User rejected the request.")
        );

        let transport = WalletError::Transport("connection refused".to_string());
        assert!(transport.short_message().is_none());
        assert!(transport.to_string().contains("connection refused"));

        let reverted = WalletError::Reverted(TxHash::ZERO);
        assert_eq!(
            reverted.short_message().as_deref(),
            Some("Transaction reverted")
        );
    }
}
