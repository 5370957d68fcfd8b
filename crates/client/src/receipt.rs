use crate::WalletError;
use alloy_primitives::{Log, TxHash};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionReceipt;
use std::{future::Future, time::Duration};
use tokio_retry::{strategy::FixedInterval, Retry};
use tracing::{debug, warn};

/// Extra attempts after a failed receipt query before the wait gives up.
const RECEIPT_QUERY_RETRIES: usize = 3;

/// Confirmation record of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    /// False when the transaction reverted
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub logs: Vec<Log>,
}

impl From<&TransactionReceipt> for Receipt {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash,
            success: receipt.status(),
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            logs: receipt.inner.logs().iter().map(|log| log.inner.clone()).collect(),
        }
    }
}

/// Source of transaction receipts.
pub trait ReceiptClient: Send + Sync {
    /// Wait until `tx_hash` is mined and return its receipt.
    ///
    /// A reverted transaction still yields a receipt with `success == false`.
    fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = Result<Receipt, WalletError>> + Send;
}

/// Receipt client polling `eth_getTransactionReceipt`.
#[derive(Debug, Clone)]
pub struct ChainClient<P> {
    provider: P,
    poll_interval: Duration,
    /// None waits indefinitely
    timeout: Option<Duration>,
}

impl<P> ChainClient<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, poll_interval: Duration, timeout: Option<Duration>) -> Self {
        Self {
            provider,
            poll_interval,
            timeout,
        }
    }

    async fn poll(&self, tx_hash: TxHash) -> Result<Receipt, WalletError> {
        loop {
            let strategy = FixedInterval::new(self.poll_interval).take(RECEIPT_QUERY_RETRIES);
            let queried = Retry::spawn(strategy, || async {
                self.provider
                    .get_transaction_receipt(tx_hash)
                    .await
                    .inspect_err(|e| {
                        warn!(tx_hash = %tx_hash, error = %e, "Receipt query failed, will retry");
                    })
            })
            .await?;

            if let Some(receipt) = queried {
                return Ok(Receipt::from(&receipt));
            }
            debug!(tx_hash = %tx_hash, "Transaction not mined yet");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

impl<P> ReceiptClient for ChainClient<P>
where
    P: Provider + Clone,
{
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Receipt, WalletError> {
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.poll(tx_hash))
                .await
                .map_err(|_| WalletError::ConfirmationTimeout(tx_hash))?,
            None => self.poll(tx_hash).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};
    use alloy_provider::ProviderBuilder;
    use alloy_transport::mock::Asserter;
    use serde_json::{json, Value};

    fn receipt_json(status: &str) -> Value {
        json!({
            "type": "0x2",
            "status": status,
            "transactionHash": "0x0101010101010101010101010101010101010101010101010101010101010101",
            "transactionIndex": "0x0",
            "blockHash": "0x0202020202020202020202020202020202020202020202020202020202020202",
            "blockNumber": "0x10",
            "from": "0x1111111111111111111111111111111111111111",
            "to": "0x2222222222222222222222222222222222222222",
            "contractAddress": null,
            "gasUsed": "0x5208",
            "cumulativeGasUsed": "0x5208",
            "effectiveGasPrice": "0x1",
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "logs": [{
                "address": "0x3333333333333333333333333333333333333333",
                "topics": ["0x0404040404040404040404040404040404040404040404040404040404040404"],
                "data": "0x",
                "blockHash": "0x0202020202020202020202020202020202020202020202020202020202020202",
                "blockNumber": "0x10",
                "transactionHash": "0x0101010101010101010101010101010101010101010101010101010101010101",
                "transactionIndex": "0x0",
                "logIndex": "0x0",
                "removed": false
            }]
        })
    }

    #[tokio::test]
    async fn test_polls_until_mined() {
        let asserter = Asserter::new();
        asserter.push_success(&Value::Null);
        asserter.push_success(&Value::Null);
        asserter.push_success(&receipt_json("0x1"));

        let provider = ProviderBuilder::new().connect_mocked_client(asserter);
        let client = ChainClient::new(provider, Duration::from_millis(1), None);

        let hash = b256!("0101010101010101010101010101010101010101010101010101010101010101");
        let receipt = client.wait_for_receipt(hash).await.unwrap();

        assert!(receipt.success);
        assert_eq!(receipt.tx_hash, hash);
        assert_eq!(receipt.block_number, Some(16));
        assert_eq!(receipt.gas_used, 21000);
        assert_eq!(receipt.logs.len(), 1);
        assert_eq!(
            receipt.logs[0].address,
            address!("3333333333333333333333333333333333333333")
        );
    }

    #[tokio::test]
    async fn test_reverted_receipt() {
        let asserter = Asserter::new();
        asserter.push_success(&receipt_json("0x0"));

        let provider = ProviderBuilder::new().connect_mocked_client(asserter);
        let client = ChainClient::new(provider, Duration::from_millis(1), None);

        let receipt = client.wait_for_receipt(TxHash::ZERO).await.unwrap();
        assert!(!receipt.success);
    }

    #[tokio::test]
    async fn test_failed_queries_are_retried() {
        let asserter = Asserter::new();
        asserter.push_failure_msg("header not found");
        asserter.push_failure_msg("header not found");
        asserter.push_success(&receipt_json("0x1"));

        let provider = ProviderBuilder::new().connect_mocked_client(asserter);
        let client = ChainClient::new(provider, Duration::from_millis(1), None);

        let receipt = client.wait_for_receipt(TxHash::ZERO).await.unwrap();
        assert!(receipt.success);
    }

    #[tokio::test]
    async fn test_persistent_query_failure_is_an_error() {
        let asserter = Asserter::new();
        for _ in 0..=RECEIPT_QUERY_RETRIES {
            asserter.push_failure_msg("header not found: unauthorized");
        }

        let provider = ProviderBuilder::new().connect_mocked_client(asserter.clone());
        let hash = TxHash::repeat_byte(9);

        // unbounded wait must still return
        let client = ChainClient::new(provider.clone(), Duration::from_millis(1), None);
        let err = tokio::time::timeout(Duration::from_secs(5), client.wait_for_receipt(hash))
            .await
            .unwrap()
            .unwrap_err();
        assert!(
            matches!(err, WalletError::Rpc { .. } | WalletError::Transport(_)),
            "unexpected error: {err:?}"
        );

        for _ in 0..=RECEIPT_QUERY_RETRIES {
            asserter.push_failure_msg("header not found: unauthorized");
        }
        let client = ChainClient::new(
            provider,
            Duration::from_millis(1),
            Some(Duration::from_secs(5)),
        );
        let err = client.wait_for_receipt(hash).await.unwrap_err();
        assert_ne!(err, WalletError::ConfirmationTimeout(hash));
    }

    #[tokio::test]
    async fn test_timeout_keeps_hash() {
        let asserter = Asserter::new();
        for _ in 0..1000 {
            asserter.push_success(&Value::Null);
        }

        let provider = ProviderBuilder::new().connect_mocked_client(asserter);
        let client = ChainClient::new(
            provider,
            Duration::from_millis(5),
            Some(Duration::from_millis(30)),
        );

        let hash = TxHash::repeat_byte(9);
        let err = client.wait_for_receipt(hash).await.unwrap_err();
        assert_eq!(err, WalletError::ConfirmationTimeout(hash));
    }
}
