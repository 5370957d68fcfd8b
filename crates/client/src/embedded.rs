//! Embedded wallet reached over EIP-1193 style JSON-RPC.
//!
//! The signer behind the endpoint owns the keys and fills nonce, gas and fees
//! itself, so only `from`, `to` and `data` are sent.

use crate::{WalletAdapter, WalletError};
use alloy_primitives::{Address, Bytes, TxHash, U64};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// Wallet that delegates account management and signing to an embedded signer.
///
/// # Example
///
/// ```ignore
/// let wallet = EmbeddedWallet::new("http://localhost:9060");
/// let tx_hash = wallet.send(target, calldata, from).await?;
/// ```
#[derive(Debug, Clone)]
pub struct EmbeddedWallet {
    client: reqwest::Client,
    url: String,
}

impl EmbeddedWallet {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    /// Creates a new embedded wallet with a custom HTTP client.
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<T, WalletError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };

        let response = self.client.post(&self.url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(WalletError::Transport(format!(
                "embedded wallet returned {status}: {body}"
            )));
        }

        let rpc_response: JsonRpcResponse<T> = response.json().await?;

        match (rpc_response.result, rpc_response.error) {
            (_, Some(error)) => Err(WalletError::Rpc {
                code: error.code,
                message: error.message,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(WalletError::Transport(format!(
                "{method} returned neither result nor error"
            ))),
        }
    }
}

impl WalletAdapter for EmbeddedWallet {
    async fn account(&self) -> Result<Option<Address>, WalletError> {
        let accounts: Vec<Address> = self.request("eth_accounts", json!([])).await?;
        Ok(accounts.first().copied())
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        let chain_id: U64 = self.request("eth_chainId", json!([])).await?;
        Ok(chain_id.to::<u64>())
    }

    /// The account is re-read on every send. The embedded signer may switch
    /// accounts between calls, so `from` only serves as a hint for logging.
    async fn send(
        &self,
        target: Address,
        calldata: Bytes,
        from: Address,
    ) -> Result<TxHash, WalletError> {
        let account = self.account().await?.ok_or(WalletError::NoAccount)?;
        if account != from {
            debug!(expected = %from, actual = %account, "Embedded wallet account changed");
        }

        self.request(
            "eth_sendTransaction",
            json!([{ "from": account, "to": target, "data": calldata }]),
        )
        .await
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    method: &'static str,
    params: serde_json::Value,
    id: u32,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use axum::{extract::State, routing::post, Json, Router};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    type Handler = fn(&str, &Value) -> Value;
    type Calls = Arc<Mutex<Vec<(String, Value)>>>;

    /// Local JSON-RPC stub answering with `handler`, recording every call.
    async fn serve(handler: Handler) -> (String, Calls) {
        async fn rpc(
            State((handler, calls)): State<(Handler, Calls)>,
            Json(request): Json<Value>,
        ) -> Json<Value> {
            let method = request["method"].as_str().unwrap_or_default().to_string();
            let params = request["params"].clone();
            let mut response = handler(&method, &params);
            calls.lock().unwrap().push((method, params));

            response["jsonrpc"] = json!("2.0");
            response["id"] = request["id"].clone();
            Json(response)
        }

        let calls = Calls::default();
        let app = Router::new()
            .route("/", post(rpc))
            .with_state((handler, calls.clone()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (url, calls)
    }

    fn happy_path(method: &str, _params: &Value) -> Value {
        match method {
            "eth_accounts" => json!({ "result": ["0x1111111111111111111111111111111111111111"] }),
            "eth_chainId" => json!({ "result": "0x66eee" }),
            "eth_sendTransaction" => json!({
                "result": "0xabababababababababababababababababababababababababababababababab"
            }),
            _ => json!({ "error": { "code": -32601, "message": "method not found" } }),
        }
    }

    #[tokio::test]
    async fn test_account_and_chain_id() {
        let (url, _) = serve(happy_path).await;
        let wallet = EmbeddedWallet::new(url);

        assert_eq!(
            wallet.account().await.unwrap(),
            Some(address!("1111111111111111111111111111111111111111"))
        );
        assert_eq!(wallet.chain_id().await.unwrap(), 421614);
    }

    #[tokio::test]
    async fn test_send_requeries_accounts() {
        let (url, calls) = serve(happy_path).await;
        let wallet = EmbeddedWallet::new(url);
        let target = address!("2222222222222222222222222222222222222222");

        let hash = wallet
            .send(target, Bytes::from(vec![0xde, 0xad]), Address::repeat_byte(0x99))
            .await
            .unwrap();
        assert_eq!(hash, TxHash::repeat_byte(0xab));

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "eth_accounts");
        assert_eq!(calls[1].0, "eth_sendTransaction");

        // `from` is the wallet's current account, not the caller's hint
        let tx = &calls[1].1[0];
        assert_eq!(tx["from"], "0x1111111111111111111111111111111111111111");
        assert_eq!(tx["to"], "0x2222222222222222222222222222222222222222");
        assert_eq!(tx["data"], "0xdead");
    }

    #[tokio::test]
    async fn test_send_without_account() {
        fn no_accounts(method: &str, params: &Value) -> Value {
            match method {
                "eth_accounts" => json!({ "result": [] }),
                _ => happy_path(method, params),
            }
        }

        let (url, calls) = serve(no_accounts).await;
        let wallet = EmbeddedWallet::new(url);

        let err = wallet
            .send(Address::ZERO, Bytes::new(), Address::ZERO)
            .await
            .unwrap_err();
        assert_eq!(err, WalletError::NoAccount);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rpc_error_is_preserved() {
        fn rejecting(method: &str, params: &Value) -> Value {
            match method {
                "eth_sendTransaction" => json!({
                    "error": { "code": 4001, "message": "User rejected the request." }
                }),
                _ => happy_path(method, params),
            }
        }

        let (url, _) = serve(rejecting).await;
        let wallet = EmbeddedWallet::new(url);

        let err = wallet
            .send(Address::ZERO, Bytes::new(), Address::ZERO)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            WalletError::Rpc {
                code: 4001,
                message: "User rejected the request.".to_string()
            }
        );
    }
}
