//! Sui full node JSON-RPC client
//!
//! Plain JSON-RPC 2.0 over HTTP POST.

use super::rpc_types::{
    u64_from_str_or_num, CoinPage, DevInspectResults, ExecuteRequestType,
    NormalizedMoveFunction, RpcRequest, RpcResponse, SuiObjectResponse,
    TransactionBlockResponse, TransactionResponseOptions,
};
use crate::blockchain::traits::SuiReadApi;
use crate::core::domain::{ObjectId, SuiAddress};
use crate::core::errors::VaultError;
use crate::core::result_ext::OptionExt;
use crate::core::validation::MoveTarget;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Coin type of the native token.
pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

/// Sui JSON-RPC client
pub struct SuiClient {
    rpc_url: reqwest::Url,
    http_client: HttpClient,
    next_id: AtomicU64,
}

impl SuiClient {
    /// Create a client for `rpc_url` with the given request timeout.
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self, VaultError> {
        let rpc_url_clean = rpc_url.trim();
        let parsed_url = reqwest::Url::parse(rpc_url_clean).map_err(|e| {
            VaultError::Config(format!("Invalid Sui RPC URL '{}': {}", rpc_url_clean, e))
        })?;

        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VaultError::Network(format!("Failed to build HTTP client: {}", e)))?;

        info!("Using Sui full node at {}", parsed_url);
        Ok(Self { rpc_url: parsed_url, http_client, next_id: AtomicU64::new(1) })
    }

    pub fn rpc_url(&self) -> &str {
        self.rpc_url.as_str()
    }

    async fn rpc_call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, VaultError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(method = %method, id = request.id, "sending RPC request");

        let response = self
            .http_client
            .post(self.rpc_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| VaultError::Network(format!("RPC request {} failed: {}", method, e)))?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            VaultError::Deserialization(format!("{} response is not JSON ({}): {}", method, status, e))
        })?;

        let rpc_response: RpcResponse<T> = serde_json::from_value(body).map_err(|e| {
            VaultError::Deserialization(format!("unexpected {} response: {}", method, e))
        })?;

        if let Some(error) = rpc_response.error {
            return Err(VaultError::Rpc { code: error.code, message: error.message });
        }
        if !status.is_success() {
            return Err(VaultError::Network(format!("{} returned HTTP {}", method, status)));
        }

        rpc_response.result.ok_or_else(|| {
            VaultError::Deserialization(format!("{} response has no result", method))
        })
    }

    /// Fetch a single object with its owner.
    pub async fn get_object(&self, id: &ObjectId) -> Result<SuiObjectResponse, VaultError> {
        self.rpc_call("sui_getObject", vec![json!(id), json!({ "showOwner": true })]).await
    }

    /// Submit signed transaction bytes.
    pub async fn execute_transaction_block(
        &self,
        tx_bytes_base64: &str,
        signatures: &[String],
        options: TransactionResponseOptions,
        request_type: ExecuteRequestType,
    ) -> Result<TransactionBlockResponse, VaultError> {
        info!(?request_type, "executing transaction block");
        self.rpc_call(
            "sui_executeTransactionBlock",
            vec![json!(tx_bytes_base64), json!(signatures), json!(options), json!(request_type)],
        )
        .await
    }
}

#[derive(Deserialize)]
struct GasPrice(#[serde(deserialize_with = "u64_from_str_or_num")] u64);

#[async_trait]
impl SuiReadApi for SuiClient {
    async fn dev_inspect_transaction_block(
        &self,
        sender: &SuiAddress,
        tx_kind_base64: &str,
    ) -> Result<DevInspectResults, VaultError> {
        self.rpc_call("sui_devInspectTransactionBlock", vec![json!(sender), json!(tx_kind_base64)])
            .await
    }

    async fn multi_get_objects(
        &self,
        ids: &[ObjectId],
    ) -> Result<Vec<SuiObjectResponse>, VaultError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.rpc_call("sui_multiGetObjects", vec![json!(ids), json!({ "showOwner": true })]).await
    }

    async fn get_normalized_move_function(
        &self,
        target: &MoveTarget,
    ) -> Result<NormalizedMoveFunction, VaultError> {
        self.rpc_call(
            "sui_getNormalizedMoveFunction",
            vec![json!(target.package), json!(target.module), json!(target.function)],
        )
        .await
    }

    async fn get_reference_gas_price(&self) -> Result<u64, VaultError> {
        let price: GasPrice = self.rpc_call("suix_getReferenceGasPrice", vec![]).await?;
        Ok(price.0)
    }

    async fn get_coins(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
        cursor: Option<&str>,
    ) -> Result<CoinPage, VaultError> {
        self.rpc_call("suix_getCoins", vec![json!(owner), json!(coin_type), json!(cursor)]).await
    }

    async fn get_rpc_api_version(&self) -> Result<String, VaultError> {
        let discover: Value = self.rpc_call("rpc.discover", vec![]).await?;
        discover
            .get("info")
            .and_then(|info| info.get("version"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .required("rpc.discover info.version")
    }
}
