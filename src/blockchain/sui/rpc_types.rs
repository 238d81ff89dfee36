//! JSON shapes exchanged with the Sui full node.

use crate::core::domain::{ObjectDigest, ObjectId, SuiAddress};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::types::ObjectRef;

/// Sui encodes 64-bit integers as decimal strings in most places, but some
/// fields (shared versions) arrive as plain numbers.
pub(crate) fn u64_from_str_or_num<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrNum {
        Str(String),
        Num(u64),
    }

    match StrOrNum::deserialize(d)? {
        StrOrNum::Str(s) => s.parse().map_err(de::Error::custom),
        StrOrNum::Num(n) => Ok(n),
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// Result of `sui_devInspectTransactionBlock`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevInspectResults {
    #[serde(default)]
    pub effects: Value,
    #[serde(default)]
    pub events: Value,
    #[serde(default)]
    pub results: Option<Vec<SuiExecutionResult>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl DevInspectResults {
    /// First return value of the first command, as `(bytes, type tag)`.
    pub fn first_return_value(&self) -> Option<&(Vec<u8>, String)> {
        self.results.as_ref()?.first()?.return_values.first()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiExecutionResult {
    #[serde(default)]
    pub mutable_reference_outputs: Vec<Value>,
    #[serde(default)]
    pub return_values: Vec<(Vec<u8>, String)>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuiObjectResponse {
    #[serde(default)]
    pub data: Option<SuiObjectData>,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiObjectData {
    pub object_id: ObjectId,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub version: u64,
    pub digest: ObjectDigest,
    #[serde(default)]
    pub owner: Option<Owner>,
}

impl SuiObjectData {
    pub fn object_ref(&self) -> ObjectRef {
        (self.object_id, self.version, self.digest)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum Owner {
    AddressOwner(SuiAddress),
    ObjectOwner(SuiAddress),
    Shared {
        #[serde(deserialize_with = "u64_from_str_or_num")]
        initial_shared_version: u64,
    },
    Immutable,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinPage {
    pub data: Vec<Coin>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub coin_type: String,
    pub coin_object_id: ObjectId,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub version: u64,
    pub digest: ObjectDigest,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub balance: u64,
}

impl Coin {
    pub fn object_ref(&self) -> ObjectRef {
        (self.coin_object_id, self.version, self.digest)
    }
}

/// Result of `sui_getNormalizedMoveFunction`. Only the parameter list is
/// inspected, so types stay as raw JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMoveFunction {
    #[serde(default)]
    pub is_entry: bool,
    #[serde(default)]
    pub parameters: Vec<Value>,
    #[serde(default, rename = "return")]
    pub return_: Vec<Value>,
}

impl NormalizedMoveFunction {
    /// Whether parameter `index` may be mutated. By-value and `&mut`
    /// parameters need a mutable input; `&` does not.
    pub fn parameter_is_mutable(&self, index: usize) -> bool {
        match self.parameters.get(index) {
            Some(Value::Object(map)) => !map.contains_key("Reference"),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecuteRequestType {
    WaitForEffectsCert,
    WaitForLocalExecution,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponseOptions {
    pub show_input: bool,
    pub show_raw_input: bool,
    pub show_effects: bool,
    pub show_events: bool,
    pub show_object_changes: bool,
    pub show_balance_changes: bool,
}

impl TransactionResponseOptions {
    pub fn with_effects() -> Self {
        Self { show_effects: true, ..Self::default() }
    }
}

/// Result of `sui_executeTransactionBlock`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBlockResponse {
    pub digest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_local_execution: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl TransactionBlockResponse {
    /// `effects.status.status`, when effects were requested.
    pub fn execution_status(&self) -> Option<&str> {
        self.effects.as_ref()?.get("status")?.get("status")?.as_str()
    }

    /// `effects.status.error`, set when execution aborted.
    pub fn execution_error(&self) -> Option<&str> {
        self.effects.as_ref()?.get("status")?.get("error")?.as_str()
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.execution_status() == Some("success")
    }
}
