// tests/util.rs
// Shared helpers for tests that talk to a mocked Sui full node

#![allow(dead_code)]

use httpmock::{Method, Mock, MockServer};
use serde_json::{json, Value};
use sui_vault::core::config::ObjectRecord;
use sui_vault::core::domain::SuiAddress;

pub const PACKAGE_ID: &str = "0x00000000000000000000000000000000000000000000000000000000000a11ce";
pub const STORAGE_ID: &str = "0x0000000000000000000000000000000000000000000000000000000000005703";
pub const GAS_COIN_ID: &str = "0x00000000000000000000000000000000000000000000000000000000000c0141";
/// Base58 of 32 zero bytes
pub const ZERO_DIGEST: &str = "11111111111111111111111111111111";

pub fn objects() -> ObjectRecord {
    ObjectRecord {
        package_id: PACKAGE_ID.parse().unwrap(),
        balance_storage: STORAGE_ID.parse().unwrap(),
        address_zero: SuiAddress::ZERO,
    }
}

pub fn rpc_result(result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": 1, "result": result })
}

/// Match a JSON-RPC request by method name.
pub fn method_marker(method: &str) -> String {
    format!("\"method\":\"{}\"", method)
}

pub async fn mock_method<'a>(server: &'a MockServer, method: &str, result: Value) -> Mock<'a> {
    let marker = method_marker(method);
    server
        .mock_async(|when, then| {
            when.method(Method::POST).path("/").body_contains(marker.as_str());
            then.status(200).json_body(rpc_result(result));
        })
        .await
}

/// The shared balance-storage object.
pub async fn mock_storage_object(server: &MockServer) -> Mock<'_> {
    mock_method(
        server,
        "sui_multiGetObjects",
        json!([{
            "data": {
                "objectId": STORAGE_ID,
                "version": "12",
                "digest": ZERO_DIGEST,
                "owner": { "Shared": { "initial_shared_version": 3 } }
            }
        }]),
    )
    .await
}

/// A normalized function whose first parameter is `kind`
/// (`Reference` or `MutableReference`) followed by `u64`.
pub async fn mock_normalized_function<'a>(server: &'a MockServer, kind: &str) -> Mock<'a> {
    let mut first = serde_json::Map::new();
    first.insert(
        kind.to_string(),
        json!({ "Struct": { "address": PACKAGE_ID, "module": "SAPE", "name": "BalanceStorage", "typeArguments": [] } }),
    );
    mock_method(
        server,
        "sui_getNormalizedMoveFunction",
        json!({
            "visibility": "Public",
            "isEntry": true,
            "typeParameters": [],
            "parameters": [Value::Object(first), "U64"],
            "return": []
        }),
    )
    .await
}

pub async fn mock_api_version(server: &MockServer) -> Mock<'_> {
    mock_method(server, "rpc.discover", json!({ "openrpc": "1.2.6", "info": { "version": "1.30.1" } }))
        .await
}

pub fn u64_dev_inspect(value: u64) -> Value {
    json!({
        "effects": { "status": { "status": "success" } },
        "events": [],
        "results": [{
            "mutableReferenceOutputs": [],
            "returnValues": [[value.to_le_bytes().to_vec(), "u64"]]
        }]
    })
}
