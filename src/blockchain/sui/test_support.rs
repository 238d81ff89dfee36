//! In-memory full node for unit tests.

use super::rpc_types::{
    Coin, CoinPage, DevInspectResults, NormalizedMoveFunction, Owner, SuiObjectData,
    SuiObjectResponse,
};
use crate::blockchain::traits::SuiReadApi;
use crate::core::domain::{ObjectDigest, ObjectId, SuiAddress};
use crate::core::errors::VaultError;
use crate::core::validation::MoveTarget;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub(crate) struct FakeNode {
    objects: Mutex<HashMap<ObjectId, SuiObjectData>>,
    functions: Mutex<HashMap<MoveTarget, NormalizedMoveFunction>>,
    coins: Mutex<Vec<Coin>>,
    gas_price: Mutex<u64>,
    dev_inspect: Mutex<Option<Value>>,
    dev_inspect_fails: Mutex<bool>,
    senders: Mutex<Vec<SuiAddress>>,
    gas_price_calls: AtomicUsize,
    version_calls: AtomicUsize,
}

impl FakeNode {
    pub fn new() -> Self {
        let node = Self::default();
        *node.gas_price.lock() = 1_000;
        node
    }

    fn add_object(&self, id: &str, version: u64, owner: Owner) -> ObjectId {
        let object_id: ObjectId = id.parse().expect("test object id");
        self.objects.lock().insert(
            object_id,
            SuiObjectData {
                object_id,
                version,
                digest: ObjectDigest::new([version as u8; 32]),
                owner: Some(owner),
            },
        );
        object_id
    }

    pub fn add_shared_object(&self, id: &str, initial_shared_version: u64) -> ObjectId {
        self.add_object(id, initial_shared_version + 1, Owner::Shared { initial_shared_version })
    }

    pub fn add_owned_object(&self, id: &str, version: u64) -> ObjectId {
        self.add_object(id, version, Owner::AddressOwner(SuiAddress::ZERO))
    }

    /// Register a function whose parameters are `"Reference"`,
    /// `"MutableReference"` or a plain type name.
    pub fn add_function(&self, target: &MoveTarget, params: &[&str]) {
        let parameters = params
            .iter()
            .map(|p| match *p {
                "Reference" | "MutableReference" => {
                    let mut param = serde_json::Map::new();
                    param.insert(p.to_string(), json!({ "Struct": {} }));
                    Value::Object(param)
                }
                other => json!(other),
            })
            .collect();
        self.functions.lock().insert(
            target.clone(),
            NormalizedMoveFunction { is_entry: true, parameters, return_: vec![] },
        );
    }

    pub fn add_coin(&self, id: &str, balance: u64) -> ObjectId {
        let coin_object_id: ObjectId = id.parse().expect("test coin id");
        self.coins.lock().push(Coin {
            coin_type: "0x2::sui::SUI".to_string(),
            coin_object_id,
            version: 1,
            digest: ObjectDigest::new([1; 32]),
            balance,
        });
        coin_object_id
    }

    pub fn set_gas_price(&self, price: u64) {
        *self.gas_price.lock() = price;
    }

    /// Canned `sui_devInspectTransactionBlock` result.
    pub fn set_dev_inspect(&self, result: Value) {
        *self.dev_inspect.lock() = Some(result);
    }

    pub fn fail_dev_inspect(&self) {
        *self.dev_inspect_fails.lock() = true;
    }

    pub fn dev_inspect_senders(&self) -> Vec<SuiAddress> {
        self.senders.lock().clone()
    }

    pub fn gas_price_calls(&self) -> usize {
        self.gas_price_calls.load(Ordering::SeqCst)
    }

    pub fn version_calls(&self) -> usize {
        self.version_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SuiReadApi for FakeNode {
    async fn dev_inspect_transaction_block(
        &self,
        sender: &SuiAddress,
        _tx_kind_base64: &str,
    ) -> Result<DevInspectResults, VaultError> {
        self.senders.lock().push(*sender);
        if *self.dev_inspect_fails.lock() {
            return Err(VaultError::Network("connection refused".to_string()));
        }
        let value = self.dev_inspect.lock().clone().unwrap_or_else(|| json!({ "results": [] }));
        Ok(serde_json::from_value(value)?)
    }

    async fn multi_get_objects(
        &self,
        ids: &[ObjectId],
    ) -> Result<Vec<SuiObjectResponse>, VaultError> {
        let objects = self.objects.lock();
        Ok(ids
            .iter()
            .map(|id| match objects.get(id) {
                Some(data) => SuiObjectResponse { data: Some(data.clone()), error: None },
                None => SuiObjectResponse {
                    data: None,
                    error: Some(json!({ "code": "notExists", "object_id": id })),
                },
            })
            .collect())
    }

    async fn get_normalized_move_function(
        &self,
        target: &MoveTarget,
    ) -> Result<NormalizedMoveFunction, VaultError> {
        self.functions.lock().get(target).cloned().ok_or_else(|| VaultError::Rpc {
            code: -32602,
            message: format!("No function {}", target),
        })
    }

    async fn get_reference_gas_price(&self) -> Result<u64, VaultError> {
        self.gas_price_calls.fetch_add(1, Ordering::SeqCst);
        Ok(*self.gas_price.lock())
    }

    async fn get_coins(
        &self,
        _owner: &SuiAddress,
        _coin_type: &str,
        _cursor: Option<&str>,
    ) -> Result<CoinPage, VaultError> {
        Ok(CoinPage { data: self.coins.lock().clone(), next_cursor: None, has_next_page: false })
    }

    async fn get_rpc_api_version(&self) -> Result<String, VaultError> {
        self.version_calls.fetch_add(1, Ordering::SeqCst);
        Ok("1.30.1".to_string())
    }
}
