use async_trait::async_trait;

use crate::blockchain::sui::rpc_types::{
    CoinPage, DevInspectResults, NormalizedMoveFunction, SuiObjectResponse,
};
use crate::core::domain::{ObjectId, SuiAddress};
use crate::core::errors::VaultError;
use crate::core::validation::MoveTarget;

/// Read-only surface of a Sui full node.
///
/// Transaction building and balance reads only need these calls, which
/// keeps them testable without a node.
#[async_trait]
pub trait SuiReadApi: Send + Sync {
    /// Simulates a transaction kind (base64 BCS) as `sender` without
    /// committing effects or charging gas.
    async fn dev_inspect_transaction_block(
        &self,
        sender: &SuiAddress,
        tx_kind_base64: &str,
    ) -> Result<DevInspectResults, VaultError>;

    /// Fetches objects with their owner, in request order.
    async fn multi_get_objects(
        &self,
        ids: &[ObjectId],
    ) -> Result<Vec<SuiObjectResponse>, VaultError>;

    /// Normalized signature of a Move function.
    async fn get_normalized_move_function(
        &self,
        target: &MoveTarget,
    ) -> Result<NormalizedMoveFunction, VaultError>;

    /// Current reference gas price in MIST.
    async fn get_reference_gas_price(&self) -> Result<u64, VaultError>;

    /// One page of coins of `coin_type` owned by `owner`.
    async fn get_coins(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
        cursor: Option<&str>,
    ) -> Result<CoinPage, VaultError>;

    /// Version string the node reports from `rpc.discover`.
    async fn get_rpc_api_version(&self) -> Result<String, VaultError>;
}
