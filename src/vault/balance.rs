//! Vault balance reads through dev-inspect.

use super::{vault_target, ACCOUNT_DETAIL_FN};
use crate::blockchain::sui::{ReturnValueDecoder, TransactionBlock};
use crate::blockchain::traits::SuiReadApi;
use crate::core::config::ObjectRecord;
use crate::core::domain::SuiAddress;
use crate::core::errors::VaultError;
use crate::core::result_ext::ResultExt;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reads an account's vault balance by simulating
/// `SAPE::get_account_detail(storage)` with the account as sender.
pub struct BalanceReader {
    api: Arc<dyn SuiReadApi>,
    objects: ObjectRecord,
    decoder: OnceCell<ReturnValueDecoder>,
}

impl BalanceReader {
    pub fn new(api: Arc<dyn SuiReadApi>, objects: ObjectRecord) -> Self {
        Self { api, objects, decoder: OnceCell::new() }
    }

    pub fn objects(&self) -> &ObjectRecord {
        &self.objects
    }

    /// The read-only block: one call, the storage object as its only argument.
    pub fn account_detail_block(&self) -> Result<TransactionBlock, VaultError> {
        let mut block = TransactionBlock::new();
        let storage = block.object(self.objects.balance_storage);
        block.move_call(vault_target(&self.objects, ACCOUNT_DETAIL_FN)?, vec![], vec![storage]);
        Ok(block)
    }

    /// Balance of `address` in MIST, or of the zero-address sentinel when no
    /// account is connected.
    ///
    /// An empty result list yields `Ok(0)`. Transport, RPC and decode
    /// failures are returned as errors.
    pub async fn read(&self, address: Option<&SuiAddress>) -> Result<u64, VaultError> {
        let sender = address.copied().unwrap_or(self.objects.address_zero);
        let block = self.account_detail_block()?;
        let tx_kind = block.build_kind_base64(self.api.as_ref()).await?;
        debug!(sender = %sender, tx_kind = %tx_kind, "inspecting get_account_detail");

        let results = self.api.dev_inspect_transaction_block(&sender, &tx_kind).await?;

        let Some((bytes, type_tag)) = results.first_return_value() else {
            if let Some(error) = &results.error {
                warn!(sender = %sender, error = %error, "get_account_detail returned no results");
            }
            info!(sender = %sender, "no return value, reporting balance 0");
            return Ok(0);
        };

        let decoder = self.decoder().await;
        let balance = decoder.decode_u64(bytes, type_tag)?;
        info!(sender = %sender, balance, "Account balance");
        Ok(balance)
    }

    /// [`BalanceReader::read`] with every failure reported as 0.
    pub async fn read_or_zero(&self, address: Option<&SuiAddress>) -> u64 {
        self.read(address).await.unwrap_or_log(0, "balance read")
    }

    /// Decoder for the node's API version, looked up once. A failed lookup is
    /// not cached.
    async fn decoder(&self) -> ReturnValueDecoder {
        if let Some(decoder) = self.decoder.get() {
            return decoder.clone();
        }
        match self.api.get_rpc_api_version().await {
            Ok(version) => {
                info!(api_version = %version, "full node RPC API version");
                self.decoder.get_or_init(|| ReturnValueDecoder::for_api_version(Some(version))).clone()
            }
            Err(e) => {
                warn!(error = %e, "could not query RPC API version");
                ReturnValueDecoder::default()
            }
        }
    }
}
