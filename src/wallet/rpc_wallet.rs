use super::signer::TransactionSigner;
use super::{SignAndExecuteRequest, WalletAdapter};
use crate::blockchain::sui::{SuiClient, TransactionBlockResponse};
use crate::core::domain::SuiAddress;
use crate::core::errors::VaultError;
use async_trait::async_trait;
use base64::Engine as _;
use std::sync::Arc;
use tracing::{info, warn};

/// Wallet backed by a full node and an external signer.
pub struct RpcWallet<S: TransactionSigner> {
    client: Arc<SuiClient>,
    address: Option<SuiAddress>,
    signer: S,
}

impl<S: TransactionSigner> RpcWallet<S> {
    pub fn new(client: Arc<SuiClient>, address: Option<SuiAddress>, signer: S) -> Self {
        Self { client, address, signer }
    }
}

#[async_trait]
impl<S: TransactionSigner + 'static> WalletAdapter for RpcWallet<S> {
    fn address(&self) -> Option<SuiAddress> {
        self.address
    }

    async fn sign_and_execute_transaction_block(
        &self,
        request: SignAndExecuteRequest,
    ) -> Result<TransactionBlockResponse, VaultError> {
        let sender = self.address.ok_or(VaultError::WalletNotConnected)?;

        let mut block = request.transaction_block;
        block.set_sender(sender);
        let tx_data = block.build_bytes(self.client.as_ref()).await?;

        let signature = self.signer.sign_transaction(&sender, &tx_data).await?;
        let tx_bytes = base64::engine::general_purpose::STANDARD.encode(&tx_data);

        let response = self
            .client
            .execute_transaction_block(&tx_bytes, &[signature], request.options, request.request_type)
            .await?;

        if !response.errors.is_empty() {
            warn!(digest = %response.digest, errors = ?response.errors, "transaction reported errors");
        }
        info!(digest = %response.digest, status = ?response.execution_status(), "transaction executed");
        Ok(response)
    }
}
