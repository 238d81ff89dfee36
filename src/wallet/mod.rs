//! Wallet connection: the connected account and sign-and-execute.

pub mod rpc_wallet;
pub mod signer;

use async_trait::async_trait;

use crate::blockchain::sui::{
    ExecuteRequestType, TransactionBlock, TransactionBlockResponse, TransactionResponseOptions,
};
use crate::core::domain::SuiAddress;
use crate::core::errors::VaultError;

pub use rpc_wallet::RpcWallet;
pub use signer::{CommandSigner, TransactionSigner};

/// One sign-and-execute call.
#[derive(Debug, Clone)]
pub struct SignAndExecuteRequest {
    pub transaction_block: TransactionBlock,
    pub request_type: ExecuteRequestType,
    pub options: TransactionResponseOptions,
}

/// A connected (or disconnected) wallet.
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// The connected account, `None` before connection.
    fn address(&self) -> Option<SuiAddress>;

    /// Sign `request.transaction_block` as the connected account and
    /// submit it.
    async fn sign_and_execute_transaction_block(
        &self,
        request: SignAndExecuteRequest,
    ) -> Result<TransactionBlockResponse, VaultError>;
}
