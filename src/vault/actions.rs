//! Deposit and withdraw actions.

use super::watch::BalanceWatch;
use super::{vault_target, DEPOSIT_FN, UNIT_AMOUNT, WITHDRAW_FN};
use crate::blockchain::sui::{
    ExecuteRequestType, TransactionBlock, TransactionBlockResponse, TransactionResponseOptions,
};
use crate::core::config::ObjectRecord;
use crate::core::errors::VaultError;
use crate::wallet::{SignAndExecuteRequest, WalletAdapter};
use std::sync::Arc;
use tracing::{info, warn};

/// Builds the fixed 1 SUI deposit and withdraw blocks and hands them to the
/// wallet.
pub struct ActionDispatcher {
    wallet: Arc<dyn WalletAdapter>,
    objects: ObjectRecord,
    gas_budget: u64,
    balance_watch: Option<Arc<BalanceWatch>>,
}

impl ActionDispatcher {
    pub fn new(wallet: Arc<dyn WalletAdapter>, objects: ObjectRecord, gas_budget: u64) -> Self {
        Self { wallet, objects, gas_budget, balance_watch: None }
    }

    /// Refresh `watch` after every successful action.
    pub fn with_balance_watch(mut self, watch: Arc<BalanceWatch>) -> Self {
        self.balance_watch = Some(watch);
        self
    }

    pub fn wallet(&self) -> &Arc<dyn WalletAdapter> {
        &self.wallet
    }

    pub fn deposit_block(&self) -> Result<TransactionBlock, VaultError> {
        deposit_block(&self.objects, self.gas_budget)
    }

    pub fn withdraw_block(&self) -> Result<TransactionBlock, VaultError> {
        withdraw_block(&self.objects, self.gas_budget)
    }

    pub async fn deposit(&self) -> Result<TransactionBlockResponse, VaultError> {
        info!("-- Starting Deposit --");
        self.submit(self.deposit_block()?).await
    }

    pub async fn withdraw(&self) -> Result<TransactionBlockResponse, VaultError> {
        info!("-- Starting Withdraw --");
        self.submit(self.withdraw_block()?).await
    }

    async fn submit(&self, block: TransactionBlock) -> Result<TransactionBlockResponse, VaultError> {
        let request = SignAndExecuteRequest {
            transaction_block: block,
            request_type: ExecuteRequestType::WaitForEffectsCert,
            options: TransactionResponseOptions::with_effects(),
        };
        let response = self.wallet.sign_and_execute_transaction_block(request).await?;
        info!(response = ?response, "sign and execute response");

        if response.is_success() {
            if let Some(watch) = &self.balance_watch {
                watch.refresh();
            }
        } else {
            warn!(
                digest = %response.digest,
                error = response.execution_error().unwrap_or("unknown"),
                "transaction did not succeed"
            );
        }
        Ok(response)
    }
}

/// `split_coins(gas, [1 SUI])` then `SAPE::deposit(storage, split)`.
pub fn deposit_block(objects: &ObjectRecord, gas_budget: u64) -> Result<TransactionBlock, VaultError> {
    let mut block = TransactionBlock::new();
    let amount = block.pure_u64(UNIT_AMOUNT);
    let gas = block.gas();
    let split = block.split_coins(gas, vec![amount]);
    let coin = TransactionBlock::nested_result(split, 0)?;
    let storage = block.object(objects.balance_storage);
    block.move_call(vault_target(objects, DEPOSIT_FN)?, vec![], vec![storage, coin]);
    block.set_gas_budget(gas_budget);
    Ok(block)
}

/// `SAPE::sui_withdraw(storage, 1 SUI)`.
pub fn withdraw_block(objects: &ObjectRecord, gas_budget: u64) -> Result<TransactionBlock, VaultError> {
    let mut block = TransactionBlock::new();
    let storage = block.object(objects.balance_storage);
    let amount = block.pure_u64(UNIT_AMOUNT);
    block.move_call(vault_target(objects, WITHDRAW_FN)?, vec![], vec![storage, amount]);
    block.set_gas_budget(gas_budget);
    Ok(block)
}
