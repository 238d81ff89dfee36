//! The vault application: balance reads, the balance watch and the
//! deposit/withdraw actions.

pub mod actions;
pub mod balance;
pub mod watch;

use crate::core::config::ObjectRecord;
use crate::core::domain::MIST_PER_SUI;
use crate::core::errors::VaultError;
use crate::core::validation::MoveTarget;

pub use actions::ActionDispatcher;
pub use balance::BalanceReader;
pub use watch::{BalanceWatch, KeyedEffect};

/// Move module of the vault package.
pub const VAULT_MODULE: &str = "SAPE";
pub const DEPOSIT_FN: &str = "deposit";
pub const WITHDRAW_FN: &str = "sui_withdraw";
pub const ACCOUNT_DETAIL_FN: &str = "get_account_detail";

/// Amount moved by one deposit or withdraw: 1 SUI.
pub const UNIT_AMOUNT: u64 = MIST_PER_SUI;

/// `{package}::SAPE::{function}`
pub fn vault_target(objects: &ObjectRecord, function: &str) -> Result<MoveTarget, VaultError> {
    MoveTarget::new(objects.package_id, VAULT_MODULE, function)
}
