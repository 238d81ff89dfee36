use crate::core::domain::SuiAddress;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sui token vault CLI (library-facing definitions)
#[derive(Debug, Parser)]
#[command(
    name = "sui-vault",
    about = "Sui token vault client",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Config file; defaults to $CONFIG_PATH, then sui-vault.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the vault balance of an account
    Balance {
        /// Account to read; defaults to the configured wallet address
        #[arg(long)]
        address: Option<SuiAddress>,
    },
    /// Keep printing the vault balance as it changes
    Watch {
        #[arg(long)]
        address: Option<SuiAddress>,
        /// Poll interval in seconds
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Deposit 1 SUI into the vault
    Deposit {
        /// Simulate with dev-inspect instead of signing
        #[arg(long)]
        dry_run: bool,
    },
    /// Withdraw 1 SUI from the vault
    Withdraw {
        #[arg(long)]
        dry_run: bool,
    },
    /// Show node and vault object information
    Info,
}
