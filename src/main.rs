// src/main.rs
//! Sui vault CLI entry point
use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use sui_vault::blockchain::sui::{SuiClient, TransactionBlock};
use sui_vault::blockchain::traits::SuiReadApi;
use sui_vault::cli::{Cli, Commands};
use sui_vault::core::domain::{format_sui, SuiAddress};
use sui_vault::core::{VaultConfig, VaultError};
use sui_vault::vault::actions::{deposit_block, withdraw_block};
use sui_vault::vault::{ActionDispatcher, BalanceReader, BalanceWatch};
use sui_vault::wallet::{CommandSigner, RpcWallet, WalletAdapter};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Clone, Copy)]
enum Action {
    Deposit,
    Withdraw,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging()?;

    info!("Starting sui-vault v{}", env!("CARGO_PKG_VERSION"));

    let config = VaultConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    let client = Arc::new(
        SuiClient::new(&config.network.rpc_url, config.network.request_timeout())
            .context("failed to create Sui client")?,
    );
    let reader = Arc::new(BalanceReader::new(client.clone(), config.objects));

    match cli.command {
        Commands::Balance { address } => {
            let address = address.or(config.wallet.address);
            let balance = reader.read(address.as_ref()).await.context("balance read failed")?;
            print_balance(address, balance);
        }
        Commands::Watch { address, interval } => {
            let address = address.or(config.wallet.address);
            let interval = interval
                .map(|secs| Duration::from_secs(secs.max(1)))
                .unwrap_or_else(|| config.watch.poll_interval());
            run_watch(reader, address, interval).await?;
        }
        Commands::Deposit { dry_run } => {
            run_action(Action::Deposit, dry_run, &config, client, reader).await?;
        }
        Commands::Withdraw { dry_run } => {
            run_action(Action::Withdraw, dry_run, &config, client, reader).await?;
        }
        Commands::Info => {
            show_info(&config, client.as_ref()).await?;
        }
    }

    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=info,reqwest=info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn print_balance(address: Option<SuiAddress>, balance: u64) {
    match address {
        Some(addr) => println!("{}: {} SUI ({} MIST)", addr, format_sui(balance), balance),
        None => println!("(not connected): {} SUI ({} MIST)", format_sui(balance), balance),
    }
}

async fn run_watch(
    reader: Arc<BalanceReader>,
    address: Option<SuiAddress>,
    interval: Duration,
) -> Result<()> {
    let watch = BalanceWatch::new(reader);
    let mut updates = watch.subscribe();
    watch.watch_address(address);

    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;
    let mut last: Option<u64> = None;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, stopping watch");
                return Ok(());
            }
            _ = ticker.tick() => {
                watch.refresh();
            }
            changed = updates.changed() => {
                changed.context("balance watch closed")?;
                let balance = *updates.borrow_and_update();
                if last != Some(balance) {
                    print_balance(address, balance);
                    last = Some(balance);
                }
            }
        }
    }
}

async fn run_action(
    action: Action,
    dry_run: bool,
    config: &VaultConfig,
    client: Arc<SuiClient>,
    reader: Arc<BalanceReader>,
) -> Result<()> {
    if dry_run {
        let block = match action {
            Action::Deposit => deposit_block(&config.objects, config.gas.budget)?,
            Action::Withdraw => withdraw_block(&config.objects, config.gas.budget)?,
        };
        return dry_run_block(block, config.wallet.address, config, client.as_ref()).await;
    }

    let signer = config.wallet.signer.as_ref().map(CommandSigner::from_config).context(
        "no signer configured; set [wallet.signer] in the config file or SUI_VAULT_SIGNER",
    )?;
    let wallet: Arc<dyn WalletAdapter> =
        Arc::new(RpcWallet::new(client.clone(), config.wallet.address, signer));
    let dispatcher = ActionDispatcher::new(wallet.clone(), config.objects, config.gas.budget);

    let response = match action {
        Action::Deposit => dispatcher.deposit().await,
        Action::Withdraw => dispatcher.withdraw().await,
    }
    .with_context(|| format!("{:?} failed", action))?;

    println!("digest: {}", response.digest);
    println!("status: {}", response.execution_status().unwrap_or("unknown"));

    if !response.is_success() {
        let reason = response
            .execution_error()
            .map(str::to_string)
            .unwrap_or_else(|| response.errors.join("; "));
        return Err(VaultError::TransactionFailed(format!("{}: {}", response.digest, reason)).into());
    }

    let address = wallet.address();
    print_balance(address, reader.read_or_zero(address.as_ref()).await);
    Ok(())
}

async fn dry_run_block(
    block: TransactionBlock,
    address: Option<SuiAddress>,
    config: &VaultConfig,
    client: &SuiClient,
) -> Result<()> {
    let sender = address.unwrap_or_else(|| {
        warn!("no wallet address configured, simulating as the zero address");
        config.objects.address_zero
    });
    let tx_kind = block.build_kind_base64(client).await.context("failed to build transaction")?;
    let results = client
        .dev_inspect_transaction_block(&sender, &tx_kind)
        .await
        .context("dev-inspect failed")?;

    let status = results
        .effects
        .get("status")
        .and_then(|s| s.get("status"))
        .and_then(|s| s.as_str())
        .unwrap_or("unknown");
    println!("simulated as {}: {}", sender, status);
    if let Some(error) = &results.error {
        println!("error: {}", error);
    }
    Ok(())
}

async fn show_info(config: &VaultConfig, client: &SuiClient) -> Result<()> {
    println!("network:         {} ({})", config.network.name, client.rpc_url());
    match client.get_rpc_api_version().await {
        Ok(version) => println!("rpc api version: {}", version),
        Err(e) => println!("rpc api version: unavailable ({})", e),
    }
    let gas_price = client.get_reference_gas_price().await.context("failed to fetch gas price")?;
    println!("gas price:       {} MIST", gas_price);
    println!("gas budget:      {} MIST", config.gas.budget);
    println!("package:         {}", config.objects.package_id);
    println!("balance storage: {}", config.objects.balance_storage);

    let storage = client
        .get_object(&config.objects.balance_storage)
        .await
        .context("failed to fetch balance storage object")?;
    match (storage.data, storage.error) {
        (Some(data), _) => println!(
            "storage object:  version {} owner {:?}",
            data.version,
            data.owner
        ),
        (None, Some(error)) => println!("storage object:  error {}", error),
        (None, None) => println!("storage object:  not found"),
    }
    match config.wallet.address {
        Some(addr) => println!("wallet:          {}", addr),
        None => println!("wallet:          not connected"),
    }
    Ok(())
}
