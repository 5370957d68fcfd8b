use action::{OperationError, TransactionSequencer};
use alloy_primitives::{utils::format_units, Address, U256};
use alloy_provider::{DynProvider, Provider};
use balance::{BalanceBook, BalanceMonitor};
use clap::{Parser, Subcommand};
use client::{ChainClient, EmbeddedWallet, ExternalWallet, WalletSession};
use config::{NetworkConfig, PilotInfo, PILOT_DIRECTORY};
use pilot::PilotStore;
use staking::{
    config::Config,
    metrics::{install_prometheus_exporter, Metrics},
    Settled, StakingSession,
};
use std::{path::PathBuf, sync::Arc};
use tracing::info;
use withdrawal::{ManagerReader, WithdrawalTracker};

type Session = StakingSession<
    WalletSession<DynProvider>,
    ChainClient<DynProvider>,
    BalanceMonitor<DynProvider>,
    ManagerReader<DynProvider>,
>;

#[derive(Parser, Debug)]
#[command(name = "staking", about = "SuperCluster staking client")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, short, default_value = "config.toml")]
    config: PathBuf,

    /// Private key of an external wallet. Without it the embedded signer is used.
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Approve and deposit USDC through a pilot
    Deposit {
        amount: String,
        /// Use this pilot instead of the selected one
        #[arg(long)]
        pilot: Option<Address>,
    },
    /// Wrap sUSDC into wsUSDC
    Wrap { amount: String },
    /// Unwrap wsUSDC into sUSDC
    Unwrap { amount: String },
    /// Request a withdrawal of sUSDC
    Withdraw {
        amount: String,
        #[arg(long)]
        pilot: Option<Address>,
    },
    /// Claim a ready withdrawal request
    Claim { request_id: U256 },
    /// List withdrawal requests
    Requests,
    /// Show token balances
    Balances,
    /// Manage the selected pilot
    Pilot {
        #[command(subcommand)]
        command: PilotCommand,
    },
}

#[derive(Subcommand, Debug)]
enum PilotCommand {
    /// Show the selected pilot
    Show,
    /// Select a pilot by address
    Select { address: String },
    /// List known pilots
    List,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn build_session(cli: &Cli, config: &Config, network: NetworkConfig) -> eyre::Result<Session> {
    let provider = client::create_provider(&config.rpc_url)?.erased();

    let wallet = match (&cli.private_key, &config.embedded_signer_url) {
        (Some(key), _) => {
            let account = client::signer_address(key)?;
            let signer_provider = client::create_wallet_provider(&config.rpc_url, key)?.erased();
            info!(account = %account, "Using external wallet");
            WalletSession::External(ExternalWallet::new(signer_provider, account))
        }
        (None, Some(url)) => {
            info!(url = %url, "Using embedded wallet");
            WalletSession::Embedded(EmbeddedWallet::new(url.clone()))
        }
        (None, None) => eyre::bail!(
            "No wallet configured: pass --private-key or set embedded_signer_url"
        ),
    };

    let receipts = ChainClient::new(
        provider.clone(),
        config.poll_interval(),
        config.confirmation_timeout(),
    );
    let pilots = Arc::new(PilotStore::open(&config.pilot_store, network.contracts.default_pilot).await?);
    let balances = BalanceBook::new(
        BalanceMonitor::new(provider.clone()),
        [
            (network.contracts.usdc, network.tokens.usdc.decimals),
            (network.contracts.s_token, network.tokens.s_token.decimals),
            (network.contracts.ws_token, network.tokens.ws_token.decimals),
        ],
    );
    let tracker = WithdrawalTracker::new(ManagerReader::new(
        provider,
        network.contracts.withdraw_manager,
    ));

    Ok(StakingSession::new(
        TransactionSequencer::new(wallet, receipts, network),
        pilots,
        balances,
        tracker,
        Metrics::new(),
    ))
}

fn pilot_label(address: Address) -> String {
    PilotInfo::find(address)
        .map(|p| format!("{} ({})", p.name, p.address))
        .unwrap_or_else(|| address.to_string())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    let config = Config::from_file(&cli.config)?;
    let network = config.network();
    info!(network = %network.name, chain_id = network.chain_id, "Loaded config");

    if let Some(port) = config.metrics_port {
        install_prometheus_exporter(port)?;
        info!(port, "Metrics exporter listening");
    }

    // pilot commands don't need a wallet
    if let Command::Pilot { command } = &cli.command {
        let store = PilotStore::open(&config.pilot_store, network.contracts.default_pilot).await?;
        match command {
            PilotCommand::Show => println!("{}", pilot_label(store.current())),
            PilotCommand::List => {
                for pilot in PILOT_DIRECTORY {
                    let marker = if pilot.address == store.current() { "*" } else { " " };
                    println!("{marker} {:<20} {}", pilot.name, pilot.address);
                }
            }
            PilotCommand::Select { address } => {
                let Some(address) = pilot::parse_selection(address) else {
                    eyre::bail!("Invalid pilot address: {address}");
                };
                store.select(address).await?;
                println!("Selected {}", pilot_label(address));
            }
        }
        return Ok(());
    }

    let session = build_session(&cli, &config, network).await?;
    let decimals = session.network().tokens.usdc.decimals;

    match &cli.command {
        Command::Deposit { amount, pilot } => {
            if let Some(receipt) = settle(session.deposit(amount, *pilot).await)? {
                print_result(&session, receipt.tx_hash, receipt.confirmed);
            }
        }
        Command::Wrap { amount } => {
            if let Some(receipt) = settle(session.wrap(amount).await)? {
                print_result(&session, receipt.tx_hash, receipt.confirmed);
            }
        }
        Command::Unwrap { amount } => {
            if let Some(receipt) = settle(session.unwrap(amount).await)? {
                print_result(&session, receipt.tx_hash, receipt.confirmed);
            }
        }
        Command::Withdraw { amount, pilot } => {
            if let Some(receipt) = settle(session.request_withdraw(amount, *pilot).await)? {
                print_result(&session, receipt.tx_hash, receipt.confirmed);
                match receipt.request_id {
                    Some(id) => println!("Request id: {id}"),
                    None => println!("Request id not found in receipt, see the explorer link above"),
                }
            }
        }
        Command::Claim { request_id } => {
            if let Some(receipt) = settle(session.claim(*request_id).await)? {
                print_result(&session, receipt.tx_hash, receipt.confirmed);
            }
        }
        Command::Requests => {
            let requests = session.refresh_requests().await?;
            if requests.is_empty() {
                println!("No withdrawal requests");
            }
            for request in requests {
                println!(
                    "#{:<6} {:<8} {:>14} USDC  claimable at {}",
                    request.id,
                    request.state.as_str(),
                    format_units(request.amount, decimals)?,
                    request.claimable_at
                );
            }
            let summary = session.withdrawal_summary().await;
            println!(
                "pending: {} ({} USDC), ready: {} ({} USDC), claimed: {}",
                summary.pending_count,
                format_units(summary.pending_amount, decimals)?,
                summary.ready_count,
                format_units(summary.ready_amount, decimals)?,
                summary.claimed_count
            );
        }
        Command::Balances => {
            for (symbol, amount) in session.balances().await? {
                println!("{symbol:<8} {amount}");
            }
            println!("{:<8} {}", "ETH", session.gas_balance().await?);
        }
        Command::Pilot { .. } => {}
    }

    Ok(())
}

/// Receipt of a finished action. A cancel in the wallet is reported, not raised.
fn settle<T>(result: Result<Option<T>, OperationError>) -> Result<Option<T>, OperationError> {
    match Settled::from_result(result)? {
        Settled::Done(receipt) => Ok(Some(receipt)),
        Settled::Cancelled => {
            println!("Cancelled in wallet");
            Ok(None)
        }
        Settled::Ignored => Ok(None),
    }
}

fn print_result(session: &Session, tx_hash: alloy_primitives::TxHash, confirmed: bool) {
    if confirmed {
        println!("Confirmed: {}", session.explorer_url(tx_hash));
    } else {
        println!(
            "Submitted, still pending. Check later: {}",
            session.explorer_url(tx_hash)
        );
    }
}
