//! Chord ledger command line

mod config;

use anyhow::{bail, Context, Result};
use chord_api::ApiState;
use chord_core::{Address, Amount, Ledger, TransferReceipt};
use chord_storage::LedgerStore;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::NodeConfig;

#[derive(Parser)]
#[command(name = "chord")]
#[command(about = "Chord fee-tapering ledger", version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "chord.toml")]
    config: PathBuf,

    /// Override the snapshot directory from the config file
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh ledger from the config file
    Init {
        /// Overwrite an existing ledger snapshot
        #[arg(long)]
        force: bool,
    },

    /// Show supply, burn and fee curve state
    Info,

    /// Show an account balance
    Balance { address: String },

    /// Transfer tokens (amount in whole tokens, decimals allowed)
    Transfer {
        from: String,
        to: String,
        amount: String,
    },

    /// Set a spender's allowance over an owner's tokens
    Approve {
        owner: String,
        spender: String,
        amount: String,
    },

    /// Transfer on an owner's behalf using an allowance
    TransferFrom {
        spender: String,
        owner: String,
        to: String,
        amount: String,
    },

    /// Exempt an account from fees and redistribution (administrator only)
    Exclude { caller: String, account: String },

    /// Return an exempt account to redistribution (administrator only)
    Include { caller: String, account: String },

    /// Copy the current ledger to a named snapshot
    Archive { name: String },

    /// Serve the HTTP API
    Serve {
        /// Listen address, overriding the config file
        #[arg(short, long)]
        listen: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let node_config = NodeConfig::load(&cli.config)?;
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| node_config.storage.data_dir.clone());
    let store = LedgerStore::open(&data_dir)
        .with_context(|| format!("opening data dir {}", data_dir.display()))?;

    match cli.command {
        Commands::Init { force } => {
            if store.has_ledger() && !force {
                bail!(
                    "ledger already exists in {} (use --force to replace it)",
                    data_dir.display()
                );
            }
            let ledger = Ledger::new(node_config.ledger.to_ledger_config()?)?;
            store.save_ledger(&ledger)?;
            println!("{}", "✓ Ledger created".green().bold());
            print_info(&ledger);
        }

        Commands::Info => {
            let ledger = store.load_ledger()?;
            print_info(&ledger);
        }

        Commands::Balance { address } => {
            let ledger = store.load_ledger()?;
            let account = Address::new(address);
            let balance = ledger.balance_of(&account);
            println!("\n{}", "Balance".cyan().bold());
            println!("Address:  {}", account);
            println!(
                "Balance:  {} {}",
                balance.display(ledger.decimals()).green(),
                ledger.symbol()
            );
            if ledger.is_excluded(&account) {
                println!("Status:   {}", "excluded".yellow());
            }
            println!();
        }

        Commands::Transfer { from, to, amount } => {
            let mut ledger = store.load_ledger()?;
            let amount = Amount::parse(&amount, ledger.decimals())?;
            let receipt = ledger.transfer(&Address::new(from), &Address::new(to), amount)?;
            store.save_ledger(&ledger)?;
            print_receipt(&ledger, &receipt);
        }

        Commands::Approve {
            owner,
            spender,
            amount,
        } => {
            let mut ledger = store.load_ledger()?;
            let amount = Amount::parse(&amount, ledger.decimals())?;
            let (owner, spender) = (Address::new(owner), Address::new(spender));
            ledger.approve(&owner, &spender, amount);
            store.save_ledger(&ledger)?;
            println!(
                "{} {} may spend {} {} of {}",
                "✓".green(),
                spender,
                amount.display(ledger.decimals()),
                ledger.symbol(),
                owner
            );
        }

        Commands::TransferFrom {
            spender,
            owner,
            to,
            amount,
        } => {
            let mut ledger = store.load_ledger()?;
            let amount = Amount::parse(&amount, ledger.decimals())?;
            let receipt = ledger.transfer_from(
                &Address::new(spender),
                &Address::new(owner),
                &Address::new(to),
                amount,
            )?;
            store.save_ledger(&ledger)?;
            print_receipt(&ledger, &receipt);
        }

        Commands::Exclude { caller, account } => {
            let mut ledger = store.load_ledger()?;
            let account = Address::new(account);
            let frozen = ledger.exclude(&Address::new(caller), &account)?;
            store.save_ledger(&ledger)?;
            println!(
                "{} {} excluded, balance frozen at {} {}",
                "✓".green(),
                account,
                frozen.display(ledger.decimals()),
                ledger.symbol()
            );
        }

        Commands::Include { caller, account } => {
            let mut ledger = store.load_ledger()?;
            let account = Address::new(account);
            let balance = ledger.include(&Address::new(caller), &account)?;
            store.save_ledger(&ledger)?;
            println!(
                "{} {} included with {} {}",
                "✓".green(),
                account,
                balance.display(ledger.decimals()),
                ledger.symbol()
            );
        }

        Commands::Archive { name } => {
            let ledger = store.load_ledger()?;
            store.archive(&ledger, &name)?;
            println!("{} archived ledger as '{}'", "✓".green(), name);
        }

        Commands::Serve { listen } => {
            let ledger = store.load_ledger()?;
            let addr = listen.unwrap_or(node_config.api.listen);
            info!("serving {} ledger from {}", ledger.symbol(), data_dir.display());

            let state = ApiState::new(ledger).with_store(Arc::new(store));
            chord_api::start_server(addr, state)
                .await
                .map_err(|e| anyhow::anyhow!("API server failed: {}", e))?;
        }
    }

    Ok(())
}

fn print_info(ledger: &Ledger) {
    let stats = ledger.stats();
    let decimals = stats.decimals;

    println!("\n{} ({})", stats.name.cyan().bold(), stats.symbol);
    println!("═══════════════════════════════════");
    println!("Total Supply:      {}", stats.total_supply.display(decimals).green());
    println!("Gross Burn:        {}", stats.total_burn.display(decimals));
    println!("Net Burn:          {}", stats.total_net_burn.display(decimals));
    println!("Redistributed:     {}", stats.total_redistributed.display(decimals));
    println!(
        "Epoch:             {}/{}",
        stats.current_epoch, stats.total_epochs
    );
    println!(
        "Current Fee:       {} bps ({}..{} step {})",
        stats.current_fee_bps.to_string().yellow(),
        stats.fee_floor_bps,
        stats.fee_ceiling_bps,
        stats.fee_step_bps
    );
    println!("Epoch Quota:       {}", stats.epoch_burn_quota.display(decimals));
    println!(
        "Remint per Epoch:  {}",
        stats.redistribution_per_epoch.display(decimals)
    );
    println!("Excluded Accounts: {}", stats.excluded_accounts);
    println!();
}

fn print_receipt(ledger: &Ledger, receipt: &TransferReceipt) {
    let decimals = ledger.decimals();
    println!("\n{}", "✓ Transfer complete".green().bold());
    println!("From:      {}", receipt.sender);
    println!("To:        {}", receipt.recipient);
    println!("Amount:    {}", receipt.amount.display(decimals));
    println!(
        "Fee:       {} ({} bps)",
        receipt.gross_fee.display(decimals),
        receipt.fee_bps
    );
    println!("Received:  {}", receipt.net_amount.display(decimals));
    if let Some(event) = &receipt.redistribution {
        println!(
            "{} epoch {} completed, {} {} redistributed",
            "★".yellow(),
            event.epoch,
            event.mint_amount.display(decimals),
            ledger.symbol()
        );
    }
    println!();
}
