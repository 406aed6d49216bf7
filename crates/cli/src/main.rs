//! Command Line Interface for the RunesX swap estimator.
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use runesx_domain::math::liquidity::DepositAmount;
use runesx_routing::config::RoutingConfig;
use runesx_routing::path_finder::Algorithm;
use runesx_sync::client::{ClientConfig, SwapClient};
use runesx_sync::sync::{StreamEvent, SyncConfig};
use runesx_sync::worker::WorkerConfig;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "runesx")]
#[command(about = "Multi-hop swap estimator over a recorded RunesX market stream", long_about = None)]
struct Cli {
    /// JSON array of stream events to load into the replica
    #[arg(short, long, default_value = "demos/market.json")]
    events: PathBuf,

    /// Seconds to wait for the initial pools, coins and wallets
    #[arg(long, default_value_t = 5)]
    wait_secs: u64,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the best route for a swap
    Estimate {
        /// Input coin ticker (e.g., RUNES)
        #[arg(short, long)]
        from: String,

        /// Output coin ticker
        #[arg(short, long)]
        to: String,

        /// Amount of the input coin, in display units
        #[arg(short, long)]
        amount: String,

        /// Maximum number of hops
        #[arg(long)]
        max_hops: Option<u32>,

        /// Path search algorithm (dfs or bfs)
        #[arg(long, default_value = "dfs")]
        algorithm: Algorithm,
    },
    /// Check whether a pool between two coins meets the liquidity requirement
    Compliance {
        #[arg(long)]
        coin_a: String,

        #[arg(long)]
        coin_b: String,
    },
    /// Estimate the counterpart of a liquidity deposit
    Deposit {
        #[arg(long)]
        coin_a: String,

        #[arg(long)]
        coin_b: String,

        /// Amount of coin A to deposit
        #[arg(long, conflicts_with = "amount_b", required_unless_present = "amount_b")]
        amount_a: Option<Decimal>,

        /// Amount of coin B to deposit
        #[arg(long)]
        amount_b: Option<Decimal>,
    },
    /// Show the assets backing the user's pool shares
    Shares,
    /// Show USD prices
    Prices {
        /// Tickers to price
        #[arg(required = true)]
        tickers: Vec<String>,
    },
}

fn load_events(path: &Path) -> Result<Vec<StreamEvent>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid event file {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let client = SwapClient::new(
        ClientConfig::from_env(),
        RoutingConfig::default(),
        SyncConfig::default().with_initial_wait(Duration::from_secs(cli.wait_secs)),
        WorkerConfig::default(),
    );

    let events = load_events(&cli.events)?;
    let (tx, pump) = client.start_event_loop();
    for event in events {
        tx.send(event).await.context("Event loop stopped")?;
    }
    drop(tx);
    let handled = pump.await?;
    info!(handled, "Loaded recorded events");

    client
        .wait_for_stores()
        .await
        .context("Recording lacks initial pools, coins or wallets")?;

    match &cli.command {
        Commands::Estimate {
            from,
            to,
            amount,
            max_hops,
            algorithm,
        } => {
            let estimate = client
                .estimate_swap(from, to, amount, *max_hops, *algorithm)
                .await?;
            if cli.json {
                return print_json(&estimate);
            }

            println!("🔀 Best route ({}):", estimate.algorithm);
            for hop in &estimate.path {
                println!("   {} via pool {}", hop, hop.pool_id);
            }
            println!("════════════════════════════════════");
            println!(
                "Input:        {} {} (${:.4})",
                estimate.input.amount, estimate.input.token, estimate.input.value_usd
            );
            println!(
                "Output:       {} {} (${:.4})",
                estimate.output.amount, estimate.output.token, estimate.output.value_usd
            );
            println!("Price impact: {:.4}%", estimate.slippage.price_impact);
            for step in &estimate.slippage.intermediate_amounts {
                println!("   after hop:  {} {}", step.amount, step.ticker);
            }
            for after in [
                &estimate.after_swap_prices.input,
                &estimate.after_swap_prices.output,
            ] {
                println!(
                    "After swap:   {} = ${:.6}{}",
                    after.ticker,
                    after.price_usd,
                    if after.affected { "" } else { " (unchanged)" }
                );
            }
            println!("════════════════════════════════════");
        }
        Commands::Compliance { coin_a, coin_b } => {
            let report = client.check_compliance(coin_a, coin_b).await;
            if cli.json {
                return print_json(&report);
            }

            if report.is_compliant {
                println!("✅ {}/{} is compliant", coin_a, coin_b);
            } else {
                println!("❌ {}/{} is not compliant", coin_a, coin_b);
            }
            for warning in &report.warnings {
                if warning.is_list_item {
                    println!("   - {}", warning.message);
                } else {
                    println!("{}", warning.message);
                }
            }
        }
        Commands::Deposit {
            coin_a,
            coin_b,
            amount_a,
            amount_b,
        } => {
            let amount = match (amount_a, amount_b) {
                (Some(a), _) => DepositAmount::A(*a),
                (None, Some(b)) => DepositAmount::B(*b),
                (None, None) => bail!("Either --amount-a or --amount-b is required"),
            };
            let estimate = client
                .estimate_liquidity_deposit(coin_a, coin_b, amount)
                .await?;
            if cli.json {
                return print_json(&estimate);
            }

            if estimate.is_pool_empty {
                println!(
                    "🆕 No liquidity in {}/{} yet; any ratio is accepted",
                    estimate.coin_a.ticker, estimate.coin_b.ticker
                );
                return Ok(());
            }
            println!(
                "💧 Deposit {} {} + {} {}",
                estimate.amount_a.unwrap_or_default(),
                estimate.coin_a.ticker,
                estimate.amount_b.unwrap_or_default(),
                estimate.coin_b.ticker
            );
        }
        Commands::Shares => {
            let amounts = client.calculate_share_amounts().await;
            if cli.json {
                return print_json(&amounts);
            }

            if amounts.is_empty() {
                println!("No pool shares held.");
                return Ok(());
            }
            println!(
                "{:<16} | {:<20} | {:<20} | {:<20}",
                "Pair", "Shares", "Amount A", "Amount B"
            );
            println!("{}", "-".repeat(84));
            for share in amounts {
                println!(
                    "{:<16} | {:<20} | {:<20} | {:<20}",
                    share.pair, share.shares, share.display_amount_a, share.display_amount_b
                );
            }
        }
        Commands::Prices { tickers } => {
            let tickers: Vec<&str> = tickers.iter().map(String::as_str).collect();
            let prices = client.prices(&tickers).await;
            if cli.json {
                return print_json(&prices);
            }

            for (ticker, price) in prices {
                println!("{:<10} ${}", ticker, price);
            }
        }
    }

    Ok(())
}
