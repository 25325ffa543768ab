//! SimpleSwap command-line front-end
//!
//! Drives the orchestration crate against a live node: dashboard
//! snapshot, swap, add/remove liquidity, and the history feed. Mutating
//! commands sign through the node's wallet session via the --from
//! account.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};
use web3::types::Address;

use simpleswap_amm::{format_units, parse_units, TOKEN_DECIMALS};
use simpleswap_client::{HistoryEntry, SwapClient, SwapDirection};
use simpleswap_config::ClientConfig;

#[derive(Parser, Debug)]
#[command(name = "simpleswap_cli")]
#[command(about = "Swap tokens, manage liquidity and inspect history on the SimpleSwap pool")]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/simpleswap.toml")]
    config: PathBuf,

    /// Account to read balances for and sign transactions from
    #[arg(short, long)]
    from: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Direction {
    AToB,
    BToA,
}

impl From<Direction> for SwapDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::AToB => SwapDirection::AToB,
            Direction::BToA => SwapDirection::BToA,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show reserves, balances, LP position and pool share
    Dashboard,

    /// Show the current spot price for a direction
    Price {
        #[arg(long, value_enum, default_value = "a-to-b")]
        direction: Direction,
    },

    /// Swap an exact input amount
    Swap {
        /// Input amount in token units, e.g. "1.5"
        #[arg(long)]
        amount: String,

        #[arg(long, value_enum, default_value = "a-to-b")]
        direction: Direction,
    },

    /// Deposit liquidity at the pool ratio
    AddLiquidity {
        /// Desired token A amount
        #[arg(long)]
        amount_a: String,

        /// Desired token B amount
        #[arg(long)]
        amount_b: String,
    },

    /// Burn LP tokens and withdraw both sides
    RemoveLiquidity {
        /// LP amount to burn
        #[arg(long)]
        liquidity: String,
    },

    /// Show the activity feed for the account
    History {
        /// Use the wide lookback window
        #[arg(long)]
        full: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = ClientConfig::load(&args.config)?;
    config.validate()?;

    let user: Address = args.from.parse().context("invalid --from address")?;

    let transport = web3::transports::Http::new(&config.rpc.url)
        .with_context(|| format!("failed to create transport for {}", config.rpc.url))?;
    let web3 = web3::Web3::new(transport);

    let client = SwapClient::connect(web3, config, user)
        .await
        .context("failed to connect to the pool contract")?;

    match args.command {
        Command::Dashboard => {
            let snapshot = client.refresh().await?;
            println!("Pool reserves:");
            println!("  token A: {}", format_units(snapshot.reserve_a, TOKEN_DECIMALS));
            println!("  token B: {}", format_units(snapshot.reserve_b, TOKEN_DECIMALS));
            println!("Your balances:");
            println!("  token A: {}", format_units(snapshot.balance_a, TOKEN_DECIMALS));
            println!("  token B: {}", format_units(snapshot.balance_b, TOKEN_DECIMALS));
            println!("LP position:");
            println!("  balance: {}", format_units(snapshot.lp_balance, TOKEN_DECIMALS));
            println!(
                "  total supply: {}",
                format_units(snapshot.total_supply, TOKEN_DECIMALS)
            );
            println!(
                "  pool share: {}.{:02}%",
                snapshot.share_bps / 100,
                snapshot.share_bps % 100
            );
        }

        Command::Price { direction } => {
            let price = client.spot_price(direction.into()).await?;
            println!("price: {}", format_units(price, TOKEN_DECIMALS));
        }

        Command::Swap { amount, direction } => {
            let amount_in =
                parse_units(&amount, TOKEN_DECIMALS).context("invalid swap amount")?;

            let quote = client.quote_swap(direction.into(), amount_in).await?;
            info!(
                "quoted output {} (minimum {})",
                format_units(quote.amount_out, TOKEN_DECIMALS),
                format_units(quote.amount_out_min, TOKEN_DECIMALS)
            );

            let receipt = client.swap(direction.into(), amount_in).await?;
            println!(
                "swap confirmed in tx {:?} (gas used: {})",
                receipt.tx_hash,
                receipt
                    .gas_used
                    .map(|g| g.to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            );
            println!(
                "new balances: {} A / {} B",
                format_units(receipt.snapshot.balance_a, TOKEN_DECIMALS),
                format_units(receipt.snapshot.balance_b, TOKEN_DECIMALS)
            );
        }

        Command::AddLiquidity { amount_a, amount_b } => {
            let desired_a =
                parse_units(&amount_a, TOKEN_DECIMALS).context("invalid token A amount")?;
            let desired_b =
                parse_units(&amount_b, TOKEN_DECIMALS).context("invalid token B amount")?;

            let quote = client.quote_deposit(desired_a, desired_b).await?;
            info!(
                "depositing {} A + {} B (minimums {} / {})",
                format_units(quote.amount_a, TOKEN_DECIMALS),
                format_units(quote.amount_b, TOKEN_DECIMALS),
                format_units(quote.amount_a_min, TOKEN_DECIMALS),
                format_units(quote.amount_b_min, TOKEN_DECIMALS)
            );

            let receipt = client.add_liquidity(desired_a, desired_b).await?;
            println!("liquidity added in tx {:?}", receipt.tx_hash);
            println!(
                "LP balance: {}  (share {}.{:02}%)",
                format_units(receipt.snapshot.lp_balance, TOKEN_DECIMALS),
                receipt.snapshot.share_bps / 100,
                receipt.snapshot.share_bps % 100
            );
        }

        Command::RemoveLiquidity { liquidity } => {
            let amount =
                parse_units(&liquidity, TOKEN_DECIMALS).context("invalid LP amount")?;

            let receipt = client.remove_liquidity(amount).await?;
            println!("liquidity removed in tx {:?}", receipt.tx_hash);
            println!(
                "LP balance: {}",
                format_units(receipt.snapshot.lp_balance, TOKEN_DECIMALS)
            );
        }

        Command::History { full } => {
            let aggregator = client.history();
            let feed = if full {
                aggregator.full(user).await
            } else {
                aggregator.recent(user).await
            };

            // A history failure degrades to an empty feed; it never
            // blocks the rest of the tool.
            let entries: Vec<HistoryEntry> = match feed {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("history could not be fetched: {e}");
                    Vec::new()
                }
            };

            if entries.is_empty() {
                println!("no activity found");
            } else {
                for entry in entries {
                    println!(
                        "block {:>8}  log {:>3}  {:?}  {}",
                        entry.block_number,
                        entry.log_index,
                        entry.tx_hash,
                        entry.detail()
                    );
                }
            }
        }
    }

    Ok(())
}
