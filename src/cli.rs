//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_store::CsvStore;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_parser;
use crate::domain::allocator::allocate;
use crate::domain::applier::apply_trades;
use crate::domain::error::RebalanceError;
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::StorePort;

pub const DEFAULT_STORE_PATH: &str = "portfolio.csv";
pub const DEFAULT_CURRENCY: &str = "€";

/// Informational line printed when the trade list is empty.
pub const BALANCED_MESSAGE: &str = "# Portfolio is already balanced (or no trades needed).";

#[derive(Parser, Debug)]
#[command(
    name = "rebalancer",
    about = "Rebalance a portfolio to an equal value per ticker"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute, print and apply rebalancing trades
    Rebalance {
        /// Market summary text file with current prices
        #[arg(short, long)]
        market: PathBuf,
        /// Portfolio text file; defaults to the saved portfolio
        #[arg(short, long)]
        portfolio: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Saved portfolio location (overrides config)
        #[arg(long)]
        store: Option<PathBuf>,
        /// Print trades without applying or saving anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the saved portfolio
    Show {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        store: Option<PathBuf>,
        /// Value holdings against a market summary file
        #[arg(short, long)]
        market: Option<PathBuf>,
    },
    /// Create the saved portfolio from a portfolio text file
    Init {
        #[arg(short, long)]
        portfolio: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Rebalance {
            market,
            portfolio,
            config,
            store,
            dry_run,
        } => rebalance_command(
            &market,
            portfolio.as_deref(),
            config.as_deref(),
            store.as_deref(),
            dry_run,
        ),
        Command::Show {
            config,
            store,
            market,
        } => show_command(config.as_deref(), store.as_deref(), market.as_deref()),
        Command::Init {
            portfolio,
            config,
            store,
        } => init_command(&portfolio, config.as_deref(), store.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Resolved runtime settings: defaults, overridden by config file, overridden
/// by CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub store_path: PathBuf,
    pub currency: String,
}

pub fn resolve_settings(
    config_path: Option<&Path>,
    store_override: Option<&Path>,
) -> Result<Settings, RebalanceError> {
    let mut store_path = PathBuf::from(DEFAULT_STORE_PATH);
    let mut currency = DEFAULT_CURRENCY.to_string();

    if let Some(path) = config_path {
        let adapter =
            FileConfigAdapter::from_file(path).map_err(|e| RebalanceError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })?;

        if let Some(configured) = adapter.get_string("store", "path") {
            if configured.trim().is_empty() {
                return Err(RebalanceError::ConfigInvalid {
                    section: "store".to_string(),
                    key: "path".to_string(),
                    reason: "empty path".to_string(),
                });
            }
            store_path = PathBuf::from(configured);
        }
        if let Some(configured) = adapter.get_string("parse", "currency") {
            currency = configured;
        }
    }

    if let Some(path) = store_override {
        store_path = path.to_path_buf();
    }

    Ok(Settings {
        store_path,
        currency,
    })
}

/// The full pipeline: load portfolio → parse market → allocate → print →
/// apply → save.
pub fn rebalance_command(
    market_path: &Path,
    portfolio_path: Option<&Path>,
    config_path: Option<&Path>,
    store_override: Option<&Path>,
    dry_run: bool,
) -> Result<(), RebalanceError> {
    let settings = resolve_settings(config_path, store_override)?;
    let store = CsvStore::new(settings.store_path.clone());

    let mut portfolio = match portfolio_path {
        Some(path) => {
            eprintln!("Loading portfolio from {}", path.display());
            let text = fs::read_to_string(path)?;
            text_parser::parse_portfolio(&text, &settings.currency)?
        }
        None => {
            eprintln!("Loading portfolio from {}", settings.store_path.display());
            store.load()?
        }
    };
    portfolio.validate()?;

    eprintln!("Loading market prices from {}", market_path.display());
    let market_text = fs::read_to_string(market_path)?;
    let prices = text_parser::parse_market(&market_text, &settings.currency)?;

    let trades = allocate(portfolio.cash, &portfolio.holdings, &prices)?;

    if trades.is_empty() {
        println!("{BALANCED_MESSAGE}");
    } else {
        for trade in &trades {
            println!("{}", trade.command());
        }
    }

    if dry_run {
        return Ok(());
    }

    apply_trades(&mut portfolio, &prices, &trades)?;
    store.save(&portfolio)?;
    eprintln!("Saved portfolio to {}", settings.store_path.display());
    Ok(())
}

/// Print the saved portfolio, optionally valued against a market file.
pub fn show_command(
    config_path: Option<&Path>,
    store_override: Option<&Path>,
    market_path: Option<&Path>,
) -> Result<(), RebalanceError> {
    let settings = resolve_settings(config_path, store_override)?;
    let store = CsvStore::new(settings.store_path.clone());
    let portfolio = store.load()?;

    let mut tickers: Vec<&String> = portfolio.holdings.keys().collect();
    tickers.sort();

    println!("Cash: {}{:.2}", settings.currency, portfolio.cash);
    match market_path {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            let prices = text_parser::parse_market(&text, &settings.currency)?;

            for ticker in tickers {
                let quantity = portfolio.holdings[ticker];
                match prices.get(ticker) {
                    Some(&price) => println!(
                        "{ticker}: {quantity} shares @ {cur}{price:.2} = {cur}{value:.2}",
                        cur = settings.currency,
                        value = quantity as f64 * price,
                    ),
                    None => println!("{ticker}: {quantity} shares (no price)"),
                }
            }
            println!(
                "Total value: {}{:.2}",
                settings.currency,
                portfolio.total_value(&prices)
            );
        }
        None => {
            for ticker in tickers {
                println!("{ticker}: {} shares", portfolio.holdings[ticker]);
            }
        }
    }
    Ok(())
}

/// Parse a portfolio text file and persist it as the saved portfolio.
pub fn init_command(
    portfolio_path: &Path,
    config_path: Option<&Path>,
    store_override: Option<&Path>,
) -> Result<(), RebalanceError> {
    let settings = resolve_settings(config_path, store_override)?;
    let store = CsvStore::new(settings.store_path.clone());

    let text = fs::read_to_string(portfolio_path)?;
    let portfolio = text_parser::parse_portfolio(&text, &settings.currency)?;
    portfolio.validate()?;

    if store.exists() {
        eprintln!("Replacing saved portfolio at {}", settings.store_path.display());
    }
    store.save(&portfolio)?;
    eprintln!("Saved portfolio to {}", settings.store_path.display());
    Ok(())
}
