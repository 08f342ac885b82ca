//! BasketLab CLI — list the catalog and run a backtest without the TUI.
//!
//! Commands:
//! - `strategies` — list strategy ids, names, and default params
//! - `baskets` — list baskets and their symbols in service order
//! - `run` — run one backtest and print per-symbol PnL with the signed total

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use basketlab_client::{
    default_config_path, BacktestService, ClientConfig, HttpService, RunError, Session,
    API_URL_ENV,
};
use basketlab_core::{AggregatedView, BacktestResultRow, PnlSign};

#[derive(Parser)]
#[command(
    name = "basketlab",
    about = "BasketLab CLI — basket backtests against a strategy service"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to <config_dir>/basketlab/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Service base URL. Overrides the config file and BASKETLAB_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available strategies.
    Strategies,
    /// List baskets and their symbols.
    Baskets,
    /// Run one backtest. Defaults to the first strategy and the first basket.
    Run {
        /// Strategy id.
        #[arg(long)]
        strategy: Option<String>,

        /// Basket name.
        #[arg(long)]
        basket: Option<String>,

        /// Print the aggregated view as JSON instead of a table. Non-numeric PnL is written as "NaN".
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Also write the raw result rows to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let default_path = dirs::config_dir().map(|d| default_config_path(&d));
    let config = ClientConfig::resolve(
        cli.config.as_deref(),
        default_path.as_deref(),
        std::env::var(API_URL_ENV).ok(),
        cli.api_url,
    )
    .context("load configuration")?;
    debug!(api_url = %config.api_url, timeout = ?config.request_timeout(), "resolved config");
    let service = HttpService::new(&config).context("build HTTP client")?;

    match cli.command {
        Commands::Strategies => list_strategies(&service),
        Commands::Baskets => list_baskets(&service),
        Commands::Run {
            strategy,
            basket,
            json,
            csv,
        } => run_backtest_cmd(service, strategy, basket, json, csv),
    }
}

fn list_strategies(service: &dyn BacktestService) -> Result<()> {
    let strategies = service.strategies().context("fetch strategies")?;
    if strategies.is_empty() {
        println!("No strategies available.");
        return Ok(());
    }
    println!("{:<20} {:<24} PARAMS", "ID", "NAME");
    for s in &strategies {
        println!("{:<20} {:<24} {}", s.id, s.name, s.params_summary());
    }
    Ok(())
}

fn list_baskets(service: &dyn BacktestService) -> Result<()> {
    let baskets = service.assets().context("fetch baskets")?;
    if baskets.is_empty() {
        println!("No baskets available.");
        return Ok(());
    }
    for (name, symbols) in baskets.iter() {
        println!("{:<12} ({:>2}) {}", name, symbols.len(), symbols.join(", "));
    }
    Ok(())
}

fn run_backtest_cmd(
    service: HttpService,
    strategy: Option<String>,
    basket: Option<String>,
    json: bool,
    csv_path: Option<PathBuf>,
) -> Result<()> {
    let mut session = Session::new(service);
    let report = session.load_catalog();
    for (part, err) in &report.failures {
        eprintln!("Failed to load {part}: {err}");
    }

    if let Some(id) = strategy {
        session.select_strategy(id);
    }
    if let Some(name) = basket {
        session.select_basket(name);
    }

    let run = match session.run_backtest() {
        Ok(run) => run,
        Err(RunError::Rejected(e)) => {
            eprintln!("Run rejected: {e}");
            std::process::exit(1);
        }
        Err(RunError::Service(e)) => {
            eprintln!("Backtest failed: {e}");
            std::process::exit(1);
        }
    };

    for issue in &run.issues {
        eprintln!("Warning: {issue}");
    }

    if let Some(path) = csv_path {
        write_csv(&path, &run.rows)?;
        eprintln!("Rows written to: {}", path.display());
    }

    let view = session.view();
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        let selection = session.selection();
        print_summary(
            selection.strategy_id().unwrap_or("-"),
            selection.basket_name().unwrap_or("-"),
            run.fingerprint.as_str(),
            view,
        );
    }
    Ok(())
}

fn write_csv(path: &Path, rows: &[BacktestResultRow]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn print_summary(strategy: &str, basket: &str, fingerprint: &str, view: &AggregatedView) {
    println!();
    println!("=== Backtest Result ===");
    println!("Strategy:       {strategy}");
    println!("Basket:         {basket}");
    println!("Run:            {fingerprint}");
    println!();

    if view.is_empty() {
        println!("No results returned.");
        return;
    }

    println!("{:<12} {:>12} {:>7}", "SYMBOL", "PNL", "TRADES");
    for s in &view.per_symbol {
        println!("{:<12} {:>12.2} {:>7}", s.name, s.pnl, s.trades);
    }
    println!();
    println!("Total Trades:   {}", view.total_trades());
    println!(
        "Total PnL:      {:+.2} ({})",
        view.total_pnl,
        sign_label(view.sign())
    );
}

fn sign_label(sign: PnlSign) -> &'static str {
    match sign {
        PnlSign::NonNegative => "positive",
        PnlSign::Negative => "negative",
    }
}
