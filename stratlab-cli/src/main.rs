//! Stratlab CLI — parse, rank, and P&L-audit backtest results.
//!
//! Commands:
//! - `parse` — normalize one raw backtest-API response into metrics.json
//! - `rank` — rank all stored metrics and print the report
//! - `pnl` — reconstruct per-ticker P&L from a live API fetch or cached files

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use stratlab_core::{end_prices, load_cached_orders, reconstruct, render_report};
use stratlab_core::{BacktestClient, Order, ResultsParser};
use stratlab_ranker::{generate_report, MetricsStore, ScoringConfig, StrategyRanker};

#[derive(Parser)]
#[command(
    name = "stratlab",
    about = "Stratlab CLI — backtest results parsing, ranking, and P&L reconstruction"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a raw backtest-API response file into a stored metrics record.
    Parse {
        /// Path to the raw JSON response.
        #[arg(long)]
        input: PathBuf,

        /// Strategy identifier (names the results subdirectory).
        #[arg(long)]
        strategy_id: String,

        /// Backtest identifier from the host.
        #[arg(long)]
        backtest_id: String,

        /// Display name; defaults to the backtest's own name field.
        #[arg(long, default_value = "")]
        name: String,

        /// Results directory.
        #[arg(long, default_value = "results")]
        results_dir: PathBuf,
    },
    /// Rank all stored metrics and print a plain-text report.
    Rank {
        /// Results directory holding per-strategy metrics.json files.
        #[arg(long, default_value = "results")]
        results_dir: PathBuf,

        /// Optional TOML scoring policy; defaults to the reference policy.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Also write a summary CSV to this path.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Reconstruct per-ticker realized/unrealized P&L from raw orders.
    Pnl {
        /// Project id for a live API fetch (requires --backtest).
        #[arg(long)]
        project: Option<String>,

        /// Backtest id for a live API fetch (requires --project).
        #[arg(long)]
        backtest: Option<String>,

        /// Load cached order pages from /tmp/<prefix>N.json instead.
        #[arg(long)]
        prefix: Option<String>,

        /// Backtest host API base URL.
        #[arg(long, default_value = "https://www.quantconnect.com/api/v2")]
        base_url: String,

        /// API token for the host, if required.
        #[arg(long)]
        token: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            input,
            strategy_id,
            backtest_id,
            name,
            results_dir,
        } => run_parse(input, &strategy_id, &backtest_id, &name, results_dir),
        Commands::Rank {
            results_dir,
            config,
            csv,
        } => run_rank(results_dir, config, csv),
        Commands::Pnl {
            project,
            backtest,
            prefix,
            base_url,
            token,
        } => run_pnl(project, backtest, prefix, base_url, token),
    }
}

fn run_parse(
    input: PathBuf,
    strategy_id: &str,
    backtest_id: &str,
    name: &str,
    results_dir: PathBuf,
) -> Result<()> {
    let content = std::fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", input.display()))?;

    let metrics = ResultsParser::parse(&raw, strategy_id, backtest_id, name);
    let store = MetricsStore::new(results_dir);
    let path = store.save(&metrics)?;

    println!("Saved: {}", path.display());
    println!(
        "  {} | sharpe {:.2} | cagr {:.1}% | dd {:.1}% | trades {}",
        metrics.strategy_id,
        metrics.sharpe_ratio,
        metrics.cagr * 100.0,
        metrics.max_drawdown * 100.0,
        metrics.total_trades
    );
    Ok(())
}

fn run_rank(results_dir: PathBuf, config: Option<PathBuf>, csv: Option<PathBuf>) -> Result<()> {
    let scoring = match config {
        Some(path) => ScoringConfig::from_file(&path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ScoringConfig::default(),
    };

    let store = MetricsStore::new(&results_dir);
    let all = store.load_all()?;
    if all.is_empty() {
        println!(
            "No stored metrics under {} — run `stratlab parse` first.",
            results_dir.display()
        );
        return Ok(());
    }

    let inputs = all
        .into_iter()
        .map(|metrics| {
            let validation = store
                .load_validation(&metrics.strategy_id)
                .unwrap_or_default();
            (metrics, validation)
        })
        .collect();

    let ranker = StrategyRanker::new(scoring);
    let ranked = ranker.rank_strategies(inputs);
    print!("{}", generate_report(&ranked));

    if let Some(csv_path) = csv {
        let metrics: Vec<_> = ranked.iter().map(|e| e.metrics.clone()).collect();
        store.write_summary_csv(&metrics, &ranker.config().thresholds, &csv_path)?;
        println!("Summary CSV: {}", csv_path.display());
    }
    Ok(())
}

fn run_pnl(
    project: Option<String>,
    backtest: Option<String>,
    prefix: Option<String>,
    base_url: String,
    token: Option<String>,
) -> Result<()> {
    let live = project.is_some() || backtest.is_some();
    if live && prefix.is_some() {
        bail!("--project/--backtest and --prefix are mutually exclusive");
    }

    let orders: Vec<Order> = if live {
        let (Some(project), Some(backtest)) = (project, backtest) else {
            bail!("--project and --backtest must be given together");
        };
        let mut client = BacktestClient::new(base_url);
        if let Some(token) = token {
            client = client.with_token(token);
        }
        client.read_orders(&project, &backtest)
    } else if let Some(prefix) = prefix {
        load_cached_orders(&prefix)
    } else {
        bail!("one of --project/--backtest or --prefix is required");
    };

    if orders.is_empty() {
        println!("No orders found.");
        return Ok(());
    }

    let prices = end_prices(&orders);
    let book = reconstruct(&orders, &prices);
    print!("{}", render_report(&book, &prices));
    Ok(())
}
