//! portfolio-analyzer: replay a portfolio's history and project it forward.
//!
//! Reads `<data-dir>/portfolios/<NAME>.json`, fetches each symbol's monthly
//! history from Alpha Vantage, replays the contribution schedule over it,
//! combines the members into a portfolio view and runs Monte Carlo
//! projections, then writes text and JSON artifacts to
//! `<data-dir>/results/<NAME>/`.
//!
//! Usage:
//!   cargo run -p portfolio-analyzer -- --portfolio retirement
//!   cargo run -p portfolio-analyzer -- --portfolio retirement --seed 42
//!   cargo run -p portfolio-analyzer -- --portfolio retirement --iterations 1000 --no-cache

use std::path::PathBuf;

use alphavantage_client::AlphaVantageClient;
use portfolio_analyzer::{
    analyze_portfolio, load_portfolio, render_summary, result_dir, write_artifacts,
    AnalyzerOptions, SimulationCache,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_analyzer=info,alphavantage_client=warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let Some(portfolio_name) = args
        .iter()
        .position(|a| a == "--portfolio")
        .and_then(|i| args.get(i + 1))
        .cloned()
    else {
        eprintln!("Usage:");
        eprintln!("  portfolio-analyzer --portfolio NAME    Analyze data/portfolios/NAME.json");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --data-dir PATH    Data directory (default: data)");
        eprintln!("  --iterations N     Monte Carlo paths per symbol (default: 100)");
        eprintln!("  --seed N           Fix the simulation seed for reproducible runs");
        eprintln!("  --skip-simulation  Historical replay only");
        eprintln!("  --no-cache         Ignore and do not write cached simulation results");
        std::process::exit(1);
    };

    let data_dir: PathBuf = args
        .iter()
        .position(|a| a == "--data-dir")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));

    let iterations: usize = args
        .iter()
        .position(|a| a == "--iterations")
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
        .unwrap_or(100);

    let seed: Option<u64> = args
        .iter()
        .position(|a| a == "--seed")
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok());

    let skip_simulation = args.iter().any(|a| a == "--skip-simulation");
    let no_cache = args.iter().any(|a| a == "--no-cache");

    let api_key = std::env::var("ALPHAVANTAGE_API_KEY").expect("ALPHAVANTAGE_API_KEY must be set");
    let provider = AlphaVantageClient::new(api_key);

    let portfolio = load_portfolio(&data_dir, &portfolio_name)?;
    tracing::info!(
        "portfolio-analyzer: '{}' with {} entries, iterations={}, data_dir={}",
        portfolio_name,
        portfolio.portfolio.len(),
        iterations,
        data_dir.display()
    );

    let cache =
        (!no_cache).then(|| SimulationCache::new(result_dir(&data_dir, &portfolio_name)));
    let options = AnalyzerOptions {
        iterations,
        seed,
        skip_simulation,
        cache,
        now: chrono::Utc::now().date_naive(),
    };

    let outcome = analyze_portfolio(&provider, &portfolio, &options).await;

    for symbol in &outcome.symbols {
        println!("{}", render_summary(&symbol.config.symbol, &symbol.summary));
        println!();
    }
    if let Some(combined) = &outcome.combined {
        println!("{}", render_summary("combined", &combined.summary));
        println!();
    }

    let written = write_artifacts(&data_dir, &portfolio_name, &outcome)?;
    tracing::info!(
        "Wrote {} artifacts to {}",
        written.len(),
        result_dir(&data_dir, &portfolio_name).display()
    );

    tracing::info!(
        "Done: {} analyzed, {} failed",
        outcome.symbols.len(),
        outcome.failures.len()
    );
    for failure in &outcome.failures {
        tracing::warn!(
            "  {} ({:?}): {}",
            failure.symbol,
            failure.stage,
            failure.message
        );
    }

    if outcome.symbols.is_empty() {
        anyhow::bail!("no symbol could be analyzed");
    }
    Ok(())
}
