use chrono::NaiveDate;
use portfolio_core::{PortfolioConfig, PortfolioError, PriceDataProvider, StockConfig};
use replay_engine::{
    clean_series, combine, filter_trailing_years, general_summary, replay, simulate, summarize,
    summarize_combined, AccumulationTrajectory, CombinedTrajectory, SimulationConfig,
    SimulationSummary, StockSummary,
};
use serde::{Deserialize, Serialize};

use crate::cache::SimulationCache;

/// Pipeline stage a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetch,
    Prepare,
    Accumulate,
    Combine,
    Simulate,
}

/// A computation the pipeline had to give up on. Failures are collected and
/// reported; they never abort the rest of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolFailure {
    pub symbol: String,
    pub stage: Stage,
    pub message: String,
}

/// Everything computed for one symbol, together with the inputs it came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolOutcome {
    pub config: StockConfig,
    pub trajectory: AccumulationTrajectory,
    pub summary: StockSummary,
}

/// The portfolio-level view over the members that survived
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedOutcome {
    pub trajectory: CombinedTrajectory,
    pub summary: StockSummary,
}

/// Result of a full portfolio run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioOutcome {
    pub symbols: Vec<SymbolOutcome>,
    pub combined: Option<CombinedOutcome>,
    pub simulations: Vec<SimulationSummary>,
    pub failures: Vec<SymbolFailure>,
}

/// Knobs for a portfolio run
#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    pub iterations: usize,
    pub seed: Option<u64>,
    pub skip_simulation: bool,
    pub cache: Option<SimulationCache>,
    /// Reference date for the trailing history window
    pub now: NaiveDate,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            iterations: 100,
            seed: None,
            skip_simulation: false,
            cache: None,
            now: chrono::Utc::now().date_naive(),
        }
    }
}

/// Fetch, prepare and replay a single symbol. General statistics come from
/// the full history; the replay runs on the trailing `investment_time` years.
pub async fn analyze_symbol(
    provider: &dyn PriceDataProvider,
    config: &StockConfig,
    now: NaiveDate,
) -> Result<SymbolOutcome, SymbolFailure> {
    let fail = |stage: Stage, error: PortfolioError| SymbolFailure {
        symbol: config.symbol.clone(),
        stage,
        message: error.to_string(),
    };

    let raw = provider
        .monthly_adjusted(&config.symbol)
        .await
        .map_err(|e| fail(Stage::Fetch, e))?;
    let records = clean_series(&raw).map_err(|e| fail(Stage::Prepare, e))?;
    let general = general_summary(&records);

    let window = filter_trailing_years(&records, config.investment_time, now);
    tracing::debug!(
        "{}: {} months of history, {} in the analysis window",
        config.symbol,
        records.len(),
        window.len()
    );

    let trajectory = replay(
        &config.symbol,
        &window,
        config.initial_investment,
        &config.schedule(),
        config.dividend_reinvestment,
    )
    .map_err(|e| fail(Stage::Accumulate, e))?;
    let summary = summarize(&trajectory, config.investment_time as f64, Some(general))
        .map_err(|e| fail(Stage::Accumulate, e))?;

    Ok(SymbolOutcome {
        config: config.clone(),
        trajectory,
        summary,
    })
}

/// Run the whole portfolio: replay every symbol, combine the survivors and
/// project each one forward.
pub async fn analyze_portfolio(
    provider: &dyn PriceDataProvider,
    portfolio: &PortfolioConfig,
    options: &AnalyzerOptions,
) -> PortfolioOutcome {
    let mut symbols = Vec::with_capacity(portfolio.portfolio.len());
    let mut failures = Vec::new();

    for config in &portfolio.portfolio {
        tracing::info!("Analyzing {}...", config.symbol);
        match analyze_symbol(provider, config, options.now).await {
            Ok(outcome) => symbols.push(outcome),
            Err(failure) => {
                tracing::warn!(
                    "{} failed at {:?}: {}",
                    failure.symbol,
                    failure.stage,
                    failure.message
                );
                failures.push(failure);
            }
        }
    }

    let combined = build_combined(&symbols, &mut failures);

    let mut simulations = Vec::new();
    if !options.skip_simulation {
        for outcome in &symbols {
            match run_simulation(outcome, options) {
                Ok(summary) => simulations.push(summary),
                Err(failure) => {
                    tracing::warn!("{} simulation failed: {}", failure.symbol, failure.message);
                    failures.push(failure);
                }
            }
        }
    }

    PortfolioOutcome {
        symbols,
        combined,
        simulations,
        failures,
    }
}

fn build_combined(
    symbols: &[SymbolOutcome],
    failures: &mut Vec<SymbolFailure>,
) -> Option<CombinedOutcome> {
    if symbols.is_empty() {
        return None;
    }

    let trajectories: Vec<AccumulationTrajectory> =
        symbols.iter().map(|s| s.trajectory.clone()).collect();
    let horizon = symbols
        .iter()
        .map(|s| s.summary.investment_time)
        .fold(0.0_f64, f64::max);

    let result = combine(&trajectories).and_then(|trajectory| {
        let summary = summarize_combined(&trajectory, horizon)?;
        Ok(CombinedOutcome {
            trajectory,
            summary,
        })
    });
    match result {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            tracing::warn!("Combined analysis failed: {e}");
            failures.push(SymbolFailure {
                symbol: "combined".to_string(),
                stage: Stage::Combine,
                message: e.to_string(),
            });
            None
        }
    }
}

/// Project one symbol forward, going through the cache when one is configured
fn run_simulation(
    outcome: &SymbolOutcome,
    options: &AnalyzerOptions,
) -> Result<SimulationSummary, SymbolFailure> {
    let fail = |error: PortfolioError| SymbolFailure {
        symbol: outcome.config.symbol.clone(),
        stage: Stage::Simulate,
        message: error.to_string(),
    };

    let general = outcome.summary.general.ok_or_else(|| {
        fail(PortfolioError::InsufficientData(
            "no return statistics for simulation".into(),
        ))
    })?;
    let config = SimulationConfig {
        symbol: outcome.config.symbol.clone(),
        years: outcome.config.investment_time,
        initial_investment: outcome.config.initial_investment,
        schedule: outcome.config.schedule(),
        mean_return_monthly: general.mean_return_monthly / 100.0,
        volatility_monthly: general.volatility_monthly / 100.0,
        iterations: options.iterations,
        seed: options.seed,
    };

    if let Some(cache) = &options.cache {
        if let Some(cached) = cache.load(&config) {
            tracing::info!("{}: reusing cached simulation result", config.symbol);
            return Ok(cached);
        }
    }

    tracing::info!(
        "{}: simulating {} paths over {} years",
        config.symbol,
        config.iterations,
        config.years
    );
    let summary = simulate(&config).map_err(fail)?;

    if let Some(cache) = &options.cache {
        if let Err(e) = cache.store(&config, &summary) {
            tracing::warn!("{}: could not store simulation result: {e}", config.symbol);
        }
    }
    Ok(summary)
}
