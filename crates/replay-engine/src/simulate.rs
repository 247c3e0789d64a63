use portfolio_core::PortfolioError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use statrs::distribution::Normal;
use statrs::statistics::Statistics;

use crate::models::{DistributionStats, SimulationConfig, SimulationPath, SimulationSummary};
use crate::statistics::annualized_return_percent;

/// Monte Carlo projection: replay the accumulation recurrence over synthetic
/// price paths whose monthly growth factors are 1 + N(mean, std) draws.
/// Paths run in parallel; a fixed seed gives identical results regardless of
/// scheduling because every path derives its own generator from the seed and
/// its index.
pub fn simulate(config: &SimulationConfig) -> Result<SimulationSummary, PortfolioError> {
    let months = config.years as usize * 12;
    if months == 0 {
        return Err(PortfolioError::InsufficientData(format!(
            "{}: zero-length simulation horizon",
            config.symbol
        )));
    }
    if config.iterations == 0 {
        return Err(PortfolioError::InsufficientData(format!(
            "{}: simulation needs at least one iteration",
            config.symbol
        )));
    }

    // None means a degenerate zero-volatility distribution: every draw is
    // exactly the mean
    let normal = if config.volatility_monthly > 0.0 {
        Some(
            Normal::new(config.mean_return_monthly, config.volatility_monthly).map_err(|e| {
                PortfolioError::InsufficientData(format!(
                    "{}: invalid return distribution (mean {}, std {}): {e}",
                    config.symbol, config.mean_return_monthly, config.volatility_monthly
                ))
            })?,
        )
    } else if config.volatility_monthly == 0.0 && config.mean_return_monthly.is_finite() {
        None
    } else {
        return Err(PortfolioError::InsufficientData(format!(
            "{}: non-finite return statistics (mean {}, std {})",
            config.symbol, config.mean_return_monthly, config.volatility_monthly
        )));
    };

    // the contribution column is deterministic and shared by all paths, and
    // so is the money put in
    let contributions: Vec<f64> = (0..months).map(|t| config.schedule.contribution_at(t)).collect();
    let input_amount = config.initial_investment + contributions.iter().sum::<f64>();

    let base_seed = config.seed.unwrap_or_else(rand::random);
    let paths: Vec<SimulationPath> = (0..config.iterations)
        .into_par_iter()
        .map(|index| {
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(index as u64));
            run_path(config, &contributions, input_amount, normal, &mut rng)
        })
        .collect();

    Ok(SimulationSummary {
        symbol: config.symbol.clone(),
        iterations: config.iterations,
        input_amount: reduce(paths.iter().map(|p| p.input_amount).collect()),
        final_amount: reduce(paths.iter().map(|p| p.final_amount).collect()),
        total_yield_amount: reduce(paths.iter().map(|p| p.total_yield_amount).collect()),
        total_yield_percent: reduce(paths.iter().map(|p| p.total_yield_percent).collect()),
        total_dividends: reduce(paths.iter().map(|p| p.total_dividends).collect()),
        annual_return: reduce(paths.iter().map(|p| p.annual_return).collect()),
    })
}

/// One synthetic path: the historical recurrence with dividend yield 0.
/// Month 0 applies its draw to the initial lump sum.
fn run_path(
    config: &SimulationConfig,
    contributions: &[f64],
    input_amount: f64,
    normal: Option<Normal>,
    rng: &mut StdRng,
) -> SimulationPath {
    let mut returns = Vec::with_capacity(contributions.len().saturating_sub(1));
    let mut total = 0.0;
    for (t, &contribution) in contributions.iter().enumerate() {
        let change = match normal {
            Some(distribution) => 1.0 + rng.sample(distribution),
            None => 1.0 + config.mean_return_monthly,
        };
        if t == 0 {
            total = config.initial_investment * change;
        } else {
            let prior = total;
            total = prior * change + contribution;
            returns.push(total / (prior + contribution));
        }
    }

    let total_yield_amount = total - input_amount;
    SimulationPath {
        input_amount,
        final_amount: total,
        total_yield_amount,
        total_yield_percent: total_yield_amount / total * 100.0,
        total_dividends: 0.0,
        annual_return: annualized_return_percent(&returns),
    }
}

fn reduce(values: Vec<f64>) -> DistributionStats {
    let mut sorted = values;
    sorted.sort_by(|a, b| a.total_cmp(b));
    DistributionStats {
        mean: sorted.iter().mean(),
        std: sorted.iter().std_dev(),
        q25: percentile_sorted(&sorted, 25.0),
        median: percentile_sorted(&sorted, 50.0),
        q75: percentile_sorted(&sorted, 75.0),
        min: sorted.first().copied().unwrap_or(f64::NAN),
        max: sorted.last().copied().unwrap_or(f64::NAN),
    }
}

/// Percentile with linear interpolation between order statistics
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}
