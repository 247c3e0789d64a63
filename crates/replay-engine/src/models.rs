use chrono::NaiveDate;
use portfolio_core::ContributionSchedule;
use serde::{Deserialize, Serialize};

/// One month of a replayed accumulation trajectory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub date: NaiveDate,
    pub monthly_money: f64,
    pub quarterly_money: f64,
    pub bi_annual_money: f64,
    pub annual_money: f64,
    /// Position value at the end of the month
    pub total: f64,
    /// Cumulative money put in, including the initial lump sum
    pub input: f64,
    /// Currency dividend received this month; None on month 0
    pub dividend_gain: Option<f64>,
    /// Growth factor against last month's total plus this month's
    /// contribution; None on month 0
    #[serde(rename = "return")]
    pub monthly_return: Option<f64>,
}

/// Full month-by-month replay for one symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccumulationTrajectory {
    pub symbol: String,
    pub points: Vec<TrajectoryPoint>,
}

impl AccumulationTrajectory {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Return and volatility statistics over a symbol's full available history.
/// All values are percentages except `existent_years`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeneralSummary {
    pub volatility_monthly: f64,
    pub volatility_annual: f64,
    pub mean_return_monthly: f64,
    pub annual_return: f64,
    pub mean_dividend_yield_annual: f64,
    pub existent_years: f64,
}

/// Scalar outcome of a replayed trajectory, rounded to cents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSummary {
    pub input_amount: f64,
    pub final_amount: f64,
    pub total_yield_amount: f64,
    pub total_yield_percent: f64,
    pub total_dividends: f64,
    pub annual_return: f64,
    /// Horizon in years; for a combined summary, the max across members
    pub investment_time: f64,
    pub general: Option<GeneralSummary>,
}

/// One month of the portfolio-level trajectory: per-symbol value columns
/// summed over the date union
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedPoint {
    pub date: NaiveDate,
    pub monthly_money: f64,
    pub quarterly_money: f64,
    pub bi_annual_money: f64,
    pub annual_money: f64,
    pub total: f64,
    pub input: f64,
    pub dividend_gain: f64,
    #[serde(rename = "return")]
    pub monthly_return: Option<f64>,
}

impl CombinedPoint {
    pub fn zero(date: NaiveDate) -> Self {
        Self {
            date,
            monthly_money: 0.0,
            quarterly_money: 0.0,
            bi_annual_money: 0.0,
            annual_money: 0.0,
            total: 0.0,
            input: 0.0,
            dividend_gain: 0.0,
            monthly_return: None,
        }
    }

    /// Sum of the four cadence columns for this month
    pub fn contribution(&self) -> f64 {
        self.monthly_money + self.quarterly_money + self.bi_annual_money + self.annual_money
    }
}

/// Date-aligned sum of member trajectories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedTrajectory {
    pub points: Vec<CombinedPoint>,
}

/// Inputs for a Monte Carlo projection of one symbol. Mean and volatility are
/// monthly fractions, not percentages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub symbol: String,
    pub years: u32,
    pub initial_investment: f64,
    pub schedule: ContributionSchedule,
    pub mean_return_monthly: f64,
    pub volatility_monthly: f64,
    pub iterations: usize,
    pub seed: Option<u64>,
}

/// Final metrics of one synthetic accumulation path
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulationPath {
    pub input_amount: f64,
    pub final_amount: f64,
    pub total_yield_amount: f64,
    pub total_yield_percent: f64,
    pub total_dividends: f64,
    pub annual_return: f64,
}

/// Distribution of one metric across simulation paths
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DistributionStats {
    pub mean: f64,
    pub std: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub min: f64,
    pub max: f64,
}

/// Distribution statistics over all simulated paths of one symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub symbol: String,
    pub iterations: usize,
    pub input_amount: DistributionStats,
    pub final_amount: DistributionStats,
    pub total_yield_amount: DistributionStats,
    pub total_yield_percent: DistributionStats,
    pub total_dividends: DistributionStats,
    pub annual_return: DistributionStats,
}
