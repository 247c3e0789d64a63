use portfolio_core::{ContributionSchedule, MonthlyRecord, PortfolioError};

use crate::models::{AccumulationTrajectory, GeneralSummary, StockSummary, TrajectoryPoint};
use crate::statistics::{annualized_return_percent, round2};

/// Running state of the replay fold
#[derive(Debug, Clone, Copy)]
struct ReplayState {
    total: f64,
    input: f64,
}

/// Replay a contribution schedule over a prepared price series, month by
/// month. Month 0 buys in at the open and is marked to the close; every later
/// month applies the relative price change, adds the scheduled contributions
/// and collects dividends.
pub fn replay(
    symbol: &str,
    records: &[MonthlyRecord],
    initial_investment: f64,
    schedule: &ContributionSchedule,
    dividend_reinvestment: bool,
) -> Result<AccumulationTrajectory, PortfolioError> {
    let first = records.first().ok_or_else(|| {
        PortfolioError::InsufficientData(format!("{symbol}: no price history after filtering"))
    })?;

    let mut state = ReplayState {
        total: initial_investment * first.close / first.open,
        input: initial_investment,
    };
    let mut points = Vec::with_capacity(records.len());
    points.push(TrajectoryPoint {
        date: first.date,
        monthly_money: 0.0,
        quarterly_money: 0.0,
        bi_annual_money: 0.0,
        annual_money: 0.0,
        total: state.total,
        input: state.input,
        dividend_gain: None,
        monthly_return: None,
    });

    for (t, record) in records.iter().enumerate().skip(1) {
        let amounts = schedule.amounts_at(t);
        let contribution = amounts.total();
        // change is filled for every month past the first of the cleaned
        // series; a missing value poisons the month instead of panicking
        let change = record.change.unwrap_or(f64::NAN);

        let gross = state.total * change + contribution;
        let dividend_gain = gross * record.dividend;
        let total = if dividend_reinvestment {
            gross + dividend_gain
        } else {
            gross
        };
        let monthly_return = total / (state.total + contribution);

        state = ReplayState {
            total,
            input: state.input + contribution,
        };
        points.push(TrajectoryPoint {
            date: record.date,
            monthly_money: amounts.monthly,
            quarterly_money: amounts.quarterly,
            bi_annual_money: amounts.bi_annual,
            annual_money: amounts.annual,
            total,
            input: state.input,
            dividend_gain: Some(dividend_gain),
            monthly_return: Some(monthly_return),
        });
    }

    Ok(AccumulationTrajectory {
        symbol: symbol.to_string(),
        points,
    })
}

/// Scalar outcome of a replayed trajectory
pub fn summarize(
    trajectory: &AccumulationTrajectory,
    investment_time: f64,
    general: Option<GeneralSummary>,
) -> Result<StockSummary, PortfolioError> {
    let last = trajectory.points.last().ok_or_else(|| {
        PortfolioError::InsufficientData(format!("{}: empty trajectory", trajectory.symbol))
    })?;
    let total_dividends: f64 = trajectory.points.iter().filter_map(|p| p.dividend_gain).sum();
    let returns: Vec<f64> = trajectory
        .points
        .iter()
        .filter_map(|p| p.monthly_return)
        .collect();
    Ok(build_summary(
        last.input,
        last.total,
        total_dividends,
        &returns,
        investment_time,
        general,
    ))
}

/// Shared scalar reduction used by both the per-symbol and the combined
/// summaries
pub(crate) fn build_summary(
    input_amount: f64,
    final_amount: f64,
    total_dividends: f64,
    returns: &[f64],
    investment_time: f64,
    general: Option<GeneralSummary>,
) -> StockSummary {
    let total_yield_amount = final_amount - input_amount;
    StockSummary {
        input_amount: round2(input_amount),
        final_amount: round2(final_amount),
        total_yield_amount: round2(total_yield_amount),
        total_yield_percent: round2(total_yield_amount / final_amount * 100.0),
        total_dividends: round2(total_dividends),
        annual_return: round2(annualized_return_percent(returns)),
        investment_time,
        general,
    }
}
