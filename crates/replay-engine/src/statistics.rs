use portfolio_core::MonthlyRecord;
use statrs::statistics::Statistics;

use crate::models::GeneralSummary;

/// Geometric annualization of a sequence of month-over-month growth factors,
/// as a percentage. NaN when the sequence is empty.
pub fn annualized_return_percent(growth_factors: &[f64]) -> f64 {
    if growth_factors.is_empty() {
        return f64::NAN;
    }
    let compound: f64 = growth_factors.iter().product();
    (compound.powf(12.0 / growth_factors.len() as f64) - 1.0) * 100.0
}

pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Return and volatility statistics over the full cleaned history. Degenerate
/// histories (fewer than two months) produce NaN fields rather than errors.
pub fn general_summary(records: &[MonthlyRecord]) -> GeneralSummary {
    let returns: Vec<f64> = records
        .windows(2)
        .map(|w| w[1].close / w[0].close - 1.0)
        .collect();
    let growth: Vec<f64> = returns.iter().map(|r| 1.0 + r).collect();

    let volatility_monthly = returns.as_slice().std_dev() * 100.0;
    let mean_return_monthly = returns.as_slice().mean() * 100.0;
    let mean_dividend = records.iter().map(|r| r.dividend).mean();

    GeneralSummary {
        volatility_monthly,
        volatility_annual: volatility_monthly * 12.0_f64.sqrt(),
        mean_return_monthly,
        annual_return: annualized_return_percent(&growth),
        mean_dividend_yield_annual: mean_dividend * 100.0 * 12.0,
        existent_years: round2(records.len() as f64 / 12.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(day: &str, close: f64, dividend: f64) -> MonthlyRecord {
        MonthlyRecord {
            date: day.parse::<NaiveDate>().unwrap(),
            open: close,
            close,
            dividend,
            change: None,
        }
    }

    #[test]
    fn statistics_match_hand_computation() {
        // closes 10 -> 11 -> 9.9: returns +10% and -10%
        let records = vec![
            record("2024-01-31", 10.0, 0.001),
            record("2024-02-29", 11.0, 0.002),
            record("2024-03-28", 9.9, 0.003),
        ];
        let summary = general_summary(&records);

        assert!((summary.mean_return_monthly - 0.0).abs() < 1e-9);
        // sample std of {0.1, -0.1} is 0.1414213562
        assert!((summary.volatility_monthly - 14.142_135_623_7).abs() < 1e-6);
        assert!((summary.volatility_annual - summary.volatility_monthly * 12.0_f64.sqrt()).abs() < 1e-9);
        // (1.1 * 0.9)^(12/2) - 1
        let expected_annual = (0.99_f64.powf(6.0) - 1.0) * 100.0;
        assert!((summary.annual_return - expected_annual).abs() < 1e-9);
        // mean dividend 0.002 -> 2.4% annualized
        assert!((summary.mean_dividend_yield_annual - 2.4).abs() < 1e-9);
        assert_eq!(summary.existent_years, 0.25);
    }

    #[test]
    fn single_month_history_yields_nan_not_panic() {
        let summary = general_summary(&[record("2024-01-31", 10.0, 0.0)]);
        assert!(summary.volatility_monthly.is_nan());
        assert!(summary.mean_return_monthly.is_nan());
        assert!(summary.annual_return.is_nan());
        assert_eq!(summary.existent_years, 0.08);
    }

    #[test]
    fn annualization_of_a_steady_ten_percent_month() {
        // a single 1.1 growth factor annualizes to (1.1^12 - 1) * 100
        let annual = annualized_return_percent(&[1.1]);
        assert!((annual - 213.842_837_672_1).abs() < 1e-6);
    }

    #[test]
    fn annualization_of_empty_sequence_is_nan() {
        assert!(annualized_return_percent(&[]).is_nan());
    }
}
