use std::collections::BTreeMap;

use chrono::NaiveDate;
use portfolio_core::PortfolioError;

use crate::accumulate::build_summary;
use crate::models::{AccumulationTrajectory, CombinedPoint, CombinedTrajectory, StockSummary};

/// Outer-join member trajectories on the union of their dates and sum the
/// value columns. A member without a row on some date contributes zero to
/// every column that month.
pub fn combine(trajectories: &[AccumulationTrajectory]) -> Result<CombinedTrajectory, PortfolioError> {
    if trajectories.is_empty() {
        return Err(PortfolioError::InsufficientData(
            "no trajectories to combine".into(),
        ));
    }

    let mut by_date: BTreeMap<NaiveDate, CombinedPoint> = BTreeMap::new();
    for trajectory in trajectories {
        for point in &trajectory.points {
            let entry = by_date
                .entry(point.date)
                .or_insert_with(|| CombinedPoint::zero(point.date));
            entry.monthly_money += point.monthly_money;
            entry.quarterly_money += point.quarterly_money;
            entry.bi_annual_money += point.bi_annual_money;
            entry.annual_money += point.annual_money;
            entry.total += point.total;
            entry.input += point.input;
            entry.dividend_gain += point.dividend_gain.unwrap_or(0.0);
        }
    }

    let mut points: Vec<CombinedPoint> = by_date.into_values().collect();
    for t in 1..points.len() {
        let contribution = points[t].contribution();
        points[t].monthly_return = Some(points[t].total / (points[t - 1].total + contribution));
    }
    Ok(CombinedTrajectory { points })
}

/// Scalar outcome of the combined trajectory; `investment_time` is the
/// longest horizon among the members.
pub fn summarize_combined(
    combined: &CombinedTrajectory,
    investment_time: f64,
) -> Result<StockSummary, PortfolioError> {
    let last = combined.points.last().ok_or_else(|| {
        PortfolioError::InsufficientData("empty combined trajectory".into())
    })?;
    let total_dividends: f64 = combined.points.iter().map(|p| p.dividend_gain).sum();
    let returns: Vec<f64> = combined
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
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrajectoryPoint;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn point(day: &str, total: f64, input: f64) -> TrajectoryPoint {
        TrajectoryPoint {
            date: date(day),
            monthly_money: 0.0,
            quarterly_money: 0.0,
            bi_annual_money: 0.0,
            annual_money: 0.0,
            total,
            input,
            dividend_gain: None,
            monthly_return: None,
        }
    }

    fn trajectory(symbol: &str, points: Vec<TrajectoryPoint>) -> AccumulationTrajectory {
        AccumulationTrajectory {
            symbol: symbol.to_string(),
            points,
        }
    }

    #[test]
    fn sums_members_sharing_a_date() {
        let a = trajectory("A", vec![point("2024-01-31", 150.0, 100.0)]);
        let b = trajectory("B", vec![point("2024-01-31", 350.0, 300.0)]);
        let combined = combine(&[a, b]).unwrap();

        assert_eq!(combined.points.len(), 1);
        assert_eq!(combined.points[0].total, 500.0);
        assert_eq!(combined.points[0].input, 400.0);
    }

    #[test]
    fn disjoint_dates_fill_the_other_member_with_zeros() {
        let a = trajectory("A", vec![point("2024-01-31", 150.0, 100.0)]);
        let b = trajectory("B", vec![point("2024-02-29", 350.0, 300.0)]);
        let combined = combine(&[a, b]).unwrap();

        assert_eq!(combined.points.len(), 2);
        assert_eq!(combined.points[0].date, date("2024-01-31"));
        assert_eq!(combined.points[0].total, 150.0);
        assert_eq!(combined.points[1].total, 350.0);
        assert_eq!(combined.points[1].input, 300.0);
    }

    #[test]
    fn member_order_does_not_matter() {
        let a = trajectory(
            "A",
            vec![point("2024-01-31", 100.0, 100.0), point("2024-02-29", 110.0, 100.0)],
        );
        let b = trajectory("B", vec![point("2024-02-29", 350.0, 300.0)]);

        let forward = combine(&[a.clone(), b.clone()]).unwrap();
        let reverse = combine(&[b, a]).unwrap();
        for (x, y) in forward.points.iter().zip(reverse.points.iter()) {
            assert_eq!(x.date, y.date);
            assert_eq!(x.total, y.total);
            assert_eq!(x.input, y.input);
        }
    }

    #[test]
    fn combined_input_is_the_sum_of_member_inputs_per_date() {
        let a = trajectory(
            "A",
            vec![point("2024-01-31", 100.0, 100.0), point("2024-02-29", 120.0, 110.0)],
        );
        let b = trajectory(
            "B",
            vec![point("2024-01-31", 200.0, 200.0), point("2024-02-29", 210.0, 205.0)],
        );
        let combined = combine(&[a, b]).unwrap();
        assert_eq!(combined.points[0].input, 300.0);
        assert_eq!(combined.points[1].input, 315.0);
    }

    #[test]
    fn combined_return_uses_summed_columns() {
        let mut a1 = point("2024-02-29", 110.0, 110.0);
        a1.monthly_money = 10.0;
        let a = trajectory("A", vec![point("2024-01-31", 100.0, 100.0), a1]);
        let b = trajectory(
            "B",
            vec![point("2024-01-31", 200.0, 200.0), point("2024-02-29", 220.0, 200.0)],
        );
        let combined = combine(&[a, b]).unwrap();

        assert!(combined.points[0].monthly_return.is_none());
        // 330 / (300 + 10)
        let expected = 330.0 / 310.0;
        let got = combined.points[1].monthly_return.unwrap();
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn combined_summary_takes_the_longest_horizon() {
        let a = trajectory(
            "A",
            vec![point("2024-01-31", 100.0, 100.0), point("2024-02-29", 110.0, 100.0)],
        );
        let combined = combine(&[a]).unwrap();
        let summary = summarize_combined(&combined, 12.0).unwrap();

        assert_eq!(summary.investment_time, 12.0);
        assert_eq!(summary.input_amount, 100.0);
        assert_eq!(summary.final_amount, 110.0);
        assert!(summary.general.is_none());
    }

    #[test]
    fn combining_nothing_is_an_error() {
        assert!(combine(&[]).is_err());
    }
}
