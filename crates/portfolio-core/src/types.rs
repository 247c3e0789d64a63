use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One raw month as returned by the data provider, field names untouched
/// (including numeric prefixes like "1. open")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRow {
    pub date: NaiveDate,
    pub fields: HashMap<String, String>,
}

/// Raw monthly history for a symbol, in provider payload order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMonthlySeries {
    pub symbol: String,
    pub rows: Vec<RawRow>,
}

/// One cleaned month of price history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    /// Dividend paid that month as a fraction of the close price
    pub dividend: f64,
    /// close[t] / close[t-1]; None on the first month of the series
    pub change: Option<f64>,
}

/// Recurring contribution amounts by cadence
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributionSchedule {
    pub monthly: f64,
    pub quarterly: f64,
    pub bi_annual: f64,
    pub annual: f64,
}

impl ContributionSchedule {
    /// Cadence amounts landing in month `t` of a trajectory. Month 0 holds
    /// only the initial lump sum; a cadence of k months pays in month t >= 1
    /// when (t - 1) % k == 0.
    pub fn amounts_at(&self, t: usize) -> ContributionSchedule {
        if t == 0 {
            return ContributionSchedule::default();
        }
        let since_first = t - 1;
        ContributionSchedule {
            monthly: self.monthly,
            quarterly: if since_first % 3 == 0 { self.quarterly } else { 0.0 },
            bi_annual: if since_first % 6 == 0 { self.bi_annual } else { 0.0 },
            annual: if since_first % 12 == 0 { self.annual } else { 0.0 },
        }
    }

    /// Total scheduled contribution landing in month `t`
    pub fn contribution_at(&self, t: usize) -> f64 {
        self.amounts_at(t).total()
    }

    /// Sum of the four cadence amounts
    pub fn total(&self) -> f64 {
        self.monthly + self.quarterly + self.bi_annual + self.annual
    }
}
