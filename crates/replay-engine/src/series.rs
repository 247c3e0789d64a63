use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use portfolio_core::{MonthlyRecord, PortfolioError, RawMonthlySeries};

/// Strip the provider's numeric field prefixes ("1. open" -> "open")
fn normalize_field_name(name: &str) -> &str {
    match name.split_once(". ") {
        Some((prefix, rest)) if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) => {
            rest
        }
        _ => name,
    }
}

fn require_field(
    fields: &HashMap<&str, f64>,
    name: &str,
    symbol: &str,
    date: NaiveDate,
) -> Result<f64, PortfolioError> {
    fields
        .get(name)
        .copied()
        .ok_or_else(|| PortfolioError::Parse(format!("{symbol}: missing field `{name}` on {date}")))
}

/// Clean a raw provider series into chronological records: field names
/// normalized, values coerced to numbers, dividend expressed as a fraction of
/// the close price, rows sorted ascending by date, and the month-over-month
/// relative change filled in from the second row on.
pub fn clean_series(raw: &RawMonthlySeries) -> Result<Vec<MonthlyRecord>, PortfolioError> {
    let mut records = Vec::with_capacity(raw.rows.len());
    for row in &raw.rows {
        let mut fields: HashMap<&str, f64> = HashMap::with_capacity(row.fields.len());
        for (name, value) in &row.fields {
            let parsed = value.trim().parse::<f64>().map_err(|_| {
                PortfolioError::Parse(format!(
                    "{}: non-numeric value {:?} in field `{}` on {}",
                    raw.symbol, value, name, row.date
                ))
            })?;
            fields.insert(normalize_field_name(name), parsed);
        }
        let open = require_field(&fields, "open", &raw.symbol, row.date)?;
        let close = require_field(&fields, "close", &raw.symbol, row.date)?;
        let dividend_amount = require_field(&fields, "dividend amount", &raw.symbol, row.date)?;
        records.push(MonthlyRecord {
            date: row.date,
            open,
            close,
            dividend: dividend_amount / close,
            change: None,
        });
    }

    records.sort_by_key(|r| r.date);
    for t in 1..records.len() {
        records[t].change = Some(records[t].close / records[t - 1].close);
    }
    Ok(records)
}

/// Keep records strictly newer than `cutoff`. Records are assumed sorted, so
/// this keeps a contiguous suffix; each survivor retains the change computed
/// against its neighbor in the full series.
pub fn filter_after(records: &[MonthlyRecord], cutoff: NaiveDate) -> Vec<MonthlyRecord> {
    records.iter().filter(|r| r.date > cutoff).cloned().collect()
}

/// Keep the trailing `years` of records, counting 365 days per year back
/// from `now`. A window reaching past the calendar keeps the whole series.
pub fn filter_trailing_years(
    records: &[MonthlyRecord],
    years: u32,
    now: NaiveDate,
) -> Vec<MonthlyRecord> {
    let cutoff = Duration::try_days(365 * years as i64)
        .and_then(|window| now.checked_sub_signed(window));
    match cutoff {
        Some(cutoff) => filter_after(records, cutoff),
        None => records.to_vec(),
    }
}
