use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ContributionSchedule, PortfolioError};

/// A portfolio definition: one entry per symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioConfig {
    pub portfolio: Vec<StockConfig>,
}

/// Per-symbol analysis parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    pub symbol: String,
    /// Horizon in years; also the trailing history window for the replay
    pub investment_time: u32,
    pub initial_investment: f64,
    #[serde(default)]
    pub monthly_investment: f64,
    #[serde(default)]
    pub quarter_investment: f64,
    #[serde(default)]
    pub bi_annual_investment: f64,
    #[serde(default)]
    pub annual_investment: f64,
    #[serde(default = "default_reinvestment")]
    pub dividend_reinvestment: bool,
}

fn default_reinvestment() -> bool {
    true
}

impl PortfolioConfig {
    /// Parse and validate a portfolio document
    pub fn from_json(raw: &str) -> Result<Self, PortfolioError> {
        let doc: Value = serde_json::from_str(raw)?;
        let entries = doc
            .get("portfolio")
            .and_then(Value::as_array)
            .ok_or_else(|| PortfolioError::Config {
                field: "portfolio".into(),
                payload: doc.to_string(),
            })?;

        let mut portfolio = Vec::with_capacity(entries.len());
        for entry in entries {
            portfolio.push(StockConfig::from_entry(entry)?);
        }
        Ok(Self { portfolio })
    }
}

impl StockConfig {
    /// Validate a single portfolio entry. Errors name the offending field and
    /// carry the received payload.
    pub fn from_entry(entry: &Value) -> Result<Self, PortfolioError> {
        let symbol = entry
            .get("symbol")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| config_error("symbol", entry))?
            .to_string();

        let investment_time = entry
            .get("investment_time")
            .and_then(Value::as_u64)
            .and_then(|years| u32::try_from(years).ok())
            .filter(|&years| years >= 1)
            .ok_or_else(|| config_error("investment_time", entry))?;

        let initial_investment = amount(entry, "initial_investment")?
            .ok_or_else(|| config_error("initial_investment", entry))?;

        let dividend_reinvestment = match entry.get("dividend_reinvestment") {
            None | Some(Value::Null) => true,
            Some(v) => v
                .as_bool()
                .ok_or_else(|| config_error("dividend_reinvestment", entry))?,
        };

        Ok(Self {
            symbol,
            investment_time,
            initial_investment,
            monthly_investment: amount(entry, "monthly_investment")?.unwrap_or(0.0),
            quarter_investment: amount(entry, "quarter_investment")?.unwrap_or(0.0),
            bi_annual_investment: amount(entry, "bi_annual_investment")?.unwrap_or(0.0),
            annual_investment: amount(entry, "annual_investment")?.unwrap_or(0.0),
            dividend_reinvestment,
        })
    }

    pub fn schedule(&self) -> ContributionSchedule {
        ContributionSchedule {
            monthly: self.monthly_investment,
            quarterly: self.quarter_investment,
            bi_annual: self.bi_annual_investment,
            annual: self.annual_investment,
        }
    }
}

fn config_error(field: &str, entry: &Value) -> PortfolioError {
    PortfolioError::Config {
        field: field.into(),
        payload: entry.to_string(),
    }
}

/// A currency amount field: absent or null means unset, anything else must be
/// a non-negative number
fn amount(entry: &Value, field: &str) -> Result<Option<f64>, PortfolioError> {
    match entry.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .filter(|a| *a >= 0.0 && a.is_finite())
            .map(Some)
            .ok_or_else(|| config_error(field, entry)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_entry() {
        let entry = json!({
            "symbol": "VTI",
            "investment_time": 10,
            "initial_investment": 1000.0,
            "monthly_investment": 100.0,
            "quarter_investment": 50.0,
            "bi_annual_investment": 25.0,
            "annual_investment": 400.0,
            "dividend_reinvestment": false
        });
        let config = StockConfig::from_entry(&entry).unwrap();
        assert_eq!(config.symbol, "VTI");
        assert_eq!(config.investment_time, 10);
        assert!(!config.dividend_reinvestment);
        assert_eq!(config.schedule().quarterly, 50.0);
    }

    #[test]
    fn optional_amounts_default_to_zero_and_reinvestment_to_true() {
        let entry = json!({
            "symbol": "VTI",
            "investment_time": 5,
            "initial_investment": 500.0
        });
        let config = StockConfig::from_entry(&entry).unwrap();
        assert_eq!(config.monthly_investment, 0.0);
        assert_eq!(config.annual_investment, 0.0);
        assert!(config.dividend_reinvestment);
    }

    #[test]
    fn missing_required_field_names_the_field_and_payload() {
        let entry = json!({ "symbol": "VTI", "initial_investment": 500.0 });
        let err = StockConfig::from_entry(&entry).unwrap_err();
        match err {
            PortfolioError::Config { field, payload } => {
                assert_eq!(field, "investment_time");
                assert!(payload.contains("VTI"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn investment_time_beyond_u32_is_rejected() {
        // 2^32 would truncate to 0 under a plain cast
        let entry = json!({
            "symbol": "VTI",
            "investment_time": 4_294_967_296u64,
            "initial_investment": 500.0
        });
        let err = StockConfig::from_entry(&entry).unwrap_err();
        match err {
            PortfolioError::Config { field, .. } => assert_eq!(field, "investment_time"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_amount_is_rejected() {
        let entry = json!({
            "symbol": "VTI",
            "investment_time": 5,
            "initial_investment": 500.0,
            "monthly_investment": -10.0
        });
        let err = StockConfig::from_entry(&entry).unwrap_err();
        match err {
            PortfolioError::Config { field, .. } => assert_eq!(field, "monthly_investment"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn document_without_portfolio_array_is_rejected() {
        let err = PortfolioConfig::from_json(r#"{"stocks": []}"#).unwrap_err();
        match err {
            PortfolioError::Config { field, .. } => assert_eq!(field, "portfolio"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
