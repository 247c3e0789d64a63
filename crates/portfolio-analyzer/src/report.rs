use std::fs;
use std::path::{Path, PathBuf};

use portfolio_core::PortfolioError;
use replay_engine::StockSummary;

use crate::pipeline::PortfolioOutcome;

const REPORT_WIDTH: usize = 40;
// label / value / unit column widths
const COL_LABEL: usize = 18;
const COL_VALUE: usize = 20;
const COL_UNIT: usize = 2;

fn rule(symbol: &str) -> String {
    symbol.repeat(REPORT_WIDTH / symbol.len())
}

fn centered(text: &str) -> String {
    let pad = (REPORT_WIDTH / 2).saturating_sub(text.len().div_ceil(2));
    format!("{}{}", " ".repeat(pad), text)
}

/// One table row: right-aligned value, unit glued to the right edge
fn table_row(label: &str, value: &str, unit: &str) -> String {
    let mut line = String::with_capacity(REPORT_WIDTH);
    line.push_str(label);
    line.push_str(&" ".repeat(
        (COL_LABEL + COL_VALUE).saturating_sub(label.len() + value.len()),
    ));
    line.push_str(value);
    line.push_str(&" ".repeat(COL_UNIT.saturating_sub(unit.len())));
    line.push_str(unit);
    line
}

/// Render a summary as the fixed-width text block written to the
/// `*_summary.txt` artifacts
pub fn render_summary(name: &str, summary: &StockSummary) -> String {
    let mut lines = vec![rule("="), centered(name), rule("=")];

    if let Some(general) = &summary.general {
        lines.extend([
            centered("General Info"),
            rule("-"),
            table_row("Annual Return", &format!("{:.2}", general.annual_return), "%"),
            rule("- "),
            table_row("Volatility", "", ""),
            table_row("   monthly", &format!("{:.2}", general.volatility_monthly), "%"),
            table_row("   annual", &format!("{:.2}", general.volatility_annual), "%"),
            table_row("Dividend Yield", "", ""),
            table_row(
                "   annual",
                &format!("{:.2}", general.mean_dividend_yield_annual),
                "%",
            ),
            rule("- "),
            table_row("Years assessed", &format!("{:.2}", general.existent_years), ""),
            rule("-"),
        ]);
    }

    lines.extend([
        centered("Outcome"),
        rule("-"),
        table_row("Input", &format!("{:.2}", summary.input_amount), "$"),
        table_row("Output", &format!("{:.2}", summary.final_amount), "$"),
        rule("- "),
        table_row("Yield", "", ""),
        table_row("   total", &format!("{:.2}", summary.total_yield_amount), "$"),
        table_row("   total", &format!("{:.2}", summary.total_yield_percent), "%"),
        table_row("   dividend", &format!("{:.2}", summary.total_dividends), "$"),
        rule("- "),
        table_row("Annual Return", &format!("{:.2}", summary.annual_return), "%"),
        rule("-"),
        table_row("Investment Years", &format!("{:.2}", summary.investment_time), ""),
        rule("-"),
    ]);

    lines.join("\n")
}

/// Directory where a named portfolio's artifacts land
pub fn result_dir(data_dir: &Path, portfolio_name: &str) -> PathBuf {
    data_dir.join("results").join(portfolio_name)
}

/// Write the per-symbol and combined text summaries plus the full outcome
/// JSON; returns the paths written
pub fn write_artifacts(
    data_dir: &Path,
    portfolio_name: &str,
    outcome: &PortfolioOutcome,
) -> Result<Vec<PathBuf>, PortfolioError> {
    let dir = result_dir(data_dir, portfolio_name);
    fs::create_dir_all(&dir)?;

    let mut written = Vec::new();
    for symbol in &outcome.symbols {
        let path = dir.join(format!("{}_summary.txt", symbol.config.symbol));
        fs::write(&path, render_summary(&symbol.config.symbol, &symbol.summary))?;
        written.push(path);
    }
    if let Some(combined) = &outcome.combined {
        let path = dir.join("combined_summary.txt");
        fs::write(&path, render_summary("combined", &combined.summary))?;
        written.push(path);
    }

    let path = dir.join("outcome.json");
    fs::write(&path, serde_json::to_string_pretty(outcome)?)?;
    written.push(path);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_engine::GeneralSummary;

    fn summary() -> StockSummary {
        StockSummary {
            input_amount: 13000.0,
            final_amount: 21345.67,
            total_yield_amount: 8345.67,
            total_yield_percent: 39.1,
            total_dividends: 412.34,
            annual_return: 8.76,
            investment_time: 10.0,
            general: Some(GeneralSummary {
                volatility_monthly: 4.21,
                volatility_annual: 14.58,
                mean_return_monthly: 0.73,
                annual_return: 9.12,
                mean_dividend_yield_annual: 1.85,
                existent_years: 22.5,
            }),
        }
    }

    #[test]
    fn rows_are_exactly_report_width() {
        assert_eq!(table_row("Annual Return", "6.78", "%").len(), REPORT_WIDTH);
        assert_eq!(table_row("Input", "13000.00", "$").len(), REPORT_WIDTH);
        assert_eq!(table_row("Volatility", "", "").len(), REPORT_WIDTH);
        assert_eq!(rule("=").len(), REPORT_WIDTH);
        assert_eq!(rule("- ").len(), REPORT_WIDTH);
    }

    #[test]
    fn header_is_centered() {
        let rendered = render_summary("VTI", &summary());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "=".repeat(40));
        assert_eq!(lines[1], format!("{}VTI", " ".repeat(18)));
        assert_eq!(lines[2], "=".repeat(40));
    }

    #[test]
    fn general_block_appears_only_when_present() {
        let with_general = render_summary("VTI", &summary());
        assert!(with_general.contains("General Info"));
        assert!(with_general.contains("Years assessed"));

        let mut combined = summary();
        combined.general = None;
        let without = render_summary("combined", &combined);
        assert!(!without.contains("General Info"));
        assert!(without.contains("Outcome"));
    }

    #[test]
    fn values_are_formatted_to_cents() {
        let rendered = render_summary("VTI", &summary());
        assert!(rendered.contains("21345.67 $"));
        assert!(rendered.contains("8.76 %"));
        assert!(rendered.contains("10.00"));
    }

    #[test]
    fn long_values_never_panic() {
        let mut huge = summary();
        huge.final_amount = 123456789012345.67;
        let rendered = render_summary("a-very-long-portfolio-entry-name", &huge);
        assert!(rendered.contains("Output"));
    }
}
