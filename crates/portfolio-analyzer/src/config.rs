use std::path::{Path, PathBuf};

use portfolio_core::{PortfolioConfig, PortfolioError};

/// Location of a named portfolio definition under the data directory
pub fn portfolio_path(data_dir: &Path, name: &str) -> PathBuf {
    data_dir.join("portfolios").join(format!("{name}.json"))
}

/// Load and validate `<data-dir>/portfolios/<name>.json`
pub fn load_portfolio(data_dir: &Path, name: &str) -> Result<PortfolioConfig, PortfolioError> {
    let path = portfolio_path(data_dir, name);
    let raw = std::fs::read_to_string(&path).map_err(|e| PortfolioError::Config {
        field: "portfolio".into(),
        payload: format!("cannot read {}: {e}", path.display()),
    })?;
    let portfolio = PortfolioConfig::from_json(&raw)?;
    tracing::info!(
        "Loaded portfolio '{}' with {} entries",
        name,
        portfolio.portfolio.len()
    );
    Ok(portfolio)
}
