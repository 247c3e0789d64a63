use async_trait::async_trait;

use crate::{PortfolioError, RawMonthlySeries};

/// Trait for monthly price history providers
#[async_trait]
pub trait PriceDataProvider: Send + Sync {
    /// Full monthly-adjusted history for a symbol. Row order is whatever the
    /// provider returns; sorting happens during series preparation.
    async fn monthly_adjusted(&self, symbol: &str) -> Result<RawMonthlySeries, PortfolioError>;
}
