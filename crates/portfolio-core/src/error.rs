use thiserror::Error;

/// Errors surfaced by the portfolio analysis pipeline
#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("Invalid portfolio entry, field `{field}`: {payload}")]
    Config { field: String, payload: String },

    #[error("Data fetch failed for {symbol}: {reason}")]
    Fetch { symbol: String, reason: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for PortfolioError {
    fn from(e: serde_json::Error) -> Self {
        PortfolioError::Serialization(e.to_string())
    }
}
