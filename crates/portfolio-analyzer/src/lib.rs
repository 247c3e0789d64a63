pub mod cache;
pub mod config;
pub mod pipeline;
pub mod report;

pub use cache::SimulationCache;
pub use config::{load_portfolio, portfolio_path};
pub use pipeline::{
    analyze_portfolio, analyze_symbol, AnalyzerOptions, CombinedOutcome, PortfolioOutcome, Stage,
    SymbolFailure, SymbolOutcome,
};
pub use report::{render_summary, result_dir, write_artifacts};
