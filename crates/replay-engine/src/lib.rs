pub mod accumulate;
pub mod combine;
pub mod models;
pub mod series;
pub mod simulate;
pub mod statistics;

pub use accumulate::{replay, summarize};
pub use combine::{combine, summarize_combined};
pub use models::*;
pub use series::{clean_series, filter_after, filter_trailing_years};
pub use simulate::simulate;
pub use statistics::{annualized_return_percent, general_summary};
