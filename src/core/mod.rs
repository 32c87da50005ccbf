pub mod histogram;
pub mod report;
pub mod sales_store;
pub mod stats;

pub use report::{analyze, AnalysisSettings, StoreReport};
pub use sales_store::SalesStore;
pub use stats::SummaryStats;
