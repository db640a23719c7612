//! dashquery: query templating and result reshaping for dashboard charts.
//!
//! Component definitions hold a chart kind and SQL templates with `%s`
//! placeholders. A request expands the template for a time range, runs it
//! against the dashboard store and reshapes the rows into the JSON structure
//! the chart kind expects.

pub mod chart;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod query;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use chart::{ChartKind, ChartOutput, QueryOutcome};
pub use error::{Error, Result};
pub use query::{ComponentId, QueryDispatcher, TimeBucket, TimeRange};
pub use storage::{ComponentRegistry, RowExecutor};
