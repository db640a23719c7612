//! Store seams used by the query dispatcher.
//!
//! Two stores are involved:
//! - the manager store, holding component definitions (`ComponentRegistry`)
//! - the dashboard store, holding the data the templates query (`RowExecutor`)
//!
//! Both are passed to the dispatcher as trait objects. `duckdb` provides an
//! embedded implementation of each.

pub mod duckdb;

use ::duckdb::arrow::array::RecordBatch;
use async_trait::async_trait;
use tonic::Status;

/// Chart kind and direct chart template registered for a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartQuery {
    pub query_type: String,
    pub query_chart: String,
}

/// A full component definition as stored in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDefinition {
    pub id: i64,
    pub query_type: String,
    pub query_chart: String,
    pub query_history: String,
}

/// Lookup of stored query templates by component id.
#[async_trait]
pub trait ComponentRegistry: Send + Sync + 'static {
    /// Chart kind and chart template; `None` when the component has neither.
    async fn chart_query(&self, id: i64) -> Result<Option<ChartQuery>, Status>;

    /// History template; `None` when the component has none.
    async fn history_query(&self, id: i64) -> Result<Option<String>, Status>;
}

/// Execution of final query strings against the dashboard store.
#[async_trait]
pub trait RowExecutor: Send + Sync + 'static {
    /// Run `sql` and return every result batch in order.
    async fn query_sql(&self, sql: &str) -> Result<Vec<RecordBatch>, Status>;

    /// Names of the tables available to templates.
    async fn list_tables(&self) -> Result<Vec<String>, Status>;
}
