#![allow(clippy::result_large_err)]

use crate::storage::{ChartQuery, ComponentDefinition, ComponentRegistry, RowExecutor};
use async_trait::async_trait;
use duckdb::arrow::array::RecordBatch;
use duckdb::{params, Config, Connection, OptionalExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tonic::Status;
use tracing::debug;

/// Option key selecting the schema listed by `list_tables`.
pub const TABLE_SCHEMA_OPTION: &str = "table_schema";

const DEFAULT_TABLE_SCHEMA: &str = "main";

/// DuckDB-based store, usable as the component registry, the dashboard
/// data store, or both.
///
/// Each call runs on its own clone of the root connection inside
/// `spawn_blocking`, so queries proceed in parallel and never block a
/// runtime worker.
#[derive(Clone)]
pub struct DuckDbBackend {
    conn: Arc<Mutex<Connection>>,
    table_schema: String,
}

impl DuckDbBackend {
    /// Open `connection_string` (a file path or `:memory:`).
    ///
    /// Every option except `table_schema` is passed to DuckDB as a setting.
    pub fn new(connection_string: String, options: HashMap<String, String>) -> Result<Self, Status> {
        let mut config = Config::default();
        for (key, value) in &options {
            if key == TABLE_SCHEMA_OPTION {
                continue;
            }
            config = config
                .with(key, value)
                .map_err(|e| Status::invalid_argument(format!("Invalid DuckDB option {key}: {e}")))?;
        }

        let conn = Connection::open_with_flags(&connection_string, config)
            .map_err(|e| Status::internal(format!("Failed to open {connection_string}: {e}")))?;

        let table_schema = options
            .get(TABLE_SCHEMA_OPTION)
            .cloned()
            .unwrap_or_else(|| DEFAULT_TABLE_SCHEMA.to_owned());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            table_schema,
        })
    }

    pub fn new_in_memory() -> Result<Self, Status> {
        Self::new(":memory:".to_owned(), HashMap::new())
    }

    pub fn new_with_options(connection_string: &str, options: &HashMap<String, String>) -> Result<Self, Status> {
        Self::new(connection_string.to_owned(), options.clone())
    }

    /// Run `task` on a fresh connection to the same database in a blocking task.
    async fn with_connection<T, F>(&self, task: F) -> Result<T, Status>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, Status> + Send + 'static,
    {
        let conn = self
            .conn
            .lock()
            .await
            .try_clone()
            .map_err(|e| Status::internal(format!("Failed to open connection: {e}")))?;

        tokio::task::spawn_blocking(move || task(&conn))
            .await
            .map_err(|e| Status::internal(format!("Query task failed: {e}")))?
    }

    /// Run one or more statements that produce no rows.
    pub async fn execute_batch(&self, sql: &str) -> Result<(), Status> {
        let sql = sql.to_owned();
        self.with_connection(move |conn| {
            conn.execute_batch(&sql)
                .map_err(|e| Status::internal(format!("Failed to execute statement: {e}")))
        })
        .await
    }

    /// Create the `components` table if it does not exist yet.
    pub async fn ensure_registry_schema(&self) -> Result<(), Status> {
        self.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS components (
                id BIGINT PRIMARY KEY,
                query_type VARCHAR,
                query_chart VARCHAR,
                query_history VARCHAR
            );
            "#,
        )
        .await
    }

    /// Insert or replace a component definition.
    pub async fn register_component(&self, component: &ComponentDefinition) -> Result<(), Status> {
        let component = component.clone();
        self.with_connection(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO components (id, query_type, query_chart, query_history) VALUES (?, ?, ?, ?)",
                params![
                    component.id,
                    component.query_type,
                    component.query_chart,
                    component.query_history
                ],
            )
            .map_err(|e| Status::internal(format!("Failed to register component {}: {e}", component.id)))?;
            Ok(())
        })
        .await
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[async_trait]
impl ComponentRegistry for DuckDbBackend {
    async fn chart_query(&self, id: i64) -> Result<Option<ChartQuery>, Status> {
        let row = self
            .with_connection(move |conn| {
                conn.query_row(
                    "SELECT query_type, query_chart FROM components WHERE id = ?",
                    params![id],
                    |row| Ok((row.get::<_, Option<String>>(0)?, row.get::<_, Option<String>>(1)?)),
                )
                .optional()
                .map_err(|e| Status::internal(format!("Failed to read component {id}: {e}")))
            })
            .await?;

        Ok(row.and_then(|(query_type, query_chart)| {
            Some(ChartQuery {
                query_type: non_empty(query_type)?,
                query_chart: non_empty(query_chart)?,
            })
        }))
    }

    async fn history_query(&self, id: i64) -> Result<Option<String>, Status> {
        let row = self
            .with_connection(move |conn| {
                conn.query_row(
                    "SELECT query_history FROM components WHERE id = ?",
                    params![id],
                    |row| row.get::<_, Option<String>>(0),
                )
                .optional()
                .map_err(|e| Status::internal(format!("Failed to read component {id}: {e}")))
            })
            .await?;

        Ok(row.and_then(non_empty))
    }
}

#[async_trait]
impl RowExecutor for DuckDbBackend {
    async fn query_sql(&self, sql: &str) -> Result<Vec<RecordBatch>, Status> {
        let sql = sql.to_owned();
        let batches = self
            .with_connection(move |conn| {
                let mut stmt = conn
                    .prepare(&sql)
                    .map_err(|e| Status::internal(e.to_string()))?;
                let batches: Vec<RecordBatch> = stmt
                    .query_arrow(params![])
                    .map_err(|e| Status::internal(e.to_string()))?
                    .collect();
                Ok(batches)
            })
            .await?;

        debug!(batches = batches.len(), "query executed");
        Ok(batches)
    }

    async fn list_tables(&self) -> Result<Vec<String>, Status> {
        let schema = self.table_schema.clone();
        self.with_connection(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT table_name FROM information_schema.tables WHERE table_schema = ? ORDER BY table_name",
                )
                .map_err(|e| Status::internal(format!("Failed to prepare statement: {e}")))?;

            let rows = stmt
                .query_map(params![schema], |row| row.get::<_, String>(0))
                .map_err(|e| Status::internal(format!("Failed to execute query: {e}")))?;

            let mut tables = Vec::new();
            for row in rows {
                tables.push(row.map_err(|e| Status::internal(format!("Failed to read row: {e}")))?);
            }

            Ok(tables)
        })
        .await
    }
}
