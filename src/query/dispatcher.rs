//! Request orchestration: resolve a template, expand it, run it and reshape
//! the rows for the requested chart kind.

use crate::chart::{reshape, ChartKind, QueryOutcome, RowSet};
use crate::error::{Error, Result};
use crate::query::bucket::TimeRange;
use crate::query::template::{QueryTemplate, TemplateFlavor};
use crate::storage::{ComponentRegistry, RowExecutor};
use crate::utils::validate_query;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Identifier of a dashboard component in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(pub i64);

impl FromStr for ComponentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i64>()
            .map(ComponentId)
            .map_err(|_| Error::InvalidIdentifier(s.to_owned()))
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stateless per-request pipeline over an injected registry and executor.
#[derive(Clone)]
pub struct QueryDispatcher {
    registry: Arc<dyn ComponentRegistry>,
    executor: Arc<dyn RowExecutor>,
}

impl QueryDispatcher {
    pub fn new(registry: Arc<dyn ComponentRegistry>, executor: Arc<dyn RowExecutor>) -> Self {
        Self { registry, executor }
    }

    /// Chart data for a registered component.
    ///
    /// The chart template takes the time range directly (two placeholders or
    /// none); no bucket is inferred.
    #[instrument(skip(self, range), fields(component = %id))]
    pub async fn chart_data(&self, id: ComponentId, range: &TimeRange) -> Result<QueryOutcome> {
        let query = self
            .registry
            .chart_query(id.0)
            .await?
            .ok_or_else(|| Error::NotFound("No chart data available".to_owned()))?;

        // a bad stored kind is a registry fault, not a client error
        let kind: ChartKind = query.query_type.parse().map_err(|_| {
            Error::Execution(format!(
                "component {} has unsupported chart kind {:?}",
                id, query.query_type
            ))
        })?;
        let sql = QueryTemplate::parse(&query.query_chart)
            .bind(TemplateFlavor::Chart)?
            .render_range(None, range)?;

        self.run(kind, &sql).await
    }

    /// History data for a registered component, always shaped as `time`.
    #[instrument(skip(self, range), fields(component = %id))]
    pub async fn history_data(&self, id: ComponentId, range: &TimeRange) -> Result<QueryOutcome> {
        let template = self
            .registry
            .history_query(id.0)
            .await?
            .ok_or_else(|| Error::NotFound("No history data available".to_owned()))?;

        let bucket = range.bucket();
        debug!(%bucket, "selected time bucket");

        let sql = QueryTemplate::parse(&template)
            .bind(TemplateFlavor::History)?
            .render_range(Some(bucket), range)?;

        self.run(ChartKind::Time, &sql).await
    }

    /// Chart data for a caller-supplied kind and template.
    ///
    /// The template must pass the keyword denylist before it is executed.
    #[instrument(skip(self, template, range))]
    pub async fn adhoc_data(&self, kind: &str, template: &str, range: &TimeRange) -> Result<QueryOutcome> {
        if kind.is_empty() || template.is_empty() {
            return Err(Error::InvalidRequest(
                "queryType and queryString are required".to_owned(),
            ));
        }

        let kind: ChartKind = kind.parse()?;
        validate_query(template)?;

        let sql = QueryTemplate::parse(template)
            .bind(TemplateFlavor::Chart)?
            .render_range(None, range)?;

        self.run(kind, &sql).await
    }

    /// Tables the dashboard store exposes to templates.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.executor.list_tables().await?)
    }

    async fn run(&self, kind: ChartKind, sql: &str) -> Result<QueryOutcome> {
        let batches = self.executor.query_sql(sql).await?;
        let rows = RowSet::decode(kind, &batches)?;
        if rows.is_empty() {
            debug!(%kind, "query returned no rows");
        } else {
            debug!(%kind, rows = rows.len(), "reshaping rows");
        }
        Ok(reshape(rows))
    }
}
