//! Component data endpoints

use crate::chart::QueryOutcome;
use crate::error::{Error, Result};
use crate::query::{ComponentId, TimeRange};
use crate::server::state::ServerState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

/// Create component data router
pub fn create_router() -> Router<ServerState> {
    Router::new()
        .route("/tables", get(list_tables))
        .route("/query", post(query_chart_data))
        .route("/:id/chart", get(component_chart))
        .route("/:id/history", get(component_history))
}

/// Optional time range carried in the query string
#[derive(Debug, Default, Deserialize)]
pub struct TimeParams {
    pub time_from: Option<String>,
    pub time_to: Option<String>,
}

impl TimeParams {
    /// Parse the range, falling back to the last `default_hours` when absent.
    fn or_last(&self, default_hours: u32) -> Result<TimeRange> {
        TimeRange::resolve(self.time_from.as_deref(), self.time_to.as_deref(), Some(default_hours))
    }

    fn required(&self) -> Result<TimeRange> {
        TimeRange::resolve(self.time_from.as_deref(), self.time_to.as_deref(), None)
    }
}

/// Ad-hoc query request
#[derive(Debug, Deserialize)]
pub struct QueryExperimentRequest {
    #[serde(rename = "queryType", default)]
    pub query_type: String,
    #[serde(rename = "queryString", default)]
    pub query_string: String,
}

/// GET /:id/chart
async fn component_chart(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(params): Query<TimeParams>,
) -> Result<Response> {
    let id: ComponentId = id.parse()?;
    let range = params.or_last(state.default_window_hours)?;
    let outcome = state.dispatcher.chart_data(id, &range).await?;
    success(outcome)
}

/// GET /:id/history
async fn component_history(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(params): Query<TimeParams>,
) -> Result<Response> {
    let id: ComponentId = id.parse()?;
    let range = params.required()?;
    let outcome = state.dispatcher.history_data(id, &range).await?;
    success(outcome)
}

/// POST /query
async fn query_chart_data(
    State(state): State<ServerState>,
    Query(params): Query<TimeParams>,
    request: std::result::Result<Json<QueryExperimentRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = request.map_err(|e| Error::InvalidRequest(e.body_text()))?;
    let range = params.or_last(state.default_window_hours)?;
    let outcome = state
        .dispatcher
        .adhoc_data(&request.query_type, &request.query_string, &range)
        .await?;
    success(outcome)
}

/// GET /tables
async fn list_tables(State(state): State<ServerState>) -> Result<Response> {
    let tables = state.dispatcher.list_tables().await?;
    Ok(Json(json!({ "status": "success", "tables": tables })).into_response())
}

fn success(outcome: QueryOutcome) -> Result<Response> {
    Ok(Json(outcome.envelope()?).into_response())
}
