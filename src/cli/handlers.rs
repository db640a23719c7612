use crate::{
    chart::ChartKind,
    config::Settings,
    query::{ComponentId, QueryDispatcher, TimeRange},
    server::{start_server, state::ServerState},
    storage::{duckdb::DuckDbBackend, ComponentDefinition},
};
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use super::commands::{
    ChartCommand, HistoryCommand, QueryCommand, RegisterCommand, ServerCommand, TimeArgs,
};

/// Open the component registry, creating its table if needed.
async fn open_manager(settings: &Settings) -> Result<DuckDbBackend> {
    let manager = DuckDbBackend::new_with_options(
        &settings.manager.connection,
        &settings.manager.options,
    )
    .context("Failed to open manager store")?;
    manager
        .ensure_registry_schema()
        .await
        .context("Failed to prepare component registry")?;
    Ok(manager)
}

/// Build a dispatcher over the configured manager and dashboard stores.
pub async fn build_dispatcher(settings: &Settings) -> Result<QueryDispatcher> {
    let manager = open_manager(settings).await?;
    let dashboard = DuckDbBackend::new_with_options(
        &settings.dashboard.connection,
        &settings.dashboard.backend_options(),
    )
    .context("Failed to open dashboard store")?;

    Ok(QueryDispatcher::new(Arc::new(manager), Arc::new(dashboard)))
}

pub async fn handle_server(cmd: ServerCommand, settings: Settings) -> Result<()> {
    let listen = cmd
        .listen
        .unwrap_or_else(|| format!("{}:{}", settings.server.host, settings.server.port));
    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", listen))?;

    let dispatcher = build_dispatcher(&settings).await?;
    let state = ServerState::new(dispatcher, settings.query.default_window_hours);

    start_server(addr, state, &settings.server).await
}

pub async fn handle_chart(cmd: ChartCommand, settings: Settings) -> Result<()> {
    let id: ComponentId = cmd.id.parse()?;
    let range = time_range(&cmd.time, Some(settings.query.default_window_hours))?;
    let outcome = build_dispatcher(&settings).await?.chart_data(id, &range).await?;
    print_json(&outcome.envelope()?)
}

pub async fn handle_history(cmd: HistoryCommand, settings: Settings) -> Result<()> {
    let id: ComponentId = cmd.id.parse()?;
    let range = time_range(&cmd.time, None)?;
    let outcome = build_dispatcher(&settings).await?.history_data(id, &range).await?;
    print_json(&outcome.envelope()?)
}

pub async fn handle_query(cmd: QueryCommand, settings: Settings) -> Result<()> {
    let range = time_range(&cmd.time, Some(settings.query.default_window_hours))?;
    let outcome = build_dispatcher(&settings)
        .await?
        .adhoc_data(&cmd.kind, &cmd.query, &range)
        .await?;
    print_json(&outcome.envelope()?)
}

pub async fn handle_tables(settings: Settings) -> Result<()> {
    let tables = build_dispatcher(&settings).await?.list_tables().await?;
    print_json(&json!({ "status": "success", "tables": tables }))
}

pub async fn handle_register(cmd: RegisterCommand, settings: Settings) -> Result<()> {
    // reject unknown kinds before they reach the registry
    cmd.kind.parse::<ChartKind>()?;

    let manager = open_manager(&settings).await?;
    let component = ComponentDefinition {
        id: cmd.id,
        query_type: cmd.kind,
        query_chart: cmd.chart,
        query_history: cmd.history,
    };
    manager
        .register_component(&component)
        .await
        .context("Failed to register component")?;

    info!(id = component.id, kind = %component.query_type, "component registered");
    Ok(())
}

fn time_range(args: &TimeArgs, fallback_hours: Option<u32>) -> Result<TimeRange> {
    Ok(TimeRange::resolve(
        args.time_from.as_deref(),
        args.time_to.as_deref(),
        fallback_hours,
    )?)
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
