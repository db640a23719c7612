#![allow(dead_code)]

use dashquery_core::storage::duckdb::DuckDbBackend;
use dashquery_core::storage::ComponentDefinition;
use dashquery_core::QueryDispatcher;
use std::sync::Arc;

pub const DAY_FROM: &str = "2024-01-01T00:00:00+08:00";
pub const DAY_TO: &str = "2024-01-02T00:00:00+08:00";
pub const TWO_DAYS_TO: &str = "2024-01-03T00:00:00+08:00";

pub const TWO_D: i64 = 1;
pub const THREE_D: i64 = 2;
pub const HISTORY: i64 = 3;
pub const LEGEND: i64 = 4;
pub const MALFORMED_HISTORY: i64 = 5;
pub const WRONG_COLUMNS: i64 = 6;

const RANGE_FILTER: &str =
    "ts >= CAST(left('%s', 19) AS TIMESTAMP) AND ts < CAST(left('%s', 19) AS TIMESTAMP)";

/// Dashboard store with a small traffic table and a legend table.
pub async fn create_dashboard() -> DuckDbBackend {
    let dashboard = DuckDbBackend::new_in_memory().unwrap();
    dashboard
        .execute_batch(
            r#"
            CREATE TABLE traffic (ts TIMESTAMP, vehicle VARCHAR, icon VARCHAR, trips INTEGER);
            INSERT INTO traffic VALUES
                ('2024-01-01 08:00:00', 'bus', 'bus.png', 3),
                ('2024-01-01 09:30:00', 'bus', 'bus.png', 2),
                ('2024-01-01 09:45:00', 'car', 'car.png', 5),
                ('2024-01-02 10:00:00', 'bus', 'bus.png', 4),
                ('2024-02-01 10:00:00', 'car', 'car.png', 1);

            CREATE TABLE legend (name VARCHAR, "type" VARCHAR, icon VARCHAR, value DOUBLE);
            INSERT INTO legend VALUES
                ('depot', 'square', 'depot.png', 2.5),
                ('stop', 'circle', 'stop.png', 12);
            "#,
        )
        .await
        .unwrap();
    dashboard
}

/// Registry holding one component per chart shape under test.
pub async fn create_registry() -> DuckDbBackend {
    let registry = DuckDbBackend::new_in_memory().unwrap();
    registry.ensure_registry_schema().await.unwrap();

    let components = [
        ComponentDefinition {
            id: TWO_D,
            query_type: "two_d".into(),
            query_chart: format!(
                "SELECT vehicle AS x_axis, CAST(SUM(trips) AS BIGINT) AS data FROM traffic \
                 WHERE {RANGE_FILTER} GROUP BY vehicle ORDER BY vehicle"
            ),
            query_history: String::new(),
        },
        ComponentDefinition {
            id: THREE_D,
            query_type: "three_d".into(),
            query_chart: "SELECT strftime(ts, '%Y-%m-%d') AS x_axis, vehicle AS y_axis, icon, \
                          CAST(SUM(trips) AS BIGINT) AS data FROM traffic \
                          GROUP BY 1, 2, 3 ORDER BY 2, 1"
                .into(),
            query_history: String::new(),
        },
        ComponentDefinition {
            id: HISTORY,
            query_type: "two_d".into(),
            query_chart: "SELECT 'total' AS x_axis, CAST(SUM(trips) AS BIGINT) AS data FROM traffic".into(),
            query_history: format!(
                "SELECT date_trunc('%s', ts) AS x_axis, vehicle AS y_axis, \
                 CAST(SUM(trips) AS BIGINT) AS data FROM traffic \
                 WHERE {RANGE_FILTER} GROUP BY 1, 2 ORDER BY 1, 2"
            ),
        },
        ComponentDefinition {
            id: LEGEND,
            query_type: "map_legend".into(),
            query_chart: r#"SELECT name, "type", icon, value FROM legend ORDER BY name"#.into(),
            query_history: String::new(),
        },
        ComponentDefinition {
            id: MALFORMED_HISTORY,
            query_type: "time".into(),
            query_chart: "SELECT 1".into(),
            query_history: "SELECT '%s', '%s'".into(),
        },
        ComponentDefinition {
            id: WRONG_COLUMNS,
            query_type: "two_d".into(),
            query_chart: "SELECT 1 AS foo".into(),
            query_history: String::new(),
        },
    ];
    for component in &components {
        registry.register_component(component).await.unwrap();
    }
    registry
}

pub async fn create_dispatcher() -> QueryDispatcher {
    QueryDispatcher::new(
        Arc::new(create_registry().await),
        Arc::new(create_dashboard().await),
    )
}
