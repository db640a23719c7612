mod common;

use async_trait::async_trait;
use common::*;
use dashquery_core::chart::{
    CategoricalSeries, ChartOutput, TimePoint, TimeSeries, TwoAxisRow, TwoAxisSeries,
};
use dashquery_core::storage::{ChartQuery, ComponentRegistry, RowExecutor};
use dashquery_core::{ComponentId, Error, QueryDispatcher, QueryOutcome, TimeBucket, TimeRange};
use duckdb::arrow::array::RecordBatch;
use std::sync::{Arc, Mutex};
use tonic::Status;

fn range(from: &str, to: &str) -> TimeRange {
    TimeRange::parse(from, to).unwrap()
}

#[tokio::test]
async fn test_two_d_chart_uses_time_range() {
    let dispatcher = create_dispatcher().await;
    let outcome = dispatcher
        .chart_data(ComponentId(TWO_D), &range(DAY_FROM, TWO_DAYS_TO))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        QueryOutcome::Data(ChartOutput::TwoD(vec![TwoAxisSeries {
            data: vec![
                TwoAxisRow { x: "bus".into(), y: 9.0 },
                TwoAxisRow { x: "car".into(), y: 5.0 },
            ],
        }]))
    );
}

#[tokio::test]
async fn test_three_d_chart_pivots_categories() {
    let dispatcher = create_dispatcher().await;
    let outcome = dispatcher
        .chart_data(ComponentId(THREE_D), &range(DAY_FROM, DAY_TO))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        QueryOutcome::Data(ChartOutput::Categorical {
            data: vec![
                CategoricalSeries {
                    name: "bus".into(),
                    icon: "bus.png".into(),
                    data: vec![5, 4, 0],
                },
                CategoricalSeries {
                    name: "car".into(),
                    icon: "car.png".into(),
                    data: vec![5, 0, 1],
                },
            ],
            categories: vec!["2024-01-01".into(), "2024-01-02".into(), "2024-02-01".into()],
        })
    );
}

#[tokio::test]
async fn test_history_buckets_by_hour_for_one_day() {
    let dispatcher = create_dispatcher().await;
    let day = range(DAY_FROM, DAY_TO);
    assert_eq!(day.bucket(), TimeBucket::Hour);

    let outcome = dispatcher.history_data(ComponentId(HISTORY), &day).await.unwrap();

    assert_eq!(
        outcome,
        QueryOutcome::Data(ChartOutput::Time(vec![
            TimeSeries {
                name: "bus".into(),
                data: vec![
                    TimePoint { x: "2024-01-01T08:00:00+08:00".into(), y: 3.0 },
                    TimePoint { x: "2024-01-01T09:00:00+08:00".into(), y: 2.0 },
                ],
            },
            TimeSeries {
                name: "car".into(),
                data: vec![TimePoint { x: "2024-01-01T09:00:00+08:00".into(), y: 5.0 }],
            },
        ]))
    );
}

#[tokio::test]
async fn test_history_buckets_by_day_for_two_days() {
    let dispatcher = create_dispatcher().await;
    let outcome = dispatcher
        .history_data(ComponentId(HISTORY), &range(DAY_FROM, TWO_DAYS_TO))
        .await
        .unwrap();

    let Some(ChartOutput::Time(series)) = outcome.into_output() else {
        panic!("expected time series");
    };
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].name, "bus");
    assert_eq!(
        series[0].data,
        vec![
            TimePoint { x: "2024-01-01T00:00:00+08:00".into(), y: 5.0 },
            TimePoint { x: "2024-01-02T00:00:00+08:00".into(), y: 4.0 },
        ]
    );
    assert_eq!(series[1].name, "car");
    assert_eq!(series[1].data.len(), 1);
}

#[tokio::test]
async fn test_map_legend_passes_rows_through() {
    let dispatcher = create_dispatcher().await;
    let outcome = dispatcher
        .chart_data(ComponentId(LEGEND), &range(DAY_FROM, DAY_TO))
        .await
        .unwrap();

    let Some(ChartOutput::MapLegend(rows)) = outcome.into_output() else {
        panic!("expected legend rows");
    };
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "depot");
    assert_eq!(rows[0].kind, "square");
    assert_eq!(rows[1].value, 12.0);
}

#[tokio::test]
async fn test_empty_result_is_no_data() {
    let dispatcher = create_dispatcher().await;
    let outcome = dispatcher
        .chart_data(
            ComponentId(TWO_D),
            &range("2023-01-01T00:00:00+08:00", "2023-01-02T00:00:00+08:00"),
        )
        .await
        .unwrap();
    assert!(outcome.is_no_data());
}

#[tokio::test]
async fn test_missing_component_is_not_found() {
    let dispatcher = create_dispatcher().await;
    let day = range(DAY_FROM, DAY_TO);

    let err = dispatcher.chart_data(ComponentId(99), &day).await.unwrap_err();
    assert!(matches!(&err, Error::NotFound(msg) if msg == "No chart data available"));

    // component exists but has no history template
    let err = dispatcher.history_data(ComponentId(TWO_D), &day).await.unwrap_err();
    assert!(matches!(&err, Error::NotFound(msg) if msg == "No history data available"));
}

#[tokio::test]
async fn test_malformed_history_template() {
    let dispatcher = create_dispatcher().await;
    let err = dispatcher
        .history_data(ComponentId(MALFORMED_HISTORY), &range(DAY_FROM, DAY_TO))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedTemplate { placeholders: 2, group: 3 }));
}

#[tokio::test]
async fn test_row_shape_mismatch_is_execution_error() {
    let dispatcher = create_dispatcher().await;
    let err = dispatcher
        .chart_data(ComponentId(WRONG_COLUMNS), &range(DAY_FROM, DAY_TO))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Execution(_)));
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn test_adhoc_query() {
    let dispatcher = create_dispatcher().await;
    let outcome = dispatcher
        .adhoc_data(
            "percent",
            "SELECT 'all' AS x_axis, vehicle AS y_axis, CAST(COUNT(*) AS BIGINT) AS data \
             FROM traffic GROUP BY vehicle ORDER BY vehicle",
            &range(DAY_FROM, DAY_TO),
        )
        .await
        .unwrap();

    let Some(ChartOutput::Categorical { data, categories }) = outcome.into_output() else {
        panic!("expected categorical output");
    };
    assert_eq!(categories, vec!["all"]);
    assert_eq!(data[0].data, vec![3]);
    assert_eq!(data[0].icon, "");
    assert_eq!(data[1].data, vec![2]);
}

#[tokio::test]
async fn test_adhoc_rejects_denied_keywords() {
    let dispatcher = create_dispatcher().await;
    let day = range(DAY_FROM, DAY_TO);

    let err = dispatcher
        .adhoc_data("two_d", "DROP TABLE traffic", &day)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "query contains invalid keyword: DROP");

    // substring match: a column name is enough to reject
    let err = dispatcher
        .adhoc_data("two_d", "SELECT updated_at AS x_axis, 1 AS data FROM t", &day)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsafeQuery { keyword: "UPDATE" }));

    // the table is still there
    assert!(dispatcher.list_tables().await.unwrap().contains(&"traffic".to_owned()));
}

#[tokio::test]
async fn test_adhoc_requires_kind_and_template() {
    let dispatcher = create_dispatcher().await;
    let day = range(DAY_FROM, DAY_TO);

    assert!(matches!(
        dispatcher.adhoc_data("", "SELECT 1", &day).await,
        Err(Error::InvalidRequest(_))
    ));
    assert!(matches!(
        dispatcher.adhoc_data("pie", "SELECT 1", &day).await,
        Err(Error::UnsupportedChartKind(_))
    ));
}

#[tokio::test]
async fn test_list_tables() {
    let dispatcher = create_dispatcher().await;
    assert_eq!(dispatcher.list_tables().await.unwrap(), vec!["legend", "traffic"]);
}

/// Registry serving a fixed chart query and recording nothing else.
struct StaticRegistry(Option<ChartQuery>);

#[async_trait]
impl ComponentRegistry for StaticRegistry {
    async fn chart_query(&self, _id: i64) -> Result<Option<ChartQuery>, Status> {
        Ok(self.0.clone())
    }

    async fn history_query(&self, _id: i64) -> Result<Option<String>, Status> {
        Err(Status::unavailable("registry offline"))
    }
}

/// Executor that records the final query strings and returns no rows.
#[derive(Default)]
struct RecordingExecutor {
    queries: Mutex<Vec<String>>,
}

#[async_trait]
impl RowExecutor for RecordingExecutor {
    async fn query_sql(&self, sql: &str) -> Result<Vec<RecordBatch>, Status> {
        self.queries.lock().unwrap().push(sql.to_owned());
        Ok(Vec::new())
    }

    async fn list_tables(&self) -> Result<Vec<String>, Status> {
        Err(Status::internal("connection lost"))
    }
}

#[tokio::test]
async fn test_chart_template_expansion_reaches_executor() {
    let executor = Arc::new(RecordingExecutor::default());
    let registry = StaticRegistry(Some(ChartQuery {
        query_type: "two_d".into(),
        query_chart: "SELECT * FROM t WHERE ts BETWEEN '%s' AND '%s'".into(),
    }));
    let dispatcher = QueryDispatcher::new(Arc::new(registry), executor.clone());

    let outcome = dispatcher
        .chart_data(ComponentId(1), &range(DAY_FROM, DAY_TO))
        .await
        .unwrap();
    assert!(outcome.is_no_data());
    assert_eq!(
        executor.queries.lock().unwrap().as_slice(),
        [format!("SELECT * FROM t WHERE ts BETWEEN '{DAY_FROM}' AND '{DAY_TO}'")]
    );
}

#[tokio::test]
async fn test_chart_template_with_three_placeholders_runs_verbatim() {
    let executor = Arc::new(RecordingExecutor::default());
    let template = "SELECT '%s', '%s', '%s'";
    let registry = StaticRegistry(Some(ChartQuery {
        query_type: "time".into(),
        query_chart: template.into(),
    }));
    let dispatcher = QueryDispatcher::new(Arc::new(registry), executor.clone());

    dispatcher
        .chart_data(ComponentId(1), &range(DAY_FROM, DAY_TO))
        .await
        .unwrap();
    assert_eq!(executor.queries.lock().unwrap().as_slice(), [template]);
}

#[tokio::test]
async fn test_unknown_registered_kind_is_server_error() {
    let executor = Arc::new(RecordingExecutor::default());
    let registry = StaticRegistry(Some(ChartQuery {
        query_type: "pie".into(),
        query_chart: "SELECT 1".into(),
    }));
    let dispatcher = QueryDispatcher::new(Arc::new(registry), executor.clone());

    let err = dispatcher
        .chart_data(ComponentId(4), &range(DAY_FROM, DAY_TO))
        .await
        .unwrap_err();
    assert!(matches!(&err, Error::Execution(msg) if msg.contains("pie")));
    assert_eq!(err.status_code(), 500);
    assert!(executor.queries.lock().unwrap().is_empty());

    // the same kind from a client stays a bad request
    let err = dispatcher
        .adhoc_data("pie", "SELECT 1", &range(DAY_FROM, DAY_TO))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_store_failures_are_execution_errors() {
    let dispatcher = QueryDispatcher::new(
        Arc::new(StaticRegistry(None)),
        Arc::new(RecordingExecutor::default()),
    );

    let err = dispatcher
        .history_data(ComponentId(1), &range(DAY_FROM, DAY_TO))
        .await
        .unwrap_err();
    assert!(matches!(&err, Error::Execution(msg) if msg == "registry offline"));

    let err = dispatcher.list_tables().await.unwrap_err();
    assert!(matches!(&err, Error::Execution(msg) if msg == "connection lost"));
}
