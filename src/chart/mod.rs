//! Chart kinds, row shapes and the JSON structures served to the dashboard.
//!
//! - `rows`: typed rows decoded from the store's Arrow batches
//! - `reshape`: the four row-to-chart transforms

pub mod reshape;
pub mod rows;

pub use reshape::{categorical, grouped_time_series, legend, reshape, two_axis};
pub use rows::{CategoricalRow, LegendRow, RowSet, TimeSeriesRow, TwoAxisRow};

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selects the reshaping algorithm and output shape for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    TwoD,
    ThreeD,
    Percent,
    Time,
    MapLegend,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::TwoD => "two_d",
            ChartKind::ThreeD => "three_d",
            ChartKind::Percent => "percent",
            ChartKind::Time => "time",
            ChartKind::MapLegend => "map_legend",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "two_d" => Ok(ChartKind::TwoD),
            "three_d" => Ok(ChartKind::ThreeD),
            "percent" => Ok(ChartKind::Percent),
            "time" => Ok(ChartKind::Time),
            "map_legend" => Ok(ChartKind::MapLegend),
            other => Err(Error::UnsupportedChartKind(other.to_owned())),
        }
    }
}

/// Single series of `{x, y}` points for a `two_d` chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoAxisSeries {
    pub data: Vec<TwoAxisRow>,
}

/// One series of a `three_d` / `percent` chart, aligned to the shared categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalSeries {
    pub name: String,
    pub icon: String,
    pub data: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub x: String,
    pub y: f64,
}

/// One named series of a `time` chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub name: String,
    pub data: Vec<TimePoint>,
}

/// Reshaped data for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutput {
    TwoD(Vec<TwoAxisSeries>),
    Categorical {
        data: Vec<CategoricalSeries>,
        categories: Vec<String>,
    },
    Time(Vec<TimeSeries>),
    MapLegend(Vec<LegendRow>),
}

impl ChartOutput {
    /// The `data` member of the response envelope.
    pub fn data_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            ChartOutput::TwoD(series) => serde_json::to_value(series),
            ChartOutput::Categorical { data, .. } => serde_json::to_value(data),
            ChartOutput::Time(series) => serde_json::to_value(series),
            ChartOutput::MapLegend(rows) => serde_json::to_value(rows),
        }
    }

    /// Sorted category labels, only present for categorical charts.
    pub fn categories(&self) -> Option<&[String]> {
        match self {
            ChartOutput::Categorical { categories, .. } => Some(categories),
            _ => None,
        }
    }
}

/// Result of a successful query: reshaped rows, or an empty result set.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Data(ChartOutput),
    NoData,
}

impl QueryOutcome {
    pub fn is_no_data(&self) -> bool {
        matches!(self, QueryOutcome::NoData)
    }

    pub fn into_output(self) -> Option<ChartOutput> {
        match self {
            QueryOutcome::Data(output) => Some(output),
            QueryOutcome::NoData => None,
        }
    }

    /// Success envelope: `data` is null when the query returned no rows.
    pub fn envelope(&self) -> serde_json::Result<serde_json::Value> {
        let mut body = serde_json::json!({ "status": "success", "data": null });
        if let QueryOutcome::Data(output) = self {
            body["data"] = output.data_json()?;
            if let Some(categories) = output.categories() {
                body["categories"] = serde_json::json!(categories);
            }
        }
        Ok(body)
    }
}
