//! Typed rows decoded from the Arrow batches a store returns.
//!
//! Columns are looked up by name (case-insensitively) and checked against the
//! fixed contract of each chart kind. A missing column, an incompatible type
//! or a NULL in a required column is an execution error; nothing is filled
//! with a zero value.

use crate::chart::ChartKind;
use crate::constants::time::TIMESTAMP_LAYOUT;
use crate::error::{Error, Result};
use crate::query::bucket::dashboard_offset;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use duckdb::arrow::array::{Array, ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray, TimestampMicrosecondArray};
use duckdb::arrow::compute::cast;
use duckdb::arrow::datatypes::{DataType, TimeUnit};
use serde::{Deserialize, Serialize};

/// `two_d` row: columns `x_axis`, `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoAxisRow {
    pub x: String,
    pub y: f64,
}

/// `three_d` / `percent` row: columns `x_axis`, `icon` (optional), `y_axis`, `data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalRow {
    pub category: String,
    pub icon: String,
    pub series: String,
    pub value: i64,
}

/// `time` row: columns `x_axis` (timestamp), `y_axis`, `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesRow {
    pub timestamp: DateTime<FixedOffset>,
    pub series: String,
    pub value: f64,
}

/// `map_legend` row: columns `name`, `type`, `icon`, `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendRow {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub icon: String,
    pub value: f64,
}

/// Rows of a single chart kind; shapes are never mixed.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSet {
    TwoAxis(Vec<TwoAxisRow>),
    Categorical(Vec<CategoricalRow>),
    TimeSeries(Vec<TimeSeriesRow>),
    Legend(Vec<LegendRow>),
}

impl RowSet {
    /// Decode `batches` using the column contract of `kind`.
    pub fn decode(kind: ChartKind, batches: &[RecordBatch]) -> Result<Self> {
        Ok(match kind {
            ChartKind::TwoD => RowSet::TwoAxis(decode_two_axis(batches)?),
            ChartKind::ThreeD | ChartKind::Percent => RowSet::Categorical(decode_categorical(batches)?),
            ChartKind::Time => RowSet::TimeSeries(decode_time_series(batches)?),
            ChartKind::MapLegend => RowSet::Legend(decode_legend(batches)?),
        })
    }

    pub fn len(&self) -> usize {
        match self {
            RowSet::TwoAxis(rows) => rows.len(),
            RowSet::Categorical(rows) => rows.len(),
            RowSet::TimeSeries(rows) => rows.len(),
            RowSet::Legend(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn decode_two_axis(batches: &[RecordBatch]) -> Result<Vec<TwoAxisRow>> {
    let mut rows = Vec::new();
    for batch in batches {
        let x = texts(&required(batch, "x_axis")?, "x_axis")?;
        let y = floats(&required(batch, "data")?, "data")?;
        for (i, (x, y)) in x.iter().zip(y.iter()).enumerate() {
            rows.push(TwoAxisRow {
                x: present(x, "x_axis", i)?.to_owned(),
                y: present(y, "data", i)?,
            });
        }
    }
    Ok(rows)
}

pub fn decode_categorical(batches: &[RecordBatch]) -> Result<Vec<CategoricalRow>> {
    let mut rows = Vec::new();
    for batch in batches {
        let category = texts(&required(batch, "x_axis")?, "x_axis")?;
        let series = texts(&required(batch, "y_axis")?, "y_axis")?;
        let value = integers(&required(batch, "data")?, "data")?;
        let icon = match column(batch, "icon") {
            Some(array) => Some(texts(&array, "icon")?),
            None => None,
        };

        for i in 0..batch.num_rows() {
            let icon = icon
                .as_ref()
                .and_then(|icons| icons.is_valid(i).then(|| icons.value(i).to_owned()))
                .unwrap_or_default();
            rows.push(CategoricalRow {
                category: present(category.is_valid(i).then(|| category.value(i)), "x_axis", i)?.to_owned(),
                icon,
                series: present(series.is_valid(i).then(|| series.value(i)), "y_axis", i)?.to_owned(),
                value: present(value[i], "data", i)?,
            });
        }
    }
    Ok(rows)
}

pub fn decode_time_series(batches: &[RecordBatch]) -> Result<Vec<TimeSeriesRow>> {
    let mut rows = Vec::new();
    for batch in batches {
        let timestamp = timestamps(&required(batch, "x_axis")?, "x_axis")?;
        let series = texts(&required(batch, "y_axis")?, "y_axis")?;
        let value = floats(&required(batch, "data")?, "data")?;

        for (i, ts) in timestamp.into_iter().enumerate() {
            rows.push(TimeSeriesRow {
                timestamp: present(ts, "x_axis", i)?,
                series: present(series.is_valid(i).then(|| series.value(i)), "y_axis", i)?.to_owned(),
                value: present(value.is_valid(i).then(|| value.value(i)), "data", i)?,
            });
        }
    }
    Ok(rows)
}

pub fn decode_legend(batches: &[RecordBatch]) -> Result<Vec<LegendRow>> {
    let mut rows = Vec::new();
    for batch in batches {
        let name = texts(&required(batch, "name")?, "name")?;
        let kind = texts(&required(batch, "type")?, "type")?;
        let icon = texts(&required(batch, "icon")?, "icon")?;
        let value = floats(&required(batch, "value")?, "value")?;

        for i in 0..batch.num_rows() {
            rows.push(LegendRow {
                name: present(name.is_valid(i).then(|| name.value(i)), "name", i)?.to_owned(),
                kind: present(kind.is_valid(i).then(|| kind.value(i)), "type", i)?.to_owned(),
                icon: present(icon.is_valid(i).then(|| icon.value(i)), "icon", i)?.to_owned(),
                value: present(value.is_valid(i).then(|| value.value(i)), "value", i)?,
            });
        }
    }
    Ok(rows)
}

fn column(batch: &RecordBatch, name: &str) -> Option<ArrayRef> {
    batch
        .schema()
        .fields()
        .iter()
        .position(|field| field.name().eq_ignore_ascii_case(name))
        .map(|idx| batch.column(idx).clone())
}

fn required(batch: &RecordBatch, name: &str) -> Result<ArrayRef> {
    column(batch, name).ok_or_else(|| Error::Execution(format!("result set is missing column {name}")))
}

fn present<T>(value: Option<T>, name: &str, row: usize) -> Result<T> {
    value.ok_or_else(|| Error::Execution(format!("column {name} is NULL at row {row}")))
}

fn mismatch(name: &str, expected: &str, actual: &DataType) -> Error {
    Error::Execution(format!("column {name} has type {actual}, expected {expected}"))
}

fn cast_to(array: &ArrayRef, target: &DataType, name: &str) -> Result<ArrayRef> {
    cast(array, target).map_err(|e| Error::Execution(format!("failed to convert column {name}: {e}")))
}

fn texts(array: &ArrayRef, name: &str) -> Result<StringArray> {
    match array.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View | DataType::Dictionary(_, _) => {}
        other => return Err(mismatch(name, "text", other)),
    }
    let converted = cast_to(array, &DataType::Utf8, name)?;
    converted
        .as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| mismatch(name, "text", array.data_type()))
}

fn floats(array: &ArrayRef, name: &str) -> Result<Float64Array> {
    if !array.data_type().is_numeric() {
        return Err(mismatch(name, "number", array.data_type()));
    }
    let converted = cast_to(array, &DataType::Float64, name)?;
    converted
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| mismatch(name, "number", array.data_type()))
}

/// Integer column; floating and decimal values are accepted when integral.
fn integers(array: &ArrayRef, name: &str) -> Result<Vec<Option<i64>>> {
    let data_type = array.data_type();
    if data_type.is_integer() {
        let converted = cast_to(array, &DataType::Int64, name)?;
        let ints = converted
            .as_any()
            .downcast_ref::<Int64Array>()
            .ok_or_else(|| mismatch(name, "integer", data_type))?;
        return Ok(ints.iter().collect());
    }

    let values = floats(array, name)?;
    values
        .iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(Some(v as i64)),
            Some(v) => Err(Error::Execution(format!(
                "column {name} holds non-integer value {v} at row {row}"
            ))),
            None => Ok(None),
        })
        .collect()
}

/// Timestamp column rendered in UTC+8.
///
/// Zoned timestamps are converted; naive timestamps and dates are read as
/// UTC+8 wall-clock time. Text is accepted in RFC 3339 or the dashboard layout.
fn timestamps(array: &ArrayRef, name: &str) -> Result<Vec<Option<DateTime<FixedOffset>>>> {
    let offset = dashboard_offset();

    let (micros, zoned) = match array.data_type() {
        DataType::Timestamp(_, tz) => (
            cast_to(array, &DataType::Timestamp(TimeUnit::Microsecond, tz.clone()), name)?,
            tz.is_some(),
        ),
        DataType::Date32 | DataType::Date64 => (
            cast_to(array, &DataType::Timestamp(TimeUnit::Microsecond, None), name)?,
            false,
        ),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let text = texts(array, name)?;
            return text
                .iter()
                .enumerate()
                .map(|(row, value)| value.map(|v| parse_text_timestamp(v, name, row)).transpose())
                .collect();
        }
        other => return Err(mismatch(name, "timestamp", other)),
    };

    let micros = micros
        .as_any()
        .downcast_ref::<TimestampMicrosecondArray>()
        .ok_or_else(|| mismatch(name, "timestamp", array.data_type()))?;

    micros
        .iter()
        .enumerate()
        .map(|(row, value)| {
            let Some(value) = value else { return Ok(None) };
            let utc = DateTime::from_timestamp_micros(value).ok_or_else(|| {
                Error::Execution(format!("column {name} holds out-of-range timestamp at row {row}"))
            })?;
            let local = if zoned {
                Some(utc.with_timezone(&offset))
            } else {
                offset.from_local_datetime(&utc.naive_utc()).single()
            };
            local
                .map(Some)
                .ok_or_else(|| Error::Execution(format!("column {name} holds out-of-range timestamp at row {row}")))
        })
        .collect()
}

fn parse_text_timestamp(value: &str, name: &str, row: usize) -> Result<DateTime<FixedOffset>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&dashboard_offset()));
    }
    NaiveDateTime::parse_from_str(value, TIMESTAMP_LAYOUT)
        .ok()
        .and_then(|naive| dashboard_offset().from_local_datetime(&naive).single())
        .ok_or_else(|| Error::Execution(format!("column {name} holds unparseable timestamp {value:?} at row {row}")))
}
