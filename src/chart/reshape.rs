//! Row reshaping for the four chart kinds.
//!
//! All transforms are pure and keep input order wherever the output has an
//! order of its own; an empty row set is always [`QueryOutcome::NoData`].

use crate::chart::rows::{CategoricalRow, LegendRow, RowSet, TimeSeriesRow, TwoAxisRow};
use crate::chart::{CategoricalSeries, ChartOutput, QueryOutcome, TimePoint, TimeSeries, TwoAxisSeries};
use crate::constants::time::TIMESTAMP_LAYOUT;
use std::collections::{BTreeSet, HashMap};

/// Dispatch a decoded row set to its reshaper.
pub fn reshape(rows: RowSet) -> QueryOutcome {
    match rows {
        RowSet::TwoAxis(rows) => two_axis(rows),
        RowSet::Categorical(rows) => categorical(rows),
        RowSet::TimeSeries(rows) => grouped_time_series(rows),
        RowSet::Legend(rows) => legend(rows),
    }
}

/// `two_d`: wrap the rows, in order, as a single series.
pub fn two_axis(rows: Vec<TwoAxisRow>) -> QueryOutcome {
    if rows.is_empty() {
        return QueryOutcome::NoData;
    }
    QueryOutcome::Data(ChartOutput::TwoD(vec![TwoAxisSeries { data: rows }]))
}

/// `three_d` / `percent`: pivot rows into a series x category matrix.
///
/// Series appear in first-seen order, categories in ascending lexicographic
/// order. Missing combinations are 0; a repeated combination keeps the last
/// value.
pub fn categorical(rows: Vec<CategoricalRow>) -> QueryOutcome {
    if rows.is_empty() {
        return QueryOutcome::NoData;
    }

    let categories: Vec<String> = rows
        .iter()
        .map(|row| row.category.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect();
    let column: HashMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(idx, category)| (category.as_str(), idx))
        .collect();

    let mut series: Vec<CategoricalSeries> = Vec::new();
    let mut series_index: HashMap<&str, usize> = HashMap::new();
    for row in &rows {
        let idx = *series_index.entry(row.series.as_str()).or_insert_with(|| {
            series.push(CategoricalSeries {
                name: row.series.clone(),
                icon: row.icon.clone(),
                data: vec![0; categories.len()],
            });
            series.len() - 1
        });
        series[idx].data[column[row.category.as_str()]] = row.value;
    }

    QueryOutcome::Data(ChartOutput::Categorical {
        data: series,
        categories,
    })
}

/// `time`: group points by series name, both in input order.
pub fn grouped_time_series(rows: Vec<TimeSeriesRow>) -> QueryOutcome {
    if rows.is_empty() {
        return QueryOutcome::NoData;
    }

    let mut series: Vec<TimeSeries> = Vec::new();
    for row in rows {
        let point = TimePoint {
            x: row.timestamp.format(TIMESTAMP_LAYOUT).to_string(),
            y: row.value,
        };
        match series.iter_mut().find(|s| s.name == row.series) {
            Some(existing) => existing.data.push(point),
            None => series.push(TimeSeries {
                name: row.series,
                data: vec![point],
            }),
        }
    }

    QueryOutcome::Data(ChartOutput::Time(series))
}

/// `map_legend`: rows pass through unchanged.
pub fn legend(rows: Vec<LegendRow>) -> QueryOutcome {
    if rows.is_empty() {
        return QueryOutcome::NoData;
    }
    QueryOutcome::Data(ChartOutput::MapLegend(rows))
}
