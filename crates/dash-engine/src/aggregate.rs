//! Chart, table and KPI aggregation over a set of rows.
//!
//! Callers pass the rows compatible with the active selection (see
//! [`crate::possible_rows`]); nothing here looks at selections.

use dash_model::{MeasureOp, Row};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// Number of groups kept by ranked aggregations unless overridden.
pub const DEFAULT_TOP_N: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Keep at most this many groups after sorting. `None` keeps all.
    pub top_n: Option<usize>,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            top_n: Some(DEFAULT_TOP_N),
        }
    }
}

impl AggregateOptions {
    pub fn unlimited() -> Self {
        Self { top_n: None }
    }
}

/// One group of an aggregation.
///
/// `value` is `None` for dimension-only listings, which have nothing to
/// aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateEntry {
    pub key: String,
    pub value: Option<f64>,
}

impl AggregateEntry {
    /// Value as shown in tables: two decimals at most, `-` when absent.
    pub fn display_value(&self) -> String {
        match self.value {
            Some(value) => format!("{value}"),
            None => "-".to_string(),
        }
    }
}

/// Group `rows` by the display string of `dimension` and reduce `measure`.
///
/// Without a measure, returns each distinct key once in first-seen order,
/// untruncated. With a measure, values are coerced to numbers (anything
/// non-numeric counts as zero), reduced with `op` (sum by default), rounded
/// to two decimals and sorted descending. Ties keep first-seen order.
pub fn aggregate(
    rows: &[&Row],
    dimension: &str,
    measure: Option<&str>,
    op: Option<MeasureOp>,
    options: &AggregateOptions,
) -> Vec<AggregateEntry> {
    let Some(measure) = measure else {
        return unique_keys(rows, dimension);
    };
    let op = op.unwrap_or_default();

    let mut groups: IndexMap<String, Accumulator> = IndexMap::new();
    for row in rows {
        groups
            .entry(row.get(dimension).to_string())
            .or_default()
            .push(row.get(measure).to_measure());
    }

    let mut entries: Vec<AggregateEntry> = groups
        .into_iter()
        .map(|(key, acc)| AggregateEntry {
            key,
            value: Some(round2(acc.reduce(op))),
        })
        .collect();
    entries.sort_by(|a, b| {
        let a = a.value.unwrap_or_default();
        let b = b.value.unwrap_or_default();
        b.total_cmp(&a)
    });
    if let Some(limit) = options.top_n {
        entries.truncate(limit);
    }
    entries
}

/// Re-sort entries ascending by key, as line charts display them.
pub fn sort_by_key(entries: &mut [AggregateEntry]) {
    entries.sort_by(|a, b| a.key.cmp(&b.key));
}

fn unique_keys(rows: &[&Row], dimension: &str) -> Vec<AggregateEntry> {
    let seen: IndexSet<String> = rows
        .iter()
        .map(|row| row.get(dimension).to_string())
        .collect();
    seen.into_iter()
        .map(|key| AggregateEntry { key, value: None })
        .collect()
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn reduce(self, op: MeasureOp) -> f64 {
        match op {
            MeasureOp::Sum => self.sum,
            MeasureOp::Avg => self.sum / self.count.max(1) as f64,
            MeasureOp::Count => self.count as f64,
        }
    }
}

/// Round to two decimals, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A single headline figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub label: &'static str,
    pub measure: String,
    pub value: f64,
}

/// Reduce `measure` over all of `rows` into one figure.
///
/// The average of no rows is zero.
pub fn kpi(rows: &[&Row], measure: &str, op: Option<MeasureOp>) -> Kpi {
    let op = op.unwrap_or_default();
    let mut acc = Accumulator::default();
    for row in rows {
        acc.push(row.get(measure).to_measure());
    }
    Kpi {
        label: op.kpi_label(),
        measure: measure.to_string(),
        value: round2(acc.reduce(op)),
    }
}
