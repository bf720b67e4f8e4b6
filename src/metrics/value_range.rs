//! Value range metric for numeric columns.
//!
//! Counts how many values of a column fall inside a closed interval.
//! Bounds left unset are inferred from the reference column's min and
//! max, so the metric doubles as an out-of-training-range check.
//!
//! # Example
//!
//! ```
//! use medir::{ArrowDataset, ColumnValueRangeMetric, Report};
//!
//! let current = ArrowDataset::from_csv_str("age\n22\n35\n70\n").unwrap();
//!
//! let mut report = Report::new()
//!     .with_metric(ColumnValueRangeMetric::new("age").with_range(18.0, 65.0));
//! report.run(&current, None).unwrap();
//!
//! assert!(report.to_json().unwrap().contains("ColumnValueRangeMetric"));
//! ```

// Allow precision loss casts in share calculations
#![allow(clippy::cast_precision_loss)]

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::round3;
use crate::{
    dataset::DatasetRole,
    distribution::{histogram_pair, Distribution, DEFAULT_BINS},
    error::{Error, Result},
    metric::{InputData, Metric, MetricResult, ResultSchema},
    widgets::{CounterData, HistogramSeries, TabData, WidgetInfo},
};

/// Counts and shares of one column's values relative to an interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesInRangeStat {
    /// Values inside the interval, bounds included.
    pub number_in_range: usize,
    /// Values outside the interval.
    pub number_not_in_range: usize,
    /// Fraction of values inside the interval, 0.0 for an empty column.
    pub share_in_range: f64,
    /// Fraction of values outside the interval, 0.0 for an empty column.
    pub share_not_in_range: f64,
    /// Total number of non-missing values.
    pub number_of_values: usize,
    /// Histogram of the column, excluded from report output by default.
    pub distribution: Distribution,
}

/// Result of [`ColumnValueRangeMetric`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnValueRangeResult {
    /// The column that was checked.
    pub column_name: String,
    /// Resolved left bound.
    pub left: f64,
    /// Resolved right bound.
    pub right: f64,
    /// Statistics over the current dataset.
    pub current: ValuesInRangeStat,
    /// Statistics over the reference dataset, when one was provided.
    pub reference: Option<ValuesInRangeStat>,
}

static STAT_SCHEMA: ResultSchema = ResultSchema::new(&["distribution"], &[]);
static RESULT_SCHEMA: ResultSchema = ResultSchema::new(
    &[],
    &[("current", &STAT_SCHEMA), ("reference", &STAT_SCHEMA)],
);

impl MetricResult for ColumnValueRangeResult {
    fn schema() -> &'static ResultSchema {
        &RESULT_SCHEMA
    }
}

/// Checks how many values of a numeric column fall inside a closed
/// interval.
///
/// Both bounds are inclusive. A bound not set explicitly is taken from
/// the reference column's minimum or maximum; omitting a bound without
/// reference data is an error.
#[derive(Debug, Clone)]
pub struct ColumnValueRangeMetric {
    column_name: String,
    left: Option<f64>,
    right: Option<f64>,
}

impl ColumnValueRangeMetric {
    /// Creates a range metric for a column with both bounds inferred
    /// from reference data.
    pub fn new(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            left: None,
            right: None,
        }
    }

    /// Sets the left bound explicitly.
    #[must_use]
    pub fn with_left(mut self, left: f64) -> Self {
        self.left = Some(left);
        self
    }

    /// Sets the right bound explicitly.
    #[must_use]
    pub fn with_right(mut self, right: f64) -> Self {
        self.right = Some(right);
        self
    }

    /// Sets both bounds explicitly.
    #[must_use]
    pub fn with_range(mut self, left: f64, right: f64) -> Self {
        self.left = Some(left);
        self.right = Some(right);
        self
    }

    /// The column this metric checks.
    pub fn column_name(&self) -> &str {
        &self.column_name
    }
}

impl Metric for ColumnValueRangeMetric {
    type Output = ColumnValueRangeResult;

    fn name(&self) -> &'static str {
        "ColumnValueRangeMetric"
    }

    fn calculate(&self, data: &InputData<'_>) -> Result<Self::Output> {
        let current_values = data.numeric_column(DatasetRole::Current, &self.column_name)?;

        let reference_values = match data.reference() {
            Some(_) => Some(data.numeric_column(DatasetRole::Reference, &self.column_name)?),
            None => None,
        };

        let (left, right) = match (self.left, self.right) {
            (Some(left), Some(right)) => (left, right),
            (left, right) => {
                let (reference_min, reference_max) =
                    reference_min_max(&self.column_name, reference_values.as_deref())?;
                (
                    left.unwrap_or(reference_min),
                    right.unwrap_or(reference_max),
                )
            }
        };

        let (current_distribution, reference_distribution) = histogram_pair(
            &current_values,
            reference_values.as_deref(),
            DEFAULT_BINS,
        );

        let current = values_in_range_stat(&current_values, left, right, current_distribution);
        let reference = match (reference_values, reference_distribution) {
            (Some(values), Some(distribution)) => {
                Some(values_in_range_stat(&values, left, right, distribution))
            }
            _ => None,
        };

        Ok(ColumnValueRangeResult {
            column_name: self.column_name.clone(),
            left,
            right,
            current,
            reference,
        })
    }

    fn render(&self, result: &Self::Output) -> Vec<WidgetInfo> {
        let header = WidgetInfo::header(format!(
            "Column '{}'. Value range.",
            result.column_name
        ));

        let mut counters = vec![
            CounterData::new("Value range", format!("[{}, {}]", result.left, result.right)),
            CounterData::new("In range (current)", format_in_range(&result.current)),
        ];
        if let Some(reference) = &result.reference {
            counters.push(CounterData::new(
                "In range (reference)",
                format_in_range(reference),
            ));
        }
        let counters = WidgetInfo::counters(counters);

        let histogram = WidgetInfo::Histogram {
            title: String::new(),
            primary: HistogramSeries::new("current", result.current.distribution.clone()),
            secondary: result
                .reference
                .as_ref()
                .map(|stat| HistogramSeries::new("reference", stat.distribution.clone())),
            left: Some(result.left),
            right: Some(result.right),
        };

        let statistics = statistics_table(result);

        let tabs = WidgetInfo::tabs(
            "",
            vec![
                TabData::new("Distribution", histogram),
                TabData::new("Statistics", statistics),
            ],
        );

        vec![header, counters, tabs]
    }
}

fn reference_min_max(column: &str, reference: Option<&[f64]>) -> Result<(f64, f64)> {
    let values = reference.ok_or_else(|| {
        Error::missing_reference(format!("cannot infer a value range for column '{column}'"))
    })?;

    if values.is_empty() {
        return Err(Error::missing_reference(format!(
            "cannot infer a value range for column '{column}' from an empty reference column"
        )));
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &value in values {
        min = min.min(value);
        max = max.max(value);
    }

    Ok((min, max))
}

fn values_in_range_stat(
    values: &[f64],
    left: f64,
    right: f64,
    distribution: Distribution,
) -> ValuesInRangeStat {
    let number_of_values = values.len();
    let number_in_range = values
        .iter()
        .filter(|value| **value >= left && **value <= right)
        .count();
    let number_not_in_range = number_of_values - number_in_range;

    let (share_in_range, share_not_in_range) = if number_of_values == 0 {
        (0.0, 0.0)
    } else {
        (
            number_in_range as f64 / number_of_values as f64,
            number_not_in_range as f64 / number_of_values as f64,
        )
    };

    ValuesInRangeStat {
        number_in_range,
        number_not_in_range,
        share_in_range,
        share_not_in_range,
        number_of_values,
        distribution,
    }
}

fn format_in_range(stat: &ValuesInRangeStat) -> String {
    format!(
        "{} ({}%)",
        stat.number_in_range,
        round3(stat.share_in_range * 100.0)
    )
}

fn statistics_table(result: &ColumnValueRangeResult) -> WidgetInfo {
    let mut column_names = vec!["Metric".to_string(), "Current".to_string()];
    if result.reference.is_some() {
        column_names.push("Reference".to_string());
    }

    let row = |label: &str, current: Value, reference: Option<Value>| -> Vec<Value> {
        let mut cells = vec![json!(label), current];
        if let Some(value) = reference {
            cells.push(value);
        }
        cells
    };

    let reference = result.reference.as_ref();
    let rows = vec![
        row(
            "Values in range",
            json!(result.current.number_in_range),
            reference.map(|stat| json!(stat.number_in_range)),
        ),
        row(
            "%",
            json!(round3(result.current.share_in_range * 100.0)),
            reference.map(|stat| json!(round3(stat.share_in_range * 100.0))),
        ),
        row(
            "Values out of range",
            json!(result.current.number_not_in_range),
            reference.map(|stat| json!(stat.number_not_in_range)),
        ),
        row(
            "%",
            json!(round3(result.current.share_not_in_range * 100.0)),
            reference.map(|stat| json!(round3(stat.share_not_in_range * 100.0))),
        ),
        row(
            "Values count",
            json!(result.current.number_of_values),
            reference.map(|stat| json!(stat.number_of_values)),
        ),
    ];

    WidgetInfo::table("", column_names, rows)
}
