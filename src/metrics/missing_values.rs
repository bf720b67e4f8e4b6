//! Dataset-wide missing value metric.

// Allow precision loss casts in share calculations
#![allow(clippy::cast_precision_loss)]

use std::collections::BTreeMap;

use arrow::{
    array::{Array, Float32Array, Float64Array},
    datatypes::DataType,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::round3;
use crate::{
    dataset::ArrowDataset,
    error::Result,
    metric::{InputData, Metric, MetricResult, ResultSchema},
    widgets::{CounterData, WidgetInfo},
};

/// Missing value counts for one dataset.
///
/// A value is missing when it is an Arrow null or a float NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValuesStat {
    /// Rows in the dataset.
    pub number_of_rows: usize,
    /// Columns in the dataset.
    pub number_of_columns: usize,
    /// Missing values across all columns.
    pub number_of_missing_values: usize,
    /// Fraction of missing cells, 0.0 for an empty dataset.
    pub share_of_missing_values: f64,
    /// Missing values per column, excluded from report output by
    /// default.
    pub missing_by_column: BTreeMap<String, usize>,
}

/// Result of [`DatasetMissingValuesMetric`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMissingValuesResult {
    /// Statistics over the current dataset.
    pub current: MissingValuesStat,
    /// Statistics over the reference dataset, when one was provided.
    pub reference: Option<MissingValuesStat>,
}

static STAT_SCHEMA: ResultSchema = ResultSchema::new(&["missing_by_column"], &[]);
static RESULT_SCHEMA: ResultSchema = ResultSchema::new(
    &[],
    &[("current", &STAT_SCHEMA), ("reference", &STAT_SCHEMA)],
);

impl MetricResult for DatasetMissingValuesResult {
    fn schema() -> &'static ResultSchema {
        &RESULT_SCHEMA
    }
}

/// Counts missing values across every column of the datasets.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetMissingValuesMetric;

impl DatasetMissingValuesMetric {
    /// Creates the metric.
    pub fn new() -> Self {
        Self
    }
}

impl Metric for DatasetMissingValuesMetric {
    type Output = DatasetMissingValuesResult;

    fn name(&self) -> &'static str {
        "DatasetMissingValuesMetric"
    }

    fn calculate(&self, data: &InputData<'_>) -> Result<Self::Output> {
        let current = missing_stat(data.current());
        let reference = data.reference().map(missing_stat);

        Ok(DatasetMissingValuesResult { current, reference })
    }

    fn render(&self, result: &Self::Output) -> Vec<WidgetInfo> {
        let header = WidgetInfo::header("Dataset missing values.");

        let mut counters = vec![CounterData::new(
            "Missing values (current)",
            format_missing(&result.current),
        )];
        if let Some(reference) = &result.reference {
            counters.push(CounterData::new(
                "Missing values (reference)",
                format_missing(reference),
            ));
        }
        let counters = WidgetInfo::counters(counters);

        let mut column_names = vec!["Column".to_string(), "Current".to_string()];
        if result.reference.is_some() {
            column_names.push("Reference".to_string());
        }

        let rows = result
            .current
            .missing_by_column
            .iter()
            .map(|(column, count)| {
                let mut cells = vec![json!(column), json!(count)];
                if let Some(reference) = &result.reference {
                    cells.push(
                        reference
                            .missing_by_column
                            .get(column)
                            .map_or(Value::Null, |reference_count| json!(reference_count)),
                    );
                }
                cells
            })
            .collect();

        let table = WidgetInfo::table("Missing values by column", column_names, rows);

        vec![header, counters, table]
    }
}

fn format_missing(stat: &MissingValuesStat) -> String {
    format!(
        "{} ({}%)",
        stat.number_of_missing_values,
        round3(stat.share_of_missing_values * 100.0)
    )
}

fn missing_stat(dataset: &ArrowDataset) -> MissingValuesStat {
    let number_of_rows = dataset.len();
    let number_of_columns = dataset.num_columns();

    let mut missing_by_column = BTreeMap::new();
    for name in dataset.column_names() {
        missing_by_column.insert(name.to_string(), missing_in_column(dataset, name));
    }

    let number_of_missing_values: usize = missing_by_column.values().sum();
    let cells = number_of_rows * number_of_columns;
    let share_of_missing_values = if cells == 0 {
        0.0
    } else {
        number_of_missing_values as f64 / cells as f64
    };

    MissingValuesStat {
        number_of_rows,
        number_of_columns,
        number_of_missing_values,
        share_of_missing_values,
        missing_by_column,
    }
}

fn missing_in_column(dataset: &ArrowDataset, name: &str) -> usize {
    let mut count = 0;
    for batch in dataset.batches() {
        if let Some(column) = batch.column_by_name(name) {
            count += column.null_count();

            // NaN is missing too, matching how numeric extraction drops it
            match column.data_type() {
                DataType::Float64 => {
                    if let Some(floats) = column.as_any().downcast_ref::<Float64Array>() {
                        count += floats.iter().flatten().filter(|value| value.is_nan()).count();
                    }
                }
                DataType::Float32 => {
                    if let Some(floats) = column.as_any().downcast_ref::<Float32Array>() {
                        count += floats.iter().flatten().filter(|value| value.is_nan()).count();
                    }
                }
                _ => {}
            }
        }
    }
    count
}
