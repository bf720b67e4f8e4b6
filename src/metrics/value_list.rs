//! Value list metric for categorical columns.

// Allow precision loss casts in share calculations
#![allow(clippy::cast_precision_loss)]

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::round3;
use crate::{
    dataset::DatasetRole,
    error::{Error, Result},
    metric::{InputData, Metric, MetricResult, ResultSchema},
    widgets::{CounterData, WidgetInfo},
};

/// Counts and shares of one column's values relative to an allowed
/// list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesInListStat {
    /// Values found in the list.
    pub number_in_list: usize,
    /// Values absent from the list.
    pub number_not_in_list: usize,
    /// Fraction of values in the list, 0.0 for an empty column.
    pub share_in_list: f64,
    /// Fraction of values absent from the list, 0.0 for an empty column.
    pub share_not_in_list: f64,
    /// Total number of non-missing values.
    pub number_of_values: usize,
    /// Occurrences per observed value, excluded from report output by
    /// default.
    pub value_counts: BTreeMap<String, usize>,
}

/// Result of [`ColumnValueListMetric`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnValueListResult {
    /// The column that was checked.
    pub column_name: String,
    /// The resolved list of allowed values.
    pub values: Vec<String>,
    /// Statistics over the current dataset.
    pub current: ValuesInListStat,
    /// Statistics over the reference dataset, when one was provided.
    pub reference: Option<ValuesInListStat>,
}

static STAT_SCHEMA: ResultSchema = ResultSchema::new(&["value_counts"], &[]);
static RESULT_SCHEMA: ResultSchema = ResultSchema::new(
    &[],
    &[("current", &STAT_SCHEMA), ("reference", &STAT_SCHEMA)],
);

impl MetricResult for ColumnValueListResult {
    fn schema() -> &'static ResultSchema {
        &RESULT_SCHEMA
    }
}

/// Checks how many values of a categorical column belong to an allowed
/// list.
///
/// When no list is given it is derived from the distinct values of the
/// reference column; omitting the list without reference data is an
/// error.
#[derive(Debug, Clone)]
pub struct ColumnValueListMetric {
    column_name: String,
    values: Option<Vec<String>>,
}

impl ColumnValueListMetric {
    /// Creates a list metric for a column with the allowed values
    /// derived from reference data.
    pub fn new(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            values: None,
        }
    }

    /// Sets the allowed values explicitly.
    #[must_use]
    pub fn with_values(mut self, values: &[&str]) -> Self {
        self.values = Some(values.iter().map(|value| (*value).to_string()).collect());
        self
    }

    /// The column this metric checks.
    pub fn column_name(&self) -> &str {
        &self.column_name
    }
}

impl Metric for ColumnValueListMetric {
    type Output = ColumnValueListResult;

    fn name(&self) -> &'static str {
        "ColumnValueListMetric"
    }

    fn calculate(&self, data: &InputData<'_>) -> Result<Self::Output> {
        let current_values = data.string_column(DatasetRole::Current, &self.column_name)?;

        let reference_values = match data.reference() {
            Some(_) => Some(data.string_column(DatasetRole::Reference, &self.column_name)?),
            None => None,
        };

        let values = match &self.values {
            Some(values) => values.clone(),
            None => {
                let Some(reference) = &reference_values else {
                    return Err(Error::missing_reference(format!(
                        "cannot derive a value list for column '{}'",
                        self.column_name
                    )));
                };
                if reference.is_empty() {
                    return Err(Error::missing_reference(format!(
                        "cannot derive a value list for column '{}' from an empty reference column",
                        self.column_name
                    )));
                }
                let distinct: BTreeSet<&String> = reference.iter().collect();
                distinct.into_iter().cloned().collect()
            }
        };

        let current = values_in_list_stat(&current_values, &values);
        let reference = reference_values
            .as_deref()
            .map(|observed| values_in_list_stat(observed, &values));

        Ok(ColumnValueListResult {
            column_name: self.column_name.clone(),
            values,
            current,
            reference,
        })
    }

    fn render(&self, result: &Self::Output) -> Vec<WidgetInfo> {
        let in_list_percent = round3(result.current.share_in_list * 100.0);

        let header = WidgetInfo::header(format!(
            "Column '{}'. Value list.",
            result.column_name
        ));

        let counters = WidgetInfo::counters(vec![
            CounterData::new("Values in list", result.values.len().to_string()),
            CounterData::new(
                "In list (current)",
                format!("{} ({}%)", result.current.number_in_list, in_list_percent),
            ),
        ]);

        let mut column_names = vec!["Metric".to_string(), "Current".to_string()];
        if result.reference.is_some() {
            column_names.push("Reference".to_string());
        }

        let reference = result.reference.as_ref();
        let mut rows = Vec::new();
        let mut push_row = |label: &str, current: serde_json::Value, reference_cell| {
            let mut cells = vec![json!(label), current];
            if let Some(value) = reference_cell {
                cells.push(value);
            }
            rows.push(cells);
        };

        push_row(
            "Values in list",
            json!(result.current.number_in_list),
            reference.map(|stat| json!(stat.number_in_list)),
        );
        push_row(
            "%",
            json!(round3(result.current.share_in_list * 100.0)),
            reference.map(|stat| json!(round3(stat.share_in_list * 100.0))),
        );
        push_row(
            "Values not in list",
            json!(result.current.number_not_in_list),
            reference.map(|stat| json!(stat.number_not_in_list)),
        );
        push_row(
            "%",
            json!(round3(result.current.share_not_in_list * 100.0)),
            reference.map(|stat| json!(round3(stat.share_not_in_list * 100.0))),
        );
        push_row(
            "Values count",
            json!(result.current.number_of_values),
            reference.map(|stat| json!(stat.number_of_values)),
        );

        let table = WidgetInfo::table("Statistics", column_names, rows);

        vec![header, counters, table]
    }
}

fn values_in_list_stat(observed: &[String], values: &[String]) -> ValuesInListStat {
    let allowed: HashSet<&str> = values.iter().map(String::as_str).collect();

    let number_of_values = observed.len();
    let number_in_list = observed
        .iter()
        .filter(|value| allowed.contains(value.as_str()))
        .count();
    let number_not_in_list = number_of_values - number_in_list;

    let (share_in_list, share_not_in_list) = if number_of_values == 0 {
        (0.0, 0.0)
    } else {
        (
            number_in_list as f64 / number_of_values as f64,
            number_not_in_list as f64 / number_of_values as f64,
        )
    };

    let mut value_counts = BTreeMap::new();
    for value in observed {
        *value_counts.entry(value.clone()).or_insert(0) += 1;
    }

    ValuesInListStat {
        number_in_list,
        number_not_in_list,
        share_in_list,
        share_not_in_list,
        number_of_values,
        value_counts,
    }
}
