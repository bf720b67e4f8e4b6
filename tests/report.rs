//! Integration tests for report assembly and serialization.

#![allow(clippy::uninlined_format_args)]

use medir::{
    ArrowDataset, ColumnValueRangeMetric, DatasetMissingValuesMetric, IncludeOptions, InputData,
    Metric, MetricResult, Report, Result, ResultSchema,
};
use serde::Serialize;
use serde_json::{json, Value};

/// A metric with heavyweight fields, used to pin the serialization
/// contract without real column access.
#[derive(Serialize)]
struct MockResult {
    value: String,
    series: Vec<u64>,
    distribution: Vec<f64>,
}

static MOCK_SCHEMA: ResultSchema = ResultSchema::new(&["series", "distribution"], &[]);

impl MetricResult for MockResult {
    fn schema() -> &'static ResultSchema {
        &MOCK_SCHEMA
    }
}

struct MockMetric;

impl Metric for MockMetric {
    type Output = MockResult;

    fn name(&self) -> &'static str {
        "MockMetric"
    }

    fn calculate(&self, _data: &InputData<'_>) -> Result<Self::Output> {
        Ok(MockResult {
            value: "a".to_string(),
            series: vec![1, 2, 3],
            distribution: vec![0.5, 0.5],
        })
    }
}

fn one_row_dataset() -> ArrowDataset {
    ArrowDataset::from_csv_str("x\n1\n")
        .ok()
        .unwrap_or_else(|| panic!("Should create dataset"))
}

fn age_dataset(range: std::ops::RangeInclusive<i64>) -> ArrowDataset {
    let rows: String = range.map(|v| format!("{}\n", v)).collect();
    ArrowDataset::from_csv_str(&format!("age\n{}", rows))
        .ok()
        .unwrap_or_else(|| panic!("Should create dataset"))
}

#[test]
fn test_default_serialization_hides_excluded_fields() {
    let current = one_row_dataset();
    let mut report = Report::new().with_metric(MockMetric);
    report.run(&current, None).ok().unwrap_or_else(|| panic!("Should run"));

    let value = report.to_value().ok().unwrap_or_else(|| panic!("Should serialize"));

    assert_eq!(
        value,
        json!({"metrics": [{"metric": "MockMetric", "result": {"value": "a"}}]})
    );
}

#[test]
fn test_include_surfaces_named_fields() {
    let current = one_row_dataset();
    let mut report = Report::new().with_metric(MockMetric);
    report.run(&current, None).ok().unwrap_or_else(|| panic!("Should run"));

    let include = IncludeOptions::new().with_fields("MockMetric", &["value", "series"]);
    let value = report
        .to_value_with(&include)
        .ok()
        .unwrap_or_else(|| panic!("Should serialize"));

    // The surfaced field comes back unchanged, the rest stays hidden
    assert_eq!(
        value,
        json!({"metrics": [{"metric": "MockMetric", "result": {"value": "a", "series": [1, 2, 3]}}]})
    );
}

#[test]
fn test_json_string_agrees_with_value() {
    let current = one_row_dataset();
    let mut report = Report::new().with_metric(MockMetric);
    report.run(&current, None).ok().unwrap_or_else(|| panic!("Should run"));

    let include = IncludeOptions::new().with_fields("MockMetric", &["series"]);

    let from_string: Value = serde_json::from_str(
        &report
            .to_json_with(&include)
            .ok()
            .unwrap_or_else(|| panic!("Should serialize")),
    )
    .ok()
    .unwrap_or_else(|| panic!("Should parse"));

    let from_value = report
        .to_value_with(&include)
        .ok()
        .unwrap_or_else(|| panic!("Should serialize"));

    assert_eq!(from_string, from_value);
}

#[test]
fn test_serialization_before_run_fails() {
    let report = Report::new().with_metric(MockMetric);
    assert!(report.to_value().is_err());
    assert!(report.to_json().is_err());
}

#[test]
fn test_report_name_appears_in_output() {
    let current = one_row_dataset();
    let mut report = Report::new().with_name("smoke check").with_metric(MockMetric);
    report.run(&current, None).ok().unwrap_or_else(|| panic!("Should run"));

    let value = report.to_value().ok().unwrap_or_else(|| panic!("Should serialize"));
    assert_eq!(value["name"], json!("smoke check"));
}

#[test]
fn test_range_metric_report_shape() {
    // 1. Build datasets with a known layout
    let current = age_dataset(1..=10);
    let reference = age_dataset(2..=8);

    // 2. Run with both bounds inferred from the reference column
    let mut report = Report::new().with_metric(ColumnValueRangeMetric::new("age"));
    report
        .run(&current, Some(&reference))
        .ok()
        .unwrap_or_else(|| panic!("Should run"));

    // 3. Verify the exact serialized shape
    let value = report.to_value().ok().unwrap_or_else(|| panic!("Should serialize"));
    let expected = json!({
        "metrics": [{
            "metric": "ColumnValueRangeMetric",
            "result": {
                "column_name": "age",
                "left": 2.0,
                "right": 8.0,
                "current": {
                    "number_in_range": 7,
                    "number_not_in_range": 3,
                    "share_in_range": 0.7,
                    "share_not_in_range": 0.3,
                    "number_of_values": 10
                },
                "reference": {
                    "number_in_range": 7,
                    "number_not_in_range": 0,
                    "share_in_range": 1.0,
                    "share_not_in_range": 0.0,
                    "number_of_values": 7
                }
            }
        }]
    });

    assert_eq!(value, expected);
}

#[test]
fn test_include_restores_distributions_at_depth() {
    let current = age_dataset(1..=10);
    let reference = age_dataset(2..=8);

    let mut report = Report::new().with_metric(ColumnValueRangeMetric::new("age"));
    report
        .run(&current, Some(&reference))
        .ok()
        .unwrap_or_else(|| panic!("Should run"));

    let include = IncludeOptions::new().with_fields("ColumnValueRangeMetric", &["distribution"]);
    let value = report
        .to_value_with(&include)
        .ok()
        .unwrap_or_else(|| panic!("Should serialize"));

    let result = &value["metrics"][0]["result"];
    assert!(result["current"]["distribution"]["x"].is_array());
    assert!(result["current"]["distribution"]["y"].is_array());
    assert!(result["reference"]["distribution"]["x"].is_array());

    // The default view still hides them
    let default_value = report.to_value().ok().unwrap_or_else(|| panic!("Should serialize"));
    assert!(default_value["metrics"][0]["result"]["current"]
        .get("distribution")
        .is_none());
}

#[test]
fn test_metrics_keep_execution_order() {
    let current = age_dataset(1..=10);

    let mut report = Report::new()
        .with_metric(DatasetMissingValuesMetric::new())
        .with_metric(ColumnValueRangeMetric::new("age").with_range(0.0, 5.0));
    report.run(&current, None).ok().unwrap_or_else(|| panic!("Should run"));

    let value = report.to_value().ok().unwrap_or_else(|| panic!("Should serialize"));
    assert_eq!(value["metrics"][0]["metric"], json!("DatasetMissingValuesMetric"));
    assert_eq!(value["metrics"][1]["metric"], json!("ColumnValueRangeMetric"));
}

#[test]
fn test_widgets_available_after_run() {
    let current = age_dataset(1..=10);

    let mut report = Report::new()
        .with_metric(ColumnValueRangeMetric::new("age").with_range(0.0, 5.0))
        .with_metric(MockMetric);
    report.run(&current, None).ok().unwrap_or_else(|| panic!("Should run"));

    let results = report.results();
    assert!(!results[0].widgets().is_empty());
    assert!(results[1].widgets().is_empty());
}

#[test]
fn test_save_json_roundtrip() {
    let temp_dir = tempfile::tempdir()
        .ok()
        .unwrap_or_else(|| panic!("Should create temp dir"));
    let path = temp_dir.path().join("report.json");

    let current = age_dataset(1..=10);
    let mut report = Report::new().with_metric(ColumnValueRangeMetric::new("age").with_range(2.0, 8.0));
    report.run(&current, None).ok().unwrap_or_else(|| panic!("Should run"));

    report.save_json(&path).ok().unwrap_or_else(|| panic!("Should save"));

    let written: Value = serde_json::from_str(
        &std::fs::read_to_string(&path)
            .ok()
            .unwrap_or_else(|| panic!("Should read")),
    )
    .ok()
    .unwrap_or_else(|| panic!("Should parse"));

    assert_eq!(
        written,
        report.to_value().ok().unwrap_or_else(|| panic!("Should serialize"))
    );
}

#[test]
fn test_failing_metric_reports_clean_error() {
    let current = one_row_dataset();

    let metric = ColumnValueRangeMetric::new("absent");
    let expected = format!("Column '{}' not found in current data", metric.column_name());

    let mut report = Report::new().with_metric(metric);
    let err = report
        .run(&current, None)
        .err()
        .unwrap_or_else(|| panic!("Should fail"));

    assert_eq!(err.to_string(), expected);
    assert!(report.results().is_empty());
}
