//! Value Range Report Example
//!
//! Demonstrates running data quality metrics through a report:
//! - Explicit and inferred value ranges
//! - Reference dataset comparison
//! - JSON serialization
//! - Widget data for rendering frontends
//!
//! Run with: cargo run --example range_report

use std::sync::Arc;

use arrow::{
    array::{Float64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use medir::{
    ArrowDataset, ColumnValueListMetric, ColumnValueRangeMetric, DatasetMissingValuesMetric,
    Report,
};

fn create_current_dataset() -> medir::Result<ArrowDataset> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("age", DataType::Float64, true),
        Field::new("plan", DataType::Utf8, true),
    ]));

    // Some ages fall outside the training range, one is missing
    let ages: Vec<Option<f64>> = vec![
        Some(23.0),
        Some(31.0),
        Some(45.0),
        Some(17.0),
        Some(52.0),
        None,
        Some(71.0),
        Some(38.0),
    ];
    let plans: Vec<Option<&str>> = vec![
        Some("basic"),
        Some("pro"),
        Some("pro"),
        Some("basic"),
        Some("enterprise"),
        Some("basic"),
        Some("trial"),
        None,
    ];

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Float64Array::from(ages)),
            Arc::new(StringArray::from(plans)),
        ],
    )?;

    ArrowDataset::from_batch(batch)
}

fn create_reference_dataset() -> medir::Result<ArrowDataset> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("age", DataType::Float64, true),
        Field::new("plan", DataType::Utf8, true),
    ]));

    let ages: Vec<Option<f64>> = vec![
        Some(22.0),
        Some(27.0),
        Some(34.0),
        Some(41.0),
        Some(48.0),
        Some(55.0),
        Some(62.0),
        Some(36.0),
    ];
    let plans: Vec<Option<&str>> = vec![
        Some("basic"),
        Some("pro"),
        Some("basic"),
        Some("enterprise"),
        Some("pro"),
        Some("basic"),
        Some("pro"),
        Some("enterprise"),
    ];

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Float64Array::from(ages)),
            Arc::new(StringArray::from(plans)),
        ],
    )?;

    ArrowDataset::from_batch(batch)
}

fn main() -> medir::Result<()> {
    env_logger::init();

    println!("=== Medir Value Range Report Example ===\n");

    let current = create_current_dataset()?;
    let reference = create_reference_dataset()?;

    println!("Created datasets:");
    println!("  Current: {} rows", current.len());
    println!("  Reference: {} rows", reference.len());

    // 1. Explicit range
    println!("\n1. Explicit range [18, 65]");
    let mut report = Report::new()
        .with_metric(ColumnValueRangeMetric::new("age").with_range(18.0, 65.0));
    report.run(&current, None)?;

    let value = report.to_value()?;
    let result = &value["metrics"][0]["result"];
    println!("   In range: {}", result["current"]["number_in_range"]);
    println!("   Out of range: {}", result["current"]["number_not_in_range"]);
    println!("   Share in range: {}", result["current"]["share_in_range"]);

    // 2. Bounds inferred from the reference column
    println!("\n2. Bounds inferred from reference min/max");
    let mut inferred = Report::new().with_metric(ColumnValueRangeMetric::new("age"));
    inferred.run(&current, Some(&reference))?;

    let value = inferred.to_value()?;
    let result = &value["metrics"][0]["result"];
    println!("   Inferred range: [{}, {}]", result["left"], result["right"]);
    println!(
        "   Current in range: {} of {}",
        result["current"]["number_in_range"], result["current"]["number_of_values"]
    );

    // 3. A report with several metrics
    println!("\n3. Combined report");
    let age_range = ColumnValueRangeMetric::new("age");
    let plan_list = ColumnValueListMetric::new("plan");
    println!(
        "   Columns checked: '{}' and '{}'",
        age_range.column_name(),
        plan_list.column_name()
    );

    let mut combined = Report::new()
        .with_name("customer data quality")
        .with_metric(DatasetMissingValuesMetric::new())
        .with_metric(age_range)
        .with_metric(plan_list);
    combined.run(&current, Some(&reference))?;

    println!("   Metrics run: {:?}", combined.metric_names());
    println!("\n{}", serde_json::to_string_pretty(&combined.to_value()?)?);

    // 4. Widget data for a rendering frontend
    println!("\n4. Widget data");
    for computed in combined.results() {
        println!("   {}: {} widgets", computed.name(), computed.widgets().len());
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
