//! Field Inclusion Overrides Example
//!
//! Demonstrates how report serialization handles heavyweight fields:
//! - Default output drops fields excluded by the result type
//! - IncludeOptions surfaces them per metric
//! - Overrides are additive and addressed by metric name
//!
//! Run with: cargo run --example include_overrides

use medir::{ArrowDataset, ColumnValueListMetric, ColumnValueRangeMetric, IncludeOptions, Report};

fn main() -> medir::Result<()> {
    env_logger::init();

    println!("=== Medir Include Overrides Example ===\n");

    let current = ArrowDataset::from_csv_str(
        "age,plan\n23,basic\n31,pro\n45,pro\n17,basic\n52,enterprise\n71,trial\n",
    )?;
    let reference = ArrowDataset::from_csv_str(
        "age,plan\n22,basic\n34,pro\n41,basic\n48,pro\n55,enterprise\n62,pro\n",
    )?;

    let mut report = Report::new()
        .with_metric(ColumnValueRangeMetric::new("age"))
        .with_metric(ColumnValueListMetric::new("plan"));
    report.run(&current, Some(&reference))?;

    // 1. Default serialization hides heavyweight fields
    println!("1. Default output (distributions and value counts hidden)");
    println!("{}\n", serde_json::to_string_pretty(&report.to_value()?)?);

    // 2. Surface the distribution for the range metric only
    println!("2. Distribution surfaced for ColumnValueRangeMetric");
    let include = IncludeOptions::new().with_fields("ColumnValueRangeMetric", &["distribution"]);

    let value = report.to_value_with(&include)?;
    let range_result = &value["metrics"][0]["result"];
    let list_result = &value["metrics"][1]["result"];

    println!(
        "   Range metric has distribution: {}",
        range_result["current"]["distribution"].is_object()
    );
    println!(
        "   List metric still hides value counts: {}",
        list_result["current"].get("value_counts").is_none()
    );

    // 3. Overrides accumulate across metrics
    println!("\n3. Overrides for both metrics");
    let include = IncludeOptions::new()
        .with_fields("ColumnValueRangeMetric", &["distribution"])
        .with_fields("ColumnValueListMetric", &["value_counts"]);

    let value = report.to_value_with(&include)?;
    println!("{}", serde_json::to_string_pretty(&value)?);

    println!("\n=== Example Complete ===");
    Ok(())
}
