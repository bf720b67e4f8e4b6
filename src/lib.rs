//! medir - Data Quality Metrics and Reports in Pure Rust
//!
//! An evaluation library for tabular data. Bundles metrics into
//! reports, runs them against a current dataset and an optional
//! reference dataset, and serializes the results to JSON with
//! heavyweight fields held back by default.
//!
//! # Design Principles
//!
//! 1. **Typed metrics** - Every metric produces a concrete result
//!    struct, type-erased only at the report boundary
//! 2. **Pure Rust** - No Python, no FFI
//! 3. **Zero-copy** - Arrow `RecordBatch` throughout
//! 4. **Ecosystem aligned** - Arrow 53, Parquet 53
//!
//! # Quick Start
//!
//! ```no_run
//! use medir::{ArrowDataset, ColumnValueRangeMetric, IncludeOptions, Report};
//!
//! // Load the datasets to compare
//! let current = ArrowDataset::from_parquet("data/current.parquet").unwrap();
//! let reference = ArrowDataset::from_parquet("data/reference.parquet").unwrap();
//!
//! // Assemble and run a report
//! let mut report = Report::new()
//!     .with_metric(ColumnValueRangeMetric::new("age").with_range(18.0, 65.0));
//! report.run(&current, Some(&reference)).unwrap();
//!
//! // Serialize, surfacing the distribution for one metric
//! let include = IncludeOptions::new().with_fields("ColumnValueRangeMetric", &["distribution"]);
//! println!("{}", report.to_json_with(&include).unwrap());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::cast_lossless,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_precision_loss,
        clippy::redundant_clone,
        clippy::too_many_lines,
        clippy::float_cmp,
        clippy::similar_names,
        clippy::unreadable_literal
    )
)]
// Allow some pedantic lints for cleaner code
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::map_unwrap_or)]

pub mod dataset;
pub mod distribution;
pub mod error;
pub mod metric;
pub mod metrics;
pub mod report;
pub mod widgets;

// Re-exports for convenience
// Re-export arrow types commonly needed
pub use arrow::{
    array::RecordBatch,
    datatypes::{Schema, SchemaRef},
};
pub use dataset::{ArrowDataset, DatasetRole};
pub use distribution::{Distribution, DEFAULT_BINS};
pub use error::{Error, Result};
pub use metric::{ComputedMetric, InputData, Metric, MetricResult, ResultSchema};
pub use metrics::{
    ColumnValueListMetric, ColumnValueListResult, ColumnValueRangeMetric, ColumnValueRangeResult,
    DatasetMissingValuesMetric, DatasetMissingValuesResult, MissingValuesStat, ValuesInListStat,
    ValuesInRangeStat,
};
pub use report::{IncludeOptions, Report};
pub use widgets::{CounterData, HistogramSeries, TabData, WidgetInfo};
