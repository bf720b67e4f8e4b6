//! Built-in metrics.
//!
//! Each metric lives in its own module and is re-exported here
//! together with its result types.

pub mod missing_values;
pub mod value_list;
pub mod value_range;

pub use missing_values::{
    DatasetMissingValuesMetric, DatasetMissingValuesResult, MissingValuesStat,
};
pub use value_list::{ColumnValueListMetric, ColumnValueListResult, ValuesInListStat};
pub use value_range::{ColumnValueRangeMetric, ColumnValueRangeResult, ValuesInRangeStat};

/// Round to three decimal places, used for percentage readouts.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
