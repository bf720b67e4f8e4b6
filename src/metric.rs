//! Core metric abstractions.
//!
//! A metric is a small computation that reads columns from an
//! [`InputData`] pair and produces a typed, serializable result. Reports
//! run metrics through a type-erased wrapper so heterogeneous metrics
//! can live in one collection, while each metric keeps a concrete
//! [`Metric::Output`] type for direct use.
//!
//! Result types declare which of their fields are excluded from report
//! serialization through a [`ResultSchema`]; heavyweight payloads such
//! as distributions stay computable without bloating report output.
//!
//! # Example
//!
//! ```ignore
//! struct RowCountMetric;
//!
//! impl Metric for RowCountMetric {
//!     type Output = RowCountResult;
//!
//!     fn name(&self) -> &'static str {
//!         "RowCountMetric"
//!     }
//!
//!     fn calculate(&self, data: &InputData<'_>) -> Result<Self::Output> {
//!         Ok(RowCountResult { rows: data.current().len() })
//!     }
//! }
//! ```

use std::collections::HashSet;

use arrow::{
    array::{Array, Float64Array, StringArray},
    compute::cast,
    datatypes::DataType,
};
use serde::Serialize;
use serde_json::Value;

use crate::{
    dataset::{is_categorical_type, is_numeric_type, ArrowDataset, DatasetRole},
    error::{Error, Result},
    widgets::WidgetInfo,
};

/// Declares which fields of a result type are excluded from report
/// serialization by default.
///
/// Schemas are built as statics and nest: a field holding another
/// result type points at that type's schema so exclusions apply at any
/// depth.
#[derive(Debug)]
pub struct ResultSchema {
    excluded: &'static [&'static str],
    nested: &'static [(&'static str, &'static ResultSchema)],
}

impl ResultSchema {
    /// Schema with no exclusions and no nested result types.
    pub const EMPTY: &'static ResultSchema = &ResultSchema {
        excluded: &[],
        nested: &[],
    };

    /// Creates a schema from excluded field names and nested schemas.
    pub const fn new(
        excluded: &'static [&'static str],
        nested: &'static [(&'static str, &'static ResultSchema)],
    ) -> Self {
        Self { excluded, nested }
    }

    /// Returns true if the field is excluded by default.
    pub fn is_excluded(&self, field: &str) -> bool {
        self.excluded.contains(&field)
    }

    /// Returns the schema governing a nested field, or
    /// [`ResultSchema::EMPTY`] if the field holds plain data.
    pub fn nested(&self, field: &str) -> &'static ResultSchema {
        self.nested
            .iter()
            .find(|(name, _)| *name == field)
            .map_or(Self::EMPTY, |(_, schema)| schema)
    }
}

/// A typed metric result.
///
/// Implementors pair a serializable result struct with the
/// [`ResultSchema`] describing its default field exclusions.
pub trait MetricResult: Serialize {
    /// The serialization schema for this result type.
    fn schema() -> &'static ResultSchema;
}

/// A computation over current and optional reference data.
pub trait Metric {
    /// Concrete result type this metric produces.
    type Output: MetricResult;

    /// Stable metric name used as the `"metric"` key in report output
    /// and as the addressing key for field-inclusion overrides.
    fn name(&self) -> &'static str;

    /// Computes the result against the given input data.
    ///
    /// # Errors
    ///
    /// Returns an error when required columns are missing, have an
    /// unsupported type, or required reference data is absent.
    fn calculate(&self, data: &InputData<'_>) -> Result<Self::Output>;

    /// Describes the visual presentation of a result as widget data.
    ///
    /// The default implementation renders nothing.
    fn render(&self, result: &Self::Output) -> Vec<WidgetInfo> {
        let _ = result;
        Vec::new()
    }
}

/// The datasets a metric computes against.
///
/// Holds the current dataset and, when a comparison baseline exists,
/// the reference dataset. Column accessors take a [`DatasetRole`] so
/// validation errors name the side they occurred on.
#[derive(Debug, Clone, Copy)]
pub struct InputData<'a> {
    current: &'a ArrowDataset,
    reference: Option<&'a ArrowDataset>,
}

impl<'a> InputData<'a> {
    /// Creates input data from a current dataset and an optional
    /// reference dataset.
    pub fn new(current: &'a ArrowDataset, reference: Option<&'a ArrowDataset>) -> Self {
        Self { current, reference }
    }

    /// The dataset under evaluation.
    pub fn current(&self) -> &'a ArrowDataset {
        self.current
    }

    /// The baseline dataset, if one was provided.
    pub fn reference(&self) -> Option<&'a ArrowDataset> {
        self.reference
    }

    /// Resolves a dataset by role.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingReference`] when the reference role is
    /// requested and no reference dataset was provided.
    pub fn dataset(&self, role: DatasetRole) -> Result<&'a ArrowDataset> {
        match role {
            DatasetRole::Current => Ok(self.current),
            DatasetRole::Reference => self
                .reference
                .ok_or_else(|| Error::missing_reference("no reference dataset was provided")),
        }
    }

    /// Extracts a numeric column as `f64` values, flattened across
    /// batches. Nulls and NaNs are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset for `role` is absent, the column
    /// does not exist, or its type is not numeric.
    pub fn numeric_column(&self, role: DatasetRole, name: &str) -> Result<Vec<f64>> {
        let dataset = self.dataset(role)?;
        let data_type = dataset
            .column_type(name)
            .ok_or_else(|| Error::column_not_found(name, role))?;

        if !is_numeric_type(&data_type) {
            return Err(Error::not_numeric(name, role, &data_type));
        }

        let mut values = Vec::new();
        for batch in dataset.batches() {
            if let Some(column) = batch.column_by_name(name) {
                let casted = cast(column, &DataType::Float64)?;
                if let Some(floats) = casted.as_any().downcast_ref::<Float64Array>() {
                    for i in 0..floats.len() {
                        if floats.is_valid(i) && !floats.value(i).is_nan() {
                            values.push(floats.value(i));
                        }
                    }
                }
            }
        }

        Ok(values)
    }

    /// Extracts a categorical column as string renderings, flattened
    /// across batches. Nulls are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset for `role` is absent, the column
    /// does not exist, or its type is not categorical.
    pub fn string_column(&self, role: DatasetRole, name: &str) -> Result<Vec<String>> {
        let dataset = self.dataset(role)?;
        let data_type = dataset
            .column_type(name)
            .ok_or_else(|| Error::column_not_found(name, role))?;

        if !is_categorical_type(&data_type) {
            return Err(Error::not_categorical(name, role, &data_type));
        }

        let mut values = Vec::new();
        for batch in dataset.batches() {
            if let Some(column) = batch.column_by_name(name) {
                let casted = cast(column, &DataType::Utf8)?;
                if let Some(strings) = casted.as_any().downcast_ref::<StringArray>() {
                    for i in 0..strings.len() {
                        if strings.is_valid(i) {
                            values.push(strings.value(i).to_string());
                        }
                    }
                }
            }
        }

        Ok(values)
    }
}

/// The output of one metric after a report run.
///
/// Holds the raw result as a JSON value alongside the widgets the
/// metric rendered and the schema used to filter report output.
#[derive(Debug, Clone)]
pub struct ComputedMetric {
    name: String,
    value: Value,
    widgets: Vec<WidgetInfo>,
    schema: &'static ResultSchema,
}

impl ComputedMetric {
    /// The metric's stable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full result value with no fields removed.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Widgets describing the result's visual presentation.
    pub fn widgets(&self) -> &[WidgetInfo] {
        &self.widgets
    }

    /// The result with default-excluded fields removed, except those
    /// named in `include`.
    pub(crate) fn filtered_value(&self, include: Option<&HashSet<String>>) -> Value {
        filter_result(&self.value, self.schema, include)
    }
}

/// Object-safe metric wrapper used by reports.
pub(crate) trait ErasedMetric: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(&self, data: &InputData<'_>) -> Result<ComputedMetric>;
}

impl<M: Metric + Send + Sync> ErasedMetric for M {
    fn name(&self) -> &'static str {
        Metric::name(self)
    }

    fn run(&self, data: &InputData<'_>) -> Result<ComputedMetric> {
        let output = self.calculate(data)?;
        let widgets = self.render(&output);
        let value = serde_json::to_value(&output)?;

        Ok(ComputedMetric {
            name: Metric::name(self).to_string(),
            value,
            widgets,
            schema: M::Output::schema(),
        })
    }
}

/// Removes default-excluded fields from a result value.
///
/// Fields named in `include` survive exclusion at any nesting depth.
/// Arrays are filtered element-wise under the same schema.
fn filter_result(value: &Value, schema: &ResultSchema, include: Option<&HashSet<String>>) -> Value {
    match value {
        Value::Object(map) => {
            let mut filtered = serde_json::Map::new();
            for (key, field_value) in map {
                let keep =
                    !schema.is_excluded(key) || include.is_some_and(|fields| fields.contains(key));
                if keep {
                    filtered.insert(
                        key.clone(),
                        filter_result(field_value, schema.nested(key), include),
                    );
                }
            }
            Value::Object(filtered)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| filter_result(item, schema, include))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use arrow::{
        array::{Float64Array, Int64Array, RecordBatch, StringArray},
        datatypes::{Field, Schema},
    };
    use serde_json::json;

    use super::*;

    fn sample_dataset() -> ArrowDataset {
        let schema = std::sync::Arc::new(Schema::new(vec![
            Field::new("age", DataType::Int64, true),
            Field::new("score", DataType::Float64, true),
            Field::new("city", DataType::Utf8, true),
        ]));

        let batch = RecordBatch::try_new(
            schema,
            vec![
                std::sync::Arc::new(Int64Array::from(vec![Some(25), None, Some(40)])),
                std::sync::Arc::new(Float64Array::from(vec![
                    Some(1.0),
                    Some(f64::NAN),
                    Some(3.0),
                ])),
                std::sync::Arc::new(StringArray::from(vec![Some("oslo"), Some("lima"), None])),
            ],
        )
        .expect("batch");

        ArrowDataset::from_batch(batch).expect("dataset")
    }

    // ========== ResultSchema tests ==========

    static NESTED_SCHEMA: ResultSchema = ResultSchema::new(&["secret"], &[]);
    static TOP_SCHEMA: ResultSchema =
        ResultSchema::new(&["heavy"], &[("inner", &NESTED_SCHEMA)]);

    #[test]
    fn test_schema_exclusion() {
        assert!(TOP_SCHEMA.is_excluded("heavy"));
        assert!(!TOP_SCHEMA.is_excluded("light"));
    }

    #[test]
    fn test_schema_nesting() {
        assert!(TOP_SCHEMA.nested("inner").is_excluded("secret"));
        assert!(!TOP_SCHEMA.nested("unknown").is_excluded("secret"));
    }

    // ========== Field filtering tests ==========

    #[test]
    fn test_filter_drops_excluded_fields() {
        let value = json!({"kept": 1, "heavy": [1, 2, 3]});
        let filtered = filter_result(&value, &TOP_SCHEMA, None);
        assert_eq!(filtered, json!({"kept": 1}));
    }

    #[test]
    fn test_filter_include_restores_field() {
        let value = json!({"kept": 1, "heavy": [1, 2, 3]});
        let include: HashSet<String> = ["heavy".to_string()].into();

        let filtered = filter_result(&value, &TOP_SCHEMA, Some(&include));
        assert_eq!(filtered, value);
    }

    #[test]
    fn test_filter_applies_to_nested_objects() {
        let value = json!({"inner": {"visible": true, "secret": "x"}});
        let filtered = filter_result(&value, &TOP_SCHEMA, None);
        assert_eq!(filtered, json!({"inner": {"visible": true}}));
    }

    #[test]
    fn test_filter_include_reaches_nested_fields() {
        let value = json!({"inner": {"visible": true, "secret": "x"}});
        let include: HashSet<String> = ["secret".to_string()].into();

        let filtered = filter_result(&value, &TOP_SCHEMA, Some(&include));
        assert_eq!(filtered, value);
    }

    #[test]
    fn test_filter_maps_arrays_elementwise() {
        let value = json!({"inner": [{"secret": 1, "ok": 2}, {"ok": 3}]});
        let filtered = filter_result(&value, &TOP_SCHEMA, None);
        assert_eq!(filtered, json!({"inner": [{"ok": 2}, {"ok": 3}]}));
    }

    // ========== InputData tests ==========

    #[test]
    fn test_dataset_by_role() {
        let current = sample_dataset();
        let data = InputData::new(&current, None);

        assert!(data.dataset(DatasetRole::Current).is_ok());
        assert!(matches!(
            data.dataset(DatasetRole::Reference),
            Err(Error::MissingReference { .. })
        ));
    }

    #[test]
    fn test_numeric_column_skips_nulls_and_nans() {
        let current = sample_dataset();
        let data = InputData::new(&current, None);

        let ages = data
            .numeric_column(DatasetRole::Current, "age")
            .expect("ages");
        assert_eq!(ages, vec![25.0, 40.0]);

        let scores = data
            .numeric_column(DatasetRole::Current, "score")
            .expect("scores");
        assert_eq!(scores, vec![1.0, 3.0]);
    }

    #[test]
    fn test_numeric_column_missing() {
        let current = sample_dataset();
        let data = InputData::new(&current, None);

        let err = data
            .numeric_column(DatasetRole::Current, "unknown")
            .expect_err("should fail");
        assert_eq!(
            err.to_string(),
            "Column 'unknown' not found in current data"
        );
    }

    #[test]
    fn test_numeric_column_wrong_type() {
        let current = sample_dataset();
        let data = InputData::new(&current, None);

        let err = data
            .numeric_column(DatasetRole::Current, "city")
            .expect_err("should fail");
        assert!(matches!(err, Error::NotNumeric { .. }));
        assert!(err.to_string().contains("current"));
    }

    #[test]
    fn test_numeric_column_reference_role_in_error() {
        let current = sample_dataset();
        let reference = sample_dataset();
        let data = InputData::new(&current, Some(&reference));

        let err = data
            .numeric_column(DatasetRole::Reference, "unknown")
            .expect_err("should fail");
        assert!(err.to_string().contains("reference"));
    }

    #[test]
    fn test_string_column_drops_nulls() {
        let current = sample_dataset();
        let data = InputData::new(&current, None);

        let cities = data
            .string_column(DatasetRole::Current, "city")
            .expect("cities");
        assert_eq!(cities, vec!["oslo".to_string(), "lima".to_string()]);
    }

    #[test]
    fn test_string_column_renders_integers() {
        let current = sample_dataset();
        let data = InputData::new(&current, None);

        let ages = data
            .string_column(DatasetRole::Current, "age")
            .expect("ages");
        assert_eq!(ages, vec!["25".to_string(), "40".to_string()]);
    }

    #[test]
    fn test_string_column_rejects_floats() {
        let current = sample_dataset();
        let data = InputData::new(&current, None);

        let err = data
            .string_column(DatasetRole::Current, "score")
            .expect_err("should fail");
        assert!(matches!(err, Error::NotCategorical { .. }));
    }

    // ========== Erased metric tests ==========

    #[derive(Serialize)]
    struct MockResult {
        rows: usize,
        heavy: Vec<u64>,
    }

    static MOCK_SCHEMA: ResultSchema = ResultSchema::new(&["heavy"], &[]);

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

        fn calculate(&self, data: &InputData<'_>) -> Result<Self::Output> {
            Ok(MockResult {
                rows: data.current().len(),
                heavy: vec![1, 2, 3],
            })
        }
    }

    #[test]
    fn test_erased_run_keeps_raw_value() {
        let current = sample_dataset();
        let data = InputData::new(&current, None);

        let computed = ErasedMetric::run(&MockMetric, &data).expect("computed");

        assert_eq!(computed.name(), "MockMetric");
        assert_eq!(computed.value(), &json!({"rows": 3, "heavy": [1, 2, 3]}));
        assert!(computed.widgets().is_empty());
    }

    #[test]
    fn test_erased_run_filters_on_demand() {
        let current = sample_dataset();
        let data = InputData::new(&current, None);

        let computed = ErasedMetric::run(&MockMetric, &data).expect("computed");

        assert_eq!(computed.filtered_value(None), json!({"rows": 3}));

        let include: HashSet<String> = ["heavy".to_string()].into();
        assert_eq!(
            computed.filtered_value(Some(&include)),
            json!({"rows": 3, "heavy": [1, 2, 3]})
        );
    }
}
