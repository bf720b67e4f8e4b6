//! Report assembly and serialization.
//!
//! A [`Report`] bundles metrics, runs them against a current dataset
//! and an optional reference dataset, and serializes the collected
//! results to a JSON mapping. Heavyweight result fields are dropped
//! from output by default; [`IncludeOptions`] adds them back per
//! metric.
//!
//! # Example
//!
//! ```no_run
//! use medir::{ArrowDataset, ColumnValueRangeMetric, Report};
//!
//! let current = ArrowDataset::from_csv("current.csv").unwrap();
//! let reference = ArrowDataset::from_csv("reference.csv").unwrap();
//!
//! let mut report = Report::new().with_metric(ColumnValueRangeMetric::new("age"));
//! report.run(&current, Some(&reference)).unwrap();
//!
//! println!("{}", report.to_json().unwrap());
//! ```

use std::{
    collections::{HashMap, HashSet},
    fmt,
    path::Path,
};

use serde_json::{json, Value};

use crate::{
    dataset::ArrowDataset,
    error::{Error, Result},
    metric::{ComputedMetric, ErasedMetric, InputData, Metric},
};

/// Per-metric field inclusion overrides for report serialization.
///
/// Overrides are additive: they surface fields a result type excludes
/// by default, addressed by metric name. Fields that serialize by
/// default are unaffected.
#[derive(Debug, Clone, Default)]
pub struct IncludeOptions {
    fields: HashMap<String, HashSet<String>>,
}

impl IncludeOptions {
    /// Creates empty options that keep every default exclusion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Surfaces the named fields for one metric.
    ///
    /// The field names apply at any nesting depth of that metric's
    /// result.
    #[must_use]
    pub fn with_fields(mut self, metric_name: impl Into<String>, fields: &[&str]) -> Self {
        self.fields
            .entry(metric_name.into())
            .or_default()
            .extend(fields.iter().map(|field| (*field).to_string()));
        self
    }

    /// Returns the fields surfaced for a metric, if any.
    pub fn fields_for(&self, metric_name: &str) -> Option<&HashSet<String>> {
        self.fields.get(metric_name)
    }

    /// Returns true if no overrides were configured.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// An ordered collection of metrics and their computed results.
///
/// Build a report with [`Report::with_metric`], execute it with
/// [`Report::run`], then read results back through [`Report::results`]
/// or serialize them with the `to_*` methods.
pub struct Report {
    name: Option<String>,
    metrics: Vec<Box<dyn ErasedMetric>>,
    results: Option<Vec<ComputedMetric>>,
}

impl Report {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self {
            name: None,
            metrics: Vec::new(),
            results: None,
        }
    }

    /// Adds a metric to the report.
    #[must_use]
    pub fn with_metric<M>(mut self, metric: M) -> Self
    where
        M: Metric + Send + Sync + 'static,
    {
        self.metrics.push(Box::new(metric));
        self
    }

    /// Sets a display name included in serialized output.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Runs every metric in order against the given datasets.
    ///
    /// Previously computed results are discarded first. Execution stops
    /// at the first failing metric, leaving the report without results.
    ///
    /// # Errors
    ///
    /// Returns the first metric error encountered.
    pub fn run(
        &mut self,
        current: &ArrowDataset,
        reference: Option<&ArrowDataset>,
    ) -> Result<()> {
        self.results = None;

        let data = InputData::new(current, reference);
        let mut results = Vec::with_capacity(self.metrics.len());

        for metric in &self.metrics {
            log::debug!("running metric {}", metric.name());
            results.push(metric.run(&data)?);
        }

        self.results = Some(results);
        Ok(())
    }

    /// The computed results, in metric order.
    ///
    /// Empty until [`Report::run`] has succeeded.
    pub fn results(&self) -> &[ComputedMetric] {
        self.results.as_deref().unwrap_or(&[])
    }

    /// Names of the metrics in this report, in execution order.
    pub fn metric_names(&self) -> Vec<&'static str> {
        self.metrics.iter().map(|metric| metric.name()).collect()
    }

    /// Number of metrics in the report.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Returns true if the report holds no metrics.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Serializes the results to a JSON value with default field
    /// exclusions applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotComputed`] if the report has not been run.
    pub fn to_value(&self) -> Result<Value> {
        self.to_value_with(&IncludeOptions::new())
    }

    /// Serializes the results to a JSON value, surfacing the fields
    /// named in `include`.
    ///
    /// The output maps `"metrics"` to a list of
    /// `{"metric": name, "result": {...}}` entries in metric order. A
    /// `"name"` key is present when the report has a display name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotComputed`] if the report has not been run.
    pub fn to_value_with(&self, include: &IncludeOptions) -> Result<Value> {
        let results = self.results.as_ref().ok_or(Error::NotComputed)?;

        let metrics: Vec<Value> = results
            .iter()
            .map(|computed| {
                json!({
                    "metric": computed.name(),
                    "result": computed.filtered_value(include.fields_for(computed.name())),
                })
            })
            .collect();

        let mut report = serde_json::Map::new();
        if let Some(name) = &self.name {
            report.insert("name".to_string(), Value::String(name.clone()));
        }
        report.insert("metrics".to_string(), Value::Array(metrics));

        Ok(Value::Object(report))
    }

    /// Serializes the results to a compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotComputed`] if the report has not been run.
    pub fn to_json(&self) -> Result<String> {
        self.to_json_with(&IncludeOptions::new())
    }

    /// Serializes the results to a compact JSON string, surfacing the
    /// fields named in `include`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotComputed`] if the report has not been run.
    pub fn to_json_with(&self, include: &IncludeOptions) -> Result<String> {
        let value = self.to_value_with(include)?;
        Ok(serde_json::to_string(&value)?)
    }

    /// Writes the results to a file as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotComputed`] if the report has not been run,
    /// or an I/O error if the file cannot be written.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let value = self.to_value()?;
        let contents = serde_json::to_string_pretty(&value)?;
        std::fs::write(path, contents).map_err(|e| Error::io(e, path))?;

        log::debug!("saved report to {}", path.display());
        Ok(())
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Report")
            .field("name", &self.name)
            .field("metrics", &self.metric_names())
            .field("computed", &self.results.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;
    use serde_json::json;

    use super::*;
    use crate::metric::{MetricResult, ResultSchema};

    fn sample_dataset() -> ArrowDataset {
        ArrowDataset::from_csv_str("x\n1\n2\n3\n").expect("dataset")
    }

    #[derive(Serialize)]
    struct CountResult {
        rows: usize,
        series: Vec<u64>,
    }

    static COUNT_SCHEMA: ResultSchema = ResultSchema::new(&["series"], &[]);

    impl MetricResult for CountResult {
        fn schema() -> &'static ResultSchema {
            &COUNT_SCHEMA
        }
    }

    struct CountMetric;

    impl Metric for CountMetric {
        type Output = CountResult;

        fn name(&self) -> &'static str {
            "CountMetric"
        }

        fn calculate(&self, data: &InputData<'_>) -> Result<Self::Output> {
            Ok(CountResult {
                rows: data.current().len(),
                series: vec![7, 8],
            })
        }
    }

    struct FailingMetric;

    impl Metric for FailingMetric {
        type Output = CountResult;

        fn name(&self) -> &'static str {
            "FailingMetric"
        }

        fn calculate(&self, _data: &InputData<'_>) -> Result<Self::Output> {
            Err(Error::missing_reference("always fails"))
        }
    }

    // ========== Builder tests ==========

    #[test]
    fn test_builder_collects_metrics() {
        let report = Report::new()
            .with_metric(CountMetric)
            .with_metric(CountMetric);

        assert_eq!(report.len(), 2);
        assert!(!report.is_empty());
        assert_eq!(report.metric_names(), vec!["CountMetric", "CountMetric"]);
    }

    #[test]
    fn test_empty_report() {
        let report = Report::new();
        assert!(report.is_empty());
        assert!(report.results().is_empty());
    }

    // ========== Run tests ==========

    #[test]
    fn test_serialize_before_run_fails() {
        let report = Report::new().with_metric(CountMetric);
        assert!(matches!(report.to_value(), Err(Error::NotComputed)));
        assert!(matches!(report.to_json(), Err(Error::NotComputed)));
    }

    #[test]
    fn test_run_collects_results_in_order() {
        let current = sample_dataset();
        let mut report = Report::new().with_metric(CountMetric);

        report.run(&current, None).expect("run");

        assert_eq!(report.results().len(), 1);
        assert_eq!(report.results()[0].name(), "CountMetric");
    }

    #[test]
    fn test_failed_run_discards_previous_results() {
        let current = sample_dataset();

        let mut report = Report::new().with_metric(CountMetric);
        report.run(&current, None).expect("first run");
        assert_eq!(report.results().len(), 1);

        let mut report = report.with_metric(FailingMetric);
        assert!(report.run(&current, None).is_err());

        assert!(report.results().is_empty());
        assert!(matches!(report.to_value(), Err(Error::NotComputed)));
    }

    // ========== Serialization tests ==========

    #[test]
    fn test_to_value_shape() {
        let current = sample_dataset();
        let mut report = Report::new().with_metric(CountMetric);
        report.run(&current, None).expect("run");

        let value = report.to_value().expect("value");
        assert_eq!(
            value,
            json!({"metrics": [{"metric": "CountMetric", "result": {"rows": 3}}]})
        );
    }

    #[test]
    fn test_name_key_only_when_set() {
        let current = sample_dataset();

        let mut unnamed = Report::new().with_metric(CountMetric);
        unnamed.run(&current, None).expect("run");
        assert!(unnamed.to_value().expect("value").get("name").is_none());

        let mut named = Report::new()
            .with_name("data quality")
            .with_metric(CountMetric);
        named.run(&current, None).expect("run");
        assert_eq!(
            named.to_value().expect("value")["name"],
            json!("data quality")
        );
    }

    #[test]
    fn test_include_surfaces_excluded_field() {
        let current = sample_dataset();
        let mut report = Report::new().with_metric(CountMetric);
        report.run(&current, None).expect("run");

        let include = IncludeOptions::new().with_fields("CountMetric", &["series"]);
        let value = report.to_value_with(&include).expect("value");

        assert_eq!(
            value["metrics"][0]["result"],
            json!({"rows": 3, "series": [7, 8]})
        );
    }

    #[test]
    fn test_include_addresses_metrics_by_name() {
        let current = sample_dataset();
        let mut report = Report::new().with_metric(CountMetric);
        report.run(&current, None).expect("run");

        let include = IncludeOptions::new().with_fields("OtherMetric", &["series"]);
        let value = report.to_value_with(&include).expect("value");

        assert_eq!(value["metrics"][0]["result"], json!({"rows": 3}));
    }

    #[test]
    fn test_json_agrees_with_value() {
        let current = sample_dataset();
        let mut report = Report::new().with_metric(CountMetric);
        report.run(&current, None).expect("run");

        let from_string: Value =
            serde_json::from_str(&report.to_json().expect("json")).expect("parse");
        assert_eq!(from_string, report.to_value().expect("value"));
    }

    #[test]
    fn test_save_json_writes_file() {
        let current = sample_dataset();
        let mut report = Report::new().with_metric(CountMetric);
        report.run(&current, None).expect("run");

        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("report.json");
        report.save_json(&path).expect("save");

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(written, report.to_value().expect("value"));
    }

    // ========== IncludeOptions tests ==========

    #[test]
    fn test_include_options_accumulate() {
        let include = IncludeOptions::new()
            .with_fields("A", &["x"])
            .with_fields("A", &["y"])
            .with_fields("B", &["z"]);

        let fields = include.fields_for("A").expect("fields");
        assert!(fields.contains("x"));
        assert!(fields.contains("y"));
        assert!(include.fields_for("C").is_none());
        assert!(!include.is_empty());
    }
}
