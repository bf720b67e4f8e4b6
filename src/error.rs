//! Error types for medir.

use std::path::PathBuf;

use arrow::datatypes::DataType;

use crate::dataset::DatasetRole;

/// Result type alias for medir operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in medir operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        /// The path where the error occurred, if known.
        path: Option<PathBuf>,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Arrow error during data processing.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error during file operations.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Empty dataset error.
    #[error("Dataset is empty")]
    EmptyDataset,

    /// Schema mismatch between batches of a dataset.
    #[error("Schema mismatch: {message}")]
    SchemaMismatch {
        /// Description of the schema mismatch.
        message: String,
    },

    /// Column not found in the current or reference dataset.
    #[error("Column '{name}' not found in {role} data")]
    ColumnNotFound {
        /// The name of the missing column.
        name: String,
        /// Which dataset the column was looked up in.
        role: DatasetRole,
    },

    /// Column exists but does not have a numeric type.
    #[error("Column '{name}' in {role} data is not numeric (found {data_type})")]
    NotNumeric {
        /// The name of the column.
        name: String,
        /// Which dataset the column belongs to.
        role: DatasetRole,
        /// The actual Arrow data type of the column.
        data_type: String,
    },

    /// Column exists but does not have a categorical (string, integer or
    /// boolean) type.
    #[error("Column '{name}' in {role} data is not categorical (found {data_type})")]
    NotCategorical {
        /// The name of the column.
        name: String,
        /// Which dataset the column belongs to.
        role: DatasetRole,
        /// The actual Arrow data type of the column.
        data_type: String,
    },

    /// A metric needed reference data that was not supplied.
    #[error("Reference data is required: {context}")]
    MissingReference {
        /// What the reference data was needed for.
        context: String,
    },

    /// A report was serialized before being run.
    #[error("Report has not been run yet")]
    NotComputed,
}

impl Error {
    /// Create an I/O error with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            path: Some(path.into()),
            source,
        }
    }

    /// Create a schema mismatch error.
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }

    /// Create a column not found error for the given dataset role.
    pub fn column_not_found(name: impl Into<String>, role: DatasetRole) -> Self {
        Self::ColumnNotFound {
            name: name.into(),
            role,
        }
    }

    /// Create a non-numeric column error for the given dataset role.
    pub fn not_numeric(name: impl Into<String>, role: DatasetRole, data_type: &DataType) -> Self {
        Self::NotNumeric {
            name: name.into(),
            role,
            data_type: data_type.to_string(),
        }
    }

    /// Create a non-categorical column error for the given dataset role.
    pub fn not_categorical(
        name: impl Into<String>,
        role: DatasetRole,
        data_type: &DataType,
    ) -> Self {
        Self::NotCategorical {
            name: name.into(),
            role,
            data_type: data_type.to_string(),
        }
    }

    /// Create a missing reference error.
    pub fn missing_reference(context: impl Into<String>) -> Self {
        Self::MissingReference {
            context: context.into(),
        }
    }
}
