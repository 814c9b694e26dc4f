//! Error types for missing-data analysis.
//!
//! Only two error categories cross the crate boundary: invalid semantic-type
//! input (caller can fix the input) and unusable datasets at rebuild time.
//! Skipped statistical tests and collaborator failures are represented as
//! filtered results and tagged verdicts, never as `Err` values.

use thiserror::Error;

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, LacunaError>;

/// Top-level error for the analysis core.
#[derive(Error, Debug)]
pub enum LacunaError {
    /// A semantic-type string could not be parsed. The target record is left
    /// unchanged.
    #[error("Invalid semantic type {value:?}: expected \"N\", \"C\", \"numeric\", or \"categorical\"")]
    InvalidSemanticType {
        /// The rejected input.
        value: String,
    },

    /// The dataset could not be used.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

impl LacunaError {
    /// Creates an invalid-semantic-type error for the given input.
    pub fn invalid_semantic_type(value: impl Into<String>) -> Self {
        Self::InvalidSemanticType {
            value: value.into(),
        }
    }
}

/// Errors raised when a dataset snapshot cannot serve a request.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The dataset has no rows.
    #[error("Dataset has no rows")]
    Empty,

    /// Every column either failed per-column stat computation or was skipped,
    /// and at least one failed.
    #[error("No usable columns: {failed} column(s) failed, {skipped} skipped")]
    NoUsableColumns {
        /// Columns that errored during per-column computation.
        failed: usize,
        /// Columns skipped for having a null or empty name.
        skipped: usize,
    },

    /// The named column does not exist in the snapshot.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// The column's storage type cannot be read as the requested value kind.
    #[error("Unsupported storage type {storage_type} for column {column}")]
    UnsupportedType {
        /// Column name.
        column: String,
        /// Rendered Arrow data type.
        storage_type: String,
    },
}

impl DatasetError {
    /// Creates an unknown-column error.
    pub fn unknown_column(name: impl Into<String>) -> Self {
        Self::UnknownColumn(name.into())
    }

    /// Creates an unsupported-type error.
    pub fn unsupported_type(column: impl Into<String>, storage_type: impl Into<String>) -> Self {
        Self::UnsupportedType {
            column: column.into(),
            storage_type: storage_type.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_semantic_type_display() {
        let err = LacunaError::invalid_semantic_type("X");
        assert!(err.to_string().contains("\"X\""));
        assert!(err.to_string().contains("categorical"));
    }

    #[test]
    fn test_dataset_error_display() {
        let err = DatasetError::NoUsableColumns {
            failed: 3,
            skipped: 1,
        };
        assert!(err.to_string().contains("3 column(s) failed"));
        assert!(DatasetError::Empty.to_string().contains("no rows"));
    }
}
