//! Tabular dataset snapshot backed by Apache Arrow.
//!
//! A [`Dataset`] wraps a single `RecordBatch`: ordered, named columns where a
//! missing value is an Arrow null. The ingestion layer is expected to have
//! already applied the missing-value convention (sentinel tokens replaced
//! with nulls) before the snapshot reaches this crate.

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, StringArray, UInt32Array, UInt64Array,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use crate::error::DatasetError;

/// An immutable, in-memory tabular snapshot.
#[derive(Debug, Clone)]
pub struct Dataset {
    batch: RecordBatch,
}

impl Dataset {
    /// Wraps a record batch as a dataset snapshot.
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Number of rows in the snapshot.
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Number of columns in the snapshot.
    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// Column names in dataset order.
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    /// The Arrow storage type of a column.
    pub fn data_type(&self, name: &str) -> Option<&DataType> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .find(|f| f.name() == name)
            .map(|f| f.data_type())
    }

    /// The column's storage type rendered as a string tag.
    pub fn storage_type(&self, name: &str) -> Option<String> {
        self.data_type(name).map(|dt| dt.to_string())
    }

    /// Number of missing (null) values in a column.
    pub fn missing_count(&self, name: &str) -> Option<u64> {
        self.column(name).map(|c| c.null_count() as u64)
    }

    /// Total missing values across all columns.
    pub fn total_missing(&self) -> u64 {
        self.batch
            .columns()
            .iter()
            .map(|c| c.null_count() as u64)
            .sum()
    }

    /// True if any column contains a missing value.
    pub fn has_missing(&self) -> bool {
        self.batch.columns().iter().any(|c| c.null_count() > 0)
    }

    /// Per-row missingness indicator for a column: `true` where the value is
    /// missing.
    pub fn missing_indicator(&self, name: &str) -> Result<Vec<bool>, DatasetError> {
        let column = self
            .column(name)
            .ok_or_else(|| DatasetError::unknown_column(name))?;
        Ok((0..column.len()).map(|i| column.is_null(i)).collect())
    }

    /// Reads a column as numeric values, `None` where missing.
    ///
    /// Supports the numeric Arrow types the analysis dispatch can encounter;
    /// anything else is an [`DatasetError::UnsupportedType`].
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>, DatasetError> {
        let column = self
            .column(name)
            .ok_or_else(|| DatasetError::unknown_column(name))?;

        macro_rules! extract {
            ($array_ty:ty) => {
                if let Some(arr) = column.as_any().downcast_ref::<$array_ty>() {
                    return Ok((0..arr.len())
                        .map(|i| {
                            if arr.is_null(i) {
                                None
                            } else {
                                Some(arr.value(i) as f64)
                            }
                        })
                        .collect());
                }
            };
        }

        extract!(Float64Array);
        extract!(Float32Array);
        extract!(Int64Array);
        extract!(Int32Array);
        extract!(UInt64Array);
        extract!(UInt32Array);

        Err(DatasetError::unsupported_type(
            name,
            column.data_type().to_string(),
        ))
    }

    /// Reads a column as categorical labels, `None` where missing.
    ///
    /// String columns are read directly; booleans become `"true"`/`"false"`;
    /// numeric storage is rendered through `Display` so a numeric column that
    /// was manually retyped as categorical still groups by value.
    pub fn categorical_values(&self, name: &str) -> Result<Vec<Option<String>>, DatasetError> {
        let column = self
            .column(name)
            .ok_or_else(|| DatasetError::unknown_column(name))?;

        if let Some(arr) = column.as_any().downcast_ref::<StringArray>() {
            return Ok((0..arr.len())
                .map(|i| {
                    if arr.is_null(i) {
                        None
                    } else {
                        Some(arr.value(i).to_string())
                    }
                })
                .collect());
        }
        if let Some(arr) = column.as_any().downcast_ref::<LargeStringArray>() {
            return Ok((0..arr.len())
                .map(|i| {
                    if arr.is_null(i) {
                        None
                    } else {
                        Some(arr.value(i).to_string())
                    }
                })
                .collect());
        }
        if let Some(arr) = column.as_any().downcast_ref::<BooleanArray>() {
            return Ok((0..arr.len())
                .map(|i| {
                    if arr.is_null(i) {
                        None
                    } else {
                        Some(arr.value(i).to_string())
                    }
                })
                .collect());
        }
        if column.data_type().is_numeric() {
            return Ok(self
                .numeric_values(name)?
                .into_iter()
                .map(|v| v.map(|x| x.to_string()))
                .collect());
        }

        Err(DatasetError::unsupported_type(
            name,
            column.data_type().to_string(),
        ))
    }
}
