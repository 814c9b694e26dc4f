//! # Lacuna Guard - Missing-Data Pattern Analysis for Rust
//!
//! Lacuna Guard analyzes the missing-data structure of a tabular dataset: it
//! profiles per-column missingness, tests whether missingness is associated
//! with other columns or with an analysis target, classifies the dataset's
//! missing-data mechanism, and turns all of that into concrete treatment
//! recommendations (drop, impute, indicator column, "unknown" category).
//!
//! ## Quick Start
//!
//! ```rust
//! use lacuna_guard::prelude::*;
//! use arrow::array::Float64Array;
//! use arrow::datatypes::{DataType, Field, Schema};
//! use arrow::record_batch::RecordBatch;
//! use std::sync::Arc;
//!
//! # fn example() -> lacuna_guard::error::Result<()> {
//! // Wrap an Arrow record batch; nulls are missing values.
//! let schema = Arc::new(Schema::new(vec![
//!     Field::new("age", DataType::Float64, true),
//!     Field::new("income", DataType::Float64, true),
//! ]));
//! let batch = RecordBatch::try_new(
//!     schema,
//!     vec![
//!         Arc::new(Float64Array::from(vec![Some(30.0), None, Some(45.0)])),
//!         Arc::new(Float64Array::from(vec![Some(50e3), Some(60e3), None])),
//!     ],
//! )
//! .unwrap();
//! let dataset = Dataset::new(batch);
//!
//! // Build per-feature records and classify the mechanism.
//! let mut store = FeatureStore::new();
//! store.rebuild(&dataset)?;
//! let mut oracle = MechanismOracle::new();
//! let verdict = oracle.evaluate(&dataset);
//! let mechanism = verdict.mechanism();
//!
//! // Recommend a treatment per feature with missing data, then group for
//! // display.
//! let recommendations = store.recommend_all(mechanism);
//! for group in aggregate(&recommendations) {
//!     println!("{}: {:?} — {}", group.kind, group.features, group.reason);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **`dataset`**: Arrow-backed snapshot with null-aware column readers
//! - **`features`**: per-column records with cached analysis state, the
//!   association sweep, the informative-missingness scan, and the
//!   recommendation engine
//! - **`mechanism`**: dataset-level MCAR/MAR-or-MNAR classification behind a
//!   pluggable test trait
//! - **`stats`**: bivariate test primitives (Pearson, Eta, Cramér's V,
//!   Welch's t, chi-square, Benjamini–Hochberg, Little-style MCAR)
//! - **`logging`**: `tracing` subscriber configuration presets
//!
//! All analysis is synchronous and in-memory; callers own ingestion,
//! persistence, and any service surface.

pub mod dataset;
pub mod error;
pub mod features;
pub mod logging;
pub mod mechanism;
pub mod prelude;
pub mod stats;
