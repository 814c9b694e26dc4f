//! Statistical test primitives used by the analysis core.
//!
//! Every primitive exposes the same contract: inputs in, a
//! [`TestOutcome`] (statistic + p-value) out, with degenerate input and
//! undefined results signaled explicitly through [`StatError`]. A
//! not-a-number statistic is never coerced to zero; callers decide whether a
//! failed precondition means "skip this pair" or "record a tagged failure".

pub mod association;
pub mod contingency;
pub mod fdr;
pub mod inference;
pub mod mcar;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use association::{eta, pearson};
pub use contingency::{chi_square, cramers_v, ChiSquareOutcome, ContingencyTable};
pub use fdr::{benjamini_hochberg, BhOutcome};
pub use inference::welch_t;
pub use mcar::LittleMcar;

/// Result type for statistical primitives.
pub type StatResult<T> = std::result::Result<T, StatError>;

/// A computed test statistic with its p-value. Both are finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// The test statistic (r, V, η, t, χ², d², ...).
    pub statistic: f64,
    /// Two-sided p-value in `[0, 1]`.
    pub p_value: f64,
}

/// Why a statistical primitive could not produce a result.
///
/// These are precondition skips, not caller errors: a pair or test that hits
/// one of these is dropped from the sweep rather than surfaced as a failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatError {
    /// Fewer observations than the test requires.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The input has no variation to test (single group, zero variance,
    /// collapsed contingency table).
    #[error("Degenerate input: {0}")]
    Degenerate(String),

    /// The computation produced a non-finite statistic or p-value.
    #[error("Statistic is not a finite number")]
    Undefined,
}

impl StatError {
    /// Creates an insufficient-data error with the given message.
    pub fn insufficient(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }

    /// Creates a degenerate-input error with the given message.
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::Degenerate(msg.into())
    }
}

/// Validates that a statistic/p-value pair is finite, mapping anything else
/// to [`StatError::Undefined`].
pub(crate) fn finite_outcome(statistic: f64, p_value: f64) -> StatResult<TestOutcome> {
    if statistic.is_finite() && p_value.is_finite() {
        Ok(TestOutcome {
            statistic,
            p_value: p_value.clamp(0.0, 1.0),
        })
    } else {
        Err(StatError::Undefined)
    }
}
