//! Dataset-wide missingness-mechanism classification.
//!
//! The oracle answers one question per dataset snapshot: is the missingness
//! completely random (MCAR), or does it depend on the data (MAR or MNAR)?
//! The underlying dataset-wide test sits behind the [`MechanismTest`] trait;
//! the default implementation is the Little-style pattern test in
//! [`crate::stats::mcar`]. Preconditions are checked in order and each
//! short-circuits with its own tagged verdict, so a dataset with no missing
//! values never reaches the test itself. Verdicts (success or failure) are
//! cached until [`MechanismOracle::invalidate`] is called.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::dataset::Dataset;
use crate::stats::{LittleMcar, StatResult, TestOutcome};

/// Significance level for the mechanism classification.
const MECHANISM_ALPHA: f64 = 0.05;

/// Minimum row count for the dataset-wide test to be meaningful.
const MIN_ROWS: usize = 30;

/// Classification of why data is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mechanism {
    /// Missing Completely at Random.
    Mcar,
    /// Missing at Random or Missing Not at Random; the test cannot separate
    /// the two.
    MarOrMnar,
}

impl Mechanism {
    /// Short acronym form.
    pub fn acronym(&self) -> &'static str {
        match self {
            Mechanism::Mcar => "MCAR",
            Mechanism::MarOrMnar => "MAR or MNAR",
        }
    }

    /// Parenthesized long-form explanation used in recommendation text.
    pub fn explanation(&self) -> &'static str {
        match self {
            Mechanism::Mcar => "(Missing Completely at Random)",
            Mechanism::MarOrMnar => "(Missing at Random or Missing Not at Random)",
        }
    }
}

impl std::fmt::Display for Mechanism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.acronym())
    }
}

/// The cached outcome of a mechanism evaluation.
///
/// Exactly one variant per precondition plus the success case, in the order
/// the preconditions are checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MechanismVerdict {
    /// The test ran and classified the mechanism.
    Classified {
        /// The inferred mechanism.
        mechanism: Mechanism,
        /// The underlying test statistic.
        statistic: f64,
        /// The test p-value.
        p_value: f64,
        /// Human-readable explanation of the mechanism.
        explanation: String,
    },
    /// The dataset is absent or has no rows/columns.
    NoData,
    /// The dataset contains no missing values, so there is no mechanism to
    /// classify.
    NoMissingValues,
    /// Too few rows for the test.
    InsufficientRows {
        /// Rows present.
        rows: usize,
        /// Rows required.
        required: usize,
    },
    /// The underlying test reported an error.
    TestFailure {
        /// The collaborator's error message.
        message: String,
    },
    /// The test produced a non-finite statistic or p-value.
    InvalidStatistic,
}

impl MechanismVerdict {
    /// True for the `Classified` variant.
    pub fn is_success(&self) -> bool {
        matches!(self, MechanismVerdict::Classified { .. })
    }

    /// The classified mechanism, if any.
    pub fn mechanism(&self) -> Option<Mechanism> {
        match self {
            MechanismVerdict::Classified { mechanism, .. } => Some(*mechanism),
            _ => None,
        }
    }
}

/// A dataset-wide test for completely-random missingness.
///
/// Implementations return the test statistic and p-value; the oracle owns
/// precondition checks and classification.
pub trait MechanismTest: Send + Sync {
    /// Runs the test over the full dataset.
    fn run(&self, dataset: &Dataset) -> StatResult<TestOutcome>;

    /// Human-readable test name for logging.
    fn name(&self) -> &str;
}

/// Caches the mechanism verdict for the currently loaded dataset snapshot.
///
/// The cache must be invalidated whenever the snapshot changes: a dataset
/// replacement, re-encoding, or a change to its missing-value substitutions.
pub struct MechanismOracle {
    test: Box<dyn MechanismTest>,
    verdict: Option<MechanismVerdict>,
}

impl MechanismOracle {
    /// Creates an oracle backed by the default Little-style MCAR test.
    pub fn new() -> Self {
        Self::with_test(Box::new(LittleMcar))
    }

    /// Creates an oracle backed by a custom test implementation.
    pub fn with_test(test: Box<dyn MechanismTest>) -> Self {
        Self {
            test,
            verdict: None,
        }
    }

    /// Returns the verdict for the dataset, computing and caching it on the
    /// first call.
    #[instrument(skip(self, dataset), fields(test = self.test.name()))]
    pub fn evaluate(&mut self, dataset: &Dataset) -> &MechanismVerdict {
        let verdict = match self.verdict.take() {
            Some(cached) => {
                debug!("Returning cached mechanism verdict");
                cached
            }
            None => {
                let verdict = self.classify(dataset);
                match &verdict {
                    MechanismVerdict::Classified {
                        mechanism, p_value, ..
                    } => {
                        info!(mechanism = %mechanism, p_value, "Classified missingness mechanism");
                    }
                    other => {
                        warn!(verdict = ?other, "Mechanism test did not run to a classification");
                    }
                }
                verdict
            }
        };
        self.verdict.insert(verdict)
    }

    /// The cached verdict, if one has been computed for this snapshot.
    pub fn cached(&self) -> Option<&MechanismVerdict> {
        self.verdict.as_ref()
    }

    /// Drops the cached verdict. Call whenever the dataset snapshot changes.
    pub fn invalidate(&mut self) {
        self.verdict = None;
    }

    fn classify(&self, dataset: &Dataset) -> MechanismVerdict {
        if dataset.num_rows() == 0 || dataset.num_columns() == 0 {
            return MechanismVerdict::NoData;
        }
        if !dataset.has_missing() {
            return MechanismVerdict::NoMissingValues;
        }
        let rows = dataset.num_rows();
        if rows < MIN_ROWS {
            return MechanismVerdict::InsufficientRows {
                rows,
                required: MIN_ROWS,
            };
        }

        let outcome = match self.test.run(dataset) {
            Ok(outcome) => outcome,
            Err(err) => {
                return MechanismVerdict::TestFailure {
                    message: err.to_string(),
                }
            }
        };
        if !outcome.statistic.is_finite() || !outcome.p_value.is_finite() {
            return MechanismVerdict::InvalidStatistic;
        }

        let mechanism = if outcome.p_value < MECHANISM_ALPHA {
            Mechanism::MarOrMnar
        } else {
            Mechanism::Mcar
        };
        MechanismVerdict::Classified {
            mechanism,
            statistic: outcome.statistic,
            p_value: outcome.p_value,
            explanation: mechanism.explanation().to_string(),
        }
    }
}

impl Default for MechanismOracle {
    fn default() -> Self {
        Self::new()
    }
}
