//! Per-feature state: identity, semantic type, missingness statistics, and
//! the cached analysis results derived from them.
//!
//! A [`FeatureRecord`] caches three type-sensitive computations (association
//! list, informative-missingness verdict, recommendation). The invalidation
//! rules keep them consistent: changing the semantic type clears all three,
//! and any change to correlations or informative missingness clears the
//! recommendation, so a cached recommendation is never stale relative to the
//! statistics it was derived from.

use std::str::FromStr;

use arrow::datatypes::DataType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LacunaError;
use crate::features::association::{Association, CorrelationThresholds};
use crate::features::recommend::Recommendation;

/// The analysis-level type of a feature, driving association-test dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticType {
    /// Interval/ratio data; participates in Pearson and Eta tests.
    Numeric,
    /// Nominal/ordinal labels; participates in Cramér's V and Eta tests.
    Categorical,
}

impl SemanticType {
    /// Single-letter code used by external callers ("N"/"C").
    pub fn code(&self) -> &'static str {
        match self {
            SemanticType::Numeric => "N",
            SemanticType::Categorical => "C",
        }
    }

    /// Auto-detects the semantic type from an Arrow storage type.
    ///
    /// Integer, unsigned, and float storage is Numeric. Everything else —
    /// strings, booleans, temporal types — is Categorical: booleans are
    /// two-level factors, and no test in the dispatch table consumes
    /// temporal order.
    pub fn detect(storage: &DataType) -> Self {
        if storage.is_numeric() {
            SemanticType::Numeric
        } else {
            SemanticType::Categorical
        }
    }
}

impl FromStr for SemanticType {
    type Err = LacunaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "numeric" | "numerical" => Ok(SemanticType::Numeric),
            "c" | "categorical" => Ok(SemanticType::Categorical),
            _ => Err(LacunaError::invalid_semantic_type(s)),
        }
    }
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// The informative-missingness verdict for one feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InformativeMissingness {
    /// Whether the feature's missingness predicts the analysis target.
    pub is_informative: bool,
    /// BH-corrected p-value of the indicator test.
    pub p_value: f64,
}

impl Default for InformativeMissingness {
    fn default() -> Self {
        Self {
            is_informative: false,
            p_value: 1.0,
        }
    }
}

/// Compact per-feature view for table display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSummary {
    /// Feature name.
    pub feature_name: String,
    /// Current semantic type code.
    pub semantic_type: SemanticType,
    /// Number of missing values.
    pub missing_count: u64,
    /// Percentage of rows missing, rounded to 2 decimals.
    pub missing_fraction: f64,
}

/// The stateful per-column model.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureRecord {
    name: String,
    semantic_type: SemanticType,
    storage_type: String,
    missing_count: u64,
    missing_fraction: f64,
    correlations: Vec<Association>,
    correlations_computed: bool,
    thresholds_used: Option<CorrelationThresholds>,
    informative: InformativeMissingness,
    informative_computed: bool,
    recommendation: Option<Recommendation>,
    recommendation_computed: bool,
    last_updated: DateTime<Utc>,
}

impl FeatureRecord {
    /// Creates a record for one dataset column.
    pub fn new(
        name: impl Into<String>,
        semantic_type: SemanticType,
        storage_type: impl Into<String>,
        missing_count: u64,
        missing_fraction: f64,
    ) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            storage_type: storage_type.into(),
            missing_count,
            missing_fraction,
            correlations: Vec::new(),
            correlations_computed: false,
            thresholds_used: None,
            informative: InformativeMissingness::default(),
            informative_computed: false,
            recommendation: None,
            recommendation_computed: false,
            last_updated: Utc::now(),
        }
    }

    /// Feature name, unique within a store.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current semantic type.
    pub fn semantic_type(&self) -> SemanticType {
        self.semantic_type
    }

    /// The column's native storage representation tag.
    pub fn storage_type(&self) -> &str {
        &self.storage_type
    }

    /// Number of missing values in the snapshot.
    pub fn missing_count(&self) -> u64 {
        self.missing_count
    }

    /// Percentage of rows missing (0–100, 2 decimals).
    pub fn missing_fraction(&self) -> f64 {
        self.missing_fraction
    }

    /// Cached associations, sorted by `|value|` descending.
    pub fn correlations(&self) -> &[Association] {
        &self.correlations
    }

    /// Whether an association sweep has been cached.
    pub fn correlations_computed(&self) -> bool {
        self.correlations_computed
    }

    /// The thresholds the cached associations were computed under.
    pub fn thresholds_used(&self) -> Option<&CorrelationThresholds> {
        self.thresholds_used.as_ref()
    }

    /// Cached informative-missingness verdict (default until computed).
    pub fn informative_missingness(&self) -> &InformativeMissingness {
        &self.informative
    }

    /// Whether the informative-missingness verdict has been computed.
    pub fn informative_computed(&self) -> bool {
        self.informative_computed
    }

    /// Cached recommendation, if current.
    pub fn recommendation(&self) -> Option<&Recommendation> {
        self.recommendation.as_ref()
    }

    /// Whether the cached recommendation is current.
    pub fn recommendation_computed(&self) -> bool {
        self.recommendation_computed
    }

    /// Timestamp of the last mutation.
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// The semantic type auto-detection would assign from the storage type.
    ///
    /// Uses the same tag-based heuristic as store rebuild: integer and float
    /// storage tags are Numeric, everything else Categorical.
    pub fn auto_detected_type(&self) -> SemanticType {
        let tag = self.storage_type.to_ascii_lowercase();
        if tag.starts_with("int")
            || tag.starts_with("uint")
            || tag.starts_with("float")
            || tag.starts_with("decimal")
        {
            SemanticType::Numeric
        } else {
            SemanticType::Categorical
        }
    }

    /// Whether the current type differs from the auto-detected one.
    pub fn is_manually_typed(&self) -> bool {
        self.semantic_type != self.auto_detected_type()
    }

    /// Sets the semantic type. Setting the current value is a no-op (no
    /// timestamp change); a new value clears correlations, informative
    /// missingness, and the recommendation, because every downstream
    /// computation is type-sensitive. Returns whether the type changed.
    pub fn set_semantic_type(&mut self, value: SemanticType) -> bool {
        if self.semantic_type == value {
            return false;
        }
        debug!(
            feature = %self.name,
            from = %self.semantic_type,
            to = %value,
            "Semantic type changed, clearing cached analysis"
        );
        self.semantic_type = value;
        self.correlations.clear();
        self.correlations_computed = false;
        self.thresholds_used = None;
        self.informative = InformativeMissingness::default();
        self.informative_computed = false;
        self.recommendation = None;
        self.recommendation_computed = false;
        self.touch();
        true
    }

    /// Resets the semantic type to its auto-detected value, with the same
    /// invalidation semantics as [`set_semantic_type`](Self::set_semantic_type).
    pub fn reset_to_auto_detected(&mut self) -> bool {
        self.set_semantic_type(self.auto_detected_type())
    }

    /// Caches an association sweep together with the thresholds it was
    /// computed under. Clears the recommendation.
    pub fn set_correlations(
        &mut self,
        correlations: Vec<Association>,
        thresholds: CorrelationThresholds,
    ) {
        self.correlations = correlations;
        self.correlations_computed = true;
        self.thresholds_used = Some(thresholds);
        self.recommendation = None;
        self.recommendation_computed = false;
        self.touch();
    }

    /// Drops the cached associations so the next request recomputes them.
    /// Clears the recommendation.
    pub fn clear_correlations(&mut self) {
        self.correlations.clear();
        self.correlations_computed = false;
        self.thresholds_used = None;
        self.recommendation = None;
        self.recommendation_computed = false;
        self.touch();
    }

    /// Caches the informative-missingness verdict. Clears the recommendation.
    pub fn set_informative(&mut self, verdict: InformativeMissingness) {
        self.informative = verdict;
        self.informative_computed = true;
        self.recommendation = None;
        self.recommendation_computed = false;
        self.touch();
    }

    /// Caches a recommendation.
    pub fn set_recommendation(&mut self, recommendation: Recommendation) {
        self.recommendation = Some(recommendation);
        self.recommendation_computed = true;
        self.touch();
    }

    /// True when the cached associations cannot serve a request with the
    /// given thresholds: nothing cached yet, or any per-kind threshold
    /// differs from the snapshot.
    pub fn needs_correlation_refresh(&self, thresholds: &CorrelationThresholds) -> bool {
        if !self.correlations_computed {
            return true;
        }
        self.thresholds_used.as_ref() != Some(thresholds)
    }

    /// True when the recommendation must be recomputed before use.
    pub fn needs_recommendation(&self) -> bool {
        !self.recommendation_computed
    }

    /// Compact view for table display.
    pub fn summary(&self) -> FeatureSummary {
        FeatureSummary {
            feature_name: self.name.clone(),
            semantic_type: self.semantic_type,
            missing_count: self.missing_count,
            missing_fraction: self.missing_fraction,
        }
    }

    fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}
