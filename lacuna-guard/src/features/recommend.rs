//! Recommendation rule engine.
//!
//! Turns a feature's cached statistics (plus the dataset-level mechanism
//! verdict) into a treatment recommendation by applying five ordered rules,
//! first match wins:
//!
//! 1. Informative missingness → missing-indicator method.
//! 2. Strong correlation with complete features → remove the feature.
//! 3. Categorical feature → create an "unknown" category.
//! 4. MAR/MNAR mechanism → ML methods or multiple imputation.
//! 5. MCAR mechanism → all standard methods are valid.
//!
//! When no rule fires, a conservative fallback equivalent to rule 4 is
//! returned, tagged as such. The engine is a total function: it never fails
//! past this boundary, so recommendation computation can never crash a
//! caller. Reason text is authored for the plural case; the aggregator
//! singularizes it for one-feature groups.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::features::record::{FeatureRecord, SemanticType};
use crate::mechanism::Mechanism;

/// The treatment a feature's missing data should receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendationKind {
    /// Add a binary missing-indicator column alongside the feature.
    MissingIndicator,
    /// Drop the feature; it is reconstructable from correlated complete
    /// features.
    RemoveFeatures,
    /// Replace missing values with an explicit "unknown" category.
    UnknownCategory,
    /// Use models that handle missing data directly, or multiple imputation.
    DirectModelsOrImputation,
    /// Any standard treatment is statistically valid.
    AllMethodsValid,
}

impl RecommendationKind {
    /// The full recommendation text shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            RecommendationKind::MissingIndicator => "Missing-indicator method",
            RecommendationKind::RemoveFeatures => "Remove Features",
            RecommendationKind::UnknownCategory => {
                "Create an 'unknown' category or consider adjusting the categories"
            }
            RecommendationKind::DirectModelsOrImputation => {
                "Machine learning algorithms that can directly handle missing data or multiple imputation"
            }
            RecommendationKind::AllMethodsValid => {
                "All methods are valid: complete case analysis, machine learning algorithms that can directly handle missing data, multiple imputation, etc."
            }
        }
    }
}

impl std::fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A computed recommendation for one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// The recommended treatment.
    pub kind: RecommendationKind,
    /// Why the rule fired, written for the plural case.
    pub reason: String,
    /// Which rule (1–5) produced this; the fallback reports 4.
    pub rule_applied: u8,
    /// True when no rule fired and the conservative fallback was used.
    pub fallback: bool,
}

/// Applies the ordered rules to a feature. Pure and total: the same inputs
/// always produce the same `rule_applied`, and there is no failure path.
pub fn recommend(feature: &FeatureRecord, mechanism: Option<Mechanism>) -> Recommendation {
    // Rule 1: informative missingness (highest priority).
    if feature.informative_computed() && feature.informative_missingness().is_informative {
        debug!(feature = feature.name(), rule = 1, "Informative missingness");
        return Recommendation {
            kind: RecommendationKind::MissingIndicator,
            reason: "These numerical features likely have informative missingness.".to_string(),
            rule_applied: 1,
            fallback: false,
        };
    }

    // Rule 2: strongly correlated with complete features.
    if feature.correlations_computed() && !feature.correlations().is_empty() {
        debug!(feature = feature.name(), rule = 2, "Strong correlation");
        return Recommendation {
            kind: RecommendationKind::RemoveFeatures,
            reason: "These features with missing data are strongly correlated with features \
                     with complete data. Missing values can be predicted from correlated \
                     features, making removal viable."
                .to_string(),
            rule_applied: 2,
            fallback: false,
        };
    }

    // Rule 3: categorical, nothing informative, nothing correlated.
    if feature.semantic_type() == SemanticType::Categorical {
        debug!(feature = feature.name(), rule = 3, "Categorical feature");
        return Recommendation {
            kind: RecommendationKind::UnknownCategory,
            reason: "An 'unknown' category can replace missing data for categorical features. \
                     If it is an ordinal feature, also consider adjusting the categories"
                .to_string(),
            rule_applied: 3,
            fallback: false,
        };
    }

    // Rules 4 and 5: dataset-level mechanism.
    match mechanism {
        Some(Mechanism::MarOrMnar) => {
            debug!(feature = feature.name(), rule = 4, "MAR/MNAR mechanism");
            Recommendation {
                kind: RecommendationKind::DirectModelsOrImputation,
                reason: format!(
                    "Since your data is {}, imputing missing data with mean, median, or mode \
                     will likely introduce bias. Consider the alternatives instead.",
                    Mechanism::MarOrMnar.explanation()
                ),
                rule_applied: 4,
                fallback: false,
            }
        }
        Some(Mechanism::Mcar) => {
            debug!(feature = feature.name(), rule = 5, "MCAR mechanism");
            Recommendation {
                kind: RecommendationKind::AllMethodsValid,
                reason: format!(
                    "Since your data is {}, all missing data treatment methods are valid.",
                    Mechanism::Mcar.explanation()
                ),
                rule_applied: 5,
                fallback: false,
            }
        }
        None => fallback_recommendation(feature),
    }
}

/// Conservative fallback when the mechanism is unknown and rules 1–3 did not
/// apply: equivalent to rule 4, with a reason adapted to the feature's
/// semantic type.
fn fallback_recommendation(feature: &FeatureRecord) -> Recommendation {
    debug!(feature = feature.name(), "No rule fired, using fallback");
    let mut reason = "Dataset missing data mechanism could not be determined.".to_string();
    match feature.semantic_type() {
        SemanticType::Categorical => {
            reason.push_str(
                " For categorical features, consider creating an 'unknown' category or using \
                 advanced imputation methods.",
            );
        }
        SemanticType::Numeric => {
            reason.push_str(
                " For numerical features, advanced methods like machine learning algorithms \
                 or multiple imputation are recommended.",
            );
        }
    }
    Recommendation {
        kind: RecommendationKind::DirectModelsOrImputation,
        reason,
        rule_applied: 4,
        fallback: true,
    }
}
