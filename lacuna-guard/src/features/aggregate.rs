//! Recommendation aggregation for report surfaces.
//!
//! Per-feature recommendations are grouped by kind so a report shows one
//! entry per treatment with the list of affected features, instead of one
//! row per feature. Groups are ordered by rule number, and reason text is
//! singularized when a group holds exactly one feature.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::features::recommend::{Recommendation, RecommendationKind};

/// One treatment with every feature it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationGroup {
    /// The shared treatment.
    pub kind: RecommendationKind,
    /// Features receiving this treatment, in first-seen order.
    pub features: Vec<String>,
    /// Reason text, grammar-adjusted to the group size.
    pub reason: String,
    /// Rule number of the group's first feature.
    pub rule_applied: u8,
}

/// Groups per-feature recommendations by kind.
///
/// Within a group, features keep their input order; groups are sorted by
/// the rule number of their first feature, so higher-priority treatments
/// lead the report.
pub fn aggregate(recommendations: &[(String, Recommendation)]) -> Vec<RecommendationGroup> {
    let mut order: Vec<RecommendationKind> = Vec::new();
    let mut by_kind: HashMap<RecommendationKind, RecommendationGroup> = HashMap::new();

    for (feature, rec) in recommendations {
        let group = by_kind.entry(rec.kind).or_insert_with(|| {
            order.push(rec.kind);
            RecommendationGroup {
                kind: rec.kind,
                features: Vec::new(),
                reason: rec.reason.clone(),
                rule_applied: rec.rule_applied,
            }
        });
        group.features.push(feature.clone());
    }

    let mut groups: Vec<RecommendationGroup> = order
        .into_iter()
        .filter_map(|kind| by_kind.remove(&kind))
        .collect();
    groups.sort_by_key(|g| g.rule_applied);

    for group in &mut groups {
        group.reason = adjust_reason_grammar(&group.reason, group.features.len());
    }
    debug!(groups = groups.len(), "Aggregated recommendations");
    groups
}

/// Rewrites a plural-case reason into singular form when the group holds a
/// single feature, and guarantees the text ends with a period either way.
///
/// Replacement order matters: longer sentence-level rewrites run before the
/// short phrase fallbacks so a sentence already handled is not mangled by a
/// later substring swap.
fn adjust_reason_grammar(reason: &str, count: usize) -> String {
    if count != 1 {
        return ensure_period(reason);
    }

    const REWRITES: &[(&str, &str)] = &[
        (
            "These numerical features likely have informative missingness.",
            "This numerical feature likely has informative missingness.",
        ),
        (
            "These features with missing data are strongly correlated with features with complete data. Missing values can be predicted from correlated features, making removal viable.",
            "This feature with missing data is strongly correlated with features with complete data. Missing values can be predicted from correlated features, making removal viable.",
        ),
        (
            "An 'unknown' category can replace missing data for categorical features. If it is an ordinal feature, also consider adjusting the categories",
            "An 'unknown' category can replace missing data for this categorical feature. If it is an ordinal feature, also consider adjusting the categories",
        ),
        ("categorical features", "this categorical feature"),
        (
            "For categorical features, consider creating",
            "For this categorical feature, consider creating",
        ),
        (
            "For numerical features, advanced methods",
            "For this numerical feature, advanced methods",
        ),
        ("These features", "This feature"),
        ("these features", "this feature"),
        ("numerical features", "this numerical feature"),
        ("are strongly correlated", "is strongly correlated"),
        ("have informative", "has informative"),
    ];

    let mut adjusted = reason.to_string();
    for (plural, singular) in REWRITES {
        if adjusted.contains(plural) {
            adjusted = adjusted.replace(plural, singular);
        }
    }
    ensure_period(&adjusted)
}

fn ensure_period(text: &str) -> String {
    let trimmed = text.trim_end();
    if trimmed.ends_with('.') {
        trimmed.to_string()
    } else {
        format!("{trimmed}.")
    }
}
