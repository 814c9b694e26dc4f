//! Association-test dispatch between feature pairs.
//!
//! Given two features' semantic types, picks the right bivariate test:
//! Pearson's r for numeric–numeric, Eta for mixed pairs, Cramér's V for
//! categorical–categorical. A pair is scored only when both columns have
//! data, the paired sample exceeds the minimum size, and the statistic
//! clears the threshold configured for its kind.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::dataset::Dataset;
use crate::features::record::SemanticType;
use crate::stats::{self, ContingencyTable};

/// Minimum paired (non-missing in both columns) sample size; pairs at or
/// below this are skipped, not scored.
pub const MIN_PAIRED_SAMPLE: usize = 10;

/// The kind of association statistic a result carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssociationKind {
    /// Pearson's r (numeric–numeric).
    Pearson,
    /// Cramér's V (categorical–categorical).
    CramersV,
    /// Eta from one-way ANOVA (numeric–categorical).
    Eta,
}

impl AssociationKind {
    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            AssociationKind::Pearson => "Pearson",
            AssociationKind::CramersV => "Cramér's V",
            AssociationKind::Eta => "Eta",
        }
    }

    /// Conventional statistical symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            AssociationKind::Pearson => "r",
            AssociationKind::CramersV => "V",
            AssociationKind::Eta => "η",
        }
    }
}

/// One retained association between a feature and a partner column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    /// The other column in the pair.
    pub partner: String,
    /// Association strength, rounded to 3 decimals.
    pub value: f64,
    /// Which statistic produced the value.
    pub kind: AssociationKind,
    /// P-value of the underlying test.
    pub p_value: f64,
}

/// Per-kind retention thresholds for the association sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationThresholds {
    /// Minimum `|r|` for numeric–numeric pairs.
    pub pearson: f64,
    /// Minimum V for categorical–categorical pairs.
    pub cramers_v: f64,
    /// Minimum η for mixed pairs.
    pub eta: f64,
}

impl Default for CorrelationThresholds {
    fn default() -> Self {
        Self {
            pearson: 0.7,
            cramers_v: 0.7,
            eta: 0.7,
        }
    }
}

impl CorrelationThresholds {
    /// The same threshold for every kind.
    pub fn uniform(threshold: f64) -> Self {
        Self {
            pearson: threshold,
            cramers_v: threshold,
            eta: threshold,
        }
    }

    /// The threshold that applies to a given statistic kind.
    pub fn for_kind(&self, kind: AssociationKind) -> f64 {
        match kind {
            AssociationKind::Pearson => self.pearson,
            AssociationKind::CramersV => self.cramers_v,
            AssociationKind::Eta => self.eta,
        }
    }
}

/// Scores one feature pair, dispatching on the features' semantic types.
///
/// `types` is a snapshot of the store's semantic types; a feature missing
/// from it falls back to Categorical. Returns `None` when the pair is
/// skipped (precondition failure, unreadable column, NaN statistic) or the
/// statistic falls below the threshold for its kind.
pub fn correlate(
    dataset: &Dataset,
    types: &HashMap<String, SemanticType>,
    feature_a: &str,
    feature_b: &str,
    thresholds: &CorrelationThresholds,
) -> Option<Association> {
    let type_a = types
        .get(feature_a)
        .copied()
        .unwrap_or(SemanticType::Categorical);
    let type_b = types
        .get(feature_b)
        .copied()
        .unwrap_or(SemanticType::Categorical);

    let scored = match (type_a, type_b) {
        (SemanticType::Numeric, SemanticType::Numeric) => {
            numeric_pair(dataset, feature_a, feature_b)
        }
        (SemanticType::Categorical, SemanticType::Categorical) => {
            categorical_pair(dataset, feature_a, feature_b)
        }
        (SemanticType::Numeric, SemanticType::Categorical) => {
            mixed_pair(dataset, feature_a, feature_b)
        }
        (SemanticType::Categorical, SemanticType::Numeric) => {
            mixed_pair(dataset, feature_b, feature_a)
        }
    };

    let (value, kind, p_value) = scored?;
    if value.abs() < thresholds.for_kind(kind) {
        return None;
    }
    Some(Association {
        partner: feature_b.to_string(),
        value: round3(value),
        kind,
        p_value,
    })
}

/// Scores a feature against every other column, returning retained
/// associations sorted by `|value|` descending. No upper bound on length.
#[instrument(skip(dataset, types, thresholds), fields(feature = feature_name))]
pub fn correlate_all(
    dataset: &Dataset,
    types: &HashMap<String, SemanticType>,
    feature_name: &str,
    thresholds: &CorrelationThresholds,
) -> Vec<Association> {
    let mut results = Vec::new();
    for partner in dataset.column_names() {
        if partner == feature_name {
            continue;
        }
        if let Some(assoc) = correlate(dataset, types, feature_name, &partner, thresholds) {
            debug!(
                partner = %assoc.partner,
                kind = assoc.kind.name(),
                value = assoc.value,
                "Retained association"
            );
            results.push(assoc);
        }
    }
    results.sort_by(|a, b| {
        b.value
            .abs()
            .partial_cmp(&a.value.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    debug!(retained = results.len(), "Association sweep complete");
    results
}

fn numeric_pair(
    dataset: &Dataset,
    feature_a: &str,
    feature_b: &str,
) -> Option<(f64, AssociationKind, f64)> {
    let xs = readable(dataset.numeric_values(feature_a), feature_a)?;
    let ys = readable(dataset.numeric_values(feature_b), feature_b)?;
    if all_missing(&xs) || all_missing(&ys) {
        return None;
    }

    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter_map(|(x, y)| (*x).zip(*y))
        .collect();
    if pairs.len() <= MIN_PAIRED_SAMPLE {
        return None;
    }

    let outcome = stats::pearson(&pairs).ok()?;
    Some((outcome.statistic, AssociationKind::Pearson, outcome.p_value))
}

fn categorical_pair(
    dataset: &Dataset,
    feature_a: &str,
    feature_b: &str,
) -> Option<(f64, AssociationKind, f64)> {
    let xs = readable(dataset.categorical_values(feature_a), feature_a)?;
    let ys = readable(dataset.categorical_values(feature_b), feature_b)?;
    if all_missing(&xs) || all_missing(&ys) {
        return None;
    }

    let pairs: Vec<(&str, &str)> = xs
        .iter()
        .zip(ys.iter())
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some((x.as_str(), y.as_str())),
            _ => None,
        })
        .collect();
    if pairs.len() <= MIN_PAIRED_SAMPLE {
        return None;
    }

    let table = ContingencyTable::from_pairs(pairs);
    if !table.is_at_least_2x2() {
        return None;
    }
    let outcome = stats::cramers_v(&table).ok()?;
    Some((outcome.statistic, AssociationKind::CramersV, outcome.p_value))
}

/// `numeric` and `categorical` name the columns in their respective roles.
fn mixed_pair(
    dataset: &Dataset,
    numeric: &str,
    categorical: &str,
) -> Option<(f64, AssociationKind, f64)> {
    let values = readable(dataset.numeric_values(numeric), numeric)?;
    let labels = readable(dataset.categorical_values(categorical), categorical)?;
    if all_missing(&values) || all_missing(&labels) {
        return None;
    }

    let mut grouped: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    let mut paired = 0usize;
    for (value, label) in values.iter().zip(labels.iter()) {
        if let (Some(v), Some(l)) = (value, label) {
            grouped.entry(l.as_str()).or_default().push(*v);
            paired += 1;
        }
    }
    if paired <= MIN_PAIRED_SAMPLE || grouped.len() < 2 {
        return None;
    }

    let groups: Vec<Vec<f64>> = grouped.into_values().collect();
    let outcome = stats::eta(&groups).ok()?;
    Some((outcome.statistic, AssociationKind::Eta, outcome.p_value))
}

fn readable<T>(result: Result<T, crate::error::DatasetError>, column: &str) -> Option<T> {
    match result {
        Ok(values) => Some(values),
        Err(err) => {
            debug!(column, error = %err, "Skipping pair: column not readable for its semantic type");
            None
        }
    }
}

fn all_missing<T>(values: &[Option<T>]) -> bool {
    values.iter().all(|v| v.is_none())
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
