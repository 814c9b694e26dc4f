//! Informative-missingness scan.
//!
//! For a chosen target column, every other column with at least one missing
//! value is tested: does that column's missingness indicator predict the
//! target? Numeric targets use Welch's t-test on target values grouped by
//! the indicator; categorical targets use a chi-square test of independence
//! on the indicator × target contingency table. The collected p-values get a
//! Benjamini–Hochberg correction, and a feature is informative iff its
//! corrected p-value is rejected at the significance level.

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::dataset::Dataset;
use crate::error::{DatasetError, Result};
use crate::features::record::SemanticType;
use crate::stats::{self, ContingencyTable};

/// Default significance level for the BH rejection.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// The scan's verdict for one tested feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InformativeResult {
    /// The feature whose missingness was tested.
    pub feature: String,
    /// BH-corrected p-value.
    pub p_value: f64,
    /// Whether the corrected p-value was rejected at the significance level.
    pub is_informative: bool,
}

/// Runs the informative-missingness scan against a target column.
///
/// Returns one result per qualifying feature; an empty vector when no
/// feature qualifies (that is not an error). Fails only if the target column
/// is absent or unreadable as its declared type.
#[instrument(skip(dataset))]
pub fn informative_scan(
    dataset: &Dataset,
    target: &str,
    target_type: SemanticType,
    alpha: f64,
) -> Result<Vec<InformativeResult>> {
    if dataset.column(target).is_none() {
        return Err(DatasetError::unknown_column(target).into());
    }

    let mut tested: Vec<String> = Vec::new();
    let mut p_values: Vec<f64> = Vec::new();

    match target_type {
        SemanticType::Numeric => {
            let y = dataset.numeric_values(target)?;
            for column in dataset.column_names() {
                if column == target {
                    continue;
                }
                let Some(p) = numeric_target_p(dataset, &column, &y) else {
                    continue;
                };
                tested.push(column);
                p_values.push(p);
            }
        }
        SemanticType::Categorical => {
            let y = dataset.categorical_values(target)?;
            for column in dataset.column_names() {
                if column == target {
                    continue;
                }
                let Some(p) = categorical_target_p(dataset, &column, &y) else {
                    continue;
                };
                tested.push(column);
                p_values.push(p);
            }
        }
    }

    if tested.is_empty() {
        info!(target, "No features qualified for the informative-missingness scan");
        return Ok(Vec::new());
    }

    let corrected = stats::benjamini_hochberg(&p_values, alpha);
    let results: Vec<InformativeResult> = tested
        .into_iter()
        .zip(corrected)
        .map(|(feature, outcome)| InformativeResult {
            feature,
            p_value: outcome.corrected_p,
            is_informative: outcome.reject,
        })
        .collect();

    info!(
        target,
        tested = results.len(),
        informative = results.iter().filter(|r| r.is_informative).count(),
        "Informative-missingness scan complete"
    );
    Ok(results)
}

/// Welch's t of the numeric target grouped by the column's missingness
/// indicator. `None` when the column has no missing values, a group is too
/// small, or the p-value is not finite.
fn numeric_target_p(dataset: &Dataset, column: &str, y: &[Option<f64>]) -> Option<f64> {
    let indicator = dataset.missing_indicator(column).ok()?;
    if !indicator.iter().any(|&m| m) {
        debug!(column, "Skipping: no missing values");
        return None;
    }

    let mut present_group = Vec::new();
    let mut missing_group = Vec::new();
    for (value, &missing) in y.iter().zip(indicator.iter()) {
        if let Some(v) = value {
            if missing {
                missing_group.push(*v);
            } else {
                present_group.push(*v);
            }
        }
    }
    if present_group.len() < 2 || missing_group.len() < 2 {
        debug!(column, "Skipping: a group has fewer than 2 observations");
        return None;
    }

    match stats::welch_t(&present_group, &missing_group) {
        Ok(outcome) => Some(outcome.p_value),
        Err(err) => {
            debug!(column, error = %err, "Skipping: Welch's t not computable");
            None
        }
    }
}

/// Chi-square of independence between the column's missingness indicator and
/// the categorical target. `None` when the column has no missing values, the
/// table collapses below 2×2, or the p-value is not finite.
fn categorical_target_p(dataset: &Dataset, column: &str, y: &[Option<String>]) -> Option<f64> {
    let indicator = dataset.missing_indicator(column).ok()?;
    if !indicator.iter().any(|&m| m) {
        debug!(column, "Skipping: no missing values");
        return None;
    }

    let pairs: Vec<(&str, &str)> = y
        .iter()
        .zip(indicator.iter())
        .filter_map(|(label, &missing)| {
            label
                .as_deref()
                .map(|l| (if missing { "missing" } else { "present" }, l))
        })
        .collect();

    let table = ContingencyTable::from_pairs(pairs);
    if !table.is_at_least_2x2() {
        debug!(column, "Skipping: contingency table below 2x2");
        return None;
    }

    match stats::chi_square(&table) {
        Ok(outcome) => Some(outcome.p_value),
        Err(err) => {
            debug!(column, error = %err, "Skipping: chi-square not computable");
            None
        }
    }
}
