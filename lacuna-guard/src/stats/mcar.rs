//! Little-style MCAR test over missingness patterns.
//!
//! Rows are grouped by their missingness pattern across the numeric columns.
//! For each pattern, the observed-variable means are compared against the
//! available-case grand means, standardized by the available-case variances:
//!
//! `d² = Σ_patterns Σ_{j observed} n_p · (ȳ_pj − μ̂_j)² / σ̂²_j`
//!
//! Under MCAR, d² is approximately chi-square with
//! `Σ_patterns |observed(p)| − #columns` degrees of freedom. This is the
//! diagonal approximation of Little's test; the full EM-covariance version
//! can be swapped in through the `MechanismTest` seam without touching the
//! oracle.

use std::collections::BTreeMap;

use statrs::distribution::{ChiSquared, ContinuousCDF};
use tracing::debug;

use crate::dataset::Dataset;
use crate::mechanism::MechanismTest;
use crate::stats::{StatError, StatResult, TestOutcome};

/// The default dataset-wide randomness test.
#[derive(Debug, Clone, Copy, Default)]
pub struct LittleMcar;

impl MechanismTest for LittleMcar {
    fn run(&self, dataset: &Dataset) -> StatResult<TestOutcome> {
        let columns = numeric_columns(dataset)?;
        if columns.is_empty() {
            return Err(StatError::insufficient(
                "no numeric columns with variance to test",
            ));
        }

        let n_rows = dataset.num_rows();
        let n_vars = columns.len();

        // Available-case mean and variance per column.
        let mut grand_means = Vec::with_capacity(n_vars);
        let mut variances = Vec::with_capacity(n_vars);
        for (_, values) in &columns {
            let present: Vec<f64> = values.iter().filter_map(|v| *v).collect();
            let mean = present.iter().sum::<f64>() / present.len() as f64;
            let var = present.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>()
                / (present.len() as f64 - 1.0);
            grand_means.push(mean);
            variances.push(var);
        }

        // Group rows by missingness pattern across the numeric columns.
        let mut patterns: BTreeMap<Vec<bool>, Vec<usize>> = BTreeMap::new();
        for row in 0..n_rows {
            let pattern: Vec<bool> = columns.iter().map(|(_, v)| v[row].is_some()).collect();
            patterns.entry(pattern).or_default().push(row);
        }
        debug!(
            patterns = patterns.len(),
            variables = n_vars,
            "Grouped rows by missingness pattern"
        );

        let mut d_squared = 0.0;
        let mut observed_var_sum = 0usize;
        for (pattern, rows) in &patterns {
            let n_p = rows.len() as f64;
            for (j, observed) in pattern.iter().enumerate() {
                if !observed {
                    continue;
                }
                observed_var_sum += 1;
                let mean_pj = rows
                    .iter()
                    .filter_map(|&row| columns[j].1[row])
                    .sum::<f64>()
                    / n_p;
                let diff = mean_pj - grand_means[j];
                d_squared += n_p * diff * diff / variances[j];
            }
        }

        let dof = observed_var_sum as i64 - n_vars as i64;
        if dof < 1 {
            return Err(StatError::degenerate(
                "only one missingness pattern across numeric columns",
            ));
        }

        let dist = ChiSquared::new(dof as f64)
            .map_err(|_| StatError::degenerate("invalid degrees of freedom"))?;
        let p_value = 1.0 - dist.cdf(d_squared);
        crate::stats::finite_outcome(d_squared, p_value)
    }

    fn name(&self) -> &str {
        "little-mcar"
    }
}

/// Numeric columns with at least 2 observed values and non-zero variance.
fn numeric_columns(dataset: &Dataset) -> StatResult<Vec<(String, Vec<Option<f64>>)>> {
    let mut columns = Vec::new();
    for name in dataset.column_names() {
        let Some(data_type) = dataset.data_type(&name) else {
            continue;
        };
        if !data_type.is_numeric() {
            continue;
        }
        let values = dataset
            .numeric_values(&name)
            .map_err(|e| StatError::degenerate(e.to_string()))?;
        let present: Vec<f64> = values.iter().filter_map(|v| *v).collect();
        if present.len() < 2 {
            continue;
        }
        let mean = present.iter().sum::<f64>() / present.len() as f64;
        let var = present.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>();
        if var <= 0.0 {
            continue;
        }
        columns.push((name, values));
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Float64Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    fn build(xs: Vec<Option<f64>>, ys: Vec<Option<f64>>) -> Dataset {
        let schema = Arc::new(Schema::new(vec![
            Field::new("x", DataType::Float64, true),
            Field::new("y", DataType::Float64, true),
        ]));
        Dataset::new(
            RecordBatch::try_new(
                schema,
                vec![
                    Arc::new(Float64Array::from(xs)),
                    Arc::new(Float64Array::from(ys)),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_random_missingness_high_p() {
        // y missing on a scattered subset unrelated to x.
        let n = 60;
        let xs: Vec<Option<f64>> = (0..n).map(|i| Some((i % 7) as f64)).collect();
        let ys: Vec<Option<f64>> = (0..n)
            .map(|i| {
                if i % 6 == 0 {
                    None
                } else {
                    Some(((i * 13) % 11) as f64)
                }
            })
            .collect();
        let outcome = LittleMcar.run(&build(xs, ys)).unwrap();
        assert!(outcome.p_value > 0.05, "p = {}", outcome.p_value);
    }

    #[test]
    fn test_systematic_missingness_low_p() {
        // y is missing exactly where x is large.
        let n = 80;
        let xs: Vec<Option<f64>> = (0..n).map(|i| Some(i as f64)).collect();
        let ys: Vec<Option<f64>> = (0..n)
            .map(|i| if i >= n / 2 { None } else { Some((i % 5) as f64) })
            .collect();
        let outcome = LittleMcar.run(&build(xs, ys)).unwrap();
        assert!(outcome.p_value < 0.01, "p = {}", outcome.p_value);
    }

    #[test]
    fn test_single_pattern_is_degenerate() {
        let xs: Vec<Option<f64>> = (0..40).map(|i| Some(i as f64)).collect();
        let ys: Vec<Option<f64>> = (0..40).map(|i| Some((i * 2) as f64)).collect();
        assert!(matches!(
            LittleMcar.run(&build(xs, ys)),
            Err(StatError::Degenerate(_))
        ));
    }
}
