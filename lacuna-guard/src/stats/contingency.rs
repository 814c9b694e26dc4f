//! Contingency tables, the chi-square test of independence, and Cramér's V.

use std::collections::BTreeMap;

use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::stats::{StatError, StatResult, TestOutcome};

/// A two-way frequency table built from paired categorical observations.
///
/// Row and column labels are kept in sorted order so the table layout is
/// deterministic regardless of input order.
#[derive(Debug, Clone, PartialEq)]
pub struct ContingencyTable {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    counts: Vec<Vec<u64>>,
    total: u64,
}

impl ContingencyTable {
    /// Builds a table from `(row_label, col_label)` pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut cells: BTreeMap<(String, String), u64> = BTreeMap::new();
        let mut rows: BTreeMap<String, ()> = BTreeMap::new();
        let mut cols: BTreeMap<String, ()> = BTreeMap::new();
        let mut total = 0u64;

        for (row, col) in pairs {
            *cells.entry((row.to_string(), col.to_string())).or_insert(0) += 1;
            rows.entry(row.to_string()).or_insert(());
            cols.entry(col.to_string()).or_insert(());
            total += 1;
        }

        let row_labels: Vec<String> = rows.into_keys().collect();
        let col_labels: Vec<String> = cols.into_keys().collect();
        let counts = row_labels
            .iter()
            .map(|r| {
                col_labels
                    .iter()
                    .map(|c| {
                        cells
                            .get(&(r.clone(), c.clone()))
                            .copied()
                            .unwrap_or(0)
                    })
                    .collect()
            })
            .collect();

        Self {
            row_labels,
            col_labels,
            counts,
            total,
        }
    }

    /// Number of distinct row categories.
    pub fn num_rows(&self) -> usize {
        self.row_labels.len()
    }

    /// Number of distinct column categories.
    pub fn num_cols(&self) -> usize {
        self.col_labels.len()
    }

    /// Total observation count.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// True when both dimensions have at least two populated categories.
    pub fn is_at_least_2x2(&self) -> bool {
        self.num_rows() >= 2 && self.num_cols() >= 2
    }

    fn row_totals(&self) -> Vec<u64> {
        self.counts.iter().map(|r| r.iter().sum()).collect()
    }

    fn col_totals(&self) -> Vec<u64> {
        (0..self.num_cols())
            .map(|c| self.counts.iter().map(|r| r[c]).sum())
            .collect()
    }
}

/// A chi-square statistic with its degrees of freedom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquareOutcome {
    /// The χ² statistic.
    pub statistic: f64,
    /// P-value from the chi-square distribution.
    pub p_value: f64,
    /// Degrees of freedom, `(rows − 1)·(cols − 1)`.
    pub dof: usize,
}

/// Pearson's chi-square test of independence over a contingency table.
pub fn chi_square(table: &ContingencyTable) -> StatResult<ChiSquareOutcome> {
    if !table.is_at_least_2x2() {
        return Err(StatError::degenerate(format!(
            "contingency table is {}x{}, need at least 2x2",
            table.num_rows(),
            table.num_cols()
        )));
    }
    if table.total() == 0 {
        return Err(StatError::insufficient("empty contingency table"));
    }

    let n = table.total() as f64;
    let row_totals = table.row_totals();
    let col_totals = table.col_totals();

    let mut statistic = 0.0;
    for (i, row) in table.counts.iter().enumerate() {
        for (j, &observed) in row.iter().enumerate() {
            let expected = row_totals[i] as f64 * col_totals[j] as f64 / n;
            if expected <= 0.0 {
                return Err(StatError::degenerate("zero expected cell count"));
            }
            let diff = observed as f64 - expected;
            statistic += diff * diff / expected;
        }
    }

    let dof = (table.num_rows() - 1) * (table.num_cols() - 1);
    let dist = ChiSquared::new(dof as f64)
        .map_err(|_| StatError::degenerate("invalid degrees of freedom"))?;
    let p_value = 1.0 - dist.cdf(statistic);

    if !statistic.is_finite() || !p_value.is_finite() {
        return Err(StatError::Undefined);
    }
    Ok(ChiSquareOutcome {
        statistic,
        p_value: p_value.clamp(0.0, 1.0),
        dof,
    })
}

/// Cramér's V association strength: `V = √(χ² / (n · (min(rows, cols) − 1)))`.
///
/// The p-value is the chi-square test's p-value.
pub fn cramers_v(table: &ContingencyTable) -> StatResult<TestOutcome> {
    let chi = chi_square(table)?;
    let min_dim = table.num_rows().min(table.num_cols()) - 1;
    if min_dim == 0 {
        return Err(StatError::degenerate("collapsed contingency table"));
    }
    let v = (chi.statistic / (table.total() as f64 * min_dim as f64)).sqrt();
    crate::stats::finite_outcome(v, chi.p_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dependent_pairs() -> Vec<(&'static str, &'static str)> {
        // Near-perfect association: a maps to x, b maps to y.
        let mut pairs = Vec::new();
        for _ in 0..20 {
            pairs.push(("a", "x"));
            pairs.push(("b", "y"));
        }
        pairs.push(("a", "y"));
        pairs
    }

    fn independent_pairs() -> Vec<(&'static str, &'static str)> {
        let mut pairs = Vec::new();
        for _ in 0..10 {
            pairs.push(("a", "x"));
            pairs.push(("a", "y"));
            pairs.push(("b", "x"));
            pairs.push(("b", "y"));
        }
        pairs
    }

    #[test]
    fn test_table_shape() {
        let table = ContingencyTable::from_pairs(dependent_pairs());
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.num_cols(), 2);
        assert_eq!(table.total(), 41);
        assert!(table.is_at_least_2x2());
    }

    #[test]
    fn test_chi_square_detects_dependence() {
        let table = ContingencyTable::from_pairs(dependent_pairs());
        let outcome = chi_square(&table).unwrap();
        assert_eq!(outcome.dof, 1);
        assert!(outcome.statistic > 10.0);
        assert!(outcome.p_value < 0.001);
    }

    #[test]
    fn test_chi_square_independent_table() {
        let table = ContingencyTable::from_pairs(independent_pairs());
        let outcome = chi_square(&table).unwrap();
        assert!(outcome.statistic < 0.01);
        assert!(outcome.p_value > 0.9);
    }

    #[test]
    fn test_cramers_v_strength() {
        let strong = cramers_v(&ContingencyTable::from_pairs(dependent_pairs())).unwrap();
        assert!(strong.statistic > 0.9);

        let weak = cramers_v(&ContingencyTable::from_pairs(independent_pairs())).unwrap();
        assert!(weak.statistic < 0.1);
    }

    #[test]
    fn test_single_category_is_degenerate() {
        let table = ContingencyTable::from_pairs(vec![("a", "x"), ("a", "y"), ("a", "x")]);
        assert!(!table.is_at_least_2x2());
        assert!(matches!(chi_square(&table), Err(StatError::Degenerate(_))));
    }
}
