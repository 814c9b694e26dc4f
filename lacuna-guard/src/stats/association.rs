//! Bivariate association statistics: Pearson's r and Eta (η).
//!
//! Pearson covers numeric–numeric pairs; Eta covers numeric–categorical
//! pairs via one-way ANOVA, converting the F statistic into an
//! association-strength measure (η² = F / (F + df_within), η = √η²).

use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

use crate::stats::{finite_outcome, StatError, StatResult, TestOutcome};

/// Computes Pearson's r over paired observations, with a two-sided p-value
/// from the t transform `t = r·√((n−2)/(1−r²))`.
///
/// Requires at least 3 pairs. Zero variance on either side is degenerate.
pub fn pearson(pairs: &[(f64, f64)]) -> StatResult<TestOutcome> {
    let n = pairs.len();
    if n < 3 {
        return Err(StatError::insufficient(format!(
            "Pearson needs at least 3 pairs, got {n}"
        )));
    }

    let nf = n as f64;
    let (mut sum_x, mut sum_y, mut sum_x2, mut sum_y2, mut sum_xy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        sum_x += x;
        sum_y += y;
        sum_x2 += x * x;
        sum_y2 += y * y;
        sum_xy += x * y;
    }

    let numerator = nf * sum_xy - sum_x * sum_y;
    let denominator =
        ((nf * sum_x2 - sum_x * sum_x) * (nf * sum_y2 - sum_y * sum_y)).sqrt();
    if denominator == 0.0 {
        return Err(StatError::degenerate("zero variance in one of the columns"));
    }

    // Floating-point noise can push |r| marginally past 1.
    let r = (numerator / denominator).clamp(-1.0, 1.0);
    if !r.is_finite() {
        return Err(StatError::Undefined);
    }

    let df = nf - 2.0;
    let p_value = if 1.0 - r * r <= f64::EPSILON {
        // Perfect linear relationship.
        0.0
    } else {
        let t = r * (df / (1.0 - r * r)).sqrt();
        let dist = StudentsT::new(0.0, 1.0, df)
            .map_err(|_| StatError::degenerate("invalid degrees of freedom"))?;
        2.0 * (1.0 - dist.cdf(t.abs()))
    };

    finite_outcome(r, p_value)
}

/// Computes Eta (η) for a numeric variable grouped by category.
///
/// `groups` holds the numeric values of each category; at least two
/// non-empty groups and one within-group degree of freedom are required.
/// The returned statistic is η; the p-value comes from the underlying
/// one-way ANOVA F test.
pub fn eta(groups: &[Vec<f64>]) -> StatResult<TestOutcome> {
    let populated: Vec<&Vec<f64>> = groups.iter().filter(|g| !g.is_empty()).collect();
    let k = populated.len();
    if k < 2 {
        return Err(StatError::degenerate(format!(
            "Eta needs at least 2 populated categories, got {k}"
        )));
    }

    let n: usize = populated.iter().map(|g| g.len()).sum();
    let df_between = (k - 1) as f64;
    let df_within = n as f64 - k as f64;
    if df_within < 1.0 {
        return Err(StatError::insufficient(
            "not enough observations for within-group variance",
        ));
    }

    let grand_mean = populated.iter().flat_map(|g| g.iter()).sum::<f64>() / n as f64;
    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for group in &populated {
        let mean = group.iter().sum::<f64>() / group.len() as f64;
        ss_between += group.len() as f64 * (mean - grand_mean) * (mean - grand_mean);
        ss_within += group.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>();
    }
    if ss_within <= 0.0 {
        return Err(StatError::degenerate("no within-group variance"));
    }

    let f_stat = (ss_between / df_between) / (ss_within / df_within);
    let eta_squared = f_stat / (f_stat + df_within);
    let eta = eta_squared.sqrt();

    let dist = FisherSnedecor::new(df_between, df_within)
        .map_err(|_| StatError::degenerate("invalid degrees of freedom"))?;
    let p_value = 1.0 - dist.cdf(f_stat);

    finite_outcome(eta, p_value)
}
