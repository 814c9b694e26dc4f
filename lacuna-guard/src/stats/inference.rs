//! Welch's unequal-variance t-test.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::stats::{finite_outcome, StatError, StatResult, TestOutcome};

/// Welch's two-sample t-test with the Welch–Satterthwaite degrees-of-freedom
/// approximation. Both groups need at least 2 observations.
pub fn welch_t(group_a: &[f64], group_b: &[f64]) -> StatResult<TestOutcome> {
    let na = group_a.len();
    let nb = group_b.len();
    if na < 2 || nb < 2 {
        return Err(StatError::insufficient(format!(
            "Welch's t needs at least 2 observations per group, got {na} and {nb}"
        )));
    }

    let mean_a = group_a.iter().sum::<f64>() / na as f64;
    let mean_b = group_b.iter().sum::<f64>() / nb as f64;
    let var_a = sample_variance(group_a, mean_a);
    let var_b = sample_variance(group_b, mean_b);

    let se_a = var_a / na as f64;
    let se_b = var_b / nb as f64;
    let pooled = se_a + se_b;
    if pooled <= 0.0 {
        return Err(StatError::degenerate("both groups have zero variance"));
    }

    let t = (mean_a - mean_b) / pooled.sqrt();
    let df = pooled * pooled
        / (se_a * se_a / (na as f64 - 1.0) + se_b * se_b / (nb as f64 - 1.0));
    if !df.is_finite() || df < 1.0 {
        return Err(StatError::degenerate("invalid degrees of freedom"));
    }

    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|_| StatError::degenerate("invalid degrees of freedom"))?;
    let p_value = 2.0 * (1.0 - dist.cdf(t.abs()));

    finite_outcome(t, p_value)
}

fn sample_variance(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (values.len() as f64 - 1.0)
}
