//! Benjamini–Hochberg false-discovery-rate correction.

/// One hypothesis after BH correction, in the order the p-values were given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BhOutcome {
    /// Index into the input p-value slice.
    pub index: usize,
    /// BH-corrected p-value, monotone and clamped to `[0, 1]`.
    pub corrected_p: f64,
    /// Whether the hypothesis is rejected at the chosen significance level.
    pub reject: bool,
}

/// Applies the Benjamini–Hochberg step-up procedure.
///
/// Corrected p-values are `p·m/rank` with a running minimum applied from the
/// largest rank down, so they are monotone in the raw p-values. A hypothesis
/// is rejected iff its corrected p-value is at most `alpha`.
pub fn benjamini_hochberg(p_values: &[f64], alpha: f64) -> Vec<BhOutcome> {
    let m = p_values.len();
    if m == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| {
        p_values[a]
            .partial_cmp(&p_values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Corrected values in ascending-p order, then enforce monotonicity.
    let mut corrected_sorted: Vec<f64> = order
        .iter()
        .enumerate()
        .map(|(rank, &idx)| (p_values[idx] * m as f64 / (rank + 1) as f64).min(1.0))
        .collect();
    for rank in (0..m.saturating_sub(1)).rev() {
        if corrected_sorted[rank] > corrected_sorted[rank + 1] {
            corrected_sorted[rank] = corrected_sorted[rank + 1];
        }
    }

    let mut outcomes = vec![
        BhOutcome {
            index: 0,
            corrected_p: 1.0,
            reject: false,
        };
        m
    ];
    for (rank, &idx) in order.iter().enumerate() {
        let corrected_p = corrected_sorted[rank];
        outcomes[idx] = BhOutcome {
            index: idx,
            corrected_p,
            reject: corrected_p <= alpha,
        };
    }
    outcomes
}
