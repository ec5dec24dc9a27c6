//! Weighted projection onto the budgeted box `{0 <= x_i <= 1, sum x_i <= k}`.
//!
//! Row `i` contributes `delta_prime[i]^2 * (x_i - y_prime[i] / delta_prime[i])^2`
//! to the objective. The per-row minimizers are clipped linear functions of
//! the budget multiplier `z`, so the optimum is found by sweeping the sorted
//! breakpoints of `sum x_i(z)` and interpolating inside the segment where the
//! budget becomes tight.

use nalgebra::{DMatrix, DVector};

/// Euclidean norm of every row of `delta`.
pub fn row_norms(delta: &DMatrix<f64>) -> DVector<f64> {
    DVector::from_iterator(delta.nrows(), delta.row_iter().map(|r| r.norm()))
}

/// Project onto the budgeted box. Zero-norm rows (and any NaN) map to 0.
pub fn project_onto_budget(
    delta_prime: &DVector<f64>,
    y_prime: &DVector<f64>,
    k: f64,
) -> DVector<f64> {
    let n = delta_prime.len();
    let mu: Vec<f64> = (0..2 * n)
        .map(|i| {
            let r = i % n;
            let upper = 2.0 * y_prime[r] * delta_prime[r];
            if i < n {
                upper
            } else {
                upper - 2.0 * delta_prime[r] * delta_prime[r]
            }
        })
        .collect();

    let mut order: Vec<usize> = (0..2 * n).collect();
    order.sort_by(|&a, &b| mu[b].total_cmp(&mu[a]));

    // slope: d(sum x)/d(-z) on the current segment; used: sum x at the
    // breakpoint just passed
    let mut slope = 0.0;
    let mut used = 0.0;
    let mut z = 0.0;

    for (pos, &idx) in order.iter().enumerate() {
        let here = mu[idx];
        if used > k {
            z = if slope > 0.0 {
                (here + (used - k) / slope).max(0.0)
            } else {
                here.max(0.0)
            };
            break;
        }
        if here < 0.0 {
            break;
        }

        let r = idx % n;
        if delta_prime[r] > 0.0 {
            let inv = 1.0 / (2.0 * delta_prime[r] * delta_prime[r]);
            if idx < n {
                slope += inv;
            } else {
                slope -= inv;
            }
        }
        match order.get(pos + 1) {
            Some(&next) if slope != 0.0 => used += slope * (here - mu[next]),
            _ => {}
        }
    }

    DVector::from_iterator(
        n,
        (0..n).map(|i| {
            let dp = delta_prime[i];
            if dp <= 0.0 {
                return 0.0;
            }
            let x = ((2.0 * dp * y_prime[i] - z) / (2.0 * dp * dp)).clamp(0.0, 1.0);
            if x.is_nan() {
                0.0
            } else {
                x
            }
        }),
    )
}
