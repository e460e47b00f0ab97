//! Special functions for variational Dirichlet updates.
//!
//! The workhorse is the Dirichlet expectation
//! `E[log X_i] = ψ(g_i) − ψ(Σ_j g_j)` for `X ~ Dir(g)`, used by both the
//! E-step and the global update. `digamma` and `ln_gamma` come from `statrs`.
//!
//! # References
//!
//! - Blei, Ng & Jordan (2003). Latent Dirichlet Allocation. JMLR. Appendix A.1.

use crate::primitives::Matrix;

/// Digamma function ψ(x).
#[inline]
#[must_use]
pub fn digamma(x: f64) -> f64 {
    statrs::function::gamma::digamma(x)
}

/// Natural log of the gamma function.
#[inline]
#[must_use]
pub fn ln_gamma(x: f64) -> f64 {
    statrs::function::gamma::ln_gamma(x)
}

/// Expected log of a Dirichlet-distributed vector.
///
/// # Examples
///
/// ```
/// use online_lda::special::dirichlet_expectation;
///
/// // Dir(1, 1): E[log X_0] = ψ(1) − ψ(2) = −1
/// let e = dirichlet_expectation(&[1.0, 1.0]);
/// assert!((e[0] + 1.0).abs() < 1e-10);
/// ```
#[must_use]
pub fn dirichlet_expectation(params: &[f64]) -> Vec<f64> {
    let psi_total = digamma(params.iter().sum());
    params.iter().map(|&g| digamma(g) - psi_total).collect()
}

/// Row-wise [`dirichlet_expectation`] over a batch of concentration vectors.
///
/// Each row is an independent Dirichlet; the row sum's digamma is
/// subtracted from every entry of that row only.
#[must_use]
pub fn dirichlet_expectation_rows(params: &Matrix<f64>) -> Matrix<f64> {
    let mut out = params.clone();
    for r in 0..params.n_rows() {
        let expected = dirichlet_expectation(params.row(r));
        out.row_mut(r).copy_from_slice(&expected);
    }
    out
}

/// `log Σ exp(x_i)` shifted by the maximum so large magnitudes neither
/// overflow nor underflow. Returns `-inf` for an empty slice.
#[must_use]
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let total: f64 = values.iter().map(|&v| (v - max).exp()).sum();
    max + total.ln()
}
