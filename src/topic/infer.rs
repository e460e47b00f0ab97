//! Per-document variational E-step.
//!
//! With the topics frozen, each document's topic-mixture posterior
//! `q(θ) = Dir(γ)` is found by iterating
//!
//! ```text
//! γ_k ← α + exp(E[log θ_k]) · Σ_n exp(E[log β_{k,w_n}]) / φnorm_n
//! φnorm_n = Σ_k exp(E[log θ_k]) · exp(E[log β_{k,w_n}])
//! ```
//!
//! until the mean absolute change in γ drops below the tolerance. The
//! per-token responsibilities `φ_{k,n}` are the sufficient statistics the
//! M-step scatters back into λ.
//!
//! # References
//!
//! - Hoffman, Blei & Bach (2010). Online Learning for Latent Dirichlet
//!   Allocation. NIPS. Algorithm 2.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Gamma};
use tracing::trace;

use super::config::InferOptions;
use crate::error::{LdaError, Result};
use crate::primitives::Matrix;
use crate::special::dirichlet_expectation;

/// Shape of the Gamma draw that warm-starts γ.
pub const GAMMA_INIT_SHAPE: f64 = 100.0;
/// Scale of the Gamma draw that warm-starts γ (mean 1, small variance).
pub const GAMMA_INIT_SCALE: f64 = 0.01;

// exp(E[log β]) can underflow for words a topic never emits
const NORM_FLOOR: f64 = 1e-100;

/// Outcome of one document's E-step.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    /// Variational Dirichlet parameters of the topic mixture (length K)
    pub gamma: Vec<f64>,
    /// Per-token topic responsibilities (K × |document|), when requested
    pub stats: Option<Matrix<f64>>,
    /// Fixed-point iterations actually run
    pub iterations: usize,
    /// Whether the tolerance was met before the iteration cap
    pub converged: bool,
}

/// Read-only view of the topics that a batch of E-steps runs against.
///
/// Holds `exp(E[log β])` by shared reference: the owning model cannot be
/// updated while a snapshot is alive, so every document in a batch sees the
/// same topics.
#[derive(Debug, Clone, Copy)]
pub struct TopicSnapshot<'a> {
    exp_elog_beta: &'a Matrix<f64>,
    alpha: f64,
}

/// One unit of batch work: a document and the seed for its γ warm start.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DocJob<'d> {
    pub(crate) document: &'d [usize],
    pub(crate) seed: u64,
}

/// Fixed arguments shared by every job of a batch.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InferRequest {
    pub(crate) options: InferOptions,
    pub(crate) with_stats: bool,
}

impl<'a> TopicSnapshot<'a> {
    pub(crate) fn new(exp_elog_beta: &'a Matrix<f64>, alpha: f64) -> Self {
        Self {
            exp_elog_beta,
            alpha,
        }
    }

    /// Number of topics.
    #[must_use]
    pub fn n_topics(&self) -> usize {
        self.exp_elog_beta.n_rows()
    }

    /// Vocabulary size.
    #[must_use]
    pub fn n_vocab(&self) -> usize {
        self.exp_elog_beta.n_cols()
    }

    /// Fail on the first token outside the vocabulary.
    ///
    /// # Errors
    ///
    /// Returns [`LdaError::TokenOutOfRange`].
    pub fn check_document(&self, document: &[usize]) -> Result<()> {
        let n_vocab = self.n_vocab();
        match document.iter().find(|&&token| token >= n_vocab) {
            Some(&token) => Err(LdaError::TokenOutOfRange { token, n_vocab }),
            None => Ok(()),
        }
    }

    /// E-step with γ warm-started from a generator seeded with `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`LdaError::TokenOutOfRange`] for a token `>= n_vocab`.
    pub fn infer_seeded(
        &self,
        document: &[usize],
        seed: u64,
        with_stats: bool,
        options: &InferOptions,
    ) -> Result<Inference> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.infer_with_rng(document, &mut rng, with_stats, options)
    }

    /// E-step for one document.
    ///
    /// Running out of iterations is not an error: the latest γ is returned
    /// with `converged == false`.
    ///
    /// # Errors
    ///
    /// Returns [`LdaError::TokenOutOfRange`] for a token `>= n_vocab`.
    pub fn infer_with_rng<R: Rng + ?Sized>(
        &self,
        document: &[usize],
        rng: &mut R,
        with_stats: bool,
        options: &InferOptions,
    ) -> Result<Inference> {
        self.check_document(document)?;

        let n_topics = self.n_topics();
        let beta_doc = self.exp_elog_beta.select_columns(document);

        let mut gamma = initial_gamma(n_topics, rng)?;
        let mut exp_theta = exp_dirichlet_expectation(&gamma);
        let mut norm = token_norms(&exp_theta, &beta_doc);

        let mut iterations = 0;
        let mut converged = false;
        while iterations < options.max_iter {
            iterations += 1;

            let gamma_new: Vec<f64> = (0..n_topics)
                .map(|k| {
                    let weighted: f64 = beta_doc
                        .row(k)
                        .iter()
                        .zip(&norm)
                        .map(|(b, n)| b / n)
                        .sum();
                    self.alpha + exp_theta[k] * weighted
                })
                .collect();

            let delta = mean_abs_diff(&gamma_new, &gamma);
            gamma = gamma_new;
            exp_theta = exp_dirichlet_expectation(&gamma);
            norm = token_norms(&exp_theta, &beta_doc);

            if delta < options.tol {
                converged = true;
                break;
            }
        }

        if !converged {
            trace!(
                iterations,
                tokens = document.len(),
                "E-step stopped at iteration cap"
            );
        }

        // φ is built from the final γ, so it matches the returned γ even at the cap
        let stats = with_stats.then(|| responsibilities(&beta_doc, &exp_theta, &norm));
        Ok(Inference {
            gamma,
            stats,
            iterations,
            converged,
        })
    }
}

/// Batch entry point shaped for [`BoundCall`](crate::dispatch::BoundCall).
pub(crate) fn infer_job(
    snapshot: &TopicSnapshot<'_>,
    job: DocJob<'_>,
    request: &InferRequest,
) -> Result<Inference> {
    snapshot.infer_seeded(job.document, job.seed, request.with_stats, &request.options)
}

/// Draw `n` values from Gamma(100, 0.01).
pub(crate) fn initial_gamma<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<Vec<f64>> {
    let dist = Gamma::new(GAMMA_INIT_SHAPE, GAMMA_INIT_SCALE)
        .map_err(|e| LdaError::Sampling(e.to_string()))?;
    Ok((0..n).map(|_| dist.sample(rng)).collect())
}

fn exp_dirichlet_expectation(gamma: &[f64]) -> Vec<f64> {
    dirichlet_expectation(gamma)
        .into_iter()
        .map(f64::exp)
        .collect()
}

fn token_norms(exp_theta: &[f64], beta_doc: &Matrix<f64>) -> Vec<f64> {
    let mut norm = vec![0.0; beta_doc.n_cols()];
    for (k, &weight) in exp_theta.iter().enumerate() {
        for (acc, &b) in norm.iter_mut().zip(beta_doc.row(k)) {
            *acc += weight * b;
        }
    }
    for value in &mut norm {
        *value = value.max(NORM_FLOOR);
    }
    norm
}

fn responsibilities(beta_doc: &Matrix<f64>, exp_theta: &[f64], norm: &[f64]) -> Matrix<f64> {
    let mut phi = beta_doc.clone();
    for (k, &weight) in exp_theta.iter().enumerate() {
        for (value, &n) in phi.row_mut(k).iter_mut().zip(norm) {
            *value = *value * weight / n;
        }
    }
    phi
}

fn mean_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let total: f64 = a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum();
    total / a.len() as f64
}
