//! Approximate evidence lower bound.
//!
//! For a minibatch of B documents from a corpus of D documents:
//!
//! ```text
//! L ≈ B · ( G / D + lnΓ(Kα) − K lnΓ(α) )
//!   + Σ_d [ Σ_k lnΓ(γ_dk) − lnΓ(Σ_k γ_dk) + Σ_k (α − γ_dk) E[log θ_dk] ]
//!   + Σ_d Σ_n Σ_k φ_dnk ( E[log θ_dk] + E[log β_k,w_dn] − log φ_dnk )
//!
//! G = lnΓ(Vη) − V lnΓ(η) + Σ lnΓ(λ) − Σ_k lnΓ(Σ_v λ_kv) + Σ (η − λ) E[log β]
//! ```
//!
//! The token term normalizes φ in log space with log-sum-exp over topics, so
//! documents whose words are nearly impossible under every topic do not
//! underflow. The bound is a noisy diagnostic under minibatching; only its
//! trend over many batches is meaningful.

use super::config::InferOptions;
use super::OnlineLda;
use crate::dispatch::{BoundCall, Mapper};
use crate::error::{LdaError, Result};
use crate::primitives::Matrix;
use crate::special::{dirichlet_expectation, ln_gamma, log_sum_exp};

/// What a worker needs to score one document.
#[derive(Debug, Clone, Copy)]
struct LocalTerms<'a> {
    elog_beta: &'a Matrix<f64>,
    alpha: f64,
}

impl<M: Mapper> OnlineLda<M> {
    /// Approximate ELBO for a batch, running the E-step first.
    ///
    /// `total_docs` defaults to the batch size.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty batch, a zero `total_docs`, or an
    /// out-of-range token.
    pub fn elbo<D>(
        &mut self,
        documents: &[D],
        total_docs: Option<usize>,
        options: &InferOptions,
    ) -> Result<f64>
    where
        D: AsRef<[usize]> + Sync,
    {
        let gammas: Vec<Vec<f64>> = self
            .infer_batch(documents, false, options)?
            .into_iter()
            .map(|inf| inf.gamma)
            .collect();
        self.elbo_with_gammas(documents, &gammas, total_docs)
    }

    /// Approximate ELBO for a batch whose γ are already known.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty batch, mismatched `gammas`, a zero
    /// `total_docs`, or an out-of-range token.
    pub fn elbo_with_gammas<D>(
        &self,
        documents: &[D],
        gammas: &[Vec<f64>],
        total_docs: Option<usize>,
    ) -> Result<f64>
    where
        D: AsRef<[usize]> + Sync,
    {
        if documents.is_empty() {
            return Err(LdaError::empty_input("documents"));
        }
        if gammas.len() != documents.len() {
            return Err(LdaError::dimension_mismatch(
                "gammas",
                documents.len(),
                gammas.len(),
            ));
        }
        if let Some(gamma) = gammas.iter().find(|g| g.len() != self.n_topics()) {
            return Err(LdaError::dimension_mismatch(
                "gamma length",
                self.n_topics(),
                gamma.len(),
            ));
        }
        let total_docs = total_docs.unwrap_or(documents.len());
        if total_docs == 0 {
            return Err(LdaError::invalid_hyperparameter("total_docs", 0, "> 0"));
        }
        let snapshot = self.snapshot();
        for document in documents {
            snapshot.check_document(document.as_ref())?;
        }

        let n_docs = documents.len() as f64;
        let prior = ln_gamma(self.n_topics() as f64 * self.config.alpha)
            - self.n_topics() as f64 * ln_gamma(self.config.alpha);
        let mut bound = n_docs * (self.global_term() / total_docs as f64 + prior);

        let terms = LocalTerms {
            elog_beta: &self.elog_beta,
            alpha: self.config.alpha,
        };
        let call = BoundCall::new(&terms, document_term, ());
        let items: Vec<(&[usize], &[f64])> = documents
            .iter()
            .zip(gammas)
            .map(|(doc, gamma)| (doc.as_ref(), gamma.as_slice()))
            .collect();
        bound += self
            .mapper
            .map(|item| call.call(item), items)
            .into_iter()
            .sum::<f64>();

        Ok(bound)
    }

    /// Topic-word part of the bound, before scaling by 1/D.
    fn global_term(&self) -> f64 {
        let v = self.n_vocab() as f64;
        let eta = self.config.eta;

        // prior normalizer is counted once
        let mut term = ln_gamma(v * eta) - v * ln_gamma(eta);
        term += self.lambda.as_slice().iter().map(|&l| ln_gamma(l)).sum::<f64>();
        term -= self
            .lambda
            .row_sums()
            .into_iter()
            .map(ln_gamma)
            .sum::<f64>();
        term += self
            .lambda
            .as_slice()
            .iter()
            .zip(self.elog_beta.as_slice())
            .map(|(&l, &e)| (eta - l) * e)
            .sum::<f64>();
        term
    }
}

/// Per-document part of the bound: the θ terms plus every token's φ terms.
fn document_term(terms: &LocalTerms<'_>, item: (&[usize], &[f64]), _: &()) -> f64 {
    let (document, gamma) = item;
    let elog_theta = dirichlet_expectation(gamma);

    let mut total = gamma.iter().map(|&g| ln_gamma(g)).sum::<f64>()
        - ln_gamma(gamma.iter().sum())
        + gamma
            .iter()
            .zip(&elog_theta)
            .map(|(&g, &e)| (terms.alpha - g) * e)
            .sum::<f64>();

    let mut ln_phi = vec![0.0; gamma.len()];
    for &word in document {
        for (k, slot) in ln_phi.iter_mut().enumerate() {
            *slot = elog_theta[k] + terms.elog_beta.get(k, word);
        }
        let ln_norm = log_sum_exp(&ln_phi);
        for &unnormalized in &ln_phi {
            let log_p = unnormalized - ln_norm;
            total += log_p.exp() * (unnormalized - log_p);
        }
    }
    total
}
