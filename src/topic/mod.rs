//! Online variational Bayes for Latent Dirichlet Allocation.
//!
//! [`OnlineLda`] owns the global topic-word parameters λ and refines them
//! one minibatch at a time:
//!
//! - E-step: per-document γ and token responsibilities ([`TopicSnapshot`])
//! - M-step: stochastic natural-gradient step with `ρ_t = (τ₀ + t)^(−κ)`
//! - ELBO: approximate evidence lower bound for monitoring
//! - Synthetic corpora drawn from the LDA generative process
//!
//! # Quick Start
//!
//! ```
//! use online_lda::topic::{EmConfig, LdaConfig, OnlineLda};
//!
//! let mut lda = OnlineLda::new(LdaConfig::new(2, 5).with_alpha(0.1).with_eta(0.01))
//!     .expect("valid config");
//! let corpus = lda.sample(40, 20.0).expect("sampling succeeds");
//!
//! let config = EmConfig::default().with_batch_size(10).with_approx_bound(true);
//! for checkpoint in lda.online_em(corpus.documents, config).expect("valid run") {
//!     let checkpoint = checkpoint.expect("tokens are in range");
//!     assert!(checkpoint.elbo.expect("bound requested").is_finite());
//! }
//! assert_eq!(lda.updates(), 4);
//! ```
//!
//! # References
//!
//! - Blei, Ng & Jordan (2003). Latent Dirichlet Allocation. JMLR.
//! - Hoffman, Blei & Bach (2010). Online Learning for Latent Dirichlet
//!   Allocation. NIPS.

mod config;
mod elbo;
mod infer;
mod sample;
mod train;

pub use config::{EmConfig, InferOptions, LdaConfig};
pub use infer::{Inference, TopicSnapshot, GAMMA_INIT_SCALE, GAMMA_INIT_SHAPE};
pub use sample::SyntheticCorpus;
pub use train::{Checkpoint, OnlineEm};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Gamma};
use tracing::info;

use crate::dispatch::{BoundCall, Mapper, Sequential};
use crate::error::{LdaError, Result};
use crate::primitives::Matrix;
use crate::special::dirichlet_expectation_rows;
use crate::vocab::Vocabulary;
use infer::{infer_job, DocJob, InferRequest};

/// Online LDA model.
///
/// `M` decides how a batch of per-document E-steps is executed; the default
/// [`Sequential`] runs them on the calling thread.
///
/// # Examples
///
/// ```
/// use online_lda::topic::{InferOptions, LdaConfig, OnlineLda};
///
/// let mut lda = OnlineLda::new(LdaConfig::new(3, 10)).expect("valid config");
/// let result = lda
///     .infer(&[0, 4, 4, 9], false, &InferOptions::default())
///     .expect("tokens in range");
/// assert_eq!(result.gamma.len(), 3);
/// ```
#[derive(Debug)]
pub struct OnlineLda<M: Mapper = Sequential> {
    config: LdaConfig,
    /// Topic-word Dirichlet parameters (`n_topics` × `n_vocab`)
    lambda: Matrix<f64>,
    /// E[log β], always derived from `lambda`
    elog_beta: Matrix<f64>,
    /// exp(E[log β]), always derived from `lambda`
    exp_elog_beta: Matrix<f64>,
    /// Minibatch updates over the model's lifetime, across runs
    updates: u64,
    docs_processed: u64,
    rng: StdRng,
    mapper: M,
}

impl OnlineLda<Sequential> {
    /// Create a model that runs E-steps sequentially.
    ///
    /// # Errors
    ///
    /// Returns an error if the config fails validation.
    pub fn new(config: LdaConfig) -> Result<Self> {
        Self::with_mapper(config, Sequential)
    }
}

impl<M: Mapper> OnlineLda<M> {
    /// Create a model that dispatches E-steps through `mapper`.
    ///
    /// λ starts from independent Gamma(100, 0.01) draws.
    ///
    /// # Errors
    ///
    /// Returns an error if the config fails validation.
    pub fn with_mapper(config: LdaConfig, mapper: M) -> Result<Self> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(config.random_seed);
        let dist = Gamma::new(GAMMA_INIT_SHAPE, GAMMA_INIT_SCALE)
            .map_err(|e| LdaError::Sampling(e.to_string()))?;
        let init: Vec<f64> = (0..config.n_topics * config.n_vocab)
            .map(|_| dist.sample(&mut rng))
            .collect();
        let lambda = Matrix::from_vec(config.n_topics, config.n_vocab, init)?;
        let elog_beta = dirichlet_expectation_rows(&lambda);
        let exp_elog_beta = elog_beta.map(f64::exp);

        info!(
            n_topics = config.n_topics,
            n_vocab = config.n_vocab,
            alpha = config.alpha,
            eta = config.eta,
            tau0 = config.tau0,
            kappa = config.kappa,
            "initialized online LDA model"
        );

        Ok(Self {
            config,
            lambda,
            elog_beta,
            exp_elog_beta,
            updates: 0,
            docs_processed: 0,
            rng,
            mapper,
        })
    }

    /// Hyperparameters.
    #[must_use]
    pub fn config(&self) -> &LdaConfig {
        &self.config
    }

    /// Number of topics.
    #[must_use]
    pub fn n_topics(&self) -> usize {
        self.config.n_topics
    }

    /// Vocabulary size.
    #[must_use]
    pub fn n_vocab(&self) -> usize {
        self.config.n_vocab
    }

    /// Current topic-word parameters λ.
    #[must_use]
    pub fn lambda(&self) -> &Matrix<f64> {
        &self.lambda
    }

    /// E[log β] under the current λ.
    #[must_use]
    pub fn elog_beta(&self) -> &Matrix<f64> {
        &self.elog_beta
    }

    /// exp(E[log β]) under the current λ.
    #[must_use]
    pub fn exp_elog_beta(&self) -> &Matrix<f64> {
        &self.exp_elog_beta
    }

    /// Minibatch updates applied over the model's lifetime.
    ///
    /// Unlike [`Checkpoint::step`], this keeps counting across
    /// [`online_em`](Self::online_em) runs.
    #[must_use]
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Documents folded into λ over the model's lifetime.
    #[must_use]
    pub fn docs_processed(&self) -> u64 {
        self.docs_processed
    }

    /// The execution strategy for batch E-steps.
    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Learning rate `ρ_t = (τ₀ + t)^(−κ)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use online_lda::topic::{LdaConfig, OnlineLda};
    ///
    /// let lda = OnlineLda::new(LdaConfig::new(2, 5)).expect("valid config");
    /// assert!((lda.rate(0) - 1.0 / 32.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn rate(&self, t: u64) -> f64 {
        (self.config.tau0 + t as f64).powf(-self.config.kappa)
    }

    /// Read-only view of the current topics for E-steps.
    #[must_use]
    pub fn snapshot(&self) -> TopicSnapshot<'_> {
        TopicSnapshot::new(&self.exp_elog_beta, self.config.alpha)
    }

    /// Replace λ, e.g. to warm-start from parameters saved by the caller.
    ///
    /// Update counters are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape differs from (`n_topics`, `n_vocab`) or
    /// any entry is not strictly positive and finite.
    pub fn set_lambda(&mut self, lambda: Matrix<f64>) -> Result<()> {
        if lambda.shape() != self.lambda.shape() {
            return Err(LdaError::DimensionMismatch {
                expected: format!("{}x{}", self.n_topics(), self.n_vocab()),
                actual: format!("{}x{}", lambda.n_rows(), lambda.n_cols()),
            });
        }
        if let Some(&bad) = lambda
            .as_slice()
            .iter()
            .find(|v| !(v.is_finite() && **v > 0.0))
        {
            return Err(LdaError::invalid_hyperparameter(
                "lambda",
                bad,
                "finite and > 0",
            ));
        }
        self.lambda = lambda;
        self.refresh_expectations();
        Ok(())
    }

    /// E-step for a single document, warm-started from the model's generator.
    ///
    /// # Errors
    ///
    /// Returns [`LdaError::TokenOutOfRange`] for a token `>= n_vocab`.
    pub fn infer(
        &mut self,
        document: &[usize],
        with_stats: bool,
        options: &InferOptions,
    ) -> Result<Inference> {
        let seed = self.rng.gen();
        self.infer_with_seed(document, seed, with_stats, options)
    }

    /// E-step for a single document with an explicit warm-start seed.
    ///
    /// # Errors
    ///
    /// Returns [`LdaError::TokenOutOfRange`] for a token `>= n_vocab`.
    pub fn infer_with_seed(
        &self,
        document: &[usize],
        seed: u64,
        with_stats: bool,
        options: &InferOptions,
    ) -> Result<Inference> {
        options.validate()?;
        self.snapshot()
            .infer_seeded(document, seed, with_stats, options)
    }

    /// E-step for a batch through the model's mapper.
    ///
    /// Seeds are drawn here, on the owning thread and in document order, so
    /// every mapper yields the same results.
    ///
    /// # Errors
    ///
    /// Returns the first per-document error in input order.
    pub fn infer_batch<D>(
        &mut self,
        documents: &[D],
        with_stats: bool,
        options: &InferOptions,
    ) -> Result<Vec<Inference>>
    where
        D: AsRef<[usize]> + Sync,
    {
        options.validate()?;
        let seeds: Vec<u64> = (0..documents.len()).map(|_| self.rng.gen()).collect();
        let jobs: Vec<DocJob<'_>> = documents
            .iter()
            .zip(seeds)
            .map(|(doc, seed)| DocJob {
                document: doc.as_ref(),
                seed,
            })
            .collect();

        let snapshot = self.snapshot();
        let request = InferRequest {
            options: *options,
            with_stats,
        };
        let call = BoundCall::new(&snapshot, infer_job, request);
        self.mapper
            .map(|job| call.call(job), jobs)
            .into_iter()
            .collect()
    }

    /// Topic-word probabilities: λ with every row normalized.
    #[must_use]
    pub fn topic_words(&self) -> Matrix<f64> {
        self.lambda.normalize_rows()
    }

    /// Normalized topic mixtures (E[θ] under q) for a batch of documents.
    ///
    /// # Errors
    ///
    /// Returns [`LdaError::TokenOutOfRange`] for a token `>= n_vocab`.
    pub fn document_topics<D>(
        &mut self,
        documents: &[D],
        options: &InferOptions,
    ) -> Result<Matrix<f64>>
    where
        D: AsRef<[usize]> + Sync,
    {
        let inferences = self.infer_batch(documents, false, options)?;
        let data: Vec<f64> = inferences.into_iter().flat_map(|inf| inf.gamma).collect();
        Ok(Matrix::from_vec(documents.len(), self.n_topics(), data)?.normalize_rows())
    }

    /// Get top words for each topic.
    ///
    /// # Errors
    ///
    /// Returns an error if the vocabulary size differs from `n_vocab`.
    pub fn top_words(
        &self,
        vocabulary: &Vocabulary,
        n_words: usize,
    ) -> Result<Vec<Vec<(String, f64)>>> {
        if vocabulary.len() != self.n_vocab() {
            return Err(LdaError::dimension_mismatch(
                "vocabulary",
                self.n_vocab(),
                vocabulary.len(),
            ));
        }

        let topic_word = self.topic_words();
        let result = topic_word
            .rows()
            .map(|row| {
                let mut word_scores: Vec<(String, f64)> = vocabulary
                    .words()
                    .iter()
                    .zip(row)
                    .map(|(word, &score)| (word.clone(), score))
                    .collect();
                word_scores
                    .sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
                word_scores.truncate(n_words);
                word_scores
            })
            .collect();

        Ok(result)
    }

    /// Stochastic natural-gradient step from aggregated batch statistics.
    ///
    /// `λ ← (1 − ρ) λ + ρ (η + D · S / B)`.
    pub(crate) fn apply_update(
        &mut self,
        aggregate: &Matrix<f64>,
        batch_len: usize,
        total_docs: usize,
        rho: f64,
    ) -> Result<()> {
        let scale = total_docs as f64 / batch_len as f64;
        let eta = self.config.eta;
        let candidate = aggregate.map(|s| eta + scale * s);

        self.lambda = self.lambda.lerp(&candidate, rho)?;
        self.refresh_expectations();

        self.updates += 1;
        self.docs_processed += batch_len as u64;
        Ok(())
    }

    fn refresh_expectations(&mut self) {
        self.elog_beta = dirichlet_expectation_rows(&self.lambda);
        self.exp_elog_beta = self.elog_beta.map(f64::exp);
    }
}


#[cfg(test)]
mod topic_contract_falsify;
