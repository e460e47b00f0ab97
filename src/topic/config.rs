//! Hyperparameters and run options.

use serde::{Deserialize, Serialize};

use crate::error::{LdaError, Result};

/// Model hyperparameters, fixed for the lifetime of an [`OnlineLda`](super::OnlineLda).
///
/// # Examples
///
/// ```
/// use online_lda::topic::LdaConfig;
///
/// let config = LdaConfig::new(10, 5000)
///     .with_alpha(0.1)
///     .with_eta(0.01)
///     .with_random_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LdaConfig {
    /// Number of topics (K)
    pub n_topics: usize,
    /// Vocabulary size (V)
    pub n_vocab: usize,
    /// Dirichlet prior on per-document topic mixtures
    pub alpha: f64,
    /// Dirichlet prior on topic-word distributions
    pub eta: f64,
    /// Learning-rate delay; down-weights early minibatches
    pub tau0: f64,
    /// Learning-rate forgetting exponent
    pub kappa: f64,
    /// Seed for λ initialization, γ warm starts and synthetic sampling
    pub random_seed: u64,
}

impl Default for LdaConfig {
    fn default() -> Self {
        Self {
            n_topics: 10,
            n_vocab: 1000,
            alpha: 0.1,
            eta: 0.01,
            tau0: 1024.0,
            kappa: 0.5,
            random_seed: 42,
        }
    }
}

impl LdaConfig {
    /// Config for `n_topics` topics over `n_vocab` words, other fields default.
    #[must_use]
    pub fn new(n_topics: usize, n_vocab: usize) -> Self {
        Self {
            n_topics,
            n_vocab,
            ..Self::default()
        }
    }

    /// Set α.
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set η.
    #[must_use]
    pub fn with_eta(mut self, eta: f64) -> Self {
        self.eta = eta;
        self
    }

    /// Set the learning-rate schedule `ρ_t = (τ₀ + t)^(−κ)`.
    #[must_use]
    pub fn with_schedule(mut self, tau0: f64, kappa: f64) -> Self {
        self.tau0 = tau0;
        self.kappa = kappa;
        self
    }

    /// Set random seed.
    #[must_use]
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Check every hyperparameter.
    ///
    /// `tau0 >= 1` keeps `ρ_t` inside `(0, 1]` for every `t >= 0`.
    ///
    /// # Errors
    ///
    /// Returns [`LdaError::InvalidHyperparameter`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.n_topics == 0 {
            return Err(LdaError::invalid_hyperparameter("n_topics", self.n_topics, "> 0"));
        }
        if self.n_vocab == 0 {
            return Err(LdaError::invalid_hyperparameter("n_vocab", self.n_vocab, "> 0"));
        }
        positive_finite("alpha", self.alpha)?;
        positive_finite("eta", self.eta)?;
        if !self.tau0.is_finite() || self.tau0 < 1.0 {
            return Err(LdaError::invalid_hyperparameter("tau0", self.tau0, ">= 1"));
        }
        if !self.kappa.is_finite() || self.kappa < 0.0 {
            return Err(LdaError::invalid_hyperparameter("kappa", self.kappa, ">= 0"));
        }
        Ok(())
    }
}

/// Iteration budget for one document's E-step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferOptions {
    /// Maximum fixed-point iterations
    pub max_iter: usize,
    /// Stop once mean |Δγ| falls below this
    pub tol: f64,
}

impl Default for InferOptions {
    fn default() -> Self {
        Self {
            max_iter: 500,
            tol: 1e-6,
        }
    }
}

impl InferOptions {
    /// Options with the given budget.
    #[must_use]
    pub fn new(max_iter: usize, tol: f64) -> Self {
        Self { max_iter, tol }
    }

    /// # Errors
    ///
    /// Returns an error if `tol` is negative or NaN.
    pub fn validate(&self) -> Result<()> {
        if self.tol.is_nan() || self.tol < 0.0 {
            return Err(LdaError::invalid_hyperparameter("tol", self.tol, ">= 0"));
        }
        Ok(())
    }
}

/// Options for one run of the online EM loop.
///
/// # Examples
///
/// ```
/// use online_lda::topic::EmConfig;
///
/// let config = EmConfig::default()
///     .with_batch_size(64)
///     .with_total_docs(100_000)
///     .with_approx_bound(true);
/// assert_eq!(config.batch_size, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmConfig {
    /// Documents per minibatch
    pub batch_size: usize,
    /// E-step iteration cap
    pub max_iter: usize,
    /// E-step tolerance
    pub tol: f64,
    /// Corpus size D used to rescale minibatch statistics.
    /// `None` falls back to the stream's exact size hint.
    pub total_docs: Option<usize>,
    /// Estimate the ELBO after every batch
    pub approx_bound: bool,
}

impl Default for EmConfig {
    fn default() -> Self {
        let infer = InferOptions::default();
        Self {
            batch_size: 1024,
            max_iter: infer.max_iter,
            tol: infer.tol,
            total_docs: None,
            approx_bound: false,
        }
    }
}

impl EmConfig {
    /// Set batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the corpus size D.
    #[must_use]
    pub fn with_total_docs(mut self, total_docs: usize) -> Self {
        self.total_docs = Some(total_docs);
        self
    }

    /// Set the E-step budget.
    #[must_use]
    pub fn with_inference(mut self, options: InferOptions) -> Self {
        self.max_iter = options.max_iter;
        self.tol = options.tol;
        self
    }

    /// Toggle the per-batch ELBO estimate.
    #[must_use]
    pub fn with_approx_bound(mut self, approx_bound: bool) -> Self {
        self.approx_bound = approx_bound;
        self
    }

    /// The E-step budget as [`InferOptions`].
    #[must_use]
    pub fn inference(&self) -> InferOptions {
        InferOptions::new(self.max_iter, self.tol)
    }

    /// # Errors
    ///
    /// Returns an error for a zero batch size, a zero corpus size, or a bad
    /// tolerance.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(LdaError::invalid_hyperparameter("batch_size", 0, "> 0"));
        }
        if self.total_docs == Some(0) {
            return Err(LdaError::invalid_hyperparameter("total_docs", 0, "> 0"));
        }
        self.inference().validate()
    }
}

fn positive_finite(param: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LdaError::invalid_hyperparameter(param, value, "finite and > 0"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let config = LdaConfig::default();
        assert!((config.tau0 - 1024.0).abs() < f64::EPSILON);
        assert!((config.kappa - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.random_seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let config = LdaConfig::new(3, 50)
            .with_alpha(0.5)
            .with_eta(0.2)
            .with_schedule(1.0, 0.7)
            .with_random_seed(99);
        assert_eq!(config.n_topics, 3);
        assert_eq!(config.n_vocab, 50);
        assert!((config.alpha - 0.5).abs() < f64::EPSILON);
        assert!((config.eta - 0.2).abs() < f64::EPSILON);
        assert!((config.tau0 - 1.0).abs() < f64::EPSILON);
        assert!((config.kappa - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.random_seed, 99);
    }

    #[test]
    fn test_rejects_zero_topics_and_vocab() {
        assert!(LdaConfig::new(0, 10).validate().is_err());
        assert!(LdaConfig::new(2, 0).validate().is_err());
    }

    #[test]
    fn test_rejects_non_positive_priors() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = LdaConfig::new(2, 5)
                .with_alpha(bad)
                .validate()
                .expect_err("alpha must be rejected");
            assert!(err.to_string().contains("alpha"));
            assert!(LdaConfig::new(2, 5).with_eta(bad).validate().is_err());
        }
    }

    #[test]
    fn test_rejects_bad_schedule() {
        assert!(LdaConfig::new(2, 5)
            .with_schedule(0.5, 0.5)
            .validate()
            .is_err());
        assert!(LdaConfig::new(2, 5)
            .with_schedule(1024.0, -0.1)
            .validate()
            .is_err());
    }

    #[test]
    fn test_em_config_validation() {
        assert!(EmConfig::default().validate().is_ok());
        assert!(EmConfig::default().with_batch_size(0).validate().is_err());
        assert!(EmConfig::default().with_total_docs(0).validate().is_err());
        assert!(EmConfig::default()
            .with_inference(InferOptions::new(10, -1.0))
            .validate()
            .is_err());
    }

    #[test]
    fn test_em_config_inference_roundtrip() {
        let config = EmConfig::default().with_inference(InferOptions::new(25, 1e-3));
        assert_eq!(config.inference(), InferOptions::new(25, 1e-3));
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = LdaConfig::new(4, 40).with_random_seed(5);
        let json = serde_json::to_string(&config).expect("serialize");
        let back: LdaConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, config);
    }
}
