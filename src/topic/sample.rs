//! Synthetic corpora from the LDA generative process.
//!
//! ```text
//! β_k ~ Dir(η · 1_V)            k = 1..K
//! θ_d ~ Dir(α · 1_K)            d = 1..N
//! N_d ~ Poisson(rate)
//! z_d ~ Mult(N_d, θ_d)          topic counts
//! w_dk ~ Mult(z_dk, β_k)        word counts per topic
//! ```
//!
//! Used to check that training recovers structure it was given; the
//! production path never calls it.

use rand::Rng;
use rand_distr::{Binomial, Distribution, Gamma, Poisson};

use super::OnlineLda;
use crate::corpus::Document;
use crate::dispatch::Mapper;
use crate::error::{LdaError, Result};
use crate::primitives::Matrix;
use crate::special::log_sum_exp;

/// Documents drawn from known topics, plus the truth that generated them.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticCorpus {
    /// Flat token lists
    pub documents: Vec<Document>,
    /// Topic mixture of each document (`size` × `n_topics`)
    pub theta: Matrix<f64>,
    /// Topic-word distributions used (`n_topics` × `n_vocab`)
    pub topic_word: Matrix<f64>,
}

impl<M: Mapper> OnlineLda<M> {
    /// Draw `size` documents whose lengths are Poisson(`rate`).
    ///
    /// Topics are drawn fresh from the η prior on every call; λ is not used.
    ///
    /// # Errors
    ///
    /// Returns an error if `rate` is not finite and positive.
    pub fn sample(&mut self, size: usize, rate: f64) -> Result<SyntheticCorpus> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(LdaError::invalid_hyperparameter("rate", rate, "finite and > 0"));
        }
        let (n_topics, n_vocab) = (self.n_topics(), self.n_vocab());
        let (alpha, eta) = (self.config.alpha, self.config.eta);
        let rng = &mut self.rng;

        let eta_prior = vec![eta; n_vocab];
        let mut beta = Vec::with_capacity(n_topics * n_vocab);
        for _ in 0..n_topics {
            beta.extend(sample_dirichlet(rng, &eta_prior)?);
        }
        let topic_word = Matrix::from_vec(n_topics, n_vocab, beta)?;

        let alpha_prior = vec![alpha; n_topics];
        let lengths = Poisson::new(rate).map_err(|e| LdaError::Sampling(e.to_string()))?;
        let mut theta = Vec::with_capacity(size * n_topics);
        let mut documents = Vec::with_capacity(size);
        for _ in 0..size {
            let mixture = sample_dirichlet(rng, &alpha_prior)?;
            let length: f64 = lengths.sample(rng);
            let n_words = length as u64;
            let topic_counts = sample_multinomial(rng, n_words, &mixture)?;

            let mut document = Vec::with_capacity(n_words as usize);
            for (k, &count) in topic_counts.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                let word_counts = sample_multinomial(rng, count, topic_word.row(k))?;
                for (word, &c) in word_counts.iter().enumerate() {
                    document.extend(std::iter::repeat(word).take(c as usize));
                }
            }

            theta.extend(mixture);
            documents.push(document);
        }

        Ok(SyntheticCorpus {
            documents,
            theta: Matrix::from_vec(size, n_topics, theta)?,
            topic_word,
        })
    }
}

/// Dirichlet draw computed in log space.
///
/// Small concentrations make plain Gamma draws underflow to zero, so each
/// component is drawn as `log Gamma(a + 1) + log(U) / a` and normalized with
/// log-sum-exp.
pub(crate) fn sample_dirichlet<R: Rng + ?Sized>(rng: &mut R, alpha: &[f64]) -> Result<Vec<f64>> {
    let mut log_draws = Vec::with_capacity(alpha.len());
    for &a in alpha {
        if !(a.is_finite() && a > 0.0) {
            return Err(LdaError::Sampling(format!(
                "Dirichlet concentration must be finite and > 0, got {a}"
            )));
        }
        let boosted = Gamma::new(a + 1.0, 1.0).map_err(|e| LdaError::Sampling(e.to_string()))?;
        let u: f64 = 1.0 - rng.gen::<f64>();
        log_draws.push(boosted.sample(rng).ln() + u.ln() / a);
    }
    let ln_total = log_sum_exp(&log_draws);
    Ok(log_draws.into_iter().map(|x| (x - ln_total).exp()).collect())
}

/// Multinomial draw as a chain of conditional binomials.
pub(crate) fn sample_multinomial<R: Rng + ?Sized>(
    rng: &mut R,
    trials: u64,
    probs: &[f64],
) -> Result<Vec<u64>> {
    let mut counts = vec![0; probs.len()];
    let mut remaining_trials = trials;
    let mut remaining_mass: f64 = probs.iter().sum();

    for (i, &p) in probs.iter().enumerate() {
        if remaining_trials == 0 {
            break;
        }
        if i + 1 == probs.len() {
            counts[i] = remaining_trials;
            break;
        }
        let conditional = if remaining_mass > 0.0 {
            (p / remaining_mass).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let draw = Binomial::new(remaining_trials, conditional)
            .map_err(|e| LdaError::Sampling(e.to_string()))?
            .sample(rng);
        counts[i] = draw;
        remaining_trials -= draw;
        remaining_mass -= p;
    }
    Ok(counts)
}
