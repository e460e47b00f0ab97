//! Minibatch training loop.
//!
//! [`OnlineEm`] is a pull-based sequence: nothing happens until the caller
//! asks for the next [`Checkpoint`], and dropping the iterator is all it
//! takes to stop. Each pull consumes exactly one minibatch from the stream,
//! runs its E-steps, and applies one global update before yielding.
//!
//! Every run restarts the schedule: its first update uses `ρ_0`, whatever
//! the model went through before.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::config::EmConfig;
use super::OnlineLda;
use crate::corpus::Document;
use crate::dispatch::Mapper;
use crate::error::{LdaError, Result};
use crate::primitives::Matrix;

/// State after one minibatch update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Updates applied by this run (t, after this batch)
    pub step: u64,
    /// Documents folded into λ by this run (`step × batch_size`)
    pub docs_processed: u64,
    /// Learning rate used for this update
    pub rho: f64,
    /// λ after this update
    pub lambda: Matrix<f64>,
    /// Running mean of the per-batch ELBO, when requested
    pub elbo: Option<f64>,
}

/// Lazy sequence of checkpoints produced by [`OnlineLda::online_em`].
///
/// Holds the model mutably, so no other update can interleave with a run.
/// A trailing batch smaller than `batch_size` is dropped when the stream
/// ends.
#[derive(Debug)]
pub struct OnlineEm<'m, S, M: Mapper> {
    model: &'m mut OnlineLda<M>,
    stream: S,
    config: EmConfig,
    total_docs: usize,
    batch: Vec<Document>,
    step: u64,
    elbo_sum: f64,
    exhausted: bool,
}

impl<M: Mapper> OnlineLda<M> {
    /// Train on a document stream, one checkpoint per minibatch.
    ///
    /// The stream may be unbounded; the caller stops by no longer pulling.
    /// When `config.total_docs` is `None`, the corpus size is taken from the
    /// stream's exact size hint.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or the corpus size cannot be
    /// determined. Per-batch failures (out-of-range tokens) are yielded as
    /// `Err` items and leave λ unchanged.
    pub fn online_em<I>(
        &mut self,
        documents: I,
        config: EmConfig,
    ) -> Result<OnlineEm<'_, I::IntoIter, M>>
    where
        I: IntoIterator<Item = Document>,
    {
        config.validate()?;
        let stream = documents.into_iter();
        let total_docs = match config.total_docs {
            Some(n) => n,
            None => match stream.size_hint() {
                (lower, Some(upper)) if lower == upper && lower > 0 => lower,
                _ => return Err(LdaError::UnknownCorpusSize),
            },
        };

        Ok(OnlineEm {
            model: self,
            stream,
            batch: Vec::with_capacity(config.batch_size),
            config,
            total_docs,
            step: 0,
            elbo_sum: 0.0,
            exhausted: false,
        })
    }
}

impl<S, M: Mapper> OnlineEm<'_, S, M> {
    /// Corpus size D used to rescale batch statistics.
    #[must_use]
    pub fn total_docs(&self) -> usize {
        self.total_docs
    }

    /// Updates applied by this run so far.
    #[must_use]
    pub fn step(&self) -> u64 {
        self.step
    }

    /// The model being trained.
    #[must_use]
    pub fn model(&self) -> &OnlineLda<M> {
        &*self.model
    }

    fn process(&mut self, batch: &[Document]) -> Result<Checkpoint> {
        let options = self.config.inference();
        let inferences = self.model.infer_batch(batch, true, &options)?;

        let mut aggregate = Matrix::zeros(self.model.n_topics(), self.model.n_vocab());
        for (document, inference) in batch.iter().zip(&inferences) {
            if let Some(stats) = &inference.stats {
                aggregate.scatter_add_columns(document, stats)?;
            }
        }

        let rho = self.model.rate(self.step);
        self.model
            .apply_update(&aggregate, batch.len(), self.total_docs, rho)?;
        self.step += 1;
        let docs_processed = self.step * self.config.batch_size as u64;

        let elbo = if self.config.approx_bound {
            let gammas: Vec<Vec<f64>> = inferences.into_iter().map(|inf| inf.gamma).collect();
            let bound = self
                .model
                .elbo_with_gammas(batch, &gammas, Some(self.total_docs))?;
            self.elbo_sum += bound;
            Some(self.elbo_sum / self.step as f64)
        } else {
            None
        };

        debug!(
            step = self.step,
            rho,
            docs_processed,
            elbo = ?elbo,
            "applied minibatch update"
        );

        Ok(Checkpoint {
            step: self.step,
            docs_processed,
            rho,
            lambda: self.model.lambda().clone(),
            elbo,
        })
    }
}

impl<S, M> Iterator for OnlineEm<'_, S, M>
where
    S: Iterator<Item = Document>,
    M: Mapper,
{
    type Item = Result<Checkpoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        while self.batch.len() < self.config.batch_size {
            match self.stream.next() {
                Some(document) => self.batch.push(document),
                None => {
                    self.exhausted = true;
                    if !self.batch.is_empty() {
                        warn!(
                            dropped = self.batch.len(),
                            batch_size = self.config.batch_size,
                            "stream ended mid-batch; trailing documents not used"
                        );
                        self.batch.clear();
                    }
                    return None;
                }
            }
        }

        let batch = std::mem::replace(
            &mut self.batch,
            Vec::with_capacity(self.config.batch_size),
        );
        Some(self.process(&batch))
    }
}
