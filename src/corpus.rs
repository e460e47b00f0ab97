//! Document streams for training.
//!
//! The training loop accepts any `IntoIterator<Item = Document>`: a `Vec`
//! for a fixed corpus, or an endless sampler such as [`RandomCorpus`] that
//! draws documents with replacement the way a store queried at random rows
//! would.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use crate::error::{LdaError, Result};

/// A bag of words as vocabulary indices; repeats encode multiplicity.
pub type Document = Vec<usize>;

/// Endless stream of documents sampled uniformly with replacement.
///
/// `size_hint` reports an unbounded stream, so pass
/// [`RandomCorpus::len`] as `EmConfig::total_docs` when training on it.
///
/// # Examples
///
/// ```
/// use online_lda::corpus::RandomCorpus;
///
/// let corpus = RandomCorpus::new(vec![vec![0, 1], vec![2, 2, 3]]).expect("non-empty");
/// let drawn: Vec<_> = corpus.take(5).collect();
/// assert_eq!(drawn.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct RandomCorpus {
    documents: Vec<Document>,
    rng: StdRng,
}

impl RandomCorpus {
    /// Sampler over `documents` with the default seed (42).
    ///
    /// # Errors
    ///
    /// Returns an error if `documents` is empty.
    pub fn new(documents: Vec<Document>) -> Result<Self> {
        Self::with_seed(documents, 42)
    }

    /// Sampler over `documents` with an explicit seed.
    ///
    /// # Errors
    ///
    /// Returns an error if `documents` is empty.
    pub fn with_seed(documents: Vec<Document>, seed: u64) -> Result<Self> {
        if documents.is_empty() {
            return Err(LdaError::empty_input("corpus documents"));
        }
        Ok(Self {
            documents,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Number of distinct documents available for sampling.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no documents remain (only possible after [`hold_out`](Self::hold_out)).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The documents being sampled from.
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Move up to `n` randomly chosen non-empty documents out of the pool.
    ///
    /// The returned validation set is never drawn again by this sampler.
    pub fn hold_out(&mut self, n: usize) -> Vec<Document> {
        let candidates: Vec<usize> = self
            .documents
            .iter()
            .enumerate()
            .filter(|(_, doc)| !doc.is_empty())
            .map(|(i, _)| i)
            .collect();
        let amount = n.min(candidates.len());
        let chosen: HashSet<usize> = index::sample(&mut self.rng, candidates.len(), amount)
            .into_iter()
            .map(|i| candidates[i])
            .collect();

        let (held, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.documents)
            .into_iter()
            .enumerate()
            .partition(|(i, _)| chosen.contains(i));
        self.documents = kept.into_iter().map(|(_, doc)| doc).collect();
        held.into_iter().map(|(_, doc)| doc).collect()
    }
}

impl Iterator for RandomCorpus {
    type Item = Document;

    fn next(&mut self) -> Option<Document> {
        if self.documents.is_empty() {
            return None;
        }
        let i = self.rng.gen_range(0..self.documents.len());
        Some(self.documents[i].clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.documents.is_empty() {
            (0, Some(0))
        } else {
            (usize::MAX, None)
        }
    }
}
