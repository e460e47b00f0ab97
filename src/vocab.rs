//! Word ↔ index mapping for bag-of-words documents.
//!
//! The model only ever sees vocabulary indices; [`Vocabulary`] turns
//! already-tokenized words into [`Document`]s and back into labels for
//! [`OnlineLda::top_words`](crate::topic::OnlineLda::top_words).
//! [`VocabularyFilter`] builds one from a frequency-ranked word list.
//!
//! # Examples
//!
//! ```
//! use online_lda::vocab::VocabularyFilter;
//!
//! let ranked = ["the 900", "model 40", "topic 31", "42 12", "lda 7"];
//! let vocabulary = VocabularyFilter::default()
//!     .with_stopwords(["the"])
//!     .build(ranked);
//! assert_eq!(vocabulary.words(), &["model", "topic", "lda"]);
//! assert_eq!(vocabulary.encode(["Topic", "unknown", "lda"]), vec![1, 2]);
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::corpus::Document;

const NUMBER_CHARS: &str = "0123456789.,~";

/// Bidirectional word ↔ index map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    words: Vec<String>,
    index: HashMap<String, usize>,
}

impl From<Vec<String>> for Vocabulary {
    fn from(words: Vec<String>) -> Self {
        Self::from_words(words)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.words
    }
}

impl Vocabulary {
    /// Build from words in index order; later duplicates are ignored.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary = Self::default();
        for word in words {
            vocabulary.push(word.as_ref());
        }
        vocabulary
    }

    fn push(&mut self, word: &str) {
        if !self.index.contains_key(word) {
            self.index.insert(word.to_string(), self.words.len());
            self.words.push(word.to_string());
        }
    }

    /// Index of `word`, if known. Matching is exact.
    #[must_use]
    pub fn index(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    /// Word at `index`, if in range.
    #[must_use]
    pub fn word(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    /// All words in index order.
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Number of words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the vocabulary is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Map tokens to indices, lower-casing each and dropping unknown ones.
    pub fn encode<I, S>(&self, tokens: I) -> Document
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tokens
            .into_iter()
            .filter_map(|token| self.index(&token.as_ref().to_lowercase()))
            .collect()
    }
}

/// Rules for turning a frequency-ranked word list into a [`Vocabulary`].
///
/// Each input line is a ranked entry whose first whitespace-separated field
/// is the word (e.g. `"model 40"`). Entries are kept in rank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyFilter {
    /// Leading ranked entries to ignore (usually the most common words)
    pub skip: usize,
    /// Stop once this many words are kept
    pub max_size: Option<usize>,
    /// Words to exclude, matched exactly
    pub stopwords: HashSet<String>,
    /// Drop words made only of digits and `.,~`
    pub strip_numbers: bool,
    /// Drop words made only of ASCII punctuation
    pub strip_punctuation: bool,
    /// Drop TeX control sequences (words starting with `\`)
    pub strip_tex: bool,
    /// Minimum word length in characters
    pub min_length: usize,
}

impl Default for VocabularyFilter {
    fn default() -> Self {
        Self {
            skip: 0,
            max_size: None,
            stopwords: HashSet::new(),
            strip_numbers: true,
            strip_punctuation: true,
            strip_tex: false,
            min_length: 3,
        }
    }
}

impl VocabularyFilter {
    /// Ignore the first `skip` ranked entries.
    #[must_use]
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Keep at most `max_size` words.
    #[must_use]
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    /// Exclude these words.
    #[must_use]
    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stopwords
            .extend(words.into_iter().map(|w| w.as_ref().to_string()));
        self
    }

    /// Toggle dropping TeX control sequences.
    #[must_use]
    pub fn with_strip_tex(mut self, strip_tex: bool) -> Self {
        self.strip_tex = strip_tex;
        self
    }

    /// Set the minimum word length.
    #[must_use]
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Whether `word` survives every rule except `skip` and `max_size`.
    #[must_use]
    pub fn accepts(&self, word: &str) -> bool {
        if word.chars().count() < self.min_length || self.stopwords.contains(word) {
            return false;
        }
        if self.strip_numbers && word.chars().all(|c| NUMBER_CHARS.contains(c)) {
            return false;
        }
        if self.strip_punctuation && word.chars().all(|c| c.is_ascii_punctuation()) {
            return false;
        }
        !(self.strip_tex && word.starts_with('\\'))
    }

    /// Build a vocabulary from ranked lines. Blank lines are ignored.
    pub fn build<I, S>(&self, ranked: I) -> Vocabulary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary = Vocabulary::default();
        let entries = ranked
            .into_iter()
            .filter_map(|line| line.as_ref().split_whitespace().next().map(str::to_string));

        for word in entries.skip(self.skip) {
            if self.max_size.is_some_and(|max| vocabulary.len() >= max) {
                break;
            }
            if self.accepts(&word) {
                vocabulary.push(&word);
            }
        }
        vocabulary
    }
}
