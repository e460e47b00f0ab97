//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use online_lda::prelude::*;
//! ```

pub use crate::corpus::{Document, RandomCorpus};
#[cfg(feature = "parallel")]
pub use crate::dispatch::Parallel;
pub use crate::dispatch::{BoundCall, Mapper, Sequential};
pub use crate::error::{LdaError, Result};
pub use crate::primitives::Matrix;
pub use crate::topic::{
    Checkpoint, EmConfig, InferOptions, Inference, LdaConfig, OnlineLda, SyntheticCorpus,
};
pub use crate::vocab::{Vocabulary, VocabularyFilter};
