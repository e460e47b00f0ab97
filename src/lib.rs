//! Online LDA: streaming topic models in pure Rust.
//!
//! Fits Latent Dirichlet Allocation with online variational Bayes
//! (Hoffman, Blei & Bach 2010): documents arrive in minibatches, each
//! batch's E-step runs against frozen topics, and the topic-word
//! parameters take one stochastic natural-gradient step per batch.
//!
//! # Quick Start
//!
//! ```
//! use online_lda::prelude::*;
//!
//! let mut lda = OnlineLda::new(LdaConfig::new(2, 5)).expect("valid config");
//! let synthetic = lda.sample(60, 20.0).expect("sampling succeeds");
//!
//! let config = EmConfig::default().with_batch_size(20);
//! let checkpoints: Vec<Checkpoint> = lda
//!     .online_em(synthetic.documents, config)
//!     .expect("valid run")
//!     .collect::<Result<_>>()
//!     .expect("tokens in range");
//!
//! assert_eq!(checkpoints.len(), 3);
//! assert_eq!(lda.lambda().shape(), (2, 5));
//! ```
//!
//! # Modules
//!
//! - [`topic`]: the model, E-step, training loop, ELBO and synthetic corpora
//! - [`dispatch`]: sequential and rayon-parallel execution of per-document work
//! - [`special`]: digamma, log-gamma and Dirichlet expectations
//! - [`primitives`]: dense row-major `Matrix`
//! - [`corpus`]: document streams (`RandomCorpus`)
//! - [`vocab`]: word ↔ index mapping and vocabulary filtering
//! - [`error`]: `LdaError` and the crate `Result`

pub mod corpus;
pub mod dispatch;
pub mod error;
pub mod prelude;
pub mod primitives;
pub mod special;
pub mod topic;
pub mod vocab;

pub use error::{LdaError, Result};
pub use primitives::Matrix;
pub use topic::{Checkpoint, EmConfig, InferOptions, LdaConfig, OnlineLda};
