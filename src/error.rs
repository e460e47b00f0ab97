//! Error types for online LDA operations.
//!
//! Only invalid input is an error here. A document whose E-step runs out of
//! iterations is a normal outcome and never surfaces as an `Err`.

use thiserror::Error;

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, LdaError>;

/// Main error type for online LDA operations.
///
/// # Examples
///
/// ```
/// use online_lda::LdaError;
///
/// let err = LdaError::TokenOutOfRange { token: 12, n_vocab: 10 };
/// assert!(err.to_string().contains("out of vocabulary range"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LdaError {
    /// Invalid hyperparameter value provided.
    #[error("Invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Matrix/vector dimensions don't match for the operation.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// A document contains a word index outside `[0, n_vocab)`.
    #[error("Token {token} out of vocabulary range (n_vocab={n_vocab})")]
    TokenOutOfRange {
        /// Offending token
        token: usize,
        /// Vocabulary size of the model
        n_vocab: usize,
    },

    /// Input that must be non-empty was empty.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// The corpus size was neither given nor reported by the stream.
    #[error("Corpus size unknown: set EmConfig::total_docs for unbounded streams")]
    UnknownCorpusSize,

    /// A sampling distribution rejected its parameters.
    #[error("Sampling error: {0}")]
    Sampling(String),

    /// Building a worker pool failed.
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// A matrix primitive rejected its operands.
    #[error("Matrix operation failed: {0}")]
    Matrix(String),
}

impl From<&str> for LdaError {
    fn from(msg: &str) -> Self {
        LdaError::Matrix(msg.to_string())
    }
}

impl LdaError {
    /// Create an invalid hyperparameter error.
    #[must_use]
    pub fn invalid_hyperparameter(param: &str, value: impl ToString, constraint: &str) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }

    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an empty input error
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::EmptyInput(context.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_hyperparameter_display() {
        let err = LdaError::invalid_hyperparameter("alpha", -0.1, "> 0");
        let msg = err.to_string();
        assert!(msg.contains("Invalid hyperparameter"));
        assert!(msg.contains("alpha"));
        assert!(msg.contains("-0.1"));
        assert!(msg.contains("> 0"));
    }

    #[test]
    fn test_dimension_mismatch_helper() {
        let err = LdaError::dimension_mismatch("gammas", 20, 19);
        let msg = err.to_string();
        assert!(msg.contains("gammas=20"));
        assert!(msg.contains("19"));
    }

    #[test]
    fn test_token_out_of_range_display() {
        let err = LdaError::TokenOutOfRange {
            token: 7,
            n_vocab: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("Token 7"));
        assert!(msg.contains("n_vocab=5"));
    }

    #[test]
    fn test_empty_input_helper() {
        let err = LdaError::empty_input("documents");
        assert_eq!(err.to_string(), "empty input: documents");
    }

    #[test]
    fn test_unknown_corpus_size_display() {
        assert!(LdaError::UnknownCorpusSize
            .to_string()
            .contains("total_docs"));
    }

    #[test]
    fn test_from_str_is_matrix_error() {
        let err: LdaError = "Data length must equal rows * cols".into();
        assert!(matches!(err, LdaError::Matrix(_)));
        assert!(err.to_string().contains("rows * cols"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LdaError>();
    }
}
