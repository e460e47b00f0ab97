//! Core compute primitives.
//!
//! Row-major matrices holding topic-word parameters and per-document
//! statistics.

mod matrix;

pub use matrix::Matrix;
