//! Execution strategies for per-document work.
//!
//! The training loop never knows whether it runs on one thread or many. It
//! binds an operation to a read-only target with [`BoundCall`] and hands the
//! resulting one-argument callable to a [`Mapper`]:
//!
//! - [`Sequential`]: plain iterator map on the calling thread (default)
//! - [`Parallel`]: rayon data-parallel map (`parallel` feature)
//!
//! Every mapper returns results in input order, so aggregation downstream is
//! identical for both.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "parallel")]
use std::sync::Arc;

#[cfg(feature = "parallel")]
use crate::error::{LdaError, Result};

/// Anything that can apply a function to a batch of items.
///
/// Implementations must preserve input order in the returned vector.
pub trait Mapper: Send + Sync {
    /// Apply `f` to every item, returning results in input order.
    fn map<I, R, F>(&self, f: F, items: Vec<I>) -> Vec<R>
    where
        I: Send,
        R: Send,
        F: Fn(I) -> R + Send + Sync;
}

/// Runs every item on the calling thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sequential;

impl Mapper for Sequential {
    fn map<I, R, F>(&self, f: F, items: Vec<I>) -> Vec<R>
    where
        I: Send,
        R: Send,
        F: Fn(I) -> R + Send + Sync,
    {
        items.into_iter().map(f).collect()
    }
}

/// Fans items out over a rayon thread pool.
///
/// Without an explicit pool the global rayon pool is used. The pool is
/// borrowed, never shut down: its lifecycle belongs to the caller.
#[cfg(feature = "parallel")]
#[derive(Debug, Clone, Default)]
pub struct Parallel {
    pool: Option<Arc<rayon::ThreadPool>>,
}

#[cfg(feature = "parallel")]
impl Parallel {
    /// Use the global rayon pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a caller-supplied pool.
    #[must_use]
    pub fn with_pool(pool: Arc<rayon::ThreadPool>) -> Self {
        Self { pool: Some(pool) }
    }

    /// Build a dedicated pool with `n_threads` workers.
    ///
    /// # Errors
    ///
    /// Returns [`LdaError::ThreadPool`] if rayon cannot start the pool.
    pub fn with_threads(n_threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .map_err(|e| LdaError::ThreadPool(e.to_string()))?;
        Ok(Self::with_pool(Arc::new(pool)))
    }
}

#[cfg(feature = "parallel")]
impl Mapper for Parallel {
    fn map<I, R, F>(&self, f: F, items: Vec<I>) -> Vec<R>
    where
        I: Send,
        R: Send,
        F: Fn(I) -> R + Send + Sync,
    {
        let run = move || -> Vec<R> { items.into_par_iter().map(f).collect() };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}

/// A target, an operation on it, and fixed trailing arguments, packaged as a
/// callable of one argument.
///
/// `call(item)` evaluates `operation(target, item, &args)`. The target is held
/// by shared reference, so a bound call can read but never mutate it, and the
/// value is `Sync` whenever the target and arguments are.
///
/// # Examples
///
/// ```
/// use online_lda::dispatch::{BoundCall, Mapper, Sequential};
///
/// struct Scale(f64);
///
/// fn scaled(s: &Scale, x: f64, offset: &f64) -> f64 {
///     s.0 * x + offset
/// }
///
/// let target = Scale(2.0);
/// let call = BoundCall::new(&target, scaled, 1.0);
/// let out = Sequential.map(|x| call.call(x), vec![1.0, 2.0]);
/// assert_eq!(out, vec![3.0, 5.0]);
/// ```
pub struct BoundCall<'t, T: ?Sized, A, I, R> {
    target: &'t T,
    operation: fn(&T, I, &A) -> R,
    args: A,
}

impl<'t, T: ?Sized, A, I, R> BoundCall<'t, T, A, I, R> {
    /// Bind `operation` to `target` with fixed `args`.
    pub fn new(target: &'t T, operation: fn(&T, I, &A) -> R, args: A) -> Self {
        Self {
            target,
            operation,
            args,
        }
    }

    /// Invoke the bound operation with `item` as its leading argument.
    pub fn call(&self, item: I) -> R {
        (self.operation)(self.target, item, &self.args)
    }

    /// The fixed arguments.
    pub fn args(&self) -> &A {
        &self.args
    }
}

impl<T: ?Sized, A: std::fmt::Debug, I, R> std::fmt::Debug for BoundCall<'_, T, A, I, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundCall")
            .field("target", &std::any::type_name::<T>())
            .field("args", &self.args)
            .finish()
    }
}
