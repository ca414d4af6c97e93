//! Realization pool — deterministic fan-out of per-realization work.
//!
//! Purpose
//! -------
//! Run one closure per realization on a dedicated, fixed-size rayon pool and
//! hand the results back in realization-index order, so the caller can reduce
//! them sequentially and obtain bit-identical sums for any thread count.
//!
//! Key behaviors
//! -------------
//! - [`RealizationPool::new`] builds a `rayon::ThreadPool` with exactly
//!   `n_threads` workers; the global rayon pool is never touched.
//! - [`RealizationPool::map_ordered`] gives every worker its own scratch value
//!   through `map_init`, so no mutable state is shared between workers.
//! - Errors are reported for the lowest failing realization index, not for
//!   whichever worker happened to fail first.
//! - [`reduce_ordered`] is the single-writer reduction after the join.
//!
//! Invariants & assumptions
//! ------------------------
//! - A single realization is always processed by one worker from start to
//!   end; the pool only partitions *which* realizations each worker runs.
use crate::hawkes::{
    core::validation::validate_n_threads,
    errors::{HawkesError, HawkesResult},
};
use ndarray::{Array1, ArrayViewMut1};
use rayon::prelude::*;

/// RealizationPool — dedicated worker pool for realization-level work.
#[derive(Debug)]
pub struct RealizationPool {
    pool: rayon::ThreadPool,
    n_threads: usize,
}

impl RealizationPool {
    /// Build a pool with `n_threads` workers.
    ///
    /// # Errors
    /// - [`HawkesError::InvalidThreadCount`] if `n_threads == 0`.
    /// - [`HawkesError::ThreadPoolBuild`] if rayon cannot spawn the workers.
    pub fn new(n_threads: usize) -> HawkesResult<Self> {
        validate_n_threads(n_threads)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .thread_name(|i| format!("hawkes-worker-{i}"))
            .build()
            .map_err(|err| HawkesError::ThreadPoolBuild { text: err.to_string() })?;
        log::debug!("built realization pool with {n_threads} threads");
        Ok(RealizationPool { pool, n_threads })
    }

    pub fn n_threads(&self) -> usize {
        self.n_threads
    }

    /// Evaluate `op(scratch, r)` for every `r in 0..n` on the pool and return
    /// the results in index order.
    ///
    /// `init` creates one scratch value per worker split; it is reused across
    /// the realizations that split processes.
    ///
    /// # Errors
    /// - The error of the lowest failing index.
    pub fn map_ordered<T, W, Init, Op>(&self, n: usize, init: Init, op: Op) -> HawkesResult<Vec<T>>
    where
        T: Send,
        Init: Fn() -> W + Sync + Send,
        Op: Fn(&mut W, usize) -> HawkesResult<T> + Sync + Send,
    {
        let results: Vec<HawkesResult<T>> =
            self.pool.install(|| (0..n).into_par_iter().map_init(init, |scratch, r| op(scratch, r)).collect());
        results.into_iter().collect()
    }
}

/// Sum per-realization `(loss, gradient)` parts in index order.
///
/// The gradient parts are added into `out` after it is zeroed, then both the
/// loss and `out` are multiplied by `factor`.
pub fn reduce_ordered(parts: &[(f64, Array1<f64>)], factor: f64, mut out: ArrayViewMut1<f64>) -> f64 {
    out.fill(0.0);
    let mut loss = 0.0;
    for (part_loss, part_grad) in parts {
        loss += part_loss;
        out += part_grad;
    }
    if factor != 1.0 {
        out.mapv_inplace(|g| g * factor);
    }
    loss * factor
}
