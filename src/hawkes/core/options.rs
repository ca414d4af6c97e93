//! Engine options — configuration of the multi-realization likelihood engine.
//!
//! Purpose
//! -------
//! Collect the knobs that shape how `loss` / `grad` are evaluated but not
//! what model is evaluated: worker-pool size, loss scaling, and the tolerance
//! used when checking recursion accumulators for negativity.
//!
//! Key behaviors
//! -------------
//! - [`EngineOptions::new`] validates every field once; the model stores the
//!   result and never re-checks it.
//! - [`LossScaling`] parses case-insensitively from `"sum"` / `"perjump"`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `n_threads >= 1`.
//! - `negativity_tol` is finite and `>= 0`.
//! - Additivity of the loss across realizations holds only under
//!   [`LossScaling::Sum`].
use crate::hawkes::{
    core::validation::{validate_n_threads, validate_tolerance},
    errors::{HawkesError, HawkesResult},
};
use std::str::FromStr;

/// Default tolerance below zero tolerated for unit accumulators.
pub const DEFAULT_NEGATIVITY_TOL: f64 = 1e-12;

/// How per-realization losses are combined into the reported objective.
///
/// Variants:
/// - `Sum`: plain sum over realizations (default).
/// - `PerJump`: sum divided by the total number of jumps across all
///   realizations; gradients are scaled identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LossScaling {
    #[default]
    Sum,
    PerJump,
}

impl FromStr for LossScaling {
    type Err = HawkesError;

    /// Parse a scaling mode from a string (case-insensitive).
    ///
    /// Accepts `"Sum"` and `"PerJump"` in any case. Any other value returns
    /// `HawkesError::InvalidLossScaling`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sum" => Ok(LossScaling::Sum),
            "perjump" => Ok(LossScaling::PerJump),
            _ => Err(HawkesError::InvalidLossScaling { name: s.to_string() }),
        }
    }
}

impl LossScaling {
    /// Multiplicative factor applied to the summed loss and gradient.
    pub fn factor(&self, n_total_jumps: usize) -> f64 {
        match self {
            LossScaling::Sum => 1.0,
            LossScaling::PerJump if n_total_jumps > 0 => 1.0 / n_total_jumps as f64,
            LossScaling::PerJump => 1.0,
        }
    }
}

/// EngineOptions — validated evaluation settings.
///
/// Fields
/// ------
/// - `n_threads`: size of the dedicated worker pool.
/// - `loss_scaling`: how realization losses are combined.
/// - `negativity_tol`: slack below zero tolerated for unit accumulators
///   before `NumericalInstability` is raised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOptions {
    pub n_threads: usize,
    pub loss_scaling: LossScaling,
    pub negativity_tol: f64,
}

impl EngineOptions {
    /// Construct validated options.
    ///
    /// # Errors
    /// - [`HawkesError::InvalidThreadCount`] if `n_threads == 0`.
    /// - [`HawkesError::InvalidTolerance`] if `negativity_tol` is negative or
    ///   non-finite.
    pub fn new(n_threads: usize, loss_scaling: LossScaling, negativity_tol: f64) -> HawkesResult<Self> {
        validate_n_threads(n_threads)?;
        validate_tolerance(negativity_tol)?;
        Ok(EngineOptions { n_threads, loss_scaling, negativity_tol })
    }

    /// Default options with a custom thread count.
    ///
    /// # Errors
    /// - [`HawkesError::InvalidThreadCount`] if `n_threads == 0`.
    pub fn with_threads(n_threads: usize) -> HawkesResult<Self> {
        EngineOptions::new(n_threads, LossScaling::Sum, DEFAULT_NEGATIVITY_TOL)
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            n_threads: 1,
            loss_scaling: LossScaling::Sum,
            negativity_tol: DEFAULT_NEGATIVITY_TOL,
        }
    }
}
