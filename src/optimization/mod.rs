//! optimization — solver-facing surface and unified error type.
//!
//! Purpose
//! -------
//! Expose the crate's models to external optimizers. Models implement
//! `LogLikelihood`; solvers consume them through the argmin adapter and see
//! every failure as an [`errors::OptError`].
//!
//! Conventions
//! -----------
//! - Solvers conceptually maximize `ℓ(θ)` by minimizing `c(θ) = -ℓ(θ)`.
//! - Model errors (`HawkesError`) convert into `OptError` through `From`, so
//!   `?` works across the boundary.
//!
//! Testing notes
//! -------------
//! - `errors`: conversions from argmin and model errors.
//! - `loglik_optimizer`: sign conventions, finite-difference fallback and
//!   gradient checks, including against the Hawkes model.

pub mod errors;
pub mod loglik_optimizer;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
}
