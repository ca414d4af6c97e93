//! loglik_optimizer — solver-facing view of log-likelihood models.
//!
//! Purpose
//! -------
//! Let external, argmin-style solvers drive the models of this crate without
//! knowing their internals. A model implements [`LogLikelihood`];
//! [`adapter::ArgMinAdapter`] turns it into an argmin `CostFunction` +
//! `Gradient` pair.
//!
//! Key behaviors
//! -------------
//! - Cost is always `c(θ) = -ℓ(θ)`; analytic gradients `∇ℓ(θ)` are negated by
//!   the adapter.
//! - Missing analytic gradients fall back to finite differences of the cost
//!   ([`finite_diff::fd_gradient`]).
//! - [`finite_diff::gradient_check`] compares an analytic gradient against
//!   central differences for diagnostics and tests.
//!
//! Invariants & assumptions
//! ------------------------
//! - [`LogLikelihood::value`] and [`LogLikelihood::grad`] report invalid input
//!   as [`OptError`](crate::optimization::errors::OptError) values, never
//!   panics.
//! - No solver loop lives here; iteration, line search and stopping rules
//!   belong to the caller.

pub mod adapter;
pub mod finite_diff;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::adapter::ArgMinAdapter;
pub use self::finite_diff::{GradCheck, gradient_check};
pub use self::traits::LogLikelihood;
pub use self::types::{Cost, Grad, Theta};

pub mod prelude {
    pub use super::adapter::ArgMinAdapter;
    pub use super::finite_diff::{GradCheck, gradient_check};
    pub use super::traits::LogLikelihood;
    pub use super::types::{Cost, Grad, Theta};
}
