//! rust_hawkes — loss and gradient engine for state-modulated
//! sum-exponential Hawkes processes.
//!
//! Purpose
//! -------
//! Serve as the crate root. The crate evaluates the negative log-likelihood
//! of a multivariate Hawkes process whose baseline and excitation are
//! modulated by a discrete state process, together with its exact gradient,
//! over many independent realizations. Solvers live outside the crate and
//! talk to the model through the `LogLikelihood` trait.
//!
//! Key behaviors
//! -------------
//! - `hawkes`: data validation, the exponential-kernel recursion, the
//!   multi-realization model `HawkesSumExpCustom2` and the coefficient
//!   normalizer.
//! - `optimization`: the solver-facing `LogLikelihood` trait, the argmin
//!   adapter, finite-difference gradient checks and the unified `OptError`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every evaluation is linear in the number of events per realization.
//! - Aggregate results are bit-identical for any worker count.
//!
//! Conventions
//! -----------
//! - Nodes, states, decays and realizations are 0-based.
//! - Coefficient vectors are flat `[μ | α | f]` blocks; see
//!   `hawkes::core::layout`.
//! - Diagnostics go through the `log` facade; installing a logger is the
//!   caller's business.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/` holds end-to-end checks
//!   against an O(n²) reference and finite differences.

pub mod hawkes;
pub mod optimization;
