//! core — data containers, coefficient layout, and recursion primitives for
//! state-modulated Hawkes likelihoods.
//!
//! Purpose
//! -------
//! Collect the building blocks the model layer composes: validated
//! realizations, the flat coefficient layout, the decay bank, engine options,
//! the exponential-kernel recursion, and the loss/gradient accumulators.
//!
//! Key behaviors
//! -------------
//! - [`layout`]: flat coefficient vector ⇄ structured views.
//! - [`decays`]: validated decay rates and unit-impulse integrals.
//! - [`realization`] / [`data`]: raw samples → merged trajectories.
//! - [`recursion`]: forward intensity walk and backward sweep.
//! - [`accumulators`]: per-realization loss and gradient assembly.
//! - [`options`] / [`validation`]: configuration and shared checks.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based; node `i` is a target and node `j` a source in
//!   `α[u][i][j]`.
//! - This module performs no I/O; only the accumulators emit `trace!` logs.
pub mod accumulators;
pub mod data;
pub mod decays;
pub mod layout;
pub mod options;
pub mod realization;
pub mod recursion;
pub mod validation;
