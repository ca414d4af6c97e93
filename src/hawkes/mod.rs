//! hawkes — multivariate Hawkes processes with sum-of-exponential kernels
//! modulated by an auxiliary discrete state process.
//!
//! Purpose
//! -------
//! Compute the negative log-likelihood and its gradient for the
//! state-modulated ("custom type 2") sum-exponential Hawkes model over many
//! independent realizations, for use by an external solver.
//!
//! Model
//! -----
//! For node `i`, with `s(t⁻)` the state just before `t`:
//!
//! `λ_i(t) = μ_i f_i[s(t⁻)] + Σ_j Σ_u α[u][i][j] Σ_{t_l < t, n_l = j} f_i[σ_l] e^{−β_u (t − t_l)}`
//!
//! where `σ_l` is the state in force just before event `l`.
//!
//! Layout
//! ------
//! - [`core`]: containers, layout, recursion, accumulators.
//! - [`models`]: [`HawkesSumExpCustom2`](models::custom2::HawkesSumExpCustom2),
//!   parallel aggregation, normalization.
//! - [`errors`]: [`HawkesError`](errors::HawkesError) and its kinds.
//!
//! Downstream usage
//! ----------------
//! - `use rust_hawkes::hawkes::prelude::*;` imports the public surface.
pub mod core;
pub mod errors;
pub mod models;

pub mod prelude {
    pub use super::core::{
        data::RealizationSet,
        decays::DecayKernelBank,
        layout::{CoeffParts, CoeffView, CoeffViewMut, CoefficientLayout},
        options::{DEFAULT_NEGATIVITY_TOL, EngineOptions, LossScaling},
        realization::{Realization, StateTrajectory, TrajectoryEvent},
    };
    pub use super::errors::{HawkesError, HawkesErrorKind, HawkesResult};
    pub use super::models::{
        custom2::HawkesSumExpCustom2,
        normalize::{CoefficientNormalizer, normalize_impact, normalize_impact_in_place},
    };
}
