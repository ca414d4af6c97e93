//! models — the multi-realization Hawkes model and its post-fit utilities.
//!
//! - [`custom2`]: [`HawkesSumExpCustom2`](custom2::HawkesSumExpCustom2), the
//!   loss/gradient engine exposed to solvers.
//! - [`aggregate`]: dedicated worker pool and ordered reduction.
//! - [`normalize`]: impact-table normalization.
pub mod aggregate;
pub mod custom2;
pub mod normalize;
