//! State-modulated sum-exponential Hawkes model — multi-realization loss and
//! gradient engine.
//!
//! Purpose
//! -------
//! Provide [`HawkesSumExpCustom2`], the object an external solver talks to:
//! it owns the fixed model dimensions and decay rates, holds the validated
//! realizations, and evaluates the negative log-likelihood and its gradient
//! for arbitrary flat coefficient vectors.
//!
//! Key behaviors
//! -------------
//! - [`HawkesSumExpCustom2::set_data`] validates and replaces all realizations
//!   at once, then caches the per-event decay tails that the compensator needs.
//! - [`HawkesSumExpCustom2::set_decays`] swaps the decay rates (same `U`) and
//!   rebuilds the cached tails; nothing else depends on the rates.
//! - `loss`, `grad`, and `loss_and_grad` fan the realizations out over a
//!   dedicated worker pool and reduce the parts in realization order.
//! - Single-realization entry points (`loss_realization`,
//!   `grad_realization`, `event_intensities`) run on the calling thread and
//!   are never scaled.
//! - The model implements [`LogLikelihood`] (`ℓ = −loss`), so it can be
//!   handed to the argmin adapter without a wrapper.
//!
//! Invariants & assumptions
//! ------------------------
//! - `dim`, `U`, `MaxN` never change after construction.
//! - Recursion workspaces live only for the duration of one evaluation; the
//!   model carries no state between calls apart from data and tails.
//! - Under `LossScaling::Sum` the loss is additive over realizations.
//!
//! Conventions
//! -----------
//! - Coefficient vectors follow [`CoefficientLayout`]:
//!   `[μ (dim) | α[u][i][j] (U·dim·dim) | f[i][s] (dim·MaxN)]`.
//! - Output buffers are overwritten, never reallocated.
//!
//! Testing notes
//! -------------
//! - Unit tests here cover construction errors, lifecycle errors, decay
//!   updates, and loss scaling.
//! - Reference comparisons, finite differences, additivity, normalization,
//!   and thread-count determinism live in
//!   `tests/integration_custom2_pipeline.rs`.
use crate::{
    hawkes::{
        core::{
            accumulators::{RealizationContext, evaluate_realization, event_intensities},
            data::RealizationSet,
            decays::DecayKernelBank,
            layout::{CoeffView, CoefficientLayout},
            options::EngineOptions,
            recursion::{RecursionWorkspace, decay_tails},
            validation::{validate_coeffs, validate_out_len},
        },
        errors::{HawkesError, HawkesResult},
        models::{
            aggregate::{RealizationPool, reduce_ordered},
            normalize::normalize_impact,
        },
    },
    optimization::{
        errors::OptResult,
        loglik_optimizer::{Cost, Grad, LogLikelihood, Theta},
    },
};
use ndarray::{Array1, Array2, ArrayView1, ArrayViewMut1};

/// HawkesSumExpCustom2 — state-modulated sum-exponential Hawkes likelihood.
///
/// Fields
/// ------
/// - `layout`: fixed dimensions `(dim, U, MaxN)`.
/// - `decays`: the `U` decay rates.
/// - `options`: validated engine options.
/// - `pool`: dedicated worker pool of `options.n_threads` threads.
/// - `data`: realizations, `None` until `set_data`.
/// - `tails`: per-realization `(K, U)` unit-impulse integrals.
#[derive(Debug)]
pub struct HawkesSumExpCustom2 {
    layout: CoefficientLayout,
    decays: DecayKernelBank,
    options: EngineOptions,
    pool: RealizationPool,
    data: Option<RealizationSet>,
    tails: Vec<Array2<f64>>,
}

impl HawkesSumExpCustom2 {
    /// Construct a model without data.
    ///
    /// Parameters
    /// ----------
    /// - `dim`: `usize`
    ///   Number of nodes, `>= 1`.
    /// - `decays`: `Array1<f64>`
    ///   Decay rates `β_u`, non-empty, finite, `> 0`.
    /// - `max_n`: `usize`
    ///   Number of states of the impact table, `>= 1`.
    /// - `options`: [`EngineOptions`]
    ///   Thread count, loss scaling, negativity tolerance.
    ///
    /// Errors
    /// ------
    /// - `HawkesError::InvalidDimension`, `EmptyDecays`, `InvalidDecay`.
    /// - `HawkesError::ThreadPoolBuild` if the worker pool cannot start.
    pub fn new(dim: usize, decays: Array1<f64>, max_n: usize, options: EngineOptions) -> HawkesResult<Self> {
        let decays = DecayKernelBank::new(decays)?;
        let layout = CoefficientLayout::new(dim, decays.len(), max_n)?;
        let pool = RealizationPool::new(options.n_threads)?;
        Ok(HawkesSumExpCustom2 { layout, decays, options, pool, data: None, tails: Vec::new() })
    }

    /// Replace all realizations.
    ///
    /// Parameters
    /// ----------
    /// - `events`: `Vec<Vec<Array1<f64>>>`
    ///   Timestamps, outer index = realization, inner index = node.
    /// - `states`: `Vec<Array1<usize>>`
    ///   Merged state sequences (`events + 1` entries each).
    /// - `end_times`: `Option<Array1<f64>>`
    ///   One end time per realization, or `None` for "last event".
    ///
    /// Errors
    /// ------
    /// - Any error of [`RealizationSet::new`]. On error the previous data is
    ///   kept.
    pub fn set_data(
        &mut self, events: Vec<Vec<Array1<f64>>>, states: Vec<Array1<usize>>, end_times: Option<Array1<f64>>,
    ) -> HawkesResult<()> {
        let data = RealizationSet::new(self.layout.dim, self.layout.max_n, events, states, end_times)?;
        log::debug!(
            "set_data: {} realizations, {} total jumps",
            data.len(),
            data.n_total_jumps()
        );
        self.tails = data.trajectories().iter().map(|traj| decay_tails(traj, &self.decays)).collect();
        self.data = Some(data);
        Ok(())
    }

    /// Replace the decay rates; `U` must not change.
    ///
    /// # Errors
    /// - `HawkesError::ShapeMismatch` for a different number of rates.
    /// - `HawkesError::InvalidDecay` for a non-positive or non-finite rate.
    pub fn set_decays(&mut self, decays: Array1<f64>) -> HawkesResult<()> {
        self.decays.replace(decays)?;
        if let Some(data) = &self.data {
            self.tails = data.trajectories().iter().map(|traj| decay_tails(traj, &self.decays)).collect();
        }
        log::debug!("set_decays: {:?}", self.decays.view().to_vec());
        Ok(())
    }

    pub fn decays(&self) -> ArrayView1<'_, f64> {
        self.decays.view()
    }

    pub fn layout(&self) -> CoefficientLayout {
        self.layout
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub fn n_nodes(&self) -> usize {
        self.layout.dim
    }

    pub fn max_n(&self) -> usize {
        self.layout.max_n
    }

    pub fn n_decays(&self) -> usize {
        self.layout.n_decays
    }

    /// Length of the flat coefficient vector.
    pub fn n_coeffs(&self) -> usize {
        self.layout.n_coeffs()
    }

    /// Number of realizations currently set (0 before `set_data`).
    pub fn n_realizations(&self) -> usize {
        self.data.as_ref().map_or(0, RealizationSet::len)
    }

    /// Total number of events over all nodes and realizations (0 before
    /// `set_data`).
    pub fn n_total_jumps(&self) -> usize {
        self.data.as_ref().map_or(0, RealizationSet::n_total_jumps)
    }

    /// Number of samples in one stochastic epoch; equal to the total jumps.
    pub fn epoch_size(&self) -> usize {
        self.n_total_jumps()
    }

    /// # Errors
    /// - [`HawkesError::ModelNotFitted`] before `set_data`.
    pub fn n_jumps_per_node(&self) -> HawkesResult<Array1<usize>> {
        Ok(self.fitted()?.jumps_per_node().clone())
    }

    /// # Errors
    /// - [`HawkesError::ModelNotFitted`] before `set_data`.
    pub fn end_times(&self) -> HawkesResult<Array1<f64>> {
        Ok(self.fitted()?.end_times())
    }

    /// Aggregate loss over all realizations, scaled per the configured loss scaling.
    ///
    /// # Errors
    /// - `ModelNotFitted`, `CoeffLengthMismatch`, `NonFiniteCoeff`.
    /// - `NumericalInstability` from the recursion.
    pub fn loss(&self, coeffs: ArrayView1<f64>) -> HawkesResult<f64> {
        let data = self.fitted()?;
        validate_coeffs(coeffs, self.n_coeffs())?;
        let coeffs = coeffs.as_standard_layout();
        let view = self.layout.view(coeffs.view())?;
        let (dim, n_decays) = (self.layout.dim, self.layout.n_decays);

        let parts = self.pool.map_ordered(
            data.len(),
            || RecursionWorkspace::new(dim, n_decays),
            |ws, r| evaluate_realization(self.context(data, r), &view, ws, None),
        )?;
        let loss = parts.iter().sum::<f64>() * self.scale(data);
        log::trace!("loss over {} realizations: {loss:.12e}", data.len());
        Ok(loss)
    }

    /// Aggregate gradient written into `out`.
    ///
    /// # Errors
    /// - Same as [`HawkesSumExpCustom2::loss`], plus `CoeffLengthMismatch`
    ///   for a wrongly sized `out`.
    pub fn grad(&self, coeffs: ArrayView1<f64>, out: ArrayViewMut1<f64>) -> HawkesResult<()> {
        self.loss_and_grad(coeffs, out)?;
        Ok(())
    }

    /// Loss and gradient in one pass; the gradient is written into `out`.
    ///
    /// # Errors
    /// - Same as [`HawkesSumExpCustom2::grad`].
    pub fn loss_and_grad(&self, coeffs: ArrayView1<f64>, out: ArrayViewMut1<f64>) -> HawkesResult<f64> {
        let data = self.fitted()?;
        let n_coeffs = self.n_coeffs();
        validate_coeffs(coeffs, n_coeffs)?;
        validate_out_len(out.len(), n_coeffs)?;
        let coeffs = coeffs.as_standard_layout();
        let view = self.layout.view(coeffs.view())?;
        let (dim, n_decays) = (self.layout.dim, self.layout.n_decays);

        let parts = self.pool.map_ordered(
            data.len(),
            || RecursionWorkspace::new(dim, n_decays),
            |ws, r| {
                let mut grad = Array1::<f64>::zeros(n_coeffs);
                let grad_view = self.layout.view_mut(grad.view_mut())?;
                let loss = evaluate_realization(self.context(data, r), &view, ws, Some(grad_view))?;
                Ok((loss, grad))
            },
        )?;
        let loss = reduce_ordered(&parts, self.scale(data), out);
        log::trace!("loss and gradient over {} realizations: {loss:.12e}", data.len());
        Ok(loss)
    }

    /// Unscaled loss of realization `r` alone.
    ///
    /// # Errors
    /// - `RealizationOutOfRange` for an invalid index, plus the errors of
    ///   [`HawkesSumExpCustom2::loss`].
    pub fn loss_realization(&self, r: usize, coeffs: ArrayView1<f64>) -> HawkesResult<f64> {
        let data = self.fitted()?;
        data.get(r)?;
        validate_coeffs(coeffs, self.n_coeffs())?;
        let coeffs = coeffs.as_standard_layout();
        let view = self.layout.view(coeffs.view())?;
        let mut ws = RecursionWorkspace::new(self.layout.dim, self.layout.n_decays);
        evaluate_realization(self.context(data, r), &view, &mut ws, None)
    }

    /// Unscaled gradient of realization `r` alone, written into `out`.
    ///
    /// # Errors
    /// - Same as [`HawkesSumExpCustom2::loss_realization`], plus
    ///   `CoeffLengthMismatch` for a wrongly sized `out`.
    pub fn grad_realization(&self, r: usize, coeffs: ArrayView1<f64>, mut out: ArrayViewMut1<f64>) -> HawkesResult<()> {
        let data = self.fitted()?;
        data.get(r)?;
        validate_coeffs(coeffs, self.n_coeffs())?;
        validate_out_len(out.len(), self.n_coeffs())?;
        let coeffs = coeffs.as_standard_layout();
        let view = self.layout.view(coeffs.view())?;
        let mut grad = Array1::<f64>::zeros(self.n_coeffs());
        let mut ws = RecursionWorkspace::new(self.layout.dim, self.layout.n_decays);
        evaluate_realization(self.context(data, r), &view, &mut ws, Some(self.layout.view_mut(grad.view_mut())?))?;
        out.assign(&grad);
        Ok(())
    }

    /// Intensity of the owning node at every merged event of realization `r`.
    ///
    /// # Errors
    /// - Same as [`HawkesSumExpCustom2::loss_realization`].
    pub fn event_intensities(&self, r: usize, coeffs: ArrayView1<f64>) -> HawkesResult<Array1<f64>> {
        let data = self.fitted()?;
        data.get(r)?;
        validate_coeffs(coeffs, self.n_coeffs())?;
        let coeffs = coeffs.as_standard_layout();
        let view = self.layout.view(coeffs.view())?;
        let mut ws = RecursionWorkspace::new(self.layout.dim, self.layout.n_decays);
        event_intensities(self.context(data, r), &view, &mut ws)
    }

    /// Rescale a converged coefficient vector so every `f_i[0] == 1`.
    ///
    /// # Errors
    /// - See [`normalize_impact`].
    pub fn normalize_coeffs(&self, coeffs: ArrayView1<f64>) -> HawkesResult<Array1<f64>> {
        normalize_impact(&self.layout, coeffs)
    }

    fn fitted(&self) -> HawkesResult<&RealizationSet> {
        self.data.as_ref().ok_or(HawkesError::ModelNotFitted)
    }

    fn context<'a>(&'a self, data: &'a RealizationSet, r: usize) -> RealizationContext<'a> {
        RealizationContext {
            trajectory: &data.trajectories()[r],
            tails: self.tails[r].view(),
            decays: self.decays.view(),
            negativity_tol: self.options.negativity_tol,
        }
    }

    fn scale(&self, data: &RealizationSet) -> f64 {
        self.options.loss_scaling.factor(data.n_total_jumps())
    }

    /// Structured view of a coefficient vector under this model's layout.
    ///
    /// # Errors
    /// - `CoeffLengthMismatch` for a wrongly sized vector.
    pub fn view_coeffs<'a>(&self, coeffs: ArrayView1<'a, f64>) -> HawkesResult<CoeffView<'a>> {
        self.layout.view(coeffs)
    }
}

impl LogLikelihood for HawkesSumExpCustom2 {
    type Data = ();

    /// `ℓ(θ) = −loss(θ)`.
    fn value(&self, theta: &Theta, _data: &Self::Data) -> OptResult<Cost> {
        Ok(-self.loss(theta.view())?)
    }

    fn check(&self, theta: &Theta, _data: &Self::Data) -> OptResult<()> {
        self.fitted()?;
        validate_coeffs(theta.view(), self.n_coeffs())?;
        Ok(())
    }

    /// `∇ℓ(θ) = −∇loss(θ)`.
    fn grad(&self, theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        let mut out = Array1::<f64>::zeros(self.n_coeffs());
        self.grad(theta.view(), out.view_mut())?;
        out.mapv_inplace(|g| -g);
        Ok(out)
    }
}
