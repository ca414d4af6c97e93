//! Loss and gradient accumulators — assemble the negative log-likelihood of
//! one realization from recursion outputs.
//!
//! Purpose
//! -------
//! Combine the per-event intensities of the forward pass, the closed-form
//! compensator, and the reverse-pass backlog into a scalar loss and, on
//! request, a gradient over the flat coefficient layout.
//!
//! Key behaviors
//! -------------
//! - [`LossAccumulator`] keeps the three loss components separately:
//!   `point = Σ_k −ln λ_k`, `baseline = Σ_i μ_i Σ_s f_i[s] D[s]`, and
//!   `excitation = Σ_k Σ_i Σ_u α[u][i][n_k] f_i[σ_k] τ_{k,u}`.
//! - [`GradientAccumulator`] adds the matching partial derivatives into a
//!   caller-owned [`CoeffViewMut`]. It never zeroes its target, so several
//!   realizations may be accumulated into one buffer in a fixed order.
//! - [`evaluate_realization`] drives both over one realization; with
//!   `grad = None` it skips the gradient work and the reverse pass.
//!
//! Invariants & assumptions
//! ------------------------
//! - `context.tails` has shape `(K, U)` and was computed with the same decays
//!   as `context.decays` (see [`decay_tails`](crate::hawkes::core::recursion::decay_tails)).
//! - Coefficients have been validated for length and finiteness.
//!
//! Conventions
//! -----------
//! - Gradients are of the *loss* (negative log-likelihood), not of the
//!   log-likelihood.
use crate::hawkes::{
    core::{
        layout::{CoeffView, CoeffViewMut},
        realization::{StateTrajectory, TrajectoryEvent},
        recursion::{EventEntry, RecursionWorkspace, sweep_backward, walk_events},
    },
    errors::HawkesResult,
};
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Everything one realization evaluation needs besides coefficients.
#[derive(Debug, Clone, Copy)]
pub struct RealizationContext<'a> {
    pub trajectory: &'a StateTrajectory,
    /// Unit impulse integrals to the end time, shape `(K, U)`.
    pub tails: ArrayView2<'a, f64>,
    pub decays: ArrayView1<'a, f64>,
    pub negativity_tol: f64,
}

/// Running loss of one realization, split by component.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LossAccumulator {
    pub point: f64,
    pub baseline: f64,
    pub excitation: f64,
}

impl LossAccumulator {
    /// Point term of one event.
    pub fn add_event(&mut self, intensity: f64) {
        self.point -= intensity.ln();
    }

    /// Integrated state-modulated baseline over `[0, T]`.
    pub fn add_baseline(&mut self, trajectory: &StateTrajectory, coeffs: &CoeffView<'_>) {
        let durations = trajectory.state_durations();
        for (mu, row) in coeffs.baseline.iter().zip(coeffs.impact.rows()) {
            self.baseline += mu * row.dot(durations);
        }
    }

    /// Integrated impulses of one event onto every target.
    pub fn add_excitation(&mut self, event: &TrajectoryEvent, tails: ArrayView1<f64>, coeffs: &CoeffView<'_>) {
        let j = event.node;
        let dim = coeffs.baseline.len();
        for i in 0..dim {
            let f = coeffs.impact[[i, event.state]];
            let mass: f64 = tails.iter().enumerate().map(|(u, tau)| coeffs.adjacency[[u, i, j]] * tau).sum();
            self.excitation += f * mass;
        }
    }

    /// Compensator, i.e. the integrated intensity over all nodes.
    pub fn compensator(&self) -> f64 {
        self.baseline + self.excitation
    }

    pub fn total(&self) -> f64 {
        self.point + self.compensator()
    }
}

/// GradientAccumulator — adds loss partials into a structured buffer.
#[derive(Debug)]
pub struct GradientAccumulator<'g> {
    grad: CoeffViewMut<'g>,
}

impl<'g> GradientAccumulator<'g> {
    pub fn new(grad: CoeffViewMut<'g>) -> Self {
        GradientAccumulator { grad }
    }

    /// Point-term partials of one event:
    /// `−f_i[s]/λ` for `μ_i`, `−μ_i/λ` for `f_i[s]`, `−G[i][j][u]/λ` for `α[u][i][j]`.
    pub fn add_event(&mut self, entry: &EventEntry, unit_row: ArrayView2<f64>, coeffs: &CoeffView<'_>) {
        let (i, s) = (entry.node, entry.state);
        let w = 1.0 / entry.intensity;
        self.grad.baseline[i] -= coeffs.impact[[i, s]] * w;
        self.grad.impact[[i, s]] -= coeffs.baseline[i] * w;
        for ((j, u), &g) in unit_row.indexed_iter() {
            self.grad.adjacency[[u, i, j]] -= g * w;
        }
    }

    /// Baseline compensator partials: `Σ_s f_i[s] D[s]` for `μ_i` and
    /// `μ_i D[s]` for `f_i[s]`.
    pub fn add_baseline(&mut self, trajectory: &StateTrajectory, coeffs: &CoeffView<'_>) {
        let durations = trajectory.state_durations();
        for (i, row) in coeffs.impact.rows().into_iter().enumerate() {
            self.grad.baseline[i] += row.dot(durations);
            let mu = coeffs.baseline[i];
            self.grad.impact.row_mut(i).scaled_add(mu, durations);
        }
    }

    /// Excitation compensator partials of one event of source `j` in state `s`.
    pub fn add_excitation(&mut self, event: &TrajectoryEvent, tails: ArrayView1<f64>, coeffs: &CoeffView<'_>) {
        let (j, s) = (event.node, event.state);
        let dim = coeffs.baseline.len();
        for i in 0..dim {
            let f = coeffs.impact[[i, s]];
            for (u, &tau) in tails.iter().enumerate() {
                self.grad.adjacency[[u, i, j]] += f * tau;
                self.grad.impact[[i, s]] += coeffs.adjacency[[u, i, j]] * tau;
            }
        }
    }

    /// Impact-table partials of the point terms reached by one event's
    /// impulses: `−Σ_u α[u][i][j] B[i][u]` for `f_i[s]`.
    pub fn add_backlog(&mut self, event: &TrajectoryEvent, backlog: ArrayView2<f64>, coeffs: &CoeffView<'_>) {
        let (j, s) = (event.node, event.state);
        for ((i, u), &b) in backlog.indexed_iter() {
            self.grad.impact[[i, s]] -= coeffs.adjacency[[u, i, j]] * b;
        }
    }
}

struct Pass<'g> {
    loss: LossAccumulator,
    grad: Option<GradientAccumulator<'g>>,
}

/// Evaluate the loss of one realization and optionally add its gradient
/// into `grad`.
///
/// Returns
/// -------
/// The unscaled negative log-likelihood of the realization.
///
/// Errors
/// ------
/// - `HawkesError::NumericalInstability` from the forward recursion.
pub fn evaluate_realization(
    context: RealizationContext<'_>, coeffs: &CoeffView<'_>, workspace: &mut RecursionWorkspace,
    grad: Option<CoeffViewMut<'_>>,
) -> HawkesResult<f64> {
    let trajectory = context.trajectory;
    let mut pass = Pass { loss: LossAccumulator::default(), grad: grad.map(GradientAccumulator::new) };

    pass.loss.add_baseline(trajectory, coeffs);
    if let Some(acc) = pass.grad.as_mut() {
        acc.add_baseline(trajectory, coeffs);
    }
    for (event, tails) in trajectory.events().iter().zip(context.tails.rows()) {
        pass.loss.add_excitation(event, tails, coeffs);
        if let Some(acc) = pass.grad.as_mut() {
            acc.add_excitation(event, tails, coeffs);
        }
    }

    walk_events(
        trajectory,
        coeffs,
        context.decays,
        context.negativity_tol,
        workspace,
        &mut pass,
        |entry, ws, pass| {
            pass.loss.add_event(entry.intensity);
            if let Some(acc) = pass.grad.as_mut() {
                acc.add_event(&entry, ws.unit_row(entry.node), coeffs);
            }
            Ok(())
        },
    )?;

    if let Some(acc) = pass.grad.as_mut() {
        sweep_backward(trajectory, context.decays, workspace, |event, backlog| {
            acc.add_backlog(event, backlog, coeffs)
        });
    }

    let loss = pass.loss;
    log::trace!(
        "realization loss: point={:.6e} baseline={:.6e} excitation={:.6e}",
        loss.point,
        loss.baseline,
        loss.excitation
    );
    Ok(loss.total())
}

/// Intensity of the owning node at every merged event, in merge order.
///
/// # Errors
/// - `HawkesError::NumericalInstability` from the forward recursion.
pub fn event_intensities(
    context: RealizationContext<'_>, coeffs: &CoeffView<'_>, workspace: &mut RecursionWorkspace,
) -> HawkesResult<Array1<f64>> {
    let mut out = Vec::with_capacity(context.trajectory.len());
    walk_events(
        context.trajectory,
        coeffs,
        context.decays,
        context.negativity_tol,
        workspace,
        &mut out,
        |entry, _, out| {
            out.push(entry.intensity);
            Ok(())
        },
    )?;
    Ok(Array1::from(out))
}
