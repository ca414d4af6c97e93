//! Intensity recursion — exponential-kernel accumulators walked over one
//! realization.
//!
//! Purpose
//! -------
//! Evaluate the conditional intensity of the owning node at every merged
//! event of a [`StateTrajectory`] in `O(K · dim · U)` time, using the
//! classical recursive trick for exponential kernels instead of summing over
//! all past events.
//!
//! Key behaviors
//! -------------
//! - [`RecursionWorkspace`] stores *unit* accumulators
//!   `G[i][j][u] = Σ_{l before t, n_l = j} f_i[σ_l] · exp(−β_u (t − t_l))`,
//!   so that `R[i][j][u] = α[u][i][j] · G[i][j][u]`. Each `(i, j)` pair carries
//!   its own last-touch time and is decayed lazily, only when it is read or
//!   excited.
//! - [`walk_events`] runs the forward pass: for each event it decays the
//!   owning node's row, evaluates `λ`, hands an [`EventEntry`] to a caller
//!   closure, and then excites every target node with the new impulse.
//! - [`sweep_backward`] runs the reverse pass that accumulates
//!   `B[i][u](t_l) = Σ_{k after l, n_k = i} w_k · exp(−β_u (t_k − t_l))` with
//!   `w_k = 1 / λ_k`, which the impact-table gradient needs.
//! - [`decay_tails`] precomputes `τ_{k,u} = (1 − exp(−β_u (T − t_k))) / β_u`,
//!   the integral of a unit impulse from event `k` to the end time.
//!
//! Invariants & assumptions
//! ------------------------
//! - The trajectory has been validated (time-ordered, in-range states).
//! - The workspace dimensions match the coefficient layout `(dim, U)`.
//! - A workspace is exclusively owned by one realization at a time and is
//!   reset at the start of every forward pass; nothing persists across
//!   `loss` / `grad` calls.
//!
//! Conventions
//! -----------
//! - `unit` has shape `(dim, dim, U)` indexed `[[target, source, u]]`.
//! - Events tied in time see each other's impulses in merge order with a
//!   decay factor of one.
//!
//! Testing notes
//! -------------
//! - Unit tests compare the recursion with a direct double sum on a small
//!   hand-built trajectory and check the instability guard.
//! - Gradient correctness is covered through `accumulators.rs` and the
//!   finite-difference integration tests.
use crate::hawkes::{
    core::{
        decays::DecayKernelBank,
        layout::CoeffView,
        realization::{StateTrajectory, TrajectoryEvent},
    },
    errors::{HawkesError, HawkesResult},
};
use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, Axis, Zip, s};

/// EventEntry — view of one merged event during the forward pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventEntry {
    /// Position in the merged stream.
    pub idx: usize,
    /// Owning node.
    pub node: usize,
    /// Pre-event state.
    pub state: usize,
    /// Arrival time.
    pub time: f64,
    /// Intensity of `node` just before the event; finite and > 0.
    pub intensity: f64,
}

/// RecursionWorkspace — per-realization recursion state.
///
/// Fields
/// ------
/// - `unit`: unit accumulators `G`, shape `(dim, dim, U)`.
/// - `last_touch`: time each `(target, source)` pair was last decayed.
/// - `backlog`: reverse-pass accumulators `B`, shape `(dim, U)`.
/// - `weights`: `1 / λ_k` for every event of the last forward pass.
#[derive(Debug, Clone)]
pub struct RecursionWorkspace {
    unit: Array3<f64>,
    last_touch: Array2<f64>,
    backlog: Array2<f64>,
    factors: Array1<f64>,
    weights: Vec<f64>,
}

impl RecursionWorkspace {
    pub fn new(dim: usize, n_decays: usize) -> Self {
        RecursionWorkspace {
            unit: Array3::zeros((dim, dim, n_decays)),
            last_touch: Array2::zeros((dim, dim)),
            backlog: Array2::zeros((dim, n_decays)),
            factors: Array1::zeros(n_decays),
            weights: Vec::new(),
        }
    }

    /// Clear every accumulator for a fresh realization.
    pub fn reset(&mut self) {
        self.unit.fill(0.0);
        self.last_touch.fill(0.0);
        self.backlog.fill(0.0);
        self.weights.clear();
    }

    /// Unit accumulators of one target node, shape `(dim, U)` indexed
    /// `[[source, u]]`, as of the last read.
    pub fn unit_row(&self, node: usize) -> ArrayView2<'_, f64> {
        self.unit.index_axis(Axis(0), node)
    }

    /// Reciprocal intensities recorded by the last forward pass.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    fn decay_pair(&mut self, target: usize, source: usize, time: f64, decays: ArrayView1<f64>) {
        let dt = time - self.last_touch[[target, source]];
        if dt > 0.0 {
            let mut cell = self.unit.slice_mut(s![target, source, ..]);
            Zip::from(&mut cell).and(&decays).for_each(|g, &beta| *g *= (-beta * dt).exp());
            self.last_touch[[target, source]] = time;
        }
    }

    /// Decay the accumulators of `node` to `time` and evaluate
    /// `λ_node(time⁻) = μ_node f_node[state] + Σ_j Σ_u α[u][node][j] G[node][j][u]`.
    ///
    /// The guard applies to the unit accumulators `G`, which depend only on
    /// the impact table, and to the total intensity. The weighted terms
    /// `α·G` are not checked individually: a negative adjacency entry is
    /// accepted as long as `λ` stays positive, so unconstrained solvers may
    /// pass through that region.
    ///
    /// # Errors
    /// - [`HawkesError::NumericalInstability`] if a unit accumulator is below
    ///   `−negativity_tol`, or if the intensity is non-finite or `<= 0`.
    pub fn intensity_at(
        &mut self, node: usize, state: usize, time: f64, coeffs: &CoeffView<'_>,
        decays: ArrayView1<f64>, negativity_tol: f64,
    ) -> HawkesResult<f64> {
        let dim = self.last_touch.ncols();
        let mut lambda = coeffs.baseline[node] * coeffs.impact[[node, state]];
        for source in 0..dim {
            self.decay_pair(node, source, time, decays);
            for (u, &g) in self.unit.slice(s![node, source, ..]).iter().enumerate() {
                if g < -negativity_tol {
                    return Err(HawkesError::NumericalInstability {
                        node,
                        time,
                        value: g,
                        what: "unit accumulator",
                    });
                }
                lambda += coeffs.adjacency[[u, node, source]] * g;
            }
        }
        if !lambda.is_finite() || lambda <= 0.0 {
            return Err(HawkesError::NumericalInstability { node, time, value: lambda, what: "intensity" });
        }
        Ok(lambda)
    }

    /// Add the impulse of an event of `source` in pre-event state `state` to
    /// every target: `G[i][source][u] += f_i[state]`.
    pub fn excite(
        &mut self, source: usize, state: usize, time: f64, impact: ArrayView2<f64>,
        decays: ArrayView1<f64>,
    ) {
        let dim = self.last_touch.nrows();
        for target in 0..dim {
            self.decay_pair(target, source, time, decays);
            let jump = impact[[target, state]];
            self.unit.slice_mut(s![target, source, ..]).mapv_inplace(|g| g + jump);
            self.last_touch[[target, source]] = time;
        }
    }
}

/// Run the forward intensity recursion over one trajectory.
///
/// Parameters
/// ----------
/// - `trajectory`: the merged event stream.
/// - `coeffs`: structured coefficient view.
/// - `decays`: the `U` decay rates.
/// - `negativity_tol`: slack tolerated below zero for unit accumulators.
/// - `workspace`: recursion state; reset on entry.
/// - `state`, `step`: caller accumulator and per-event closure. `step`
///   receives the event, read access to the workspace with the owning row
///   already decayed to the event time, and the caller state.
///
/// Errors
/// ------
/// - `HawkesError::NumericalInstability` from
///   [`RecursionWorkspace::intensity_at`].
/// - Any error returned by `step`.
pub fn walk_events<State, Step>(
    trajectory: &StateTrajectory, coeffs: &CoeffView<'_>, decays: ArrayView1<f64>,
    negativity_tol: f64, workspace: &mut RecursionWorkspace, state: &mut State, mut step: Step,
) -> HawkesResult<()>
where
    Step: FnMut(EventEntry, &RecursionWorkspace, &mut State) -> HawkesResult<()>,
{
    workspace.reset();
    for (idx, event) in trajectory.events().iter().enumerate() {
        let intensity =
            workspace.intensity_at(event.node, event.state, event.time, coeffs, decays, negativity_tol)?;
        workspace.weights.push(1.0 / intensity);
        let entry =
            EventEntry { idx, node: event.node, state: event.state, time: event.time, intensity };
        step(entry, workspace, state)?;
        workspace.excite(event.node, event.state, event.time, coeffs.impact.view(), decays);
    }
    Ok(())
}

/// Reverse pass over the events of the last forward walk.
///
/// `visit(event, backlog)` is called for every event from last to first with
/// `backlog[[i, u]] = Σ_{k after l, n_k = i} w_k exp(−β_u (t_k − t_l))`, the
/// weighted decayed mass that event `l`'s impulses reach on each target.
///
/// The workspace must hold the weights of a forward walk over the same
/// trajectory; only [`walk_events`] callers inside the crate can guarantee
/// that.
pub(crate) fn sweep_backward<Visit>(
    trajectory: &StateTrajectory, decays: ArrayView1<f64>, workspace: &mut RecursionWorkspace,
    mut visit: Visit,
) where
    Visit: FnMut(&TrajectoryEvent, ArrayView2<f64>),
{
    let RecursionWorkspace { backlog, factors, weights, .. } = workspace;
    debug_assert_eq!(weights.len(), trajectory.len(), "workspace weights belong to another trajectory");
    backlog.fill(0.0);
    let mut clock = trajectory.events().last().map_or(0.0, |event| event.time);
    for (event, &weight) in trajectory.events().iter().zip(weights.iter()).rev() {
        let dt = clock - event.time;
        if dt > 0.0 {
            Zip::from(&mut *factors).and(&decays).for_each(|f, &beta| *f = (-beta * dt).exp());
            for mut row in backlog.rows_mut() {
                row *= &*factors;
            }
            clock = event.time;
        }
        visit(event, backlog.view());
        backlog.row_mut(event.node).mapv_inplace(|b| b + weight);
    }
}

/// Integral of a unit impulse from every event to the end time, shape
/// `(K, U)`: `τ[[k, u]] = (1 − exp(−β_u (T − t_k))) / β_u`.
pub fn decay_tails(trajectory: &StateTrajectory, bank: &DecayKernelBank) -> Array2<f64> {
    let mut tails = Array2::zeros((trajectory.len(), bank.len()));
    for (event, row) in trajectory.events().iter().zip(tails.rows_mut()) {
        bank.unit_integrals(trajectory.end_time() - event.time, row);
    }
    tails
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hawkes::core::layout::CoefficientLayout;
    use approx::assert_relative_eq;
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Agreement of the recursive intensity with a direct double sum.
    // - The backward sweep against a direct sum of weighted decays.
    // - The instability guard for non-positive intensities.
    // - Negative adjacency accepted while the intensity stays positive.
    // - Rejection of a workspace filled by another trajectory (debug builds).
    //
    // They intentionally DO NOT cover:
    // - Loss and gradient assembly (see `accumulators.rs`).
    // -------------------------------------------------------------------------

    fn two_node_case() -> (StateTrajectory, CoefficientLayout, Array1<f64>, Array1<f64>) {
        let traj = StateTrajectory::new(
            vec![array![0.3, 1.1, 2.0], array![0.7, 1.1]],
            array![0, 1, 1, 0, 1, 0],
            Some(3.0),
            2,
            2,
        )
        .unwrap();
        let layout = CoefficientLayout::new(2, 2, 2).unwrap();
        let coeffs = layout
            .pack(
                array![0.4, 0.6].view(),
                array![[[0.3, 0.1], [0.2, 0.5]], [[0.05, 0.2], [0.1, 0.15]]].view(),
                array![[1.0, 1.5], [0.8, 1.2]].view(),
            )
            .unwrap();
        (traj, layout, coeffs, array![1.0, 4.0])
    }

    fn direct_intensity(
        traj: &StateTrajectory, view: &CoeffView<'_>, decays: &Array1<f64>, k: usize,
    ) -> f64 {
        let ev = traj.events()[k];
        let i = ev.node;
        let mut lambda = view.baseline[i] * view.impact[[i, ev.state]];
        for prev in &traj.events()[..k] {
            for (u, &beta) in decays.iter().enumerate() {
                lambda += view.adjacency[[u, i, prev.node]]
                    * view.impact[[i, prev.state]]
                    * (-beta * (ev.time - prev.time)).exp();
            }
        }
        lambda
    }

    #[test]
    // Purpose
    // -------
    // The forward recursion reproduces the direct O(K²) intensity at every
    // event, including a tie across nodes.
    //
    // Given
    // -----
    // - Two nodes, two decays, two states, five events with a tie at 1.1.
    //
    // Expect
    // ------
    // - Every `EventEntry::intensity` matches the double sum to 1e-12.
    fn forward_walk_matches_direct_sum() {
        let (traj, layout, coeffs, decays) = two_node_case();
        let view = layout.view(coeffs.view()).unwrap();
        let mut ws = RecursionWorkspace::new(2, 2);
        let mut seen: Vec<f64> = Vec::new();

        walk_events(&traj, &view, decays.view(), 1e-12, &mut ws, &mut seen, |entry, _, seen| {
            seen.push(entry.intensity);
            Ok(())
        })
        .unwrap();

        assert_eq!(seen.len(), traj.len());
        for (k, &lambda) in seen.iter().enumerate() {
            assert_relative_eq!(lambda, direct_intensity(&traj, &view, &decays, k), max_relative = 1e-12);
        }
        assert_eq!(ws.weights().len(), traj.len());
    }

    #[test]
    // Purpose
    // -------
    // The backward sweep delivers the weighted decayed mass of later events.
    //
    // Given
    // -----
    // - The same five-event trajectory after a forward walk.
    //
    // Expect
    // ------
    // - `backlog[[i, u]]` at event `l` equals
    //   `Σ_{k > l, n_k = i} w_k exp(−β_u (t_k − t_l))`.
    fn backward_sweep_matches_direct_sum() {
        let (traj, layout, coeffs, decays) = two_node_case();
        let view = layout.view(coeffs.view()).unwrap();
        let mut ws = RecursionWorkspace::new(2, 2);
        walk_events(&traj, &view, decays.view(), 1e-12, &mut ws, &mut (), |_, _, _| Ok(())).unwrap();
        let weights = ws.weights().to_vec();
        let events = traj.events().to_vec();
        let mut visited = 0usize;

        sweep_backward(&traj, decays.view(), &mut ws, |event, backlog| {
            let l = events.iter().position(|e| e == event).unwrap();
            for i in 0..2 {
                for (u, &beta) in decays.iter().enumerate() {
                    let expected: f64 = events[l + 1..]
                        .iter()
                        .zip(&weights[l + 1..])
                        .filter(|(e, _)| e.node == i)
                        .map(|(e, &w)| w * (-beta * (e.time - event.time)).exp())
                        .sum();
                    assert_relative_eq!(backlog[[i, u]], expected, max_relative = 1e-12, epsilon = 1e-15);
                }
            }
            visited += 1;
        });

        assert_eq!(visited, traj.len());
    }

    #[test]
    // Purpose
    // -------
    // A non-positive intensity is reported, never clamped.
    //
    // Given
    // -----
    // - A single event with zero baseline and no prior excitation.
    //
    // Expect
    // ------
    // - `NumericalInstability` with `what == "intensity"`.
    fn zero_intensity_is_reported() {
        let traj = StateTrajectory::new(vec![array![1.0]], array![0, 0], None, 1, 1).unwrap();
        let layout = CoefficientLayout::new(1, 1, 1).unwrap();
        let coeffs = array![0.0, 0.5, 1.0];
        let view = layout.view(coeffs.view()).unwrap();
        let mut ws = RecursionWorkspace::new(1, 1);

        let err = walk_events(&traj, &view, array![1.0].view(), 1e-12, &mut ws, &mut (), |_, _, _| Ok(()))
            .unwrap_err();

        assert!(matches!(err, HawkesError::NumericalInstability { what: "intensity", .. }));
    }

    #[test]
    // Purpose
    // -------
    // A negative adjacency entry passes while the intensity stays positive;
    // only the total intensity is guarded, not each `α·G` term.
    //
    // Given
    // -----
    // - One node, events at 1.0 and 1.5, baseline 1.0, impact 1.0, decay 1.0.
    // - Adjacency −0.5 first, then −3.0.
    //
    // Expect
    // ------
    // - With −0.5 the second intensity is `1 − 0.5·exp(−0.5)`.
    // - With −3.0 the walk fails on the intensity, not on an accumulator.
    fn negative_adjacency_is_accepted_while_intensity_is_positive() {
        let traj = StateTrajectory::new(vec![array![1.0, 1.5]], array![0, 0, 0], None, 1, 1).unwrap();
        let layout = CoefficientLayout::new(1, 1, 1).unwrap();
        let decays = array![1.0];

        let mild = array![1.0, -0.5, 1.0];
        let view = layout.view(mild.view()).unwrap();
        let mut ws = RecursionWorkspace::new(1, 1);
        let mut seen: Vec<f64> = Vec::new();
        walk_events(&traj, &view, decays.view(), 1e-12, &mut ws, &mut seen, |entry, _, seen| {
            seen.push(entry.intensity);
            Ok(())
        })
        .unwrap();
        assert_relative_eq!(seen[1], 1.0 - 0.5 * (-0.5f64).exp(), max_relative = 1e-12);

        let strong = array![1.0, -3.0, 1.0];
        let view = layout.view(strong.view()).unwrap();
        let mut ws = RecursionWorkspace::new(1, 1);
        let err = walk_events(&traj, &view, decays.view(), 1e-12, &mut ws, &mut (), |_, _, _| Ok(()))
            .unwrap_err();
        assert!(matches!(err, HawkesError::NumericalInstability { what: "intensity", .. }));
    }

    #[test]
    // Purpose
    // -------
    // Decay tails follow the closed-form unit integral to the end time.
    //
    // Given
    // -----
    // - Events at 1.0 and 2.5, end time 4.0, decays [0.5, 2.0].
    //
    // Expect
    // ------
    // - `τ[[k, u]] == (1 − exp(−β_u (4 − t_k))) / β_u`.
    fn decay_tails_match_closed_form() {
        let traj = StateTrajectory::new(vec![array![1.0, 2.5]], array![0, 0, 0], Some(4.0), 1, 1).unwrap();
        let bank = DecayKernelBank::new(array![0.5, 2.0]).unwrap();

        let tails = decay_tails(&traj, &bank);

        assert_eq!(tails.dim(), (2, 2));
        for (k, t) in [1.0_f64, 2.5].iter().enumerate() {
            for (u, beta) in [0.5_f64, 2.0].iter().enumerate() {
                assert_relative_eq!(tails[[k, u]], (1.0 - (-beta * (4.0 - t)).exp()) / beta, max_relative = 1e-14);
            }
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "workspace weights belong to another trajectory")]
    // Purpose
    // -------
    // The reverse pass refuses a workspace whose weights were produced by a
    // different trajectory instead of silently truncating the sweep.
    //
    // Given
    // -----
    // - A forward walk over the five-event two-node case.
    // - A reverse pass over a two-event trajectory with that workspace.
    //
    // Expect
    // ------
    // - A debug assertion failure.
    fn backward_sweep_rejects_foreign_weights() {
        let (traj, layout, coeffs, decays) = two_node_case();
        let view = layout.view(coeffs.view()).unwrap();
        let mut ws = RecursionWorkspace::new(2, 2);
        walk_events(&traj, &view, decays.view(), 1e-12, &mut ws, &mut (), |_, _, _| Ok(())).unwrap();

        let other = StateTrajectory::new(vec![array![0.5], array![1.5]], array![0, 0, 0], None, 2, 2).unwrap();
        sweep_backward(&other, decays.view(), &mut ws, |_, _| {});
    }
}
