//! Realizations and state trajectories — validated event samples aligned with
//! the auxiliary state process.
//!
//! Purpose
//! -------
//! Turn one raw observed sample (per-node timestamp lists, a merged
//! state-index sequence, and an end time) into the time-ordered event stream
//! consumed by the intensity recursion.
//!
//! Key behaviors
//! -------------
//! - [`Realization::new`] validates the raw sample: node count, finite,
//!   non-negative, strictly increasing timestamps per node, state length and
//!   range, and end time. A missing end time defaults to the last event.
//! - [`StateTrajectory::from_realization`] merges the nodes into a single
//!   time-ordered stream of [`TrajectoryEvent`]s, tagging each event with its
//!   owning node, the state in force just before it, and the gap since the
//!   previous merged event. It only accepts a [`Realization`], whose fields
//!   are private, so the merge never sees an unvalidated sample.
//! - The trajectory also sums the gaps into the time spent in each state
//!   over `[0, T]`, which is all the baseline compensator needs.
//!
//! Invariants & assumptions
//! ------------------------
//! - `states.len() == total_events + 1`; `states[0]` is the initial state,
//!   `states[k]` the state after the `k`-th merged event.
//! - Events tied in time across nodes are ordered by node index.
//! - The observation window is `[0, end_time]`.
//!
//! Conventions
//! -----------
//! - "Pre-event state" of merged event `k` (0-based) is `states[k]`; its
//!   "post-event state" is `states[k + 1]`.
use crate::hawkes::{
    core::validation::{validate_end_time, validate_states, validate_timestamps},
    errors::{HawkesError, HawkesResult},
};
use ndarray::Array1;

/// Realization — one validated raw observed sample.
///
/// Fields
/// ------
/// - `timestamps`: one strictly increasing array per node (may be empty).
/// - `states`: merged state-index sequence of length `total_events + 1`.
/// - `end_time`: right edge of the observation window.
///
/// Fields are private; [`Realization::new`] is the only way to build one, so
/// every instance satisfies the invariants above.
#[derive(Debug, Clone, PartialEq)]
pub struct Realization {
    timestamps: Vec<Array1<f64>>,
    states: Array1<usize>,
    end_time: f64,
    max_n: usize,
}

impl Realization {
    /// Validate a raw sample.
    ///
    /// Parameters
    /// ----------
    /// - `timestamps`: `Vec<Array1<f64>>`
    ///   Event times per node; must contain exactly `dim` arrays.
    /// - `states`: `Array1<usize>`
    ///   Merged state sequence with a leading initial-state sentinel.
    /// - `end_time`: `Option<f64>`
    ///   End of the observation window; defaults to the latest event (or 0.0
    ///   for a realization without events).
    /// - `dim`, `max_n`: `usize`
    ///   Number of nodes and number of states of the model.
    ///
    /// Errors
    /// ------
    /// - `HawkesError::ShapeMismatch` for a wrong node count or state length.
    /// - Timestamp errors from [`validate_timestamps`].
    /// - `HawkesError::StateOutOfRange` for states `>= max_n`.
    /// - `HawkesError::InvalidEndTime` for an end time before the last event.
    pub fn new(
        timestamps: Vec<Array1<f64>>, states: Array1<usize>, end_time: Option<f64>, dim: usize,
        max_n: usize,
    ) -> HawkesResult<Self> {
        if timestamps.len() != dim {
            return Err(HawkesError::ShapeMismatch {
                what: "nodes per realization",
                expected: dim,
                actual: timestamps.len(),
            });
        }
        let mut last_event = 0.0_f64;
        for (node, ts) in timestamps.iter().enumerate() {
            if let Some(last) = validate_timestamps(node, ts.view())? {
                last_event = last_event.max(last);
            }
        }
        let n_events = timestamps.iter().map(|ts| ts.len()).sum();
        validate_states(states.view(), n_events, max_n)?;
        let end_time = end_time.unwrap_or(last_event);
        validate_end_time(end_time, last_event)?;
        Ok(Realization { timestamps, states, end_time, max_n })
    }

    pub fn timestamps(&self) -> &[Array1<f64>] {
        &self.timestamps
    }

    pub fn states(&self) -> &Array1<usize> {
        &self.states
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Number of states the sample was validated against.
    pub fn max_n(&self) -> usize {
        self.max_n
    }

    /// Total number of events across nodes.
    pub fn n_events(&self) -> usize {
        self.timestamps.iter().map(|ts| ts.len()).sum()
    }

    /// Latest event time across nodes, if any.
    pub fn last_event(&self) -> Option<f64> {
        self.timestamps.iter().filter_map(|ts| ts.last().copied()).reduce(f64::max)
    }
}

/// One event of the merged stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryEvent {
    /// Arrival time.
    pub time: f64,
    /// Owning node.
    pub node: usize,
    /// State in force just before the event.
    pub state: usize,
    /// Time elapsed since the previous merged event (or since 0).
    pub gap: f64,
}

/// StateTrajectory — time-ordered event stream of one realization.
///
/// Invariants
/// ----------
/// - `events` is sorted by `(time, node)`.
/// - `state_durations.sum() == end_time` up to rounding.
/// - `jumps_per_node.sum() == events.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateTrajectory {
    events: Vec<TrajectoryEvent>,
    final_state: usize,
    end_time: f64,
    state_durations: Array1<f64>,
    jumps_per_node: Array1<usize>,
}

impl StateTrajectory {
    /// Validate raw inputs and build the trajectory in one step.
    ///
    /// # Errors
    /// - Any error from [`Realization::new`].
    pub fn new(
        timestamps: Vec<Array1<f64>>, states: Array1<usize>, end_time: Option<f64>, dim: usize,
        max_n: usize,
    ) -> HawkesResult<Self> {
        let realization = Realization::new(timestamps, states, end_time, dim, max_n)?;
        Ok(StateTrajectory::from_realization(&realization))
    }

    /// Merge a validated realization into a time-ordered trajectory.
    pub fn from_realization(realization: &Realization) -> Self {
        let dim = realization.timestamps.len();
        let max_n = realization.max_n;
        let mut arrivals: Vec<(f64, usize)> = realization
            .timestamps
            .iter()
            .enumerate()
            .flat_map(|(node, ts)| ts.iter().map(move |&t| (t, node)))
            .collect();
        arrivals.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let states = &realization.states;
        let mut previous = 0.0_f64;
        let events: Vec<TrajectoryEvent> = arrivals
            .into_iter()
            .zip(states.iter())
            .map(|((time, node), &state)| {
                let gap = time - previous;
                previous = time;
                TrajectoryEvent { time, node, state, gap }
            })
            .collect();

        let mut state_durations = Array1::<f64>::zeros(max_n);
        let mut jumps_per_node = Array1::<usize>::zeros(dim);
        for event in &events {
            state_durations[event.state] += event.gap;
            jumps_per_node[event.node] += 1;
        }
        let final_state = states[events.len()];
        state_durations[final_state] += realization.end_time - previous;

        StateTrajectory {
            events,
            final_state,
            end_time: realization.end_time,
            state_durations,
            jumps_per_node,
        }
    }

    pub fn events(&self) -> &[TrajectoryEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn final_state(&self) -> usize {
        self.final_state
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Total time in `[0, end_time]` spent in each state.
    pub fn state_durations(&self) -> &Array1<f64> {
        &self.state_durations
    }

    /// Number of events owned by each node.
    pub fn jumps_per_node(&self) -> &Array1<usize> {
        &self.jumps_per_node
    }
}
