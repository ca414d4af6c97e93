//! Realization set — validated two-level container of observed samples.
//!
//! Purpose
//! -------
//! Hold every realization a model is fitted on, already merged into
//! [`StateTrajectory`] form, with declared and checked dimensions: the outer
//! size is the realization count, the inner size is the number of nodes.
//!
//! Key behaviors
//! -------------
//! - [`RealizationSet::new`] validates outer lengths (`events`, `states`, and
//!   optional `end_times` must agree) and then each realization in index
//!   order; the first failure is returned wrapped in
//!   [`HawkesError::InRealization`].
//! - Aggregate counts (`n_total_jumps`, per-node jumps) are computed once at
//!   construction.
//!
//! Invariants & assumptions
//! ------------------------
//! - The set is immutable after construction; models replace it wholesale.
//! - An empty set (zero realizations) is valid and has zero jumps.
//!
//! Downstream usage
//! ----------------
//! - Built by `HawkesSumExpCustom2::set_data`; iterated by the aggregator in
//!   realization-index order.
use crate::hawkes::{
    core::realization::{Realization, StateTrajectory},
    errors::{HawkesError, HawkesResult},
};
use ndarray::{Array1, Zip};

/// RealizationSet — validated realizations of one model.
///
/// Fields
/// ------
/// - `dim`, `max_n`: dimensions every realization was validated against.
/// - `trajectories`: merged event streams, one per realization.
/// - `jumps_per_node`: event counts per node summed over realizations.
#[derive(Debug, Clone, PartialEq)]
pub struct RealizationSet {
    dim: usize,
    max_n: usize,
    trajectories: Vec<StateTrajectory>,
    jumps_per_node: Array1<usize>,
}

impl RealizationSet {
    /// Validate raw realizations and merge each into a trajectory.
    ///
    /// Parameters
    /// ----------
    /// - `dim`, `max_n`: `usize`
    ///   Model dimensions.
    /// - `events`: `Vec<Vec<Array1<f64>>>`
    ///   Outer index = realization, inner index = node.
    /// - `states`: `Vec<Array1<usize>>`
    ///   One merged state sequence per realization.
    /// - `end_times`: `Option<Array1<f64>>`
    ///   One end time per realization; `None` defaults every end time to the
    ///   latest event of its realization.
    ///
    /// Errors
    /// ------
    /// - `HawkesError::ShapeMismatch` if outer lengths disagree.
    /// - `HawkesError::InRealization` wrapping the first per-realization
    ///   failure.
    pub fn new(
        dim: usize, max_n: usize, events: Vec<Vec<Array1<f64>>>, states: Vec<Array1<usize>>,
        end_times: Option<Array1<f64>>,
    ) -> HawkesResult<Self> {
        if states.len() != events.len() {
            return Err(HawkesError::ShapeMismatch {
                what: "state sequences per realization",
                expected: events.len(),
                actual: states.len(),
            });
        }
        if let Some(ends) = &end_times {
            if ends.len() != events.len() {
                return Err(HawkesError::ShapeMismatch {
                    what: "end times per realization",
                    expected: events.len(),
                    actual: ends.len(),
                });
            }
        }

        let mut jumps_per_node = Array1::<usize>::zeros(dim);
        let mut trajectories = Vec::with_capacity(events.len());
        for (index, (timestamps, seq)) in events.into_iter().zip(states).enumerate() {
            let end_time = end_times.as_ref().map(|ends| ends[index]);
            let realization = Realization::new(timestamps, seq, end_time, dim, max_n)
                .map_err(|err| err.in_realization(index))?;
            let traj = StateTrajectory::from_realization(&realization);
            Zip::from(&mut jumps_per_node).and(traj.jumps_per_node()).for_each(|acc, &n| *acc += n);
            trajectories.push(traj);
        }

        Ok(RealizationSet { dim, max_n, trajectories, jumps_per_node })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn max_n(&self) -> usize {
        self.max_n
    }

    /// Number of realizations.
    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    pub fn trajectories(&self) -> &[StateTrajectory] {
        &self.trajectories
    }

    /// Borrow one realization.
    ///
    /// # Errors
    /// - [`HawkesError::RealizationOutOfRange`] for an invalid index.
    pub fn get(&self, index: usize) -> HawkesResult<&StateTrajectory> {
        self.trajectories
            .get(index)
            .ok_or(HawkesError::RealizationOutOfRange { index, len: self.trajectories.len() })
    }

    /// Total number of events over all nodes and realizations.
    pub fn n_total_jumps(&self) -> usize {
        self.jumps_per_node.sum()
    }

    /// Event counts per node summed over realizations.
    pub fn jumps_per_node(&self) -> &Array1<usize> {
        &self.jumps_per_node
    }

    /// End time of every realization, in order.
    pub fn end_times(&self) -> Array1<f64> {
        self.trajectories.iter().map(|traj| traj.end_time()).collect()
    }
}
