//! Validation helpers for Hawkes construction parameters, realization data,
//! and coefficient vectors.
//!
//! Purpose
//! -------
//! Centralize every eager check the likelihood engine performs so that the
//! containers in [`crate::hawkes::core`] and the model in
//! [`crate::hawkes::models`] can assume clean inputs once construction has
//! succeeded.
//!
//! Key behaviors
//! -------------
//! - Construction checks: [`validate_dimension`], [`validate_decays`],
//!   [`validate_n_threads`], [`validate_tolerance`].
//! - Realization checks: [`validate_timestamps`], [`validate_states`],
//!   [`validate_end_time`].
//! - Evaluation-time checks: [`validate_coeffs`], [`validate_out_len`].
//!
//! Conventions
//! -----------
//! - Every helper reports the *first* offending element only.
//! - Helpers never panic and never mutate their inputs.
use crate::hawkes::errors::{HawkesError, HawkesResult};
use ndarray::ArrayView1;

/// Validate a structural dimension (number of nodes, number of states).
///
/// # Errors
/// - [`HawkesError::InvalidDimension`] if `value == 0`.
pub fn validate_dimension(param: &'static str, value: usize) -> HawkesResult<()> {
    if value == 0 {
        return Err(HawkesError::InvalidDimension { param, value });
    }
    Ok(())
}

/// Validate a set of exponential decay rates.
///
/// # Errors
/// - [`HawkesError::EmptyDecays`] if `decays` is empty.
/// - [`HawkesError::InvalidDecay`] for the first entry that is non-finite or ≤ 0.
pub fn validate_decays(decays: ArrayView1<f64>) -> HawkesResult<()> {
    if decays.is_empty() {
        return Err(HawkesError::EmptyDecays);
    }
    for (index, &value) in decays.iter().enumerate() {
        if !value.is_finite() || value <= 0.0 {
            return Err(HawkesError::InvalidDecay { index, value });
        }
    }
    Ok(())
}

/// Validate the worker-pool size.
///
/// # Errors
/// - [`HawkesError::InvalidThreadCount`] if `n_threads == 0`.
pub fn validate_n_threads(n_threads: usize) -> HawkesResult<()> {
    if n_threads == 0 {
        return Err(HawkesError::InvalidThreadCount { n_threads });
    }
    Ok(())
}

/// Validate a non-negative numerical tolerance.
///
/// # Errors
/// - [`HawkesError::InvalidTolerance`] if `value` is non-finite or negative.
pub fn validate_tolerance(value: f64) -> HawkesResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(HawkesError::InvalidTolerance { value });
    }
    Ok(())
}

/// Validate the timestamps of one node and return its last event time.
///
/// Parameters
/// ----------
/// - `node`: `usize`
///   Node index, used only for error reporting.
/// - `timestamps`: `ArrayView1<f64>`
///   Event times of the node. May be empty.
///
/// Returns
/// -------
/// `HawkesResult<Option<f64>>`
///   - `Ok(None)` for an empty node.
///   - `Ok(Some(t_last))` otherwise.
///
/// Errors
/// ------
/// - `HawkesError::NonFiniteTimestamp` for NaN / ±∞ entries.
/// - `HawkesError::NegativeTimestamp` for entries below 0; the observation
///   window always starts at the origin.
/// - `HawkesError::NonIncreasingTimestamps` when an entry is not strictly
///   larger than its predecessor.
pub fn validate_timestamps(node: usize, timestamps: ArrayView1<f64>) -> HawkesResult<Option<f64>> {
    let mut previous: Option<f64> = None;
    for (index, &value) in timestamps.iter().enumerate() {
        if !value.is_finite() {
            return Err(HawkesError::NonFiniteTimestamp { node, index, value });
        }
        if value < 0.0 {
            return Err(HawkesError::NegativeTimestamp { node, index, value });
        }
        if let Some(prev) = previous {
            if value <= prev {
                return Err(HawkesError::NonIncreasingTimestamps {
                    node,
                    index,
                    previous: prev,
                    value,
                });
            }
        }
        previous = Some(value);
    }
    Ok(previous)
}

/// Validate a merged state-index sequence against the event count and the
/// size of the impact table.
///
/// # Errors
/// - [`HawkesError::ShapeMismatch`] if `states.len() != n_events + 1`.
/// - [`HawkesError::StateOutOfRange`] for the first state `>= max_n`.
pub fn validate_states(states: ArrayView1<usize>, n_events: usize, max_n: usize) -> HawkesResult<()> {
    if states.len() != n_events + 1 {
        return Err(HawkesError::ShapeMismatch {
            what: "state sequence (total events + 1)",
            expected: n_events + 1,
            actual: states.len(),
        });
    }
    for (index, &state) in states.iter().enumerate() {
        if state >= max_n {
            return Err(HawkesError::StateOutOfRange { index, state, max_n });
        }
    }
    Ok(())
}

/// Validate a realization end time against its last event.
///
/// # Errors
/// - [`HawkesError::InvalidEndTime`] if `end_time` is non-finite or earlier
///   than `last_event`.
pub fn validate_end_time(end_time: f64, last_event: f64) -> HawkesResult<()> {
    if !end_time.is_finite() || end_time < last_event {
        return Err(HawkesError::InvalidEndTime { end_time, last_event });
    }
    Ok(())
}

/// Validate a coefficient vector against the expected layout length.
///
/// # Errors
/// - [`HawkesError::CoeffLengthMismatch`] on a length mismatch.
/// - [`HawkesError::NonFiniteCoeff`] for the first NaN / ±∞ entry.
pub fn validate_coeffs(coeffs: ArrayView1<f64>, expected: usize) -> HawkesResult<()> {
    if coeffs.len() != expected {
        return Err(HawkesError::CoeffLengthMismatch { expected, actual: coeffs.len() });
    }
    for (index, &value) in coeffs.iter().enumerate() {
        if !value.is_finite() {
            return Err(HawkesError::NonFiniteCoeff { index, value });
        }
    }
    Ok(())
}

/// Validate that a caller-provided output buffer has the layout length.
///
/// # Errors
/// - [`HawkesError::CoeffLengthMismatch`] on a length mismatch.
pub fn validate_out_len(actual: usize, expected: usize) -> HawkesResult<()> {
    if actual != expected {
        return Err(HawkesError::CoeffLengthMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Happy paths and first-offender reporting for each validator.
    //
    // They intentionally DO NOT cover:
    // - How validators are composed into realization construction
    //   (see `realization.rs` and `data.rs`).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Decay validation rejects empty, zero, negative, and non-finite rates.
    //
    // Given
    // -----
    // - Several decay vectors, one valid.
    //
    // Expect
    // ------
    // - The valid vector passes; others report the first offending index.
    fn validate_decays_reports_first_offender() {
        assert!(validate_decays(array![1.0, 10.0].view()).is_ok());
        assert_eq!(validate_decays(ndarray::Array1::<f64>::zeros(0).view()), Err(HawkesError::EmptyDecays));
        assert_eq!(
            validate_decays(array![1.0, 0.0, -1.0].view()),
            Err(HawkesError::InvalidDecay { index: 1, value: 0.0 })
        );
        assert!(matches!(
            validate_decays(array![f64::NAN].view()),
            Err(HawkesError::InvalidDecay { index: 0, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Timestamp validation returns the last event and rejects ties,
    // decreasing, negative, and non-finite times.
    //
    // Given
    // -----
    // - A valid node, an empty node, and several malformed nodes.
    //
    // Expect
    // ------
    // - `Ok(Some(last))` / `Ok(None)` for valid input.
    // - The matching error variant otherwise.
    fn validate_timestamps_checks_order_and_domain() {
        assert_eq!(validate_timestamps(0, array![0.5, 1.0, 2.5].view()), Ok(Some(2.5)));
        assert_eq!(validate_timestamps(0, ndarray::Array1::<f64>::zeros(0).view()), Ok(None));
        assert_eq!(
            validate_timestamps(1, array![0.5, 0.5].view()),
            Err(HawkesError::NonIncreasingTimestamps { node: 1, index: 1, previous: 0.5, value: 0.5 })
        );
        assert_eq!(
            validate_timestamps(2, array![-0.1].view()),
            Err(HawkesError::NegativeTimestamp { node: 2, index: 0, value: -0.1 })
        );
        assert!(matches!(
            validate_timestamps(0, array![1.0, f64::INFINITY].view()),
            Err(HawkesError::NonFiniteTimestamp { node: 0, index: 1, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // State validation enforces the sentinel length and the impact-table range.
    //
    // Given
    // -----
    // - Three events and `max_n = 2`.
    //
    // Expect
    // ------
    // - Four in-range states pass.
    // - Three states fail with `ShapeMismatch`.
    // - A state equal to `max_n` fails with `StateOutOfRange`.
    fn validate_states_checks_length_and_range() {
        assert!(validate_states(array![0usize, 1, 1, 0].view(), 3, 2).is_ok());
        assert!(matches!(
            validate_states(array![0usize, 1, 1].view(), 3, 2),
            Err(HawkesError::ShapeMismatch { expected: 4, actual: 3, .. })
        ));
        assert_eq!(
            validate_states(array![0usize, 2, 1, 0].view(), 3, 2),
            Err(HawkesError::StateOutOfRange { index: 1, state: 2, max_n: 2 })
        );
    }

    #[test]
    // Purpose
    // -------
    // End time, coefficient, and scalar-parameter validators accept valid
    // values and reject invalid ones.
    //
    // Given
    // -----
    // - Boundary values for each validator.
    //
    // Expect
    // ------
    // - Equality with the last event is accepted; anything earlier is not.
    // - Length and finiteness are enforced for coefficients.
    fn scalar_validators_enforce_bounds() {
        assert!(validate_end_time(2.0, 2.0).is_ok());
        assert!(validate_end_time(1.9, 2.0).is_err());
        assert!(validate_end_time(f64::NAN, 0.0).is_err());

        assert!(validate_coeffs(array![1.0, 2.0].view(), 2).is_ok());
        assert_eq!(
            validate_coeffs(array![1.0].view(), 2),
            Err(HawkesError::CoeffLengthMismatch { expected: 2, actual: 1 })
        );
        assert!(matches!(
            validate_coeffs(array![1.0, f64::NAN].view(), 2),
            Err(HawkesError::NonFiniteCoeff { index: 1, .. })
        ));

        assert!(validate_n_threads(1).is_ok());
        assert_eq!(validate_n_threads(0), Err(HawkesError::InvalidThreadCount { n_threads: 0 }));
        assert!(validate_dimension("dim", 0).is_err());
        assert!(validate_tolerance(-1e-3).is_err());
        assert!(validate_out_len(3, 3).is_ok());
    }
}
