//! Errors for state-modulated Hawkes models (realization validation,
//! construction parameters, and recursion invariants).
//!
//! This module defines the model error type, [`HawkesError`], used across the
//! likelihood engine, together with a coarse classification,
//! [`HawkesErrorKind`], that mirrors the three failure families callers care
//! about:
//!
//! - **Shape mismatch**: realization data that is internally inconsistent
//!   (wrong segment lengths, non-increasing timestamps, end time before the
//!   last event, coefficient vectors of the wrong size).
//! - **Invalid parameter**: construction parameters that can never produce a
//!   valid model (non-positive decays, zero dimensions, zero threads).
//! - **Numerical instability**: a non-positive intensity or a negative
//!   accumulator detected during a `loss` / `grad` pass. These depend on the
//!   coefficient vector and are therefore only detected lazily.
//!
//! ## Conventions
//! - **Indices are 0-based**. Node indices refer to positions in the inner
//!   per-realization timestamp list, event indices to positions in the merged
//!   (time-ordered) event stream unless stated otherwise.
//! - Errors raised while validating realization `r` are wrapped in
//!   [`HawkesError::InRealization`] so the offending sample can be located;
//!   [`HawkesError::kind`] looks through the wrapper.

/// Crate-wide result alias for Hawkes operations that may produce [`HawkesError`].
pub type HawkesResult<T> = Result<T, HawkesError>;

/// Coarse failure family of a [`HawkesError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HawkesErrorKind {
    ShapeMismatch,
    InvalidParameter,
    NumericalInstability,
    NotFitted,
}

/// Unified error type for the Hawkes likelihood engine.
#[derive(Debug, Clone, PartialEq)]
pub enum HawkesError {
    // ---- Construction parameters ----
    /// Number of nodes or number of states must be at least one.
    InvalidDimension { param: &'static str, value: usize },

    /// Decay rates must be non-empty.
    EmptyDecays,

    /// Decay rates must be finite and > 0.
    InvalidDecay { index: usize, value: f64 },

    /// The worker pool needs at least one thread.
    InvalidThreadCount { n_threads: usize },

    /// Numerical tolerance must be finite and >= 0.
    InvalidTolerance { value: f64 },

    /// Unknown loss-scaling name.
    InvalidLossScaling { name: String },

    /// Building the worker pool failed.
    ThreadPoolBuild { text: String },

    // ---- Realization data ----
    /// Two containers that must agree in length do not.
    ShapeMismatch { what: &'static str, expected: usize, actual: usize },

    /// A timestamp is NaN/±inf.
    NonFiniteTimestamp { node: usize, index: usize, value: f64 },

    /// A timestamp lies before the origin of the observation window.
    NegativeTimestamp { node: usize, index: usize, value: f64 },

    /// Timestamps of one node must be strictly increasing.
    NonIncreasingTimestamps { node: usize, index: usize, previous: f64, value: f64 },

    /// A state index is outside `0..max_n`.
    StateOutOfRange { index: usize, state: usize, max_n: usize },

    /// End time must be finite and no earlier than the last event.
    InvalidEndTime { end_time: f64, last_event: f64 },

    /// Wrapper locating a data error inside a realization collection.
    InRealization { index: usize, source: Box<HawkesError> },

    // ---- Coefficients ----
    /// Coefficient (or gradient buffer) length differs from the layout.
    CoeffLengthMismatch { expected: usize, actual: usize },

    /// A coefficient is NaN/±inf.
    NonFiniteCoeff { index: usize, value: f64 },

    /// Normalization needs a finite, strictly positive reference factor `f_i[0]`.
    InvalidImpactReference { node: usize, value: f64 },

    /// Requested realization index does not exist.
    RealizationOutOfRange { index: usize, len: usize },

    // ---- Recursion invariants ----
    /// Intensity or accumulator left its admissible range during recursion.
    NumericalInstability { node: usize, time: f64, value: f64, what: &'static str },

    // ---- Lifecycle ----
    /// `loss` / `grad` called before `set_data`.
    ModelNotFitted,
}

impl HawkesError {
    /// Classify the error into its failure family.
    pub fn kind(&self) -> HawkesErrorKind {
        match self {
            HawkesError::InvalidDimension { .. }
            | HawkesError::EmptyDecays
            | HawkesError::InvalidDecay { .. }
            | HawkesError::InvalidThreadCount { .. }
            | HawkesError::InvalidTolerance { .. }
            | HawkesError::InvalidLossScaling { .. }
            | HawkesError::ThreadPoolBuild { .. }
            | HawkesError::InvalidImpactReference { .. } => HawkesErrorKind::InvalidParameter,
            HawkesError::ShapeMismatch { .. }
            | HawkesError::NonFiniteTimestamp { .. }
            | HawkesError::NegativeTimestamp { .. }
            | HawkesError::NonIncreasingTimestamps { .. }
            | HawkesError::StateOutOfRange { .. }
            | HawkesError::InvalidEndTime { .. }
            | HawkesError::CoeffLengthMismatch { .. }
            | HawkesError::NonFiniteCoeff { .. }
            | HawkesError::RealizationOutOfRange { .. } => HawkesErrorKind::ShapeMismatch,
            HawkesError::InRealization { source, .. } => source.kind(),
            HawkesError::NumericalInstability { .. } => HawkesErrorKind::NumericalInstability,
            HawkesError::ModelNotFitted => HawkesErrorKind::NotFitted,
        }
    }

    /// Attach a realization index to a data error.
    pub fn in_realization(self, index: usize) -> HawkesError {
        HawkesError::InRealization { index, source: Box::new(self) }
    }
}

impl std::error::Error for HawkesError {}

impl std::fmt::Display for HawkesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Construction parameters ----
            HawkesError::InvalidDimension { param, value } => {
                write!(f, "{param} must be at least 1; got: {value}")
            }
            HawkesError::EmptyDecays => {
                write!(f, "At least one decay rate is required.")
            }
            HawkesError::InvalidDecay { index, value } => {
                write!(f, "Decay rate at index {index} must be finite and > 0; got: {value}")
            }
            HawkesError::InvalidThreadCount { n_threads } => {
                write!(f, "Thread count must be at least 1; got: {n_threads}")
            }
            HawkesError::InvalidTolerance { value } => {
                write!(f, "Negativity tolerance must be finite and >= 0; got: {value}")
            }
            HawkesError::InvalidLossScaling { name } => {
                write!(f, "Unknown loss scaling '{name}'. Valid options are 'Sum' or 'PerJump'.")
            }
            HawkesError::ThreadPoolBuild { text } => {
                write!(f, "Failed to build worker pool: {text}")
            }
            // ---- Realization data ----
            HawkesError::ShapeMismatch { what, expected, actual } => {
                write!(f, "Shape mismatch for {what}: expected {expected}, got {actual}")
            }
            HawkesError::NonFiniteTimestamp { node, index, value } => {
                write!(f, "Timestamp {index} of node {node} is non-finite: {value}")
            }
            HawkesError::NegativeTimestamp { node, index, value } => {
                write!(f, "Timestamp {index} of node {node} is negative: {value}")
            }
            HawkesError::NonIncreasingTimestamps { node, index, previous, value } => {
                write!(
                    f,
                    "Timestamps of node {node} must be strictly increasing; index {index} has {value} after {previous}"
                )
            }
            HawkesError::StateOutOfRange { index, state, max_n } => {
                write!(f, "State at index {index} is {state}, outside 0..{max_n}")
            }
            HawkesError::InvalidEndTime { end_time, last_event } => {
                write!(
                    f,
                    "End time must be finite and >= last event time {last_event}; got: {end_time}"
                )
            }
            HawkesError::InRealization { index, source } => {
                write!(f, "Realization {index}: {source}")
            }
            // ---- Coefficients ----
            HawkesError::CoeffLengthMismatch { expected, actual } => {
                write!(f, "Coefficient length mismatch: expected {expected}, got {actual}")
            }
            HawkesError::NonFiniteCoeff { index, value } => {
                write!(f, "Coefficient at index {index} is non-finite: {value}")
            }
            HawkesError::InvalidImpactReference { node, value } => {
                write!(
                    f,
                    "Impact factor f_{node}[0] must be finite and > 0 to normalize; got: {value}"
                )
            }
            HawkesError::RealizationOutOfRange { index, len } => {
                write!(f, "Realization index {index} out of range for {len} realizations")
            }
            // ---- Recursion invariants ----
            HawkesError::NumericalInstability { node, time, value, what } => {
                write!(f, "Numerical instability at node {node}, time {time}: {what} = {value}")
            }
            // ---- Lifecycle ----
            HawkesError::ModelNotFitted => {
                write!(f, "No realizations set; call set_data first.")
            }
        }
    }
}
