//! Solver-facing error surface.
//!
//! External solvers drive a model through [`LogLikelihood`] and the argmin
//! adapter; every failure they can observe (model errors, invalid gradients,
//! argmin backend errors) is normalized into [`OptError`].
//!
//! [`LogLikelihood`]: crate::optimization::loglik_optimizer::LogLikelihood
use argmin::core::{ArgminError, Error};

use crate::hawkes::errors::{HawkesError, HawkesErrorKind};

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// Implies that FD should be used
    GradientNotImplemented,

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch { expected: usize, found: usize },

    /// Gradient elements need to be finite
    InvalidGradient { index: usize, value: f64, reason: &'static str },

    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    NonFiniteCost { value: f64 },

    // ---- Parameter vector ----
    /// Theta length differs from the model's coefficient count.
    ThetaLengthMismatch { expected: usize, actual: usize },

    /// Theta entries must be finite.
    InvalidThetaInput { index: usize, value: f64 },

    // ---- Model ----
    /// Realization data or buffers are inconsistent.
    ModelShapeMismatch { text: String },

    /// Construction parameter cannot produce a valid model.
    ModelInvalidParameter { text: String },

    /// Intensity or accumulator left its admissible range.
    NumericalInstability { text: String },

    /// Model evaluated before data was set.
    ModelNotFitted,

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter { text: String },
    /// Wrapper for argmin::NotImplemented
    NotImplemented { text: String },
    /// Wrapper for argmin::NotInitialized
    NotInitialized { text: String },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated { text: String },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound { text: String },
    /// Wrapper for argmin::PotentialBug
    PotentialBug { text: String },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError { text: String },
    /// Wrapper for other argmin::Error types
    BackendError { text: String },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientNotImplemented => {
                write!(f, "Gradient optimization not implemented")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }

            // ---- Parameter vector ----
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Theta length mismatch: expected {expected}, actual {actual}")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Invalid theta input at index {index}: {value}, must be finite")
            }

            // ---- Model ----
            OptError::ModelShapeMismatch { text } => {
                write!(f, "Shape mismatch: {text}")
            }
            OptError::ModelInvalidParameter { text } => {
                write!(f, "Invalid model parameter: {text}")
            }
            OptError::NumericalInstability { text } => {
                write!(f, "Numerical instability: {text}")
            }
            OptError::ModelNotFitted => {
                write!(f, "Model has no data; call set_data first.")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(argmin_err) => match argmin_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

impl From<HawkesError> for OptError {
    fn from(err: HawkesError) -> Self {
        match err {
            HawkesError::CoeffLengthMismatch { expected, actual } => {
                OptError::ThetaLengthMismatch { expected, actual }
            }
            HawkesError::NonFiniteCoeff { index, value } => OptError::InvalidThetaInput { index, value },
            HawkesError::ModelNotFitted => OptError::ModelNotFitted,
            other => match other.kind() {
                HawkesErrorKind::ShapeMismatch => OptError::ModelShapeMismatch { text: other.to_string() },
                HawkesErrorKind::InvalidParameter => {
                    OptError::ModelInvalidParameter { text: other.to_string() }
                }
                HawkesErrorKind::NumericalInstability => {
                    OptError::NumericalInstability { text: other.to_string() }
                }
                HawkesErrorKind::NotFitted => OptError::ModelNotFitted,
            },
        }
    }
}
