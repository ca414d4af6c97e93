//! Common numeric aliases shared by the objective interface and the adapter.
use ndarray::Array1;

/// Parameter vector handed to solvers.
pub type Theta = Array1<f64>;

/// Gradient vector with the same length as [`Theta`].
pub type Grad = Array1<f64>;

/// Scalar objective value.
pub type Cost = f64;
