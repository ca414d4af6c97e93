//! Finite-difference gradients and analytic-gradient checks.
//!
//! Purpose
//! -------
//! Provide the numerical fallback used by the argmin adapter when a model has
//! no analytic gradient, and a diagnostic that compares an analytic gradient
//! against central differences.
//!
//! Key behaviors
//! -------------
//! - [`fd_gradient`] wraps a fallible objective so it can be handed to
//!   `finitediff`, which only accepts `Fn(&Theta) -> f64`. The first error
//!   raised inside the closure is captured and returned after the sweep.
//! - [`gradient_check`] evaluates `LogLikelihood::grad` and a central
//!   finite-difference gradient of `LogLikelihood::value` at the same `θ` and
//!   reports the worst disagreement.
//!
//! Conventions
//! -----------
//! - Scaled error is `|analytic − numeric| / max(1, |numeric|)`.
use std::cell::RefCell;

use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Grad, Theta,
        traits::LogLikelihood,
        validation::{validate_grad, validate_theta},
    },
};
use argmin_math::ArgminL2Norm;
use finitediff::FiniteDiff;

/// Difference scheme used by [`fd_gradient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FdScheme {
    Central,
    Forward,
}

/// Finite-difference gradient of a fallible scalar function.
///
/// # Errors
/// - The first error returned by `func` during the sweep.
/// - [`OptError::InvalidGradient`] if the resulting gradient is not finite.
pub fn fd_gradient<G: Fn(&Theta) -> OptResult<f64>>(theta: &Theta, func: &G, scheme: FdScheme) -> OptResult<Grad> {
    let closure_err: RefCell<Option<OptError>> = RefCell::new(None);
    let wrapped = |x: &Theta| -> f64 {
        match func(x) {
            Ok(val) => val,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };
    let grad = match scheme {
        FdScheme::Central => theta.central_diff(&wrapped),
        FdScheme::Forward => theta.forward_diff(&wrapped),
    };
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&grad, theta.len())?;
    Ok(grad)
}

/// Outcome of [`gradient_check`].
#[derive(Debug, Clone, PartialEq)]
pub struct GradCheck {
    /// `∇ℓ(θ)` as returned by the model.
    pub analytic: Grad,
    /// Central finite-difference estimate of `∇ℓ(θ)`.
    pub numeric: Grad,
    pub max_abs_err: f64,
    pub max_scaled_err: f64,
    /// Euclidean norm of `analytic − numeric`.
    pub l2_err: f64,
    /// Coordinate with the largest scaled error (`0` for an empty `θ`).
    pub worst_index: usize,
}

impl GradCheck {
    /// `true` if every coordinate agrees within `tol` on the scaled error.
    pub fn passes(&self, tol: f64) -> bool {
        self.max_scaled_err <= tol
    }
}

/// Compare the analytic gradient of `f` with central differences of its value.
///
/// # Errors
/// - [`OptError::InvalidThetaInput`] for a non-finite `θ`.
/// - Any error of `f.grad` (including `GradientNotImplemented`) or `f.value`.
/// - Gradient validation errors for either gradient.
pub fn gradient_check<F: LogLikelihood>(f: &F, theta: &Theta, data: &F::Data) -> OptResult<GradCheck> {
    validate_theta(theta)?;
    let analytic = f.grad(theta, data)?;
    validate_grad(&analytic, theta.len())?;
    let numeric = fd_gradient(theta, &|x: &Theta| f.value(x, data), FdScheme::Central)?;

    let mut max_abs_err = 0.0;
    let mut max_scaled_err = 0.0;
    let mut worst_index = 0;
    for (index, (a, n)) in analytic.iter().zip(numeric.iter()).enumerate() {
        let abs_err = (a - n).abs();
        let scaled_err = abs_err / n.abs().max(1.0);
        if abs_err > max_abs_err {
            max_abs_err = abs_err;
        }
        if scaled_err > max_scaled_err {
            max_scaled_err = scaled_err;
            worst_index = index;
        }
    }
    let l2_err = (&analytic - &numeric).l2_norm();
    Ok(GradCheck { analytic, numeric, max_abs_err, max_scaled_err, l2_err, worst_index })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::Cost;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    struct Quadratic {
        center: Theta,
        wrong_grad: bool,
    }

    impl LogLikelihood for Quadratic {
        type Data = ();

        fn value(&self, theta: &Theta, _data: &()) -> OptResult<Cost> {
            Ok(-(theta - &self.center).mapv(|d| d * d).sum())
        }

        fn check(&self, _theta: &Theta, _data: &()) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, theta: &Theta, _data: &()) -> OptResult<Grad> {
            let mut g = (theta - &self.center).mapv(|d| -2.0 * d);
            if self.wrong_grad {
                g[2] += 1.0;
            }
            Ok(g)
        }
    }

    #[test]
    // Purpose
    // -------
    // Central and forward differences recover the gradient of a smooth
    // quadratic.
    //
    // Given
    // -----
    // - `f(θ) = θ_0² + 3θ_1` at `θ = [1, 2]`.
    //
    // Expect
    // ------
    // - Both schemes return approximately `[2, 3]`.
    fn fd_gradient_recovers_quadratic_gradient() {
        let f = |x: &Theta| -> OptResult<f64> { Ok(x[0] * x[0] + 3.0 * x[1]) };
        let theta = array![1.0, 2.0];

        let central = fd_gradient(&theta, &f, FdScheme::Central).unwrap();
        let forward = fd_gradient(&theta, &f, FdScheme::Forward).unwrap();

        assert_abs_diff_eq!(central[0], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(central[1], 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(forward[0], 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(forward[1], 3.0, epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // An error raised inside the objective surfaces from the sweep.
    //
    // Given
    // -----
    // - An objective that always fails with `NonFiniteCost`.
    //
    // Expect
    // ------
    // - `fd_gradient` returns that error.
    fn fd_gradient_propagates_objective_errors() {
        let f = |_: &Theta| -> OptResult<f64> { Err(OptError::NonFiniteCost { value: f64::NAN }) };

        let err = fd_gradient(&array![0.5], &f, FdScheme::Central).unwrap_err();

        assert!(matches!(err, OptError::NonFiniteCost { .. }));
    }

    #[test]
    // Purpose
    // -------
    // `gradient_check` accepts a correct gradient and flags a wrong one.
    //
    // Given
    // -----
    // - `ℓ(θ) = −‖θ − c‖²` with the exact gradient, and one whose last
    //   coordinate is shifted by one.
    //
    // Expect
    // ------
    // - The exact gradient passes at `1e-6`; the shifted one fails at
    //   index 2.
    fn gradient_check_flags_wrong_gradient() {
        let theta = array![0.3, -1.2, 2.0];
        let good = Quadratic { center: array![1.0, 0.0, -1.0], wrong_grad: false };
        let bad = Quadratic { center: array![1.0, 0.0, -1.0], wrong_grad: true };

        let ok = gradient_check(&good, &theta, &()).unwrap();
        let off = gradient_check(&bad, &theta, &()).unwrap();

        assert!(ok.passes(1e-6));
        assert!(!off.passes(1e-2));
        assert_eq!(off.worst_index, 2);
        assert_abs_diff_eq!(off.l2_err, 1.0, epsilon = 1e-6);
    }
}
