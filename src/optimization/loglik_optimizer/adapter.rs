//! Adapter that exposes a `LogLikelihood` as an `argmin` problem.
//!
//! Maximizing `ℓ(θ)` becomes minimizing the cost `c(θ) = -ℓ(θ)`. Analytic
//! gradients are negated accordingly. Without an analytic gradient the
//! **cost** itself is finite-differenced, so that branch needs no sign flip.
use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        finite_diff::{FdScheme, fd_gradient},
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::{validate_grad, validate_value},
    },
};
use argmin::core::{CostFunction, Error, Gradient};

/// Bridges a `LogLikelihood` to `argmin`'s `CostFunction` and `Gradient`.
///
/// - `CostFunction::cost` returns `-ℓ(θ)`.
/// - `Gradient::gradient` returns `-∇ℓ(θ)` from the analytic gradient, or a
///   finite-difference gradient of the cost.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }

    fn cost_of(&self, theta: &Theta) -> Result<Cost, OptError> {
        let output = self.f.value(theta, self.data)?;
        validate_value(output)?;
        Ok(-output)
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate `c(θ) = -ℓ(θ)`.
    ///
    /// # Errors
    /// - Any `OptError` from the model's `value`.
    /// - `NonFiniteCost` if the value is not finite.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.cost_of(theta)?)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate the gradient of the cost at `θ`.
    ///
    /// With `GradientNotImplemented` from the model, central differences of
    /// the cost are tried first; if they fail (an evaluation error or a
    /// non-finite entry) a single forward-difference retry is made.
    ///
    /// # Errors
    /// - Any other error of the model's `grad`.
    /// - Validation errors for a wrong length or non-finite entries.
    /// - The error of the forward-difference retry.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = theta.len();
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, dim)?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => {
                let cost_func = |x: &Theta| self.cost_of(x);
                match fd_gradient(theta, &cost_func, FdScheme::Central) {
                    Ok(g) => Ok(g),
                    Err(err) => {
                        log::debug!("central differences failed ({err}); retrying forward differences");
                        Ok(fd_gradient(theta, &cost_func, FdScheme::Forward)?)
                    }
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        hawkes::{core::options::EngineOptions, models::custom2::HawkesSumExpCustom2},
        optimization::errors::OptResult,
    };
    use approx::assert_relative_eq;
    use ndarray::{Array1, array};

    struct NoGrad;

    impl LogLikelihood for NoGrad {
        type Data = f64;

        fn value(&self, theta: &Theta, shift: &f64) -> OptResult<Cost> {
            Ok(-(theta[0] - shift).powi(2))
        }

        fn check(&self, _theta: &Theta, _shift: &f64) -> OptResult<()> {
            Ok(())
        }
    }

    fn fitted_model() -> HawkesSumExpCustom2 {
        let mut model = HawkesSumExpCustom2::new(2, array![2.0], 2, EngineOptions::default()).unwrap();
        model
            .set_data(
                vec![vec![array![0.5, 1.5, 2.2], array![1.0]]],
                vec![array![0, 1, 0, 1, 1]],
                Some(array![3.0]),
            )
            .unwrap();
        model
    }

    #[test]
    // Purpose
    // -------
    // The adapter exposes the Hawkes loss as the argmin cost and the loss
    // gradient as the argmin gradient.
    //
    // Given
    // -----
    // - A fitted two-node model with one realization.
    //
    // Expect
    // ------
    // - `cost(θ) ≈ loss(θ)` and `gradient(θ) == ∇loss(θ)` exactly.
    fn adapter_matches_hawkes_loss_and_grad() {
        let model = fitted_model();
        let theta = Array1::from_iter((0..model.n_coeffs()).map(|k| 0.2 + 0.05 * k as f64));
        let adapter = ArgMinAdapter::new(&model, &());

        let cost = adapter.cost(&theta).unwrap();
        let grad = adapter.gradient(&theta).unwrap();

        let mut expected = Array1::<f64>::zeros(model.n_coeffs());
        let loss = model.loss_and_grad(theta.view(), expected.view_mut()).unwrap();
        assert_relative_eq!(cost, loss, max_relative = 1e-12);
        assert_eq!(grad, expected);
    }

    #[test]
    // Purpose
    // -------
    // Model errors surface as `OptError` after passing through argmin.
    //
    // Given
    // -----
    // - A coefficient vector one entry too short.
    //
    // Expect
    // ------
    // - `ThetaLengthMismatch` from both `cost` and `gradient`.
    fn adapter_propagates_model_errors() {
        let model = fitted_model();
        let theta = Array1::<f64>::zeros(model.n_coeffs() - 1);
        let adapter = ArgMinAdapter::new(&model, &());

        let cost_err = OptError::from(adapter.cost(&theta).unwrap_err());
        let grad_err = OptError::from(adapter.gradient(&theta).unwrap_err());

        let expected = OptError::ThetaLengthMismatch { expected: model.n_coeffs(), actual: model.n_coeffs() - 1 };
        assert_eq!(cost_err, expected);
        assert_eq!(grad_err, expected);
    }

    #[test]
    // Purpose
    // -------
    // Without an analytic gradient the adapter differentiates the cost.
    //
    // Given
    // -----
    // - `ℓ(θ) = −(θ_0 − 1)²` at `θ = [3]`.
    //
    // Expect
    // ------
    // - Cost gradient `2(θ_0 − 1) = 4`.
    fn adapter_falls_back_to_finite_differences() {
        let shift = 1.0;
        let adapter = ArgMinAdapter::new(&NoGrad, &shift);

        let grad = adapter.gradient(&array![3.0]).unwrap();

        assert_relative_eq!(grad[0], 4.0, epsilon = 1e-6);
    }
}
