//! Coefficient normalizer — fix the joint scale of baseline/adjacency and
//! the impact table after fitting.
//!
//! For every node `i` the model is unchanged by `μ_i → c μ_i`,
//! `α[·][i][·] → c α[·][i][·]`, `f_i → f_i / c` with `c > 0`, because each
//! term of `λ_i` carries exactly one factor of the row `f_i`. Choosing
//! `c = f_i[0]` pins the reference state to one.
use crate::hawkes::{
    core::{layout::CoefficientLayout, validation::validate_coeffs},
    errors::{HawkesError, HawkesResult},
};
use ndarray::{Array1, ArrayView1, ArrayViewMut1, Axis, s};

/// CoefficientNormalizer — similarity rescaling bound to one layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoefficientNormalizer {
    layout: CoefficientLayout,
}

impl CoefficientNormalizer {
    pub fn new(layout: CoefficientLayout) -> Self {
        CoefficientNormalizer { layout }
    }

    /// Return a normalized copy of `coeffs`.
    ///
    /// # Errors
    /// - See [`normalize_impact_in_place`].
    pub fn normalize(&self, coeffs: ArrayView1<f64>) -> HawkesResult<Array1<f64>> {
        normalize_impact(&self.layout, coeffs)
    }

    /// Normalize `coeffs` in place.
    ///
    /// # Errors
    /// - See [`normalize_impact_in_place`].
    pub fn normalize_in_place(&self, coeffs: ArrayViewMut1<f64>) -> HawkesResult<()> {
        normalize_impact_in_place(&self.layout, coeffs)
    }
}

/// Return a copy of `coeffs` with every `f_i[0] == 1`.
///
/// # Errors
/// - See [`normalize_impact_in_place`].
pub fn normalize_impact(layout: &CoefficientLayout, coeffs: ArrayView1<f64>) -> HawkesResult<Array1<f64>> {
    let mut out = coeffs.to_owned();
    normalize_impact_in_place(layout, out.view_mut())?;
    Ok(out)
}

/// Rescale `μ_i` and `α[·][i][·]` by `f_i[0]` and divide row `f_i` by it.
///
/// The vector is left untouched if any check fails.
///
/// # Errors
/// - `HawkesError::CoeffLengthMismatch` / `NonFiniteCoeff` for an invalid
///   vector.
/// - [`HawkesError::InvalidImpactReference`] if some `f_i[0]` is `<= 0`.
pub fn normalize_impact_in_place(layout: &CoefficientLayout, coeffs: ArrayViewMut1<f64>) -> HawkesResult<()> {
    validate_coeffs(coeffs.view(), layout.n_coeffs())?;
    for node in 0..layout.dim {
        let value = coeffs[layout.impact_index(node, 0)];
        if value <= 0.0 {
            return Err(HawkesError::InvalidImpactReference { node, value });
        }
    }

    let mut view = layout.view_mut(coeffs)?;
    for node in 0..layout.dim {
        let reference = view.impact[[node, 0]];
        view.baseline[node] *= reference;
        view.adjacency.slice_mut(s![.., node, ..]).mapv_inplace(|a| a * reference);
        view.impact.index_axis_mut(Axis(0), node).mapv_inplace(|f| f / reference);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Normalization sets `f_i[0] = 1` and moves the scale onto the target
    // rows of `μ` and `α`.
    //
    // Given
    // -----
    // - `dim = 2`, `U = 1`, `MaxN = 2` with `f_0 = [2, 4]`, `f_1 = [0.5, 1]`.
    //
    // Expect
    // ------
    // - `μ = [2μ_0, 0.5μ_1]`, `α[0][0][·] ×2`, `α[0][1][·] ×0.5`.
    // - `f_0 = [1, 2]`, `f_1 = [1, 2]`.
    fn normalize_moves_scale_to_target_rows() {
        let layout = CoefficientLayout::new(2, 1, 2).unwrap();
        let coeffs = layout
            .pack(
                array![1.0, 3.0].view(),
                array![[[0.1, 0.2], [0.3, 0.4]]].view(),
                array![[2.0, 4.0], [0.5, 1.0]].view(),
            )
            .unwrap();

        let out = CoefficientNormalizer::new(layout).normalize(coeffs.view()).unwrap();
        let parts = layout.unpack(out.view()).unwrap();

        let expected = layout
            .pack(
                array![2.0, 1.5].view(),
                array![[[0.2, 0.4], [0.15, 0.2]]].view(),
                array![[1.0, 2.0], [1.0, 2.0]].view(),
            )
            .unwrap();
        for (got, want) in out.iter().zip(expected.iter()) {
            assert_relative_eq!(*got, *want, max_relative = 1e-15);
        }
        assert_eq!(parts.impact.column(0), array![1.0, 1.0]);
    }

    #[test]
    // Purpose
    // -------
    // A non-positive reference factor is rejected and the vector is left
    // unchanged.
    //
    // Given
    // -----
    // - `f_1[0] = 0`.
    //
    // Expect
    // ------
    // - `InvalidImpactReference { node: 1, .. }` and an untouched buffer.
    fn normalize_rejects_non_positive_reference() {
        let layout = CoefficientLayout::new(2, 1, 1).unwrap();
        let mut coeffs = array![1.0, 1.0, 0.1, 0.1, 0.1, 0.1, 2.0, 0.0];
        let before = coeffs.clone();

        let err = normalize_impact_in_place(&layout, coeffs.view_mut()).unwrap_err();

        assert!(matches!(err, HawkesError::InvalidImpactReference { node: 1, .. }));
        assert_eq!(coeffs, before);
    }
}
