//! Coefficient layout — field boundaries and zero-copy views of the flat
//! parameter vector.
//!
//! Purpose
//! -------
//! Define the single flat coefficient vector exchanged with external solvers
//! and provide typed, zero-copy views over its three segments. The segment
//! order and sizes are the de facto wire contract of the model: any harness,
//! serializer, or solver must respect them byte-for-byte in ordering.
//!
//! Key behaviors
//! -------------
//! - [`CoefficientLayout`] owns the fixed dimensions `(dim, U, MaxN)` and maps
//!   structured indices to flat offsets.
//! - [`CoefficientLayout::view`] / [`CoefficientLayout::view_mut`] split a flat
//!   vector into [`CoeffView`] / [`CoeffViewMut`] without copying.
//! - [`CoefficientLayout::pack`] / [`CoefficientLayout::unpack`] convert between
//!   the flat vector and owned [`CoeffParts`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Flat length is `dim + dim·dim·U + dim·MaxN`.
//! - Layout, in order:
//!   1. baseline `μ[i]`, `dim` entries;
//!   2. adjacency `α[u][i][j]` (target `i`, source `j`), `U` blocks of
//!      `dim × dim`, row-major within a block;
//!   3. impact table `f[i][s]`, `dim` rows of `MaxN` entries.
//! - Views require a contiguous (unit-stride) flat vector.
//!
//! Conventions
//! -----------
//! - `adjacency` views have shape `(U, dim, dim)` and are indexed `[[u, i, j]]`.
//! - `impact` views have shape `(dim, MaxN)` and are indexed `[[i, s]]`.
use crate::hawkes::{
    core::validation::{validate_dimension, validate_out_len},
    errors::{HawkesError, HawkesResult},
};
use ndarray::{
    Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayView3, ArrayViewMut1, ArrayViewMut2,
    ArrayViewMut3, Axis,
};
use std::ops::Range;

/// CoefficientLayout — fixed dimensions of the flat coefficient vector.
///
/// Fields
/// ------
/// - `dim`: number of nodes (components) of the process.
/// - `n_decays`: number of exponential decay rates `U`.
/// - `max_n`: number of discrete states indexing the impact table.
///
/// Invariants
/// ----------
/// - All three fields are ≥ 1; enforced by [`CoefficientLayout::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoefficientLayout {
    pub dim: usize,
    pub n_decays: usize,
    pub max_n: usize,
}

/// Read-only structured view over a flat coefficient vector.
#[derive(Debug, Clone)]
pub struct CoeffView<'a> {
    /// `μ[i]`, shape `(dim,)`.
    pub baseline: ArrayView1<'a, f64>,
    /// `α[u][i][j]`, shape `(U, dim, dim)`.
    pub adjacency: ArrayView3<'a, f64>,
    /// `f[i][s]`, shape `(dim, MaxN)`.
    pub impact: ArrayView2<'a, f64>,
}

/// Mutable structured view over a flat coefficient (or gradient) vector.
#[derive(Debug)]
pub struct CoeffViewMut<'a> {
    pub baseline: ArrayViewMut1<'a, f64>,
    pub adjacency: ArrayViewMut3<'a, f64>,
    pub impact: ArrayViewMut2<'a, f64>,
}

/// Owned copy of the three coefficient segments.
#[derive(Debug, Clone, PartialEq)]
pub struct CoeffParts {
    pub baseline: Array1<f64>,
    pub adjacency: Array3<f64>,
    pub impact: Array2<f64>,
}

impl CoefficientLayout {
    /// Construct a validated layout.
    ///
    /// # Errors
    /// - [`HawkesError::InvalidDimension`] if any of `dim`, `n_decays`, `max_n`
    ///   is zero.
    pub fn new(dim: usize, n_decays: usize, max_n: usize) -> HawkesResult<Self> {
        validate_dimension("dim", dim)?;
        validate_dimension("n_decays", n_decays)?;
        validate_dimension("max_n", max_n)?;
        Ok(CoefficientLayout { dim, n_decays, max_n })
    }

    /// Total number of coefficients.
    pub fn n_coeffs(&self) -> usize {
        self.dim + self.adjacency_len() + self.dim * self.max_n
    }

    fn adjacency_len(&self) -> usize {
        self.dim * self.dim * self.n_decays
    }

    /// Flat range of the baseline segment.
    pub fn baseline_range(&self) -> Range<usize> {
        0..self.dim
    }

    /// Flat range of the adjacency segment.
    pub fn adjacency_range(&self) -> Range<usize> {
        self.dim..self.dim + self.adjacency_len()
    }

    /// Flat range of the impact-table segment.
    pub fn impact_range(&self) -> Range<usize> {
        self.dim + self.adjacency_len()..self.n_coeffs()
    }

    /// Flat offset of `α[u][i][j]` (decay `u`, target `i`, source `j`).
    pub fn alpha_index(&self, u: usize, i: usize, j: usize) -> usize {
        self.dim + u * self.dim * self.dim + i * self.dim + j
    }

    /// Flat offset of `f[i][s]`.
    pub fn impact_index(&self, i: usize, s: usize) -> usize {
        self.dim + self.adjacency_len() + i * self.max_n + s
    }

    /// Split a flat coefficient vector into structured read-only views.
    ///
    /// # Errors
    /// - [`HawkesError::CoeffLengthMismatch`] if `coeffs.len() != n_coeffs()`.
    /// - [`HawkesError::ShapeMismatch`] if `coeffs` is not contiguous.
    pub fn view<'a>(&self, coeffs: ArrayView1<'a, f64>) -> HawkesResult<CoeffView<'a>> {
        validate_out_len(coeffs.len(), self.n_coeffs())?;
        let (baseline, rest) = coeffs.split_at(Axis(0), self.dim);
        let (adjacency, impact) = rest.split_at(Axis(0), self.adjacency_len());
        let adjacency = adjacency
            .into_shape((self.n_decays, self.dim, self.dim))
            .map_err(|_| self.contiguity_error())?;
        let impact = impact.into_shape((self.dim, self.max_n)).map_err(|_| self.contiguity_error())?;
        Ok(CoeffView { baseline, adjacency, impact })
    }

    /// Split a flat mutable vector into structured mutable views.
    ///
    /// # Errors
    /// - Same as [`CoefficientLayout::view`].
    pub fn view_mut<'a>(&self, coeffs: ArrayViewMut1<'a, f64>) -> HawkesResult<CoeffViewMut<'a>> {
        validate_out_len(coeffs.len(), self.n_coeffs())?;
        let (baseline, rest) = coeffs.split_at(Axis(0), self.dim);
        let (adjacency, impact) = rest.split_at(Axis(0), self.adjacency_len());
        let adjacency = adjacency
            .into_shape((self.n_decays, self.dim, self.dim))
            .map_err(|_| self.contiguity_error())?;
        let impact = impact.into_shape((self.dim, self.max_n)).map_err(|_| self.contiguity_error())?;
        Ok(CoeffViewMut { baseline, adjacency, impact })
    }

    /// Concatenate structured segments into a flat coefficient vector.
    ///
    /// # Errors
    /// - [`HawkesError::ShapeMismatch`] if any segment has the wrong shape.
    pub fn pack(
        &self, baseline: ArrayView1<f64>, adjacency: ArrayView3<f64>, impact: ArrayView2<f64>,
    ) -> HawkesResult<Array1<f64>> {
        if baseline.len() != self.dim {
            return Err(HawkesError::ShapeMismatch {
                what: "baseline segment",
                expected: self.dim,
                actual: baseline.len(),
            });
        }
        if adjacency.dim() != (self.n_decays, self.dim, self.dim) {
            return Err(HawkesError::ShapeMismatch {
                what: "adjacency segment",
                expected: self.adjacency_len(),
                actual: adjacency.len(),
            });
        }
        if impact.dim() != (self.dim, self.max_n) {
            return Err(HawkesError::ShapeMismatch {
                what: "impact segment",
                expected: self.dim * self.max_n,
                actual: impact.len(),
            });
        }
        Ok(baseline.iter().chain(adjacency.iter()).chain(impact.iter()).copied().collect())
    }

    /// Copy a flat coefficient vector into owned structured segments.
    ///
    /// # Errors
    /// - Same as [`CoefficientLayout::view`].
    pub fn unpack(&self, coeffs: ArrayView1<f64>) -> HawkesResult<CoeffParts> {
        let view = self.view(coeffs)?;
        Ok(CoeffParts {
            baseline: view.baseline.to_owned(),
            adjacency: view.adjacency.to_owned(),
            impact: view.impact.to_owned(),
        })
    }

    fn contiguity_error(&self) -> HawkesError {
        HawkesError::ShapeMismatch {
            what: "contiguous coefficient vector",
            expected: self.n_coeffs(),
            actual: 0,
        }
    }
}
