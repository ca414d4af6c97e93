//! Decay kernel bank — the fixed exponential decay rates shared by every
//! node pair.
//!
//! The excitation kernel between any source `j` and target `i` is the sum of
//! exponentials `φ_ij(t) = Σ_u α[u][i][j] · exp(−β_u t)`. The rates `β_u` are
//! not estimated; they are chosen by the caller and held here.
use crate::hawkes::{
    core::validation::validate_decays,
    errors::{HawkesError, HawkesResult},
};
use ndarray::{Array1, ArrayView1, ArrayViewMut1};

/// DecayKernelBank — validated, ordered set of `U` positive decay rates.
///
/// Invariants
/// ----------
/// - Non-empty; every rate is finite and strictly positive.
/// - The number of rates never changes after construction; only
///   [`DecayKernelBank::replace`] may swap the values, and it enforces the
///   same length.
#[derive(Debug, Clone, PartialEq)]
pub struct DecayKernelBank {
    decays: Array1<f64>,
}

impl DecayKernelBank {
    /// Construct a bank from raw rates.
    ///
    /// # Errors
    /// - [`HawkesError::EmptyDecays`] for an empty vector.
    /// - [`HawkesError::InvalidDecay`] for a non-finite
    ///   or non-positive rate.
    pub fn new(decays: Array1<f64>) -> HawkesResult<Self> {
        validate_decays(decays.view())?;
        Ok(DecayKernelBank { decays })
    }

    /// Number of rates `U`.
    pub fn len(&self) -> usize {
        self.decays.len()
    }

    /// Always `false` for a constructed bank; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.decays.is_empty()
    }

    /// Borrow the rates.
    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.decays.view()
    }

    /// Replace the rates with a new vector of the same length.
    ///
    /// # Errors
    /// - [`HawkesError::ShapeMismatch`] if the length
    ///   differs from the current `U`.
    /// - Any error from [`DecayKernelBank::new`].
    pub fn replace(&mut self, decays: Array1<f64>) -> HawkesResult<()> {
        if decays.len() != self.decays.len() {
            return Err(HawkesError::ShapeMismatch {
                what: "decay rates",
                expected: self.decays.len(),
                actual: decays.len(),
            });
        }
        validate_decays(decays.view())?;
        self.decays = decays;
        Ok(())
    }

    /// Closed-form integral of a unit impulse over `[0, horizon]` for every
    /// rate: `(1 − exp(−β_u · horizon)) / β_u`, written into `out`.
    pub fn unit_integrals(&self, horizon: f64, mut out: ArrayViewMut1<f64>) {
        for (slot, &beta) in out.iter_mut().zip(self.decays.iter()) {
            *slot = -(-beta * horizon).exp_m1() / beta;
        }
    }
}
