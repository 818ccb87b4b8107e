use ajd_linalg::decompose::{condition_number, congruence};
use faer::{Mat, MatRef};
use serde::{Deserialize, Serialize};

use crate::error::UwedgeError;
use crate::monitor::Termination;

/// Result of the uwedge joint diagonalizer.
#[derive(Debug, Clone)]
pub struct UwedgeResult {
    /// The joint diagonalizer V with shape (n_components, d).
    pub v: Mat<f64>,
    /// The input matrices transformed by `v`, present when requested.
    pub diagonalized: Option<Vec<Mat<f64>>>,
    /// Whether the run stopped because the tolerance was reached.
    pub converged: bool,
    /// How the run terminated.
    pub termination: Termination,
    /// Number of completed iterations behind `v`.
    pub iterations: usize,
    /// Root mean square of the off-diagonal entries of the diagonalized matrices.
    pub meanoffdiag: f64,
}

/// Serializable summary of a [`UwedgeResult`] without the matrices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UwedgeSummary {
    /// Number of rows of the diagonalizer.
    pub n_components: usize,
    /// Dimension of the input matrices.
    pub dim: usize,
    /// Whether the run converged.
    pub converged: bool,
    /// How the run terminated.
    pub termination: Termination,
    /// Number of completed iterations behind the diagonalizer.
    pub iterations: usize,
    /// Off-diagonal loss of the diagonalizer.
    pub meanoffdiag: f64,
}

impl UwedgeResult {
    /// Apply the congruence `V * R * Vᵗ` to a matrix with shape (d, d).
    pub fn diagonalize(&self, r: MatRef<'_, f64>) -> Result<Mat<f64>, UwedgeError> {
        Ok(congruence(self.v.as_ref(), r)?)
    }

    /// Condition number of the diagonalizer.
    pub fn condition_number(&self) -> f64 {
        condition_number(self.v.as_ref())
    }

    /// Summary of the run without the matrices.
    pub fn summary(&self) -> UwedgeSummary {
        UwedgeSummary {
            n_components: self.v.nrows(),
            dim: self.v.ncols(),
            converged: self.converged,
            termination: self.termination,
            iterations: self.iterations,
            meanoffdiag: self.meanoffdiag,
        }
    }
}

/// Scale every row of `v` so that `V * S * Vᵗ` has a unit diagonal.
///
/// Rows whose scaled diagonal entry is zero are left untouched.
pub(crate) fn scale_rows(v: &mut Mat<f64>, scale_by: MatRef<'_, f64>) -> Result<(), UwedgeError> {
    let scaled = congruence(v.as_ref(), scale_by)?;
    for k in 0..v.nrows() {
        let norm = scaled.read(k, k).abs().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            continue;
        }
        for j in 0..v.ncols() {
            v[(k, j)] /= norm;
        }
    }
    Ok(())
}
