use ajd_linalg::decompose::{condition_number, congruence};
use ajd_linalg::ops::{offdiag_sq_sum, symmetrize};
use faer::{Mat, MatRef};
use serde::{Deserialize, Serialize};

use crate::error::UwedgeError;

/// Terminal state of a uwedge run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The change of the diagonalizer fell below the tolerance.
    Converged,
    /// The condition number guard discarded the last iterate.
    Aborted,
    /// The iteration cap was reached without convergence.
    MaxIterReached,
}

/// Snapshot of the iterate with the smallest off-diagonal loss seen so far.
#[derive(Debug, Clone)]
pub struct BestIterate {
    /// The diagonalizer of this iterate.
    pub v: Mat<f64>,
    /// Off-diagonal loss of this iterate.
    pub meanoffdiag: f64,
    /// Number of completed iterations when the snapshot was taken.
    pub iteration: usize,
    /// The input matrices transformed by `v`.
    pub diagonalized: Vec<Mat<f64>>,
}

/// Keep whichever of the current best and the candidate has the strictly smaller loss.
pub fn keep_best(current: Option<BestIterate>, candidate: BestIterate) -> Option<BestIterate> {
    match current {
        Some(best) if candidate.meanoffdiag < best.meanoffdiag => Some(candidate),
        Some(best) => Some(best),
        None => Some(candidate),
    }
}

/// Apply the congruence `V * R * Vᵗ` to every matrix.
///
/// The outputs are symmetrized since the inputs are symmetric.
pub fn diagonalize_all(
    v: MatRef<'_, f64>,
    matrices: &[Mat<f64>],
) -> Result<Vec<Mat<f64>>, UwedgeError> {
    matrices
        .iter()
        .map(|r| {
            let mut rs = congruence(v, r.as_ref())?;
            symmetrize(&mut rs)?;
            Ok(rs)
        })
        .collect()
}

/// Root mean square of the off-diagonal entries over a set of square matrices.
///
/// Returns zero when the matrices are 1x1 since there is nothing to average.
pub fn offdiag_metric(diagonalized: &[Mat<f64>]) -> Result<f64, UwedgeError> {
    let n = match diagonalized.first() {
        Some(m) => m.nrows(),
        None => return Err(UwedgeError::EmptyInput),
    };
    let count = diagonalized.len() * (n * n - n);
    if count == 0 {
        return Ok(0.0);
    }
    let mut total = 0.0;
    for m in diagonalized {
        total += offdiag_sq_sum(m.as_ref())?;
    }
    Ok((total / count as f64).sqrt())
}

/// Off-diagonal loss of the diagonalizer `v` over `matrices`.
///
/// # Arguments
///
/// * `v` - A diagonalizer with shape (n, d).
/// * `matrices` - Symmetric matrices with shape (d, d).
pub fn mean_offdiag(v: MatRef<'_, f64>, matrices: &[Mat<f64>]) -> Result<f64, UwedgeError> {
    offdiag_metric(&diagonalize_all(v, matrices)?)
}

/// Condition number of `v` and whether it exceeds `threshold`, when a threshold is set.
pub(crate) fn condition_guard(v: MatRef<'_, f64>, threshold: Option<f64>) -> Option<(f64, bool)> {
    let threshold = threshold?;
    let condition = condition_number(v);
    Some((condition, condition > threshold))
}
