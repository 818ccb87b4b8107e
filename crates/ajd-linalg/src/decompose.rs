use faer::prelude::SpSolver;
use faer::{Mat, MatRef};

use crate::ops::{all_finite, ensure_square};
use crate::LinalgError;

/// Congruence transform `V * R * Vᵗ`.
///
/// # Arguments
///
/// * `v` - The transform with shape (n, d).
/// * `r` - A square matrix with shape (d, d).
///
/// # Returns
///
/// The transformed matrix with shape (n, n).
pub fn congruence(v: MatRef<'_, f64>, r: MatRef<'_, f64>) -> Result<Mat<f64>, LinalgError> {
    let d = ensure_square("congruence", r)?;
    if v.ncols() != d {
        return Err(LinalgError::ShapeMismatch {
            op: "congruence",
            left_rows: v.nrows(),
            left_cols: v.ncols(),
            right_rows: r.nrows(),
            right_cols: r.ncols(),
        });
    }
    let vr = v * r;
    Ok(vr.as_ref() * v.transpose())
}

/// Eigendecomposition of a symmetric matrix.
#[derive(Debug, Clone)]
pub struct SymmetricEigen {
    /// Eigenvalues sorted in descending order.
    pub eigenvalues: Vec<f64>,
    /// Eigenvectors stored as columns, in the same order as `eigenvalues`.
    pub eigenvectors: Mat<f64>,
}

/// Compute the eigendecomposition of a symmetric matrix.
///
/// Only the lower triangle of `m` is read.
pub fn symmetric_eigen(m: MatRef<'_, f64>) -> Result<SymmetricEigen, LinalgError> {
    let n = ensure_square("symmetric_eigen", m)?;

    let evd = m.selfadjoint_eigendecomposition(faer::Side::Lower);
    let s = evd.s().column_vector();
    let u = evd.u();

    let mut order = (0..n).collect::<Vec<_>>();
    let values = (0..n).map(|k| s.read(k)).collect::<Vec<_>>();
    if values.iter().any(|v| !v.is_finite()) || !all_finite(u) {
        return Err(LinalgError::NonFinite {
            op: "symmetric_eigen",
        });
    }
    // faer returns ascending eigenvalues
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let eigenvalues = order.iter().map(|&k| values[k]).collect();
    let eigenvectors = Mat::from_fn(n, n, |i, j| u.read(i, order[j]));

    Ok(SymmetricEigen {
        eigenvalues,
        eigenvectors,
    })
}

/// Condition number of a (possibly rectangular) matrix.
///
/// Ratio of the largest to the smallest singular value. Returns `f64::INFINITY`
/// when the smallest singular value is zero or the decomposition is not finite.
pub fn condition_number(m: MatRef<'_, f64>) -> f64 {
    if m.nrows() == 0 || m.ncols() == 0 {
        return 1.0;
    }
    let singular_values = m.singular_values();
    let (min, max) = singular_values
        .iter()
        .fold((f64::INFINITY, 0.0f64), |(lo, hi), &s| (lo.min(s), hi.max(s)));
    if !max.is_finite() || !min.is_finite() || min <= 0.0 {
        return f64::INFINITY;
    }
    max / min
}

/// Solve `A * X = B` with a partially pivoted LU decomposition.
///
/// Fails with [`LinalgError::Singular`] when the condition number of `A` exceeds
/// `max_condition`, and with [`LinalgError::NonFinite`] if the solution is not finite.
///
/// # Arguments
///
/// * `a` - The square system matrix with shape (n, n).
/// * `b` - The right hand side with shape (n, k).
/// * `max_condition` - The largest condition number accepted for `a`.
pub fn solve_checked(
    a: MatRef<'_, f64>,
    b: MatRef<'_, f64>,
    max_condition: f64,
) -> Result<Mat<f64>, LinalgError> {
    let n = ensure_square("solve_checked", a)?;
    if b.nrows() != n {
        return Err(LinalgError::ShapeMismatch {
            op: "solve_checked",
            left_rows: a.nrows(),
            left_cols: a.ncols(),
            right_rows: b.nrows(),
            right_cols: b.ncols(),
        });
    }

    let condition = condition_number(a);
    if !condition.is_finite() || condition > max_condition {
        return Err(LinalgError::Singular { condition });
    }

    let x = a.partial_piv_lu().solve(b);
    if !all_finite(x.as_ref()) {
        return Err(LinalgError::NonFinite { op: "solve_checked" });
    }

    Ok(x)
}
