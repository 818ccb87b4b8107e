use faer::{Mat, MatRef};

use crate::LinalgError;

/// Returns the dimension of a square matrix, or an error naming `op`.
pub fn ensure_square(op: &'static str, m: MatRef<'_, f64>) -> Result<usize, LinalgError> {
    if m.nrows() != m.ncols() {
        return Err(LinalgError::NotSquare {
            op,
            rows: m.nrows(),
            cols: m.ncols(),
        });
    }
    Ok(m.nrows())
}

fn ensure_same_shape(
    op: &'static str,
    a: MatRef<'_, f64>,
    b: MatRef<'_, f64>,
) -> Result<(), LinalgError> {
    if a.nrows() != b.nrows() || a.ncols() != b.ncols() {
        return Err(LinalgError::ShapeMismatch {
            op,
            left_rows: a.nrows(),
            left_cols: a.ncols(),
            right_rows: b.nrows(),
            right_cols: b.ncols(),
        });
    }
    Ok(())
}

/// Extract the diagonal of a square matrix.
///
/// # Arguments
///
/// * `m` - A square matrix of shape (n, n).
///
/// # Returns
///
/// The n diagonal entries in order.
pub fn diag_extract(m: MatRef<'_, f64>) -> Result<Vec<f64>, LinalgError> {
    let n = ensure_square("diag_extract", m)?;
    Ok((0..n).map(|k| m.read(k, k)).collect())
}

/// Overwrite every diagonal entry of a square matrix with `value`.
pub fn diag_assign(m: &mut Mat<f64>, value: f64) -> Result<(), LinalgError> {
    let n = ensure_square("diag_assign", m.as_ref())?;
    for k in 0..n {
        m[(k, k)] = value;
    }
    Ok(())
}

/// Outer product of two vectors, `out[k, l] = a[k] * b[l]`.
pub fn outer_product(a: &[f64], b: &[f64]) -> Mat<f64> {
    Mat::from_fn(a.len(), b.len(), |k, l| a[k] * b[l])
}

/// Elementwise division with a clamped denominator.
///
/// Every denominator entry whose magnitude is below `floor` is replaced by `floor`
/// before dividing.
///
/// # Arguments
///
/// * `num` - The numerator matrix.
/// * `denom` - The denominator matrix, same shape as `num`.
/// * `floor` - The smallest denominator magnitude allowed.
pub fn divide_clamped(
    num: MatRef<'_, f64>,
    denom: MatRef<'_, f64>,
    floor: f64,
) -> Result<Mat<f64>, LinalgError> {
    ensure_same_shape("divide_clamped", num, denom)?;
    Ok(Mat::from_fn(num.nrows(), num.ncols(), |i, j| {
        let d = denom.read(i, j);
        let d = if d.abs() < floor { floor } else { d };
        num.read(i, j) / d
    }))
}

/// Euclidean norm of every row.
pub fn row_norms(m: MatRef<'_, f64>) -> Vec<f64> {
    (0..m.nrows())
        .map(|i| {
            (0..m.ncols())
                .map(|j| m.read(i, j) * m.read(i, j))
                .sum::<f64>()
                .sqrt()
        })
        .collect()
}

/// Scale every row to unit Euclidean norm in place.
///
/// Rows with a zero norm are left untouched.
pub fn row_normalize(m: &mut Mat<f64>) {
    let norms = row_norms(m.as_ref());
    for (i, norm) in norms.into_iter().enumerate() {
        if norm == 0.0 {
            continue;
        }
        for j in 0..m.ncols() {
            m[(i, j)] /= norm;
        }
    }
}

/// Largest absolute elementwise difference between two matrices of the same shape.
pub fn max_abs_diff(a: MatRef<'_, f64>, b: MatRef<'_, f64>) -> Result<f64, LinalgError> {
    ensure_same_shape("max_abs_diff", a, b)?;
    let mut max = 0.0f64;
    for j in 0..a.ncols() {
        for i in 0..a.nrows() {
            max = max.max((a.read(i, j) - b.read(i, j)).abs());
        }
    }
    Ok(max)
}

/// Replace a square matrix by its symmetric part `(M + Mᵗ) / 2`.
pub fn symmetrize(m: &mut Mat<f64>) -> Result<(), LinalgError> {
    let n = ensure_square("symmetrize", m.as_ref())?;
    for i in 0..n {
        for j in (i + 1)..n {
            let avg = 0.5 * (m[(i, j)] + m[(j, i)]);
            m[(i, j)] = avg;
            m[(j, i)] = avg;
        }
    }
    Ok(())
}

/// Sum of the squared off-diagonal entries of a square matrix.
///
/// Equivalent to the squared Frobenius norm minus the squared diagonal.
pub fn offdiag_sq_sum(m: MatRef<'_, f64>) -> Result<f64, LinalgError> {
    let n = ensure_square("offdiag_sq_sum", m)?;
    let mut sum = 0.0;
    for j in 0..n {
        for i in 0..n {
            if i != j {
                sum += m.read(i, j) * m.read(i, j);
            }
        }
    }
    Ok(sum)
}

/// Whether every entry is finite.
pub fn all_finite(m: MatRef<'_, f64>) -> bool {
    (0..m.ncols()).all(|j| (0..m.nrows()).all(|i| m.read(i, j).is_finite()))
}
