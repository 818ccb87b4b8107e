use ajd_linalg::decompose::{condition_number, symmetric_eigen};
use ajd_linalg::ops::row_normalize;
use faer::{Mat, MatRef};

use crate::error::UwedgeError;

/// Check that the collection is non-empty and made of square matrices of one size.
///
/// # Returns
///
/// The shared dimension d of the matrices.
pub fn validate_matrices(matrices: &[Mat<f64>]) -> Result<usize, UwedgeError> {
    let first = matrices.first().ok_or(UwedgeError::EmptyInput)?;
    let dim = first.nrows();

    for (index, m) in matrices.iter().enumerate() {
        if m.nrows() != m.ncols() {
            return Err(UwedgeError::NonSquare {
                index,
                rows: m.nrows(),
                cols: m.ncols(),
            });
        }
        if m.nrows() != dim {
            return Err(UwedgeError::DimensionMismatch {
                index,
                expected: dim,
                actual: m.nrows(),
            });
        }
    }

    if dim == 0 {
        return Err(UwedgeError::NonSquare {
            index: 0,
            rows: 0,
            cols: 0,
        });
    }

    Ok(dim)
}

/// Whitening transform of a symmetric matrix restricted to its leading eigenpairs.
///
/// Row k is `e_kᵗ / sqrt(|λ_k|)` where `(λ_k, e_k)` are the eigenpairs sorted by
/// descending eigenvalue. Eigenvalues of zero magnitude are floored to the smallest
/// positive normal number.
///
/// # Arguments
///
/// * `m` - A symmetric matrix with shape (d, d).
/// * `n_components` - The number of rows to keep, at most d.
pub fn whitening(m: MatRef<'_, f64>, n_components: usize) -> Result<Mat<f64>, UwedgeError> {
    let eig = symmetric_eigen(m)?;
    let dim = eig.eigenvalues.len();
    if n_components > dim {
        return Err(UwedgeError::InvalidParameter(format!(
            "n_components must be in [1, {dim}], got {n_components}"
        )));
    }

    let scales = eig.eigenvalues[..n_components]
        .iter()
        .map(|l| 1.0 / l.abs().max(f64::MIN_POSITIVE).sqrt())
        .collect::<Vec<_>>();

    Ok(Mat::from_fn(n_components, dim, |k, j| {
        scales[k] * eig.eigenvectors.read(j, k)
    }))
}

/// Largest condition number accepted for the rows taken from a seed.
const MAX_SEED_CONDITION: f64 = 1.0 / f64::EPSILON;

/// Produce the starting diagonalizer V₀ with unit-norm rows.
///
/// Without a seed the transform whitens the first matrix. With a seed its first
/// `n_components` rows are used directly and must be linearly independent.
///
/// The matrices are validated here as well since this is callable on its own.
///
/// # Arguments
///
/// * `matrices` - The input matrices, each (d, d).
/// * `seed` - Optional seed with at least `n_components` rows and d columns.
/// * `n_components` - The number of rows of V₀.
pub fn initial_diagonalizer(
    matrices: &[Mat<f64>],
    seed: Option<MatRef<'_, f64>>,
    n_components: usize,
) -> Result<Mat<f64>, UwedgeError> {
    let dim = validate_matrices(matrices)?;

    let mut v0 = match seed {
        Some(seed) => {
            if seed.nrows() < n_components || seed.ncols() != dim {
                return Err(UwedgeError::SeedShape {
                    rows: seed.nrows(),
                    cols: seed.ncols(),
                    min_rows: n_components,
                    expected_cols: dim,
                });
            }
            let rows = Mat::from_fn(n_components, dim, |i, j| seed.read(i, j));
            let condition = condition_number(rows.as_ref());
            if !condition.is_finite() || condition > MAX_SEED_CONDITION {
                return Err(UwedgeError::InvalidParameter(format!(
                    "seed rows must be linearly independent, condition number {condition:e}"
                )));
            }
            rows
        }
        None => whitening(matrices[0].as_ref(), n_components)?,
    };

    row_normalize(&mut v0);

    Ok(v0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ajd_linalg::ops::row_norms;
    use approx::assert_relative_eq;

    fn diag(values: &[f64]) -> Mat<f64> {
        Mat::from_fn(values.len(), values.len(), |i, j| {
            if i == j {
                values[i]
            } else {
                0.0
            }
        })
    }

    #[test]
    fn test_validate_matrices() -> Result<(), UwedgeError> {
        assert!(matches!(
            validate_matrices(&[]),
            Err(UwedgeError::EmptyInput)
        ));
        assert!(matches!(
            validate_matrices(&[Mat::zeros(2, 3)]),
            Err(UwedgeError::NonSquare { index: 0, .. })
        ));
        assert!(matches!(
            validate_matrices(&[diag(&[1.0, 2.0]), diag(&[1.0, 2.0, 3.0])]),
            Err(UwedgeError::DimensionMismatch {
                index: 1,
                expected: 2,
                actual: 3
            })
        ));
        assert_eq!(validate_matrices(&[diag(&[1.0, 2.0]), diag(&[3.0, 4.0])])?, 2);
        Ok(())
    }

    #[test]
    fn test_whitening_diagonal() -> Result<(), UwedgeError> {
        let w = whitening(diag(&[1.0, 4.0, 9.0]).as_ref(), 3)?;
        // rows follow descending eigenvalues: 9, 4, 1
        assert_relative_eq!(w[(0, 2)].abs(), 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(w[(1, 1)].abs(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(w[(2, 0)].abs(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(w[(0, 0)], 0.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_whitening_negative_and_zero_eigenvalues() -> Result<(), UwedgeError> {
        let w = whitening(diag(&[-4.0, 0.0]).as_ref(), 2)?;
        assert!(w[(0, 0)].is_finite() && w[(0, 1)].is_finite());
        assert!(w[(1, 0)].is_finite() && w[(1, 1)].is_finite());
        // the zero eigenvalue comes first in descending order
        assert_relative_eq!(w[(1, 0)].abs(), 0.5, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_initial_diagonalizer_unit_rows() -> Result<(), UwedgeError> {
        let rx = Mat::from_fn(3, 3, |i, j| {
            [[4.0, 1.0, 0.5], [1.0, 3.0, 0.2], [0.5, 0.2, 2.0]][i][j]
        });
        let v0 = initial_diagonalizer(&[rx], None, 2)?;
        assert_eq!(v0.nrows(), 2);
        assert_eq!(v0.ncols(), 3);
        for norm in row_norms(v0.as_ref()) {
            assert_relative_eq!(norm, 1.0, epsilon = 1e-12);
        }
        Ok(())
    }

    #[test]
    fn test_initial_diagonalizer_seed() -> Result<(), UwedgeError> {
        let rx = diag(&[1.0, 2.0]);
        let seed = Mat::from_fn(3, 2, |i, j| [[3.0, 4.0], [0.0, 2.0], [9.0, 9.0]][i][j]);

        let v0 = initial_diagonalizer(&[rx.clone()], Some(seed.as_ref()), 2)?;
        assert_relative_eq!(v0[(0, 0)], 0.6);
        assert_relative_eq!(v0[(0, 1)], 0.8);
        assert_relative_eq!(v0[(1, 1)], 1.0);

        let short = Mat::<f64>::zeros(1, 2);
        assert!(matches!(
            initial_diagonalizer(&[rx], Some(short.as_ref()), 2),
            Err(UwedgeError::SeedShape { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_initial_diagonalizer_rank_deficient_seed() {
        let rx = diag(&[1.0, 2.0]);
        let seed = Mat::from_fn(2, 2, |_, j| [1.0, 0.0][j]);
        assert!(matches!(
            initial_diagonalizer(&[rx.clone()], Some(seed.as_ref()), 2),
            Err(UwedgeError::InvalidParameter(_))
        ));

        // a single row is never rank deficient unless it is zero
        assert!(initial_diagonalizer(&[rx.clone()], Some(seed.as_ref()), 1).is_ok());
        let zero = Mat::<f64>::zeros(1, 2);
        assert!(matches!(
            initial_diagonalizer(&[rx], Some(zero.as_ref()), 1),
            Err(UwedgeError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_initial_diagonalizer_validates_input() {
        assert!(matches!(
            initial_diagonalizer(&[], None, 1),
            Err(UwedgeError::EmptyInput)
        ));
        assert!(matches!(
            initial_diagonalizer(&[diag(&[1.0, 2.0]), diag(&[1.0])], None, 1),
            Err(UwedgeError::DimensionMismatch { index: 1, .. })
        ));
    }
}
