use faer::Mat;

use crate::error::UwedgeError;

/// Parameters controlling the uwedge joint diagonalizer.
///
/// Every optional input is resolved once against the input dimension before the
/// first iteration.
#[derive(Debug, Clone)]
pub struct UwedgeParams {
    /// Seed diagonalizer with shape (>= n_components, d). Only the first
    /// `n_components` rows are used and they must be linearly independent.
    /// Defaults to a whitening of the first matrix.
    pub init: Option<Mat<f64>>,
    /// Optional (d, d) matrix whose congruence by the returned diagonalizer is
    /// scaled to unit diagonal.
    pub scale_by: Option<Mat<f64>>,
    /// Number of rows of the diagonalizer, `1 <= n_components <= d`. Defaults to d.
    pub n_components: Option<usize>,
    /// Whether the result carries the diagonalized matrices.
    pub return_diag: bool,
    /// Convergence threshold on the largest elementwise change of the diagonalizer.
    pub tol: f64,
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Keep the iterate with the smallest off-diagonal loss instead of the last one.
    pub minimize_loss: bool,
    /// Abort when the condition number of a new iterate exceeds this value.
    pub condition_threshold: Option<f64>,
    /// Suppress info and warning logs.
    pub silent: bool,
    /// Smallest magnitude allowed for the coefficient denominators.
    pub denom_floor: f64,
}

impl Default for UwedgeParams {
    fn default() -> Self {
        Self {
            init: None,
            scale_by: None,
            n_components: None,
            return_diag: false,
            tol: 1e-10,
            max_iter: 1000,
            minimize_loss: false,
            condition_threshold: None,
            silent: true,
            denom_floor: f64::EPSILON,
        }
    }
}

/// Scalar settings resolved against the input dimension.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Config {
    pub dim: usize,
    pub n_components: usize,
    pub return_diag: bool,
    pub tol: f64,
    pub max_iter: usize,
    pub minimize_loss: bool,
    pub condition_threshold: Option<f64>,
    pub silent: bool,
    pub denom_floor: f64,
}

impl UwedgeParams {
    pub(crate) fn resolve(&self, dim: usize) -> Result<Config, UwedgeError> {
        let n_components = self.n_components.unwrap_or(dim);
        if n_components == 0 || n_components > dim {
            return Err(UwedgeError::InvalidParameter(format!(
                "n_components must be in [1, {dim}], got {n_components}"
            )));
        }
        if self.tol.is_nan() || self.tol < 0.0 {
            return Err(UwedgeError::InvalidParameter(format!(
                "tol must be non-negative, got {}",
                self.tol
            )));
        }
        if self.max_iter == 0 {
            return Err(UwedgeError::InvalidParameter(
                "max_iter must be positive".to_string(),
            ));
        }
        if let Some(threshold) = self.condition_threshold {
            if threshold.is_nan() || threshold <= 0.0 {
                return Err(UwedgeError::InvalidParameter(format!(
                    "condition_threshold must be positive, got {threshold}"
                )));
            }
        }
        if !self.denom_floor.is_finite() || self.denom_floor <= 0.0 {
            return Err(UwedgeError::InvalidParameter(format!(
                "denom_floor must be positive and finite, got {}",
                self.denom_floor
            )));
        }

        Ok(Config {
            dim,
            n_components,
            return_diag: self.return_diag,
            tol: self.tol,
            max_iter: self.max_iter,
            minimize_loss: self.minimize_loss,
            condition_threshold: self.condition_threshold,
            silent: self.silent,
            denom_floor: self.denom_floor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() -> Result<(), UwedgeError> {
        let config = UwedgeParams::default().resolve(4)?;
        assert_eq!(config.dim, 4);
        assert_eq!(config.n_components, 4);
        assert_eq!(config.max_iter, 1000);
        assert_eq!(config.tol, 1e-10);
        assert_eq!(config.denom_floor, f64::EPSILON);
        assert!(config.silent);
        assert!(!config.return_diag);
        assert!(!config.minimize_loss);
        assert!(config.condition_threshold.is_none());
        Ok(())
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            UwedgeParams {
                n_components: Some(0),
                ..Default::default()
            },
            UwedgeParams {
                n_components: Some(5),
                ..Default::default()
            },
            UwedgeParams {
                tol: f64::NAN,
                ..Default::default()
            },
            UwedgeParams {
                max_iter: 0,
                ..Default::default()
            },
            UwedgeParams {
                condition_threshold: Some(-1.0),
                ..Default::default()
            },
            UwedgeParams {
                denom_floor: 0.0,
                ..Default::default()
            },
        ];
        for params in cases {
            assert!(matches!(
                params.resolve(4),
                Err(UwedgeError::InvalidParameter(_))
            ));
        }
    }
}
