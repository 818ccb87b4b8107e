use ajd_linalg::decompose::solve_checked;
use ajd_linalg::ops::{
    all_finite, diag_assign, diag_extract, divide_clamped, max_abs_diff, outer_product,
    row_normalize,
};
use ajd_linalg::LinalgError;
use faer::{Mat, MatRef};

use crate::error::UwedgeError;
use crate::init::{initial_diagonalizer, validate_matrices};
use crate::monitor::{
    condition_guard, diagonalize_all, keep_best, offdiag_metric, BestIterate, Termination,
};
use crate::params::{Config, UwedgeParams};
use crate::result::{scale_rows, UwedgeResult};

/// Largest condition number accepted for the coefficient matrix of an iteration.
const MAX_COEFFICIENT_CONDITION: f64 = 1.0 / f64::EPSILON;

/// Build the coefficient matrix A from the congruent set `V * Rx[i] * Vᵗ`.
///
/// With `D[i, k] = Rs[i][k, k]`, `z = DᵗD / M` and `y[k, l] = mean_i D[i, l] * Rs[i][k, l]`:
///
/// ```text
/// A[k, l] = (z[k, k] * y[k, l] - z[k, l] * y[l, k]) / (z[k, k] * z[l, l] - z[k, l]²)
/// A[k, k] = 1
/// ```
///
/// Denominators below `denom_floor` in magnitude are clamped to `denom_floor`.
pub fn coefficient_matrix(rs: &[Mat<f64>], denom_floor: f64) -> Result<Mat<f64>, UwedgeError> {
    let num_matrices = rs.len();
    if num_matrices == 0 {
        return Err(UwedgeError::EmptyInput);
    }
    let n = rs[0].nrows();

    // diagonals stacked as rows, shape (M, n)
    let diags = rs
        .iter()
        .map(|m| diag_extract(m.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(bad) = diags.iter().position(|d| d.len() != n) {
        return Err(UwedgeError::DimensionMismatch {
            index: bad,
            expected: n,
            actual: diags[bad].len(),
        });
    }
    let d_mat = Mat::from_fn(num_matrices, n, |i, k| diags[i][k]);

    let scale = 1.0 / num_matrices as f64;
    let gram = d_mat.as_ref().transpose() * d_mat.as_ref();
    let cross = Mat::from_fn(n, n, |k, l| gram.read(k, l) * scale);
    let cross_diag = diag_extract(cross.as_ref())?;

    let outer = outer_product(&cross_diag, &cross_diag);
    let mut denom = Mat::from_fn(n, n, |k, l| {
        outer.read(k, l) - cross.read(k, l) * cross.read(k, l)
    });
    diag_assign(&mut denom, 1.0)?;

    let mut rkl = Mat::<f64>::zeros(n, n);
    for (m, d) in rs.iter().zip(diags.iter()) {
        for l in 0..n {
            for k in 0..n {
                rkl[(k, l)] += d[l] * m.read(k, l);
            }
        }
    }
    let rkl = Mat::from_fn(n, n, |k, l| rkl.read(k, l) * scale);

    let num = Mat::from_fn(n, n, |k, l| {
        cross_diag[k] * rkl.read(k, l) - cross.read(k, l) * rkl.read(l, k)
    });

    let mut a = divide_clamped(num.as_ref(), denom.as_ref(), denom_floor)?;
    diag_assign(&mut a, 1.0)?;

    Ok(a)
}

/// Outcome of a single uwedge iteration.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Index of the attempted iteration, starting at 1.
    pub iteration: usize,
    /// Largest absolute elementwise change of the diagonalizer.
    pub change: f64,
    /// Off-diagonal loss of the new iterate, when loss tracking is enabled.
    pub meanoffdiag: Option<f64>,
    /// Condition number of the new iterate, when the condition guard is enabled.
    pub condition: Option<f64>,
    /// Terminal state reached by this iteration, if any.
    pub termination: Option<Termination>,
}

/// Iterative uwedge joint diagonalizer.
///
/// [`Uwedge::new`] validates the input and builds the starting diagonalizer,
/// [`Uwedge::step`] runs one fixed point iteration and [`Uwedge::finish`] packages
/// the result.
pub struct Uwedge<'a> {
    matrices: &'a [Mat<f64>],
    scale_by: Option<MatRef<'a, f64>>,
    config: Config,
    v: Mat<f64>,
    iteration: usize,
    termination: Option<Termination>,
    best: Option<BestIterate>,
}

impl<'a> Uwedge<'a> {
    /// Validate the input and compute the starting diagonalizer.
    ///
    /// # Arguments
    ///
    /// * `matrices` - Symmetric matrices with shape (d, d).
    /// * `params` - The solver parameters.
    pub fn new(matrices: &'a [Mat<f64>], params: &'a UwedgeParams) -> Result<Self, UwedgeError> {
        let dim = validate_matrices(matrices)?;
        let config = params.resolve(dim)?;

        if matrices.iter().any(|m| !all_finite(m.as_ref())) {
            return Err(UwedgeError::NonFinite { iteration: 0 });
        }

        let scale_by = match &params.scale_by {
            Some(s) if s.nrows() != dim || s.ncols() != dim => {
                return Err(UwedgeError::ScalingShape {
                    rows: s.nrows(),
                    cols: s.ncols(),
                    expected: dim,
                })
            }
            Some(s) => Some(s.as_ref()),
            None => None,
        };

        let seed = params.init.as_ref().map(|s| s.as_ref());
        let v = initial_diagonalizer(matrices, seed, config.n_components)?;

        log::debug!(
            "uwedge: {} matrices of dim {}, {} components",
            matrices.len(),
            config.dim,
            config.n_components
        );

        Ok(Self {
            matrices,
            scale_by,
            config,
            v,
            iteration: 0,
            termination: None,
            best: None,
        })
    }

    /// The current diagonalizer.
    pub fn v(&self) -> MatRef<'_, f64> {
        self.v.as_ref()
    }

    /// Number of completed iterations.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// The terminal state, once reached.
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Whether a terminal state has been reached.
    pub fn is_done(&self) -> bool {
        self.termination.is_some()
    }

    /// The best iterate so far, when loss tracking is enabled.
    pub fn best(&self) -> Option<&BestIterate> {
        self.best.as_ref()
    }

    /// Run one iteration of the fixed point update.
    ///
    /// Once a terminal state is reached the diagonalizer no longer changes and
    /// further calls return that state again.
    pub fn step(&mut self) -> Result<StepOutcome, UwedgeError> {
        if let Some(termination) = self.termination {
            return Ok(StepOutcome {
                iteration: self.iteration,
                change: 0.0,
                meanoffdiag: self.best.as_ref().map(|b| b.meanoffdiag),
                condition: None,
                termination: Some(termination),
            });
        }

        let iteration = self.iteration + 1;

        let rs = diagonalize_all(self.v.as_ref(), self.matrices)?;
        let a = coefficient_matrix(&rs, self.config.denom_floor)?;

        let mut v_new = solve_checked(a.as_ref(), self.v.as_ref(), MAX_COEFFICIENT_CONDITION)
            .map_err(|e| match e {
                LinalgError::Singular { condition } => UwedgeError::Singular {
                    iteration,
                    condition,
                },
                LinalgError::NonFinite { .. } => UwedgeError::NonFinite { iteration },
                other => other.into(),
            })?;
        row_normalize(&mut v_new);

        let change = max_abs_diff(v_new.as_ref(), self.v.as_ref())?;
        if !change.is_finite() {
            return Err(UwedgeError::NonFinite { iteration });
        }

        // a converging iterate is final, the guard only stops runs still moving
        let converging = change < self.config.tol;
        let guard = condition_guard(v_new.as_ref(), self.config.condition_threshold);
        if let (false, Some((condition, true))) = (converging, guard) {
            if !self.config.silent {
                log::warn!(
                    "uwedge: condition number {:e} of iterate {} exceeds {:e}, keeping iterate {}",
                    condition,
                    iteration,
                    self.config.condition_threshold.unwrap_or(f64::INFINITY),
                    self.iteration
                );
            }
            self.termination = Some(Termination::Aborted);
            return Ok(StepOutcome {
                iteration,
                change,
                meanoffdiag: None,
                condition: Some(condition),
                termination: self.termination,
            });
        }

        self.v = v_new;
        self.iteration = iteration;

        let meanoffdiag = if self.config.minimize_loss {
            let diagonalized = diagonalize_all(self.v.as_ref(), self.matrices)?;
            let meanoffdiag = offdiag_metric(&diagonalized)?;
            self.best = keep_best(
                self.best.take(),
                BestIterate {
                    v: self.v.clone(),
                    meanoffdiag,
                    iteration,
                    diagonalized,
                },
            );
            Some(meanoffdiag)
        } else {
            None
        };

        log::debug!(
            "uwedge iteration {}: change {:e}, loss {:?}",
            iteration,
            change,
            meanoffdiag
        );

        if converging {
            self.termination = Some(Termination::Converged);
        } else if iteration >= self.config.max_iter {
            self.termination = Some(Termination::MaxIterReached);
        }

        Ok(StepOutcome {
            iteration,
            change,
            meanoffdiag,
            condition: guard.map(|(condition, _)| condition),
            termination: self.termination,
        })
    }

    /// Package the result.
    ///
    /// With loss tracking the best iterate is returned, otherwise the last one. An
    /// engine finished before reaching a terminal state reports
    /// [`Termination::MaxIterReached`].
    pub fn finish(self) -> Result<UwedgeResult, UwedgeError> {
        let termination = self.termination.unwrap_or(Termination::MaxIterReached);

        let (mut v, iterations, meanoffdiag, diagonalized) = match self.best {
            Some(best) if self.config.minimize_loss => {
                (best.v, best.iteration, best.meanoffdiag, best.diagonalized)
            }
            _ => {
                let diagonalized = diagonalize_all(self.v.as_ref(), self.matrices)?;
                let meanoffdiag = offdiag_metric(&diagonalized)?;
                (self.v, self.iteration, meanoffdiag, diagonalized)
            }
        };

        let diagonalized = match self.scale_by {
            Some(scale_by) => {
                scale_rows(&mut v, scale_by)?;
                if self.config.return_diag {
                    Some(diagonalize_all(v.as_ref(), self.matrices)?)
                } else {
                    None
                }
            }
            None => self.config.return_diag.then_some(diagonalized),
        };

        if !self.config.silent {
            log::info!(
                "uwedge: {:?} after {} iterations, meanoffdiag {:e}",
                termination,
                iterations,
                meanoffdiag
            );
        }

        Ok(UwedgeResult {
            v,
            diagonalized,
            converged: termination == Termination::Converged,
            termination,
            iterations,
            meanoffdiag,
        })
    }
}
