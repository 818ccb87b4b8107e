#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Approximate joint diagonalization
//!
//! Given M symmetric matrices `Rx[i]` of size d×d, [`uwedge`] finds a single matrix
//! V of shape (n_components, d) such that every `V * Rx[i] * Vᵗ` is as close to
//! diagonal as possible. The rows of V are kept at unit Euclidean norm.
//!
//! ## Example
//!
//! ```rust
//! use ajd_uwedge::{uwedge, UwedgeParams};
//! use faer::Mat;
//!
//! // Rx[i] = A * diag(r_i) * Aᵗ with a shared mixing A
//! let a = [[1.0, 0.4], [-0.3, 1.1]];
//! let matrices = [[1.0, 2.0], [3.0, 0.5], [0.8, 1.7]]
//!     .iter()
//!     .map(|r| {
//!         Mat::from_fn(2, 2, |i, j| (0..2).map(|k| a[i][k] * r[k] * a[j][k]).sum::<f64>())
//!     })
//!     .collect::<Vec<_>>();
//!
//! let params = UwedgeParams {
//!     return_diag: true,
//!     ..Default::default()
//! };
//! let result = uwedge(&matrices, &params)?;
//!
//! println!("converged: {} in {} iterations", result.converged, result.iterations);
//! println!("meanoffdiag: {:e}", result.meanoffdiag);
//! # Ok::<(), ajd_uwedge::UwedgeError>(())
//! ```

mod engine;
mod error;
mod init;
mod monitor;
mod params;
mod result;

pub use engine::{coefficient_matrix, StepOutcome, Uwedge};
pub use error::UwedgeError;
pub use init::{initial_diagonalizer, validate_matrices, whitening};
pub use monitor::{
    diagonalize_all, keep_best, mean_offdiag, offdiag_metric, BestIterate, Termination,
};
pub use params::UwedgeParams;
pub use result::{UwedgeResult, UwedgeSummary};

use faer::Mat;

/// Compute an approximate joint diagonalizer of a set of symmetric matrices.
///
/// Runs [`Uwedge::step`] until convergence, the condition number guard or the
/// iteration cap stops it, then packages the result.
///
/// # Arguments
///
/// * `matrices` - M symmetric matrices with shape (d, d), M >= 1.
/// * `params` - The solver parameters.
///
/// # Returns
///
/// The diagonalizer with its diagnostics. A run stopped by the condition number
/// guard is not an error: it returns the last healthy iterate with
/// [`Termination::Aborted`].
pub fn uwedge(matrices: &[Mat<f64>], params: &UwedgeParams) -> Result<UwedgeResult, UwedgeError> {
    let mut engine = Uwedge::new(matrices, params)?;
    while !engine.is_done() {
        engine.step()?;
    }
    engine.finish()
}
