use ajd_linalg::LinalgError;
use thiserror::Error;

/// Error types for the uwedge joint diagonalizer.
#[derive(Debug, Error)]
pub enum UwedgeError {
    /// The matrix collection is empty.
    #[error("uwedge requires at least one input matrix")]
    EmptyInput,

    /// One of the input matrices is not square.
    #[error("input matrix {index} is not square: {rows}x{cols}")]
    NonSquare {
        /// Position of the offending matrix in the collection
        index: usize,
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// The input matrices do not share one dimension.
    #[error("input matrix {index} is {actual}x{actual}, expected {expected}x{expected}")]
    DimensionMismatch {
        /// Position of the offending matrix in the collection
        index: usize,
        /// Dimension of the first matrix
        expected: usize,
        /// Dimension of the offending matrix
        actual: usize,
    },

    /// The seed matrix has too few rows or the wrong number of columns.
    #[error("seed matrix is {rows}x{cols}, expected at least {min_rows} rows and {expected_cols} columns")]
    SeedShape {
        /// Rows of the seed matrix
        rows: usize,
        /// Columns of the seed matrix
        cols: usize,
        /// Requested number of components
        min_rows: usize,
        /// Dimension of the input matrices
        expected_cols: usize,
    },

    /// The scaling matrix does not match the input dimension.
    #[error("scaling matrix is {rows}x{cols}, expected {expected}x{expected}")]
    ScalingShape {
        /// Rows of the scaling matrix
        rows: usize,
        /// Columns of the scaling matrix
        cols: usize,
        /// Dimension of the input matrices
        expected: usize,
    },

    /// A parameter is outside of its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The coefficient matrix of an iteration could not be solved.
    #[error("singular coefficient matrix at iteration {iteration}, condition number {condition:e}")]
    Singular {
        /// Iteration in which the solve failed
        iteration: usize,
        /// Condition number of the coefficient matrix
        condition: f64,
    },

    /// NaN or infinite values appeared in an iterate.
    #[error("non-finite values at iteration {iteration}")]
    NonFinite {
        /// Iteration in which the values appeared
        iteration: usize,
    },

    /// Error bubbling up from the dense matrix helpers.
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

impl UwedgeError {
    /// Whether the error comes from malformed input shapes.
    pub fn is_dimension_error(&self) -> bool {
        match self {
            UwedgeError::EmptyInput
            | UwedgeError::NonSquare { .. }
            | UwedgeError::DimensionMismatch { .. }
            | UwedgeError::SeedShape { .. }
            | UwedgeError::ScalingShape { .. } => true,
            UwedgeError::Linalg(e) => matches!(
                e,
                LinalgError::NotSquare { .. } | LinalgError::ShapeMismatch { .. }
            ),
            _ => false,
        }
    }

    /// Whether the error comes from a failed decomposition or solve.
    pub fn is_numerical_error(&self) -> bool {
        match self {
            UwedgeError::Singular { .. } | UwedgeError::NonFinite { .. } => true,
            UwedgeError::Linalg(e) => matches!(
                e,
                LinalgError::Singular { .. } | LinalgError::NonFinite { .. }
            ),
            _ => false,
        }
    }
}
