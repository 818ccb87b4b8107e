use thiserror::Error;

/// Errors raised by the dense matrix helpers.
#[derive(Debug, Error, PartialEq)]
pub enum LinalgError {
    /// The operation requires a square matrix.
    #[error("{op} expects a square matrix, got {rows}x{cols}")]
    NotSquare {
        /// Name of the failing operation
        op: &'static str,
        /// Number of rows of the operand
        rows: usize,
        /// Number of columns of the operand
        cols: usize,
    },

    /// The operand shapes are incompatible.
    #[error("{op}: shape mismatch, {left_rows}x{left_cols} vs {right_rows}x{right_cols}")]
    ShapeMismatch {
        /// Name of the failing operation
        op: &'static str,
        /// Rows of the left operand
        left_rows: usize,
        /// Columns of the left operand
        left_cols: usize,
        /// Rows of the right operand
        right_rows: usize,
        /// Columns of the right operand
        right_cols: usize,
    },

    /// The system matrix is singular or too ill-conditioned to be solved.
    #[error("singular system matrix, condition number {condition:e}")]
    Singular {
        /// Estimated condition number of the system matrix
        condition: f64,
    },

    /// A decomposition or solve produced NaN or infinite values.
    #[error("{op} produced non-finite values")]
    NonFinite {
        /// Name of the failing operation
        op: &'static str,
    },
}
