#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod error;
pub use error::LinalgError;

/// Elementwise and broadcast helpers with explicit shape checks.
pub mod ops;

/// Congruence transforms, eigendecompositions, condition numbers and checked solves.
pub mod decompose;
