#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use ajd_linalg as linalg;

#[doc(inline)]
pub use ajd_uwedge as uwedge;
