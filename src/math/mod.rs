//! Mathematical utilities: protonation kernel, least squares, and NNLS.

pub mod kernel;
pub mod nnls;
pub mod ols;

pub use kernel::*;
pub use nnls::*;
pub use ols::*;
