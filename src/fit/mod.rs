//! Spectrum fitting.
//!
//! Responsibilities:
//!
//! - assemble and solve the non-negative linear system (`solver`)
//! - segment the solved spectrum into peaks (`peaks`)
//! - turn the solver residual into a fit error (`quality`)

pub mod peaks;
pub mod quality;
pub mod solver;

pub use peaks::*;
pub use quality::*;
pub use solver::*;
