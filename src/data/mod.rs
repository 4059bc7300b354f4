//! Titration data: the validated dataset and a synthetic curve generator.

pub mod dataset;
pub mod synthetic;

pub use dataset::*;
pub use synthetic::*;
