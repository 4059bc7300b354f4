//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - titration inputs (`TitrationMode`, `Titrant`, `TitrationPoint`, `SampleInfo`)
//! - grid configuration (`SpectrumGrid`) and constants (`PhysicalConstants`)
//! - calculation outputs (`Spectrum`, `Peak`, `Calculation`, `SpectrumFile`)

pub mod types;

pub use types::*;
