//! `pk-spectrum` library crate.
//!
//! Converts a potentiometric titration curve into a pK spectrum: a non-negative
//! concentration density over acidity constants, segmented into peaks.
//!
//! The binary (`pks`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the numerical pipeline is reusable from other front-ends

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
