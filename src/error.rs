//! Error types.
//!
//! - `SpectrumError`: failures of the numerical core (bad grid, bad sample metadata,
//!   bad simulation settings).
//! - `AppError`: what the binary reports; carries the process exit code.
//!
//! Too few usable titration points is *not* an error: it is the
//! `Calculation::Insufficient` outcome.

use thiserror::Error;

/// Errors raised by the numerical core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpectrumError {
    #[error("Invalid pK grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    #[error("Invalid simulation settings: {0}")]
    InvalidSimulation(String),

    #[error("Fit error needs at least 2 pK bins, got {pk_step}.")]
    DegreesOfFreedom { pk_step: usize },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<SpectrumError> for AppError {
    fn from(err: SpectrumError) -> Self {
        let exit_code = match err {
            SpectrumError::InvalidGrid(_)
            | SpectrumError::InvalidSample(_)
            | SpectrumError::InvalidSimulation(_) => 2,
            SpectrumError::DegreesOfFreedom { .. } => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}
