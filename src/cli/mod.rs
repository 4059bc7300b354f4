//! Command-line parsing for the pK spectrum calculator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the numerical code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::AcidSite;
use crate::domain::TitrationMode;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pks", version, about = "pK spectrum calculator for potentiometric titrations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute the pK spectrum of a titration sheet, print peaks, and optionally plot/export.
    Calc(CalcArgs),
    /// Generate a synthetic titration sheet from known acid sites.
    Simulate(SimulateArgs),
    /// Plot a previously exported spectrum JSON.
    Plot(PlotArgs),
}

/// pK grid options shared by commands that solve a spectrum.
#[derive(Debug, Args, Clone)]
pub struct GridArgs {
    /// First pK bin centre.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub pk_start: f64,

    /// Last pK bin centre.
    #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
    pub pk_end: f64,

    /// pK bin width.
    #[arg(long, default_value_t = 0.05)]
    pub d_pk: f64,

    /// Do not fit the additive integration constant.
    #[arg(long)]
    pub no_integration_constant: bool,
}

/// Options for `pks calc`.
#[derive(Debug, Parser, Clone)]
pub struct CalcArgs {
    /// Titration sheet (CSV export of the lab spreadsheet).
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Titration mode; decides whether row 5 is a concentration or a current.
    #[arg(short = 'm', long, value_enum, default_value_t = TitrationMode::Volumetric)]
    pub mode: TitrationMode,

    #[command(flatten)]
    pub grid: GridArgs,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export peaks to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the full spectrum (grid + values + peaks) to JSON.
    #[arg(long = "export-spectrum")]
    pub export_spectrum: Option<PathBuf>,
}

/// Options for `pks simulate`.
#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Output sheet path.
    #[arg(value_name = "CSV")]
    pub output: PathBuf,

    /// Acid site as PK:CONCENTRATION (repeatable), e.g. `--site 4.75:0.01`.
    #[arg(long = "site", required = true)]
    pub sites: Vec<AcidSite>,

    #[arg(short = 'm', long, value_enum, default_value_t = TitrationMode::Volumetric)]
    pub mode: TitrationMode,

    /// Sample volume.
    #[arg(long, default_value_t = 0.02)]
    pub volume: f64,

    /// Titrant concentration (volumetric) or current (coulometric).
    #[arg(long, default_value_t = 0.1)]
    pub titrant: f64,

    /// First pH of the simulated curve.
    #[arg(long, default_value_t = 2.5)]
    pub ph_start: f64,

    /// Last pH of the simulated curve.
    #[arg(long, default_value_t = 11.0)]
    pub ph_end: f64,

    /// Number of pH points.
    #[arg(short = 'n', long, default_value_t = 60)]
    pub points: usize,

    /// Standard deviation of Gaussian pH noise.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Random seed for the noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Options for plotting a saved spectrum.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Spectrum JSON file produced by `pks calc --export-spectrum`.
    #[arg(long, value_name = "JSON")]
    pub spectrum: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}
