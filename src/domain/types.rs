//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during the spectrum calculation
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::SpectrumError;

/// How the titrant is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TitrationMode {
    /// Alkaline titrant added by volume; abscissa is titrant volume.
    Volumetric,
    /// Base generated electrochemically at constant current; abscissa is elapsed time.
    Coulometric,
}

impl TitrationMode {
    pub fn display_name(self) -> &'static str {
        match self {
            TitrationMode::Volumetric => "volumetric",
            TitrationMode::Coulometric => "coulometric",
        }
    }

    /// Label for the abscissa column in reports.
    pub fn abscissa_label(self) -> &'static str {
        match self {
            TitrationMode::Volumetric => "volume",
            TitrationMode::Coulometric => "time",
        }
    }
}

/// Mode together with its mode-specific constant.
///
/// Each variant selects both the charge-balance formula and the metadata field
/// it needs, so no code has to check the mode and then look up a constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Titrant {
    /// Alkaline titrant concentration (mol/L).
    Volumetric { concentration: f64 },
    /// Applied current (A).
    Coulometric { current: f64 },
}

impl Titrant {
    pub fn mode(&self) -> TitrationMode {
        match self {
            Titrant::Volumetric { .. } => TitrationMode::Volumetric,
            Titrant::Coulometric { .. } => TitrationMode::Coulometric,
        }
    }

    /// The concentration or current, whichever applies.
    pub fn constant(&self) -> f64 {
        match *self {
            Titrant::Volumetric { concentration } => concentration,
            Titrant::Coulometric { current } => current,
        }
    }

    /// Build the variant for `mode` carrying `constant`.
    pub fn for_mode(mode: TitrationMode, constant: f64) -> Self {
        match mode {
            TitrationMode::Volumetric => Titrant::Volumetric {
                concentration: constant,
            },
            TitrationMode::Coulometric => Titrant::Coulometric { current: constant },
        }
    }
}

/// Process-wide physical and numerical constants.
///
/// Injected into the dataset constructors and the solver rather than read from globals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// Ion product of water.
    pub kw: f64,
    /// Faraday constant (C/mol).
    pub faraday: f64,
    /// Values at or below this are treated as zero by border suppression.
    pub tolerance: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            kw: 1e-14,
            faraday: 96485.0,
            tolerance: 1e-6,
        }
    }
}

/// One titration reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TitrationPoint {
    /// Titrant volume (volumetric) or elapsed time (coulometric).
    pub abscissa: f64,
    pub ph: f64,
}

impl TitrationPoint {
    pub fn new(abscissa: f64, ph: f64) -> Self {
        Self { abscissa, ph }
    }
}

/// Sample timestamp as found in the sheet.
///
/// Sheets written by hand often carry free-form dates; those are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleTimestamp {
    Parsed(NaiveDateTime),
    Raw(String),
}

impl std::fmt::Display for SampleTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleTimestamp::Parsed(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
            SampleTimestamp::Raw(s) => write!(f, "{s}"),
        }
    }
}

/// Sample metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleInfo {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub timestamp: Option<SampleTimestamp>,
    /// Sample volume, same unit as titrant volume.
    pub volume: f64,
    pub titrant: Titrant,
}

impl SampleInfo {
    /// Metadata with only the fields the calculation needs.
    pub fn new(volume: f64, titrant: Titrant) -> Self {
        Self {
            name: None,
            comment: None,
            timestamp: None,
            volume,
            titrant,
        }
    }
}

/// A titration sheet as delivered by the loader: metadata + raw rows (unsorted).
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSheet {
    pub info: SampleInfo,
    pub rows: Vec<TitrationPoint>,
}

/// Upper bound on the number of pK bins a grid may have.
///
/// The design matrix is dense (`points x bins`), so finer grids are rejected
/// up front instead of failing at allocation.
pub const MAX_PK_BINS: usize = 100_000;

/// pK grid configuration.
///
/// Bins are centred at `pk_start + d_pk * j` for `j in 0..pk_step()`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumGrid {
    pub pk_start: f64,
    pub pk_end: f64,
    pub d_pk: f64,
    /// Fit an additive signed offset alongside the spectrum.
    pub use_integration_constant: bool,
}

impl Default for SpectrumGrid {
    fn default() -> Self {
        Self {
            pk_start: 0.0,
            pk_end: 10.0,
            d_pk: 0.05,
            use_integration_constant: true,
        }
    }
}

impl SpectrumGrid {
    /// Build a validated grid.
    pub fn new(
        pk_start: f64,
        pk_end: f64,
        d_pk: f64,
        use_integration_constant: bool,
    ) -> Result<Self, SpectrumError> {
        let grid = Self {
            pk_start,
            pk_end,
            d_pk,
            use_integration_constant,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Reject degenerate grids.
    ///
    /// Grids can also arrive through deserialization, so the solver calls this
    /// again before assembling anything.
    pub fn validate(&self) -> Result<(), SpectrumError> {
        if !(self.pk_start.is_finite() && self.pk_end.is_finite() && self.d_pk.is_finite()) {
            return Err(SpectrumError::InvalidGrid(format!(
                "pk_start={}, pk_end={}, d_pk={} must all be finite",
                self.pk_start, self.pk_end, self.d_pk
            )));
        }
        if self.pk_start >= self.pk_end {
            return Err(SpectrumError::InvalidGrid(format!(
                "pk_start ({}) must be < pk_end ({})",
                self.pk_start, self.pk_end
            )));
        }
        if self.d_pk <= 0.0 {
            return Err(SpectrumError::InvalidGrid(format!(
                "d_pk ({}) must be > 0",
                self.d_pk
            )));
        }
        let span = self.span();
        if !(span.is_finite() && span < MAX_PK_BINS as f64) {
            return Err(SpectrumError::InvalidGrid(format!(
                "d_pk ({}) gives more than {MAX_PK_BINS} bins in [{}, {}]",
                self.d_pk, self.pk_start, self.pk_end
            )));
        }
        let pk_step = self.pk_step();
        if pk_step < 2 {
            return Err(SpectrumError::InvalidGrid(format!(
                "d_pk ({}) leaves only {pk_step} bin(s) in [{}, {}]",
                self.d_pk, self.pk_start, self.pk_end
            )));
        }
        Ok(())
    }

    /// Number of pK bins: `round((pk_end - pk_start) / d_pk) + 1`.
    ///
    /// Returns 0 for grids `validate` would reject on size or sign.
    pub fn pk_step(&self) -> usize {
        let span = self.span();
        if span.is_finite() && span >= 0.0 && span < MAX_PK_BINS as f64 {
            span as usize + 1
        } else {
            0
        }
    }

    /// `round((pk_end - pk_start) / d_pk)`, kept in f64 until bounded.
    fn span(&self) -> f64 {
        ((self.pk_end - self.pk_start) / self.d_pk).round()
    }

    /// Centre of bin `j`.
    pub fn pk_center(&self, j: usize) -> f64 {
        self.pk_start + self.d_pk * j as f64
    }

    /// All bin centres, ascending.
    pub fn centers(&self) -> Vec<f64> {
        (0..self.pk_step()).map(|j| self.pk_center(j)).collect()
    }
}

/// Solved pK spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// Concentration per pK bin; non-negative, length `pk_step`.
    pub values: Vec<f64>,
    /// Residual norm `||A x - alpha||` of the constrained solve.
    pub residual: f64,
    /// Fitted additive offset when the integration constant is enabled.
    pub offset: Option<f64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// A contiguous run of significant spectrum bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Index of the first bin of the run.
    pub first_point: usize,
    /// Run length (>= 1).
    pub point_count: usize,
    /// Sum of the spectrum over the run.
    pub concentration: f64,
    /// Weighted mean pK of the run.
    pub mean: f64,
    /// 95% confidence half-width on `mean`.
    pub interval: f64,
}

/// Outcome of a spectrum calculation.
#[derive(Debug, Clone, PartialEq)]
pub enum Calculation {
    /// Too few sign-valid titration points for a reliable regression.
    Insufficient { valid_points: usize },
    Solved {
        spectrum: Spectrum,
        peaks: Vec<Peak>,
        error: f64,
    },
}

impl Calculation {
    /// Peaks, or `None` when the data were insufficient.
    pub fn peaks(&self) -> Option<&[Peak]> {
        match self {
            Calculation::Insufficient { .. } => None,
            Calculation::Solved { peaks, .. } => Some(peaks),
        }
    }

    /// Fit error, `NaN` when the data were insufficient.
    pub fn error(&self) -> f64 {
        match self {
            Calculation::Insufficient { .. } => f64::NAN,
            Calculation::Solved { error, .. } => *error,
        }
    }

    pub fn spectrum(&self) -> Option<&Spectrum> {
        match self {
            Calculation::Insufficient { .. } => None,
            Calculation::Solved { spectrum, .. } => Some(spectrum),
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct CalcConfig {
    pub input: PathBuf,
    pub mode: TitrationMode,
    pub grid: SpectrumGrid,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_peaks: Option<PathBuf>,
    pub export_spectrum: Option<PathBuf>,
}

/// A saved spectrum file (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumFile {
    pub tool: String,
    pub sample: SampleInfo,
    pub valid_points: usize,
    pub grid: SpectrumGrid,
    pub pk: Vec<f64>,
    pub concentration: Vec<f64>,
    pub residual: f64,
    pub offset: Option<f64>,
    pub error: f64,
    pub peaks: Vec<Peak>,
}
