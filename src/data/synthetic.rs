//! Synthetic titration curves from known acid sites.
//!
//! For each pH on a uniform grid the total deprotonated charge of the sites is
//!
//! `Σ c_k / (1 + 10^(pK_k - pH))`
//!
//! and the charge balance is inverted for the titrant volume (or elapsed time)
//! that produces it. Points that would need a negative abscissa (pH below the
//! sample's own starting pH) are skipped. Optional Gaussian noise is added to
//! the recorded pH from a seeded RNG, so a given seed always yields the same sheet.

use std::str::FromStr;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{PhysicalConstants, SampleInfo, SampleSheet, Titrant, TitrationPoint};
use crate::error::SpectrumError;
use crate::math::deprotonated_fraction;

/// A single acidic group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcidSite {
    pub pk: f64,
    /// Concentration in the sample (mol/L).
    pub concentration: f64,
}

impl FromStr for AcidSite {
    type Err = String;

    /// Parse `PK:CONCENTRATION`, e.g. `4.75:0.01`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (pk, conc) = s
            .split_once(':')
            .ok_or_else(|| format!("expected PK:CONCENTRATION, got '{s}'"))?;
        let pk: f64 = pk
            .trim()
            .parse()
            .map_err(|e| format!("invalid pK '{pk}': {e}"))?;
        let concentration: f64 = conc
            .trim()
            .parse()
            .map_err(|e| format!("invalid concentration '{conc}': {e}"))?;
        if !(pk.is_finite() && concentration.is_finite() && concentration > 0.0) {
            return Err(format!("site '{s}' needs a finite pK and a concentration > 0"));
        }
        Ok(Self { pk, concentration })
    }
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub sites: Vec<AcidSite>,
    pub titrant: Titrant,
    pub sample_volume: f64,
    pub ph_start: f64,
    pub ph_end: f64,
    /// Number of pH grid points before skipping unreachable ones.
    pub points: usize,
    /// Standard deviation of the pH noise (0 disables noise).
    pub noise_sd: f64,
    pub seed: u64,
}

/// Generate a titration sheet.
pub fn simulate(config: &SimulationConfig, constants: &PhysicalConstants) -> Result<SampleSheet, SpectrumError> {
    if config.sites.is_empty() {
        return Err(SpectrumError::InvalidSimulation("at least one acid site is required".into()));
    }
    if config.points < 2 {
        return Err(SpectrumError::InvalidSimulation("simulation needs at least 2 pH points".into()));
    }
    if !(config.ph_start.is_finite() && config.ph_end.is_finite() && config.ph_end > config.ph_start) {
        return Err(SpectrumError::InvalidSimulation(format!(
            "invalid pH range [{}, {}]",
            config.ph_start, config.ph_end
        )));
    }
    if !(config.noise_sd.is_finite() && config.noise_sd >= 0.0) {
        return Err(SpectrumError::InvalidSimulation("noise must be finite and >= 0".into()));
    }
    let volume = config.sample_volume;
    let constant = config.titrant.constant();
    if !(volume.is_finite() && volume > 0.0 && constant.is_finite() && constant > 0.0) {
        return Err(SpectrumError::InvalidSample(
            "sample volume and titrant constant must be finite and > 0".into(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| SpectrumError::InvalidSimulation(format!("noise distribution error: {e}")))?;

    let step = (config.ph_end - config.ph_start) / (config.points as f64 - 1.0);
    let mut rows = Vec::with_capacity(config.points);

    for i in 0..config.points {
        let ph = config.ph_start + step * i as f64;
        let h = 10f64.powf(-ph);
        let excess = h - constants.kw / h;
        let charge: f64 = config
            .sites
            .iter()
            .map(|s| s.concentration * deprotonated_fraction(s.pk, ph))
            .sum();

        let abscissa = match config.titrant {
            Titrant::Volumetric { concentration } => {
                let denom = excess + concentration;
                if denom <= 0.0 {
                    continue;
                }
                volume * (charge - excess) / denom
            }
            Titrant::Coulometric { current } => (charge - excess) * constants.faraday * volume / current,
        };
        if !(abscissa.is_finite() && abscissa >= 0.0) {
            continue;
        }

        let noise = if config.noise_sd > 0.0 {
            config.noise_sd * normal.sample(&mut rng)
        } else {
            0.0
        };
        rows.push(TitrationPoint::new(abscissa, ph + noise));
    }

    let sites: Vec<String> = config
        .sites
        .iter()
        .map(|s| format!("{}:{}", s.pk, s.concentration))
        .collect();

    let mut info = SampleInfo::new(volume, config.titrant);
    info.name = Some("synthetic".to_string());
    info.comment = Some(format!("sites {} seed {}", sites.join(" "), config.seed));

    Ok(SampleSheet { info, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::charge_balance;

    fn config(titrant: Titrant) -> SimulationConfig {
        SimulationConfig {
            sites: vec![AcidSite {
                pk: 4.0,
                concentration: 0.01,
            }],
            titrant,
            sample_volume: 0.02,
            ph_start: 2.5,
            ph_end: 11.0,
            points: 40,
            noise_sd: 0.0,
            seed: 7,
        }
    }

    #[test]
    fn parses_sites() {
        let site: AcidSite = "4.75:0.01".parse().unwrap();
        assert_eq!(site.pk, 4.75);
        assert_eq!(site.concentration, 0.01);
        assert!("4.75".parse::<AcidSite>().is_err());
        assert!("4.75:-1".parse::<AcidSite>().is_err());
    }

    #[test]
    fn noiseless_points_reproduce_site_charge() {
        let constants = PhysicalConstants::default();
        for titrant in [
            Titrant::Volumetric { concentration: 0.1 },
            Titrant::Coulometric { current: 0.01 },
        ] {
            let cfg = config(titrant);
            let sheet = simulate(&cfg, &constants).unwrap();
            assert!(sheet.rows.len() > 20);
            for p in &sheet.rows {
                let alpha = charge_balance(&titrant, cfg.sample_volume, p, &constants);
                let want = 0.01 * deprotonated_fraction(4.0, p.ph);
                assert!((alpha - want).abs() < 1e-12, "alpha={alpha} want={want}");
            }
        }
    }

    #[test]
    fn abscissa_is_non_negative_and_increasing() {
        let sheet = simulate(&config(Titrant::Volumetric { concentration: 0.1 }), &PhysicalConstants::default())
            .unwrap();
        for w in sheet.rows.windows(2) {
            assert!(w[0].abscissa >= 0.0);
            assert!(w[1].abscissa > w[0].abscissa);
        }
    }

    #[test]
    fn same_seed_same_noise() {
        let mut cfg = config(Titrant::Volumetric { concentration: 0.1 });
        cfg.noise_sd = 0.01;
        let a = simulate(&cfg, &PhysicalConstants::default()).unwrap();
        let b = simulate(&cfg, &PhysicalConstants::default()).unwrap();
        assert_eq!(a.rows, b.rows);
    }

    #[test]
    fn rejects_bad_config() {
        let mut cfg = config(Titrant::Volumetric { concentration: 0.1 });
        cfg.sites.clear();
        assert!(matches!(
            simulate(&cfg, &PhysicalConstants::default()),
            Err(SpectrumError::InvalidSimulation(_))
        ));

        let mut cfg = config(Titrant::Volumetric { concentration: 0.1 });
        cfg.points = 1;
        assert!(matches!(
            simulate(&cfg, &PhysicalConstants::default()),
            Err(SpectrumError::InvalidSimulation(_))
        ));

        let mut cfg = config(Titrant::Volumetric { concentration: 0.1 });
        cfg.ph_end = cfg.ph_start;
        assert!(matches!(
            simulate(&cfg, &PhysicalConstants::default()),
            Err(SpectrumError::InvalidSimulation(_))
        ));
    }

    #[test]
    fn bad_sample_metadata_is_a_sample_error() {
        let mut cfg = config(Titrant::Coulometric { current: 0.01 });
        cfg.sample_volume = 0.0;
        assert!(matches!(
            simulate(&cfg, &PhysicalConstants::default()),
            Err(SpectrumError::InvalidSample(_))
        ));
    }
}
