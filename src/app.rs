//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the titration sheet
//! - runs the spectrum calculation
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{CalcArgs, Command, PlotArgs, SimulateArgs};
use crate::data::{SimulationConfig, simulate};
use crate::domain::{CalcConfig, Calculation, PhysicalConstants, SpectrumGrid, Titrant};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `pks` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Calc(args) => handle_calc(args),
        Command::Simulate(args) => handle_simulate(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_calc(args: CalcArgs) -> Result<(), AppError> {
    let config = calc_config_from_args(&args)?;
    let run = pipeline::run_calc(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.ingest, &run.dataset, &config.grid, &run.calculation)
    );

    let Calculation::Solved {
        spectrum,
        peaks,
        error,
    } = &run.calculation
    else {
        return Err(AppError::new(
            3,
            format!(
                "Only {} usable titration points; at least {} are required.",
                run.dataset.valid_points(),
                crate::fit::MIN_VALID_POINTS
            ),
        ));
    };

    println!("{}", crate::report::format_peaks(peaks, &config.grid));

    if config.plot {
        let plot = crate::plot::render_spectrum(
            &config.grid.centers(),
            &spectrum.values,
            peaks,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_peaks {
        crate::io::export::write_peaks_csv(path, peaks)?;
    }
    if let Some(path) = &config.export_spectrum {
        let file = crate::io::spectrum::build_spectrum_file(&run.dataset, &config.grid, spectrum, peaks, *error);
        crate::io::spectrum::write_spectrum_json(path, &file)?;
    }

    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let config = SimulationConfig {
        sites: args.sites.clone(),
        titrant: Titrant::for_mode(args.mode, args.titrant),
        sample_volume: args.volume,
        ph_start: args.ph_start,
        ph_end: args.ph_end,
        points: args.points,
        noise_sd: args.noise,
        seed: args.seed,
    };
    let sheet = simulate(&config, &PhysicalConstants::default())?;
    crate::io::export::write_titration_sheet(&args.output, &sheet)?;

    println!(
        "Wrote {} {} rows to {}",
        sheet.rows.len(),
        args.mode.display_name(),
        args.output.display()
    );
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::spectrum::read_spectrum_json(&args.spectrum)?;
    let plot = crate::plot::render_spectrum_file(&file, args.width, args.height);

    println!("{plot}");
    println!("{}", crate::report::format_peaks(&file.peaks, &file.grid));
    Ok(())
}

pub fn calc_config_from_args(args: &CalcArgs) -> Result<CalcConfig, AppError> {
    let grid = SpectrumGrid::new(
        args.grid.pk_start,
        args.grid.pk_end,
        args.grid.d_pk,
        !args.grid.no_integration_constant,
    )?;

    Ok(CalcConfig {
        input: args.input.clone(),
        mode: args.mode,
        grid,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_peaks: args.export.clone(),
        export_spectrum: args.export_spectrum.clone(),
    })
}
