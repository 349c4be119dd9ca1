//! # Phasekit
//!
//! Rewrites sliced 3D-printer G-code along a height-based parameter schedule:
//! speed, nozzle temperature, extrusion and XY offset vary with the height of
//! the current layer, and a non-extruding heating pass is inserted between
//! layers.
//!
//! ## Architecture
//!
//! Phasekit is organized as a workspace with multiple crates:
//!
//! 1. **phasekit-core** - Parameter schedule, layer model, geometry, errors
//! 2. **phasekit-settings** - Run configuration, parameter file parser, validator
//! 3. **phasekit-gcode** - Line classifier, transforms, heating passes, streaming editor
//! 4. **phasekit** - Run driver and command-line binary

pub mod types;

use std::path::Path;

use anyhow::Context;
use tracing::{debug, info, warn};

pub use phasekit_core::{Error, LayerInfo, ParameterSchedule, Result};
pub use phasekit_gcode::{
    rewrite_file, scan_layer_info, EditorStats, ExtrudeRatioTable, GcodeEditor,
};
pub use phasekit_settings::{
    load_parameters, validate, LogFormat, RunConfig, ValidationReport,
};
pub use types::{RunOutcome, RunSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - RUST_LOG environment variable support (default level `info`)
/// - Pretty multi-line output or one JSON object per event
pub fn init_logging(format: LogFormat) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_line_number(true)
                .pretty();
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .json();
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}

/// Parse and validate a parameter file
///
/// A report without errors is also checked for a usable extrusion ratio
/// table, which is added as an error diagnostic when it cannot be derived.
pub fn check_parameters(path: &Path) -> anyhow::Result<ValidationReport> {
    let raw = load_parameters(path)
        .with_context(|| format!("Failed to read parameters from {}", path.display()))?;
    let mut report = validate(&raw);
    if report.is_correct() {
        let schedule = raw
            .into_schedule()
            .context("Failed to build the parameter schedule")?;
        if let Err(e) = ExtrudeRatioTable::from_schedule(&schedule) {
            report.push_error("extrusion", e.to_string());
        }
    }
    Ok(report)
}

/// Run one rewrite
///
/// Returns [`RunOutcome::Canceled`] when the parameters are rejected by the
/// validator; every other failure is an error and leaves no output behind.
pub fn run(config: &RunConfig) -> anyhow::Result<RunOutcome> {
    config.validate().context("Invalid run configuration")?;
    let output = config.output_path();
    info!("phasekit {} (built {})", VERSION, BUILD_DATE);

    let raw = load_parameters(&config.parameters).with_context(|| {
        format!(
            "Failed to read parameters from {}",
            config.parameters.display()
        )
    })?;
    let report = validate(&raw);
    report.log();
    if !report.is_correct() {
        let reason = report
            .errors()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        warn!("Parameters in {} rejected", config.parameters.display());
        return Ok(RunOutcome::Canceled(reason));
    }

    let schedule = raw
        .into_schedule()
        .context("Failed to build the parameter schedule")?;
    let ratios = ExtrudeRatioTable::from_schedule(&schedule)?;
    debug!("Extrusion ratios per phase: {:?}", ratios.ratios());

    let layer_info = scan_layer_info(&config.input)
        .with_context(|| format!("Failed to scan {}", config.input.display()))?;

    let editor = GcodeEditor::new(&schedule, &ratios, layer_info);
    let stats = rewrite_file(&config.input, &output, editor).with_context(|| {
        format!(
            "Failed to rewrite {} into {}",
            config.input.display(),
            output.display()
        )
    })?;

    Ok(RunOutcome::Completed(RunSummary::new(stats, output)))
}
