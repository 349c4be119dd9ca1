//! Parameter validation
//!
//! Checks parsed parameters for nonsensical values before a schedule is
//! built. Every check adds [`Diagnostic`]s to a [`ValidationReport`]; the
//! parameters are correct when no diagnostic has [`Severity::Error`].

use serde::Serialize;
use std::fmt;

use crate::parameters::{ParameterSection, RawParameters};

/// Lowest physically possible temperature (°C)
const ABSOLUTE_ZERO: f64 = -273.15;

/// Usual nozzle temperature range for PLA-like filaments (°C)
const TYPICAL_TEMPERATURE_RANGE: (f64, f64) = (180.0, 220.0);

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Parameters cannot be used
    Error,
    /// Parameters are usable but look suspicious
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "Error"),
            Self::Warning => write!(f, "Warning"),
        }
    }
}

/// One validation finding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Section the finding belongs to
    pub section: &'static str,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.section, self.message)
    }
}

/// Verdict plus diagnostics for a set of parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    fn error(&mut self, section: &'static str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            section,
            message: message.into(),
        });
    }

    fn warning(&mut self, section: &'static str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            section,
            message: message.into(),
        });
    }

    /// Add an error found outside the parameter checks
    pub fn push_error(&mut self, section: &'static str, message: impl Into<String>) {
        self.error(section, message);
    }

    /// True when no error was found
    pub fn is_correct(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Emit every diagnostic through `tracing`
    pub fn log(&self) {
        for d in &self.diagnostics {
            match d.severity {
                Severity::Error => tracing::error!("[{}] {}", d.section, d.message),
                Severity::Warning => tracing::warn!("[{}] {}", d.section, d.message),
            }
        }
    }
}

/// Validate parsed parameters
pub fn validate(raw: &RawParameters) -> ValidationReport {
    let mut report = ValidationReport::default();
    let phase_count = raw.phase_count();

    check_phases(&raw.phases, &mut report);
    check_temperature(&raw.temperature, phase_count, &mut report);
    check_speed(&raw.speed, phase_count, &mut report);
    check_extrusion(&raw.extrusion, &mut report);
    check_shift(&raw.shift, &mut report);
    check_heating(&raw.heating, &mut report);

    report
}

/// Phase numbers must be 0, 1, 2, ... in order
fn check_index(
    section_name: &'static str,
    section: &ParameterSection,
    report: &mut ValidationReport,
) -> bool {
    for (expected, (index, _)) in section.phases.iter().enumerate() {
        if *index as usize != expected {
            report.error(
                section_name,
                format!("Wrong index. You have used {index} instead of {expected}"),
            );
            return false;
        }
    }
    true
}

fn check_phases(section: &ParameterSection, report: &mut ValidationReport) {
    const NAME: &str = "phase";

    if !section.scalars.is_empty() {
        report.warning(NAME, "Lines that are not 'Phase <N>' entries are ignored");
    }
    if section.phases.len() < 2 {
        report.error(
            NAME,
            "At least two phases are required (one at 0 % and one at 100 %)",
        );
        return;
    }
    if !check_index(NAME, section, report) {
        return;
    }

    let values = section.phase_values();
    if values[0] != 0.0 {
        report.error(NAME, "The first phase must be set to 0 %");
    } else if values[values.len() - 1] != 100.0 {
        report.error(NAME, "The last phase must be set to 100 %");
    } else if let Some(i) = (1..values.len()).find(|&i| values[i] <= values[i - 1]) {
        report.error(
            NAME,
            format!(
                "Phase {i} ({} %) should have a greater percentage value than its predecessor ({} %)",
                values[i],
                values[i - 1]
            ),
        );
    }
}

fn check_phase_count(
    section_name: &'static str,
    section: &ParameterSection,
    phase_count: usize,
    report: &mut ValidationReport,
) -> bool {
    let count = section.phases.len();
    if count < phase_count {
        report.error(
            section_name,
            format!("Some phases are not described in {section_name}."),
        );
        false
    } else if count > phase_count {
        report.error(
            section_name,
            format!("There are more phases described in {section_name} than existing phases."),
        );
        false
    } else {
        check_index(section_name, section, report)
    }
}

fn check_temperature(section: &ParameterSection, phase_count: usize, report: &mut ValidationReport) {
    const NAME: &str = "temperature";

    if !check_phase_count(NAME, section, phase_count, report) {
        return;
    }
    let (low, high) = TYPICAL_TEMPERATURE_RANGE;
    for (index, value) in &section.phases {
        if *value < ABSOLUTE_ZERO {
            report.error(
                NAME,
                format!("Impossible value for degree Celsius: {value} (phase {index})"),
            );
        } else if *value < low {
            report.warning(NAME, format!("Your temperature {value} °C seems to be low"));
        } else if *value > high {
            report.warning(
                NAME,
                format!("Your nozzle temperature {value} °C seems to be high"),
            );
        }
    }
}

fn check_speed(section: &ParameterSection, phase_count: usize, report: &mut ValidationReport) {
    const NAME: &str = "speed";

    if !check_phase_count(NAME, section, phase_count, report) {
        return;
    }
    for (index, value) in &section.phases {
        if *value < 0.0 {
            report.error(NAME, format!("Impossible negative speed {value} (phase {index})"));
        }
    }
}

fn check_extrusion(section: &ParameterSection, report: &mut ValidationReport) {
    const NAME: &str = "extrusion";

    match section.scalars.len() {
        0 => report.error(NAME, "No parameter set for the extrusion correction."),
        1 => {}
        _ => report.error(
            NAME,
            "Incorrect parameters for extrusion. Only one line required. Use the following scheme:\nCorrection (%) : 0",
        ),
    }
}

fn check_shift(section: &ParameterSection, report: &mut ValidationReport) {
    const NAME: &str = "shift";
    const SCHEME: &str = "Use the following scheme:\nShift_x (mm) : 0\nShift_y (mm) : 0";

    match section.scalars.len() {
        0 => report.error(NAME, "No parameter set for shifting position."),
        2 => {
            if section.scalar("shift_x").is_none() || section.scalar("shift_y").is_none() {
                report.error(
                    NAME,
                    format!("Shift_x and Shift_y must both be set. {SCHEME}"),
                );
            }
        }
        _ => report.error(
            NAME,
            format!("Incorrect parameters for shifting position. {SCHEME}"),
        ),
    }
}

fn check_heating(section: &ParameterSection, report: &mut ValidationReport) {
    const NAME: &str = "heating";

    match section.scalars.as_slice() {
        [] => report.error(NAME, "No parameter set for the heating phase."),
        [(_, value)] => {
            if value.fract() != 0.0 {
                report.warning(
                    NAME,
                    format!(
                        "You entered a float value for the heating parameter. It is truncated to {}",
                        value.trunc()
                    ),
                );
            }
            if !(0.0..=1.0).contains(value) {
                report.warning(
                    NAME,
                    "Any non-zero integer activates the heating phase. However, we recommend using 1 for an easier understanding",
                );
            }
        }
        _ => report.error(
            NAME,
            "Several parameters input for the heating phase. Keep only one",
        ),
    }
}
