//! Parameter file parsing
//!
//! The parameter file is plain text. A free-form preamble is followed by six
//! sections separated by rule lines made only of dashes (the template uses 66):
//!
//! 1. phase boundaries (`Phase <N> (%) : <value>`)
//! 2. temperature per phase (`Phase <N> (°C) : <value>`)
//! 3. speed multiplier per phase (`Phase <N> (%) : <value>`)
//! 4. extrusion correction (`Correction (%) : <value>`)
//! 5. position shift (`Shift_x (mm) : <value>`, `Shift_y (mm) : <value>`)
//! 6. heating flag (`Heating : <0|1>`)
//!
//! Lines starting with `#` are comments. Parsing only checks that every value
//! is a number; structural checks belong to [`crate::validation`].

use phasekit_core::{ParameterSchedule, Shift};
use regex::Regex;
use serde::Serialize;
use std::path::Path;

use crate::error::{ParameterError, SettingsResult};

/// Names of the sections, in file order
pub const SECTION_NAMES: [&str; 6] = [
    "phase",
    "temperature",
    "speed",
    "extrusion",
    "shift",
    "heating",
];

fn phase_key_regex() -> &'static Regex {
    static PHASE_KEY: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    PHASE_KEY.get_or_init(|| Regex::new(r"^Phase\b\s*(\d+)?").expect("invalid regex pattern"))
}

fn is_rule_line(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

/// Entries of one section of the parameter file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterSection {
    /// `(phase number, value)` pairs in file order
    pub phases: Vec<(u32, f64)>,
    /// `(key, value)` scalars in file order
    pub scalars: Vec<(String, f64)>,
}

impl ParameterSection {
    /// Values of the phase entries in file order
    pub fn phase_values(&self) -> Vec<f64> {
        self.phases.iter().map(|(_, v)| *v).collect()
    }

    /// Find a scalar whose key starts with `prefix`, ignoring case
    pub fn scalar(&self, prefix: &str) -> Option<f64> {
        let prefix = prefix.to_ascii_lowercase();
        self.scalars
            .iter()
            .find(|(key, _)| key.to_ascii_lowercase().starts_with(&prefix))
            .map(|(_, v)| *v)
    }

    /// True when the section declares nothing
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty() && self.scalars.is_empty()
    }
}

/// Parameter file content, one named field per section
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawParameters {
    pub phases: ParameterSection,
    pub temperature: ParameterSection,
    pub speed: ParameterSection,
    pub extrusion: ParameterSection,
    pub shift: ParameterSection,
    pub heating: ParameterSection,
}

impl RawParameters {
    /// Number of phases declared in the boundary section
    pub fn phase_count(&self) -> usize {
        self.phases.phases.len()
    }

    /// Build the schedule from parameters that passed validation
    ///
    /// Invariants are checked again by [`ParameterSchedule::new`].
    pub fn into_schedule(self) -> SettingsResult<ParameterSchedule> {
        let extrude_correction = self.extrusion.scalars.first().map(|(_, v)| *v).ok_or(
            ParameterError::MissingKey {
                section: "extrusion".to_string(),
                key: "Correction".to_string(),
            },
        )?;
        let shift_x = self
            .shift
            .scalar("shift_x")
            .ok_or_else(|| missing_key("shift", "Shift_x"))?;
        let shift_y = self
            .shift
            .scalar("shift_y")
            .ok_or_else(|| missing_key("shift", "Shift_y"))?;
        let heating = self
            .heating
            .scalars
            .first()
            .map(|(_, v)| *v)
            .ok_or_else(|| missing_key("heating", "Heating"))?;

        let schedule = ParameterSchedule::new(
            self.phases.phase_values(),
            self.temperature.phase_values(),
            self.speed.phase_values(),
            extrude_correction,
            Shift::new(shift_x, shift_y),
            heating.trunc() != 0.0,
        )?;
        Ok(schedule)
    }
}

fn missing_key(section: &str, key: &str) -> ParameterError {
    ParameterError::MissingKey {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn parse_value(line_number: usize, key: &str, value: &str) -> Result<f64, ParameterError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParameterError::MalformedValue {
            line_number,
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn parse_line(
    line_number: usize,
    line: &str,
    section: &mut ParameterSection,
) -> Result<(), ParameterError> {
    let Some((key, value)) = line.split_once(':') else {
        return Err(ParameterError::MalformedLine {
            line_number,
            line: line.to_string(),
        });
    };
    let key = key.trim();
    let value = parse_value(line_number, key, value.trim())?;

    if let Some(caps) = phase_key_regex().captures(key) {
        let index = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .ok_or_else(|| ParameterError::MalformedPhaseIndex {
                line_number,
                key: key.to_string(),
            })?;
        section.phases.push((index, value));
    } else {
        section.scalars.push((key.to_string(), value));
    }
    Ok(())
}

/// Parse the content of a parameter file
pub fn parse_parameters(text: &str) -> Result<RawParameters, ParameterError> {
    let mut sections: Vec<ParameterSection> = Vec::with_capacity(SECTION_NAMES.len());
    let mut current: Option<ParameterSection> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim();

        if is_rule_line(line) {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = Some(ParameterSection::default());
            continue;
        }

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Anything before the first rule is preamble
        let Some(section) = current.as_mut() else {
            continue;
        };
        parse_line(line_number, line, section)?;
    }

    if let Some(section) = current.take() {
        sections.push(section);
    }

    // A closing rule after the last section leaves an empty trailing section
    if sections.len() > SECTION_NAMES.len() && sections.last().is_some_and(|s| s.is_empty()) {
        sections.pop();
    }

    let found = sections.len();
    if found > SECTION_NAMES.len() {
        return Err(ParameterError::TooManySections { found });
    }
    if found < SECTION_NAMES.len() {
        return Err(ParameterError::MissingSection {
            name: SECTION_NAMES[found].to_string(),
            found,
        });
    }

    let mut iter = sections.into_iter();
    let mut next = || iter.next().unwrap_or_default();
    Ok(RawParameters {
        phases: next(),
        temperature: next(),
        speed: next(),
        extrusion: next(),
        shift: next(),
        heating: next(),
    })
}

/// Read and parse a parameter file
pub fn load_parameters(path: &Path) -> SettingsResult<RawParameters> {
    let content = std::fs::read_to_string(path)?;
    let raw = parse_parameters(&content)?;
    tracing::debug!(
        "Parsed {} phases from {}",
        raw.phase_count(),
        path.display()
    );
    Ok(raw)
}
