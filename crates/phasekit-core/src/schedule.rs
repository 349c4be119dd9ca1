//! Height-based parameter schedule
//!
//! A schedule splits the printed height (0 % to 100 %) into phases. Each
//! phase boundary carries a target nozzle temperature and a speed multiplier;
//! values between two boundaries are interpolated by the G-code editor.
//! Global scalars (extrusion correction, XY shift, heating flag) apply to the
//! whole print.

use serde::Serialize;

use crate::error::ScheduleError;

/// Constant XY offset added to every motion line
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Shift {
    /// Offset added to X words (mm)
    pub x: f64,
    /// Offset added to Y words (mm)
    pub y: f64,
}

impl Shift {
    /// Create a new shift
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// View of one phase of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Phase {
    /// Phase index (0-based)
    pub index: usize,
    /// Height percentage where the phase boundary sits
    pub boundary: f64,
    /// Nozzle temperature at the boundary (°C)
    pub temperature: f64,
    /// Speed multiplier at the boundary (%)
    pub speed: f64,
}

/// Validated, immutable parameter schedule
///
/// Invariants (checked by [`ParameterSchedule::new`]):
/// - at least 2 phases
/// - boundaries strictly increasing, first is 0, last is 100
/// - exactly one temperature and one speed per phase
/// - every value is finite
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSchedule {
    boundaries: Vec<f64>,
    temperatures: Vec<f64>,
    speeds: Vec<f64>,
    extrude_correction: f64,
    shift: Shift,
    heating_enabled: bool,
}

impl ParameterSchedule {
    /// Build a schedule, checking every invariant
    pub fn new(
        boundaries: Vec<f64>,
        temperatures: Vec<f64>,
        speeds: Vec<f64>,
        extrude_correction: f64,
        shift: Shift,
        heating_enabled: bool,
    ) -> Result<Self, ScheduleError> {
        let count = boundaries.len();
        if count < 2 {
            return Err(ScheduleError::TooFewPhases { count });
        }

        for (quantity, values) in [
            ("boundary", &boundaries),
            ("temperature", &temperatures),
            ("speed", &speeds),
        ] {
            if values.len() != count {
                return Err(ScheduleError::LengthMismatch {
                    quantity: quantity.to_string(),
                    expected: count,
                    actual: values.len(),
                });
            }
            if let Some(index) = values.iter().position(|v| !v.is_finite()) {
                return Err(ScheduleError::NonFinite {
                    quantity: quantity.to_string(),
                    index,
                });
            }
        }

        if boundaries[0] != 0.0 {
            return Err(ScheduleError::FirstBoundary {
                value: boundaries[0],
            });
        }
        if boundaries[count - 1] != 100.0 {
            return Err(ScheduleError::LastBoundary {
                value: boundaries[count - 1],
            });
        }
        for index in 1..count {
            if boundaries[index] <= boundaries[index - 1] {
                return Err(ScheduleError::NonIncreasingBoundary {
                    index,
                    previous: boundaries[index - 1],
                    value: boundaries[index],
                });
            }
        }

        Ok(Self {
            boundaries,
            temperatures,
            speeds,
            extrude_correction,
            shift,
            heating_enabled,
        })
    }

    /// Number of phases
    pub fn phase_count(&self) -> usize {
        self.boundaries.len()
    }

    /// Get a phase by index
    pub fn phase(&self, index: usize) -> Option<Phase> {
        Some(Phase {
            index,
            boundary: *self.boundaries.get(index)?,
            temperature: self.temperatures[index],
            speed: self.speeds[index],
        })
    }

    /// Iterate over all phases in order
    pub fn phases(&self) -> impl Iterator<Item = Phase> + '_ {
        (0..self.phase_count()).filter_map(|i| self.phase(i))
    }

    /// Phase boundaries in height percent
    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    /// Temperatures per phase (°C)
    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    /// Speed multipliers per phase (%)
    pub fn speeds(&self) -> &[f64] {
        &self.speeds
    }

    /// Magnitude of the largest extrusion correction (%)
    pub fn extrude_correction(&self) -> f64 {
        self.extrude_correction
    }

    /// Constant XY shift
    pub fn shift(&self) -> Shift {
        self.shift
    }

    /// Whether heating passes are synthesized between layers
    pub fn heating_enabled(&self) -> bool {
        self.heating_enabled
    }
}
