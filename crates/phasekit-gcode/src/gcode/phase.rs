//! Phase lookup and extrusion ratios
//!
//! The phase locator maps a height percentage to the phase it falls in and
//! the progress through that phase. The extrusion ratio table gives every
//! phase a correction derived from how far its temperature and speed deviate
//! from the schedule average.

use phasekit_core::{ParameterSchedule, ScheduleError};
use serde::{Deserialize, Serialize};

/// Position of a height inside the phase table
///
/// `index` is the phase whose upper boundary bounds the height; `index == 0`
/// means the height lies outside every phase.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhasePosition {
    pub index: usize,
    /// Progress between `boundary[index - 1]` and `boundary[index]` (0..=1)
    pub fraction: f64,
}

impl PhasePosition {
    pub fn new(index: usize, fraction: f64) -> Self {
        Self { index, fraction }
    }

    /// True when no phase contains the height
    pub fn is_outside(&self) -> bool {
        self.index == 0
    }
}

/// Locate a height percentage in a boundary table
///
/// Every segment `[boundary[i-1], boundary[i]]` containing the height is
/// considered and the last one wins, so a height sitting exactly on a shared
/// boundary belongs to the later phase. Heights outside every segment give
/// `(0, 0.0)`.
pub fn locate_phase(height_pct: f64, boundaries: &[f64]) -> PhasePosition {
    let mut position = PhasePosition::default();
    for (i, pair) in boundaries.windows(2).enumerate() {
        let (low, high) = (pair[0], pair[1]);
        if low <= height_pct && height_pct <= high {
            let width = high - low;
            let fraction = if width > 0.0 {
                (height_pct - low) / width
            } else {
                0.0
            };
            position = PhasePosition::new(i + 1, fraction);
        }
    }
    position
}

/// Linear interpolation from `a` to `b`
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Interpolate a per-phase table at a phase position
///
/// Returns `None` outside every phase.
pub fn interpolate(values: &[f64], position: PhasePosition) -> Option<f64> {
    if position.is_outside() {
        return None;
    }
    let start = *values.get(position.index - 1)?;
    let end = *values.get(position.index)?;
    Some(lerp(start, end, position.fraction))
}

/// Per-phase extrusion correction (%)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtrudeRatioTable {
    ratios: Vec<f64>,
}

impl ExtrudeRatioTable {
    /// Derive the table from a schedule
    pub fn from_schedule(schedule: &ParameterSchedule) -> Result<Self, ScheduleError> {
        Self::from_tables(
            schedule.temperatures(),
            schedule.speeds(),
            schedule.extrude_correction(),
        )
    }

    /// Derive the table from raw temperature and speed tables
    ///
    /// The phase with the largest theoretical expansion gets a ratio of
    /// `magnitude` (with its sign); the others are scaled proportionally.
    pub fn from_tables(
        temperatures: &[f64],
        speeds: &[f64],
        magnitude: f64,
    ) -> Result<Self, ScheduleError> {
        let expansions = theory_expansion(temperatures, speeds)?;
        let worst = expansions.iter().fold(0.0_f64, |acc, e| acc.max(e.abs()));
        if worst == 0.0 || !worst.is_finite() {
            return Err(ScheduleError::DegenerateExtrudeRatio {
                reason: "every phase has the same relative temperature and speed, \
                         so there is no deviation to scale the correction against"
                    .to_string(),
            });
        }

        let ratios = expansions
            .iter()
            .map(|e| magnitude * e / worst)
            .collect();
        Ok(Self { ratios })
    }

    /// Ratio of a phase, 0 for unknown phases
    pub fn ratio(&self, index: usize) -> f64 {
        self.ratios.get(index).copied().unwrap_or(0.0)
    }

    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    /// Multiplier applied to extrusion words in a phase
    pub fn factor(&self, index: usize) -> f64 {
        (100.0 + self.ratio(index)) / 100.0
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Half the difference between relative speed and relative temperature, per phase
pub fn theory_expansion(temperatures: &[f64], speeds: &[f64]) -> Result<Vec<f64>, ScheduleError> {
    if temperatures.is_empty() || temperatures.len() != speeds.len() {
        return Err(ScheduleError::LengthMismatch {
            quantity: "speed".to_string(),
            expected: temperatures.len(),
            actual: speeds.len(),
        });
    }

    let temp_mean = mean(temperatures);
    let speed_mean = mean(speeds);
    for (quantity, m) in [("temperature", temp_mean), ("speed", speed_mean)] {
        if m == 0.0 {
            return Err(ScheduleError::DegenerateExtrudeRatio {
                reason: format!("the mean {quantity} is zero"),
            });
        }
    }

    Ok(temperatures
        .iter()
        .zip(speeds)
        .map(|(t, s)| ((s / speed_mean) * 100.0 - (t / temp_mean) * 100.0) / 2.0)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: [f64; 3] = [0.0, 50.0, 100.0];

    #[test]
    fn test_locate_inside_phase() {
        assert_eq!(locate_phase(25.0, &BOUNDS), PhasePosition::new(1, 0.5));
        assert_eq!(locate_phase(75.0, &BOUNDS), PhasePosition::new(2, 0.5));
    }

    #[test]
    fn test_locate_boundaries() {
        assert_eq!(locate_phase(0.0, &BOUNDS), PhasePosition::new(1, 0.0));
        assert_eq!(locate_phase(100.0, &BOUNDS), PhasePosition::new(2, 1.0));
        // Shared boundary goes to the later phase
        assert_eq!(locate_phase(50.0, &BOUNDS), PhasePosition::new(2, 0.0));
    }

    #[test]
    fn test_locate_outside() {
        assert_eq!(locate_phase(-0.001, &BOUNDS), PhasePosition::default());
        assert_eq!(locate_phase(100.5, &BOUNDS), PhasePosition::default());
        assert!(locate_phase(f64::NAN, &BOUNDS).is_outside());
        assert!(locate_phase(10.0, &[]).is_outside());
    }

    #[test]
    fn test_interpolate() {
        let speeds = [100.0, 120.0, 150.0];
        assert_eq!(interpolate(&speeds, PhasePosition::new(1, 0.5)), Some(110.0));
        assert_eq!(interpolate(&speeds, PhasePosition::new(2, 1.0)), Some(150.0));
        assert_eq!(interpolate(&speeds, PhasePosition::default()), None);
        assert_eq!(interpolate(&speeds, PhasePosition::new(3, 0.0)), None);
    }

    #[test]
    fn test_ratio_table_normalised() {
        let table =
            ExtrudeRatioTable::from_tables(&[200.0, 210.0], &[100.0, 150.0], 5.0).unwrap();
        let max = table
            .ratios()
            .iter()
            .fold(0.0_f64, |acc, r| acc.max(r.abs()));
        assert!((max - 5.0).abs() < 1e-12);
        // Faster, hotter phase expands more than the slower one
        assert!(table.ratio(1) > 0.0);
        assert!(table.ratio(0) < 0.0);
        assert!((table.ratio(0) + table.ratio(1)).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_zero_expansion_phase() {
        // Phase 1 sits exactly on both means
        let table = ExtrudeRatioTable::from_tables(
            &[190.0, 200.0, 210.0],
            &[80.0, 100.0, 120.0],
            4.0,
        );
        // Relative speed and temperature deviations differ, so the table is valid
        let table = table.unwrap();
        assert!(table.ratio(1).abs() < 1e-12);
        assert_eq!(table.factor(1), 1.0);
        assert!((table.ratio(0).abs() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_ratio_degenerate() {
        let err = ExtrudeRatioTable::from_tables(&[200.0, 200.0], &[100.0, 100.0], 5.0)
            .unwrap_err();
        assert!(matches!(err, ScheduleError::DegenerateExtrudeRatio { .. }));

        let err =
            ExtrudeRatioTable::from_tables(&[200.0, 210.0], &[0.0, 0.0], 5.0).unwrap_err();
        assert!(matches!(err, ScheduleError::DegenerateExtrudeRatio { .. }));
    }

    #[test]
    fn test_ratio_unknown_phase() {
        let table =
            ExtrudeRatioTable::from_tables(&[200.0, 210.0], &[100.0, 150.0], 5.0).unwrap();
        assert_eq!(table.ratio(7), 0.0);
        assert_eq!(table.factor(7), 1.0);
    }
}
