//! Per-line transforms
//!
//! Each transform takes a line by value and returns the rewritten line,
//! marking it modified when it changed a word. [`LineTransformer`] applies
//! them to motion lines in a fixed order: speed, extrusion, shift.

use phasekit_core::{ParameterSchedule, Shift};

use super::line::{CommandLine, TemperatureCommand, TemperatureKind, MODIFIED_MARKER};
use super::phase::{interpolate, ExtrudeRatioTable, PhasePosition};

/// Scale `F` words by the interpolated speed multiplier
pub fn apply_speed(
    line: CommandLine,
    schedule: &ParameterSchedule,
    position: PhasePosition,
) -> CommandLine {
    match interpolate(schedule.speeds(), position) {
        Some(multiplier) => line.map_words('F', |f| f * multiplier / 100.0),
        None => line,
    }
}

/// Scale `E` words by the phase's extrusion ratio
pub fn apply_extrusion(
    line: CommandLine,
    ratios: &ExtrudeRatioTable,
    position: PhasePosition,
) -> CommandLine {
    let factor = ratios.factor(position.index);
    line.map_words('E', |e| e * factor)
}

/// Offset `X` and `Y` words
pub fn apply_shift(line: CommandLine, shift: Shift) -> CommandLine {
    line.map_words('X', |x| x + shift.x)
        .map_words('Y', |y| y + shift.y)
}

/// Replace the target temperature with the interpolated one
pub fn apply_temperature(
    command: TemperatureCommand,
    schedule: &ParameterSchedule,
    position: PhasePosition,
) -> TemperatureCommand {
    let Some(temperature) = interpolate(schedule.temperatures(), position) else {
        return command;
    };
    let TemperatureCommand { kind, line } = command;
    TemperatureCommand {
        kind,
        line: line.map_words(kind.value_letter(), |_| temperature),
    }
}

/// `M104`/`M109` pair setting up the temperature of an upcoming layer
///
/// Returns `None` outside every phase.
pub fn temperature_setup_lines(
    schedule: &ParameterSchedule,
    position: PhasePosition,
) -> Option<[String; 2]> {
    let temperature = interpolate(schedule.temperatures(), position)?;
    let line = |kind: TemperatureKind| {
        format!(
            "{} {}{:.3} {}",
            kind.code(),
            kind.value_letter(),
            temperature,
            MODIFIED_MARKER
        )
    };
    Some([
        line(TemperatureKind::SetNozzle),
        line(TemperatureKind::WaitNozzle),
    ])
}

/// Applies the transforms of a schedule to classified lines
#[derive(Debug, Clone, Copy)]
pub struct LineTransformer<'a> {
    schedule: &'a ParameterSchedule,
    ratios: &'a ExtrudeRatioTable,
}

impl<'a> LineTransformer<'a> {
    pub fn new(schedule: &'a ParameterSchedule, ratios: &'a ExtrudeRatioTable) -> Self {
        Self { schedule, ratios }
    }

    /// Speed, then extrusion, then shift
    pub fn transform_motion(&self, line: CommandLine, position: PhasePosition) -> CommandLine {
        let line = apply_speed(line, self.schedule, position);
        let line = apply_extrusion(line, self.ratios, position);
        apply_shift(line, self.schedule.shift())
    }

    pub fn transform_temperature(
        &self,
        command: TemperatureCommand,
        position: PhasePosition,
    ) -> TemperatureCommand {
        apply_temperature(command, self.schedule, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcode::line::{classify, GcodeLine};

    fn schedule(shift: Shift) -> ParameterSchedule {
        ParameterSchedule::new(
            vec![0.0, 50.0, 100.0],
            vec![200.0, 210.0, 220.0],
            vec![100.0, 120.0, 150.0],
            5.0,
            shift,
            false,
        )
        .unwrap()
    }

    fn motion(text: &str) -> CommandLine {
        match classify(text) {
            GcodeLine::Motion(line) => line,
            other => panic!("not a motion line: {other:?}"),
        }
    }

    fn temperature(text: &str) -> TemperatureCommand {
        match classify(text) {
            GcodeLine::TemperatureCommand(cmd) => cmd,
            other => panic!("not a temperature line: {other:?}"),
        }
    }

    #[test]
    fn test_speed_interpolated() {
        let s = schedule(Shift::default());
        let line = apply_speed(motion("G1 F1000"), &s, PhasePosition::new(1, 0.5));
        assert!(line.modified);
        assert!((line.value('F').unwrap() - 1100.0).abs() < 1e-9);
        assert_eq!(line.render(), "G1 F1100.000 ;Modified");
    }

    #[test]
    fn test_speed_noop_outside_phases() {
        let s = schedule(Shift::default());
        let line = apply_speed(motion("G1 F1000"), &s, PhasePosition::default());
        assert!(!line.modified);
        assert_eq!(line.value('F'), Some(1000.0));
    }

    #[test]
    fn test_extrusion_uses_phase_ratio() {
        let s = schedule(Shift::default());
        let ratios = ExtrudeRatioTable::from_schedule(&s).unwrap();
        let position = PhasePosition::new(2, 0.1);
        let line = apply_extrusion(motion("G1 X1 E2"), &ratios, position);
        let expected = 2.0 * (100.0 + ratios.ratio(2)) / 100.0;
        assert!((line.value('E').unwrap() - expected).abs() < 1e-3);
        assert_eq!(line.value('X'), Some(1.0));
    }

    #[test]
    fn test_shift_is_unconditional() {
        let line = apply_shift(motion("G0 X10 Y-5 Z0.2"), Shift::new(1.0, 2.5));
        assert_eq!(line.xy(), Some((11.0, -2.5)));
        assert_eq!(line.render(), "G0 X11.000 Y-2.500 Z0.2 ;Modified");
    }

    #[test]
    fn test_transform_motion_order() {
        let s = schedule(Shift::new(1.0, 1.0));
        let ratios = ExtrudeRatioTable::from_schedule(&s).unwrap();
        let transformer = LineTransformer::new(&s, &ratios);
        let line = transformer.transform_motion(
            motion("G1 X10 Y10 F1000 E1"),
            PhasePosition::new(1, 0.5),
        );
        assert_eq!(line.value('X'), Some(11.0));
        assert_eq!(line.value('Y'), Some(11.0));
        assert_eq!(line.value('F'), Some(1100.0));
        assert!(line.render().ends_with(" ;Modified"));
    }

    #[test]
    fn test_line_without_recognized_words_untouched() {
        let s = schedule(Shift::new(1.0, 1.0));
        let ratios = ExtrudeRatioTable::from_schedule(&s).unwrap();
        let transformer = LineTransformer::new(&s, &ratios);
        let line = transformer.transform_motion(motion("G1 Z0.4"), PhasePosition::new(1, 0.5));
        assert!(!line.modified);
    }

    #[test]
    fn test_temperature_rewrite() {
        let s = schedule(Shift::default());
        let cmd = apply_temperature(temperature("M104 S200"), &s, PhasePosition::new(2, 0.5));
        assert_eq!(cmd.line.render(), "M104 S215.000 ;Modified");

        let cmd = apply_temperature(temperature("M109 R200"), &s, PhasePosition::new(1, 0.0));
        assert_eq!(cmd.line.render(), "M109 R200.000 ;Modified");

        // M109 only carries its target in R
        let cmd = apply_temperature(temperature("M109 S200"), &s, PhasePosition::new(1, 0.5));
        assert!(!cmd.line.modified);

        let cmd = apply_temperature(temperature("M104 S200"), &s, PhasePosition::default());
        assert!(!cmd.line.modified);
    }

    #[test]
    fn test_temperature_setup_lines() {
        let s = schedule(Shift::default());
        let lines = temperature_setup_lines(&s, PhasePosition::new(1, 0.5)).unwrap();
        assert_eq!(lines[0], "M104 S205.000 ;Modified");
        assert_eq!(lines[1], "M109 R205.000 ;Modified");
        assert!(temperature_setup_lines(&s, PhasePosition::default()).is_none());
    }
}
