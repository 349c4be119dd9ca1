//! Streaming G-code editor
//!
//! Single pass over a G-code stream. Layer markers advance the layer state,
//! motion and temperature lines go through the line transforms, external
//! perimeter moves feed the tracker, and a heating raster is inserted before
//! every layer change after the first.

use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use phasekit_core::{Error, LayerInfo, LayerState, ParameterSchedule, Result};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::heating::HeatingPath;
use super::line::{classify, CommandLine, GcodeLine, Marker};
use super::perimeter::PerimeterTracker;
use super::phase::{locate_phase, ExtrudeRatioTable, PhasePosition};
use super::transform::{temperature_setup_lines, LineTransformer};
use crate::utils::file_io::{for_each_line, FileReadStats, GcodeFileReader};

/// Counters collected during a rewrite
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EditorStats {
    /// Input lines processed
    pub lines_read: u64,
    /// Input lines rewritten by a transform
    pub lines_modified: u64,
    /// Lines added by the editor (heating blocks and temperature set-up)
    pub lines_inserted: u64,
    /// Heating blocks emitted
    pub heating_blocks: u64,
    /// Layer boundaries where heating was enabled but no block could be built
    pub heating_skipped: u64,
    /// Layer changes seen
    pub layers: u32,
}

/// Streaming editor state machine
pub struct GcodeEditor<'a> {
    schedule: &'a ParameterSchedule,
    transformer: LineTransformer<'a>,
    layer_info: LayerInfo,
    state: LayerState,
    tracker: PerimeterTracker,
    stats: EditorStats,
    newline: String,
}

impl<'a> GcodeEditor<'a> {
    /// Create an editor positioned before the first layer
    pub fn new(
        schedule: &'a ParameterSchedule,
        ratios: &'a ExtrudeRatioTable,
        layer_info: LayerInfo,
    ) -> Self {
        let mut state = LayerState::new();
        let position = locate_phase(state.height_pct, schedule.boundaries());
        state.set_phase(position.index, position.fraction);

        Self {
            schedule,
            transformer: LineTransformer::new(schedule, ratios),
            layer_info,
            state,
            tracker: PerimeterTracker::new(schedule.heating_enabled()),
            stats: EditorStats::default(),
            newline: "\n".to_string(),
        }
    }

    /// Current layer state
    pub fn state(&self) -> &LayerState {
        &self.state
    }

    /// Counters so far
    pub fn stats(&self) -> &EditorStats {
        &self.stats
    }

    fn position(&self) -> PhasePosition {
        PhasePosition::new(self.state.phase_index, self.state.phase_fraction)
    }

    /// Process one input line
    ///
    /// `line` is the line content and `ending` its original terminator
    /// (empty for a final unterminated line).
    pub fn process_line<W: Write>(&mut self, line: &str, ending: &str, out: &mut W) -> Result<()> {
        self.stats.lines_read += 1;
        if !ending.is_empty() && ending != self.newline {
            self.newline = ending.to_string();
        }

        match classify(line) {
            GcodeLine::Comment(Marker::LayerChange) => {
                self.emit_heating(out)?;
                write_raw(out, line, ending)?;
                self.change_layer()?;
            }
            GcodeLine::Comment(Marker::BeforeLayerChange) => {
                let upcoming = locate_phase(
                    self.state.upcoming_height_pct(&self.layer_info),
                    self.schedule.boundaries(),
                );
                match temperature_setup_lines(self.schedule, upcoming) {
                    Some(setup) => {
                        let ending = if ending.is_empty() {
                            self.newline.clone()
                        } else {
                            ending.to_string()
                        };
                        write_raw(out, line, &ending)?;
                        for setup_line in &setup {
                            self.write_inserted(out, setup_line)?;
                        }
                    }
                    None => write_raw(out, line, ending)?,
                }
            }
            GcodeLine::Comment(marker) => {
                self.tracker.on_marker(marker);
                write_raw(out, line, ending)?;
            }
            GcodeLine::Motion(command) => {
                let command = self.transformer.transform_motion(command, self.position());
                self.tracker.on_motion(&command);
                self.write_command(out, line, ending, &command)?;
            }
            GcodeLine::TemperatureCommand(command) => {
                let command = self
                    .transformer
                    .transform_temperature(command, self.position());
                self.write_command(out, line, ending, &command.line)?;
            }
            GcodeLine::Other => write_raw(out, line, ending)?,
        }
        Ok(())
    }

    /// Rewrite a whole stream
    pub fn rewrite<R: BufRead, W: Write>(&mut self, reader: R, out: &mut W) -> Result<FileReadStats> {
        for_each_line(reader, |line, ending| self.process_line(line, ending, out))
    }

    /// Consume the editor, returning its counters
    pub fn finish(self) -> EditorStats {
        self.stats
    }

    fn change_layer(&mut self) -> Result<()> {
        self.state.advance(&self.layer_info)?;
        let position = locate_phase(self.state.height_pct, self.schedule.boundaries());
        self.state.set_phase(position.index, position.fraction);
        self.stats.layers = self.state.layer_counter;
        debug!(
            "Layer {} at {:.2} % (phase {}, {:.3})",
            self.state.layer_counter, self.state.height_pct, position.index, position.fraction
        );
        Ok(())
    }

    fn emit_heating<W: Write>(&mut self, out: &mut W) -> Result<()> {
        if !self.schedule.heating_enabled() {
            return Ok(());
        }
        let samples = self.tracker.take_samples();
        if self.state.before_first_layer() {
            return Ok(());
        }

        let path = match HeatingPath::from_samples(&samples) {
            Some(path) if !path.is_empty() => path,
            _ => {
                debug!(
                    "Skipping heating pass after layer {}: no external perimeter extent",
                    self.state.layer_counter
                );
                self.stats.heating_skipped += 1;
                return Ok(());
            }
        };

        for heating_line in path.gcode_lines() {
            self.write_inserted(out, &heating_line)?;
        }
        self.stats.heating_blocks += 1;
        debug!(
            "Heating pass of {} lines after layer {}",
            path.line_count(),
            self.state.layer_counter
        );
        Ok(())
    }

    fn write_command<W: Write>(
        &mut self,
        out: &mut W,
        original: &str,
        ending: &str,
        command: &CommandLine,
    ) -> Result<()> {
        if command.modified {
            self.stats.lines_modified += 1;
            write_raw(out, &command.render(), ending)
        } else {
            write_raw(out, original, ending)
        }
    }

    fn write_inserted<W: Write>(&mut self, out: &mut W, line: &str) -> Result<()> {
        self.stats.lines_inserted += 1;
        write_raw(out, line, &self.newline)
    }
}

fn write_raw<W: Write>(out: &mut W, line: &str, ending: &str) -> Result<()> {
    out.write_all(line.as_bytes())?;
    out.write_all(ending.as_bytes())?;
    Ok(())
}

/// Rewrite a G-code file into `output`
///
/// The result is written to a temporary file next to `output` and moved
/// into place only once the whole pass succeeded.
pub fn rewrite_file(input: &Path, output: &Path, mut editor: GcodeEditor<'_>) -> Result<EditorStats> {
    let reader = GcodeFileReader::new(input)?;
    let directory = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut writer = BufWriter::new(NamedTempFile::new_in(directory)?);
    let read_stats =
        reader.read_lines(|line, ending| editor.process_line(line, ending, &mut writer))?;
    let temp = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    temp.as_file().sync_all()?;
    temp.persist(output).map_err(|e| Error::Io(e.error))?;

    let stats = editor.finish();
    info!(
        "Rewrote {} lines ({} modified, {} inserted) in {} ms into {}",
        read_stats.lines_read,
        stats.lines_modified,
        stats.lines_inserted,
        read_stats.read_time_ms,
        output.display()
    );
    Ok(stats)
}
