//! # Phasekit G-code
//!
//! Streaming rewrite of sliced G-code along a height-based parameter schedule.
//! Includes the line classifier, phase locator, line transforms, perimeter
//! tracking, heating-path synthesis, the streaming editor and file readers.

pub mod gcode;
pub mod utils;

pub use gcode::{
    classify, interpolate, locate_phase, rewrite_file, temperature_setup_lines, CommandLine,
    EditorStats, ExtrudeRatioTable, GcodeEditor, GcodeLine, HeatingPath, LineTransformer, Marker,
    PerimeterTracker, PhasePosition, TemperatureCommand, TemperatureKind, TrackerState, Word,
    MODIFIED_MARKER,
};

pub use utils::{scan_layer_info, scan_layers, FileReadStats, GcodeFileReader};
