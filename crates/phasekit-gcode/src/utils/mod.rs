//! Utility modules
//!
//! File I/O helpers shared by the layer scan and the streaming editor.

pub mod file_io;

pub use file_io::{for_each_line, scan_layer_info, scan_layers, FileReadStats, GcodeFileReader};
