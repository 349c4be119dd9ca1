//! File I/O
//!
//! Streaming G-code reading shared by the layer scan and the rewrite pass.
//! Lines are handed out together with their original terminator so that
//! untouched lines can be written back byte for byte.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

use phasekit_core::{Error, LayerInfo, Result};

use crate::gcode::line::{classify, GcodeLine, Marker};

/// Buffer size for reading large files (256 KB)
const READ_BUFFER_SIZE: usize = 256 * 1024;

/// File read statistics
#[derive(Debug, Clone, Default)]
pub struct FileReadStats {
    /// Total bytes read
    pub bytes_read: u64,
    /// Total lines read
    pub lines_read: u64,
    /// File size in bytes (0 for non-file sources)
    pub file_size: u64,
    /// Time taken to read (milliseconds)
    pub read_time_ms: u64,
}

/// Split a raw line into content and terminator (`"\n"`, `"\r\n"` or `""`)
fn split_terminator(raw: &str) -> (&str, &str) {
    if let Some(content) = raw.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = raw.strip_suffix('\n') {
        (content, "\n")
    } else {
        (raw, "")
    }
}

/// Feed every line of a reader to `callback` as `(content, terminator)`
pub fn for_each_line<R, F>(mut reader: R, mut callback: F) -> Result<FileReadStats>
where
    R: BufRead,
    F: FnMut(&str, &str) -> Result<()>,
{
    let start_time = Instant::now();
    let mut stats = FileReadStats::default();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let read = reader.read_line(&mut buffer)?;
        if read == 0 {
            break;
        }
        stats.bytes_read += read as u64;
        stats.lines_read += 1;

        let (content, terminator) = split_terminator(&buffer);
        callback(content, terminator)?;
    }

    stats.read_time_ms = start_time.elapsed().as_millis() as u64;
    Ok(stats)
}

/// G-code file reader with streaming support
pub struct GcodeFileReader {
    path: PathBuf,
    file_size: u64,
}

impl GcodeFileReader {
    /// Create a new G-code file reader
    ///
    /// # Errors
    /// Returns error if file does not exist or cannot be accessed
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.is_file() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("G-code file not found: {}", path.display()),
            )));
        }

        let file_size = fs::metadata(&path)?.len();
        Ok(Self { path, file_size })
    }

    /// Get file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stream the file line by line
    pub fn read_lines<F>(&self, callback: F) -> Result<FileReadStats>
    where
        F: FnMut(&str, &str) -> Result<()>,
    {
        let file = File::open(&self.path)?;
        let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
        let mut stats = for_each_line(reader, callback)?;
        stats.file_size = self.file_size;
        Ok(stats)
    }
}

/// Accumulates the layer height and layer count over a stream
#[derive(Debug, Default)]
struct LayerScan {
    layer_height: Option<f64>,
    total_layers: u32,
}

impl LayerScan {
    fn on_line(&mut self, line: &str) {
        if let GcodeLine::Comment(marker) = classify(line) {
            match marker {
                Marker::LayerChange => self.total_layers += 1,
                Marker::LayerHeight(h) if self.layer_height.is_none() => {
                    self.layer_height = Some(h)
                }
                _ => {}
            }
        }
    }

    fn finish(self, source_name: &str) -> Result<LayerInfo> {
        let layer_height = self.layer_height.unwrap_or_else(|| {
            tracing::warn!("No layer height declared in {}, assuming 0", source_name);
            0.0
        });
        let info = LayerInfo::new(layer_height, self.total_layers, source_name)?;
        tracing::info!(
            "{}: {} layers of {} mm ({:.3} mm total)",
            source_name,
            info.total_layers,
            info.layer_height,
            info.total_height
        );
        Ok(info)
    }
}

/// Scan G-code for the layer height and the number of layers
///
/// The first `; layer_height=` comment gives the layer height; every
/// `;LAYER_CHANGE` marker counts one layer.
pub fn scan_layers<R: BufRead>(reader: R, source_name: &str) -> Result<LayerInfo> {
    let mut scan = LayerScan::default();
    for_each_line(reader, |line, _| {
        scan.on_line(line);
        Ok(())
    })?;
    scan.finish(source_name)
}

/// Scan a G-code file for its layer information
pub fn scan_layer_info(path: impl AsRef<Path>) -> Result<LayerInfo> {
    let reader = GcodeFileReader::new(path)?;
    let mut scan = LayerScan::default();
    let stats = reader.read_lines(|line, _| {
        scan.on_line(line);
        Ok(())
    })?;
    tracing::debug!(
        "Scanned {} lines ({} of {} bytes) in {} ms",
        stats.lines_read,
        stats.bytes_read,
        stats.file_size,
        stats.read_time_ms
    );
    scan.finish(&reader.path().display().to_string())
}
