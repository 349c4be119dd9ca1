//! Error handling for phasekit
//!
//! Provides error types for the layers below the run driver:
//! - Schedule errors (structural invariants, degenerate extrusion ratios)
//! - Layer errors (missing layer markers in the G-code)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Parameter schedule error type
///
/// Represents violations of the schedule invariants and failures while
/// deriving values from an otherwise valid schedule.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// Fewer phases than the two boundaries 0 % and 100 % require
    #[error("At least 2 phases are required, got {count}")]
    TooFewPhases {
        /// The number of phases that were declared.
        count: usize,
    },

    /// The first boundary is not 0 %
    #[error("The first phase must be set to 0 %, got {value}")]
    FirstBoundary {
        /// The declared first boundary.
        value: f64,
    },

    /// The last boundary is not 100 %
    #[error("The last phase must be set to 100 %, got {value}")]
    LastBoundary {
        /// The declared last boundary.
        value: f64,
    },

    /// A boundary is not greater than its predecessor
    #[error("Phase {index} ({value} %) must be greater than its predecessor ({previous} %)")]
    NonIncreasingBoundary {
        /// Index of the offending phase.
        index: usize,
        /// Boundary of the previous phase.
        previous: f64,
        /// Boundary of the offending phase.
        value: f64,
    },

    /// A per-phase table does not have one entry per phase
    #[error("Expected {expected} {quantity} values (one per phase), got {actual}")]
    LengthMismatch {
        /// Name of the per-phase quantity.
        quantity: String,
        /// Number of phases.
        expected: usize,
        /// Number of values provided.
        actual: usize,
    },

    /// A value is NaN or infinite
    #[error("Non-finite {quantity} value for phase {index}")]
    NonFinite {
        /// Name of the quantity.
        quantity: String,
        /// Index of the phase.
        index: usize,
    },

    /// Extrusion ratios cannot be normalised
    #[error("Cannot derive extrusion ratios: {reason}")]
    DegenerateExtrudeRatio {
        /// Why the normalisation failed.
        reason: String,
    },
}

/// Layer model error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayerError {
    /// No `;LAYER_CHANGE` marker was found in the input
    #[error("No layer change marker found in {source_name}, cannot compute height percentages")]
    MissingLayerMarker {
        /// Name of the scanned G-code source.
        source_name: String,
    },

    /// A layer counter went past the number of scanned layers
    #[error("Layer {layer} exceeds the {total} layers found by the layer scan")]
    LayerOverflow {
        /// The offending layer counter.
        layer: u32,
        /// Total number of layers.
        total: u32,
    },
}

/// Main error type for phasekit
///
/// A unified error type for the library crates.
#[derive(Error, Debug)]
pub enum Error {
    /// Schedule error
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Layer error
    #[error(transparent)]
    Layer(#[from] LayerError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is a schedule error
    pub fn is_schedule_error(&self) -> bool {
        matches!(self, Error::Schedule(_))
    }

    /// Check if this is a layer error
    pub fn is_layer_error(&self) -> bool {
        matches!(self, Error::Layer(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
