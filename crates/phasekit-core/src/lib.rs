//! # Phasekit Core
//!
//! Core types shared by the phasekit crates.
//! Provides the validated parameter schedule, the layer model used by the
//! streaming editor, 2D points and bounds, and the error types.

pub mod data;
pub mod error;
pub mod schedule;

pub use data::{
    layer::{LayerInfo, LayerState},
    Bounds2D, Point2D,
};

pub use error::{Error, LayerError, Result, ScheduleError};

pub use schedule::{ParameterSchedule, Phase, Shift};
