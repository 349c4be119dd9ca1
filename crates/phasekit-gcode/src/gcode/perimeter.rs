//! External perimeter tracking
//!
//! Collects the XY positions of the external perimeter of the current layer.
//! Tracking starts at `;TYPE:External perimeter` (only when heating is
//! enabled) and stops at `;WIPE_START` or when the samples are taken at a
//! layer change.

use phasekit_core::Point2D;
use serde::{Deserialize, Serialize};

use super::line::{CommandLine, Marker};

/// Tracker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackerState {
    #[default]
    Inactive,
    Tracking,
}

/// Layer-scoped accumulator of perimeter samples
#[derive(Debug, Clone, Default)]
pub struct PerimeterTracker {
    enabled: bool,
    state: TrackerState,
    samples: Vec<Point2D>,
}

impl PerimeterTracker {
    /// Create a tracker; a disabled tracker never leaves `Inactive`
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn is_tracking(&self) -> bool {
        self.state == TrackerState::Tracking
    }

    /// React to a comment marker
    pub fn on_marker(&mut self, marker: Marker) {
        match (self.state, marker) {
            (_, Marker::ExternalPerimeter) if self.enabled => {
                self.samples.clear();
                self.state = TrackerState::Tracking;
            }
            (TrackerState::Tracking, Marker::WipeStart) => {
                self.state = TrackerState::Inactive;
            }
            _ => {}
        }
    }

    /// Record the position of a (transformed) motion line while tracking
    pub fn on_motion(&mut self, line: &CommandLine) {
        if !self.is_tracking() {
            return;
        }
        if let Some((x, y)) = line.xy() {
            self.samples.push(Point2D::new(x, y));
        }
    }

    /// Samples accumulated so far
    pub fn samples(&self) -> &[Point2D] {
        &self.samples
    }

    /// Hand the samples over at a layer change and stop tracking
    pub fn take_samples(&mut self) -> Vec<Point2D> {
        self.state = TrackerState::Inactive;
        std::mem::take(&mut self.samples)
    }
}
