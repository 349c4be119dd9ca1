//! Heating raster synthesis
//!
//! Turns the external perimeter samples of a finished layer into a zig-zag of
//! rapid, non-extruding moves covering its bounding box (grown by 5 % on
//! each side), so the nozzle pre-heats the layer before the next one.

use phasekit_core::{Bounds2D, Point2D};
use serde::Serialize;

/// Distance between two raster lines (mm)
pub const LINE_SPACING: f64 = 0.4;

/// Growth of the bounding box on each side, as a fraction of its extent
pub const MARGIN_FRACTION: f64 = 0.05;

pub const HEATING_START_MARKER: &str = ";HEATING_PHASE";
pub const HEATING_END_MARKER: &str = ";END_HEATING_PHASE";

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Raster endpoints: `upper` on the right edge, `lower` on the left edge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatingPath {
    pub upper: Vec<Point2D>,
    pub lower: Vec<Point2D>,
}

impl HeatingPath {
    /// Build the raster covering a set of perimeter samples
    ///
    /// Returns `None` when there are no samples.
    pub fn from_samples(samples: &[Point2D]) -> Option<Self> {
        let bounds = Bounds2D::from_points(samples)?.expanded(MARGIN_FRACTION);
        let count = (bounds.height() / LINE_SPACING).round() as usize;

        let step = if count > 1 {
            bounds.height() / (count - 1) as f64
        } else {
            0.0
        };
        let (upper, lower) = (0..count)
            .map(|i| {
                let y = round3(bounds.min_y + step * i as f64);
                (
                    Point2D::new(round3(bounds.max_x), y),
                    Point2D::new(round3(bounds.min_x), y),
                )
            })
            .unzip();

        Some(Self { upper, lower })
    }

    /// Number of raster lines
    pub fn line_count(&self) -> usize {
        self.upper.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upper.is_empty()
    }

    /// Visiting order of the raster endpoints
    pub fn moves(&self) -> impl Iterator<Item = Point2D> + '_ {
        self.upper
            .iter()
            .zip(&self.lower)
            .enumerate()
            .flat_map(|(i, (upper, lower))| {
                if i % 2 == 0 {
                    [*upper, *lower]
                } else {
                    [*lower, *upper]
                }
            })
    }

    /// G-code block, bracketed by the heating markers
    pub fn gcode_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.line_count() * 2 + 2);
        lines.push(HEATING_START_MARKER.to_string());
        lines.extend(self.moves().map(|p| format!("G0 {p}")));
        lines.push(HEATING_END_MARKER.to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(size, 0.0),
            Point2D::new(size, size),
            Point2D::new(0.0, size),
        ]
    }

    #[test]
    fn test_empty_samples() {
        assert!(HeatingPath::from_samples(&[]).is_none());
    }

    #[test]
    fn test_line_count() {
        // 20 mm grown to 22 mm, 22 / 0.4 = 55
        let path = HeatingPath::from_samples(&square(20.0)).unwrap();
        assert_eq!(path.line_count(), 55);
        assert_eq!(path.lower.len(), 55);
    }

    #[test]
    fn test_endpoints_on_expanded_edges() {
        let path = HeatingPath::from_samples(&square(20.0)).unwrap();
        assert_eq!(path.upper[0], Point2D::new(21.0, -1.0));
        assert_eq!(path.lower[0], Point2D::new(-1.0, -1.0));
        assert_eq!(path.upper[54], Point2D::new(21.0, 21.0));
        assert_eq!(path.lower[54], Point2D::new(-1.0, 21.0));
    }

    #[test]
    fn test_zigzag_order() {
        let path = HeatingPath::from_samples(&square(10.0)).unwrap();
        let moves: Vec<_> = path.moves().take(4).collect();
        assert_eq!(moves[0], path.upper[0]);
        assert_eq!(moves[1], path.lower[0]);
        assert_eq!(moves[2], path.lower[1]);
        assert_eq!(moves[3], path.upper[1]);
    }

    #[test]
    fn test_flat_perimeter_has_no_lines() {
        let samples = [Point2D::new(0.0, 5.0), Point2D::new(10.0, 5.0)];
        let path = HeatingPath::from_samples(&samples).unwrap();
        assert!(path.is_empty());
        assert_eq!(
            path.gcode_lines(),
            vec![HEATING_START_MARKER.to_string(), HEATING_END_MARKER.to_string()]
        );
    }

    #[test]
    fn test_gcode_block() {
        let path = HeatingPath::from_samples(&square(1.0)).unwrap();
        // 1.1 / 0.4 = 2.75 -> 3 lines
        let lines = path.gcode_lines();
        assert_eq!(lines.len(), 3 * 2 + 2);
        assert_eq!(lines[0], ";HEATING_PHASE");
        assert_eq!(lines[1], "G0 X1.050 Y-0.050");
        assert_eq!(lines[2], "G0 X-0.050 Y-0.050");
        assert_eq!(lines[3], "G0 X-0.050 Y0.500");
        assert_eq!(lines[4], "G0 X1.050 Y0.500");
        assert_eq!(lines[7], ";END_HEATING_PHASE");
    }
}
