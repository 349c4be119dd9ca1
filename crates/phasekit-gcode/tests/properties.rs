//! Property tests for the phase locator and the heating raster

use phasekit_core::{Bounds2D, Point2D};
use phasekit_gcode::{locate_phase, HeatingPath};
use proptest::prelude::*;

/// Strictly increasing boundaries from 0 to 100
fn boundaries() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..20.0, 1..8).prop_map(|steps| {
        let total: f64 = steps.iter().sum();
        let mut acc = 0.0;
        let mut bounds = vec![0.0];
        for step in &steps[..steps.len() - 1] {
            acc += step;
            bounds.push(acc / total * 100.0);
        }
        bounds.push(100.0);
        bounds
    })
}

fn points() -> impl Strategy<Value = Vec<Point2D>> {
    prop::collection::vec((-200.0f64..200.0, -200.0f64..200.0), 1..40)
        .prop_map(|xy| xy.into_iter().map(|(x, y)| Point2D::new(x, y)).collect())
}

proptest! {
    #[test]
    fn located_phase_contains_height(bounds in boundaries(), height in 0.0f64..=100.0) {
        let position = locate_phase(height, &bounds);
        prop_assert!(position.index >= 1 && position.index < bounds.len());
        prop_assert!((0.0..=1.0).contains(&position.fraction));

        let low = bounds[position.index - 1];
        let high = bounds[position.index];
        let rebuilt = low + position.fraction * (high - low);
        prop_assert!((rebuilt - height).abs() < 1e-9);
    }

    #[test]
    fn heights_outside_range_have_no_phase(bounds in boundaries(), excess in 0.001f64..1000.0) {
        prop_assert!(locate_phase(-excess, &bounds).is_outside());
        prop_assert!(locate_phase(100.0 + excess, &bounds).is_outside());
    }

    #[test]
    fn raster_stays_in_expanded_box(samples in points()) {
        let path = HeatingPath::from_samples(&samples).unwrap();
        let bounds = Bounds2D::from_points(&samples).unwrap().expanded(0.05);
        let tolerance = 0.0005;

        prop_assert_eq!(path.upper.len(), path.lower.len());
        prop_assert_eq!(path.line_count(), (bounds.height() / 0.4).round() as usize);
        for point in path.moves() {
            prop_assert!(point.x >= bounds.min_x - tolerance && point.x <= bounds.max_x + tolerance);
            prop_assert!(point.y >= bounds.min_y - tolerance && point.y <= bounds.max_y + tolerance);
        }
    }
}
