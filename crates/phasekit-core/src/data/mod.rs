//! Data models for points, bounds and layers
//!
//! This module provides:
//! - 2D points sampled from motion lines
//! - Axis-aligned bounds over a set of points
//! - Layer information and streaming layer state

pub mod layer;

use serde::{Deserialize, Serialize};
use std::fmt;

/// XY coordinate read from or written to a motion line
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
}

impl Point2D {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{:.3} Y{:.3}", self.x, self.y)
    }
}

/// Axis-aligned bounding box in the XY plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds2D {
    /// Minimum X
    pub min_x: f64,
    /// Minimum Y
    pub min_y: f64,
    /// Maximum X
    pub max_x: f64,
    /// Maximum Y
    pub max_y: f64,
}

impl Bounds2D {
    /// Compute the bounds of a set of points
    ///
    /// Returns `None` when there are no points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2D>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in iter {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    /// Extent along X
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Extent along Y
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Grow each axis by `fraction` of its own extent on both sides
    pub fn expanded(&self, fraction: f64) -> Self {
        let dx = self.width() * fraction;
        let dy = self.height() * fraction;
        Self {
            min_x: self.min_x - dx,
            min_y: self.min_y - dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// Check whether a point lies inside the bounds (edges included)
    pub fn contains(&self, point: &Point2D) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}
