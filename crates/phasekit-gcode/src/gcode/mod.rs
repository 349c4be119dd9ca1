//! G-code rewriting engine
//!
//! This module provides:
//! - Line classification into comments, motion, temperature and other lines
//! - Phase lookup and extrusion ratio derivation
//! - Pure per-line transforms (speed, extrusion, shift, temperature)
//! - External perimeter tracking and heating raster synthesis
//! - The streaming editor that ties them together

pub mod editor;
pub mod heating;
pub mod line;
pub mod perimeter;
pub mod phase;
pub mod transform;

pub use editor::*;
pub use heating::*;
pub use line::*;
pub use perimeter::*;
pub use phase::*;
pub use transform::*;
