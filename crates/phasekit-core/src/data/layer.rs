//! Layer information and streaming layer state

use serde::{Deserialize, Serialize};

use crate::error::LayerError;

/// Result of the layer scan over a G-code file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    /// Layer height declared by the slicer (mm), 0 when absent
    pub layer_height: f64,
    /// Estimated printed height (mm)
    pub total_height: f64,
    /// Number of layer change markers
    pub total_layers: u32,
}

impl LayerInfo {
    /// Build layer information, rejecting files without any layer
    pub fn new(
        layer_height: f64,
        total_layers: u32,
        source_name: impl Into<String>,
    ) -> Result<Self, LayerError> {
        if total_layers == 0 {
            return Err(LayerError::MissingLayerMarker {
                source_name: source_name.into(),
            });
        }
        Ok(Self {
            layer_height,
            total_height: layer_height * total_layers as f64,
            total_layers,
        })
    }

    /// Height percentage of a layer counter
    pub fn height_pct(&self, layer_counter: u32) -> f64 {
        layer_counter as f64 / self.total_layers as f64 * 100.0
    }
}

/// Layer-scoped state owned by the streaming editor
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerState {
    /// Number of layer changes seen so far
    pub layer_counter: u32,
    /// Height percentage of the current layer
    pub height_pct: f64,
    /// Phase the current layer falls in (0 when outside every phase)
    pub phase_index: usize,
    /// Progress through the current phase (0..=1)
    pub phase_fraction: f64,
}

impl LayerState {
    /// Create the state at the start of a file, before any layer change
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to the next layer and recompute the height percentage
    pub fn advance(&mut self, info: &LayerInfo) -> Result<(), LayerError> {
        let next = self.layer_counter + 1;
        if next > info.total_layers {
            return Err(LayerError::LayerOverflow {
                layer: next,
                total: info.total_layers,
            });
        }
        self.layer_counter = next;
        self.height_pct = info.height_pct(next);
        Ok(())
    }

    /// Record the phase position of the current layer
    pub fn set_phase(&mut self, index: usize, fraction: f64) {
        self.phase_index = index;
        self.phase_fraction = fraction;
    }

    /// Height percentage of the layer after the current one
    pub fn upcoming_height_pct(&self, info: &LayerInfo) -> f64 {
        info.height_pct(self.layer_counter + 1)
    }

    /// True until the first layer change has been seen
    pub fn before_first_layer(&self) -> bool {
        self.layer_counter == 0
    }
}
