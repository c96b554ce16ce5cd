//! Sheet configuration
//!
//! Every field has a default, so a partial TOML document (or none at all)
//! yields a usable configuration:
//!
//! ```toml
//! dims_background = true
//! start_index = 1
//!
//! [geometry]
//! handle_height = 20.0
//! top_inset = 44.0
//!
//! [spring]
//! damping_ratio = 0.8
//! response = 0.4
//!
//! [dismiss]
//! bottom = true
//! top = false
//! ```

use serde::{Deserialize, Serialize};
use sheet_animation::{SpringConfig, DEFAULT_REST_THRESHOLD};

use crate::error::Result;
use crate::geometry::Geometry;
use crate::target::DismissEdges;

/// Spring parameters for settle and dismiss animations
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringSettings {
    pub damping_ratio: f32,
    /// Period of the undamped oscillation in seconds
    pub response: f32,
    /// Distance and speed below which the sheet counts as settled
    pub rest_threshold: f32,
}

impl Default for SpringSettings {
    fn default() -> Self {
        Self {
            damping_ratio: 0.8,
            response: 0.4,
            rest_threshold: DEFAULT_REST_THRESHOLD,
        }
    }
}

impl SpringSettings {
    pub fn spring_config(&self) -> SpringConfig {
        SpringConfig::from_response(self.damping_ratio, self.response)
    }
}

/// Full sheet configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub geometry: Geometry,
    pub spring: SpringSettings,
    pub dismiss: DismissEdges,
    /// Fade a backdrop overlay with the sheet position
    pub dims_background: bool,
    /// Resting index on presentation; defaults to the bottom-most offset
    pub start_index: Option<usize>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            geometry: Geometry::default(),
            spring: SpringSettings::default(),
            dismiss: DismissEdges::default(),
            dims_background: true,
            start_index: None,
        }
    }
}

impl SheetConfig {
    /// Parse a configuration from TOML
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: SheetConfig = toml::from_str(source)?;
        tracing::debug!("Loaded sheet config: {:?}", config);
        Ok(config)
    }

    pub fn with_start_index(mut self, index: usize) -> Self {
        self.start_index = Some(index);
        self
    }

    pub fn with_dismiss(mut self, dismiss: DismissEdges) -> Self {
        self.dismiss = dismiss;
        self
    }

    pub fn with_dims_background(mut self, dims: bool) -> Self {
        self.dims_background = dims;
        self
    }
}
