//! Configuration
//!
//! Canvas geometry and crawl pacing, loaded from JSON. Every field has a
//! default, so `{}` is a complete config:
//!
//! ```json
//! {
//!   "layout": { "width": 3200, "height": 1800, "rowSpacing": 60 },
//!   "timing": { "revealIntervalMs": 120 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::crawl::ScheduleTiming;
use crate::error::ConfigError;
use crate::layout::LayoutOptions;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChronotreeConfig {
    pub layout: LayoutOptions,
    pub timing: ScheduleTiming,
}

impl ChronotreeConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Reject geometry that leaves no drawable area and out-of-order timings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let layout = &self.layout;
        let padding = &layout.padding;
        let finite = [
            layout.width,
            layout.height,
            padding.top,
            padding.right,
            padding.bottom,
            padding.left,
            layout.row_spacing,
            layout.sibling_separation,
            layout.cousin_separation,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid("layout values must be finite".into()));
        }
        if layout.width <= padding.left + padding.right {
            return Err(ConfigError::Invalid(format!(
                "width {} leaves no room inside horizontal padding {} + {}",
                layout.width, padding.left, padding.right
            )));
        }
        if layout.height <= 0.0 || layout.row_spacing < 0.0 {
            return Err(ConfigError::Invalid(
                "height must be positive and rowSpacing non-negative".into(),
            ));
        }
        if layout.sibling_separation <= 0.0 || layout.cousin_separation <= 0.0 {
            return Err(ConfigError::Invalid("separations must be positive".into()));
        }
        if !self.timing.is_ordered() {
            return Err(ConfigError::Invalid(format!(
                "timing offsets are out of order: {:?}",
                self.timing
            )));
        }
        Ok(())
    }
}
