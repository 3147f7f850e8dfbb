//! Configuration options for detgeom.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Global configuration options.
///
/// Missing fields take their default value when read from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Snap committed drag positions to multiples of this many millimeters
    /// (0.0 = disabled).
    pub snap_translate: f64,

    /// Snap committed drag rotations to multiples of this many degrees
    /// (0.0 = disabled).
    pub snap_rotate: f64,

    /// Whether volumes placed in the world frame because of a broken mother
    /// reference are logged at `warn` level. Otherwise they go to `debug`.
    pub warn_on_fallback: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            snap_translate: 0.0,
            snap_rotate: 0.0,
            warn_on_fallback: true,
        }
    }
}

impl Options {
    /// Reads options from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes options as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Sets the translation snap step in millimeters.
    #[must_use]
    pub fn with_snap_translate(mut self, snap: f64) -> Self {
        self.snap_translate = snap;
        self
    }

    /// Sets the rotation snap step in degrees.
    #[must_use]
    pub fn with_snap_rotate(mut self, snap_degrees: f64) -> Self {
        self.snap_rotate = snap_degrees;
        self
    }
}
