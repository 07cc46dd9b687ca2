//! Canvas-wide configuration: grid, view mode and height ceilings.
//!
//! Configuration is global to the document and never enters undo history.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Window width below which the host should show the mobile view.
pub const TABLET_BREAKPOINT: f64 = 768.0;

/// Window width below which the host should show the tablet view.
pub const DESKTOP_BREAKPOINT: f64 = 1024.0;

/// One of the three canvas width classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    /// Full-width canvas; canonical geometry.
    #[default]
    Desktop,
    /// Medium canvas.
    Tablet,
    /// Narrow canvas.
    Mobile,
}

impl Viewport {
    /// Pick the view mode for a host window width.
    #[must_use]
    pub fn for_window_width(width: f64) -> Self {
        if width < TABLET_BREAKPOINT {
            Self::Mobile
        } else if width < DESKTOP_BREAKPOINT {
            Self::Tablet
        } else {
            Self::Desktop
        }
    }

    /// Width of the simulated canvas container for this viewport.
    #[must_use]
    pub const fn container_width(self) -> f64 {
        match self {
            Self::Desktop => 1200.0,
            Self::Tablet => 768.0,
            Self::Mobile => 375.0,
        }
    }

    /// Wire name of this viewport.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Tablet => "tablet",
            Self::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Viewport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" => Ok(Self::Desktop),
            "tablet" => Ok(Self::Tablet),
            "mobile" => Ok(Self::Mobile),
            other => Err(format!(
                "unknown viewport {other:?} (expected desktop, tablet or mobile)"
            )),
        }
    }
}

/// Grid overlay and snapping settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Whether the grid overlay is shown.
    pub enabled: bool,
    /// Grid cell size in pixels.
    pub size: f64,
    /// Whether placements snap to the grid.
    pub snap: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: 20.0,
            snap: true,
        }
    }
}

/// Canvas configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasConfig {
    /// Grid settings.
    #[serde(default)]
    pub grid: GridConfig,
    /// Active view mode.
    #[serde(default)]
    pub view_mode: Viewport,
    /// Hard ceiling for an element's bottom edge; placements beyond it are rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<f64>,
    /// Soft ceiling; placements beyond it succeed with a warning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_threshold: Option<f64>,
}

impl CanvasConfig {
    /// Merge a partial configuration into this one.
    pub fn apply(&mut self, patch: &ConfigPatch) {
        if let Some(grid) = &patch.grid {
            if let Some(enabled) = grid.enabled {
                self.grid.enabled = enabled;
            }
            if let Some(size) = grid.size {
                self.grid.size = size;
            }
            if let Some(snap) = grid.snap {
                self.grid.snap = snap;
            }
        }
        if let Some(view_mode) = patch.view_mode {
            self.view_mode = view_mode;
        }
        if let Some(max_height) = patch.max_height {
            self.max_height = max_height;
        }
        if let Some(warning_threshold) = patch.warning_threshold {
            self.warning_threshold = warning_threshold;
        }
    }
}

/// Partial grid settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridPatch {
    /// New overlay flag.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// New cell size.
    #[serde(default)]
    pub size: Option<f64>,
    /// New snapping flag.
    #[serde(default)]
    pub snap: Option<bool>,
}

/// Partial canvas configuration, merged with [`CanvasConfig::apply`].
///
/// The height ceilings use a nested option so a patch can clear them
/// (`Some(None)`) as well as set them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    /// Grid changes.
    #[serde(default)]
    pub grid: Option<GridPatch>,
    /// New view mode.
    #[serde(default)]
    pub view_mode: Option<Viewport>,
    /// New hard ceiling.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub max_height: Option<Option<f64>>,
    /// New soft ceiling.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub warning_threshold: Option<Option<f64>>,
}

impl ConfigPatch {
    /// Patch that only switches the view mode.
    #[must_use]
    pub fn view_mode(view_mode: Viewport) -> Self {
        Self {
            view_mode: Some(view_mode),
            ..Self::default()
        }
    }
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Option<f64>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Option<f64>>, D::Error> {
        Option::<f64>::deserialize(deserializer).map(Some)
    }
}
