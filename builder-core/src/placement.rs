//! Placement protocol for drops and committed moves.
//!
//! Turns a pointer position (or a drag delta) into canvas coordinates,
//! applies snapping and clamping, and checks the result against the canvas
//! height ceilings. Nothing here mutates the document.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collision::{check_collision, CollisionReport};
use crate::config::CanvasConfig;
use crate::element::{Element, ElementId, ElementType, Size};
use crate::spatial::{resolve_dimension, snapped_position, Rect};

/// Natural size measured by the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MeasuredSize {
    /// Measured width, if reported.
    pub width: Option<f64>,
    /// Measured height, if reported.
    pub height: Option<f64>,
}

/// Where the placement happens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementContext {
    /// Width of the active viewport's container.
    pub container_width: f64,
    /// Zoom scale of the canvas; screen values are divided by it.
    pub zoom: f64,
    /// Natural size for `auto` dimensions.
    #[serde(default)]
    pub measured: MeasuredSize,
}

impl PlacementContext {
    /// Context for a container at zoom 1 with nothing measured.
    #[must_use]
    pub fn new(container_width: f64) -> Self {
        Self {
            container_width,
            zoom: 1.0,
            measured: MeasuredSize::default(),
        }
    }

    /// Set the zoom scale.
    #[must_use]
    pub const fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// Set the measured natural size.
    #[must_use]
    pub const fn with_measured(mut self, measured: MeasuredSize) -> Self {
        self.measured = measured;
        self
    }

    fn scale(&self) -> f64 {
        if self.zoom.is_finite() && self.zoom > 0.0 {
            self.zoom
        } else {
            1.0
        }
    }
}

/// Pointer input for a placement, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Pointer {
    /// Drop at a point relative to the container's top-left corner.
    At {
        /// Horizontal offset.
        x: f64,
        /// Vertical offset.
        y: f64,
    },
    /// Drag by a delta from the element's starting position.
    Moved {
        /// Horizontal delta.
        dx: f64,
        /// Vertical delta.
        dy: f64,
    },
}

/// The element being placed.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Type of the element; headers always land at the origin.
    pub element_type: ElementType,
    /// Canvas-space top-left corner before the drag.
    pub origin: (f64, f64),
    /// Size of the element.
    pub size: Size,
    /// The element itself, when it is already in the document.
    pub exclude: Option<&'a ElementId>,
}

/// Non-fatal observations about an accepted placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlacementWarning {
    /// The bottom edge passed the soft height ceiling.
    NearMaxHeight {
        /// Bottom edge of the placed element.
        bottom: f64,
        /// Configured soft ceiling.
        threshold: f64,
    },
}

/// An accepted placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementPlan {
    /// Final left edge.
    pub x: f64,
    /// Final top edge.
    pub y: f64,
    /// Resolved rectangle at the final position.
    pub rect: Rect,
    /// Elements the rectangle overlaps; advisory only.
    pub collisions: CollisionReport,
    /// Soft-limit warnings.
    pub warnings: Vec<PlacementWarning>,
}

/// Reasons a placement is refused.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PlacementError {
    /// The bottom edge passed the hard height ceiling.
    #[error("element bottom {bottom} exceeds the canvas maximum height {max_height}")]
    ExceedsMaxHeight {
        /// Bottom edge of the rejected element.
        bottom: f64,
        /// Configured hard ceiling.
        max_height: f64,
    },
}

/// Check a bottom edge against the configured ceilings.
///
/// # Errors
///
/// Returns [`PlacementError::ExceedsMaxHeight`] when `bottom` is past `maxHeight`.
pub fn check_height(bottom: f64, config: &CanvasConfig) -> Result<Vec<PlacementWarning>, PlacementError> {
    if let Some(max_height) = config.max_height {
        if bottom > max_height {
            return Err(PlacementError::ExceedsMaxHeight { bottom, max_height });
        }
    }
    let mut warnings = Vec::new();
    if let Some(threshold) = config.warning_threshold {
        if bottom > threshold {
            warnings.push(PlacementWarning::NearMaxHeight { bottom, threshold });
        }
    }
    Ok(warnings)
}

/// Compute where a candidate lands.
///
/// # Errors
///
/// Returns [`PlacementError`] when the landing rectangle breaks the hard
/// height ceiling.
pub fn plan_placement<E: AsRef<Element>>(
    candidate: &Candidate<'_>,
    pointer: Pointer,
    elements: &[E],
    config: &CanvasConfig,
    context: &PlacementContext,
) -> Result<PlacementPlan, PlacementError> {
    let scale = context.scale();
    let (raw_x, raw_y) = match pointer {
        Pointer::At { x, y } => (x / scale, y / scale),
        Pointer::Moved { dx, dy } => (candidate.origin.0 + dx / scale, candidate.origin.1 + dy / scale),
    };
    let (x, y) = snapped_position(finite_or_zero(raw_x), finite_or_zero(raw_y), &config.grid);

    let width = resolve_dimension(
        candidate.size.width,
        context.container_width,
        context.measured.width,
    );
    let height = resolve_dimension(
        candidate.size.height,
        context.container_width,
        context.measured.height,
    );

    let (x, y) = if candidate.element_type == ElementType::Header {
        (0.0, 0.0)
    } else {
        let max_x = (context.container_width - width).max(0.0);
        (x.clamp(0.0, max_x), y.max(0.0))
    };

    let rect = Rect::new(x, y, width, height);
    let warnings = check_height(rect.bottom(), config)?;
    let collisions = check_collision(&rect, elements, candidate.exclude, context.container_width);

    Ok(PlacementPlan {
        x,
        y,
        rect,
        collisions,
        warnings,
    })
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
