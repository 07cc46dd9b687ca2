//! Spatial primitives: grid snapping, dimension resolution and rectangles.
//!
//! Everything here is pure and infallible. Malformed inputs resolve to safe
//! defaults instead of failing.

use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::element::Dimension;

/// Size used for `auto` dimensions when no measured size is available.
pub const FALLBACK_DIMENSION: f64 = 100.0;

/// Round a value to the nearest grid line. Halves round up, so `-10` on a
/// 20px grid lands on `0`.
///
/// A non-positive or non-finite grid size leaves the value unchanged.
#[must_use]
pub fn snap_to_grid(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 || !grid_size.is_finite() {
        return value;
    }
    (value / grid_size + 0.5).floor() * grid_size
}

/// Snap a point to the grid when snapping is enabled.
#[must_use]
pub fn snapped_position(x: f64, y: f64, grid: &GridConfig) -> (f64, f64) {
    if !grid.snap {
        return (x, y);
    }
    (snap_to_grid(x, grid.size), snap_to_grid(y, grid.size))
}

/// Resolve a dimension to pixels against a container size.
///
/// `auto` uses the measured natural size reported by the renderer when there
/// is one, otherwise [`FALLBACK_DIMENSION`].
#[must_use]
pub fn resolve_dimension(value: Dimension, container_size: f64, measured: Option<f64>) -> f64 {
    match value {
        Dimension::Px(px) if px.is_finite() => px,
        Dimension::Percent(percent) if percent.is_finite() => percent / 100.0 * container_size,
        Dimension::Auto => measured
            .filter(|m| m.is_finite())
            .unwrap_or(FALLBACK_DIMENSION),
        Dimension::Px(_) | Dimension::Percent(_) => FALLBACK_DIMENSION,
    }
}

/// Axis-aligned rectangle in resolved pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether the rectangle has a positive area.
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Strict overlap: touching edges do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Check if a point lies within the rectangle (edges inclusive).
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_grid_rounds_to_nearest() {
        assert!((snap_to_grid(29.0, 20.0) - 20.0).abs() < f64::EPSILON);
        assert!((snap_to_grid(31.0, 20.0) - 40.0).abs() < f64::EPSILON);
        assert!((snap_to_grid(-11.0, 20.0) + 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snap_to_grid_rounds_halves_up() {
        assert!((snap_to_grid(10.0, 20.0) - 20.0).abs() < f64::EPSILON);
        assert!(snap_to_grid(-10.0, 20.0).abs() < f64::EPSILON);
        assert!((snap_to_grid(-30.0, 20.0) + 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snap_to_grid_ignores_bad_grid() {
        assert!((snap_to_grid(13.0, 0.0) - 13.0).abs() < f64::EPSILON);
        assert!((snap_to_grid(13.0, -5.0) - 13.0).abs() < f64::EPSILON);
        assert!((snap_to_grid(13.0, f64::NAN) - 13.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snapped_position_respects_flag() {
        let mut grid = GridConfig::default();
        assert_eq!(snapped_position(33.0, 47.0, &grid), (40.0, 40.0));
        grid.snap = false;
        assert_eq!(snapped_position(33.0, 47.0, &grid), (33.0, 47.0));
    }

    #[test]
    fn test_resolve_dimension() {
        assert!((resolve_dimension(Dimension::Px(120.0), 1000.0, None) - 120.0).abs() < f64::EPSILON);
        assert!((resolve_dimension(Dimension::Percent(50.0), 800.0, None) - 400.0).abs() < f64::EPSILON);
        assert!((resolve_dimension(Dimension::Auto, 800.0, None) - FALLBACK_DIMENSION).abs() < f64::EPSILON);
        assert!((resolve_dimension(Dimension::Auto, 800.0, Some(64.0)) - 64.0).abs() < f64::EPSILON);
        assert!(
            (resolve_dimension(Dimension::Px(f64::INFINITY), 800.0, None) - FALLBACK_DIMENSION).abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn test_rect_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(100.0, 0.0, 100.0, 100.0);
        let c = Rect::new(99.0, 99.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
        assert!(c.intersects(&a));
    }

    #[test]
    fn test_rect_contains_point() {
        let rect = Rect::new(100.0, 100.0, 200.0, 50.0);
        assert!(rect.contains_point(150.0, 125.0));
        assert!(!rect.contains_point(50.0, 50.0));
    }
}
