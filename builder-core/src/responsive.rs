//! Responsive layout resolver.
//!
//! Derives per-viewport layout overrides from the canonical desktop layout.
//! Nothing here mutates elements; callers recompute whenever the element list
//! or the viewport changes.
//!
//! ## Flow layout (tablet and mobile)
//!
//! ```text
//!  desktop                       tablet / mobile
//! ┌──────────────────────┐      ┌────────────┐
//! │ header               │      │ header     │
//! │ [card] [card] [card] │  →   │ card │card │   50% widths pack in pairs
//! │ text          slider │      │ card       │
//! └──────────────────────┘      │ text       │
//!                               │ slider     │
//!                               └────────────┘
//! ```
//!
//! Elements are ordered top to bottom in rows (a row is everything within
//! [`ROW_TOLERANCE`] of the row's first element), left to right inside a row,
//! then stacked with [`FLOW_GAP`] between them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::Viewport;
use crate::element::{Dimension, Element, ElementId};
use crate::spatial::resolve_dimension;

/// Vertical distance within which elements count as the same row.
pub const ROW_TOLERANCE: f64 = 10.0;

/// Vertical gap between stacked elements.
pub const FLOW_GAP: f64 = 20.0;

/// Height used for flow advancement when nothing numeric is known.
pub const DEFAULT_FLOW_HEIGHT: f64 = 200.0;

/// Window width below which the simple single-column stack is used.
pub const PHONE_BREAKPOINT: f64 = 480.0;

/// Derived geometry for one element on one viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutOverride {
    /// Element this override belongs to.
    pub id: ElementId,
    /// Left offset (`0` or `50%`).
    pub x: Dimension,
    /// Top offset in pixels.
    pub y: f64,
    /// Width.
    pub width: Dimension,
    /// Height; may stay `auto` for the renderer to measure.
    pub height: Dimension,
}

/// Fully resolved geometry for one element on one viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Left offset.
    pub x: Dimension,
    /// Top offset.
    pub y: Dimension,
    /// Width.
    pub width: Dimension,
    /// Height.
    pub height: Dimension,
}

/// What the rendering collaborator receives for each element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderBox {
    /// Element identifier.
    pub id: ElementId,
    /// Left offset.
    pub left: Dimension,
    /// Top offset.
    pub top: Dimension,
    /// Width.
    pub width: Dimension,
    /// Height.
    pub height: Dimension,
    /// Paint order.
    pub z_index: i32,
}

fn desktop_x(element: &Element) -> f64 {
    resolve_dimension(
        element.position.x,
        Viewport::Desktop.container_width(),
        Some(0.0),
    )
}

fn desktop_y(element: &Element) -> f64 {
    element.position.y.as_px().filter(|y| y.is_finite()).unwrap_or(0.0)
}

/// Order elements into rows: by `y`, rows within tolerance ordered by `x`.
fn flow_order<'a>(elements: &[&'a Element]) -> Vec<&'a Element> {
    let mut by_y: Vec<&Element> = elements.to_vec();
    by_y.sort_by(|a, b| desktop_y(a).total_cmp(&desktop_y(b)));

    let mut ordered = Vec::with_capacity(by_y.len());
    let mut row: Vec<&Element> = Vec::new();
    let mut row_top = f64::NEG_INFINITY;
    for element in by_y {
        let y = desktop_y(element);
        if y - row_top >= ROW_TOLERANCE {
            row.sort_by(|a, b| desktop_x(a).total_cmp(&desktop_x(b)));
            ordered.append(&mut row);
            row_top = y;
        }
        row.push(element);
    }
    row.sort_by(|a, b| desktop_x(a).total_cmp(&desktop_x(b)));
    ordered.append(&mut row);
    ordered
}

/// Pixel height to advance the flow cursor by.
fn advance_height(chosen: Dimension, element: &Element) -> f64 {
    chosen
        .as_px()
        .or_else(|| element.size.height.as_px())
        .filter(|h| h.is_finite())
        .unwrap_or(DEFAULT_FLOW_HEIGHT)
}

fn flow_width(element: &Element, viewport: Viewport) -> Dimension {
    element
        .responsive
        .for_viewport(viewport)
        .and_then(|o| o.width)
        .or_else(|| {
            element
                .element_type()
                .default_override(viewport)
                .and_then(|o| o.width)
        })
        .unwrap_or(Dimension::FULL)
}

fn flow_height(element: &Element, viewport: Viewport) -> Dimension {
    element
        .responsive
        .for_viewport(viewport)
        .and_then(|o| o.height)
        .or_else(|| {
            element
                .element_type()
                .default_override(viewport)
                .and_then(|o| o.height)
        })
        .or_else(|| element.size.height.as_px().map(Dimension::Px))
        .unwrap_or(Dimension::Px(DEFAULT_FLOW_HEIGHT))
}

/// Compute the auto-stacking flow layout for a tablet or mobile viewport.
///
/// Elements with an explicit responsive `y` for the viewport are pinned and
/// receive no override; the flow continues below them. Desktop yields no
/// overrides.
#[must_use]
pub fn resolve_layout<E: AsRef<Element>>(elements: &[E], viewport: Viewport) -> Vec<LayoutOverride> {
    if viewport == Viewport::Desktop {
        return Vec::new();
    }
    let container = viewport.container_width();
    let refs: Vec<&Element> = elements.iter().map(AsRef::<Element>::as_ref).collect();

    let mut overrides = Vec::with_capacity(refs.len());
    let mut current_y = 0.0_f64;
    let mut row_height = 0.0_f64;
    let mut column = 0_usize;

    for element in flow_order(&refs) {
        let instance = element.responsive.for_viewport(viewport);

        if let Some(pinned_y) = instance.and_then(|o| o.y) {
            if column > 0 {
                current_y += row_height + FLOW_GAP;
                column = 0;
                row_height = 0.0;
            }
            let top = resolve_dimension(pinned_y, container, Some(0.0));
            let height = advance_height(flow_height(element, viewport), element);
            current_y = current_y.max(top + height + FLOW_GAP);
            continue;
        }

        let width = flow_width(element, viewport);
        let height = flow_height(element, viewport);
        let advance = advance_height(height, element);

        let (x, y) = if width == Dimension::HALF {
            let y = current_y;
            if column == 0 {
                column = 1;
                row_height = advance;
                (Dimension::Px(0.0), y)
            } else {
                row_height = row_height.max(advance);
                current_y += row_height + FLOW_GAP;
                column = 0;
                row_height = 0.0;
                (Dimension::HALF, y)
            }
        } else {
            if column > 0 {
                current_y += row_height + FLOW_GAP;
                column = 0;
                row_height = 0.0;
            }
            let y = current_y;
            current_y += advance + FLOW_GAP;
            (Dimension::Px(0.0), y)
        };

        overrides.push(LayoutOverride {
            id: element.id.clone(),
            x,
            y,
            width,
            height,
        });
    }

    overrides
}

/// Single-column stack for phone-width windows.
///
/// Sorted by desktop `y` only; every element is full width at `x = 0`, placed
/// below the previous one. Per-type responsive overrides are ignored.
#[must_use]
pub fn stack_layout<E: AsRef<Element>>(elements: &[E]) -> Vec<LayoutOverride> {
    let mut sorted: Vec<&Element> = elements.iter().map(AsRef::<Element>::as_ref).collect();
    sorted.sort_by(|a, b| desktop_y(a).total_cmp(&desktop_y(b)));

    let mut current_y = 0.0_f64;
    sorted
        .into_iter()
        .map(|element| {
            let height = element.size.height;
            let y = current_y;
            current_y += advance_height(height, element) + FLOW_GAP;
            LayoutOverride {
                id: element.id.clone(),
                x: Dimension::Px(0.0),
                y,
                width: Dimension::FULL,
                height,
            }
        })
        .collect()
}

/// Pick the resolver for a viewport and host window width.
#[must_use]
pub fn resolve_for_window<E: AsRef<Element>>(
    elements: &[E],
    viewport: Viewport,
    window_width: f64,
) -> Vec<LayoutOverride> {
    if viewport == Viewport::Desktop {
        Vec::new()
    } else if window_width < PHONE_BREAKPOINT {
        stack_layout(elements)
    } else {
        resolve_layout(elements, viewport)
    }
}

/// Resolve one element's geometry.
///
/// Priority per field: instance override, type default override, computed
/// flow override, desktop value.
#[must_use]
pub fn effective_geometry(
    element: &Element,
    viewport: Viewport,
    computed: Option<&LayoutOverride>,
) -> Geometry {
    let instance = element.responsive.for_viewport(viewport).copied().unwrap_or_default();
    let type_default = element
        .element_type()
        .default_override(viewport)
        .unwrap_or_default();

    Geometry {
        x: instance
            .x
            .or(type_default.x)
            .or(computed.map(|c| c.x))
            .unwrap_or(element.position.x),
        y: instance
            .y
            .or(type_default.y)
            .or(computed.map(|c| Dimension::Px(c.y)))
            .unwrap_or(element.position.y),
        width: instance
            .width
            .or(type_default.width)
            .or(computed.map(|c| c.width))
            .unwrap_or(element.size.width),
        height: instance
            .height
            .or(type_default.height)
            .or(computed.map(|c| c.height))
            .unwrap_or(element.size.height),
    }
}

/// Boxes for the rendering collaborator, in paint order.
///
/// Paint order is ascending `z_index`; ties keep list order.
#[must_use]
pub fn render_boxes<E: AsRef<Element>>(
    elements: &[E],
    viewport: Viewport,
    window_width: f64,
) -> Vec<RenderBox> {
    let stacked = viewport != Viewport::Desktop && window_width < PHONE_BREAKPOINT;
    let computed: HashMap<ElementId, LayoutOverride> =
        resolve_for_window(elements, viewport, window_width)
            .into_iter()
            .map(|o| (o.id.clone(), o))
            .collect();

    let mut boxes: Vec<RenderBox> = elements
        .iter()
        .map(AsRef::<Element>::as_ref)
        .map(|element| {
            let layout = computed.get(&element.id);
            let geometry = match layout {
                Some(layout) if stacked => Geometry {
                    x: layout.x,
                    y: Dimension::Px(layout.y),
                    width: layout.width,
                    height: layout.height,
                },
                _ => effective_geometry(element, viewport, layout),
            };
            RenderBox {
                id: element.id.clone(),
                left: geometry.x,
                top: geometry.y,
                width: geometry.width,
                height: geometry.height,
                z_index: element.z_index,
            }
        })
        .collect();
    boxes.sort_by_key(|b| b.z_index);
    boxes
}
