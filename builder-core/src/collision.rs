//! Collision detection between a candidate placement and placed elements.
//!
//! Collisions are advisory: the detector never mutates anything and never
//! fails. The store decides what to do with the report.

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementId};
use crate::spatial::{resolve_dimension, Rect};

/// Outcome of a collision check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionReport {
    /// IDs of the elements the candidate overlaps, in list order.
    pub colliding: Vec<ElementId>,
}

impl CollisionReport {
    /// Whether the candidate overlaps anything.
    #[must_use]
    pub fn has_collision(&self) -> bool {
        !self.colliding.is_empty()
    }
}

/// Resolve an element's desktop rectangle against a container width.
///
/// Heights that are percentages resolve against the same container size;
/// `auto` resolves to zero so that unmeasured elements never collide.
#[must_use]
pub fn element_rect(element: &Element, container_width: f64) -> Rect {
    let x = resolve_dimension(element.position.x, container_width, Some(0.0));
    let y = resolve_dimension(element.position.y, container_width, Some(0.0));
    let width = resolve_dimension(element.size.width, container_width, Some(0.0));
    let height = resolve_dimension(element.size.height, container_width, Some(0.0));
    Rect::new(x, y, width, height)
}

/// Check a candidate rectangle against every element except `exclude`.
///
/// Elements with zero resolved width or height cannot collide.
#[must_use]
pub fn check_collision<E: AsRef<Element>>(
    candidate: &Rect,
    elements: &[E],
    exclude: Option<&ElementId>,
    container_width: f64,
) -> CollisionReport {
    let colliding = elements
        .iter()
        .map(AsRef::<Element>::as_ref)
        .filter(|element| Some(&element.id) != exclude)
        .filter(|element| {
            let rect = element_rect(element, container_width);
            rect.has_area() && candidate.intersects(&rect)
        })
        .map(|element| element.id.clone())
        .collect();
    CollisionReport { colliding }
}

/// Every overlapping pair in the list, each reported once.
#[must_use]
pub fn overlapping_pairs<E: AsRef<Element>>(
    elements: &[E],
    container_width: f64,
) -> Vec<(ElementId, ElementId)> {
    let rects: Vec<(&Element, Rect)> = elements
        .iter()
        .map(AsRef::<Element>::as_ref)
        .map(|element| (element, element_rect(element, container_width)))
        .filter(|(_, rect)| rect.has_area())
        .collect();

    let mut pairs = Vec::new();
    for (index, (first, first_rect)) in rects.iter().enumerate() {
        for (second, second_rect) in &rects[index + 1..] {
            if first_rect.intersects(second_rect) {
                pairs.push((first.id.clone(), second.id.clone()));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Dimension, ElementType, Position, Size};

    fn card(id: &str, x: f64, y: f64, width: f64, height: f64) -> Element {
        Element::new(ElementType::Card, Position::new(x, y))
            .with_id(id)
            .with_size(Size::px(width, height))
    }

    #[test]
    fn test_detects_overlap() {
        let elements = vec![card("a", 0.0, 0.0, 100.0, 100.0), card("b", 300.0, 0.0, 100.0, 100.0)];
        let report = check_collision(&Rect::new(50.0, 50.0, 100.0, 100.0), &elements, None, 1200.0);
        assert!(report.has_collision());
        assert_eq!(report.colliding, vec![ElementId::from("a")]);
    }

    #[test]
    fn test_excluded_element_is_ignored() {
        let elements = vec![card("a", 0.0, 0.0, 100.0, 100.0)];
        let id = ElementId::from("a");
        let report = check_collision(&Rect::new(10.0, 10.0, 50.0, 50.0), &elements, Some(&id), 1200.0);
        assert!(!report.has_collision());
    }

    #[test]
    fn test_adjacent_rectangles_do_not_collide() {
        let elements = vec![card("a", 0.0, 0.0, 100.0, 100.0)];
        let report = check_collision(&Rect::new(100.0, 0.0, 50.0, 50.0), &elements, None, 1200.0);
        assert!(!report.has_collision());
    }

    #[test]
    fn test_auto_height_never_collides() {
        let text = Element::new(ElementType::Text, Position::new(0.0, 0.0)).with_id("t");
        assert_eq!(text.size.height, Dimension::Auto);
        let report = check_collision(&Rect::new(0.0, 0.0, 500.0, 500.0), &[text], None, 1200.0);
        assert!(!report.has_collision());
    }

    #[test]
    fn test_percent_width_resolves_against_container() {
        let header = Element::new(ElementType::Header, Position::new(0.0, 0.0)).with_id("h");
        let report = check_collision(&Rect::new(700.0, 10.0, 50.0, 20.0), &[header.clone()], None, 800.0);
        assert!(report.has_collision());
        let report = check_collision(&Rect::new(900.0, 10.0, 50.0, 20.0), &[header], None, 800.0);
        assert!(!report.has_collision());
    }

    #[test]
    fn test_overlapping_pairs_reports_each_pair_once() {
        let elements = vec![
            card("a", 0.0, 0.0, 100.0, 100.0),
            card("b", 50.0, 50.0, 100.0, 100.0),
            card("c", 500.0, 500.0, 10.0, 10.0),
        ];
        let pairs = overlapping_pairs(&elements, 1200.0);
        assert_eq!(pairs, vec![(ElementId::from("a"), ElementId::from("b"))]);
    }
}
