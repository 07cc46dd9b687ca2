//! Pointer gestures: drag from the palette, move, and resize.
//!
//! The input collaborator reports `start → move* → end` (or `cancel`). The
//! [`GestureController`] turns those notifications into store mutations:
//! moves are applied without history inside a store transaction, `end` runs
//! the placement protocol and commits one undo step, and `cancel` aborts the
//! transaction so the element is back where it started.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collision::{check_collision, CollisionReport};
use crate::config::GridConfig;
use crate::element::{Dimension, Element, ElementId, ElementType, Position, Size};
use crate::error::{BuilderError, BuilderResult};
use crate::placement::{check_height, plan_placement, Candidate, PlacementContext, PlacementError, Pointer};
use crate::spatial::{resolve_dimension, snap_to_grid, Rect};
use crate::store::{BuilderStore, ElementPatch};

/// Smallest width a resize can produce.
pub const MIN_RESIZE_WIDTH: f64 = 50.0;

/// Smallest height a resize can produce.
pub const MIN_RESIZE_HEIGHT: f64 = 20.0;

/// Phase of a gesture notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GesturePhase {
    /// Pointer pressed.
    Start,
    /// Pointer dragged.
    Move,
    /// Pointer released.
    End,
    /// Gesture abandoned (escape key, lost capture).
    Cancel,
}

/// Pointer position in screen pixels relative to the canvas container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerSample {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
}

impl PointerSample {
    /// Create a pointer sample.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Edge or corner being dragged in a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    /// Top edge.
    N,
    /// Bottom edge.
    S,
    /// Right edge.
    E,
    /// Left edge.
    W,
    /// Top-right corner.
    Ne,
    /// Top-left corner.
    Nw,
    /// Bottom-right corner.
    Se,
    /// Bottom-left corner.
    Sw,
}

impl ResizeHandle {
    const fn north(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    const fn south(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    const fn east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    const fn west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    /// Whether the handle changes the width.
    #[must_use]
    pub const fn horizontal(self) -> bool {
        self.east() || self.west()
    }

    /// Whether the handle changes the height.
    #[must_use]
    pub const fn vertical(self) -> bool {
        self.north() || self.south()
    }
}

/// What a gesture manipulates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GestureTarget {
    /// A new element dragged in from the palette.
    NewElement {
        /// Type of the element being created.
        element_type: ElementType,
    },
    /// An existing element being moved.
    Move {
        /// The element.
        id: ElementId,
    },
    /// An existing element being resized.
    Resize {
        /// The element.
        id: ElementId,
        /// The handle being dragged.
        handle: ResizeHandle,
    },
}

/// A gesture notification from the input collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum GestureEvent {
    /// Pointer pressed on a target.
    Start {
        /// What is being manipulated.
        target: GestureTarget,
        /// Pointer position.
        pointer: PointerSample,
    },
    /// Pointer dragged.
    Move {
        /// Pointer position.
        pointer: PointerSample,
    },
    /// Pointer released.
    End {
        /// Pointer position.
        pointer: PointerSample,
    },
    /// Gesture abandoned.
    Cancel,
}

impl GestureEvent {
    /// The phase of this notification.
    #[must_use]
    pub const fn phase(&self) -> GesturePhase {
        match self {
            Self::Start { .. } => GesturePhase::Start,
            Self::Move { .. } => GesturePhase::Move,
            Self::End { .. } => GesturePhase::End,
            Self::Cancel => GesturePhase::Cancel,
        }
    }
}

/// What handling a notification did.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// A gesture began.
    Started,
    /// The element (or the drop preview) is now at `rect`.
    Updated {
        /// Current rectangle.
        rect: Rect,
        /// Elements the rectangle overlaps.
        collisions: CollisionReport,
    },
    /// The move was refused; the element keeps its last accepted geometry.
    Refused(PlacementError),
    /// The gesture committed.
    Committed {
        /// The element that was created, moved or resized.
        id: ElementId,
        /// Whether an undo step was recorded.
        recorded: bool,
    },
    /// The gesture was abandoned and the pre-gesture state restored.
    Cancelled,
    /// No gesture was in progress.
    Ignored,
}

#[derive(Debug, Clone)]
struct ActiveGesture {
    target: GestureTarget,
    start: PointerSample,
    origin: Rect,
}

impl ActiveGesture {
    fn opens_transaction(&self) -> bool {
        !matches!(self.target, GestureTarget::NewElement { .. })
    }

    fn delta(&self, pointer: PointerSample) -> Pointer {
        Pointer::Moved {
            dx: pointer.x - self.start.x,
            dy: pointer.y - self.start.y,
        }
    }
}

/// Drives store transactions from gesture notifications.
#[derive(Debug, Clone)]
pub struct GestureController {
    context: PlacementContext,
    active: Option<ActiveGesture>,
}

impl GestureController {
    /// Create a controller for the given placement context.
    #[must_use]
    pub const fn new(context: PlacementContext) -> Self {
        Self {
            context,
            active: None,
        }
    }

    /// Placement context used for every notification.
    #[must_use]
    pub const fn context(&self) -> &PlacementContext {
        &self.context
    }

    /// Replace the placement context (viewport switch, zoom change, new measurement).
    pub fn set_context(&mut self, context: PlacementContext) {
        self.context = context;
    }

    /// Whether a gesture is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Handle one notification.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::ElementNotFound`] when a gesture starts on an
    /// unknown element, [`BuilderError::Placement`] when the final placement is
    /// rejected (the gesture is rolled back), and
    /// [`BuilderError::InvalidOperation`] when the store already has a
    /// transaction open. A move notification that fails rolls the gesture
    /// back before returning the error.
    pub fn handle(&mut self, store: &mut BuilderStore, event: GestureEvent) -> BuilderResult<GestureOutcome> {
        match event {
            GestureEvent::Start { target, pointer } => self.start(store, target, pointer),
            GestureEvent::Move { pointer } => self.update(store, pointer).or_else(|error| {
                debug!(error = %error, "Gesture abandoned");
                self.cancel(store)?;
                Err(error)
            }),
            GestureEvent::End { pointer } => self.finish(store, pointer),
            GestureEvent::Cancel => self.cancel(store),
        }
    }

    fn start(
        &mut self,
        store: &mut BuilderStore,
        target: GestureTarget,
        pointer: PointerSample,
    ) -> BuilderResult<GestureOutcome> {
        if self.active.is_some() {
            debug!("New gesture started before the previous one ended");
            self.cancel(store)?;
        }

        let origin = match &target {
            GestureTarget::NewElement { element_type } => {
                let size = element_type.default_size();
                Rect::new(0.0, 0.0, self.width(size.width), self.height(size.height))
            }
            GestureTarget::Move { id } | GestureTarget::Resize { id, .. } => {
                let element = store
                    .get(id)
                    .ok_or_else(|| BuilderError::ElementNotFound(id.to_string()))?;
                self.resolved_rect(element)
            }
        };

        let gesture = ActiveGesture {
            target,
            start: pointer,
            origin,
        };
        if gesture.opens_transaction() {
            store.begin_transaction()?;
        }
        debug!(gesture = ?gesture.target, "Gesture started");
        self.active = Some(gesture);
        Ok(GestureOutcome::Started)
    }

    fn update(&mut self, store: &mut BuilderStore, pointer: PointerSample) -> BuilderResult<GestureOutcome> {
        let Some(gesture) = self.active.clone() else {
            return Ok(GestureOutcome::Ignored);
        };

        match &gesture.target {
            GestureTarget::NewElement { element_type } => {
                let candidate = Candidate {
                    element_type: *element_type,
                    origin: (0.0, 0.0),
                    size: element_type.default_size(),
                    exclude: None,
                };
                let pointer = Pointer::At {
                    x: pointer.x,
                    y: pointer.y,
                };
                match plan_placement(&candidate, pointer, store.elements(), store.config(), &self.context) {
                    Ok(plan) => Ok(GestureOutcome::Updated {
                        rect: plan.rect,
                        collisions: plan.collisions,
                    }),
                    Err(reason) => Ok(GestureOutcome::Refused(reason)),
                }
            }
            GestureTarget::Move { id } => {
                let element = store
                    .get(id)
                    .ok_or_else(|| BuilderError::ElementNotFound(id.to_string()))?;
                let candidate = Candidate {
                    element_type: element.element_type(),
                    origin: (gesture.origin.x, gesture.origin.y),
                    size: element.size,
                    exclude: Some(id),
                };
                let pointer = gesture.delta(pointer);
                match plan_placement(&candidate, pointer, store.elements(), store.config(), &self.context) {
                    Ok(plan) => {
                        store.update(id, ElementPatch::position(Position::new(plan.x, plan.y)), true)?;
                        Ok(GestureOutcome::Updated {
                            rect: plan.rect,
                            collisions: plan.collisions,
                        })
                    }
                    Err(reason) => Ok(GestureOutcome::Refused(reason)),
                }
            }
            GestureTarget::Resize { id, handle } => {
                let (dx, dy) = self.scaled_delta(&gesture, pointer);
                let rect = resize_rect(gesture.origin, *handle, dx, dy, &store.config().grid);
                apply_resize(store, id, *handle, rect)?;
                let collisions = check_collision(&rect, store.elements(), Some(id), self.context.container_width);
                Ok(GestureOutcome::Updated { rect, collisions })
            }
        }
    }

    fn finish(&mut self, store: &mut BuilderStore, pointer: PointerSample) -> BuilderResult<GestureOutcome> {
        let Some(gesture) = self.active.take() else {
            return Ok(GestureOutcome::Ignored);
        };

        let result = match &gesture.target {
            GestureTarget::NewElement { element_type } => {
                let pointer = Pointer::At {
                    x: pointer.x,
                    y: pointer.y,
                };
                return store
                    .place_new(*element_type, pointer, &self.context)
                    .map(|placed| GestureOutcome::Committed {
                        id: placed.id,
                        recorded: true,
                    });
            }
            GestureTarget::Move { id } => {
                let pointer = gesture.delta(pointer);
                store
                    .place_existing(id, (gesture.origin.x, gesture.origin.y), pointer, &self.context)
                    .map(|_| id)
            }
            GestureTarget::Resize { id, handle } => {
                let (dx, dy) = self.scaled_delta(&gesture, pointer);
                let rect = resize_rect(gesture.origin, *handle, dx, dy, &store.config().grid);
                check_height(rect.bottom(), store.config())
                    .map_err(BuilderError::from)
                    .and_then(|_| apply_resize(store, id, *handle, rect))
                    .map(|()| id)
            }
        };

        match result {
            Ok(id) => {
                let recorded = store.commit_transaction()?;
                debug!(id = %id, recorded, "Gesture committed");
                Ok(GestureOutcome::Committed {
                    id: id.clone(),
                    recorded,
                })
            }
            Err(error) => {
                store.abort_transaction()?;
                debug!(error = %error, "Gesture rolled back");
                Err(error)
            }
        }
    }

    fn cancel(&mut self, store: &mut BuilderStore) -> BuilderResult<GestureOutcome> {
        let Some(gesture) = self.active.take() else {
            return Ok(GestureOutcome::Ignored);
        };
        if gesture.opens_transaction() {
            store.abort_transaction()?;
        }
        debug!(gesture = ?gesture.target, "Gesture cancelled");
        Ok(GestureOutcome::Cancelled)
    }

    fn scaled_delta(&self, gesture: &ActiveGesture, pointer: PointerSample) -> (f64, f64) {
        let zoom = if self.context.zoom.is_finite() && self.context.zoom > 0.0 {
            self.context.zoom
        } else {
            1.0
        };
        (
            (pointer.x - gesture.start.x) / zoom,
            (pointer.y - gesture.start.y) / zoom,
        )
    }

    fn width(&self, width: Dimension) -> f64 {
        resolve_dimension(width, self.context.container_width, self.context.measured.width)
    }

    fn height(&self, height: Dimension) -> f64 {
        resolve_dimension(height, self.context.container_width, self.context.measured.height)
    }

    fn resolved_rect(&self, element: &Element) -> Rect {
        let Size { width, height } = element.size;
        Rect::new(
            resolve_dimension(element.position.x, self.context.container_width, Some(0.0)),
            resolve_dimension(element.position.y, self.context.container_width, Some(0.0)),
            self.width(width),
            self.height(height),
        )
    }
}

fn apply_resize(
    store: &mut BuilderStore,
    id: &ElementId,
    handle: ResizeHandle,
    rect: Rect,
) -> BuilderResult<()> {
    let element = store
        .get(id)
        .ok_or_else(|| BuilderError::ElementNotFound(id.to_string()))?;

    let mut position = element.position;
    let mut size = element.size;
    if handle.horizontal() {
        size.width = Dimension::Px(rect.width);
    }
    if handle.vertical() {
        size.height = Dimension::Px(rect.height);
    }
    if handle.west() {
        position.x = Dimension::Px(rect.x);
    }
    if handle.north() {
        position.y = Dimension::Px(rect.y);
    }

    let patch = ElementPatch {
        position: Some(position),
        size: Some(size),
        ..ElementPatch::default()
    };
    store.update(id, patch, true)
}

/// Apply a resize drag to a rectangle.
///
/// Only the edges being dragged move and snap; the result is never smaller
/// than [`MIN_RESIZE_WIDTH`] x [`MIN_RESIZE_HEIGHT`].
#[must_use]
pub fn resize_rect(origin: Rect, handle: ResizeHandle, dx: f64, dy: f64, grid: &GridConfig) -> Rect {
    let mut rect = origin;
    if handle.east() {
        rect.width = origin.width + dx;
    }
    if handle.west() {
        rect.width = origin.width - dx;
        rect.x = origin.x + dx;
    }
    if handle.south() {
        rect.height = origin.height + dy;
    }
    if handle.north() {
        rect.height = origin.height - dy;
        rect.y = origin.y + dy;
    }

    if grid.snap {
        if handle.horizontal() {
            rect.width = snap_to_grid(rect.width, grid.size);
        }
        if handle.vertical() {
            rect.height = snap_to_grid(rect.height, grid.size);
        }
        if handle.west() {
            rect.x = snap_to_grid(rect.x, grid.size);
        }
        if handle.north() {
            rect.y = snap_to_grid(rect.y, grid.size);
        }
    }

    rect.width = rect.width.max(MIN_RESIZE_WIDTH);
    rect.height = rect.height.max(MIN_RESIZE_HEIGHT);
    rect
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasConfig;

    fn setup() -> (BuilderStore, GestureController, ElementId) {
        let mut store = BuilderStore::new();
        let id = store.add(ElementType::Card, Position::new(100.0, 100.0));
        let controller = GestureController::new(PlacementContext::new(1200.0));
        (store, controller, id)
    }

    fn start(target: GestureTarget) -> GestureEvent {
        GestureEvent::Start {
            target,
            pointer: PointerSample::new(500.0, 500.0),
        }
    }

    fn at(x: f64, y: f64) -> PointerSample {
        PointerSample::new(x, y)
    }

    #[test]
    fn test_failed_move_rolls_back_gesture() {
        let (mut store, mut controller, id) = setup();
        controller
            .handle(&mut store, start(GestureTarget::Move { id: id.clone() }))
            .expect("start");
        store.remove(&id).expect("remove mid-gesture");

        let result = controller.handle(&mut store, GestureEvent::Move { pointer: at(540.0, 540.0) });

        assert!(matches!(result, Err(BuilderError::ElementNotFound(_))));
        assert!(!controller.is_active());
        assert!(!store.in_transaction());
        assert_eq!(store.get(&id).map(|e| e.position), Some(Position::new(100.0, 100.0)));

        store.add(ElementType::Text, Position::new(0.0, 600.0));
        assert!(store.undo(), "undo works again once the gesture is gone");
    }

    #[test]
    fn test_drag_commits_one_undo_step() {
        let (mut store, mut controller, id) = setup();
        let depth = store.history().undo_depth();

        controller
            .handle(&mut store, start(GestureTarget::Move { id: id.clone() }))
            .expect("start");
        for step in 1..=4 {
            let offset = f64::from(step) * 20.0;
            let outcome = controller
                .handle(&mut store, GestureEvent::Move { pointer: at(500.0 + offset, 500.0) })
                .expect("move");
            assert!(matches!(outcome, GestureOutcome::Updated { .. }));
        }
        let outcome = controller
            .handle(&mut store, GestureEvent::End { pointer: at(600.0, 540.0) })
            .expect("end");

        assert_eq!(
            outcome,
            GestureOutcome::Committed {
                id: id.clone(),
                recorded: true
            }
        );
        assert_eq!(store.get(&id).map(|e| e.position), Some(Position::new(200.0, 140.0)));
        assert_eq!(store.history().undo_depth(), depth + 1);

        assert!(store.undo());
        assert_eq!(store.get(&id).map(|e| e.position), Some(Position::new(100.0, 100.0)));
    }

    #[test]
    fn test_cancel_restores_pre_gesture_position() {
        let (mut store, mut controller, id) = setup();
        let depth = store.history().undo_depth();

        controller
            .handle(&mut store, start(GestureTarget::Move { id: id.clone() }))
            .expect("start");
        controller
            .handle(&mut store, GestureEvent::Move { pointer: at(700.0, 700.0) })
            .expect("move");
        assert_eq!(store.get(&id).map(|e| e.position), Some(Position::new(300.0, 300.0)));

        let outcome = controller.handle(&mut store, GestureEvent::Cancel).expect("cancel");
        assert_eq!(outcome, GestureOutcome::Cancelled);
        assert_eq!(store.get(&id).map(|e| e.position), Some(Position::new(100.0, 100.0)));
        assert_eq!(store.history().undo_depth(), depth);
        assert!(!store.in_transaction());
    }

    #[test]
    fn test_rejected_drop_rolls_back() {
        let (mut store, mut controller, id) = setup();
        store.set_config(&crate::config::ConfigPatch {
            max_height: Some(Some(1000.0)),
            ..crate::config::ConfigPatch::default()
        });

        controller
            .handle(&mut store, start(GestureTarget::Move { id: id.clone() }))
            .expect("start");
        controller
            .handle(&mut store, GestureEvent::Move { pointer: at(500.0, 600.0) })
            .expect("move");
        let refused = controller
            .handle(&mut store, GestureEvent::Move { pointer: at(500.0, 1500.0) })
            .expect("move");
        assert!(matches!(refused, GestureOutcome::Refused(_)));
        assert_eq!(store.get(&id).map(|e| e.position), Some(Position::new(100.0, 200.0)));

        let result = controller.handle(&mut store, GestureEvent::End { pointer: at(500.0, 1500.0) });
        assert!(matches!(result, Err(BuilderError::Placement(_))));
        assert_eq!(store.get(&id).map(|e| e.position), Some(Position::new(100.0, 100.0)));
        assert!(!controller.is_active());
    }

    #[test]
    fn test_palette_drop_adds_element() {
        let mut store = BuilderStore::new();
        let mut controller = GestureController::new(PlacementContext::new(1200.0));

        controller
            .handle(
                &mut store,
                start(GestureTarget::NewElement {
                    element_type: ElementType::Card,
                }),
            )
            .expect("start");
        let preview = controller
            .handle(&mut store, GestureEvent::Move { pointer: at(215.0, 95.0) })
            .expect("move");
        assert!(matches!(preview, GestureOutcome::Updated { .. }));
        assert!(store.is_empty(), "previews do not touch the document");

        let outcome = controller
            .handle(&mut store, GestureEvent::End { pointer: at(215.0, 95.0) })
            .expect("end");
        let GestureOutcome::Committed { id, recorded } = outcome else {
            panic!("expected a commit, got {outcome:?}");
        };
        assert!(recorded);
        assert_eq!(store.get(&id).map(|e| e.position), Some(Position::new(220.0, 100.0)));
        assert_eq!(store.selected_id(), Some(&id));
    }

    #[test]
    fn test_resize_from_corner() {
        let (mut store, mut controller, id) = setup();

        controller
            .handle(
                &mut store,
                start(GestureTarget::Resize {
                    id: id.clone(),
                    handle: ResizeHandle::Nw,
                }),
            )
            .expect("start");
        controller
            .handle(&mut store, GestureEvent::End { pointer: at(437.0, 463.0) })
            .expect("end");

        let element = store.get(&id).expect("element");
        assert_eq!(element.position, Position::new(40.0, 60.0));
        assert_eq!(element.size, Size::px(360.0, 380.0));
    }

    #[test]
    fn test_resize_keeps_untouched_axis() {
        let mut store = BuilderStore::new();
        let id = store.add(ElementType::Text, Position::new(0.0, 0.0));
        let mut controller = GestureController::new(PlacementContext::new(1200.0));

        controller
            .handle(
                &mut store,
                start(GestureTarget::Resize {
                    id: id.clone(),
                    handle: ResizeHandle::E,
                }),
            )
            .expect("start");
        controller
            .handle(&mut store, GestureEvent::End { pointer: at(600.0, 900.0) })
            .expect("end");

        let size = store.get(&id).expect("element").size;
        assert_eq!(size.width, Dimension::Px(500.0));
        assert_eq!(size.height, Dimension::Auto);
    }

    #[test]
    fn test_resize_rect_minimum_size() {
        let grid = CanvasConfig::default().grid;
        let rect = resize_rect(Rect::new(0.0, 0.0, 100.0, 100.0), ResizeHandle::Se, -500.0, -500.0, &grid);
        assert!((rect.width - MIN_RESIZE_WIDTH).abs() < f64::EPSILON);
        assert!((rect.height - MIN_RESIZE_HEIGHT).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_rect_snaps_dragged_edges_only() {
        let grid = GridConfig::default();
        let rect = resize_rect(Rect::new(13.0, 7.0, 101.0, 99.0), ResizeHandle::E, 12.0, 0.0, &grid);
        assert!((rect.width - 120.0).abs() < f64::EPSILON);
        assert!((rect.height - 99.0).abs() < f64::EPSILON);
        assert!((rect.x - 13.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_events_without_gesture_are_ignored() {
        let (mut store, mut controller, _) = setup();
        let outcome = controller
            .handle(&mut store, GestureEvent::Move { pointer: at(1.0, 1.0) })
            .expect("move");
        assert_eq!(outcome, GestureOutcome::Ignored);
        assert_eq!(
            controller.handle(&mut store, GestureEvent::Cancel).expect("cancel"),
            GestureOutcome::Ignored
        );
    }

    #[test]
    fn test_event_wire_shape() {
        let event: GestureEvent = serde_json::from_str(
            r#"{"phase":"start","target":{"kind":"resize","id":"a","handle":"se"},"pointer":{"x":1,"y":2}}"#,
        )
        .expect("parse");
        assert_eq!(event.phase(), GesturePhase::Start);
    }
}
