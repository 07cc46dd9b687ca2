//! Document store: the single writer of the canonical element list.
//!
//! [`BuilderStore`] owns the element list, the selection cursor, canvas
//! configuration and the undo/redo history. Every user action goes through
//! it. Geometry is stored exactly as given; nothing here resolves layout.
//!
//! ## History
//!
//! Structural mutations push the pre-mutation list onto the undo stack and
//! clear the redo stack. `update` can skip that step, which is how drag
//! previews avoid flooding history. A transaction groups any number of
//! mutations into one undo step and can be aborted to restore the list as it
//! was when the transaction began.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::collision::{check_collision, element_rect, CollisionReport};
use crate::config::{CanvasConfig, ConfigPatch};
use crate::document::LayoutDocument;
use crate::element::{Dimension, Element, ElementContent, ElementId, ElementType, Position, Responsive, Size};
use crate::error::{BuilderError, BuilderResult};
use crate::history::{History, Snapshot};
use crate::import::{normalize_json, ImportOptions};
use crate::placement::{plan_placement, Candidate, PlacementContext, PlacementPlan, Pointer};
use crate::responsive::{render_boxes, RenderBox};

/// Offset applied to both axes of a duplicated element.
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// Shallow update for an element. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    /// New desktop position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// New desktop size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// New paint order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    /// New content; must keep the element's type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ElementContent>,
    /// New responsive overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive: Option<Responsive>,
}

impl ElementPatch {
    /// Patch that moves an element.
    #[must_use]
    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// Patch that resizes an element.
    #[must_use]
    pub fn size(size: Size) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    /// Patch that changes paint order.
    #[must_use]
    pub fn z_index(z_index: i32) -> Self {
        Self {
            z_index: Some(z_index),
            ..Self::default()
        }
    }

    /// Patch that replaces the content.
    #[must_use]
    pub fn content(content: ElementContent) -> Self {
        Self {
            content: Some(content),
            ..Self::default()
        }
    }

    fn apply(self, element: &mut Element) {
        if let Some(position) = self.position {
            element.position = position;
        }
        if let Some(size) = self.size {
            element.size = size;
        }
        if let Some(z_index) = self.z_index {
            element.z_index = z_index;
        }
        if let Some(content) = self.content {
            element.content = content;
        }
        if let Some(responsive) = self.responsive {
            element.responsive = responsive;
        }
    }
}

/// A newly placed element.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedElement {
    /// ID of the new element.
    pub id: ElementId,
    /// Where it landed.
    pub plan: PlacementPlan,
}

/// Outcome of a JSON import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Number of elements now in the store.
    pub imported: usize,
    /// Dropped records and other non-fatal findings.
    pub warnings: Vec<String>,
    /// Name of the schema adapter that recognized the document.
    pub schema: &'static str,
}

/// An open group of mutations that commits as one undo step.
#[derive(Debug, Clone)]
struct Transaction {
    before: Snapshot,
}

/// Canonical document state plus undo/redo history.
///
/// # Example
///
/// ```
/// use builder_core::{BuilderStore, ElementType, Position};
///
/// let mut store = BuilderStore::new();
/// let id = store.add(ElementType::Header, Position::new(0.0, 0.0));
///
/// assert_eq!(store.selected_id(), Some(&id));
/// assert_eq!(store.get(&id).map(|header| header.z_index), Some(10));
///
/// assert!(store.undo());
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct BuilderStore {
    elements: Snapshot,
    selected: Option<ElementId>,
    config: CanvasConfig,
    history: History,
    transaction: Option<Transaction>,
    /// List as it was before the first unrecorded update since the last
    /// recorded mutation.
    pending_gesture: Option<Snapshot>,
}

impl BuilderStore {
    /// Create an empty store with default configuration and unlimited history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with the given configuration.
    #[must_use]
    pub fn with_config(config: CanvasConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Limit the undo stack to `max_levels` entries (0 = unlimited).
    #[must_use]
    pub fn with_history_limit(mut self, max_levels: usize) -> Self {
        self.history = History::with_max_levels(max_levels);
        self
    }

    // --- Queries ---

    /// Elements in list order.
    #[must_use]
    pub fn elements(&self) -> &[Arc<Element>] {
        &self.elements
    }

    /// The current list as a shareable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.elements)
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id).map(Arc::as_ref)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the document has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The selected element's ID.
    #[must_use]
    pub fn selected_id(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    /// The selected element.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    /// Canvas configuration.
    #[must_use]
    pub const fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Undo/redo stacks.
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Whether a transaction is open.
    #[must_use]
    pub const fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Render boxes for the active view mode.
    #[must_use]
    pub fn render_boxes(&self, window_width: f64) -> Vec<RenderBox> {
        render_boxes(self.elements.as_slice(), self.config.view_mode, window_width)
    }

    /// Elements overlapping the given element at its stored position.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::ElementNotFound`] if the element does not exist.
    pub fn collisions(&self, id: &ElementId, container_width: f64) -> BuilderResult<CollisionReport> {
        let element = self.require(id)?;
        let rect = element_rect(element, container_width);
        Ok(check_collision(&rect, self.elements.as_slice(), Some(id), container_width))
    }

    fn require(&self, id: &ElementId) -> BuilderResult<&Element> {
        self.get(id)
            .ok_or_else(|| BuilderError::ElementNotFound(id.to_string()))
    }

    fn index_of(&self, id: &ElementId) -> BuilderResult<usize> {
        self.elements
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| BuilderError::ElementNotFound(id.to_string()))
    }

    fn max_z_index(&self) -> i32 {
        self.elements.iter().map(|e| e.z_index).max().unwrap_or(0)
    }

    fn min_z_index(&self) -> i32 {
        self.elements.iter().map(|e| e.z_index).min().unwrap_or(0)
    }

    // --- Mutations ---

    /// Apply `f` to the list, recording the previous list unless told not to
    /// or a transaction is open.
    ///
    /// Unrecorded mutations outside a transaction keep the list from before
    /// the first of them; the next recorded mutation pushes that list, so one
    /// undo reverts the whole run.
    fn mutate<R>(&mut self, record: bool, f: impl FnOnce(&mut Vec<Arc<Element>>) -> R) -> R {
        let before = Arc::clone(&self.elements);
        let result = f(Arc::make_mut(&mut self.elements));
        if self.transaction.is_none() {
            if record {
                let before = self.pending_gesture.take().unwrap_or(before);
                self.history.record(before);
            } else {
                self.pending_gesture.get_or_insert(before);
                self.history.discard_redo();
            }
        }
        result
    }

    fn push(&mut self, element: Element) -> ElementId {
        let id = element.id.clone();
        debug!(id = %id, element_type = %element.element_type(), "Adding element");
        self.mutate(true, |list| list.push(Arc::new(element)));
        self.selected = Some(id.clone());
        id
    }

    /// Add an element of the given type with the type's defaults.
    ///
    /// The new element becomes the selection.
    pub fn add(&mut self, element_type: ElementType, position: Position) -> ElementId {
        self.push(Element::new(element_type, position))
    }

    /// Add a fully-formed element.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::InvalidOperation`] if the ID is already taken.
    pub fn insert(&mut self, element: Element) -> BuilderResult<ElementId> {
        if self.get(&element.id).is_some() {
            return Err(BuilderError::InvalidOperation(format!(
                "element id already in use: {}",
                element.id
            )));
        }
        Ok(self.push(element))
    }

    /// Shallow-merge a patch into an element.
    ///
    /// With `skip_history` nothing is recorded and the redo stack is dropped.
    /// The next recorded mutation undoes back to the list as it was before the
    /// first skipped update.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::ElementNotFound`] if the element does not exist,
    /// or [`BuilderError::InvalidOperation`] if the patch changes its type.
    pub fn update(&mut self, id: &ElementId, patch: ElementPatch, skip_history: bool) -> BuilderResult<()> {
        let index = self.index_of(id)?;
        if let Some(content) = &patch.content {
            let current = self.elements[index].element_type();
            if content.element_type() != current {
                return Err(BuilderError::InvalidOperation(format!(
                    "cannot change element {id} from {current} to {}",
                    content.element_type()
                )));
            }
        }

        debug!(id = %id, skip_history, "Updating element");
        self.mutate(!skip_history, |list| patch.apply(Arc::make_mut(&mut list[index])));
        Ok(())
    }

    /// Remove an element, clearing the selection if it was selected.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::ElementNotFound`] if the element does not exist.
    pub fn remove(&mut self, id: &ElementId) -> BuilderResult<Element> {
        let index = self.index_of(id)?;
        debug!(id = %id, "Removing element");
        let removed = self.mutate(true, |list| list.remove(index));
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        Ok(Arc::try_unwrap(removed).unwrap_or_else(|shared| (*shared).clone()))
    }

    /// Select an element, or clear the selection with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::ElementNotFound`] if the element does not exist.
    pub fn select(&mut self, id: Option<&ElementId>) -> BuilderResult<()> {
        if let Some(id) = id {
            self.require(id)?;
        }
        self.selected = id.cloned();
        Ok(())
    }

    fn set_z_index(&mut self, id: &ElementId, z_index: i32) -> BuilderResult<i32> {
        self.update(id, ElementPatch::z_index(z_index), false)?;
        Ok(z_index)
    }

    /// Paint above every element. Returns the new z-index.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::ElementNotFound`] if the element does not exist.
    pub fn bring_to_front(&mut self, id: &ElementId) -> BuilderResult<i32> {
        self.require(id)?;
        let z_index = self.max_z_index().max(0).saturating_add(1);
        self.set_z_index(id, z_index)
    }

    /// Paint below every element. Returns the new z-index.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::ElementNotFound`] if the element does not exist.
    pub fn send_to_back(&mut self, id: &ElementId) -> BuilderResult<i32> {
        self.require(id)?;
        let z_index = self.min_z_index().min(0).saturating_sub(1);
        self.set_z_index(id, z_index)
    }

    /// Raise paint order by one. Returns the new z-index.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::ElementNotFound`] if the element does not exist.
    pub fn bring_forward(&mut self, id: &ElementId) -> BuilderResult<i32> {
        let z_index = self.require(id)?.z_index.saturating_add(1);
        self.set_z_index(id, z_index)
    }

    /// Lower paint order by one. Returns the new z-index.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::ElementNotFound`] if the element does not exist.
    pub fn send_backward(&mut self, id: &ElementId) -> BuilderResult<i32> {
        let z_index = self.require(id)?.z_index.saturating_sub(1);
        self.set_z_index(id, z_index)
    }

    /// Copy an element with a fresh ID, offset and painted on top.
    ///
    /// The copy becomes the selection.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::ElementNotFound`] if the element does not exist.
    pub fn duplicate(&mut self, id: &ElementId) -> BuilderResult<ElementId> {
        let mut copy = self.require(id)?.clone();
        copy.id = ElementId::new();
        copy.position.x = offset(copy.position.x);
        copy.position.y = offset(copy.position.y);
        copy.z_index = self.max_z_index().saturating_add(1);
        Ok(self.push(copy))
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        debug!(count = self.elements.len(), "Clearing canvas");
        self.mutate(true, Vec::clear);
        self.selected = None;
    }

    /// Step back one history entry. Returns `false` if there was nothing to undo.
    ///
    /// Ignored while a transaction is open.
    pub fn undo(&mut self) -> bool {
        if self.transaction.is_some() {
            debug!("Undo ignored while a transaction is open");
            return false;
        }
        self.pending_gesture = None;
        let Some(previous) = self.history.undo(Arc::clone(&self.elements)) else {
            return false;
        };
        self.elements = previous;
        self.prune_selection();
        debug!(count = self.elements.len(), "Undo");
        true
    }

    /// Step forward one history entry. Returns `false` if there was nothing to redo.
    ///
    /// Ignored while a transaction is open.
    pub fn redo(&mut self) -> bool {
        if self.transaction.is_some() {
            debug!("Redo ignored while a transaction is open");
            return false;
        }
        self.pending_gesture = None;
        let Some(next) = self.history.redo(Arc::clone(&self.elements)) else {
            return false;
        };
        self.elements = next;
        self.prune_selection();
        debug!(count = self.elements.len(), "Redo");
        true
    }

    fn prune_selection(&mut self) {
        if let Some(id) = &self.selected {
            if !self.elements.iter().any(|e| &e.id == id) {
                self.selected = None;
            }
        }
    }

    /// Merge a configuration patch. Never recorded in history.
    pub fn set_config(&mut self, patch: &ConfigPatch) {
        self.config.apply(patch);
        debug!(view_mode = %self.config.view_mode, "Canvas configuration updated");
    }

    // --- Import / export ---

    /// Replace the whole element list as one history entry.
    ///
    /// Repeated IDs are replaced with fresh ones.
    pub fn import_document(&mut self, elements: Vec<Element>, config: Option<&ConfigPatch>) {
        let mut seen = HashSet::with_capacity(elements.len());
        let list: Vec<Arc<Element>> = elements
            .into_iter()
            .map(|mut element| {
                if !seen.insert(element.id.clone()) {
                    let fresh = ElementId::new();
                    warn!(duplicate = %element.id, replacement = %fresh, "Replacing duplicate element id");
                    seen.insert(fresh.clone());
                    element.id = fresh;
                }
                Arc::new(element)
            })
            .collect();

        debug!(count = list.len(), "Importing document");
        self.pending_gesture = None;
        self.mutate(true, |current| *current = list);
        self.prune_selection();
        if let Some(patch) = config {
            self.set_config(patch);
        }
    }

    /// Normalize and import JSON text.
    ///
    /// The store is left unchanged when the document cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::Import`] with the normalizer's messages.
    pub fn import_json(&mut self, json: &str, options: &ImportOptions) -> BuilderResult<ImportReport> {
        let normalized = normalize_json(json, options).map_err(|errors| {
            warn!(errors = %errors, "Import rejected");
            errors
        })?;
        let imported = normalized.elements.len();
        self.import_document(normalized.elements, normalized.canvas.as_ref());
        Ok(ImportReport {
            imported,
            warnings: normalized.warnings,
            schema: normalized.schema,
        })
    }

    /// The element list as a canonical document.
    #[must_use]
    pub fn export_document(&self) -> LayoutDocument {
        LayoutDocument::from_elements(self.elements.iter().map(Arc::as_ref))
    }

    /// Pretty-printed `{"elements": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::Serialization`] if serialization fails.
    pub fn export_json(&self) -> BuilderResult<String> {
        Ok(self.export_document().to_json_pretty()?)
    }

    /// Like [`Self::export_json`] with the canvas configuration embedded.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::Serialization`] if serialization fails.
    pub fn export_json_with_config(&self) -> BuilderResult<String> {
        Ok(self
            .export_document()
            .with_canvas(self.config)
            .to_json_pretty()?)
    }

    // --- Transactions ---

    /// Open a transaction. Mutations until commit or abort are not recorded.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::InvalidOperation`] if one is already open.
    pub fn begin_transaction(&mut self) -> BuilderResult<()> {
        if self.transaction.is_some() {
            return Err(BuilderError::InvalidOperation(
                "a transaction is already open".to_string(),
            ));
        }
        self.pending_gesture = None;
        self.transaction = Some(Transaction {
            before: Arc::clone(&self.elements),
        });
        debug!("Transaction opened");
        Ok(())
    }

    /// Close the transaction, recording one history entry if the list changed.
    ///
    /// Returns whether an entry was recorded.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::InvalidOperation`] if no transaction is open.
    pub fn commit_transaction(&mut self) -> BuilderResult<bool> {
        let transaction = self.transaction.take().ok_or_else(no_transaction)?;
        let changed = !Arc::ptr_eq(&transaction.before, &self.elements)
            && *transaction.before != *self.elements;
        if changed {
            self.history.record(transaction.before);
        }
        debug!(changed, "Transaction committed");
        Ok(changed)
    }

    /// Close the transaction and restore the list as it was when it opened.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::InvalidOperation`] if no transaction is open.
    pub fn abort_transaction(&mut self) -> BuilderResult<()> {
        let transaction = self.transaction.take().ok_or_else(no_transaction)?;
        self.elements = transaction.before;
        self.prune_selection();
        debug!("Transaction aborted");
        Ok(())
    }

    // --- Placement ---

    /// Drop a new element of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::Placement`] if the drop breaks the height
    /// ceiling; nothing is added.
    pub fn place_new(
        &mut self,
        element_type: ElementType,
        pointer: Pointer,
        context: &PlacementContext,
    ) -> BuilderResult<PlacedElement> {
        let candidate = Candidate {
            element_type,
            origin: (0.0, 0.0),
            size: element_type.default_size(),
            exclude: None,
        };
        let plan = self.plan(&candidate, pointer, context)?;
        let id = self.add(element_type, Position::new(plan.x, plan.y));
        Ok(PlacedElement { id, plan })
    }

    /// Commit a move of an existing element that started at `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::ElementNotFound`] for an unknown element, or
    /// [`BuilderError::Placement`] if the move breaks the height ceiling; the
    /// element is not moved.
    pub fn place_existing(
        &mut self,
        id: &ElementId,
        origin: (f64, f64),
        pointer: Pointer,
        context: &PlacementContext,
    ) -> BuilderResult<PlacementPlan> {
        let element = self.require(id)?;
        let candidate = Candidate {
            element_type: element.element_type(),
            origin,
            size: element.size,
            exclude: Some(id),
        };
        let plan = self.plan(&candidate, pointer, context)?;
        self.update(id, ElementPatch::position(Position::new(plan.x, plan.y)), false)?;
        Ok(plan)
    }

    /// Move an element from its stored position.
    ///
    /// # Errors
    ///
    /// See [`Self::place_existing`].
    pub fn move_element(
        &mut self,
        id: &ElementId,
        pointer: Pointer,
        context: &PlacementContext,
    ) -> BuilderResult<PlacementPlan> {
        let rect = element_rect(self.require(id)?, context.container_width);
        self.place_existing(id, (rect.x, rect.y), pointer, context)
    }

    fn plan(
        &self,
        candidate: &Candidate<'_>,
        pointer: Pointer,
        context: &PlacementContext,
    ) -> BuilderResult<PlacementPlan> {
        let plan = plan_placement(candidate, pointer, self.elements.as_slice(), &self.config, context)
            .map_err(|e| {
                warn!(element_type = %candidate.element_type, error = %e, "Placement rejected");
                e
            })?;
        for warning in &plan.warnings {
            warn!(?warning, "Placement near the canvas height limit");
        }
        if plan.collisions.has_collision() {
            debug!(colliding = plan.collisions.colliding.len(), "Placement overlaps existing elements");
        }
        Ok(plan)
    }
}

fn no_transaction() -> BuilderError {
    BuilderError::InvalidOperation("no transaction is open".to_string())
}

fn offset(value: Dimension) -> Dimension {
    match value {
        Dimension::Px(px) => Dimension::Px(px + DUPLICATE_OFFSET),
        other => other,
    }
}
