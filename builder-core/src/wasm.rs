//! WebAssembly bindings for builder-core.
//!
//! This module provides JavaScript-callable functions when compiled to WASM.
//! Structured values cross the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::config::{ConfigPatch, Viewport};
use crate::element::{ElementId, ElementType, Position};
use crate::gesture::{GestureController, GestureEvent, GestureOutcome};
use crate::import::{ImportOptions, DEFAULT_FIT_CANVAS};
use crate::placement::PlacementContext;
use crate::store::{BuilderStore, ElementPatch};

/// Initialize the builder WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();
}

fn parse_type(raw: &str) -> Result<ElementType, String> {
    ElementType::ALL
        .into_iter()
        .find(|t| t.as_str() == raw)
        .ok_or_else(|| format!("unknown element type {raw:?}"))
}

/// Page builder instance for WASM.
#[wasm_bindgen]
pub struct WasmBuilder {
    store: BuilderStore,
    gestures: GestureController,
}

#[wasm_bindgen]
impl WasmBuilder {
    /// Create a new, empty builder.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        let store = BuilderStore::new();
        let context = PlacementContext::new(store.config().view_mode.container_width());
        Self {
            store,
            gestures: GestureController::new(context),
        }
    }

    /// Add an element of the given type. Returns the new element's ID.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown element type.
    #[wasm_bindgen(js_name = addElement)]
    pub fn add_element(&mut self, element_type: &str, x: f64, y: f64) -> Result<String, String> {
        let element_type = parse_type(element_type)?;
        Ok(self.store.add(element_type, Position::new(x, y)).to_string())
    }

    /// Apply a JSON patch (`{"position": ..., "size": ...}`) to an element.
    ///
    /// # Errors
    ///
    /// Returns an error string if the patch is malformed or the element is unknown.
    #[wasm_bindgen(js_name = updateElement)]
    pub fn update_element(&mut self, id: &str, patch_json: &str, skip_history: bool) -> Result<(), String> {
        let patch: ElementPatch = serde_json::from_str(patch_json).map_err(|e| e.to_string())?;
        self.store
            .update(&ElementId::from(id), patch, skip_history)
            .map_err(|e| e.to_string())
    }

    /// Remove an element.
    ///
    /// # Errors
    ///
    /// Returns an error string if the element is unknown.
    #[wasm_bindgen(js_name = removeElement)]
    pub fn remove_element(&mut self, id: &str) -> Result<(), String> {
        self.store
            .remove(&ElementId::from(id))
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    /// Duplicate an element. Returns the copy's ID.
    ///
    /// # Errors
    ///
    /// Returns an error string if the element is unknown.
    pub fn duplicate(&mut self, id: &str) -> Result<String, String> {
        self.store
            .duplicate(&ElementId::from(id))
            .map(|copy| copy.to_string())
            .map_err(|e| e.to_string())
    }

    /// Select an element, or clear the selection with `undefined`.
    ///
    /// # Errors
    ///
    /// Returns an error string if the element is unknown.
    pub fn select(&mut self, id: Option<String>) -> Result<(), String> {
        let id = id.map(ElementId::from);
        self.store.select(id.as_ref()).map_err(|e| e.to_string())
    }

    /// The selected element's ID.
    #[wasm_bindgen(js_name = selectedId)]
    #[must_use]
    pub fn selected_id(&self) -> Option<String> {
        self.store.selected_id().map(ToString::to_string)
    }

    /// Paint an element above every other. Returns the new z-index.
    ///
    /// # Errors
    ///
    /// Returns an error string if the element is unknown.
    #[wasm_bindgen(js_name = bringToFront)]
    pub fn bring_to_front(&mut self, id: &str) -> Result<i32, String> {
        self.store
            .bring_to_front(&ElementId::from(id))
            .map_err(|e| e.to_string())
    }

    /// Paint an element below every other. Returns the new z-index.
    ///
    /// # Errors
    ///
    /// Returns an error string if the element is unknown.
    #[wasm_bindgen(js_name = sendToBack)]
    pub fn send_to_back(&mut self, id: &str) -> Result<i32, String> {
        self.store
            .send_to_back(&ElementId::from(id))
            .map_err(|e| e.to_string())
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Undo the last change. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.store.undo()
    }

    /// Redo the last undone change. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.store.redo()
    }

    /// Check if undo is available.
    #[wasm_bindgen(js_name = canUndo)]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    /// Check if redo is available.
    #[wasm_bindgen(js_name = canRedo)]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    /// Switch the view mode (`desktop`, `tablet` or `mobile`).
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown view mode.
    #[wasm_bindgen(js_name = setViewMode)]
    pub fn set_view_mode(&mut self, mode: &str) -> Result<(), String> {
        let viewport: Viewport = mode.parse()?;
        self.store.set_config(&ConfigPatch::view_mode(viewport));
        let context = PlacementContext {
            container_width: viewport.container_width(),
            ..*self.gestures.context()
        };
        self.gestures.set_context(context);
        Ok(())
    }

    /// Merge a JSON configuration patch.
    ///
    /// # Errors
    ///
    /// Returns an error string if the patch is malformed.
    #[wasm_bindgen(js_name = updateConfig)]
    pub fn update_config(&mut self, patch_json: &str) -> Result<(), String> {
        let patch: ConfigPatch = serde_json::from_str(patch_json).map_err(|e| e.to_string())?;
        self.store.set_config(&patch);
        Ok(())
    }

    /// Set the zoom scale used to interpret pointer positions.
    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, zoom: f64) {
        let context = self.gestures.context().with_zoom(zoom);
        self.gestures.set_context(context);
    }

    /// Import a document of any supported shape. Returns the warnings as a JSON array.
    ///
    /// With `fit_to_canvas` the content is scaled down to the desktop canvas.
    ///
    /// # Errors
    ///
    /// Returns the import errors joined into one string; the document is unchanged.
    #[wasm_bindgen(js_name = importJson)]
    pub fn import_json(&mut self, json: &str, fit_to_canvas: bool) -> Result<String, String> {
        let options = ImportOptions {
            fit_to: fit_to_canvas.then_some(DEFAULT_FIT_CANVAS),
        };
        let report = self
            .store
            .import_json(json, &options)
            .map_err(|e| e.to_string())?;
        serde_json::to_string(&report.warnings).map_err(|e| e.to_string())
    }

    /// Export the canonical document.
    ///
    /// # Errors
    ///
    /// Returns an error string if serialization fails.
    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&self, with_config: bool) -> Result<String, String> {
        let exported = if with_config {
            self.store.export_json_with_config()
        } else {
            self.store.export_json()
        };
        exported.map_err(|e| e.to_string())
    }

    /// Render boxes for the active view mode as a JSON array.
    #[wasm_bindgen(js_name = layoutJson)]
    #[must_use]
    pub fn layout_json(&self, window_width: f64) -> String {
        serde_json::to_string(&self.store.render_boxes(window_width)).unwrap_or_default()
    }

    /// Feed one gesture notification (JSON) to the gesture controller.
    ///
    /// Returns a JSON summary: `{"outcome": ..., "id"?, "colliding"?}`.
    ///
    /// # Errors
    ///
    /// Returns an error string if the event is malformed or the placement is rejected.
    #[wasm_bindgen(js_name = handleGesture)]
    pub fn handle_gesture(&mut self, event_json: &str) -> Result<String, String> {
        let event: GestureEvent = serde_json::from_str(event_json).map_err(|e| e.to_string())?;
        let outcome = self
            .gestures
            .handle(&mut self.store, event)
            .map_err(|e| e.to_string())?;
        let summary = match outcome {
            GestureOutcome::Started => serde_json::json!({ "outcome": "started" }),
            GestureOutcome::Updated { rect, collisions } => serde_json::json!({
                "outcome": "updated",
                "rect": rect,
                "colliding": collisions.colliding,
            }),
            GestureOutcome::Refused(reason) => serde_json::json!({
                "outcome": "refused",
                "reason": reason.to_string(),
            }),
            GestureOutcome::Committed { id, recorded } => serde_json::json!({
                "outcome": "committed",
                "id": id,
                "recorded": recorded,
            }),
            GestureOutcome::Cancelled => serde_json::json!({ "outcome": "cancelled" }),
            GestureOutcome::Ignored => serde_json::json!({ "outcome": "ignored" }),
        };
        Ok(summary.to_string())
    }

    /// Number of elements.
    #[wasm_bindgen(js_name = elementCount)]
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.store.len()
    }
}

impl Default for WasmBuilder {
    fn default() -> Self {
        Self::new()
    }
}
