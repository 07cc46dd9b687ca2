//! # Page Builder Core
//!
//! Canvas state engine for a visual page builder.
//! Compiles to WASM so the same engine runs behind the browser editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              builder-core.wasm              │
//! ├─────────────────────────────────────────────┤
//! │  Document Store  │  Gesture Controller      │
//! │  - Elements      │  - Drag / resize         │
//! │  - Selection     │  - Transactions          │
//! │  - Undo / redo   │  - Placement protocol    │
//! ├─────────────────────────────────────────────┤
//! │  Layout          │  Import                  │
//! │  - Grid snapping │  - Schema adapters       │
//! │  - Collisions    │  - Alias tables          │
//! │  - Responsive    │  - Fit to canvas         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The desktop geometry stored on each [`Element`] is canonical. Tablet and
//! mobile layouts are derived on demand by [`responsive`] and never stored.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod collision;
pub mod config;
pub mod defaults;
pub mod document;
pub mod element;
pub mod error;
pub mod gesture;
pub mod history;
pub mod import;
pub mod placement;
pub mod responsive;
pub mod spatial;
pub mod store;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use collision::{check_collision, overlapping_pairs, CollisionReport};
pub use config::{CanvasConfig, ConfigPatch, GridConfig, GridPatch, Viewport};
pub use document::LayoutDocument;
pub use element::{
    Dimension, Element, ElementContent, ElementId, ElementType, GeometryOverride, Position,
    Responsive, Size,
};
pub use error::{BuilderError, BuilderResult, ImportErrors};
pub use gesture::{
    GestureController, GestureEvent, GestureOutcome, GesturePhase, GestureTarget, PointerSample,
    ResizeHandle,
};
pub use history::{History, Snapshot};
pub use import::{normalize_json, ImportOptions, NormalizedDocument, Normalizer, SchemaAdapter};
pub use placement::{
    MeasuredSize, PlacementContext, PlacementError, PlacementPlan, PlacementWarning, Pointer,
};
pub use responsive::{render_boxes, resolve_layout, LayoutOverride, RenderBox};
pub use spatial::{resolve_dimension, snap_to_grid, Rect};
pub use store::{BuilderStore, ElementPatch, ImportReport, PlacedElement};

/// Builder core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
