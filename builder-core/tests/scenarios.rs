//! End-to-end editing scenarios against the public store API.
//!
//! Covers:
//! - Dropping elements through the placement protocol
//! - Tolerant import and rejected documents
//! - Height ceilings
//! - Export / re-import of an edited page

use builder_core::{
    BuilderError, BuilderStore, CanvasConfig, ConfigPatch, Dimension, Element, ElementId,
    ElementPatch, ElementType, ImportOptions, PlacementContext, PlacementError, PlacementWarning,
    Pointer, Position, Size, Viewport,
};

fn desktop() -> PlacementContext {
    PlacementContext::new(Viewport::Desktop.container_width())
}

fn capped_store(max_height: f64, warning_threshold: Option<f64>) -> BuilderStore {
    BuilderStore::with_config(CanvasConfig {
        max_height: Some(max_height),
        warning_threshold,
        ..CanvasConfig::default()
    })
}

// ============================================================================
// Placement
// ============================================================================

#[test]
fn test_dropped_header_lands_at_origin_and_is_selected() {
    let mut store = BuilderStore::new();
    let placed = store
        .place_new(ElementType::Header, Pointer::At { x: 310.0, y: 270.0 }, &desktop())
        .expect("place header");

    let header = store.get(&placed.id).expect("header exists");
    assert_eq!(header.position, Position::new(0.0, 0.0));
    assert_eq!(header.size, Size::new(Dimension::FULL, Dimension::Px(80.0)));
    assert_eq!(header.z_index, 10);
    assert_eq!(store.selected_id(), Some(&placed.id));
    assert!(store.can_undo());
}

#[test]
fn test_dropped_card_snaps_and_stays_inside_container() {
    let mut store = BuilderStore::new();
    let placed = store
        .place_new(ElementType::Card, Pointer::At { x: 1190.0, y: 47.0 }, &desktop())
        .expect("place card");

    // 1200 container, 300 wide card
    assert_eq!(placed.plan.x, 900.0);
    assert_eq!(placed.plan.y, 40.0);
    assert_eq!(
        store.get(&placed.id).map(|e| e.position),
        Some(Position::new(900.0, 40.0))
    );
}

#[test]
fn test_zoomed_drop_is_converted_to_canvas_space() {
    let mut store = BuilderStore::new();
    let context = desktop().with_zoom(2.0);
    let placed = store
        .place_new(ElementType::Card, Pointer::At { x: 400.0, y: 200.0 }, &context)
        .expect("place card");
    assert_eq!((placed.plan.x, placed.plan.y), (200.0, 100.0));
}

#[test]
fn test_overlapping_drop_is_allowed_and_reported() {
    let mut store = BuilderStore::new();
    let first = store
        .place_new(ElementType::Card, Pointer::At { x: 100.0, y: 100.0 }, &desktop())
        .expect("first card");
    let second = store
        .place_new(ElementType::Card, Pointer::At { x: 200.0, y: 200.0 }, &desktop())
        .expect("second card");

    assert_eq!(second.plan.collisions.colliding, vec![first.id.clone()]);
    assert_eq!(store.len(), 2);

    let report = store
        .collisions(&first.id, Viewport::Desktop.container_width())
        .expect("collision report");
    assert_eq!(report.colliding, vec![second.id]);
}

#[test]
fn test_move_past_max_height_is_rejected() {
    let mut store = capped_store(2000.0, None);
    let id = store
        .insert(
            Element::new(ElementType::Card, Position::new(0.0, 0.0))
                .with_id("card")
                .with_size(Size::px(300.0, 90.0)),
        )
        .expect("insert");
    let depth = store.history().undo_depth();

    let result = store.move_element(&id, Pointer::At { x: 0.0, y: 1960.0 }, &desktop());

    assert_eq!(
        result.err().map(|e| e.to_string()),
        Some(
            BuilderError::Placement(PlacementError::ExceedsMaxHeight {
                bottom: 2050.0,
                max_height: 2000.0,
            })
            .to_string()
        )
    );
    assert_eq!(store.get(&id).map(|e| e.position), Some(Position::new(0.0, 0.0)));
    assert_eq!(store.history().undo_depth(), depth);
}

#[test]
fn test_move_past_warning_threshold_succeeds_with_warning() {
    let mut store = capped_store(3000.0, Some(1500.0));
    let id = store
        .insert(
            Element::new(ElementType::Card, Position::new(0.0, 0.0))
                .with_id("card")
                .with_size(Size::px(300.0, 100.0)),
        )
        .expect("insert");

    let plan = store
        .move_element(&id, Pointer::At { x: 0.0, y: 1500.0 }, &desktop())
        .expect("move accepted");

    assert_eq!(
        plan.warnings,
        vec![PlacementWarning::NearMaxHeight {
            bottom: 1600.0,
            threshold: 1500.0,
        }]
    );
    assert_eq!(store.get(&id).map(|e| e.position), Some(Position::new(0.0, 1500.0)));
}

#[test]
fn test_dropped_header_ignores_height_pressure() {
    let mut store = capped_store(100.0, None);
    let placed = store
        .place_new(ElementType::Header, Pointer::At { x: 0.0, y: 900.0 }, &desktop());
    assert!(placed.is_ok());
}

// ============================================================================
// Import
// ============================================================================

#[test]
fn test_navbar_import_becomes_header() {
    let mut store = BuilderStore::new();
    let report = store
        .import_json(
            r#"{"elements":[{"type":"navbar","position":{"x":0,"y":0}}]}"#,
            &ImportOptions::default(),
        )
        .expect("import");

    assert_eq!(report.imported, 1);
    assert!(report.warnings.is_empty());
    let element = &store.elements()[0];
    assert_eq!(element.element_type(), ElementType::Header);
    assert_eq!(element.size, Size::px(300.0, 200.0));
    assert!(!element.id.as_str().is_empty());
}

#[test]
fn test_unrecognized_document_leaves_store_untouched() {
    let mut store = BuilderStore::new();
    let id = store.add(ElementType::Text, Position::new(20.0, 20.0));
    let before = store.snapshot();
    let depth = store.history().undo_depth();

    let err = store
        .import_json(r#"{"foo":1}"#, &ImportOptions::default())
        .expect_err("structural error");

    match err {
        BuilderError::Import(errors) => {
            assert_eq!(errors.messages().len(), 1);
            assert!(errors.messages()[0].starts_with("Unrecognized document shape"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(*store.snapshot(), *before);
    assert_eq!(store.history().undo_depth(), depth);
    assert_eq!(store.selected_id(), Some(&id));
}

#[test]
fn test_syntax_error_is_reported() {
    let mut store = BuilderStore::new();
    let err = store
        .import_json("{\"elements\": [", &ImportOptions::default())
        .expect_err("syntax error");
    assert!(err.to_string().contains("Invalid JSON syntax"));
    assert!(store.is_empty());
}

#[test]
fn test_import_is_one_undo_step_and_prunes_selection() {
    let mut store = BuilderStore::new();
    let original = store.add(ElementType::Card, Position::new(0.0, 0.0));

    store
        .import_json(
            r#"{"project":{"name":"Landing","canvas":{"maxHeight":5000}},"elements":[
                {"component":"hero","x":0,"y":0,"width":1200,"height":400},
                {"component":"paragraph","content":"Hello","x":0,"y":420}
            ]}"#,
            &ImportOptions::default(),
        )
        .expect("import");

    assert_eq!(store.len(), 2);
    assert_eq!(store.selected_id(), None);
    assert_eq!(store.config().max_height, Some(5000.0));

    assert!(store.undo());
    assert_eq!(store.len(), 1);
    assert_eq!(store.elements()[0].id, original);
}

#[test]
fn test_partially_broken_document_imports_the_rest() {
    let mut store = BuilderStore::new();
    let report = store
        .import_json(
            r#"[{"type":"text","text":"ok"}, 42, {"position":{"x":1,"y":2}}]"#,
            &ImportOptions::default(),
        )
        .expect("import");
    assert_eq!(report.imported, 1);
    assert_eq!(report.warnings.len(), 2);
    assert_eq!(report.schema, "array");
}

#[test]
fn test_oversized_import_is_fitted_to_canvas() {
    let mut store = BuilderStore::new();
    let report = store
        .import_json(
            r#"[{"type":"card","x":0,"y":0,"width":2400,"height":400}]"#,
            &ImportOptions::fit_to(1200.0, 800.0),
        )
        .expect("import");
    assert_eq!(report.imported, 1);
    // 1200 / 2400 * 0.9
    assert_eq!(store.elements()[0].size, Size::px(1080.0, 180.0));
}

// ============================================================================
// Editing session
// ============================================================================

#[test]
fn test_edited_page_survives_export_and_reimport() {
    let mut store = BuilderStore::new();
    let header = store.add(ElementType::Header, Position::new(0.0, 0.0));
    let card = store.add(ElementType::Card, Position::new(100.0, 200.0));
    store
        .update(&card, ElementPatch::size(Size::px(320.0, 240.0)), false)
        .expect("resize");
    let copy = store.duplicate(&card).expect("duplicate");
    store.bring_to_front(&header).expect("z-order");
    store.set_config(&ConfigPatch::view_mode(Viewport::Tablet));

    let json = store.export_json_with_config().expect("export");

    let mut restored = BuilderStore::new();
    restored
        .import_json(&json, &ImportOptions::default())
        .expect("re-import");

    let original: Vec<Element> = store.elements().iter().map(|e| (**e).clone()).collect();
    let reloaded: Vec<Element> = restored.elements().iter().map(|e| (**e).clone()).collect();
    assert_eq!(original, reloaded);
    assert_eq!(restored.config().view_mode, Viewport::Tablet);
    assert_eq!(
        restored.get(&copy).map(|e| e.position),
        Some(Position::new(120.0, 220.0))
    );
}

#[test]
fn test_remove_then_undo_restores_element() {
    let mut store = BuilderStore::new();
    let id = store.add(ElementType::Slider, Position::new(0.0, 300.0));
    let removed = store.remove(&id).expect("remove");
    assert_eq!(removed.id, id);
    assert!(store.get(&id).is_none());

    assert!(store.undo());
    assert_eq!(store.get(&id), Some(&removed));
    assert!(store.redo());
    assert!(store.get(&id).is_none());
}

#[test]
fn test_unknown_element_operations_fail_cleanly() {
    let mut store = BuilderStore::new();
    let ghost = ElementId::from("ghost");
    assert!(matches!(store.remove(&ghost), Err(BuilderError::ElementNotFound(_))));
    assert!(matches!(store.duplicate(&ghost), Err(BuilderError::ElementNotFound(_))));
    assert!(matches!(store.select(Some(&ghost)), Err(BuilderError::ElementNotFound(_))));
    assert!(!store.can_undo());
}
