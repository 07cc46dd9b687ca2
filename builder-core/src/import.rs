//! Import normalizer for layout documents of unknown shape.
//!
//! Documents exported by this crate, by older builds, and by other page
//! builders all arrive here. The shape of the document is detected by an
//! ordered list of [`SchemaAdapter`]s (first match wins), then every record is
//! converted tolerantly into a canonical [`Element`].
//!
//! ## Accepted shapes
//!
//! | Adapter      | Shape                                  |
//! |--------------|----------------------------------------|
//! | `array`      | `[ {...}, ... ]`                       |
//! | `elements`   | `{"elements": [...]}`                  |
//! | `project`    | `{"project": ..., "elements": [...]}`  |
//! | `data`       | `{"data": [...]}`                      |
//! | `components` | `{"components": [...]}`                |
//!
//! ## Type aliases
//!
//! | Canonical | Aliases                                                  |
//! |-----------|----------------------------------------------------------|
//! | header    | navbar, nav, navigation, topbar, appbar, menu            |
//! | footer    | bottombar, copyright                                     |
//! | card      | panel, tile, feature, box (and anything unrecognized)    |
//! | text      | paragraph, p, heading, title, label, richtext, h1-h3     |
//! | slider    | hero, banner, carousel, gallery, slideshow               |
//!
//! A record is dropped only when it is not an object or carries no type-like
//! field at all. Dropped records are reported by index; the import succeeds
//! as long as one record survives.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::ConfigPatch;
use crate::element::{
    Dimension, Element, ElementContent, ElementId, ElementType, GeometryOverride, Position,
    Responsive, Size,
};
use crate::error::ImportErrors;

/// Human-readable list of the document shapes the normalizer accepts.
pub const ACCEPTED_SHAPES: &str = "a bare array of elements, {\"elements\": [...]}, \
{\"project\": ..., \"elements\": [...]}, {\"data\": [...]} or {\"components\": [...]}";

/// Desktop canvas size used when a host asks for fit-to-canvas without one.
pub const DEFAULT_FIT_CANVAS: CanvasBounds = CanvasBounds {
    width: 1200.0,
    height: 800.0,
};

/// Margin applied when content is scaled down to fit.
const FIT_MARGIN: f64 = 0.9;

/// Size of a record that names none.
const DEFAULT_IMPORT_SIZE: Size = Size::px(300.0, 200.0);

const TYPE_FIELDS: &[&str] = &["type", "elementType", "component"];

const TYPE_ALIASES: &[(&str, ElementType)] = &[
    ("header", ElementType::Header),
    ("navbar", ElementType::Header),
    ("nav", ElementType::Header),
    ("navigation", ElementType::Header),
    ("topbar", ElementType::Header),
    ("appbar", ElementType::Header),
    ("menu", ElementType::Header),
    ("footer", ElementType::Footer),
    ("bottombar", ElementType::Footer),
    ("copyright", ElementType::Footer),
    ("card", ElementType::Card),
    ("panel", ElementType::Card),
    ("tile", ElementType::Card),
    ("feature", ElementType::Card),
    ("box", ElementType::Card),
    ("text", ElementType::Text),
    ("paragraph", ElementType::Text),
    ("p", ElementType::Text),
    ("heading", ElementType::Text),
    ("title", ElementType::Text),
    ("label", ElementType::Text),
    ("richtext", ElementType::Text),
    ("textblock", ElementType::Text),
    ("h1", ElementType::Text),
    ("h2", ElementType::Text),
    ("h3", ElementType::Text),
    ("slider", ElementType::Slider),
    ("hero", ElementType::Slider),
    ("banner", ElementType::Slider),
    ("carousel", ElementType::Slider),
    ("gallery", ElementType::Slider),
    ("slideshow", ElementType::Slider),
];

/// Map a free-form type name to an element type.
///
/// Case, hyphens, underscores and spaces are ignored. Unknown names map to
/// [`ElementType::Card`].
#[must_use]
pub fn element_type_from_alias(raw: &str) -> ElementType {
    let key: String = raw
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect();
    TYPE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map_or(ElementType::Card, |(_, element_type)| *element_type)
}

/// Detects one document shape and exposes its element records.
pub trait SchemaAdapter {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// The element records, if the document has this adapter's shape.
    fn records<'a>(&self, root: &'a Value) -> Option<&'a [Value]>;

    /// The embedded canvas configuration, if any.
    fn canvas<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        root.get("canvas")
    }
}

fn array_field<'a>(root: &'a Value, key: &str) -> Option<&'a [Value]> {
    root.get(key)?.as_array().map(Vec::as_slice)
}

/// `[ {...}, ... ]`
#[derive(Debug, Clone, Copy, Default)]
pub struct BareArrayAdapter;

impl SchemaAdapter for BareArrayAdapter {
    fn name(&self) -> &'static str {
        "array"
    }

    fn records<'a>(&self, root: &'a Value) -> Option<&'a [Value]> {
        root.as_array().map(Vec::as_slice)
    }
}

/// `{"elements": [...]}` without a `project` wrapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementsAdapter;

impl SchemaAdapter for ElementsAdapter {
    fn name(&self) -> &'static str {
        "elements"
    }

    fn records<'a>(&self, root: &'a Value) -> Option<&'a [Value]> {
        if root.get("project").is_some() {
            return None;
        }
        array_field(root, "elements")
    }
}

/// `{"project": ..., "elements": [...]}`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectAdapter;

impl SchemaAdapter for ProjectAdapter {
    fn name(&self) -> &'static str {
        "project"
    }

    fn records<'a>(&self, root: &'a Value) -> Option<&'a [Value]> {
        root.get("project")?;
        array_field(root, "elements")
    }

    fn canvas<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        root.get("canvas")
            .or_else(|| root.get("project").and_then(|project| project.get("canvas")))
    }
}

/// `{"data": [...]}`
#[derive(Debug, Clone, Copy, Default)]
pub struct DataAdapter;

impl SchemaAdapter for DataAdapter {
    fn name(&self) -> &'static str {
        "data"
    }

    fn records<'a>(&self, root: &'a Value) -> Option<&'a [Value]> {
        array_field(root, "data")
    }
}

/// `{"components": [...]}`
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentsAdapter;

impl SchemaAdapter for ComponentsAdapter {
    fn name(&self) -> &'static str {
        "components"
    }

    fn records<'a>(&self, root: &'a Value) -> Option<&'a [Value]> {
        array_field(root, "components")
    }
}

/// The built-in adapters in detection order.
#[must_use]
pub fn default_adapters() -> Vec<Box<dyn SchemaAdapter>> {
    vec![
        Box::new(BareArrayAdapter),
        Box::new(ElementsAdapter),
        Box::new(ProjectAdapter),
        Box::new(DataAdapter),
        Box::new(ComponentsAdapter),
    ]
}

/// Canvas size used for fit-to-canvas scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasBounds {
    /// Canvas width.
    pub width: f64,
    /// Canvas height.
    pub height: f64,
}

/// Import tuning.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImportOptions {
    /// Scale numeric geometry down when the content extends past this canvas.
    pub fit_to: Option<CanvasBounds>,
}

impl ImportOptions {
    /// Options that fit content into the given canvas.
    #[must_use]
    pub const fn fit_to(width: f64, height: f64) -> Self {
        Self {
            fit_to: Some(CanvasBounds { width, height }),
        }
    }
}

/// A successfully normalized document.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDocument {
    /// Canonical elements in document order.
    pub elements: Vec<Element>,
    /// Embedded canvas configuration.
    pub canvas: Option<ConfigPatch>,
    /// Dropped records, replaced ids and ignored configuration.
    pub warnings: Vec<String>,
    /// Name of the adapter that recognized the document.
    pub schema: &'static str,
    /// Scale applied by fit-to-canvas (1.0 when untouched).
    pub scale: f64,
}

/// Converts external documents into canonical elements.
pub struct Normalizer {
    adapters: Vec<Box<dyn SchemaAdapter>>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.adapters.iter().map(|adapter| adapter.name()).collect();
        f.debug_struct("Normalizer").field("adapters", &names).finish()
    }
}

impl Normalizer {
    /// Normalizer with the built-in adapters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_adapters(default_adapters())
    }

    /// Normalizer with a custom adapter list, tried in order.
    #[must_use]
    pub fn with_adapters(adapters: Vec<Box<dyn SchemaAdapter>>) -> Self {
        Self { adapters }
    }

    /// Normalize JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ImportErrors`] on a JSON syntax error, an unrecognized shape,
    /// or when no record converts.
    pub fn normalize_str(
        &self,
        json: &str,
        options: &ImportOptions,
    ) -> Result<NormalizedDocument, ImportErrors> {
        let root: Value = serde_json::from_str(json)
            .map_err(|e| ImportErrors::single(format!("Invalid JSON syntax: {e}")))?;
        self.normalize_value(&root, options)
    }

    /// Normalize an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ImportErrors`] on an unrecognized shape or when no record
    /// converts.
    pub fn normalize_value(
        &self,
        root: &Value,
        options: &ImportOptions,
    ) -> Result<NormalizedDocument, ImportErrors> {
        let Some((adapter, records)) = self
            .adapters
            .iter()
            .find_map(|adapter| adapter.records(root).map(|records| (adapter, records)))
        else {
            return Err(ImportErrors::single(format!(
                "Unrecognized document shape: expected {ACCEPTED_SHAPES}"
            )));
        };

        if records.is_empty() {
            return Err(ImportErrors::single("Document contains no elements"));
        }

        let mut converter = Converter::default();
        let elements: Vec<Element> = records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| converter.convert(index, record))
            .collect();

        if elements.is_empty() {
            return Err(ImportErrors(converter.warnings));
        }

        let mut warnings = converter.warnings;
        let canvas = adapter.canvas(root).and_then(|raw| {
            serde_json::from_value::<ConfigPatch>(raw.clone())
                .map_err(|e| {
                    warn!(error = %e, "Ignoring invalid canvas configuration");
                    warnings.push(format!("Ignoring invalid canvas configuration: {e}"));
                })
                .ok()
        });

        let mut elements = elements;
        let scale = options
            .fit_to
            .map_or(1.0, |bounds| fit_to_canvas(&mut elements, bounds));

        debug!(
            schema = adapter.name(),
            imported = elements.len(),
            dropped = records.len() - elements.len(),
            scale,
            "Normalized import document"
        );

        Ok(NormalizedDocument {
            elements,
            canvas,
            warnings,
            schema: adapter.name(),
            scale,
        })
    }
}

/// Normalize JSON text with the built-in adapters.
///
/// # Errors
///
/// See [`Normalizer::normalize_str`].
pub fn normalize_json(json: &str, options: &ImportOptions) -> Result<NormalizedDocument, ImportErrors> {
    Normalizer::new().normalize_str(json, options)
}

/// Scale numeric geometry so the content fits `bounds`. Returns the scale used.
fn fit_to_canvas(elements: &mut [Element], bounds: CanvasBounds) -> f64 {
    let (extent_x, extent_y) = elements.iter().fold((0.0_f64, 0.0_f64), |(ex, ey), element| {
        let x = element.position.x.as_px().unwrap_or(0.0);
        let y = element.position.y.as_px().unwrap_or(0.0);
        let width = element.size.width.as_px().unwrap_or(300.0);
        let height = element.size.height.as_px().unwrap_or(100.0);
        (ex.max(x + width), ey.max(y + height))
    });

    let scale_x = if extent_x > bounds.width {
        bounds.width / extent_x * FIT_MARGIN
    } else {
        1.0
    };
    let scale_y = if extent_y > bounds.height {
        bounds.height / extent_y * FIT_MARGIN
    } else {
        1.0
    };
    let scale = scale_x.min(scale_y);

    if scale < 1.0 {
        for element in elements.iter_mut() {
            element.position.x = element.position.x.scaled(scale);
            element.position.y = element.position.y.scaled(scale);
            element.size.width = element.size.width.scaled(scale);
            element.size.height = element.size.height.scaled(scale);
        }
    }
    scale
}

/// Per-record conversion state.
#[derive(Debug, Default)]
struct Converter {
    seen_ids: HashSet<String>,
    warnings: Vec<String>,
}

impl Converter {
    fn convert(&mut self, index: usize, record: &Value) -> Option<Element> {
        let Some(object) = record.as_object() else {
            self.drop_record(index, &format!("expected an object, found {}", kind_of(record)));
            return None;
        };

        let Some(raw_type) = first(object, TYPE_FIELDS) else {
            self.drop_record(index, "missing type (expected \"type\", \"elementType\" or \"component\")");
            return None;
        };
        let element_type = element_type_from_alias(raw_type.as_str().unwrap_or_default());

        let nested = object.get("position").and_then(Value::as_object);
        let element = Element {
            id: self.element_id(index, object),
            content: extract_content(element_type, object),
            position: extract_position(object, nested),
            size: extract_size(object, nested),
            z_index: extract_z_index(object, nested),
            responsive: extract_responsive(object),
        };
        Some(element)
    }

    fn drop_record(&mut self, index: usize, reason: &str) {
        warn!(index, reason, "Dropping import record");
        self.warnings.push(format!("Element {index}: {reason}"));
    }

    fn element_id(&mut self, index: usize, object: &Map<String, Value>) -> ElementId {
        let given = object.get("id").and_then(text_of).filter(|id| !id.is_empty());
        match given {
            Some(id) if self.seen_ids.insert(id.clone()) => ElementId::from(id),
            Some(id) => {
                let fresh = self.fresh_id();
                warn!(index, duplicate = %id, replacement = %fresh, "Replacing duplicate element id");
                self.warnings.push(format!(
                    "Element {index}: duplicate id {id:?} replaced with {fresh}"
                ));
                fresh
            }
            None => self.fresh_id(),
        }
    }

    fn fresh_id(&mut self) -> ElementId {
        let id = ElementId::new();
        self.seen_ids.insert(id.as_str().to_string());
        id
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// First non-null value among the given keys.
fn first<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn number_of(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

fn dimension_of(value: &Value) -> Option<Dimension> {
    match value {
        Value::Number(number) => number.as_f64().filter(|n| n.is_finite()).map(Dimension::Px),
        Value::String(text) => Dimension::parse(text),
        _ => None,
    }
}

fn list_of(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(object) => {
                        first(object, &["label", "text", "title", "name", "caption", "src", "url"])
                            .and_then(text_of)
                    }
                    other => text_of(other),
                })
                .collect(),
        ),
        Value::String(text) => Some(vec![text.clone()]),
        _ => None,
    }
}

fn extract_position(object: &Map<String, Value>, nested: Option<&Map<String, Value>>) -> Position {
    let pick = |key: &str| nested.and_then(|p| p.get(key)).or_else(|| object.get(key));
    let x = pick("x");
    let y = pick("y");

    // A `y` that is present but not a length is a layout formula we cannot evaluate
    let y = match y {
        Some(raw) if !raw.is_null() => match dimension_of(raw) {
            Some(y) => y,
            None => return Position::default(),
        },
        _ => Dimension::Px(0.0),
    };
    let x = x.and_then(dimension_of).unwrap_or_default();
    Position { x, y }
}

fn extract_size(object: &Map<String, Value>, nested: Option<&Map<String, Value>>) -> Size {
    let size = object.get("size").and_then(Value::as_object);
    let pick = |key: &str| {
        size.and_then(|s| s.get(key))
            .or_else(|| nested.and_then(|p| p.get(key)))
            .or_else(|| object.get(key))
            .filter(|value| !value.is_null())
    };
    let dimension = |key: &str, fallback: Dimension| {
        pick(key).map_or(fallback, |raw| dimension_of(raw).unwrap_or(Dimension::Auto))
    };
    Size::new(
        dimension("width", DEFAULT_IMPORT_SIZE.width),
        dimension("height", DEFAULT_IMPORT_SIZE.height),
    )
}

fn extract_z_index(object: &Map<String, Value>, nested: Option<&Map<String, Value>>) -> i32 {
    object
        .get("zIndex")
        .or_else(|| nested.and_then(|p| p.get("zIndex")))
        .or_else(|| object.get("layer"))
        .or_else(|| object.get("z_index"))
        .and_then(number_of)
        .map_or(1, clamp_z_index)
}

#[allow(clippy::cast_possible_truncation)]
fn clamp_z_index(z: f64) -> i32 {
    z.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

fn extract_override(value: &Value) -> Option<GeometryOverride> {
    let object = value.as_object()?;
    let field = |key: &str| object.get(key).and_then(dimension_of);
    Some(GeometryOverride {
        x: field("x"),
        y: field("y"),
        width: field("width"),
        height: field("height"),
    })
}

fn extract_responsive(object: &Map<String, Value>) -> Responsive {
    let Some(responsive) = object.get("responsive").and_then(Value::as_object) else {
        return Responsive::default();
    };
    Responsive {
        tablet: responsive.get("tablet").and_then(extract_override),
        mobile: responsive.get("mobile").and_then(extract_override),
    }
}

/// Content lookup across the `content` object, `props`, and the record itself.
struct ContentFields<'a> {
    sources: Vec<&'a Map<String, Value>>,
    inline: Option<&'a str>,
}

impl<'a> ContentFields<'a> {
    fn new(object: &'a Map<String, Value>) -> Self {
        let mut sources = Vec::with_capacity(3);
        let mut inline = None;
        match object.get("content") {
            Some(Value::Object(content)) => sources.push(content),
            Some(Value::String(text)) => inline = Some(text.as_str()),
            _ => {}
        }
        for key in ["props", "properties"] {
            if let Some(props) = object.get(key).and_then(Value::as_object) {
                sources.push(props);
            }
        }
        sources.push(object);
        Self { sources, inline }
    }

    fn text(&self, keys: &[&str]) -> Option<String> {
        self.sources
            .iter()
            .find_map(|source| keys.iter().find_map(|key| source.get(*key).and_then(text_of)))
    }

    /// Like [`Self::text`], falling back to a bare string `content`.
    fn primary_text(&self, keys: &[&str]) -> Option<String> {
        self.text(keys).or_else(|| self.inline.map(str::to_string))
    }

    fn list(&self, keys: &[&str]) -> Option<Vec<String>> {
        self.sources
            .iter()
            .find_map(|source| keys.iter().find_map(|key| source.get(*key).and_then(list_of)))
    }
}

fn extract_content(element_type: ElementType, object: &Map<String, Value>) -> ElementContent {
    let fields = ContentFields::new(object);
    match element_type.default_content() {
        ElementContent::Header { text, style } => ElementContent::Header {
            text: fields
                .primary_text(&["text", "title", "brand", "logo", "label", "name"])
                .unwrap_or(text),
            style: fields.text(&["style", "variant"]).unwrap_or(style),
        },
        ElementContent::Footer { copyright, links } => ElementContent::Footer {
            copyright: fields
                .primary_text(&["copyright", "text", "label"])
                .unwrap_or(copyright),
            links: fields.list(&["links", "items", "menu"]).unwrap_or(links),
        },
        ElementContent::Card {
            description, image, ..
        } => ElementContent::Card {
            title: fields.text(&["title", "heading", "name"]),
            description: fields
                .primary_text(&["description", "subtitle", "text", "body"])
                .unwrap_or(description),
            image: fields
                .text(&["image", "imageUrl", "img", "src", "thumbnail"])
                .unwrap_or(image),
        },
        ElementContent::Text { text } => ElementContent::Text {
            text: fields
                .primary_text(&["text", "body", "value", "html", "label"])
                .unwrap_or(text),
        },
        ElementContent::Slider { slides, images } => ElementContent::Slider {
            slides: fields.list(&["slides", "items", "captions"]).unwrap_or(slides),
            images: fields.list(&["images", "imageUrls", "photos"]).unwrap_or(images),
        },
    }
}
