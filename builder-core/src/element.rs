//! Canvas elements - the units of placement on the page.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::config::Viewport;

/// Unique identifier for an element.
///
/// Fresh identifiers are UUID v4 strings. Imported documents may carry any
/// non-empty string, so the identifier is kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The closed set of element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Site header bar.
    Header,
    /// Site footer bar.
    Footer,
    /// Content card with title, description and image.
    Card,
    /// Free text block.
    Text,
    /// Image/slide carousel.
    Slider,
}

impl ElementType {
    /// Every element type, in palette order.
    pub const ALL: [Self; 5] = [
        Self::Header,
        Self::Footer,
        Self::Card,
        Self::Text,
        Self::Slider,
    ];

    /// Wire name of this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Footer => "footer",
            Self::Card => "card",
            Self::Text => "text",
            Self::Slider => "slider",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A length on the canvas: pixels, a percentage of the container, or `auto`.
///
/// Serialized as a JSON number for pixels, `"N%"` for percentages and
/// `"auto"` for natural size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    /// Absolute pixels in desktop canvas space.
    Px(f64),
    /// Percentage of the container (0-100 scale).
    Percent(f64),
    /// Defer to the rendered natural size.
    Auto,
}

impl Dimension {
    /// Full container width.
    pub const FULL: Self = Self::Percent(100.0);
    /// Half of the container width.
    pub const HALF: Self = Self::Percent(50.0);

    /// Parse a textual dimension (`"120"`, `"120px"`, `"50%"`, `"auto"`).
    ///
    /// Returns `None` for anything else, including formula expressions.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("auto") {
            return Some(Self::Auto);
        }
        if let Some(percent) = trimmed.strip_suffix('%') {
            return percent
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Self::Percent);
        }
        let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
        number
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Self::Px)
    }

    /// Pixel value, if this is an absolute length.
    #[must_use]
    pub const fn as_px(self) -> Option<f64> {
        match self {
            Self::Px(value) => Some(value),
            Self::Percent(_) | Self::Auto => None,
        }
    }

    /// Whether this is the `auto` keyword.
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Multiply an absolute length, leaving percentages and `auto` untouched.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        match self {
            Self::Px(value) => Self::Px((value * factor).round()),
            other => other,
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Self::Px(0.0)
    }
}

impl From<f64> for Dimension {
    fn from(value: f64) -> Self {
        Self::Px(value)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(value) => write!(f, "{value}"),
            Self::Percent(value) => write!(f, "{value}%"),
            Self::Auto => f.write_str("auto"),
        }
    }
}

impl Serialize for Dimension {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Whole pixel values are written as integers to keep exports tidy
            #[allow(clippy::cast_possible_truncation)]
            Self::Px(value) if value.fract() == 0.0 && value.abs() < 9.0e15 => {
                serializer.serialize_i64(*value as i64)
            }
            Self::Px(value) => serializer.serialize_f64(*value),
            Self::Percent(_) | Self::Auto => serializer.collect_str(self),
        }
    }
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(Self::Px(value)),
            Raw::Text(text) => Self::parse(&text)
                .ok_or_else(|| de::Error::custom(format!("invalid dimension: {text:?}"))),
        }
    }
}

/// Top-left corner of an element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal offset.
    pub x: Dimension,
    /// Vertical offset (conventionally pixels).
    pub y: Dimension,
}

impl Position {
    /// Create a pixel position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x: Dimension::Px(x),
            y: Dimension::Px(y),
        }
    }
}

/// Width and height of an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Element width.
    pub width: Dimension,
    /// Element height.
    pub height: Dimension,
}

impl Size {
    /// Create a size from two dimensions.
    #[must_use]
    pub const fn new(width: Dimension, height: Dimension) -> Self {
        Self { width, height }
    }

    /// Create a pixel size.
    #[must_use]
    pub const fn px(width: f64, height: f64) -> Self {
        Self::new(Dimension::Px(width), Dimension::Px(height))
    }
}

/// Partial geometry override for one viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeometryOverride {
    /// Horizontal offset override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Dimension>,
    /// Vertical offset override. Setting it pins the element in the flow layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Dimension>,
    /// Width override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,
    /// Height override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
}

impl GeometryOverride {
    /// Whether no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.width.is_none() && self.height.is_none()
    }
}

/// Per-viewport geometry overrides.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Responsive {
    /// Override applied on tablet viewports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tablet: Option<GeometryOverride>,
    /// Override applied on mobile viewports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<GeometryOverride>,
}

impl Responsive {
    /// Whether neither viewport carries an override.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tablet.is_none() && self.mobile.is_none()
    }

    /// The override for a viewport. Desktop never has one.
    #[must_use]
    pub const fn for_viewport(&self, viewport: Viewport) -> Option<&GeometryOverride> {
        match viewport {
            Viewport::Desktop => None,
            Viewport::Tablet => self.tablet.as_ref(),
            Viewport::Mobile => self.mobile.as_ref(),
        }
    }
}

/// Type-specific element content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum ElementContent {
    /// Header bar content.
    Header {
        /// Header text (site name).
        text: String,
        /// Visual style token.
        style: String,
    },
    /// Footer bar content.
    Footer {
        /// Copyright line.
        copyright: String,
        /// Footer link labels.
        #[serde(default)]
        links: Vec<String>,
    },
    /// Card content.
    Card {
        /// Optional card title.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        /// Card body text.
        description: String,
        /// Image source; empty when the card has no image.
        #[serde(default)]
        image: String,
    },
    /// Text block content.
    Text {
        /// The text itself.
        text: String,
    },
    /// Slider content.
    Slider {
        /// Slide captions.
        #[serde(default)]
        slides: Vec<String>,
        /// Slide image sources.
        #[serde(default)]
        images: Vec<String>,
    },
}

impl ElementContent {
    /// The element type this content belongs to.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        match self {
            Self::Header { .. } => ElementType::Header,
            Self::Footer { .. } => ElementType::Footer,
            Self::Card { .. } => ElementType::Card,
            Self::Text { .. } => ElementType::Text,
            Self::Slider { .. } => ElementType::Slider,
        }
    }
}

/// A placed element: typed content plus geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Typed content; serialized as sibling `type` and `content` fields.
    #[serde(flatten)]
    pub content: ElementContent,
    /// Desktop position.
    pub position: Position,
    /// Desktop size.
    pub size: Size,
    /// Paint order.
    pub z_index: i32,
    /// Per-viewport overrides.
    #[serde(default, skip_serializing_if = "Responsive::is_empty")]
    pub responsive: Responsive,
}

impl Element {
    /// Create an element of the given type with the type's defaults.
    #[must_use]
    pub fn new(element_type: ElementType, position: Position) -> Self {
        Self {
            id: ElementId::new(),
            content: element_type.default_content(),
            position,
            size: element_type.default_size(),
            z_index: element_type.default_z_index(),
            responsive: element_type.default_responsive(),
        }
    }

    /// The element's type.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        self.content.element_type()
    }

    /// Set the identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<ElementId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the size.
    #[must_use]
    pub const fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Set the z-index.
    #[must_use]
    pub const fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Set the responsive overrides.
    #[must_use]
    pub const fn with_responsive(mut self, responsive: Responsive) -> Self {
        self.responsive = responsive;
        self
    }
}

impl AsRef<Element> for Element {
    fn as_ref(&self) -> &Element {
        self
    }
}
