//! Canonical serialized representation of a layout.
//!
//! This is the export format and the only durable artifact. It carries no
//! version field; older exports are read back through the import normalizer.

use serde::{Deserialize, Serialize};

use crate::config::CanvasConfig;
use crate::element::Element;

/// Canonical layout document: `{"elements": [...]}` with an optional `canvas`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutDocument {
    /// Elements in list order.
    pub elements: Vec<Element>,
    /// Canvas configuration, present only when exported with it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas: Option<CanvasConfig>,
}

impl LayoutDocument {
    /// Build a document from an element list.
    pub fn from_elements<'a, I>(elements: I) -> Self
    where
        I: IntoIterator<Item = &'a Element>,
    {
        Self {
            elements: elements.into_iter().cloned().collect(),
            canvas: None,
        }
    }

    /// Attach canvas configuration.
    #[must_use]
    pub const fn with_canvas(mut self, canvas: CanvasConfig) -> Self {
        self.canvas = Some(canvas);
        self
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a document that is already in canonical form.
    ///
    /// Use the import normalizer for anything else.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a canonical document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementType, Position};

    #[test]
    fn test_export_omits_canvas_by_default() {
        let header = Element::new(ElementType::Header, Position::new(0.0, 0.0)).with_id("h");
        let document = LayoutDocument::from_elements([&header]);
        let json = document.to_json_pretty().expect("serialize");
        assert!(json.contains("\"elements\""));
        assert!(!json.contains("\"canvas\""));
        assert!(json.contains('\n'), "pretty-printed");
    }

    #[test]
    fn test_canonical_roundtrip_with_canvas() {
        let card = Element::new(ElementType::Card, Position::new(40.0, 80.0));
        let document = LayoutDocument::from_elements([&card]).with_canvas(CanvasConfig {
            max_height: Some(2000.0),
            ..CanvasConfig::default()
        });
        let json = document.to_json_pretty().expect("serialize");
        let back = LayoutDocument::from_json(&json).expect("parse");
        assert_eq!(back, document);
    }
}
