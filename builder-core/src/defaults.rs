//! Per-type element catalog: default size, content, stacking and responsive overrides.
//!
//! | Type   | Size         | z | Tablet             | Mobile                 |
//! |--------|--------------|---|--------------------|------------------------|
//! | header | 100% x 80    |10 | h 64               | h 56                   |
//! | footer | 100% x 60    |10 | h 50               | h 48                   |
//! | card   | 300 x 350    | 1 | w 250, h 300       | w 100%, h auto         |
//! | text   | 400 x auto   | 1 | w 320              | w 100%                 |
//! | slider | 100% x 200   | 1 | h 150              | h 100                  |

use crate::config::Viewport;
use crate::element::{Dimension, ElementContent, ElementType, GeometryOverride, Responsive, Size};

const fn height_only(height: f64) -> GeometryOverride {
    GeometryOverride {
        x: None,
        y: None,
        width: None,
        height: Some(Dimension::Px(height)),
    }
}

const fn sized(width: Dimension, height: Option<Dimension>) -> GeometryOverride {
    GeometryOverride {
        x: None,
        y: None,
        width: Some(width),
        height,
    }
}

impl ElementType {
    /// Desktop size a freshly added element receives.
    #[must_use]
    pub const fn default_size(self) -> Size {
        match self {
            Self::Header => Size::new(Dimension::FULL, Dimension::Px(80.0)),
            Self::Footer => Size::new(Dimension::FULL, Dimension::Px(60.0)),
            Self::Card => Size::px(300.0, 350.0),
            Self::Text => Size::new(Dimension::Px(400.0), Dimension::Auto),
            Self::Slider => Size::new(Dimension::FULL, Dimension::Px(200.0)),
        }
    }

    /// Stacking order a freshly added element receives.
    #[must_use]
    pub const fn default_z_index(self) -> i32 {
        match self {
            Self::Header | Self::Footer => 10,
            Self::Card | Self::Text | Self::Slider => 1,
        }
    }

    /// Placeholder content for a freshly added element.
    #[must_use]
    pub fn default_content(self) -> ElementContent {
        match self {
            Self::Header => ElementContent::Header {
                text: "Site Header".to_string(),
                style: "default".to_string(),
            },
            Self::Footer => ElementContent::Footer {
                copyright: "© 2024 My Website".to_string(),
                links: Vec::new(),
            },
            Self::Card => ElementContent::Card {
                title: Some("Card Title".to_string()),
                description: "This is a content card description.".to_string(),
                image: String::new(),
            },
            Self::Text => ElementContent::Text {
                text: "Click to edit this text content.".to_string(),
            },
            Self::Slider => ElementContent::Slider {
                slides: vec![
                    "Slide 1".to_string(),
                    "Slide 2".to_string(),
                    "Slide 3".to_string(),
                ],
                images: Vec::new(),
            },
        }
    }

    /// Type-level responsive overrides.
    #[must_use]
    pub const fn default_responsive(self) -> Responsive {
        let (tablet, mobile) = match self {
            Self::Header => (height_only(64.0), height_only(56.0)),
            Self::Footer => (height_only(50.0), height_only(48.0)),
            Self::Card => (
                sized(Dimension::Px(250.0), Some(Dimension::Px(300.0))),
                sized(Dimension::FULL, Some(Dimension::Auto)),
            ),
            Self::Text => (
                sized(Dimension::Px(320.0), None),
                sized(Dimension::FULL, None),
            ),
            Self::Slider => (height_only(150.0), height_only(100.0)),
        };
        Responsive {
            tablet: Some(tablet),
            mobile: Some(mobile),
        }
    }

    /// Type-level override for one viewport.
    #[must_use]
    pub const fn default_override(self, viewport: Viewport) -> Option<GeometryOverride> {
        let responsive = self.default_responsive();
        match viewport {
            Viewport::Desktop => None,
            Viewport::Tablet => responsive.tablet,
            Viewport::Mobile => responsive.mobile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_matches_type() {
        for element_type in ElementType::ALL {
            assert_eq!(element_type.default_content().element_type(), element_type);
        }
    }

    #[test]
    fn test_header_and_footer_stack_above_body() {
        assert_eq!(ElementType::Header.default_z_index(), 10);
        assert_eq!(ElementType::Footer.default_z_index(), 10);
        assert_eq!(ElementType::Card.default_z_index(), 1);
    }

    #[test]
    fn test_desktop_has_no_default_override() {
        for element_type in ElementType::ALL {
            assert!(element_type.default_override(Viewport::Desktop).is_none());
        }
    }

    #[test]
    fn test_card_mobile_goes_full_width_auto_height() {
        let mobile = ElementType::Card
            .default_override(Viewport::Mobile)
            .expect("card mobile override");
        assert_eq!(mobile.width, Some(Dimension::FULL));
        assert_eq!(mobile.height, Some(Dimension::Auto));
    }
}
