use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::StyleError;

/// Horizontal placement of text relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Line wrapping behavior for multi-line labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wrapping {
    /// Never wrap.
    None,
    /// Break on word boundaries.
    #[default]
    Word,
    /// Break anywhere.
    Character,
}

/// Attribute values of a named theme entry.
///
/// Every field is optional; the style cache falls through to hard defaults
/// for anything left unset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NamedStyle {
    /// Color literal, `#rrggbb` or `#rrggbbaa`.
    pub color: Option<String>,
    /// Font size in pixels.
    pub size: Option<f32>,
    /// Text opacity in [0,1].
    pub opacity: Option<f32>,
    /// Background panel opacity in [0,1].
    pub background_opacity: Option<f32>,
    /// Horizontal alignment.
    pub alignment: Option<Alignment>,
    /// Wrapping mode.
    pub wrapping: Option<Wrapping>,
    /// Line spacing multiplier.
    pub line_spacing: Option<f32>,
    /// Fixed rotation in degrees.
    pub rotation_deg: Option<f32>,
}

/// Map theme: named styles addressed by techniques.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Theme {
    /// Named styles keyed by the name techniques reference.
    #[serde(default)]
    pub styles: HashMap<String, NamedStyle>,
}

impl Theme {
    /// Parse a theme from its JSON document.
    pub fn from_json(json: &str) -> Result<Self, StyleError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up a named style.
    pub fn style(&self, name: &str) -> Option<&NamedStyle> {
        self.styles.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_theme_document() {
        let theme = Theme::from_json(
            r##"{
                "styles": {
                    "roads": {
                        "color": "#e8e4d8",
                        "size": 14.0,
                        "alignment": "left"
                    },
                    "water": { "color": "#2060a0cc", "opacity": 0.9 }
                }
            }"##,
        )
        .unwrap();

        let roads = theme.style("roads").unwrap();
        assert_eq!(roads.color.as_deref(), Some("#e8e4d8"));
        assert_eq!(roads.size, Some(14.0));
        assert_eq!(roads.alignment, Some(Alignment::Left));
        assert!(roads.opacity.is_none());

        assert!(theme.style("missing").is_none());
    }

    #[test]
    fn empty_document_yields_empty_theme() {
        let theme = Theme::from_json("{}").unwrap();
        assert!(theme.styles.is_empty());
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(Theme::from_json("{ not json").is_err());
    }
}
