use std::collections::HashMap;

use cartotext_core::TechniqueId;

use crate::{Alignment, StyleExpr, Wrapping};

/// A style rule instance from the map theme.
///
/// Attributes left unset fall through to the named theme style (when
/// `style_name` resolves) and then to hard defaults. Scalar attributes may
/// be zoom/time expressions, which makes the resolved cache entry dynamic.
#[derive(Debug, Clone, Default)]
pub struct Technique {
    pub id: TechniqueId,
    /// Named theme style consulted for attributes the technique leaves unset.
    pub style_name: Option<String>,
    /// Color literal, `#rrggbb` or `#rrggbbaa`.
    pub color: Option<String>,
    pub size: Option<StyleExpr>,
    pub opacity: Option<StyleExpr>,
    pub background_opacity: Option<StyleExpr>,
    pub alignment: Option<Alignment>,
    pub wrapping: Option<Wrapping>,
    pub line_spacing: Option<f32>,
    pub rotation_deg: Option<StyleExpr>,
    /// Font catalog glyphs are resolved from; None uses the backend default.
    pub font_catalog: Option<String>,
    /// Technique-level policy: the icon may stay visible when the text is
    /// suppressed by collision.
    pub icon_without_text: bool,
}

impl Technique {
    /// Minimal technique with every attribute unset.
    pub fn new(id: TechniqueId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Builder: reference a named theme style.
    pub fn with_style_name(mut self, name: impl Into<String>) -> Self {
        self.style_name = Some(name.into());
        self
    }

    /// Builder: set the color literal.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Builder: set the size attribute.
    pub fn with_size(mut self, size: StyleExpr) -> Self {
        self.size = Some(size);
        self
    }

    /// Builder: set the opacity attribute.
    pub fn with_opacity(mut self, opacity: StyleExpr) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Builder: set the font catalog.
    pub fn with_font_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.font_catalog = Some(catalog.into());
        self
    }

    /// Whether any scalar attribute needs per-frame re-evaluation.
    pub fn has_dynamic_attrs(&self) -> bool {
        [&self.size, &self.opacity, &self.background_opacity]
            .into_iter()
            .flatten()
            .any(StyleExpr::is_dynamic)
    }
}

/// Registry of techniques addressed by id.
///
/// Populated by the tile decoding layer; the engine only reads from it.
#[derive(Debug, Clone, Default)]
pub struct TechniqueSet {
    techniques: HashMap<TechniqueId, Technique>,
}

impl TechniqueSet {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a technique.
    pub fn insert(&mut self, technique: Technique) {
        self.techniques.insert(technique.id, technique);
    }

    /// Look up a technique.
    pub fn get(&self, id: TechniqueId) -> Option<&Technique> {
        self.techniques.get(&id)
    }

    /// Number of registered techniques.
    pub fn len(&self) -> usize {
        self.techniques.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.techniques.is_empty()
    }
}
