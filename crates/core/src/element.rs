use crate::{TileKey, TimeMs};
use glam::Vec3;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Geometry kind of a label candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    /// Single-anchor text, optionally paired with an icon.
    Point,
    /// Text following a polyline.
    Path,
    /// Markers repeated along a polyline.
    LineMarker,
}

/// Stable identity of a text element: content + owning tile + kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl ElementId {
    /// Derive the identity hash. `DefaultHasher::new` uses fixed keys, so
    /// ids are stable across runs.
    pub fn compute(text: &str, tile: TileKey, kind: LabelKind) -> Self {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        tile.hash(&mut hasher);
        kind.hash(&mut hasher);
        Self(hasher.finish())
    }
}

/// Reference to the technique (style rule) that produced a label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TechniqueId(pub u32);

/// Icon attached to a label, sized in screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct IconRef {
    /// Name resolved by the icon backend.
    pub name: String,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

/// A candidate label produced by a tile.
///
/// Point elements carry a single anchor; Path and LineMarker elements carry
/// the polyline they follow. The element is owned by the tile that decoded
/// it and becomes invalid for future frames once that tile is unloaded.
#[derive(Debug, Clone)]
pub struct TextElement {
    /// Stable identity (text + tile + kind).
    pub id: ElementId,
    /// Label text content.
    pub text: String,
    /// Owning tile.
    pub tile: TileKey,
    /// Geometry kind.
    pub kind: LabelKind,
    /// World-space anchor positions; a path for Path/LineMarker kinds.
    pub anchors: Vec<Vec3>,
    /// Collision priority; higher wins.
    pub priority: i32,
    /// Whether visibility changes animate. Non-fading labels snap.
    pub fading: bool,
    /// Style rule used to resolve render/layout parameters.
    pub technique: TechniqueId,
    /// Optional icon drawn with the label.
    pub icon: Option<IconRef>,
    /// Creation timestamp.
    pub created_ms: TimeMs,
}

impl TextElement {
    /// Create a new element; the id is derived from text, tile and kind.
    pub fn new(
        text: impl Into<String>,
        tile: TileKey,
        kind: LabelKind,
        anchors: Vec<Vec3>,
        priority: i32,
        technique: TechniqueId,
        created_ms: TimeMs,
    ) -> Self {
        let text = text.into();
        let id = ElementId::compute(&text, tile, kind);
        Self {
            id,
            text,
            tile,
            kind,
            anchors,
            priority,
            fading: true,
            technique,
            icon: None,
            created_ms,
        }
    }

    /// Builder: attach an icon.
    pub fn with_icon(mut self, icon: IconRef) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Builder: disable fade animation for this label.
    pub fn without_fading(mut self) -> Self {
        self.fading = false;
        self
    }

    /// Primary anchor position.
    pub fn anchor(&self) -> Vec3 {
        self.anchors.first().copied().unwrap_or(Vec3::ZERO)
    }
}
