//! Gathers, orders and deduplicates label candidates from visible tiles.

use std::collections::{BTreeMap, HashSet};

use cartotext_core::{ElementId, LabelKind, ScreenRect, TextElement, TileKey};
use cartotext_render::{ScreenProjector, TextBackend};
use cartotext_style::{LayoutStyle, RenderStyle, StyleCache, TechniqueSet, Theme};
use glam::Vec2;
use tracing::debug;

use crate::config::PlacementConfig;

/// A label candidate prepared for placement this frame.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Snapshot of the tile-owned element.
    pub element: TextElement,
    /// Font catalog the technique draws glyphs from, when set.
    pub font_catalog: Option<String>,
    /// Technique-level policy: icon may render even when the text loses
    /// its collision slot.
    pub icon_without_text: bool,
    /// Resolved render parameters.
    pub style: RenderStyle,
    /// Resolved layout parameters.
    pub layout: LayoutStyle,
    /// Screen rectangles that must all be free: the text box first, then
    /// icon/marker boxes. Empty when any required anchor failed to project.
    pub rects: Vec<ScreenRect>,
    /// Primary screen anchor, when projectable.
    pub screen_pos: Option<Vec2>,
    /// Whether the label was visible last frame (recency ranking).
    pub persistent: bool,
}

/// Result of one collection pass.
#[derive(Debug, Clone, Default)]
pub struct CollectorOutput {
    /// Candidates in placement order.
    pub candidates: Vec<Candidate>,
    /// Elements suppressed by deduplication this frame; forced invisible
    /// without animation.
    pub merged: Vec<ElementId>,
    /// Tiles that left the visible set since the previous collection.
    pub dropped_tiles: Vec<TileKey>,
}

struct CachedTile {
    datasource: String,
    elements: Vec<TextElement>,
}

/// Per-frame candidate collection with per-tile caching.
///
/// Tile element lists are snapshotted only when a tile reports a text
/// change; projection, ordering and deduplication run every frame since
/// they depend on the camera.
#[derive(Default)]
pub struct Collector {
    cached: BTreeMap<TileKey, CachedTile>,
    last_output: Option<CollectorOutput>,
}

impl Collector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the ordered candidate sequence for this frame.
    #[allow(clippy::too_many_arguments)]
    pub fn collect(
        &mut self,
        tiles: &mut cartotext_tiles::TileSet,
        projector: &ScreenProjector,
        styles: &mut StyleCache,
        theme: &Theme,
        techniques: &TechniqueSet,
        backend: &dyn TextBackend,
        visible: &HashSet<ElementId>,
        config: &PlacementConfig,
    ) -> CollectorOutput {
        let mut changed = false;

        // Tiles gone from the visible set invalidate their cached elements.
        let dropped_tiles: Vec<TileKey> = self
            .cached
            .keys()
            .filter(|key| !tiles.contains(key))
            .copied()
            .collect();
        for key in &dropped_tiles {
            self.cached.remove(key);
            changed = true;
        }

        for (key, tile) in tiles.iter_mut() {
            let flags = tile.take_change_flags();
            if flags.contains(cartotext_tiles::TileFlags::TEXT_CHANGED)
                || !self.cached.contains_key(key)
            {
                debug!(%key, count = tile.elements().len(), "collecting tile text");
                self.cached.insert(
                    *key,
                    CachedTile {
                        datasource: tile.datasource().to_string(),
                        elements: tile.elements().to_vec(),
                    },
                );
                changed = true;
            }
        }

        // While the camera moves, keep last frame's order instead of
        // re-projecting and re-sorting everything.
        if projector.is_moving() && config.defer_while_moving && !changed {
            if let Some(output) = &self.last_output {
                return output.clone();
            }
        }

        let mut candidates = Vec::new();
        for (key, cached) in &self.cached {
            for element in &cached.elements {
                let Some(technique) = techniques.get(element.technique) else {
                    debug!(id = ?element.id, "element references unknown technique, skipped");
                    continue;
                };
                let style = styles.render_style(
                    technique,
                    theme,
                    &cached.datasource,
                    projector.zoom_floor(),
                    *key,
                );
                let layout =
                    styles.layout_style(technique, theme, &cached.datasource, projector.zoom_floor());
                let (rects, screen_pos) = build_geometry(element, &style, &layout, projector, backend);
                candidates.push(Candidate {
                    element: element.clone(),
                    font_catalog: technique.font_catalog.clone(),
                    icon_without_text: technique.icon_without_text,
                    style,
                    layout,
                    rects,
                    screen_pos,
                    persistent: visible.contains(&element.id),
                });
            }
        }

        // Ranking: recency, then priority, then stable id for determinism.
        candidates.sort_by(|a, b| {
            b.persistent
                .cmp(&a.persistent)
                .then_with(|| b.element.priority.cmp(&a.element.priority))
                .then_with(|| a.element.id.cmp(&b.element.id))
        });

        let merged = if config.dedup_enabled {
            dedup_candidates(&mut candidates, config.dedup_overlap_threshold)
        } else {
            Vec::new()
        };

        let output = CollectorOutput {
            candidates,
            merged,
            dropped_tiles,
        };
        self.last_output = Some(output.clone());
        output
    }
}

/// Merge identical-text point candidates whose boxes overlap by more than
/// `threshold`; only the higher-ranked one survives.
fn dedup_candidates(candidates: &mut Vec<Candidate>, threshold: f32) -> Vec<ElementId> {
    let mut merged = Vec::new();
    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());

    'next: for candidate in candidates.drain(..) {
        if candidate.element.kind == LabelKind::Point && !candidate.rects.is_empty() {
            let bbox = &candidate.rects[0];
            for winner in kept
                .iter()
                .filter(|k| k.element.kind == LabelKind::Point && !k.rects.is_empty())
            {
                if winner.element.text != candidate.element.text {
                    continue;
                }
                let other = &winner.rects[0];
                let smaller = bbox.area().min(other.area()).max(f32::EPSILON);
                if bbox.overlap_area(other) / smaller > threshold {
                    merged.push(candidate.element.id);
                    continue 'next;
                }
            }
        }
        kept.push(candidate);
    }

    *candidates = kept;
    merged
}

fn build_geometry(
    element: &TextElement,
    style: &RenderStyle,
    layout: &LayoutStyle,
    projector: &ScreenProjector,
    backend: &dyn TextBackend,
) -> (Vec<ScreenRect>, Option<Vec2>) {
    // Every anchor must project; a partially visible multi-anchor label
    // cannot satisfy the all-rects-free rule anyway.
    let mut anchors = Vec::with_capacity(element.anchors.len());
    for world in &element.anchors {
        match projector.project(*world) {
            Some(screen) => anchors.push(screen),
            None => return (Vec::new(), None),
        }
    }
    if anchors.is_empty() {
        return (Vec::new(), None);
    }

    let bounds = backend.text_bounds(&element.text, style, layout);
    match element.kind {
        LabelKind::Point => {
            let pos = anchors[0];
            let mut rects = vec![aligned_rect(pos, bounds, layout)];
            if let Some(icon) = &element.icon {
                rects.push(ScreenRect::from_center_size(
                    pos,
                    Vec2::new(icon.width, icon.height),
                ));
            }
            (rects, Some(pos))
        }
        LabelKind::Path => {
            // The text box is divided into per-anchor chunks along the path.
            let chunk = Vec2::new((bounds.x / anchors.len() as f32).max(1.0), bounds.y);
            let rects = anchors
                .iter()
                .map(|p| ScreenRect::from_center_size(*p, chunk))
                .collect();
            let mid = anchors[anchors.len() / 2];
            (rects, Some(mid))
        }
        LabelKind::LineMarker => {
            let marker = element
                .icon
                .as_ref()
                .map(|icon| Vec2::new(icon.width, icon.height))
                .unwrap_or_else(|| Vec2::splat(style.size));
            let rects = anchors
                .iter()
                .map(|p| ScreenRect::from_center_size(*p, marker))
                .collect();
            (rects, Some(anchors[0]))
        }
    }
}

fn aligned_rect(pos: Vec2, bounds: Vec2, layout: &LayoutStyle) -> ScreenRect {
    use cartotext_style::Alignment;
    let half_h = bounds.y * 0.5;
    match layout.alignment {
        Alignment::Center => ScreenRect::from_center_size(pos, bounds),
        Alignment::Left => ScreenRect::new(
            Vec2::new(pos.x, pos.y - half_h),
            Vec2::new(pos.x + bounds.x, pos.y + half_h),
        ),
        Alignment::Right => ScreenRect::new(
            Vec2::new(pos.x - bounds.x, pos.y - half_h),
            Vec2::new(pos.x, pos.y + half_h),
        ),
    }
}
