//! The per-frame placement pass: collection, collision, fade stepping and
//! draw-call emission.

use std::collections::{BTreeMap, HashSet};

use cartotext_core::{ElementId, LabelKind, ScreenRect, TextElement, TimeMs};
use cartotext_render::{
    CollisionGrid, FontLibrary, GlyphSource, IconDrawCall, ScreenProjector, TextBackend,
    TextDrawCall,
};
use cartotext_style::{LayoutStyle, RenderStyle, StyleCache, TechniqueSet, Theme};
use cartotext_tiles::TileSet;
use glam::Vec2;
use tracing::debug;

use crate::collector::Collector;
use crate::config::PlacementConfig;
use crate::fade::{self, FadeStage, FadeState};

/// A label tracked across frames while fading or visible.
///
/// Keeps the last successfully placed geometry so a fade-out can finish
/// drawing after the owning tile is unloaded.
#[derive(Debug, Clone)]
struct Tracked {
    element: TextElement,
    style: RenderStyle,
    layout: LayoutStyle,
    fade: FadeState,
    screen_pos: Vec2,
    rects: Vec<ScreenRect>,
    icon_only: bool,
}

/// Per-frame text placement engine.
///
/// Owns the collision grid, the style caches and the per-label fade
/// states; all of them are mutated only inside [`TextPlacer::place_text`],
/// which runs the whole collector → collision → fade → draw pass
/// synchronously. The only asynchronous boundary is font catalog loading,
/// surfaced through [`TextPlacer::loading`] and the wait methods.
pub struct TextPlacer {
    config: PlacementConfig,
    theme: Theme,
    techniques: TechniqueSet,
    collector: Collector,
    grid: CollisionGrid,
    styles: StyleCache,
    fonts: FontLibrary,
    tracked: BTreeMap<ElementId, Tracked>,
    visible: HashSet<ElementId>,
    last_time: Option<TimeMs>,
}

impl TextPlacer {
    /// Create an engine instance for the given theme and technique set.
    pub fn new(config: PlacementConfig, theme: Theme, techniques: TechniqueSet) -> Self {
        let grid = CollisionGrid::new(config.collision_cell_size);
        Self {
            config,
            theme,
            techniques,
            collector: Collector::new(),
            grid,
            styles: StyleCache::new(),
            fonts: FontLibrary::new(),
            tracked: BTreeMap::new(),
            visible: HashSet::new(),
            last_time: None,
        }
    }

    /// Run one full frame pass over the currently visible tiles.
    ///
    /// Re-running with identical inputs at an unchanged time produces
    /// identical opacities and placement decisions.
    pub fn place_text(
        &mut self,
        tiles: &mut TileSet,
        projector: &ScreenProjector,
        backend: &mut dyn TextBackend,
        now_ms: TimeMs,
    ) {
        let dt = self
            .last_time
            .map(|last| (now_ms - last).max(0.0))
            .unwrap_or(0.0);

        self.styles.run_frame_updates(projector.zoom(), now_ms);
        self.grid.clear();

        let output = self.collector.collect(
            tiles,
            projector,
            &mut self.styles,
            &self.theme,
            &self.techniques,
            backend,
            &self.visible,
            &self.config,
        );

        for key in &output.dropped_tiles {
            self.styles.drop_tile(*key);
        }
        // Dedup losers are forced invisible without animation.
        for id in &output.merged {
            self.tracked.remove(id);
        }

        let mut seen: HashSet<ElementId> = HashSet::with_capacity(output.candidates.len());
        for candidate in &output.candidates {
            let id = candidate.element.id;

            // A candidate whose font catalog is still loading (or failed)
            // is held pending: state untouched, nothing drawn.
            if let Some(catalog) = &candidate.font_catalog {
                if !self.fonts.is_ready(catalog) {
                    self.fonts.request(catalog);
                    seen.insert(id);
                    continue;
                }
            }
            seen.insert(id);

            let mut placed =
                !candidate.rects.is_empty() && self.grid.allocate_all(&candidate.rects);
            let mut icon_only = false;
            if !placed
                && candidate.icon_without_text
                && candidate.element.kind == LabelKind::Point
                && candidate.rects.len() > 1
                && self.grid.allocate_all(&candidate.rects[1..])
            {
                placed = true;
                icon_only = true;
            }

            // Fade state exists only once a label has been placed.
            if !placed && !self.tracked.contains_key(&id) {
                continue;
            }

            let fade_duration = self.config.fade_duration_ms;
            let entry = self.tracked.entry(id).or_insert_with(|| Tracked {
                element: candidate.element.clone(),
                style: candidate.style,
                layout: candidate.layout,
                fade: FadeState::hidden(now_ms, fade_duration),
                screen_pos: candidate.screen_pos.unwrap_or_default(),
                rects: Vec::new(),
                icon_only: false,
            });

            if candidate.element.fading {
                let snap_out = candidate.element.kind == LabelKind::Path;
                entry.fade = fade::step(entry.fade, dt, placed, now_ms, snap_out);
            } else if placed {
                entry.fade = FadeState::shown(now_ms, fade_duration);
            } else {
                entry.fade = FadeState::hidden(now_ms, fade_duration);
            }

            if placed {
                entry.element = candidate.element.clone();
                entry.style = candidate.style;
                entry.layout = candidate.layout;
                if let Some(pos) = candidate.screen_pos {
                    entry.screen_pos = pos;
                }
                entry.rects = candidate.rects.clone();
                entry.icon_only = icon_only;
            }

            draw_entry(entry, backend);
        }

        // Labels whose tile or candidate vanished finish their fade-out
        // against the last known placement.
        let gone: Vec<ElementId> = self
            .tracked
            .keys()
            .filter(|id| !seen.contains(*id))
            .copied()
            .collect();
        for id in gone {
            if let Some(entry) = self.tracked.get_mut(&id) {
                if entry.element.fading {
                    let snap_out = entry.element.kind == LabelKind::Path;
                    entry.fade = fade::step(entry.fade, dt, false, now_ms, snap_out);
                } else {
                    entry.fade = FadeState::hidden(now_ms, self.config.fade_duration_ms);
                }
                draw_entry(entry, backend);
            }
        }

        self.tracked.retain(|_, entry| !entry.fade.is_done());
        self.visible = self
            .tracked
            .values()
            .filter(|entry| entry.fade.is_visible())
            .map(|entry| entry.element.id)
            .collect();
        debug!(
            frame = projector.frame().0,
            candidates = output.candidates.len(),
            visible = self.visible.len(),
            "placement pass complete"
        );
        self.last_time = Some(now_ms);
    }

    /// Current fade opacity of a tracked label.
    pub fn opacity_of(&self, id: ElementId) -> Option<f32> {
        self.tracked.get(&id).map(|entry| entry.fade.opacity)
    }

    /// Current fade stage of a tracked label.
    pub fn stage_of(&self, id: ElementId) -> Option<FadeStage> {
        self.tracked.get(&id).map(|entry| entry.fade.stage)
    }

    /// Number of labels currently contributing pixels.
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Number of labels tracked across frames (visible or fading).
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Whether any font catalog load is outstanding.
    pub fn loading(&self) -> bool {
        self.fonts.loading()
    }

    /// Drive pending font catalog loads against `source`.
    pub async fn load_fonts(&mut self, source: &dyn GlyphSource) {
        self.fonts.load_pending(source).await;
    }

    /// Resolve once every requested font catalog has loaded or failed.
    pub async fn wait_loaded(&self) {
        self.fonts.wait_loaded().await;
    }

    /// Resolve once the first font load pass has completed.
    pub async fn wait_initialized(&self) {
        self.fonts.wait_initialized().await;
    }

    /// Placement configuration in effect.
    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }
}

fn draw_entry(entry: &Tracked, backend: &mut dyn TextBackend) {
    if !entry.fade.is_visible() {
        return;
    }
    let opacity = entry.fade.opacity * entry.style.opacity;
    if opacity <= 0.0 {
        return;
    }

    match entry.element.kind {
        LabelKind::Point => {
            if !entry.icon_only {
                backend.draw_text(TextDrawCall {
                    element: entry.element.id,
                    text: &entry.element.text,
                    screen_pos: entry.screen_pos,
                    opacity,
                    style: entry.style,
                    layout: entry.layout,
                });
            }
            if let (Some(icon), Some(rect)) = (&entry.element.icon, entry.rects.get(1)) {
                // the icon never renders more opaque than its label's text
                backend.draw_icon(IconDrawCall {
                    element: entry.element.id,
                    icon: &icon.name,
                    rect: *rect,
                    opacity,
                });
            }
        }
        LabelKind::Path => {
            backend.draw_text(TextDrawCall {
                element: entry.element.id,
                text: &entry.element.text,
                screen_pos: entry.screen_pos,
                opacity,
                style: entry.style,
                layout: entry.layout,
            });
        }
        LabelKind::LineMarker => {
            let name = entry
                .element
                .icon
                .as_ref()
                .map(|icon| icon.name.as_str())
                .unwrap_or("marker");
            for rect in &entry.rects {
                backend.draw_icon(IconDrawCall {
                    element: entry.element.id,
                    icon: name,
                    rect: *rect,
                    opacity,
                });
            }
        }
    }
}
