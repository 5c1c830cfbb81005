use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use cartotext_core::{TechniqueId, TileKey, TimeMs};
use tracing::warn;

use crate::{Alignment, Color, NamedStyle, StyleExpr, Technique, Theme, Wrapping};

/// Hard default text color used when neither technique nor theme supply one.
pub const DEFAULT_TEXT_COLOR: Color = Color::rgb(109.0 / 255.0, 116.0 / 255.0, 119.0 / 255.0);
/// Hard default font size in pixels.
pub const DEFAULT_TEXT_SIZE: f32 = 32.0;
/// Hard default text opacity.
pub const DEFAULT_OPACITY: f32 = 1.0;
/// Hard default background panel opacity.
pub const DEFAULT_BACKGROUND_OPACITY: f32 = 0.5;

/// Resolved render parameters for a label at one (datasource, technique,
/// zoom floor) key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    /// Opaque text color; embedded alpha has been folded into `opacity`.
    pub color: Color,
    /// Font size in pixels.
    pub size: f32,
    /// Text opacity in [0,1].
    pub opacity: f32,
    /// Background panel opacity in [0,1].
    pub background_opacity: f32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_TEXT_COLOR,
            size: DEFAULT_TEXT_SIZE,
            opacity: DEFAULT_OPACITY,
            background_opacity: DEFAULT_BACKGROUND_OPACITY,
        }
    }
}

/// Resolved layout parameters, cached with the same keying scheme as
/// [`RenderStyle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutStyle {
    /// Horizontal alignment relative to the anchor.
    pub alignment: Alignment,
    /// Wrapping mode.
    pub wrapping: Wrapping,
    /// Line spacing multiplier.
    pub line_spacing: f32,
    /// Rotation in degrees.
    pub rotation_deg: f32,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            alignment: Alignment::Center,
            wrapping: Wrapping::Word,
            line_spacing: 1.2,
            rotation_deg: 0.0,
        }
    }
}

fn cache_key(datasource: &str, technique: TechniqueId, zoom_floor: u32) -> u64 {
    let mut hasher = DefaultHasher::new();
    datasource.hash(&mut hasher);
    technique.hash(&mut hasher);
    zoom_floor.hash(&mut hasher);
    hasher.finish()
}

/// Per-frame refresh re-evaluating the dynamic attributes of one entry.
struct FrameUpdater {
    key: u64,
    tile: TileKey,
    refresh: Box<dyn Fn(&mut RenderStyle, f32, TimeMs)>,
}

/// Memoized style resolution keyed by (datasource, technique, zoom floor).
///
/// Entries are immutable once created, except entries with dynamic
/// technique attributes: those register a refresh that mutates the entry
/// in place once per frame, so the cache does not grow with animated
/// styling. The cache is owned by the renderer instance and only mutated
/// inside the frame pass.
#[derive(Default)]
pub struct StyleCache {
    render: HashMap<u64, RenderStyle>,
    layout: HashMap<u64, LayoutStyle>,
    updaters: Vec<FrameUpdater>,
}

impl StyleCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the render style for `technique` at the floored zoom level.
    ///
    /// On a miss every attribute is resolved technique → named theme style
    /// → default, and an entry with dynamic attributes registers a
    /// per-frame refresh owned by `tile`.
    pub fn render_style(
        &mut self,
        technique: &Technique,
        theme: &Theme,
        datasource: &str,
        zoom_floor: u32,
        tile: TileKey,
    ) -> RenderStyle {
        let key = cache_key(datasource, technique.id, zoom_floor);
        if let Some(style) = self.render.get(&key) {
            return *style;
        }

        let named = lookup_named(technique, theme);
        let (style, color_alpha) = resolve_render_style(technique, named, zoom_floor as f32);

        if technique.has_dynamic_attrs() {
            let size = technique.size.clone().filter(StyleExpr::is_dynamic);
            let opacity = technique.opacity.clone().filter(StyleExpr::is_dynamic);
            let background = technique
                .background_opacity
                .clone()
                .filter(StyleExpr::is_dynamic);
            self.updaters.push(FrameUpdater {
                key,
                tile,
                refresh: Box::new(move |entry, zoom, time_ms| {
                    if let Some(expr) = &size {
                        entry.size = expr.eval(zoom, time_ms);
                    }
                    if let Some(expr) = &opacity {
                        entry.opacity = (expr.eval(zoom, time_ms) * color_alpha).clamp(0.0, 1.0);
                    }
                    if let Some(expr) = &background {
                        entry.background_opacity = expr.eval(zoom, time_ms).clamp(0.0, 1.0);
                    }
                }),
            });
        }

        self.render.insert(key, style);
        style
    }

    /// Resolve the layout style for `technique`; identical keying and
    /// fallback scheme as [`StyleCache::render_style`].
    pub fn layout_style(
        &mut self,
        technique: &Technique,
        theme: &Theme,
        datasource: &str,
        zoom_floor: u32,
    ) -> LayoutStyle {
        let key = cache_key(datasource, technique.id, zoom_floor);
        if let Some(style) = self.layout.get(&key) {
            return *style;
        }

        let named = lookup_named(technique, theme);
        let style = resolve_layout_style(technique, named, zoom_floor as f32);
        self.layout.insert(key, style);
        style
    }

    /// Run the registered per-frame refreshes. Called once per frame,
    /// before placement, with the continuous zoom level and frame time.
    pub fn run_frame_updates(&mut self, zoom: f32, time_ms: TimeMs) {
        for updater in &self.updaters {
            if let Some(entry) = self.render.get_mut(&updater.key) {
                (updater.refresh)(entry, zoom, time_ms);
            }
        }
    }

    /// Drop the refreshes owned by an unloaded tile.
    pub fn drop_tile(&mut self, tile: TileKey) {
        self.updaters.retain(|u| u.tile != tile);
    }

    /// Number of cached render entries.
    pub fn render_len(&self) -> usize {
        self.render.len()
    }

    /// Number of registered per-frame refreshes.
    pub fn updater_len(&self) -> usize {
        self.updaters.len()
    }
}

fn lookup_named<'a>(technique: &Technique, theme: &'a Theme) -> Option<&'a NamedStyle> {
    let name = technique.style_name.as_deref()?;
    let named = theme.style(name);
    if named.is_none() {
        warn!(style = name, "technique references unknown theme style, using defaults");
    }
    named
}

/// Resolve color and the alpha factor folded out of it.
fn resolve_color(technique: &Technique, named: Option<&NamedStyle>) -> (Color, f32) {
    let sources = [
        technique.color.as_deref(),
        named.and_then(|n| n.color.as_deref()),
    ];
    for literal in sources.into_iter().flatten() {
        match Color::from_hex(literal) {
            Ok((color, alpha)) => return (color, alpha),
            // Malformed literals count as absent, never as a frame failure.
            Err(err) => warn!(%err, "ignoring malformed color attribute"),
        }
    }
    (DEFAULT_TEXT_COLOR, 1.0)
}

fn resolve_render_style(
    technique: &Technique,
    named: Option<&NamedStyle>,
    zoom_floor: f32,
) -> (RenderStyle, f32) {
    let (color, color_alpha) = resolve_color(technique, named);

    // Dynamic attributes are evaluated at the floored zoom here; the
    // per-frame refresh re-evaluates them with continuous zoom and time.
    let eval = |expr: &Option<StyleExpr>, named_value: Option<f32>, default: f32| {
        expr.as_ref()
            .map(|e| e.eval(zoom_floor, 0.0))
            .or(named_value)
            .unwrap_or(default)
    };

    let size = eval(
        &technique.size,
        named.and_then(|n| n.size),
        DEFAULT_TEXT_SIZE,
    );
    let opacity = eval(
        &technique.opacity,
        named.and_then(|n| n.opacity),
        DEFAULT_OPACITY,
    );
    let background_opacity = eval(
        &technique.background_opacity,
        named.and_then(|n| n.background_opacity),
        DEFAULT_BACKGROUND_OPACITY,
    );

    let style = RenderStyle {
        color,
        size,
        opacity: (opacity * color_alpha).clamp(0.0, 1.0),
        background_opacity: background_opacity.clamp(0.0, 1.0),
    };
    (style, color_alpha)
}

fn resolve_layout_style(
    technique: &Technique,
    named: Option<&NamedStyle>,
    zoom_floor: f32,
) -> LayoutStyle {
    let defaults = LayoutStyle::default();
    LayoutStyle {
        alignment: technique
            .alignment
            .or(named.and_then(|n| n.alignment))
            .unwrap_or(defaults.alignment),
        wrapping: technique
            .wrapping
            .or(named.and_then(|n| n.wrapping))
            .unwrap_or(defaults.wrapping),
        line_spacing: technique
            .line_spacing
            .or(named.and_then(|n| n.line_spacing))
            .unwrap_or(defaults.line_spacing),
        rotation_deg: technique
            .rotation_deg
            .as_ref()
            .map(|e| e.eval(zoom_floor, 0.0))
            .or(named.and_then(|n| n.rotation_deg))
            .unwrap_or(defaults.rotation_deg),
    }
}
