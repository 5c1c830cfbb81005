//! Finalized draw calls handed to the glyph/icon backend.

use bytemuck::{Pod, Zeroable};
use cartotext_core::{ElementId, ScreenRect};
use cartotext_style::{LayoutStyle, RenderStyle};
use glam::Vec2;

use crate::{GlyphMeasure, MonospaceMetrics};

/// Finalized text draw request for one frame.
#[derive(Debug, Clone)]
pub struct TextDrawCall<'a> {
    pub element: ElementId,
    pub text: &'a str,
    /// Screen anchor the layout is placed around.
    pub screen_pos: Vec2,
    /// Final opacity after fade and style resolution.
    pub opacity: f32,
    pub style: RenderStyle,
    pub layout: LayoutStyle,
}

/// Finalized icon/marker draw request.
#[derive(Debug, Clone)]
pub struct IconDrawCall<'a> {
    pub element: ElementId,
    pub icon: &'a str,
    /// Screen rectangle the icon covers.
    pub rect: ScreenRect,
    /// Never exceeds the owning label's text opacity.
    pub opacity: f32,
}

/// Sink for finalized draw calls.
///
/// The backend is also the authority on a label's visual size: the engine
/// asks it for bounds before collision testing rather than guessing.
pub trait TextBackend {
    /// Visual size of `text` under `style`/`layout` in pixels.
    fn text_bounds(&self, text: &str, style: &RenderStyle, layout: &LayoutStyle) -> Vec2;
    /// Push one text draw.
    fn draw_text(&mut self, call: TextDrawCall<'_>);
    /// Push one icon draw.
    fn draw_icon(&mut self, call: IconDrawCall<'_>);
}

/// Packed per-quad instance for GPU-bound backends.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct GlyphInstance {
    /// Screen position of the quad center.
    pub pos: [f32; 2],
    /// Quad size in pixels.
    pub size: [f32; 2],
    /// Text color; the w channel carries the final opacity.
    pub color: [f32; 4],
}

impl GlyphInstance {
    /// Pack a text draw call and its measured bounds.
    pub fn from_text_call(call: &TextDrawCall<'_>, bounds: Vec2) -> Self {
        Self {
            pos: [call.screen_pos.x, call.screen_pos.y],
            size: [bounds.x, bounds.y],
            color: [
                call.style.color.r,
                call.style.color.g,
                call.style.color.b,
                call.opacity,
            ],
        }
    }
}

/// A recorded text draw, owned for later inspection.
#[derive(Debug, Clone)]
pub struct RecordedText {
    pub element: ElementId,
    pub text: String,
    pub screen_pos: Vec2,
    pub opacity: f32,
}

/// A recorded icon draw.
#[derive(Debug, Clone)]
pub struct RecordedIcon {
    pub element: ElementId,
    pub icon: String,
    pub rect: ScreenRect,
    pub opacity: f32,
}

/// Backend that records draw calls instead of rasterizing.
///
/// Backs the headless binary and the scenario tests.
pub struct RecordingBackend<M: GlyphMeasure = MonospaceMetrics> {
    metrics: M,
    /// Text draws since the last clear.
    pub texts: Vec<RecordedText>,
    /// Icon draws since the last clear.
    pub icons: Vec<RecordedIcon>,
}

impl RecordingBackend<MonospaceMetrics> {
    /// Recording backend with fixed-advance metrics.
    pub fn new() -> Self {
        Self::with_metrics(MonospaceMetrics::default())
    }
}

impl Default for RecordingBackend<MonospaceMetrics> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: GlyphMeasure> RecordingBackend<M> {
    /// Recording backend measuring with `metrics`.
    pub fn with_metrics(metrics: M) -> Self {
        Self {
            metrics,
            texts: Vec::new(),
            icons: Vec::new(),
        }
    }

    /// Drop everything recorded so far; typically called per frame.
    pub fn clear(&mut self) {
        self.texts.clear();
        self.icons.clear();
    }
}

impl<M: GlyphMeasure> TextBackend for RecordingBackend<M> {
    fn text_bounds(&self, text: &str, style: &RenderStyle, _layout: &LayoutStyle) -> Vec2 {
        self.metrics.measure(text, style.size)
    }

    fn draw_text(&mut self, call: TextDrawCall<'_>) {
        self.texts.push(RecordedText {
            element: call.element,
            text: call.text.to_string(),
            screen_pos: call.screen_pos,
            opacity: call.opacity,
        });
    }

    fn draw_icon(&mut self, call: IconDrawCall<'_>) {
        self.icons.push(RecordedIcon {
            element: call.element,
            icon: call.icon.to_string(),
            rect: call.rect,
            opacity: call.opacity,
        });
    }
}
