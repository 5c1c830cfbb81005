//! Glyph metrics used to size label bounds before collision testing.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use glam::Vec2;
use lru::LruCache;

use crate::FontError;

/// Line height as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Source of glyph advance metrics used to size label bounds.
pub trait GlyphMeasure: Send + Sync {
    /// Width/height in pixels of `text` rendered at `size_px`.
    /// Newlines start a new line.
    fn measure(&self, text: &str, size_px: f32) -> Vec2;
}

/// Fixed-advance metrics: every glyph advances a constant fraction of the
/// font size. Deterministic and font-file free, used by tests and the
/// headless binary.
#[derive(Debug, Clone)]
pub struct MonospaceMetrics {
    /// Advance per glyph as a fraction of the font size.
    pub advance: f32,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self { advance: 0.6 }
    }
}

impl GlyphMeasure for MonospaceMetrics {
    fn measure(&self, text: &str, size_px: f32) -> Vec2 {
        let mut lines = 0usize;
        let mut widest = 0usize;
        for line in text.split('\n') {
            lines += 1;
            widest = widest.max(line.chars().count());
        }
        Vec2::new(
            widest as f32 * size_px * self.advance,
            lines.max(1) as f32 * size_px * LINE_HEIGHT_FACTOR,
        )
    }
}

/// Real font metrics backed by a parsed font face.
pub struct FontMetrics {
    font: fontdue::Font,
}

impl FontMetrics {
    /// Parse a font face from raw file bytes.
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self, FontError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|err| FontError::Parse(name.to_string(), err.to_string()))?;
        Ok(Self { font })
    }

    fn line_height(&self, size_px: f32) -> f32 {
        self.font
            .horizontal_line_metrics(size_px)
            .map(|m| m.new_line_size)
            .unwrap_or(size_px * LINE_HEIGHT_FACTOR)
    }
}

impl GlyphMeasure for FontMetrics {
    fn measure(&self, text: &str, size_px: f32) -> Vec2 {
        let mut widest = 0.0f32;
        let mut lines = 0usize;
        for line in text.split('\n') {
            lines += 1;
            let width: f32 = line
                .chars()
                .map(|c| self.font.metrics(c, size_px).advance_width)
                .sum();
            widest = widest.max(width);
        }
        Vec2::new(widest, lines.max(1) as f32 * self.line_height(size_px))
    }
}

/// Bounded memoization wrapper for a metrics source.
///
/// Label text repeats heavily across frames; the cache keys on the text
/// and the size bit pattern so repeated measurements are map lookups.
pub struct MeasureCache<M: GlyphMeasure> {
    inner: M,
    cache: Mutex<LruCache<(String, u32), Vec2>>,
}

impl<M: GlyphMeasure> MeasureCache<M> {
    /// Wrap `inner` with an LRU of `capacity` entries.
    pub fn new(inner: M, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Current number of cached measurements.
    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Whether nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<M: GlyphMeasure> GlyphMeasure for MeasureCache<M> {
    fn measure(&self, text: &str, size_px: f32) -> Vec2 {
        let key = (text.to_string(), size_px.to_bits());
        if let Ok(mut cache) = self.cache.lock() {
            return *cache.get_or_insert(key, || self.inner.measure(text, size_px));
        }
        self.inner.measure(text, size_px)
    }
}
