use async_trait::async_trait;
use cartotext_render::{FontCatalog, FontError, GlyphSource, MonospaceMetrics};

/// Glyph source resolving every catalog immediately with fixed-advance
/// metrics; catalogs listed as broken fail with `FontError::Unavailable`.
#[derive(Debug, Default)]
pub struct TestGlyphSource {
    broken: Vec<String>,
}

impl TestGlyphSource {
    /// Source where every catalog loads successfully.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: make `name` fail to load.
    pub fn with_broken(mut self, name: impl Into<String>) -> Self {
        self.broken.push(name.into());
        self
    }
}

#[async_trait]
impl GlyphSource for TestGlyphSource {
    async fn load_catalog(&self, name: &str) -> Result<FontCatalog, FontError> {
        if self.broken.iter().any(|b| b == name) {
            return Err(FontError::Unavailable(name.to_string()));
        }
        Ok(FontCatalog::new(
            name,
            Box::new(MonospaceMetrics::default()),
        ))
    }
}
