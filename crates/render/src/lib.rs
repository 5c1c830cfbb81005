//! Screen projection, collision allocation and glyph/draw plumbing for the
//! label placement engine.

mod collision;
mod draw;
mod fonts;
mod glyphs;
mod projector;

pub use collision::*;
pub use draw::*;
pub use fonts::*;
pub use glyphs::*;
pub use projector::*;

use thiserror::Error;

/// Errors from font/glyph resource loading.
#[derive(Debug, Error)]
pub enum FontError {
    /// The catalog data could not be parsed into a usable font.
    #[error("font catalog {0:?} failed to parse: {1}")]
    Parse(String, String),
    /// The catalog is unknown to the source.
    #[error("font catalog {0:?} is not available")]
    Unavailable(String),
}
