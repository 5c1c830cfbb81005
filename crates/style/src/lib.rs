//! Theme/technique resolution and the per-frame style parameter caches.

mod cache;
mod color;
mod expr;
mod technique;
mod theme;

pub use cache::*;
pub use color::*;
pub use expr::*;
pub use technique::*;
pub use theme::*;

use thiserror::Error;

/// Errors surfaced while loading themes or parsing style attributes.
#[derive(Debug, Error)]
pub enum StyleError {
    /// A color literal could not be parsed.
    #[error("invalid color literal {0:?}")]
    InvalidColor(String),
    /// A theme document failed to deserialize.
    #[error("failed to parse theme: {0}")]
    Theme(#[from] serde_json::Error),
}
