#![warn(missing_docs)]
//! Core primitives shared across the workspace.

mod element;
mod geometry;

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use element::{ElementId, IconRef, LabelKind, TechniqueId, TextElement};
pub use geometry::ScreenRect;

/// Frame timestamp in milliseconds, supplied by the embedding frame loop.
pub type TimeMs = f64;

/// Monotonically increasing frame counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameNumber(pub u64);

impl FrameNumber {
    /// First frame of any run.
    pub const ZERO: Self = Self(0);

    /// Advance by one frame.
    pub fn advance(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Tile coordinate (x, y) at a fixed tiling level.
/// Implements Ord for deterministic iteration in BTreeMap/BTreeSet (sorts by level, x, then y).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TileKey {
    /// Tiling level (zoom) the tile belongs to.
    pub level: u8,
    /// Column within the level.
    pub x: i32,
    /// Row within the level.
    pub y: i32,
}

impl TileKey {
    /// Build a key from level and column/row.
    pub const fn new(level: u8, x: i32, y: i32) -> Self {
        Self { level, x, y }
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/({}, {})", self.level, self.x, self.y)
    }
}
