//! cartotext - per-frame map label placement
//!
//! For every candidate label produced by the currently visible map tiles
//! (point text, icons, path-following text, repeated line markers) the
//! engine decides each frame whether it is shown, how opaque it is and
//! where it lands on screen, while avoiding overlap between labels and
//! fading visibility changes instead of popping.
//!
//! # Example
//!
//! ```rust,no_run
//! use cartotext::{PlacementConfig, TextPlacer};
//! use cartotext_render::{RecordingBackend, ScreenProjector};
//! use cartotext_style::{TechniqueSet, Theme};
//! use cartotext_tiles::TileSet;
//! use glam::Vec2;
//!
//! let mut placer = TextPlacer::new(
//!     PlacementConfig::default(),
//!     Theme::default(),
//!     TechniqueSet::new(),
//! );
//! let mut tiles = TileSet::new();
//! let projector = ScreenProjector::top_down(Vec2::ZERO, 400.0, Vec2::new(800.0, 800.0), 10.0);
//! let mut backend = RecordingBackend::new();
//!
//! // In your frame loop:
//! placer.place_text(&mut tiles, &projector, &mut backend, 16.0);
//! ```

pub mod collector;
pub mod config;
pub mod fade;
pub mod placer;

// Re-export commonly used types
pub use collector::{Candidate, Collector, CollectorOutput};
pub use config::PlacementConfig;
pub use fade::{FadeStage, FadeState};
pub use placer::TextPlacer;

pub use cartotext_core::{
    ElementId, FrameNumber, IconRef, LabelKind, ScreenRect, TechniqueId, TextElement, TileKey,
    TimeMs,
};

/// Version of the engine crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
