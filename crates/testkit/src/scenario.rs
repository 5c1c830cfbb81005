use cartotext::{PlacementConfig, TextPlacer};
use cartotext_core::{ElementId, IconRef, LabelKind, TechniqueId, TextElement, TileKey, TimeMs};
use cartotext_render::{RecordedIcon, RecordedText, RecordingBackend, ScreenProjector};
use cartotext_style::{StyleExpr, Technique, TechniqueSet, Theme};
use cartotext_tiles::{Tile, TileSet};
use glam::{Vec2, Vec3};

/// Technique id the scenario registers by default for added labels.
pub const DEFAULT_TECHNIQUE: TechniqueId = TechniqueId(1);

/// Draw calls captured for one frame.
#[derive(Debug, Clone)]
pub struct FrameLog {
    /// Frame time passed to the placer.
    pub time_ms: TimeMs,
    /// Text draws this frame.
    pub texts: Vec<RecordedText>,
    /// Icon draws this frame.
    pub icons: Vec<RecordedIcon>,
}

impl FrameLog {
    /// Opacity of the text draw with the given content, if drawn.
    pub fn opacity_of_text(&self, text: &str) -> Option<f32> {
        self.texts
            .iter()
            .find(|t| t.text == text)
            .map(|t| t.opacity)
    }

    /// Whether a text draw with the given content happened this frame.
    pub fn contains_text(&self, text: &str) -> bool {
        self.texts.iter().any(|t| t.text == text)
    }
}

/// Scripted placement scenario over a synthetic tile set.
///
/// Uses a 1:1 top-down projection (world units equal pixels, origin at
/// the viewport center) and fixed-advance glyph metrics, so expected
/// screen geometry can be computed by hand in tests.
pub struct Scenario {
    placer: TextPlacer,
    tiles: TileSet,
    projector: ScreenProjector,
    backend: RecordingBackend,
}

impl Scenario {
    /// Build a scenario with a default constant technique (16 px text).
    pub fn new(config: PlacementConfig) -> Self {
        let mut techniques = TechniqueSet::new();
        techniques.insert(
            Technique::new(DEFAULT_TECHNIQUE).with_size(StyleExpr::Value(16.0)),
        );
        Self::with_techniques(config, Theme::default(), techniques)
    }

    /// Build a scenario with explicit theme and techniques.
    pub fn with_techniques(
        config: PlacementConfig,
        theme: Theme,
        techniques: TechniqueSet,
    ) -> Self {
        Self {
            placer: TextPlacer::new(config, theme, techniques),
            tiles: TileSet::new(),
            projector: ScreenProjector::top_down(
                Vec2::ZERO,
                400.0,
                Vec2::new(800.0, 800.0),
                14.0,
            ),
            backend: RecordingBackend::new(),
        }
    }

    fn tile_mut(&mut self, key: TileKey) -> &mut Tile {
        if !self.tiles.contains(&key) {
            self.tiles.insert(Tile::new(key));
        }
        self.tiles.get_mut(&key).expect("tile just inserted")
    }

    /// Add a point label; returns its stable id.
    pub fn add_point_label(
        &mut self,
        key: TileKey,
        text: &str,
        world: Vec2,
        priority: i32,
    ) -> ElementId {
        let element = TextElement::new(
            text,
            key,
            LabelKind::Point,
            vec![Vec3::new(world.x, world.y, 0.0)],
            priority,
            DEFAULT_TECHNIQUE,
            0.0,
        );
        let id = element.id;
        self.tile_mut(key).add_element(element);
        id
    }

    /// Add a point label with an icon.
    pub fn add_icon_label(
        &mut self,
        key: TileKey,
        text: &str,
        world: Vec2,
        priority: i32,
        icon: &str,
        icon_size: f32,
    ) -> ElementId {
        let element = TextElement::new(
            text,
            key,
            LabelKind::Point,
            vec![Vec3::new(world.x, world.y, 0.0)],
            priority,
            DEFAULT_TECHNIQUE,
            0.0,
        )
        .with_icon(IconRef {
            name: icon.to_string(),
            width: icon_size,
            height: icon_size,
        });
        let id = element.id;
        self.tile_mut(key).add_element(element);
        id
    }

    /// Add a path-following label over `points`.
    pub fn add_path_label(
        &mut self,
        key: TileKey,
        text: &str,
        points: &[Vec2],
        priority: i32,
    ) -> ElementId {
        let anchors = points.iter().map(|p| Vec3::new(p.x, p.y, 0.0)).collect();
        let element = TextElement::new(
            text,
            key,
            LabelKind::Path,
            anchors,
            priority,
            DEFAULT_TECHNIQUE,
            0.0,
        );
        let id = element.id;
        self.tile_mut(key).add_element(element);
        id
    }

    /// Add repeated line markers over `points`.
    pub fn add_line_marker(
        &mut self,
        key: TileKey,
        name: &str,
        points: &[Vec2],
        priority: i32,
        marker_size: f32,
    ) -> ElementId {
        let anchors = points.iter().map(|p| Vec3::new(p.x, p.y, 0.0)).collect();
        let element = TextElement::new(
            name,
            key,
            LabelKind::LineMarker,
            anchors,
            priority,
            DEFAULT_TECHNIQUE,
            0.0,
        )
        .with_icon(IconRef {
            name: name.to_string(),
            width: marker_size,
            height: marker_size,
        });
        let id = element.id;
        self.tile_mut(key).add_element(element);
        id
    }

    /// Unload a tile, invalidating its labels for future frames.
    pub fn remove_tile(&mut self, key: TileKey) {
        self.tiles.remove(&key);
    }

    /// Flag or clear camera motion for subsequent frames.
    pub fn set_camera_moving(&mut self, moving: bool) {
        self.projector.set_moving(moving);
    }

    /// Run a single frame at `time_ms` and capture its draw calls.
    pub fn run_frame(&mut self, time_ms: TimeMs) -> FrameLog {
        self.backend.clear();
        self.placer
            .place_text(&mut self.tiles, &self.projector, &mut self.backend, time_ms);
        self.projector.advance_frame();
        FrameLog {
            time_ms,
            texts: self.backend.texts.clone(),
            icons: self.backend.icons.clone(),
        }
    }

    /// Run one frame per entry of `times`.
    pub fn run_frames(&mut self, times: &[TimeMs]) -> Vec<FrameLog> {
        times.iter().map(|t| self.run_frame(*t)).collect()
    }

    /// Tracked fade opacity of a label.
    pub fn opacity(&self, id: ElementId) -> Option<f32> {
        self.placer.opacity_of(id)
    }

    /// Access the engine under test.
    pub fn placer(&self) -> &TextPlacer {
        &self.placer
    }

    /// Mutable access to the engine under test.
    pub fn placer_mut(&mut self) -> &mut TextPlacer {
        &mut self.placer
    }

    /// Mutable access to the visible tile set.
    pub fn tiles_mut(&mut self) -> &mut TileSet {
        &mut self.tiles
    }
}
