//! cartotext-headless - scripted placement runs without a GPU or window.
//!
//! Builds a small synthetic tile set, runs a fixed number of frames
//! through the placement engine and writes the resulting draw calls as
//! newline-delimited JSON for inspection.

use anyhow::{Context, Result};
use cartotext::{
    IconRef, LabelKind, PlacementConfig, TechniqueId, TextElement, TextPlacer, TileKey,
};
use cartotext_render::{MeasureCache, MonospaceMetrics, RecordingBackend, ScreenProjector};
use cartotext_style::{StyleExpr, Technique, TechniqueSet, Theme};
use cartotext_tiles::{Tile, TileSet};
use glam::{Vec2, Vec3};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::{env, fs};
use tracing::info;

/// One emitted draw call.
#[derive(Debug, Serialize)]
struct PlacementRecord<'a> {
    frame: u64,
    time_ms: f64,
    kind: &'a str,
    label: &'a str,
    x: f32,
    y: f32,
    opacity: f32,
}

struct CliOptions {
    frames: u64,
    dt_ms: f64,
    out: PathBuf,
    config: Option<PathBuf>,
    theme: Option<PathBuf>,
}

impl CliOptions {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut options = Self {
            frames: 120,
            dt_ms: 16.0,
            out: PathBuf::from("placements.jsonl"),
            config: None,
            theme: None,
        };
        while let Some(arg) = args.next() {
            let mut value = |name: &str| {
                args.next()
                    .with_context(|| format!("{name} requires a value"))
            };
            match arg.as_str() {
                "--frames" => options.frames = value("--frames")?.parse()?,
                "--dt" => options.dt_ms = value("--dt")?.parse()?,
                "--out" => options.out = PathBuf::from(value("--out")?),
                "--config" => options.config = Some(PathBuf::from(value("--config")?)),
                "--theme" => options.theme = Some(PathBuf::from(value("--theme")?)),
                other => anyhow::bail!("unknown argument {other:?}"),
            }
        }
        Ok(options)
    }
}

fn demo_techniques() -> TechniqueSet {
    let mut techniques = TechniqueSet::new();
    techniques.insert(
        Technique::new(TechniqueId(1))
            .with_style_name("places")
            .with_size(StyleExpr::Value(16.0)),
    );
    techniques.insert(
        Technique::new(TechniqueId(2))
            .with_style_name("roads")
            .with_size(StyleExpr::ZoomStops(vec![(10.0, 12.0), (16.0, 20.0)])),
    );
    techniques
}

fn demo_tiles() -> TileSet {
    let mut tiles = TileSet::new();

    let key = TileKey::new(14, 0, 0);
    let mut tile = Tile::new(key).with_datasource("demo");
    tile.add_element(TextElement::new(
        "Springfield",
        key,
        LabelKind::Point,
        vec![Vec3::new(-120.0, 40.0, 0.0)],
        10,
        TechniqueId(1),
        0.0,
    ));
    tile.add_element(
        TextElement::new(
            "Museum",
            key,
            LabelKind::Point,
            vec![Vec3::new(60.0, -30.0, 0.0)],
            5,
            TechniqueId(1),
            0.0,
        )
        .with_icon(IconRef {
            name: "museum".to_string(),
            width: 18.0,
            height: 18.0,
        }),
    );
    // deliberately collides with "Museum" to exercise fade-out
    tile.add_element(TextElement::new(
        "Gallery",
        key,
        LabelKind::Point,
        vec![Vec3::new(70.0, -32.0, 0.0)],
        1,
        TechniqueId(1),
        0.0,
    ));
    tiles.insert(tile);

    let key = TileKey::new(14, 1, 0);
    let mut tile = Tile::new(key).with_datasource("demo");
    tile.add_element(TextElement::new(
        "River Rd",
        key,
        LabelKind::Path,
        vec![
            Vec3::new(-200.0, -150.0, 0.0),
            Vec3::new(-100.0, -120.0, 0.0),
            Vec3::new(0.0, -140.0, 0.0),
            Vec3::new(100.0, -160.0, 0.0),
        ],
        3,
        TechniqueId(2),
        0.0,
    ));
    tile.add_element(
        TextElement::new(
            "one-way",
            key,
            LabelKind::LineMarker,
            vec![
                Vec3::new(-150.0, 100.0, 0.0),
                Vec3::new(-50.0, 100.0, 0.0),
                Vec3::new(50.0, 100.0, 0.0),
            ],
            2,
            TechniqueId(2),
            0.0,
        )
        .with_icon(IconRef {
            name: "arrow".to_string(),
            width: 12.0,
            height: 12.0,
        }),
    );
    tiles.insert(tile);

    tiles
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (override via RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting cartotext-headless v{}", cartotext::VERSION);

    let options = CliOptions::parse(env::args().skip(1))?;
    let config = match &options.config {
        Some(path) => PlacementConfig::load_from_path(path),
        None => PlacementConfig::load(),
    };
    let theme = match &options.theme {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading theme {}", path.display()))?;
            Theme::from_json(&json)?
        }
        None => Theme::default(),
    };

    let measurement_cache = config.measurement_cache_size;
    let mut placer = TextPlacer::new(config, theme, demo_techniques());
    let mut tiles = demo_tiles();
    let projector = ScreenProjector::top_down(Vec2::ZERO, 400.0, Vec2::new(800.0, 800.0), 14.5);
    let mut backend = RecordingBackend::with_metrics(MeasureCache::new(
        MonospaceMetrics::default(),
        measurement_cache,
    ));

    // the demo techniques use backend-default glyphs, so this resolves
    // immediately; real embedders drive load_fonts here
    pollster::block_on(placer.wait_loaded());

    let mut out = fs::File::create(&options.out)
        .with_context(|| format!("creating {}", options.out.display()))?;

    for frame in 0..options.frames {
        let time_ms = frame as f64 * options.dt_ms;
        backend.clear();
        placer.place_text(&mut tiles, &projector, &mut backend, time_ms);

        for text in &backend.texts {
            let record = PlacementRecord {
                frame,
                time_ms,
                kind: "text",
                label: &text.text,
                x: text.screen_pos.x,
                y: text.screen_pos.y,
                opacity: text.opacity,
            };
            writeln!(out, "{}", serde_json::to_string(&record)?)?;
        }
        for icon in &backend.icons {
            let center = icon.rect.center();
            let record = PlacementRecord {
                frame,
                time_ms,
                kind: "icon",
                label: &icon.icon,
                x: center.x,
                y: center.y,
                opacity: icon.opacity,
            };
            writeln!(out, "{}", serde_json::to_string(&record)?)?;
        }
    }

    info!(
        "Wrote {} frames of placements to {}",
        options.frames,
        options.out.display()
    );
    Ok(())
}
