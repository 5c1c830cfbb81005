//! Frame-by-frame placement scenarios: fade timelines, collisions,
//! deduplication, tile unloading and resource gating.
//!
//! The scenario harness projects 1:1 (world units are pixels, origin at
//! the viewport center) and measures text at 0.6 * size per glyph, so the
//! geometry below is computed by hand.

use cartotext::{FadeStage, PlacementConfig};
use cartotext_core::{IconRef, LabelKind, TechniqueId, TextElement, TileKey};
use cartotext_style::{StyleExpr, Technique, TechniqueSet, Theme};
use cartotext_testkit::{Scenario, TestGlyphSource, DEFAULT_TECHNIQUE};
use cartotext_tiles::Tile;
use glam::{Vec2, Vec3};

fn config_with_fade(fade_duration_ms: f32) -> PlacementConfig {
    PlacementConfig {
        fade_duration_ms,
        ..Default::default()
    }
}

#[test]
fn fade_in_timeline_matches_the_configured_duration() {
    let mut scenario = Scenario::new(config_with_fade(500.0));
    let key = TileKey::new(14, 0, 0);
    let id = scenario.add_point_label(key, "Alpha", Vec2::ZERO, 0);

    let mut opacities = Vec::new();
    for time in [0.0, 250.0, 500.0, 750.0, 1000.0] {
        scenario.run_frame(time);
        opacities.push(scenario.opacity(id).unwrap());
    }
    assert_eq!(opacities, vec![0.0, 0.5, 1.0, 1.0, 1.0]);
    assert_eq!(scenario.placer().stage_of(id), Some(FadeStage::FadedIn));
}

#[test]
fn fade_in_opacity_is_monotonic_across_frames() {
    let mut scenario = Scenario::new(config_with_fade(500.0));
    let key = TileKey::new(14, 0, 0);
    let id = scenario.add_point_label(key, "Alpha", Vec2::ZERO, 0);

    let mut last = -1.0f32;
    for time in [0.0, 100.0, 180.0, 260.0, 420.0, 600.0] {
        scenario.run_frame(time);
        let opacity = scenario.opacity(id).unwrap();
        assert!(opacity >= last, "opacity regressed: {last} -> {opacity}");
        last = opacity;
    }
    assert_eq!(last, 1.0);
}

#[test]
fn tile_removal_fades_out_until_dropped() {
    let mut scenario = Scenario::new(config_with_fade(500.0));
    let key = TileKey::new(14, 0, 0);
    let id = scenario.add_point_label(key, "Beta", Vec2::ZERO, 0);

    scenario.run_frames(&[0.0, 250.0, 500.0]);
    assert_eq!(scenario.opacity(id), Some(1.0));

    scenario.remove_tile(key);
    let mut last = 1.0f32;
    for time in [600.0, 700.0, 800.0, 900.0, 1000.0] {
        let log = scenario.run_frame(time);
        match scenario.opacity(id) {
            Some(opacity) => {
                assert!(
                    opacity < last,
                    "opacity must strictly decrease: {last} -> {opacity}"
                );
                assert_eq!(log.opacity_of_text("Beta"), Some(opacity));
                last = opacity;
            }
            None => {
                // reached FadedOut and was dropped
                assert!(!log.contains_text("Beta"));
                last = 0.0;
            }
        }
    }
    assert_eq!(scenario.opacity(id), None);

    // never drawn again
    let log = scenario.run_frame(1100.0);
    assert!(!log.contains_text("Beta"));
    assert_eq!(scenario.placer().tracked_count(), 0);
}

#[test]
fn unloading_a_tile_mid_fade_in_continues_from_current_opacity() {
    let mut scenario = Scenario::new(config_with_fade(500.0));
    let key = TileKey::new(14, 0, 0);
    let id = scenario.add_point_label(key, "Gamma", Vec2::ZERO, 0);

    scenario.run_frames(&[0.0, 200.0]);
    assert_eq!(scenario.opacity(id), Some(0.4));

    scenario.remove_tile(key);
    scenario.run_frame(300.0);
    // decreases from 0.4, no reset to 0 and no jump up
    let opacity = scenario.opacity(id).unwrap();
    assert!((opacity - 0.2).abs() < 1e-6);

    scenario.run_frame(400.0);
    assert_eq!(scenario.opacity(id), None);
}

#[test]
fn duplicate_point_text_is_merged_and_loser_never_shows() {
    let mut scenario = Scenario::new(config_with_fade(500.0));
    let winner_tile = TileKey::new(14, 0, 0);
    let loser_tile = TileKey::new(14, 1, 0);
    let winner = scenario.add_point_label(winner_tile, "Springfield", Vec2::ZERO, 5);
    let loser = scenario.add_point_label(loser_tile, "Springfield", Vec2::new(2.0, 0.0), 0);

    for time in [0.0, 250.0, 500.0, 750.0] {
        let log = scenario.run_frame(time);
        assert!(scenario.opacity(loser).is_none());
        let drawn = log.texts.iter().filter(|t| t.text == "Springfield").count();
        assert!(drawn <= 1, "merged duplicate must never draw twice");
    }
    assert_eq!(scenario.opacity(winner), Some(1.0));
}

#[test]
fn colliding_labels_resolve_by_priority_regardless_of_insertion_order() {
    let mut scenario = Scenario::new(config_with_fade(500.0));
    let key = TileKey::new(14, 0, 0);
    // the low-priority label is inserted first
    let low = scenario.add_point_label(key, "P0", Vec2::new(2.0, 0.0), 0);
    let high = scenario.add_point_label(key, "P1", Vec2::ZERO, 1);

    for time in [0.0, 250.0, 500.0, 750.0] {
        let log = scenario.run_frame(time);
        assert!(!log.contains_text("P0"));
        assert!(scenario.opacity(low).is_none());
    }
    assert_eq!(scenario.opacity(high), Some(1.0));
    assert_eq!(scenario.placer().stage_of(high), Some(FadeStage::FadedIn));
}

#[test]
fn persistent_label_keeps_its_slot_against_new_higher_priority() {
    let mut scenario = Scenario::new(config_with_fade(500.0));
    let key = TileKey::new(14, 0, 0);
    let old = scenario.add_point_label(key, "Old", Vec2::ZERO, 0);

    scenario.run_frames(&[0.0, 500.0]);
    assert_eq!(scenario.opacity(old), Some(1.0));

    // a colliding newcomer with higher priority ranks below the label
    // that is already visible
    let newcomer_tile = TileKey::new(14, 1, 0);
    let newcomer = scenario.add_point_label(newcomer_tile, "New", Vec2::new(2.0, 0.0), 9);

    scenario.run_frames(&[600.0, 700.0]);
    assert_eq!(scenario.opacity(old), Some(1.0));
    assert!(scenario.opacity(newcomer).is_none());
}

#[test]
fn replacement_with_identical_inputs_and_time_is_idempotent() {
    let mut scenario = Scenario::new(config_with_fade(500.0));
    let key = TileKey::new(14, 0, 0);
    let a = scenario.add_point_label(key, "Alpha", Vec2::new(-100.0, 0.0), 1);
    let b = scenario.add_point_label(key, "Beta", Vec2::new(100.0, 0.0), 0);

    scenario.run_frame(0.0);
    let first = scenario.run_frame(250.0);
    let opacities = (scenario.opacity(a), scenario.opacity(b));

    let second = scenario.run_frame(250.0);
    assert_eq!((scenario.opacity(a), scenario.opacity(b)), opacities);
    assert_eq!(first.texts.len(), second.texts.len());
    for (x, y) in first.texts.iter().zip(second.texts.iter()) {
        assert_eq!(x.element, y.element);
        assert_eq!(x.opacity, y.opacity);
        assert_eq!(x.screen_pos, y.screen_pos);
    }
}

#[test]
fn path_labels_fade_in_but_snap_out() {
    let mut scenario = Scenario::new(config_with_fade(500.0));
    let key = TileKey::new(14, 0, 0);
    let id = scenario.add_path_label(
        key,
        "River Rd",
        &[
            Vec2::new(-60.0, 0.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(60.0, 0.0),
        ],
        0,
    );

    scenario.run_frames(&[0.0, 250.0]);
    assert_eq!(scenario.opacity(id), Some(0.5));

    // the out direction is not animated for path text
    scenario.remove_tile(key);
    let log = scenario.run_frame(350.0);
    assert!(!log.contains_text("River Rd"));
    assert_eq!(scenario.opacity(id), None);
}

#[test]
fn line_markers_draw_one_icon_per_anchor() {
    let mut scenario = Scenario::new(config_with_fade(500.0));
    let key = TileKey::new(14, 0, 0);
    scenario.add_line_marker(
        key,
        "arrow",
        &[
            Vec2::new(-50.0, 100.0),
            Vec2::new(0.0, 100.0),
            Vec2::new(50.0, 100.0),
        ],
        0,
        12.0,
    );

    scenario.run_frame(0.0);
    let log = scenario.run_frame(250.0);
    let arrows: Vec<_> = log.icons.iter().filter(|i| i.icon == "arrow").collect();
    assert_eq!(arrows.len(), 3);
    for arrow in arrows {
        assert_eq!(arrow.opacity, 0.5);
    }
}

#[test]
fn multi_anchor_allocation_is_all_or_nothing() {
    let mut scenario = Scenario::new(config_with_fade(500.0));
    let key = TileKey::new(14, 0, 0);
    // the middle marker anchor lands inside this label's bounding box
    scenario.add_point_label(key, "Block", Vec2::new(0.0, 100.0), 10);
    let marker = scenario.add_line_marker(
        key,
        "arrow",
        &[
            Vec2::new(-50.0, 100.0),
            Vec2::new(0.0, 100.0),
            Vec2::new(50.0, 100.0),
        ],
        0,
        12.0,
    );

    for time in [0.0, 250.0, 500.0] {
        let log = scenario.run_frame(time);
        // outer markers would fit, but partial placement is forbidden
        assert!(log.icons.iter().all(|i| i.icon != "arrow"));
    }
    assert!(scenario.opacity(marker).is_none());
}

#[test]
fn icons_share_their_labels_fade_opacity() {
    let mut scenario = Scenario::new(config_with_fade(500.0));
    let key = TileKey::new(14, 0, 0);
    scenario.add_icon_label(key, "Museum", Vec2::ZERO, 0, "museum", 18.0);

    scenario.run_frame(0.0);
    let log = scenario.run_frame(250.0);
    let text_opacity = log.opacity_of_text("Museum").unwrap();
    let icon = log.icons.iter().find(|i| i.icon == "museum").unwrap();
    assert_eq!(icon.opacity, text_opacity);
    assert!(icon.opacity <= text_opacity);
}

#[test]
fn icon_without_text_fallback_renders_only_the_icon() {
    let mut techniques = TechniqueSet::new();
    techniques.insert(Technique::new(DEFAULT_TECHNIQUE).with_size(StyleExpr::Value(16.0)));
    let fallback_technique = TechniqueId(2);
    techniques.insert(Technique {
        icon_without_text: true,
        ..Technique::new(fallback_technique).with_size(StyleExpr::Value(16.0))
    });

    let mut scenario =
        Scenario::with_techniques(config_with_fade(500.0), Theme::default(), techniques);
    let key = TileKey::new(14, 0, 0);
    scenario.add_point_label(key, "Blocker", Vec2::ZERO, 10);

    let icon_tile = TileKey::new(14, 1, 0);
    let mut tile = Tile::new(icon_tile);
    // text box overlaps "Blocker", the 10px icon box does not
    tile.add_element(
        TextElement::new(
            "Cafe",
            icon_tile,
            LabelKind::Point,
            vec![Vec3::new(40.0, 0.0, 0.0)],
            0,
            fallback_technique,
            0.0,
        )
        .with_icon(IconRef {
            name: "cafe".to_string(),
            width: 10.0,
            height: 10.0,
        }),
    );
    scenario.tiles_mut().insert(tile);

    scenario.run_frame(0.0);
    let log = scenario.run_frame(250.0);
    assert!(!log.contains_text("Cafe"));
    assert!(log.icons.iter().any(|i| i.icon == "cafe"));
}

#[test]
fn labels_wait_for_their_font_catalog() {
    let mut techniques = TechniqueSet::new();
    techniques.insert(
        Technique::new(DEFAULT_TECHNIQUE)
            .with_size(StyleExpr::Value(16.0))
            .with_font_catalog("mapfont"),
    );
    let mut scenario =
        Scenario::with_techniques(config_with_fade(500.0), Theme::default(), techniques);
    let key = TileKey::new(14, 0, 0);
    let id = scenario.add_point_label(key, "Pending", Vec2::ZERO, 0);

    // held pending while the catalog loads; not an allocation failure
    let log = scenario.run_frame(0.0);
    assert!(!log.contains_text("Pending"));
    assert!(scenario.opacity(id).is_none());
    assert!(scenario.placer().loading());

    pollster::block_on(scenario.placer_mut().load_fonts(&TestGlyphSource::new()));
    assert!(!scenario.placer().loading());
    pollster::block_on(scenario.placer().wait_loaded());
    pollster::block_on(scenario.placer().wait_initialized());

    scenario.run_frame(100.0);
    scenario.run_frame(350.0);
    assert_eq!(scenario.opacity(id), Some(0.5));
}

#[test]
fn failed_font_catalogs_leave_labels_pending_forever() {
    let mut techniques = TechniqueSet::new();
    techniques.insert(
        Technique::new(DEFAULT_TECHNIQUE)
            .with_size(StyleExpr::Value(16.0))
            .with_font_catalog("mapfont"),
    );
    let mut scenario =
        Scenario::with_techniques(config_with_fade(500.0), Theme::default(), techniques);
    let key = TileKey::new(14, 0, 0);
    let id = scenario.add_point_label(key, "Orphan", Vec2::ZERO, 0);

    scenario.run_frame(0.0);
    pollster::block_on(
        scenario
            .placer_mut()
            .load_fonts(&TestGlyphSource::new().with_broken("mapfont")),
    );
    assert!(!scenario.placer().loading());

    for time in [100.0, 200.0, 300.0] {
        let log = scenario.run_frame(time);
        assert!(!log.contains_text("Orphan"));
        assert!(scenario.opacity(id).is_none());
    }
}

#[test]
fn dynamic_opacity_expressions_refresh_every_frame() {
    let mut techniques = TechniqueSet::new();
    techniques.insert(
        Technique::new(DEFAULT_TECHNIQUE)
            .with_size(StyleExpr::Value(16.0))
            .with_opacity(StyleExpr::Pulse {
                period_ms: 1000.0,
                min: 0.0,
                max: 1.0,
            }),
    );
    let mut scenario =
        Scenario::with_techniques(config_with_fade(100.0), Theme::default(), techniques);
    let key = TileKey::new(14, 0, 0);
    scenario.add_point_label(key, "Pulse", Vec2::ZERO, 0);

    scenario.run_frames(&[0.0, 100.0]);

    // fade is saturated; drawn opacity follows the expression
    let peak = scenario.run_frame(1250.0);
    assert!((peak.opacity_of_text("Pulse").unwrap() - 1.0).abs() < 1e-3);

    let half = scenario.run_frame(1500.0);
    assert!((half.opacity_of_text("Pulse").unwrap() - 0.5).abs() < 1e-3);
}

#[test]
fn camera_motion_defers_collection_but_fades_continue() {
    let mut scenario = Scenario::new(config_with_fade(500.0));
    let key = TileKey::new(14, 0, 0);
    let id = scenario.add_point_label(key, "Steady", Vec2::ZERO, 0);

    scenario.run_frames(&[0.0, 250.0]);
    assert_eq!(scenario.opacity(id), Some(0.5));

    scenario.set_camera_moving(true);
    let log = scenario.run_frame(500.0);
    assert_eq!(scenario.opacity(id), Some(1.0));
    assert!(log.contains_text("Steady"));
}
