//! End-to-end smoke test: one label through a full fade-in.

use cartotext::PlacementConfig;
use cartotext_core::TileKey;
use cartotext_testkit::Scenario;
use glam::Vec2;

#[test]
fn single_label_becomes_visible_and_stays() {
    let config = PlacementConfig {
        fade_duration_ms: 500.0,
        ..Default::default()
    };
    let mut scenario = Scenario::new(config);
    let key = TileKey::new(14, 0, 0);
    let id = scenario.add_point_label(key, "Springfield", Vec2::ZERO, 5);

    let logs = scenario.run_frames(&[0.0, 250.0, 500.0, 750.0]);

    // ramps in, saturates, keeps drawing
    assert!(!logs[0].contains_text("Springfield"));
    assert_eq!(logs[1].opacity_of_text("Springfield"), Some(0.5));
    assert_eq!(logs[2].opacity_of_text("Springfield"), Some(1.0));
    assert_eq!(logs[3].opacity_of_text("Springfield"), Some(1.0));

    assert_eq!(scenario.opacity(id), Some(1.0));
    assert_eq!(scenario.placer().visible_count(), 1);
    assert!(!scenario.placer().loading());
}
