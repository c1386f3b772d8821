use orbit_clock::data_structures::collider::POOL_CAPACITY;
use orbit_clock::scene::digits::{DIGIT_SEGMENTS, EXPIRED_GLYPH};
use orbit_clock::settings::DEFAULT_COUNTDOWN_MS;
use orbit_clock::{CollisionZone, Settings};

mod common;
use common::test_utils::{NOW, scene_showing};

fn bars_for(value: u64) -> usize {
    value
        .to_string()
        .bytes()
        .map(|b| DIGIT_SEGMENTS[usize::from(b - b'0')].count_ones() as usize)
        .sum()
}

#[test]
fn a_full_countdown_ends_in_the_glyph_exactly_once() {
    let mut scene = scene_showing(50);
    let mut cues = 0;
    for ms in 0..120 {
        let now = NOW + ms;
        let report = scene.tick(now);
        cues += usize::from(report.expired);

        let remaining = 50 - ms;
        let expected = if remaining > 0 {
            bars_for(remaining as u64)
        } else {
            EXPIRED_GLYPH.count_ones() as usize
        };
        assert_eq!(scene.digits().len(), expected, "at {remaining} ms left");
        assert_eq!(scene.digits().colliders().len(), expected);
    }
    assert_eq!(cues, 1);
    assert!(scene.is_expired());
}

#[test]
fn restarting_shows_ten_minutes_again() {
    let mut scene = scene_showing(-1);
    assert!(scene.tick(NOW).expired);

    scene.restart_countdown(NOW);
    let report = scene.tick(NOW);
    assert!(!report.expired);
    // 600000
    assert_eq!(scene.digits().len(), bars_for(600_000));
}

#[test]
fn digit_instances_stay_inside_the_zone() {
    let mut scene = scene_showing(9_876_543_210);
    scene.tick(NOW);
    for raw in scene.digits().instances() {
        let t = raw.translation();
        assert!(t.y.abs() <= 22.0);
        assert_eq!(CollisionZone::of(t), CollisionZone::Digits);
    }
}

#[test]
fn the_largest_target_fits_the_pool() {
    let mut settings = Settings::defaults(0);
    settings.timeout = i64::MAX;
    let mut scene = orbit_clock::SceneState::new(settings, 800, 600);
    scene.tick(i64::MIN + 1);
    assert!(scene.digits().len() <= POOL_CAPACITY);
    assert!(!scene.digits().is_empty());
}

#[test]
fn settings_survive_a_save_and_load() {
    let path = std::env::temp_dir().join(format!("orbit-clock-{}.json", std::process::id()));
    let mut settings = Settings::defaults(NOW);
    settings.move_speed = 2.5;
    settings.mouse_sensitivity = 0.75;
    settings.save_to(&path).unwrap();

    let loaded = Settings::load_from(&path, 0);
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn a_restarted_countdown_is_what_gets_stored() {
    let path = std::env::temp_dir().join(format!("orbit-clock-restart-{}.json", std::process::id()));
    let mut scene = scene_showing(50);
    scene.tick(NOW + 100);
    assert!(scene.is_expired());

    let restarted_at = NOW + 5_000;
    scene.restart_countdown(restarted_at);
    scene.settings.save_to(&path).unwrap();

    let loaded = Settings::load_from(&path, 0);
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded.timeout, restarted_at + DEFAULT_COUNTDOWN_MS);
    assert!(!scene.is_expired());
}
