//! Simulation state shared by the tick and the render stage.
//!
//! [`SceneState`] owns everything that changes over time: camera pose, the digit bars and
//! their colliders, and the animated shader inputs. The renderer only reads it.
//! Each [`SceneState::tick`] moves the camera, rebuilds the digits, resolves collisions
//! and advances the animation, in that order.

pub mod animation;
pub mod celestial;
pub mod digits;

use cgmath::Vector3;

use crate::camera::{Camera, CameraUniform};
use crate::data_structures::collider::{self, BoxCollider};
use crate::input::MovementIntents;
use crate::settings::{DEFAULT_COUNTDOWN_MS, Settings};
use animation::{SceneUniform, UniformPhases};
use celestial::Celestial;
use digits::DigitLayout;

/// Fixed tick rate of the simulation.
pub const TICKS_PER_SECOND: u32 = 120;
/// Distance the camera moves per tick at move speed 1.
pub const BASE_STEP: f32 = 0.1;
pub const FAST_MULTIPLIER: f32 = 5.0;
/// Radians of rotation per pointer unit at sensitivity 1.
pub const ROTATION_STEP: f32 = 0.001;
/// Half-extent of the camera's box collider.
pub const CAMERA_HALF_EXTENT: f32 = 0.5;

/// What a tick produced that the application may react to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Set only on the tick where the countdown ran out.
    pub expired: bool,
}

/// Which colliders a camera position can possibly touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionZone {
    Digits,
    Celestial,
    Open,
}

impl CollisionZone {
    pub fn of(position: Vector3<f32>) -> Self {
        let Vector3 { x, y, z } = position;
        if -25.0 < y && y < 25.0 && -202.0 < z && z < -198.0 {
            CollisionZone::Digits
        } else if x.abs() < 202.0 && y.abs() < 202.0 && -702.0 < z && z < -298.0 {
            CollisionZone::Celestial
        } else {
            CollisionZone::Open
        }
    }
}

#[derive(Debug)]
pub struct SceneState {
    pub camera: Camera,
    pub intents: MovementIntents,
    pub settings: Settings,
    phases: UniformPhases,
    digits: DigitLayout,
    celestial: Celestial,
    expired: bool,
}

impl SceneState {
    pub fn new(settings: Settings, width: u32, height: u32) -> Self {
        Self {
            camera: Camera::new(width, height),
            intents: MovementIntents::default(),
            settings,
            phases: UniformPhases::default(),
            digits: DigitLayout::new(),
            celestial: Celestial::new(),
            expired: false,
        }
    }

    pub fn tick(&mut self, now_millis: i64) -> TickReport {
        self.move_camera();
        let report = self.lay_out_digits(now_millis);
        self.resolve_collision();
        self.camera.update_view();
        self.phases.advance();
        report
    }

    fn move_camera(&mut self) {
        let intents = self.intents;
        let mut speed = BASE_STEP * self.settings.move_speed;
        if intents.fast {
            speed *= FAST_MULTIPLIER;
        }
        let forward = self.camera.forward() * speed;
        let left = self.camera.left() * speed;
        let up = Vector3::unit_y() * speed;

        let camera = &mut self.camera;
        if intents.forward {
            camera.position += forward;
        }
        if intents.backward {
            camera.position -= forward;
        }
        if intents.left {
            camera.position += left;
        }
        if intents.right {
            camera.position -= left;
        }
        if intents.up {
            camera.position += up;
        }
        if intents.down {
            camera.position -= up;
        }
    }

    fn lay_out_digits(&mut self, now_millis: i64) -> TickReport {
        let remaining = self.settings.timeout.saturating_sub(now_millis);
        if remaining > 0 {
            self.expired = false;
            self.digits.lay_out_remaining(remaining as u64);
            return TickReport::default();
        }

        self.digits.lay_out_expired();
        let entered = !self.expired;
        if entered {
            log::info!("countdown expired");
            self.expired = true;
        }
        TickReport { expired: entered }
    }

    /// Applies at most one push, from the first collider in the camera's zone it hits.
    fn resolve_collision(&mut self) {
        let position = self.camera.position;
        let camera = BoxCollider::around(position, CAMERA_HALF_EXTENT);

        let push = match CollisionZone::of(position) {
            CollisionZone::Digits => self.digits.colliders().first_push(&camera),
            CollisionZone::Celestial => {
                if self.celestial.sphere_bounds.overlaps(&camera).hit {
                    celestial::sphere_push(position)
                } else {
                    collider::first_push(&self.celestial.cubes, &camera)
                }
            }
            CollisionZone::Open => None,
        };
        if let Some(push) = push {
            self.camera.position += push;
        }
    }

    /// Pointer deltas scaled by the sensitivity setting. Applied immediately.
    pub fn rotate_camera(&mut self, dx: f32, dy: f32) {
        let sensitivity = ROTATION_STEP * self.settings.mouse_sensitivity;
        self.camera.rotate(sensitivity * dx, sensitivity * dy);
    }

    pub fn zoom_camera(&mut self, delta: f32) {
        self.camera.zoom(delta);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    /// Starts a fresh countdown of the default length.
    pub fn restart_countdown(&mut self, now_millis: i64) {
        self.settings.timeout = now_millis.saturating_add(DEFAULT_COUNTDOWN_MS);
        self.expired = false;
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn digits(&self) -> &DigitLayout {
        &self.digits
    }

    pub fn camera_uniform(&self) -> CameraUniform {
        CameraUniform::new(&self.camera)
    }

    pub fn scene_uniform(&self) -> SceneUniform {
        self.phases.uniform()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    const NOW: i64 = 1_000_000;

    fn scene() -> SceneState {
        SceneState::new(Settings::defaults(NOW), 800, 600)
    }

    #[test]
    fn zones_are_disjoint_boxes() {
        assert_eq!(CollisionZone::of(Vector3::new(0.0, 0.0, 3.0)), CollisionZone::Open);
        assert_eq!(CollisionZone::of(Vector3::new(900.0, 0.0, -200.0)), CollisionZone::Digits);
        assert_eq!(CollisionZone::of(Vector3::new(0.0, 30.0, -200.0)), CollisionZone::Open);
        assert_eq!(CollisionZone::of(Vector3::new(0.0, 0.0, -500.0)), CollisionZone::Celestial);
        assert_eq!(CollisionZone::of(Vector3::new(0.0, 0.0, -702.0)), CollisionZone::Open);
    }

    #[test]
    fn moves_forward_along_the_view() {
        let mut scene = scene();
        scene.intents.forward = true;
        scene.tick(NOW);
        assert!((scene.camera.position - Vector3::new(0.0, 0.0, 2.9)).magnitude() < 1e-6);

        scene.intents.fast = true;
        scene.tick(NOW);
        assert!((scene.camera.position.z - 2.4).abs() < 1e-5);
    }

    #[test]
    fn strafing_and_climbing_ignore_pitch() {
        let mut scene = scene();
        scene.rotate_camera(0.0, 1000.0);
        scene.intents.right = true;
        scene.intents.up = true;
        scene.tick(NOW);
        assert!((scene.camera.position - Vector3::new(0.1, 0.1, 3.0)).magnitude() < 1e-6);
    }

    #[test]
    fn live_countdown_shows_remaining_milliseconds() {
        let mut scene = scene();
        scene.settings.timeout = NOW + 123;
        let report = scene.tick(NOW);
        assert!(!report.expired);
        assert_eq!(scene.digits().len(), 12);
    }

    #[test]
    fn expiry_is_reported_once_per_transition() {
        let mut scene = scene();
        scene.settings.timeout = NOW + 1;
        assert!(!scene.tick(NOW).expired);
        assert!(scene.tick(NOW + 1).expired);
        assert!(!scene.tick(NOW + 500).expired);
        assert!(!scene.tick(NOW + 10_000_000).expired);
        assert_eq!(scene.digits().len(), 6);

        scene.restart_countdown(NOW + 10_000_000);
        assert!(!scene.is_expired());
        scene.settings.timeout = NOW + 10_000_001;
        assert!(scene.tick(NOW + 10_000_001).expired);
    }

    #[test]
    fn far_past_target_still_shows_the_glyph() {
        let mut scene = scene();
        scene.settings.timeout = i64::MIN;
        assert!(scene.tick(NOW).expired);
        assert_eq!(scene.digits().len(), 6);
    }

    #[test]
    fn camera_is_pushed_off_a_digit_bar() {
        let mut scene = scene();
        // one digit: the upper-right bar of a "1" spans x 10..12, y 1..21, z -201..-199
        scene.settings.timeout = NOW + 1;
        scene.camera.position = Vector3::new(10.2, 10.0, -200.0);
        scene.tick(NOW);
        assert!((scene.camera.position.x - 9.5).abs() < 1e-4);
        assert!((scene.camera.position.z + 200.0).abs() < 1e-4);
    }

    #[test]
    fn camera_at_the_sphere_centre_is_pushed_out() {
        let mut scene = scene();
        scene.camera.position = celestial::SPHERE_CENTER;
        scene.tick(NOW);
        let distance = (scene.camera.position - celestial::SPHERE_CENTER).magnitude();
        assert!((distance - 21.0).abs() < 1e-4);
    }

    #[test]
    fn camera_runs_into_an_orbiting_cube() {
        let mut scene = scene();
        let cube = celestial::cube_centers().next().unwrap();
        scene.camera.position = cube + Vector3::new(0.0, 0.0, 0.75);
        scene.tick(NOW);
        let gap = (scene.camera.position - cube).z;
        assert!((gap - 1.0).abs() < 1e-3);
    }

    #[test]
    fn uniforms_advance_every_tick() {
        let mut scene = scene();
        let before = scene.scene_uniform();
        scene.tick(NOW);
        assert_ne!(before, scene.scene_uniform());
    }
}
