//! First-person camera: world pose, perspective parameters and the matrices derived from them.

use std::f32::consts::{FRAC_PI_2, TAU};

use cgmath::{Matrix4, Rad, Vector3};

/// cgmath produces OpenGL clip space (z in [-1, 1]), wgpu expects z in [0, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub const START_POSITION: Vector3<f32> = Vector3::new(0.0, 0.0, 3.0);
pub const START_FOV: f32 = 1.0;
pub const MIN_FOV: f32 = 0.3;
pub const MAX_FOV: f32 = 1.6;
pub const ZNEAR: f32 = 0.1;
pub const ZFAR: f32 = 500.0;
/// Field-of-view change per scroll unit.
pub const ZOOM_STEP: f32 = 0.01;

#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vector3<f32>,
    yaw: f32,
    pitch: f32,
    fov: f32,
    aspect: f32,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self {
            position: START_POSITION,
            yaw: 0.0,
            pitch: 0.0,
            fov: START_FOV,
            aspect: aspect_ratio(width, height),
            view: Matrix4::from_scale(1.0),
            projection: Matrix4::from_scale(1.0),
        };
        camera.update_view();
        camera.update_projection();
        camera
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn view(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn projection(&self) -> Matrix4<f32> {
        self.projection
    }

    /// Horizontal viewing direction, ignoring pitch.
    pub fn forward(&self) -> Vector3<f32> {
        Vector3::new(self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    pub fn left(&self) -> Vector3<f32> {
        Vector3::new(-self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    /// Adds the deltas (radians) to yaw and pitch. Yaw wraps to `[0, 2π)`, pitch clamps
    /// to `±π/2`. The view matrix follows immediately.
    pub fn rotate(&mut self, yaw: f32, pitch: f32) {
        let wrapped = (self.yaw + yaw).rem_euclid(TAU);
        // rem_euclid may round up to exactly TAU for tiny negative inputs
        self.yaw = if wrapped >= TAU { 0.0 } else { wrapped };
        self.pitch = (self.pitch + pitch).clamp(-FRAC_PI_2, FRAC_PI_2);
        self.update_view();
    }

    pub fn zoom(&mut self, delta: f32) {
        self.fov = (self.fov + ZOOM_STEP * delta).clamp(MIN_FOV, MAX_FOV);
        self.update_projection();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
        self.update_projection();
    }

    /// RotX(pitch) · RotY(yaw) · Translate(-position).
    pub fn update_view(&mut self) {
        self.view = Matrix4::from_angle_x(Rad(self.pitch))
            * Matrix4::from_angle_y(Rad(self.yaw))
            * Matrix4::from_translation(-self.position);
    }

    fn update_projection(&mut self) {
        self.projection =
            OPENGL_TO_WGPU_MATRIX * cgmath::perspective(Rad(self.fov), self.aspect, ZNEAR, ZFAR);
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

/// View and projection as the shaders read them (bind group 1).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new(camera: &Camera) -> Self {
        Self {
            view: camera.view().into(),
            projection: camera.projection().into(),
        }
    }
}
