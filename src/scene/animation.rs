//! Slowly cycling shader inputs: brightness pulse, hue rotation and an orbiting light.

use std::f32::consts::TAU;

const BRIGHTNESS_STEP: f32 = 0.005;
const HUE_STEP: f32 = 0.001;
const LIGHT_STEP: f32 = 0.002;

/// Phase accumulators, advanced once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UniformPhases {
    brightness: f32,
    hue: f32,
    light: f32,
}

impl UniformPhases {
    pub fn advance(&mut self) {
        self.brightness = wrap(self.brightness + BRIGHTNESS_STEP, TAU);
        self.hue = wrap(self.hue + HUE_STEP, 1.0);
        self.light = wrap(self.light + LIGHT_STEP, TAU);
    }

    /// Oscillates between 0.5 and 1.0.
    pub fn brightness(&self) -> f32 {
        self.brightness.sin() / 4.0 + 0.75
    }

    /// Fraction of a full turn around the hue circle.
    pub fn hue_rotation(&self) -> f32 {
        self.hue
    }

    /// Unit vector circling the y axis while bobbing around `y = 0.25`.
    pub fn light_direction(&self) -> [f32; 3] {
        let y = 0.25 + self.light.cos() / 8.0;
        let ring = y.acos().sin();
        [self.light.cos() * ring, y, self.light.sin() * ring]
    }

    pub fn uniform(&self) -> SceneUniform {
        SceneUniform {
            light_direction: self.light_direction(),
            brightness: self.brightness(),
            hue_rotation: self.hue_rotation(),
            _padding: [0.0; 3],
        }
    }
}

fn wrap(phase: f32, period: f32) -> f32 {
    if phase > period { phase - period } else { phase }
}

/// Fragment shader inputs (bind group 2).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub light_direction: [f32; 3],
    pub brightness: f32,
    pub hue_rotation: f32,
    pub _padding: [f32; 3],
}

impl Default for SceneUniform {
    fn default() -> Self {
        UniformPhases::default().uniform()
    }
}
