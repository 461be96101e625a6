use glam::Vec3;

use crate::Parameters;

/// Convert a `0xRRGGBB` color to linear-ish `[0, 1]` components.
pub fn hex_rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Inputs of the procedural sky shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyUniforms {
    /// Unnormalized sun position; the shader only uses its direction.
    pub sun_position: Vec3,
    pub turbidity: f32,
    pub rayleigh: f32,
    pub mie_coefficient: f32,
    pub mie_directional_g: f32,
}

impl Default for SkyUniforms {
    fn default() -> Self {
        Self {
            sun_position: Vec3::Y,
            turbidity: 10.0,
            rayleigh: 2.0,
            mie_coefficient: 0.005,
            mie_directional_g: 0.8,
        }
    }
}

/// Inputs of the water surface shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterUniforms {
    /// Wave phase in seconds, advanced by the animation loop.
    pub time: f32,
    pub size: f32,
    pub alpha: f32,
    pub distortion_scale: f32,
    /// Always normalized.
    pub sun_direction: Vec3,
    pub sun_color: Vec3,
    pub water_color: Vec3,
}

impl Default for WaterUniforms {
    fn default() -> Self {
        Self {
            time: 0.0,
            size: 1.0,
            alpha: 1.0,
            distortion_scale: 3.7,
            sun_direction: Vec3::Y,
            sun_color: hex_rgb(0xffffff),
            water_color: hex_rgb(0x001e0f),
        }
    }
}

impl WaterUniforms {
    /// Copy the water fields of `params`. Time and sun are left alone.
    pub fn apply(&mut self, params: &Parameters) {
        let p = params.clamped();
        self.distortion_scale = p.distortion_scale;
        self.size = p.size;
        self.alpha = p.alpha;
    }
}
