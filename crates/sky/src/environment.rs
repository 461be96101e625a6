use glam::Vec3;
use std::f32::consts::PI;

use crate::SkyUniforms;

// Keep in sync with `sky_radiance` in the WGSL sky module.
const DAY_ZENITH: Vec3 = Vec3::new(0.16, 0.34, 0.72);
const NIGHT_ZENITH: Vec3 = Vec3::new(0.01, 0.015, 0.04);
const DAY_HORIZON: Vec3 = Vec3::new(0.62, 0.72, 0.85);
const DUSK_HORIZON: Vec3 = Vec3::new(0.85, 0.45, 0.22);
const SUN_TINT: Vec3 = Vec3::new(1.0, 0.9, 0.75);
const SUN_DISC_COS: f32 = 0.99996;
const MIE_GAIN: f32 = 40.0;

/// Number of directions sampled when baking.
const BAKE_SAMPLES: u32 = 128;

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Fraction of daylight for a sun at the given height.
fn daylight(sun_height: f32) -> f32 {
    smoothstep(-0.1, 0.25, sun_height)
}

fn rayleigh_phase(cos_theta: f32) -> f32 {
    3.0 / (16.0 * PI) * (1.0 + cos_theta * cos_theta)
}

fn henyey_greenstein(cos_theta: f32, g: f32) -> f32 {
    let g2 = g * g;
    let denom = (1.0 + g2 - 2.0 * g * cos_theta).max(1e-4);
    (1.0 - g2) / (4.0 * PI * denom.powf(1.5))
}

/// Radiance of the procedural sky seen along `dir`.
///
/// A cheap gradient model: the rayleigh term tints the zenith, turbidity
/// washes out the horizon, and the mie lobe draws the glow around the sun.
pub fn sky_radiance(dir: Vec3, sky: &SkyUniforms) -> Vec3 {
    let dir = dir.normalize_or_zero();
    let sun = sky.sun_position.normalize_or_zero();
    let day = daylight(sun.y);

    let zenith = NIGHT_ZENITH.lerp(DAY_ZENITH, day) * (sky.rayleigh * 0.5);
    let haze = (sky.turbidity / 10.0).clamp(0.0, 2.0);
    let horizon = DUSK_HORIZON
        .lerp(DAY_HORIZON, day)
        .lerp(Vec3::splat(0.9), 0.25 * haze)
        * (0.05 + 0.95 * day.max(smoothstep(-0.3, 0.0, sun.y) * 0.4));

    let elevation = dir.y.max(0.0);
    let mut color = horizon.lerp(zenith, elevation.powf(0.45));

    let cos_theta = dir.dot(sun).clamp(-1.0, 1.0);
    color += horizon * rayleigh_phase(cos_theta) * 0.5 * day;
    color += SUN_TINT
        * henyey_greenstein(cos_theta, sky.mie_directional_g)
        * sky.mie_coefficient
        * MIE_GAIN
        * (0.25 + day);

    if cos_theta > SUN_DISC_COS {
        color += SUN_TINT * 8.0 * day.max(0.05);
    }

    if dir.y < 0.0 {
        let depth = (-dir.y).min(1.0).sqrt();
        color = color.lerp(horizon * 0.35, depth);
    }

    color
}

/// Lighting environment baked from the sky.
///
/// Stands in for a prefiltered environment map: hemisphere averages for
/// ambient light plus the direct sun radiance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    /// Cosine-weighted average over the upper hemisphere.
    pub sky_ambient: Vec3,
    /// Average over the lower hemisphere.
    pub ground_ambient: Vec3,
    /// Direct sun radiance, zero once the sun is well below the horizon.
    pub sun_radiance: Vec3,
}

impl Default for Environment {
    fn default() -> Self {
        Self::bake(&SkyUniforms::default())
    }
}

impl Environment {
    /// Sample the sky over a Fibonacci sphere and average it.
    pub fn bake(sky: &SkyUniforms) -> Self {
        let _span = tracing::debug_span!("bake_environment").entered();

        let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
        let mut up_sum = Vec3::ZERO;
        let mut up_weight = 0.0;
        let mut down_sum = Vec3::ZERO;
        let mut down_count = 0u32;

        for i in 0..BAKE_SAMPLES {
            let y = 1.0 - (i as f32 + 0.5) / BAKE_SAMPLES as f32 * 2.0;
            let r = (1.0 - y * y).max(0.0).sqrt();
            let phi = i as f32 * golden_angle;
            let dir = Vec3::new(phi.cos() * r, y, phi.sin() * r);
            let radiance = sky_radiance(dir, sky);

            if y >= 0.0 {
                up_sum += radiance * y;
                up_weight += y;
            } else {
                down_sum += radiance;
                down_count += 1;
            }
        }

        let sun = sky.sun_position.normalize_or_zero();
        let env = Self {
            sky_ambient: if up_weight > 0.0 { up_sum / up_weight } else { Vec3::ZERO },
            ground_ambient: if down_count > 0 {
                down_sum / down_count as f32
            } else {
                Vec3::ZERO
            },
            sun_radiance: SUN_TINT * daylight(sun.y),
        };

        tracing::trace!(
            sky_ambient = ?env.sky_ambient,
            sun_radiance = ?env.sun_radiance,
            "environment baked"
        );
        env
    }
}
