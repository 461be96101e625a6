use glam::Vec3;
use std::f32::consts::PI;

use crate::Parameters;

/// Sun direction for the given inclination and azimuth.
///
/// `theta = π(inclination - 0.5)`, `phi = 2π(azimuth - 0.5)` and the result is
/// `(cos φ, sin φ sin θ, sin φ cos θ)`, which is unit length by construction.
pub fn sun_direction(params: &Parameters) -> Vec3 {
    let theta = PI * (params.inclination - 0.5);
    let phi = 2.0 * PI * (params.azimuth - 0.5);

    Vec3::new(
        phi.cos(),
        phi.sin() * theta.sin(),
        phi.sin() * theta.cos(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(inclination: f32, azimuth: f32) -> Parameters {
        Parameters {
            inclination,
            azimuth,
            ..Parameters::default()
        }
    }

    #[test]
    fn unit_length_over_parameter_grid() {
        for i in 0..=50 {
            for a in 0..=100 {
                let sun = sun_direction(&params(i as f32 * 0.01, a as f32 * 0.01));
                assert!(
                    (sun.length() - 1.0).abs() < 1e-5,
                    "sun {sun:?} not unit length"
                );
            }
        }
    }

    #[test]
    fn default_scenario_matches_literal_expression() {
        let sun = sun_direction(&params(0.49, 0.205));

        let theta = PI * (0.49_f32 - 0.5);
        let phi = 2.0 * PI * (0.205_f32 - 0.5);
        let expected = Vec3::new(phi.cos(), phi.sin() * theta.sin(), phi.sin() * theta.cos());
        assert!((sun - expected).length() < 1e-6);

        // theta = -π/100, phi = -0.59π
        let theta_lit = -PI / 100.0;
        let phi_lit = -0.59 * PI;
        let literal = Vec3::new(
            phi_lit.cos(),
            phi_lit.sin() * theta_lit.sin(),
            phi_lit.sin() * theta_lit.cos(),
        );
        assert!((sun - literal).length() < 1e-5);
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let p = params(0.49, 0.205);
        let a = sun_direction(&p);
        let b = sun_direction(&p);
        assert_eq!(a.to_array().map(f32::to_bits), b.to_array().map(f32::to_bits));
    }

    #[test]
    fn horizon_inclination_has_zero_height() {
        let sun = sun_direction(&params(0.5, 0.3));
        assert!(sun.y.abs() < 1e-6);
    }
}
