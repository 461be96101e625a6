use glam::Vec3;
use rand::Rng;

/// Uniform scale applied to every loaded model.
pub const MODEL_SCALE: f32 = 10.0;

/// Magnitude bounds for randomly placed models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementBounds {
    /// `x` lands in `(-x, x)`.
    pub x: f32,
    /// `y` lands in `[0, y)`.
    pub y: f32,
    /// `z` lands in `(-z, z)`.
    pub z: f32,
}

impl Default for PlacementBounds {
    fn default() -> Self {
        Self {
            x: 150.0,
            y: 10.0,
            z: 40.0,
        }
    }
}

/// Uniform in `[0, magnitude)` with a fair coin deciding the sign.
fn signed(rng: &mut impl Rng, magnitude: f32) -> f32 {
    let value = if magnitude > 0.0 {
        rng.gen_range(0.0..magnitude)
    } else {
        0.0
    };
    if rng.gen_bool(0.5) { value } else { -value }
}

/// Pick a random model position within `bounds`.
pub fn random_position(rng: &mut impl Rng, bounds: &PlacementBounds) -> Vec3 {
    let x = signed(rng, bounds.x);
    let y = if bounds.y > 0.0 {
        rng.gen_range(0.0..bounds.y)
    } else {
        0.0
    };
    let z = signed(rng, bounds.z);
    Vec3::new(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn positions_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let bounds = PlacementBounds::default();
        for _ in 0..10_000 {
            let p = random_position(&mut rng, &bounds);
            assert!(p.x.abs() <= 150.0, "x out of range: {p:?}");
            assert!((0.0..10.0).contains(&p.y), "y out of range: {p:?}");
            assert!(p.z.abs() <= 40.0, "z out of range: {p:?}");
        }
    }

    #[test]
    fn signs_are_randomized_independently() {
        let mut rng = StdRng::seed_from_u64(11);
        let bounds = PlacementBounds::default();
        let mut quadrants = [0usize; 4];
        for _ in 0..2_000 {
            let p = random_position(&mut rng, &bounds);
            let q = (p.x >= 0.0) as usize * 2 + (p.z >= 0.0) as usize;
            quadrants[q] += 1;
        }
        for count in quadrants {
            assert!(count > 300, "quadrant counts skewed: {quadrants:?}");
        }
    }

    #[test]
    fn same_seed_same_positions() {
        let bounds = PlacementBounds::default();
        let a = random_position(&mut StdRng::seed_from_u64(3), &bounds);
        let b = random_position(&mut StdRng::seed_from_u64(3), &bounds);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_bounds_pin_to_origin() {
        let mut rng = StdRng::seed_from_u64(1);
        let bounds = PlacementBounds {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        };
        let p = random_position(&mut rng, &bounds);
        assert_eq!(p.abs(), Vec3::ZERO);
    }
}
