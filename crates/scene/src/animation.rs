use glam::{Quat, Vec2, Vec3};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::scene::Scene;

/// Water phase advance per step under [`WaterClock::FixedStep`].
pub const WATER_STEP: f32 = 1.0 / 60.0;

/// How the demo cube moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CubeMotion {
    /// Circle of `radius` around the vertical axis at `height`.
    Orbit { radius: f32, height: f32 },
    /// Vertical bob around `baseline`.
    Bob { amplitude: f32, baseline: f32 },
}

impl Default for CubeMotion {
    fn default() -> Self {
        CubeMotion::Orbit {
            radius: 20.0,
            height: 0.0,
        }
    }
}

/// How the water time uniform advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaterClock {
    /// Fixed `1/60` per step no matter how long the frame took, so water
    /// speed is tied to the refresh rate.
    #[default]
    FixedStep,
    /// Advance by the true elapsed time between steps.
    Elapsed,
}

#[derive(Debug, Clone)]
pub struct AnimationConfig {
    pub cube_motion: CubeMotion,
    /// Cube rotation rates around X and Z, in radians per second.
    pub cube_spin: Vec2,
    /// Model rotation rate around Y, in radians per second.
    pub model_spin: f32,
    pub water_clock: WaterClock,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            cube_motion: CubeMotion::default(),
            cube_spin: Vec2::new(0.5, 0.51),
            model_spin: 0.4,
            water_clock: WaterClock::default(),
        }
    }
}

/// Cloneable handle that stops an [`AnimationLoop`].
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Per-frame animation of the scene.
///
/// The cube and models are driven by absolute elapsed time; the water time
/// is accumulated according to [`WaterClock`].
pub struct AnimationLoop {
    config: AnimationConfig,
    stopped: Arc<AtomicBool>,
    frames: u64,
    last_time: Option<f64>,
}

impl AnimationLoop {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            stopped: Arc::new(AtomicBool::new(false)),
            frames: 0,
            last_time: None,
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.stopped.clone())
    }

    pub fn is_running(&self) -> bool {
        !self.stopped.load(Ordering::Acquire)
    }

    /// Number of steps taken so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance the animation to `t` seconds since start.
    ///
    /// Returns `false` and leaves the scene untouched once stopped; the
    /// caller should then stop scheduling frames.
    pub fn step(&mut self, t: f64, scene: &mut Scene) -> bool {
        if !self.is_running() {
            return false;
        }

        if let Some(id) = scene.cube() {
            if let Some(cube) = scene.get_mut(id) {
                cube.transform.position = self.cube_position(t);
                let spin = self.config.cube_spin;
                cube.transform.rotation = Quat::from_euler(
                    glam::EulerRot::XYZ,
                    (t * spin.x as f64) as f32,
                    0.0,
                    (t * spin.y as f64) as f32,
                );
            }
        }

        let model_rotation = Quat::from_rotation_y((t * self.config.model_spin as f64) as f32);
        let model_ids: Vec<_> = scene.models().map(|(id, _)| *id).collect();
        for id in model_ids {
            if let Some(node) = scene.get_mut(id) {
                node.transform.rotation = model_rotation;
            }
        }

        let water = scene.water_mut();
        match self.config.water_clock {
            WaterClock::FixedStep => water.time += WATER_STEP,
            WaterClock::Elapsed => {
                let dt = self.last_time.map_or(0.0, |last| (t - last).max(0.0));
                water.time += dt as f32;
            }
        }

        self.last_time = Some(t);
        self.frames += 1;
        true
    }

    fn cube_position(&self, t: f64) -> Vec3 {
        match self.config.cube_motion {
            CubeMotion::Orbit { radius, height } => Vec3::new(
                (t.sin() * radius as f64) as f32,
                height,
                (t.cos() * radius as f64) as f32,
            ),
            CubeMotion::Bob {
                amplitude,
                baseline,
            } => Vec3::new(0.0, baseline + (t.sin() * amplitude as f64) as f32, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ModelPart, Node, NodeKind, SceneConfig};
    use glam::Mat4;
    use seascape_common::{MeshHandle, Transform};
    use seascape_sky::Parameters;

    fn scene() -> Scene {
        Scene::compose(&SceneConfig::default(), &Parameters::default())
    }

    #[test]
    fn water_time_advances_by_fixed_step() {
        let mut scene = scene();
        let mut anim = AnimationLoop::new(AnimationConfig::default());

        let mut expected = scene.water().time;
        // Irregular frame times must not matter.
        for t in [0.0, 0.001, 0.5, 0.51, 3.0, 3.0, 10.0] {
            let before = scene.water().time;
            assert!(anim.step(t, &mut scene));
            expected += WATER_STEP;
            assert_eq!(scene.water().time, expected);
            assert!(scene.water().time >= before);
        }
        assert_eq!(anim.frames(), 7);
    }

    #[test]
    fn elapsed_clock_tracks_wall_time() {
        let mut scene = scene();
        let mut anim = AnimationLoop::new(AnimationConfig {
            water_clock: WaterClock::Elapsed,
            ..AnimationConfig::default()
        });
        anim.step(1.0, &mut scene);
        assert_eq!(scene.water().time, 0.0);
        anim.step(1.5, &mut scene);
        assert!((scene.water().time - 0.5).abs() < 1e-6);
    }

    #[test]
    fn cube_orbits_origin() {
        let mut scene = scene();
        let mut anim = AnimationLoop::new(AnimationConfig::default());
        let t = 1.3_f64;
        anim.step(t, &mut scene);

        let cube = scene.get(scene.cube().unwrap()).unwrap();
        let p = cube.transform.position;
        assert!((p.x - (t.sin() * 20.0) as f32).abs() < 1e-5);
        assert!((p.z - (t.cos() * 20.0) as f32).abs() < 1e-5);
        assert_eq!(p.y, 0.0);

        let (x, y, z) = cube.transform.rotation.to_euler(glam::EulerRot::XYZ);
        assert!((x - 0.65).abs() < 1e-4);
        assert!(y.abs() < 1e-4);
        assert!((z - 0.663).abs() < 1e-4);
        // Scale from composition is preserved.
        assert_eq!(cube.transform.scale, Vec3::splat(6.0));
    }

    #[test]
    fn cube_bob_variant() {
        let mut scene = scene();
        let mut anim = AnimationLoop::new(AnimationConfig {
            cube_motion: CubeMotion::Bob {
                amplitude: 2.0,
                baseline: 5.0,
            },
            ..AnimationConfig::default()
        });
        anim.step(std::f64::consts::FRAC_PI_2, &mut scene);
        let p = scene.get(scene.cube().unwrap()).unwrap().transform.position;
        assert_eq!(p.x, 0.0);
        assert!((p.y - 7.0).abs() < 1e-5);
    }

    #[test]
    fn models_spin_about_y() {
        let mut scene = scene();
        let id = scene.insert(Node::new(
            "model",
            NodeKind::Model {
                parts: vec![ModelPart {
                    mesh: MeshHandle(1),
                    local: Mat4::IDENTITY,
                    color: [1.0; 4],
                }],
            },
            Transform::from_position(Vec3::new(50.0, 2.0, 5.0)),
        ));
        let mut anim = AnimationLoop::new(AnimationConfig::default());
        anim.step(2.0, &mut scene);

        let node = scene.get(id).unwrap();
        let expected = Quat::from_rotation_y(0.8);
        assert!(node.transform.rotation.abs_diff_eq(expected, 1e-6));
        assert_eq!(node.transform.position, Vec3::new(50.0, 2.0, 5.0));
    }

    #[test]
    fn stopped_loop_does_nothing() {
        let mut scene = scene();
        let mut anim = AnimationLoop::new(AnimationConfig::default());
        let handle = anim.stop_handle();
        anim.step(0.0, &mut scene);
        let time = scene.water().time;

        handle.stop();
        assert!(handle.is_stopped());
        assert!(!anim.is_running());
        assert!(!anim.step(1.0, &mut scene));
        assert_eq!(scene.water().time, time);
        assert_eq!(anim.frames(), 1);
    }
}
