use glam::{Mat4, Vec3};
use std::f32::consts::PI;

/// Perspective camera orbiting a target point.
///
/// The camera position is stored in spherical coordinates around `target`:
/// `polar` is measured from +Y, `azimuth` around Y starting at +Z.
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub polar: f32,
    pub azimuth: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub max_polar: f32,
    /// Radians per pixel of drag.
    pub rotate_speed: f32,
    /// Distance factor per scroll line.
    pub zoom_step: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let mut camera = Self {
            target: Vec3::new(0.0, 10.0, 0.0),
            distance: 1.0,
            polar: 0.0,
            azimuth: 0.0,
            fov: 55.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 1.0,
            far: 20_000.0,
            min_distance: 40.0,
            max_distance: 200.0,
            max_polar: PI * 0.495,
            rotate_speed: 0.005,
            zoom_step: 0.95,
        };
        camera.look_from(Vec3::new(30.0, 30.0, 100.0));
        camera
    }
}

impl OrbitCamera {
    /// Place the camera at `position`, keeping the target, then apply limits.
    pub fn look_from(&mut self, position: Vec3) {
        let offset = position - self.target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return;
        }
        self.distance = distance;
        self.polar = (offset.y / distance).clamp(-1.0, 1.0).acos();
        self.azimuth = offset.x.atan2(offset.z);
        self.apply_limits();
    }

    pub fn position(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        self.target
            + self.distance
                * Vec3::new(
                    sin_polar * self.azimuth.sin(),
                    self.polar.cos(),
                    sin_polar * self.azimuth.cos(),
                )
    }

    /// Drag by `dx`, `dy` pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.azimuth -= dx * self.rotate_speed;
        self.polar -= dy * self.rotate_speed;
        self.apply_limits();
    }

    /// Scroll by `lines`; positive moves closer.
    pub fn zoom(&mut self, lines: f32) {
        self.distance *= self.zoom_step.powf(lines);
        self.apply_limits();
    }

    /// Match the aspect ratio to a new viewport. Position and fov are kept.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    fn apply_limits(&mut self) {
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
        self.polar = self.polar.clamp(1e-4, self.max_polar);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = OrbitCamera::default();
        assert!((cam.position() - Vec3::new(30.0, 30.0, 100.0)).length() < 1e-3);
        assert_eq!(cam.target, Vec3::new(0.0, 10.0, 0.0));
        assert!((cam.fov - 55.0_f32.to_radians()).abs() < 1e-6);
        assert_eq!(cam.near, 1.0);
        assert_eq!(cam.far, 20_000.0);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.zoom(1_000.0);
        assert_eq!(cam.distance, 40.0);
        cam.zoom(-1_000.0);
        assert_eq!(cam.distance, 200.0);
    }

    #[test]
    fn polar_angle_stays_above_water() {
        let mut cam = OrbitCamera::default();
        cam.rotate(0.0, -100_000.0);
        assert!(cam.polar <= PI * 0.495);
        assert!(cam.position().y > cam.target.y - 1e-3);
    }

    #[test]
    fn rotation_keeps_distance() {
        let mut cam = OrbitCamera::default();
        let before = cam.distance;
        cam.rotate(120.0, 15.0);
        let after = (cam.position() - cam.target).length();
        assert!((after - before).abs() < 1e-3);
    }

    #[test]
    fn viewport_changes_only_aspect() {
        let mut cam = OrbitCamera::default();
        let position = cam.position();
        let fov = cam.fov;
        cam.set_viewport(800, 400);
        assert_eq!(cam.aspect, 2.0);
        assert_eq!(cam.position(), position);
        assert_eq!(cam.fov, fov);
    }
}
