use glam::Vec3;
use seascape_assets::{LoadError, LoadTicket, MeshData, ModelLoader};
use seascape_common::MeshHandle;
use seascape_render_wgpu::OrbitCamera;
use seascape_scene::{AnimationConfig, AnimationLoop, ModelPart, Node, NodeKind, Scene, SceneConfig};
use seascape_sky::Parameters;
use seascape_tools::FrameStats;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Where the default jellyfish go.
pub const DEFAULT_MODEL_POSITIONS: [Vec3; 3] = [
    Vec3::new(-60.0, 0.0, 5.0),
    Vec3::new(50.0, 2.0, 5.0),
    Vec3::new(0.0, 0.0, 30.0),
];

/// Default model path relative to the assets directory.
pub const DEFAULT_MODEL: &str = "jellyfish_0/scene.gltf";

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub scene: SceneConfig,
    pub animation: AnimationConfig,
    pub params: Parameters,
    /// Extra attempts for a failed model load.
    pub load_retries: u32,
}

/// Which part of the parameters an edit touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamEdit {
    Sun,
    Water,
}

/// Everything one window shows: scene, camera, animation and loads.
///
/// Owned by the render thread. GPU objects live beside it in the app.
pub struct Session {
    pub scene: Scene,
    pub params: Parameters,
    pub camera: OrbitCamera,
    pub animation: AnimationLoop,
    pub loader: ModelLoader,
    pub stats: FrameStats,
    viewport: (u32, u32),
    load_retries: u32,
    attempts: HashMap<LoadTicket, u32>,
    started: Instant,
    last_frame: Instant,
}

impl Session {
    pub fn new(width: u32, height: u32, config: SessionConfig) -> Self {
        Self::with_loader(width, height, config, ModelLoader::new())
    }

    pub fn with_loader(width: u32, height: u32, config: SessionConfig, loader: ModelLoader) -> Self {
        let params = config.params.clamped();
        let mut camera = OrbitCamera::default();
        camera.set_viewport(width, height);
        let scene = Scene::compose(&config.scene, &params);
        let now = Instant::now();

        tracing::info!(width, height, nodes = scene.node_count(), "session started");

        Self {
            scene,
            params,
            camera,
            animation: AnimationLoop::new(config.animation),
            loader,
            stats: FrameStats::default(),
            viewport: (width.max(1), height.max(1)),
            load_retries: config.load_retries,
            attempts: HashMap::new(),
            started: now,
            last_frame: now,
        }
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Follow a window resize. Camera position and fov are kept.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1), height.max(1));
        self.camera.set_viewport(width, height);
        tracing::debug!(width, height, "viewport resized");
    }

    /// Replace the parameters after a GUI edit and push the change into
    /// the scene. The water uniforms always follow; sun edits also re-bake
    /// the environment.
    pub fn set_params(&mut self, params: Parameters, edit: ParamEdit) {
        self.params = params.clamped();
        self.scene.apply_water(&self.params);
        if edit == ParamEdit::Sun {
            self.scene.update_sun(&self.params);
        }
    }

    /// Queue a model load. Without a position one is picked at random.
    pub fn load_model(&mut self, path: impl Into<PathBuf>, position: Option<Vec3>) -> LoadTicket {
        let ticket = self.loader.load(path, position);
        self.attempts.insert(ticket, 0);
        ticket
    }

    /// Queue the three default jellyfish from `assets_dir`.
    pub fn queue_default_models(&mut self, assets_dir: &Path) {
        let path = assets_dir.join(DEFAULT_MODEL);
        for position in DEFAULT_MODEL_POSITIONS {
            self.load_model(path.clone(), Some(position));
        }
    }

    /// Insert every finished load into the scene.
    ///
    /// `upload` turns each mesh into a renderer handle. A model is inserted
    /// as one node with all its parts, so a frame never sees half of it.
    /// Failures leave the scene alone and are retried while attempts
    /// remain. Returns the number of models inserted.
    pub fn drain_loads(&mut self, mut upload: impl FnMut(&MeshData) -> MeshHandle) -> usize {
        let mut inserted = 0;
        for outcome in self.loader.poll() {
            let attempt = self.attempts.remove(&outcome.ticket).unwrap_or(0);
            match outcome.result {
                Ok(loaded) => {
                    if self.loader.cancel_token().is_cancelled() {
                        continue;
                    }
                    let parts = loaded
                        .model
                        .meshes
                        .iter()
                        .map(|mesh| ModelPart {
                            mesh: upload(mesh),
                            local: mesh.local,
                            color: mesh.color,
                        })
                        .collect();
                    self.scene.insert(Node::new(
                        loaded.model.name,
                        NodeKind::Model { parts },
                        loaded.placement,
                    ));
                    inserted += 1;
                }
                Err(LoadError::Cancelled) => {}
                Err(_) if attempt < self.load_retries => {
                    let ticket = self.loader.retry(&outcome.request);
                    self.attempts.insert(ticket, attempt + 1);
                }
                Err(e) => {
                    tracing::error!(
                        path = %outcome.request.asset_path.display(),
                        attempts = attempt + 1,
                        "giving up on model: {e}"
                    );
                }
            }
        }
        inserted
    }

    /// Advance the animation to now. Returns `false` once stopped.
    pub fn frame(&mut self) -> bool {
        let now = Instant::now();
        self.stats.record(now - self.last_frame);
        self.last_frame = now;
        let t = (now - self.started).as_secs_f64();
        self.animation.step(t, &mut self.scene)
    }

    pub fn is_running(&self) -> bool {
        self.animation.is_running()
    }

    /// Stop the animation and abandon pending loads.
    pub fn shutdown(&mut self) {
        self.animation.stop_handle().stop();
        self.loader.cancel_all();
        self.attempts.clear();
        tracing::info!(frames = self.animation.frames(), "session shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use seascape_assets::{ModelData, ModelImporter};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fails every path containing "missing", counting calls.
    #[derive(Clone, Default)]
    struct StubImporter(Arc<AtomicUsize>);

    impl ModelImporter for StubImporter {
        fn import(&self, path: &Path) -> Result<ModelData, LoadError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            if path.to_string_lossy().contains("missing") {
                return Err(LoadError::NoMeshes(path.display().to_string()));
            }
            Ok(ModelData {
                name: "jellyfish_0".into(),
                meshes: vec![MeshData {
                    name: "bell".into(),
                    positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
                    normals: vec![Vec3::Z; 3],
                    indices: vec![0, 1, 2],
                    local: Mat4::IDENTITY,
                    color: [0.6, 0.3, 0.9, 1.0],
                }],
            })
        }
    }

    fn session_with(importer: StubImporter, load_retries: u32) -> Session {
        let loader = ModelLoader::with_importer(importer, StdRng::seed_from_u64(7));
        let config = SessionConfig {
            load_retries,
            ..SessionConfig::default()
        };
        Session::with_loader(1280, 720, config, loader)
    }

    /// Drain until nothing is in flight.
    fn settle(session: &mut Session) -> usize {
        let mut inserted = 0;
        let mut next = 2;
        for _ in 0..500 {
            inserted += session.drain_loads(|_| {
                next += 1;
                MeshHandle(next)
            });
            if session.loader.in_flight() == 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        inserted
    }

    #[test]
    fn resize_keeps_camera_position_and_fov() {
        let mut session = session_with(StubImporter::default(), 0);
        let position = session.camera.position();
        let fov = session.camera.fov;

        session.resize(800, 400);

        assert_eq!(session.viewport(), (800, 400));
        assert_eq!(session.camera.aspect, 2.0);
        assert_eq!(session.camera.position(), position);
        assert_eq!(session.camera.fov, fov);
    }

    #[test]
    fn explicit_position_is_placed_exactly() {
        let mut session = session_with(StubImporter::default(), 0);
        session.load_model("jellyfish_0/scene.gltf", Some(Vec3::new(-60.0, 0.0, 5.0)));
        assert_eq!(settle(&mut session), 1);

        let (_, node) = session.scene.models().next().unwrap();
        assert_eq!(node.transform.position, Vec3::new(-60.0, 0.0, 5.0));
        assert_eq!(node.transform.scale, Vec3::splat(10.0));
        let NodeKind::Model { parts } = &node.kind else {
            panic!("expected a model node");
        };
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].color, [0.6, 0.3, 0.9, 1.0]);
    }

    #[test]
    fn failed_load_leaves_scene_unchanged() {
        let mut session = session_with(StubImporter::default(), 0);
        let before = session.scene.node_count();
        session.load_model("missing/scene.gltf", None);
        assert_eq!(settle(&mut session), 0);
        assert_eq!(session.scene.node_count(), before);
    }

    #[test]
    fn failed_load_is_retried() {
        let importer = StubImporter::default();
        let calls = importer.0.clone();
        let mut session = session_with(importer, 2);
        session.load_model("missing/scene.gltf", Some(Vec3::ZERO));
        settle(&mut session);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn default_models_are_queued() {
        let mut session = session_with(StubImporter::default(), 0);
        session.queue_default_models(Path::new("assets"));
        assert_eq!(settle(&mut session), 3);

        let mut positions: Vec<Vec3> = session
            .scene
            .models()
            .map(|(_, n)| n.transform.position)
            .collect();
        positions.sort_by(|a, b| a.x.total_cmp(&b.x));
        assert_eq!(positions, vec![
            DEFAULT_MODEL_POSITIONS[0],
            DEFAULT_MODEL_POSITIONS[2],
            DEFAULT_MODEL_POSITIONS[1],
        ]);
    }

    #[test]
    fn sun_edit_moves_sun_water_edit_does_not() {
        let mut session = session_with(StubImporter::default(), 0);
        let sun = session.scene.sun();

        let params = Parameters {
            distortion_scale: 5.0,
            ..session.params
        };
        session.set_params(params, ParamEdit::Water);
        assert_eq!(session.scene.sun(), sun);
        assert_eq!(session.scene.water().distortion_scale, 5.0);

        let params = Parameters {
            inclination: 0.3,
            ..session.params
        };
        session.set_params(params, ParamEdit::Sun);
        assert_ne!(session.scene.sun(), sun);
    }

    #[test]
    fn combined_edit_updates_sun_and_water() {
        let mut session = session_with(StubImporter::default(), 0);
        let sun = session.scene.sun();

        let params = Parameters {
            azimuth: 0.3,
            size: 2.0,
            alpha: 0.95,
            ..session.params
        };
        session.set_params(params, ParamEdit::Sun);

        assert_ne!(session.scene.sun(), sun);
        let water = session.scene.water();
        assert_eq!(water.size, session.params.size);
        assert_eq!(water.alpha, session.params.alpha);
        assert_eq!(water.distortion_scale, session.params.distortion_scale);
        assert_eq!(water.size, 2.0);
    }

    #[test]
    fn shutdown_stops_frames_and_loads() {
        let mut session = session_with(StubImporter::default(), 0);
        assert!(session.frame());
        session.shutdown();
        assert!(!session.is_running());
        assert!(!session.frame());

        let before = session.scene.node_count();
        session.load_model("jellyfish_0/scene.gltf", Some(Vec3::ZERO));
        assert_eq!(settle(&mut session), 0);
        assert_eq!(session.scene.node_count(), before);
    }
}
