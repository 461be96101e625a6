use glam::{Mat4, Quat, Vec3};
use seascape_common::{MeshHandle, NodeId, Transform};
use seascape_sky::{Environment, Parameters, SkyUniforms, WaterUniforms, sun_direction};
use std::collections::BTreeMap;

/// One drawable piece of a loaded model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPart {
    pub mesh: MeshHandle,
    /// Transform from the part to the model root.
    pub local: Mat4,
    pub color: [f32; 4],
}

/// What a node is. The renderer picks a pipeline per kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Sky dome of the given uniform scale.
    Sky { scale: f32 },
    /// Square water plane of the given edge length, lying in the XZ plane.
    Water { size: f32 },
    /// The demo cube.
    Cube { edge: f32 },
    /// A loaded model subtree.
    Model { parts: Vec<ModelPart> },
}

/// A node in the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind, transform: Transform) -> Self {
        Self {
            name: name.into(),
            kind,
            transform,
        }
    }

    pub fn is_model(&self) -> bool {
        matches!(self.kind, NodeKind::Model { .. })
    }
}

/// Fixed dimensions used when composing the scene.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub water_size: f32,
    pub sky_scale: f32,
    pub cube_edge: f32,
    pub include_cube: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            water_size: 10_000.0,
            sky_scale: 10_000.0,
            cube_edge: 6.0,
            include_cube: true,
        }
    }
}

/// The scene: nodes plus the sky, water and environment shading state.
///
/// Uses BTreeMap so that iteration order, and therefore draw order within a
/// node kind, is stable from frame to frame.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: BTreeMap<NodeId, Node>,
    cube: Option<NodeId>,
    sun: Vec3,
    sky: SkyUniforms,
    water: WaterUniforms,
    environment: Environment,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// An empty scene with default shading.
    pub fn new() -> Self {
        let sky = SkyUniforms::default();
        Self {
            nodes: BTreeMap::new(),
            cube: None,
            sun: sky.sun_position,
            environment: Environment::bake(&sky),
            sky,
            water: WaterUniforms::default(),
        }
    }

    /// Build the startup scene: water plane, sky dome and the demo cube,
    /// then position the sun from `params`.
    pub fn compose(config: &SceneConfig, params: &Parameters) -> Self {
        let mut scene = Self::new();

        scene.insert(Node::new(
            "water",
            NodeKind::Water {
                size: config.water_size,
            },
            Transform {
                // The plane is authored in XY; lay it flat.
                rotation: Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
                ..Transform::default()
            },
        ));

        scene.insert(Node::new(
            "sky",
            NodeKind::Sky {
                scale: config.sky_scale,
            },
            Transform {
                scale: Vec3::splat(config.sky_scale),
                ..Transform::default()
            },
        ));

        if config.include_cube {
            let id = scene.insert(Node::new(
                "cube",
                NodeKind::Cube {
                    edge: config.cube_edge,
                },
                Transform {
                    scale: Vec3::splat(config.cube_edge),
                    ..Transform::default()
                },
            ));
            scene.cube = Some(id);
        }

        scene.apply_water(params);
        scene.update_sun(params);

        tracing::info!(nodes = scene.node_count(), "scene composed");
        scene
    }

    /// Number of nodes in the scene.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Read-only access to all nodes.
    pub fn nodes(&self) -> &BTreeMap<NodeId, Node> {
        &self.nodes
    }

    /// Iterate the loaded model nodes.
    pub fn models(&self) -> impl Iterator<Item = (&NodeId, &Node)> {
        self.nodes.iter().filter(|(_, n)| n.is_model())
    }

    pub fn model_count(&self) -> usize {
        self.models().count()
    }

    /// Id of the demo cube, if the scene has one.
    pub fn cube(&self) -> Option<NodeId> {
        self.cube
    }

    /// Append a node. Returns its id.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId::new();
        tracing::debug!(id = %id.short(), name = %node.name, "node inserted");
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node. Returns it if it existed.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        if self.cube == Some(id) {
            self.cube = None;
        }
        self.nodes.remove(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Recompute the sun from `params`, push it into the sky and water
    /// uniforms and re-bake the lighting environment.
    ///
    /// Deterministic: unchanged parameters give a bit-identical sun.
    pub fn update_sun(&mut self, params: &Parameters) -> Vec3 {
        let _span = tracing::debug_span!("update_sun").entered();

        let sun = sun_direction(&params.clamped());
        self.sun = sun;
        self.sky.sun_position = sun;
        self.water.sun_direction = sun.normalize();
        self.environment = Environment::bake(&self.sky);

        tracing::debug!(x = sun.x, y = sun.y, z = sun.z, "sun updated");
        sun
    }

    /// Copy the water parameters into the water uniforms.
    pub fn apply_water(&mut self, params: &Parameters) {
        self.water.apply(params);
    }

    pub fn sun(&self) -> Vec3 {
        self.sun
    }

    pub fn sky(&self) -> &SkyUniforms {
        &self.sky
    }

    pub fn water(&self) -> &WaterUniforms {
        &self.water
    }

    pub fn water_mut(&mut self) -> &mut WaterUniforms {
        &mut self.water
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_node() -> Node {
        Node::new(
            "jellyfish",
            NodeKind::Model {
                parts: vec![ModelPart {
                    mesh: MeshHandle(1),
                    local: Mat4::IDENTITY,
                    color: [1.0; 4],
                }],
            },
            Transform::from_position(Vec3::new(-60.0, 0.0, 5.0)),
        )
    }

    #[test]
    fn compose_builds_water_sky_and_cube() {
        let scene = Scene::compose(&SceneConfig::default(), &Parameters::default());
        assert_eq!(scene.node_count(), 3);
        assert!(scene.cube().is_some());

        let kinds: Vec<_> = scene.nodes().values().map(|n| n.kind.clone()).collect();
        assert!(kinds.contains(&NodeKind::Water { size: 10_000.0 }));
        assert!(kinds.contains(&NodeKind::Sky { scale: 10_000.0 }));
        assert!(kinds.contains(&NodeKind::Cube { edge: 6.0 }));
    }

    #[test]
    fn compose_without_cube() {
        let config = SceneConfig {
            include_cube: false,
            ..SceneConfig::default()
        };
        let scene = Scene::compose(&config, &Parameters::default());
        assert_eq!(scene.node_count(), 2);
        assert!(scene.cube().is_none());
    }

    #[test]
    fn water_plane_lies_flat() {
        let scene = Scene::compose(&SceneConfig::default(), &Parameters::default());
        let water = scene
            .nodes()
            .values()
            .find(|n| matches!(n.kind, NodeKind::Water { .. }))
            .unwrap();
        // Plane normal +Z must end up pointing up.
        let normal = water.transform.rotation * Vec3::Z;
        assert!((normal - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn update_sun_writes_sky_and_water() {
        let mut scene = Scene::new();
        let params = Parameters::default();
        let sun = scene.update_sun(&params);

        assert_eq!(scene.sky().sun_position, sun);
        assert_eq!(scene.water().sun_direction, sun.normalize());
        assert_eq!(*scene.environment(), Environment::bake(scene.sky()));
    }

    #[test]
    fn update_sun_is_idempotent() {
        let mut scene = Scene::new();
        let params = Parameters::default();
        let a = scene.update_sun(&params);
        let env_a = *scene.environment();
        let b = scene.update_sun(&params);

        assert_eq!(a.to_array().map(f32::to_bits), b.to_array().map(f32::to_bits));
        assert_eq!(env_a, *scene.environment());
    }

    #[test]
    fn update_sun_follows_parameter_edits() {
        let mut scene = Scene::new();
        let before = scene.update_sun(&Parameters::default());
        let after = scene.update_sun(&Parameters {
            azimuth: 0.7,
            ..Parameters::default()
        });
        assert_ne!(before, after);
    }

    #[test]
    fn apply_water_leaves_sun_alone() {
        let mut scene = Scene::compose(&SceneConfig::default(), &Parameters::default());
        let sun = scene.water().sun_direction;
        scene.apply_water(&Parameters {
            size: 4.0,
            ..Parameters::default()
        });
        assert_eq!(scene.water().size, 4.0);
        assert_eq!(scene.water().sun_direction, sun);
    }

    #[test]
    fn insert_and_remove_models() {
        let mut scene = Scene::compose(&SceneConfig::default(), &Parameters::default());
        let id = scene.insert(model_node());
        assert_eq!(scene.node_count(), 4);
        assert_eq!(scene.model_count(), 1);
        assert_eq!(
            scene.get(id).unwrap().transform.position,
            Vec3::new(-60.0, 0.0, 5.0)
        );

        assert!(scene.remove(id).is_some());
        assert_eq!(scene.model_count(), 0);
        assert!(scene.remove(id).is_none());
    }

    #[test]
    fn removing_cube_clears_handle() {
        let mut scene = Scene::compose(&SceneConfig::default(), &Parameters::default());
        let cube = scene.cube().unwrap();
        scene.remove(cube);
        assert!(scene.cube().is_none());
    }

    #[test]
    fn node_ids_are_map_keys() {
        let mut scene = Scene::new();
        let a = scene.insert(model_node());
        let b = scene.insert(model_node());
        assert_ne!(a, b);

        let keys: Vec<NodeId> = scene.nodes().keys().copied().collect();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&a) && keys.contains(&b));
        assert_eq!(scene.get(a), scene.get(b));
    }
}
