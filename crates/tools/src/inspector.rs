use glam::Vec3;
use seascape_common::NodeId;
use seascape_scene::{NodeKind, Scene};

/// Scene inspector for developer tooling.
///
/// Read-only queries against the scene for the debug overlay.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene state.
    pub fn summary(scene: &Scene) -> SceneSummary {
        SceneSummary {
            node_count: scene.node_count(),
            model_count: scene.model_count(),
            sun: scene.sun(),
            water_time: scene.water().time,
        }
    }

    /// Describe a single node.
    pub fn inspect_node(scene: &Scene, id: NodeId) -> Option<NodeInfo> {
        scene.get(id).map(|node| NodeInfo {
            id,
            name: node.name.clone(),
            kind: kind_label(&node.kind),
            position: node.transform.position.to_array(),
            scale: node.transform.scale.to_array(),
        })
    }

    /// Every node in id order.
    pub fn list_nodes(scene: &Scene) -> Vec<NodeInfo> {
        scene
            .nodes()
            .keys()
            .filter_map(|id| Self::inspect_node(scene, *id))
            .collect()
    }
}

fn kind_label(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::Sky { .. } => "sky",
        NodeKind::Water { .. } => "water",
        NodeKind::Cube { .. } => "cube",
        NodeKind::Model { .. } => "model",
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone)]
pub struct SceneSummary {
    pub node_count: usize,
    pub model_count: usize,
    pub sun: Vec3,
    pub water_time: f32,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: nodes={} models={} sun=({:.3}, {:.3}, {:.3}) water_time={:.2}",
            self.node_count,
            self.model_count,
            self.sun.x,
            self.sun.y,
            self.sun.z,
            self.water_time
        )
    }
}

/// Detailed info about a single node.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub kind: &'static str,
    pub position: [f32; 3],
    pub scale: [f32; 3],
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {} pos=({:.1}, {:.1}, {:.1}) scale={:.1}",
            self.name,
            self.id.short(),
            self.kind,
            self.position[0],
            self.position[1],
            self.position[2],
            self.scale[0],
        )
    }
}
