use glam::{Mat4, Vec3};
use std::path::Path;

/// Errors from loading a model.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to load glTF file: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0} has no scene")]
    NoScene(String),
    #[error("{0} contains no meshes")]
    NoMeshes(String),
    #[error("missing position data for mesh: {0}")]
    MissingPositions(String),
    #[error("load cancelled")]
    Cancelled,
}

/// One mesh primitive, flattened to the model root.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
    /// Node hierarchy transform from this primitive to the model root.
    pub local: Mat4,
    pub color: [f32; 4],
}

/// CPU-side contents of a model file.
#[derive(Debug, Clone)]
pub struct ModelData {
    pub name: String,
    pub meshes: Vec<MeshData>,
}

impl ModelData {
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.positions.len()).sum()
    }
}

/// Source of model data. Implementations run on loader worker threads.
pub trait ModelImporter: Send + Sync + 'static {
    fn import(&self, path: &Path) -> Result<ModelData, LoadError>;
}

/// Imports `.gltf`/`.glb` files with the `gltf` crate.
///
/// Only geometry and base color factors are kept; textures are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct GltfImporter;

impl ModelImporter for GltfImporter {
    fn import(&self, path: &Path) -> Result<ModelData, LoadError> {
        let label = path.display().to_string();
        let (document, buffers, _images) = gltf::import(path)?;

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| LoadError::NoScene(label.clone()))?;

        let mut meshes = Vec::new();
        for node in scene.nodes() {
            visit_node(&node, Mat4::IDENTITY, &buffers, &mut meshes)?;
        }

        if meshes.is_empty() {
            return Err(LoadError::NoMeshes(label));
        }

        let name = path
            .parent()
            .and_then(|p| p.file_name())
            .or_else(|| path.file_stem())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".into());

        let model = ModelData { name, meshes };
        tracing::debug!(
            path = %label,
            meshes = model.meshes.len(),
            vertices = model.vertex_count(),
            "glTF imported"
        );
        Ok(model)
    }
}

/// Walk a node and its children, accumulating transforms.
fn visit_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<MeshData>,
) -> Result<(), LoadError> {
    let local = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let mesh_name = mesh
            .name()
            .or_else(|| node.name())
            .unwrap_or("unnamed")
            .to_string();

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                tracing::debug!(mesh = %mesh_name, "skipping non-triangle primitive");
                continue;
            }
            out.push(read_primitive(&mesh_name, &primitive, buffers, local)?);
        }
    }

    for child in node.children() {
        visit_node(&child, local, buffers, out)?;
    }
    Ok(())
}

fn read_primitive(
    name: &str,
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    local: Mat4,
) -> Result<MeshData, LoadError> {
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<Vec3> = reader
        .read_positions()
        .ok_or_else(|| LoadError::MissingPositions(name.to_string()))?
        .map(Vec3::from)
        .collect();

    let indices: Vec<u32> = reader
        .read_indices()
        .map(|i| i.into_u32().collect())
        .unwrap_or_else(|| (0..positions.len() as u32).collect());

    let normals: Vec<Vec3> = match reader.read_normals() {
        Some(n) => n.map(Vec3::from).collect(),
        None => smooth_normals(&positions, &indices),
    };

    let color = primitive
        .material()
        .pbr_metallic_roughness()
        .base_color_factor();

    Ok(MeshData {
        name: name.to_string(),
        positions,
        normals,
        indices,
        local,
        color,
    })
}

/// Area-weighted vertex normals for meshes that ship without them.
fn smooth_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One triangle in the XY plane under a node translated by (0, 2, 0).
    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": "body", "mesh": 0, "translation": [0.0, 2.0, 0.0] }],
        "meshes": [{ "name": "tri", "primitives": [{ "attributes": { "POSITION": 0 }, "material": 0 }] }],
        "materials": [{ "pbrMetallicRoughness": { "baseColorFactor": [0.5, 0.2, 0.8, 1.0] } }],
        "buffers": [{
            "byteLength": 36,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"
        }],
        "bufferViews": [{ "buffer": 0, "byteLength": 36 }],
        "accessors": [{
            "bufferView": 0,
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [1.0, 1.0, 0.0]
        }]
    }"#;

    #[test]
    fn import_triangle() {
        let dir = tempfile::tempdir().unwrap();
        let model_dir = dir.path().join("jellyfish_0");
        std::fs::create_dir(&model_dir).unwrap();
        let path = model_dir.join("scene.gltf");
        std::fs::write(&path, TRIANGLE_GLTF).unwrap();

        let model = GltfImporter.import(&path).unwrap();
        assert_eq!(model.name, "jellyfish_0");
        assert_eq!(model.meshes.len(), 1);

        let mesh = &model.meshes[0];
        assert_eq!(mesh.name, "tri");
        assert_eq!(mesh.positions.len(), 3);
        assert_eq!(mesh.positions[1], Vec3::X);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.color, [0.5, 0.2, 0.8, 1.0]);
        assert_eq!(mesh.local.transform_point3(Vec3::ZERO), Vec3::new(0.0, 2.0, 0.0));
        for n in &mesh.normals {
            assert!((*n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn import_without_meshes_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.gltf");
        std::fs::write(
            &path,
            r#"{
                "asset": { "version": "2.0" },
                "scene": 0,
                "scenes": [{ "nodes": [0] }],
                "nodes": [{ "name": "root" }]
            }"#,
        )
        .unwrap();

        match GltfImporter.import(&path) {
            Err(LoadError::NoMeshes(label)) => assert!(label.ends_with("empty.gltf")),
            other => panic!("expected NoMeshes, got {other:?}"),
        }
    }

    #[test]
    fn import_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = GltfImporter.import(&dir.path().join("nope.gltf"));
        assert!(matches!(result, Err(LoadError::Gltf(_))));
    }

    #[test]
    fn smooth_normals_fall_back_to_up() {
        let positions = vec![Vec3::ZERO, Vec3::ZERO, Vec3::ZERO];
        let normals = smooth_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals, vec![Vec3::Y; 3]);
    }
}
