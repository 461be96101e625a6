use crate::RenderError;
use crate::camera::OrbitCamera;
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use seascape_common::MeshHandle;
use seascape_scene::{NodeKind, Scene};
use std::ops::Range;
use std::path::Path;
use wgpu::util::DeviceExt;

/// Mesh slot of the unit water plane. Slot 0 is the unit cube.
const PLANE: MeshHandle = MeshHandle(1);

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    sky_sun: [f32; 4],
    water_sun: [f32; 4],
    sun_radiance: [f32; 4],
    sky_ambient: [f32; 4],
    ground_ambient: [f32; 4],
    sky_params: [f32; 4],
    water_color: [f32; 4],
    water_params: [f32; 4],
    sun_color: [f32; 4],
}

impl FrameUniforms {
    fn new(camera: &OrbitCamera, scene: &Scene) -> Self {
        let sky = scene.sky();
        let water = scene.water();
        let env = scene.environment();
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_pos: camera.position().extend(1.0).to_array(),
            sky_sun: sky.sun_position.extend(0.0).to_array(),
            water_sun: water.sun_direction.extend(0.0).to_array(),
            sun_radiance: env.sun_radiance.extend(0.0).to_array(),
            sky_ambient: env.sky_ambient.extend(0.0).to_array(),
            ground_ambient: env.ground_ambient.extend(0.0).to_array(),
            sky_params: [
                sky.turbidity,
                sky.rayleigh,
                sky.mie_coefficient,
                sky.mie_directional_g,
            ],
            water_color: water.water_color.extend(water.alpha).to_array(),
            water_params: [water.time, water.size, water.distortion_scale, 0.0],
            sun_color: water.sun_color.extend(1.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
}

impl InstanceData {
    fn new(model: Mat4, color: [f32; 4]) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color,
        }
    }

    #[cfg(test)]
    fn model(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&[self.model_0, self.model_1, self.model_2, self.model_3])
    }
}

/// Pipelines in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Pass {
    Sky,
    Opaque,
    Water,
}

/// A run of instances drawn with one mesh and pipeline.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Batch {
    pass: Pass,
    mesh: MeshHandle,
    instances: Range<u32>,
}

/// Flatten the scene into instance data and draw batches.
///
/// Batches come out sorted by pass, then mesh. At most `max_instances`
/// instances are produced; when over the cap, model parts are dropped and
/// the sky, water and cube are kept.
pub(crate) fn build_batches(scene: &Scene, max_instances: usize) -> (Vec<InstanceData>, Vec<Batch>) {
    const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    let mut items: Vec<(Pass, MeshHandle, InstanceData)> = Vec::new();
    let mut parts: Vec<(Pass, MeshHandle, InstanceData)> = Vec::new();
    for node in scene.nodes().values() {
        let model = node.transform.matrix();
        match &node.kind {
            NodeKind::Sky { .. } => {
                items.push((Pass::Sky, MeshHandle::CUBE, InstanceData::new(model, WHITE)));
            }
            NodeKind::Water { size } => {
                let plane = model * Mat4::from_scale(Vec3::new(*size, *size, 1.0));
                items.push((Pass::Water, PLANE, InstanceData::new(plane, WHITE)));
            }
            NodeKind::Cube { .. } => {
                items.push((Pass::Opaque, MeshHandle::CUBE, InstanceData::new(model, WHITE)));
            }
            NodeKind::Model { parts: model_parts } => {
                for part in model_parts {
                    parts.push((
                        Pass::Opaque,
                        part.mesh,
                        InstanceData::new(model * part.local, part.color),
                    ));
                }
            }
        }
    }

    let budget = max_instances.saturating_sub(items.len());
    if parts.len() > budget {
        tracing::warn!(
            requested = items.len() + parts.len(),
            max = max_instances,
            dropped = parts.len() - budget,
            "instance buffer full, dropping model parts"
        );
        parts.truncate(budget);
    }
    items.append(&mut parts);
    items.truncate(max_instances);

    items.sort_by_key(|(pass, mesh, _)| (*pass, *mesh));

    let mut instances = Vec::with_capacity(items.len());
    let mut batches: Vec<Batch> = Vec::new();
    for (pass, mesh, instance) in items {
        let index = instances.len() as u32;
        instances.push(instance);
        match batches.last_mut() {
            Some(b) if b.pass == pass && b.mesh == mesh => b.instances.end = index + 1,
            _ => batches.push(Batch {
                pass,
                mesh,
                instances: index..index + 1,
            }),
        }
    }
    (instances, batches)
}

/// Unit cube centred on the origin.
fn cube_mesh() -> (Vec<Vertex>, Vec<u32>) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        Vertex { position: [-p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [-p,  p,  p], normal: [0.0, 0.0, 1.0] },
        // -Z face
        Vertex { position: [ p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 0.0, -1.0] },
        // +X face
        Vertex { position: [ p, -p,  p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [1.0, 0.0, 0.0] },
        // -X face
        Vertex { position: [-p, -p, -p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [-1.0, 0.0, 0.0] },
        // +Y face
        Vertex { position: [-p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 1.0, 0.0] },
        // -Y face
        Vertex { position: [-p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [0.0, -1.0, 0.0] },
    ];
    #[rustfmt::skip]
    let indices: Vec<u32> = vec![
        0,1,2, 2,3,0,       // +Z
        4,5,6, 6,7,4,       // -Z
        8,9,10, 10,11,8,    // +X
        12,13,14, 14,15,12, // -X
        16,17,18, 18,19,16, // +Y
        20,21,22, 22,23,20, // -Y
    ];
    (vertices, indices)
}

/// Unit square in the XY plane facing +Z.
fn plane_mesh() -> (Vec<Vertex>, Vec<u32>) {
    let p = 0.5_f32;
    let normal = [0.0, 0.0, 1.0];
    let vertices = vec![
        Vertex { position: [-p, -p, 0.0], normal },
        Vertex { position: [p, -p, 0.0], normal },
        Vertex { position: [p, p, 0.0], normal },
        Vertex { position: [-p, p, 0.0], normal },
    ];
    (vertices, vec![0, 1, 2, 2, 3, 0])
}

/// Read the water normal map from disk.
pub fn load_normal_map(path: impl AsRef<Path>) -> Result<image::RgbaImage, RenderError> {
    Ok(image::open(path)?.to_rgba8())
}

/// Flat normal map used when the real one is missing.
fn flat_normal_map() -> image::RgbaImage {
    image::RgbaImage::from_pixel(1, 1, image::Rgba([128, 128, 255, 255]))
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

struct PipelineDesc<'a> {
    label: &'a str,
    source: &'a str,
    vs: &'a str,
    fs: &'a str,
    blend: wgpu::BlendState,
    depth_write: bool,
    depth_compare: wgpu::CompareFunction,
}

/// wgpu scene renderer: sky dome, lit meshes, water plane.
pub struct WgpuRenderer {
    sky_pipeline: wgpu::RenderPipeline,
    mesh_pipeline: wgpu::RenderPipeline,
    water_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    water_bind_group: wgpu::BindGroup,
    meshes: Vec<GpuMesh>,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
    size: (u32, u32),
}

impl WgpuRenderer {
    /// Build pipelines and static meshes. Without a normal map the water
    /// is shaded with a flat one.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        normal_map: Option<image::RgbaImage>,
    ) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniform_buffer"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let water_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("water_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let normal_map = normal_map.unwrap_or_else(flat_normal_map);
        let normal_view = Self::upload_normal_map(device, queue, &normal_map);
        let normal_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("water_normal_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let water_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("water_bind_group"),
            layout: &water_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&normal_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&normal_sampler),
                },
            ],
        });

        let base_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("base_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });
        let water_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("water_pipeline_layout"),
                bind_group_layouts: &[&uniform_layout, &water_layout],
                push_constant_ranges: &[],
            });

        let sky_pipeline = Self::create_pipeline(
            device,
            &base_layout,
            surface_format,
            PipelineDesc {
                label: "sky",
                source: shaders::SKY_SHADER,
                vs: "vs_sky",
                fs: "fs_sky",
                blend: wgpu::BlendState::REPLACE,
                depth_write: false,
                depth_compare: wgpu::CompareFunction::Always,
            },
        );
        let mesh_pipeline = Self::create_pipeline(
            device,
            &base_layout,
            surface_format,
            PipelineDesc {
                label: "mesh",
                source: shaders::MESH_SHADER,
                vs: "vs_mesh",
                fs: "fs_mesh",
                blend: wgpu::BlendState::REPLACE,
                depth_write: true,
                depth_compare: wgpu::CompareFunction::Less,
            },
        );
        let water_pipeline = Self::create_pipeline(
            device,
            &water_pipeline_layout,
            surface_format,
            PipelineDesc {
                label: "water",
                source: shaders::WATER_SHADER,
                vs: "vs_water",
                fs: "fs_water",
                blend: wgpu::BlendState::ALPHA_BLENDING,
                depth_write: true,
                depth_compare: wgpu::CompareFunction::Less,
            },
        );

        // Instance buffer (pre-allocated)
        let max_instances = 4_096u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        let mut renderer = Self {
            sky_pipeline,
            mesh_pipeline,
            water_pipeline,
            uniform_buffer,
            uniform_bind_group,
            water_bind_group,
            meshes: Vec::new(),
            instance_buffer,
            max_instances,
            depth_texture,
            surface_format,
            size: (width.max(1), height.max(1)),
        };

        let (cube_verts, cube_indices) = cube_mesh();
        let cube = renderer.push_mesh(device, "cube", &cube_verts, &cube_indices);
        let (plane_verts, plane_indices) = plane_mesh();
        let plane = renderer.push_mesh(device, "water_plane", &plane_verts, &plane_indices);
        debug_assert_eq!((cube, plane), (MeshHandle::CUBE, PLANE));

        renderer
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        surface_format: wgpu::TextureFormat,
        desc: PipelineDesc<'_>,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(desc.label),
            source: wgpu::ShaderSource::Wgsl(shaders::compose(desc.source).into()),
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(desc.vs),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(desc.fs),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(desc.blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Sky is seen from inside, water from both sides, models
                // are often single-sided sheets.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: desc.depth_write,
                depth_compare: desc.depth_compare,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
    }

    fn upload_normal_map(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &image::RgbaImage,
    ) -> wgpu::TextureView {
        let (width, height) = image.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("water_normal_map"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn push_mesh(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> MeshHandle {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_vertex_buffer")),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_index_buffer")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let handle = MeshHandle(self.meshes.len() as u32);
        self.meshes.push(GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        });
        handle
    }

    /// Upload a loaded mesh. Missing normals default to +Y.
    pub fn upload_mesh(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        positions: &[Vec3],
        normals: &[Vec3],
        indices: &[u32],
    ) -> MeshHandle {
        let vertices: Vec<Vertex> = positions
            .iter()
            .enumerate()
            .map(|(i, p)| Vertex {
                position: p.to_array(),
                normal: normals.get(i).copied().unwrap_or(Vec3::Y).to_array(),
            })
            .collect();
        let handle = self.push_mesh(device, label, &vertices, indices);
        tracing::debug!(
            mesh = handle.0,
            label,
            vertices = vertices.len(),
            indices = indices.len(),
            "mesh uploaded"
        );
        handle
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.size = (width.max(1), height.max(1));
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Render one frame of `scene` through `camera`.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &OrbitCamera,
        scene: &Scene,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::new(camera, scene)),
        );

        let (instances, batches) = build_batches(scene, self.max_instances as usize);
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

            let mut current: Option<Pass> = None;
            for batch in &batches {
                let Some(mesh) = self.meshes.get(batch.mesh.0 as usize) else {
                    tracing::warn!(mesh = batch.mesh.0, "skipping draw of unknown mesh");
                    continue;
                };

                if current != Some(batch.pass) {
                    match batch.pass {
                        Pass::Sky => pass.set_pipeline(&self.sky_pipeline),
                        Pass::Opaque => pass.set_pipeline(&self.mesh_pipeline),
                        Pass::Water => {
                            pass.set_pipeline(&self.water_pipeline);
                            pass.set_bind_group(1, &self.water_bind_group, &[]);
                        }
                    }
                    current = Some(batch.pass);
                }

                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, batch.instances.clone());
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}
