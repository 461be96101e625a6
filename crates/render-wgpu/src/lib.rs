//! wgpu render backend for the seascape.
//!
//! Draws the sky dome, the lit meshes (demo cube and loaded models) and the
//! water surface, viewed through an orbit camera.
//!
//! # Invariants
//! - Renderer never mutates scene state.
//! - Frame uniforms are rebuilt from the scene every frame, so parameter
//!   changes show up on the next rendered frame.
//! - Camera motion is independent of the animation clock.

mod camera;
mod context;
mod gpu;
mod shaders;

pub use camera::OrbitCamera;
pub use context::GpuContext;
pub use gpu::{WgpuRenderer, load_normal_map};

/// Errors raised while setting up rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("failed to read image: {0}")]
    Image(#[from] image::ImageError),
}
