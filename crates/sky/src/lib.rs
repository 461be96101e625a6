//! Sky and water shading state.
//!
//! Everything here is CPU-side and deterministic: the GUI mutates
//! [`Parameters`], [`sun_direction`] turns them into a vector, and the
//! uniforms plus the baked [`Environment`] are what the renderer uploads.
//!
//! # Invariants
//! - The sun vector is always derived from the parameters, never set directly.
//! - Baking the environment twice from the same sky yields identical values.

mod environment;
mod params;
mod sun;
mod uniforms;

pub use environment::{Environment, sky_radiance};
pub use params::{Parameters, ParamsError, Range};
pub use sun::sun_direction;
pub use uniforms::{SkyUniforms, WaterUniforms, hex_rgb};
