//! Model loading: glTF import, random placement and a background loader.
//!
//! Loads run on worker threads and report back over a channel. The caller
//! drains results at a point of its choosing, so inserting a model into
//! the scene never races with drawing it.
//!
//! # Invariants
//! - Workers never touch the scene; they only produce [`LoadOutcome`]s.
//! - Once cancelled, a loader produces no further successful outcomes.

mod import;
mod loader;
mod placement;

pub use import::{GltfImporter, LoadError, MeshData, ModelData, ModelImporter};
pub use loader::{CancelToken, LoadOutcome, LoadTicket, LoadedModel, ModelLoader, PlacementRequest};
pub use placement::{MODEL_SCALE, PlacementBounds, random_position};
