//! Shared types used across the seascape crates.

mod types;

pub use types::{MeshHandle, NodeId, Transform};
