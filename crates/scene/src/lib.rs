//! Scene graph: the nodes that get drawn plus the shading state they share.
//!
//! # Invariants
//! - All mutations go through explicit operations on [`Scene`].
//! - Inserting a node is a single map insert, so a frame observes a node
//!   either completely or not at all.
//! - The animation step never runs after its stop handle fires.

pub mod animation;
pub mod scene;

pub use animation::{AnimationConfig, AnimationLoop, CubeMotion, StopHandle, WaterClock};
pub use scene::{ModelPart, Node, NodeKind, Scene, SceneConfig};
