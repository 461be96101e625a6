//! Developer tooling: frame statistics and a read-only scene inspector.
//!
//! # Invariants
//! - Tools only read scene state.

mod inspector;
mod stats;

pub use inspector::{NodeInfo, SceneInspector, SceneSummary};
pub use stats::FrameStats;
