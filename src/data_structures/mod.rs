//! Data structures: geometry, meshes, materials, textures and the scene.
//!
//! - `geometry` generates box, sphere and cylinder vertex data on the CPU
//! - `model` contains mesh and material definitions and their GPU resources
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `instance` holds per-node transformation data
//! - `scene` describes the demo scene and owns its drawable nodes

pub mod geometry;
pub mod instance;
pub mod model;
pub mod scene;
pub mod texture;
