//! Render pipelines and the GPU-side state they bind.
//!
//! - `basic` builds the mesh pipeline every scene node is drawn with
//! - `light` holds the light rig and its uniform
//! - `skybox` converts panoramas to cube maps and draws the background

pub mod basic;
pub mod light;
pub mod skybox;
