//! orbit-scene
//!
//! A small cross-platform (native and WASM) wgpu demo: a lit scene of
//! spinning primitives, a cube textured per face, an imported OBJ/MTL model
//! and an equirectangular skybox, viewed through a damped orbit camera.
//!
//! High-level modules
//! - `app`: window, event loop, asset dispatch and the render loop
//! - `animation`: the time-driven spin of the rotating objects
//! - `camera`: camera, projection and the camera uniform
//! - `clock`: frame counter and elapsed time
//! - `config`: every tunable constant of the demo
//! - `context`: GPU device, surface, lights and pipelines
//! - `controls`: orbit controller with damping
//! - `data_structures`: geometry, meshes, materials, textures and the scene
//! - `pipelines`: mesh, skybox and equirect-to-cube render pipelines
//! - `resources`: async loading of images and OBJ/MTL models
//!

pub mod animation;
pub mod app;
pub mod camera;
pub mod clock;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod pipelines;
pub mod resources;

pub use app::run;
pub use config::SceneConfig;
