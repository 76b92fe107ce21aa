//! roomview
//!
//! A small interior-scene viewer: it loads a fixed set of glTF assets, wraps
//! them in a cubemap environment, lights them with an ambient, a directional
//! and a point light, and renders every frame with a damped orbit camera. A
//! live panel exposes the light parameters for tweaking while the scene runs.
//!
//! High-level modules
//! - `assets`: async loading of glTF models, images and the cubemap
//! - `camera`: orbit camera, projection and the damped controls
//! - `config`: the static scene description and its JSON overrides
//! - `context`: central GPU and window context
//! - `lights`: the three scene lights and their uniform layout
//! - `panel`: the egui tweak panel and its slider bindings
//! - `pipelines`: mesh, shadow and skybox render pipelines
//! - `render`: the renderer owning all GPU-side scene resources
//! - `scene`: the CPU-side scene graph
//! - `viewer`: window lifecycle and the frame loop
//!

pub mod assets;
pub mod camera;
pub mod config;
pub mod context;
pub mod lights;
pub mod panel;
pub mod pipelines;
pub mod render;
pub mod scene;
pub mod time;
pub mod viewer;

pub use config::ViewerConfig;
pub use viewer::run;
