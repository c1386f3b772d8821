//! orbit-clock
//!
//! A real-time 3D countdown rendered with wgpu on native and WASM targets. A textured
//! sphere sits inside a ring of instanced cubes, the remaining milliseconds stand in
//! front of it as seven-segment digits, and a first-person camera collides with both.
//!
//! High-level modules
//! - `camera`: camera pose, projection and the camera uniform
//! - `context`: window surface and device/queue acquisition
//! - `data_structures`: meshes, colliders, instances and GPU textures
//! - `flow`: the winit event loop, tick scheduling and `run()`
//! - `input`: keyboard, mouse and scroll handling
//! - `pipelines`: the object and background render pipelines
//! - `render`: GPU buffers, frame encoding and the redraw gate
//! - `resources`: asset loading and the scene texture mip chain
//! - `scene`: the simulation tick, digit layout, collisions and animation
//! - `settings`: persisted countdown target and camera speeds
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod input;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod settings;

// Re-exports commonly used types for convenience in downstream code.
pub use camera::{Camera, CameraUniform};
pub use data_structures::collider::{BoxCollider, ColliderPool, Overlap};
pub use data_structures::mesh::Mesh;
pub use flow::run;
pub use render::{FrameAction, FrameGate, Renderer};
pub use scene::{CollisionZone, SceneState, TickReport};
pub use settings::Settings;
