//! Data shared between the simulation and the GPU.
//!
//! - `mesh` holds the procedural sphere and the unit cube
//! - `collider` holds axis-aligned boxes and the reusable collider pool
//! - `instance` holds per-instance transforms and vertex buffer layouts
//! - `texture` wraps GPU textures and render targets

pub mod collider;
pub mod instance;
pub mod mesh;
pub mod texture;
