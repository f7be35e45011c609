//! Petri engine.
//!
//! Procedural lat/long sphere meshes packed into one shared vertex/index
//! buffer, plus the winit/wgpu runtime that draws them.

pub mod camera;
pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod mesh;
pub mod paint;
pub mod render;
pub mod time;
pub mod window;

pub use glam;
