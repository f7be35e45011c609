//! GPU rendering subsystem.
//!
//! Renderers consume CPU-side geometry (`mesh`) and issue GPU commands via wgpu.
//! Each renderer is responsible for its own GPU resources (pipelines, buffers).

mod ctx;
mod viewport;
pub mod sphere;

pub use ctx::{RenderCtx, RenderTarget};
pub use viewport::Viewport;
